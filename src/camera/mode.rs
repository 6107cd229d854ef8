use crate::foundation::core::Fps;

/// Camera framing state.
///
/// A cycle runs `ZoomingOut → Overview → ZoomingIn → CloseFollow`; the track ends with a closing
/// `ZoomingOut → Overview`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Tight framing around the follow point, raster level 0.
    CloseFollow,
    /// Easing from follow framing towards the path overview.
    ZoomingOut,
    /// Whole-path framing, `fraction == 1`.
    Overview,
    /// Easing back from the overview to follow framing.
    ZoomingIn,
}

impl CameraMode {
    /// Transition table of the camera state machine.
    pub fn next(self) -> Self {
        match self {
            Self::CloseFollow => Self::ZoomingOut,
            Self::ZoomingOut => Self::Overview,
            Self::Overview => Self::ZoomingIn,
            Self::ZoomingIn => Self::CloseFollow,
        }
    }

    /// Recover the mode from the schedule fractions of two consecutive frames.
    pub fn from_fractions(prev: f64, cur: f64) -> Self {
        if cur >= 1.0 {
            Self::Overview
        } else if cur > prev {
            Self::ZoomingOut
        } else if cur < prev {
            Self::ZoomingIn
        } else if cur <= 0.0 {
            Self::CloseFollow
        } else {
            Self::Overview
        }
    }
}

/// Phase timings in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    /// Close-follow time per cycle.
    pub t1: f64,
    /// Zoom-out transition.
    pub t2: f64,
    /// Overview hold.
    pub t3: f64,
    /// Zoom-in transition.
    pub t4: f64,
    /// Closing overview hold at the end of the track.
    pub t5: f64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            t1: 60.0,
            t2: 1.0,
            t3: 8.0,
            t4: 1.0,
            t5: 10.0,
        }
    }
}

impl PhaseTimings {
    pub fn validate(&self) -> crate::TrackreelResult<()> {
        for (name, v) in [
            ("t1", self.t1),
            ("t2", self.t2),
            ("t3", self.t3),
            ("t4", self.t4),
            ("t5", self.t5),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(crate::TrackreelError::validation(format!(
                    "phase timing {name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }

    /// Convert to whole frames at `fps` (floor).
    pub fn to_frames(&self, fps: Fps) -> FrameTimings {
        FrameTimings {
            follow: fps.secs_to_frames_floor(self.t1),
            zoom_out: fps.secs_to_frames_floor(self.t2),
            hold: fps.secs_to_frames_floor(self.t3),
            zoom_in: fps.secs_to_frames_floor(self.t4),
            closing_hold: fps.secs_to_frames_floor(self.t5),
        }
    }
}

/// Phase timings in frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTimings {
    pub follow: u64,
    pub zoom_out: u64,
    pub hold: u64,
    pub zoom_in: u64,
    pub closing_hold: u64,
}

impl FrameTimings {
    /// Frames spent in `mode` during one interior cycle.
    pub fn duration(&self, mode: CameraMode) -> u64 {
        match mode {
            CameraMode::CloseFollow => self.follow,
            CameraMode::ZoomingOut => self.zoom_out,
            CameraMode::Overview => self.hold,
            CameraMode::ZoomingIn => self.zoom_in,
        }
    }

    /// Full cycle length.
    pub fn cycle(&self) -> u64 {
        self.follow + self.zoom_out + self.hold + self.zoom_in
    }

    /// Zoom-out, hold and zoom-in together.
    pub fn excursion(&self) -> u64 {
        self.zoom_out + self.hold + self.zoom_in
    }

    /// Name the phase `elapsed` frames after a cycle's zoom-out started.
    ///
    /// Returns the mode and the frame offset inside that phase, or `None` past the cycle end.
    pub fn classify(&self, elapsed: u64) -> Option<(CameraMode, u64)> {
        let mut mode = CameraMode::ZoomingOut;
        let mut start = 0u64;
        loop {
            let len = self.duration(mode);
            if elapsed < start + len {
                return Some((mode, elapsed - start));
            }
            start += len;
            mode = mode.next();
            if mode == CameraMode::ZoomingOut {
                return None;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/mode.rs"]
mod tests;
