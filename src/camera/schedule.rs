use crate::camera::mode::{CameraMode, FrameTimings, PhaseTimings};
use crate::foundation::core::{Fps, Point};
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::foundation::math::cosine_ease;
use crate::track::point::TrackPoint;

/// Inputs of [`ZoomSchedule::build`] besides the track itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleParams {
    pub timings: PhaseTimings,
    pub fps: Fps,
    /// Output minimap width in pixels.
    pub viewport_width: f64,
    /// Number of map raster levels.
    pub level_count: usize,
    /// Margin added to the path span before picking an overview level.
    pub padding_px: f64,
    /// Span, as a share of the viewport width, that triggers the first zoom-out.
    pub zoom_out_threshold: f64,
}

impl ScheduleParams {
    pub fn new(fps: Fps, viewport_width: f64, level_count: usize) -> Self {
        Self {
            timings: PhaseTimings::default(),
            fps,
            viewport_width,
            level_count,
            padding_px: 40.0,
            zoom_out_threshold: 0.6,
        }
    }
}

/// A run of consecutive frames in one camera mode at one overview level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ScheduleSegment {
    pub mode: CameraMode,
    /// First frame of the run.
    pub start: u64,
    /// Number of frames.
    pub len: u64,
    /// Discrete overview level the run eases towards or holds.
    pub level: usize,
}

impl ScheduleSegment {
    /// Exclusive end frame.
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// Camera zoom for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomSample {
    /// Continuous level in `[0, N-1]`.
    pub zoom_level: f64,
    /// Follow/overview blend in `[0, 1]`.
    pub fraction: f64,
    pub mode: CameraMode,
}

/// Per-frame zoom schedule covering every frame of the track exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomSchedule {
    segments: Vec<ScheduleSegment>,
    total: u64,
    t0: u64,
    cycles: usize,
}

impl ZoomSchedule {
    /// Build the schedule from level-0 positions.
    ///
    /// Each interior cycle picks its overview level from the path span at the frame its
    /// zoom-in completes (`t0 + (p+1)·C`).
    #[tracing::instrument(skip(base_coords, params), fields(frames = base_coords.len()))]
    pub fn build(base_coords: &[Point], params: &ScheduleParams) -> TrackreelResult<Self> {
        if base_coords.is_empty() {
            return Err(TrackreelError::schedule(
                "cannot schedule an empty track",
            ));
        }
        if params.level_count == 0 {
            return Err(TrackreelError::schedule("at least one map level is required"));
        }
        if !(params.viewport_width.is_finite() && params.viewport_width > 0.0) {
            return Err(TrackreelError::schedule("viewport width must be > 0"));
        }
        params.timings.validate()?;

        let total = base_coords.len() as u64;
        let ft = params.timings.to_frames(params.fps);
        let spans = prefix_spans(base_coords);
        let level_at = |i: u64| {
            let span = spans[(i.min(total - 1)) as usize];
            level_for_span(span, params.padding_px, params.viewport_width, params.level_count)
        };
        let final_level = level_at(total - 1);

        let threshold = params.zoom_out_threshold * params.viewport_width;
        let t0 = spans
            .iter()
            .position(|&s| s > threshold)
            .map_or(total, |i| i as u64);

        let mut segments = Vec::new();
        let mut push = |mode: CameraMode, start: u64, len: u64, level: usize| {
            if len > 0 {
                segments.push(ScheduleSegment {
                    mode,
                    start,
                    len,
                    level,
                });
            }
        };

        if t0 >= total {
            push(CameraMode::CloseFollow, 0, total, 0);
            tracing::debug!(total, "path never outgrows the viewport");
            return Ok(Self {
                segments,
                total,
                t0,
                cycles: 0,
            });
        }

        let closing = ft.closing_hold + ft.zoom_out;
        if total <= closing {
            push(CameraMode::Overview, 0, total, final_level);
            tracing::debug!(total, final_level, "track shorter than closing phases");
            return Ok(Self {
                segments,
                total,
                t0,
                cycles: 0,
            });
        }

        let closing_start = total - closing;
        let cycles = cycle_count(t0, closing_start, &ft);
        let first_out = t0 + ft.follow;

        push(
            CameraMode::CloseFollow,
            0,
            if cycles == 0 { closing_start } else { first_out },
            0,
        );
        for p in 0..cycles as u64 {
            let start = first_out + p * ft.cycle();
            let level = level_at(start + ft.excursion());
            let last = p + 1 == cycles as u64;
            let mut mode = CameraMode::ZoomingOut;
            let mut at = start;
            loop {
                let mut len = ft.duration(mode);
                if mode == CameraMode::CloseFollow {
                    // The last follow run absorbs the slack before the closing zoom-out.
                    len = if last {
                        closing_start - at
                    } else {
                        len.min(closing_start - at)
                    };
                }
                let seg_level = if mode == CameraMode::CloseFollow { 0 } else { level };
                push(mode, at, len, seg_level);
                at += len;
                mode = mode.next();
                if mode == CameraMode::ZoomingOut {
                    break;
                }
            }
        }
        push(CameraMode::ZoomingOut, closing_start, ft.zoom_out, final_level);
        push(
            CameraMode::Overview,
            total - ft.closing_hold,
            ft.closing_hold,
            final_level,
        );

        tracing::debug!(total, t0, cycles, final_level, "zoom schedule built");
        Ok(Self {
            segments,
            total,
            t0,
            cycles,
        })
    }

    /// Ordered, gap-free segments.
    pub fn segments(&self) -> &[ScheduleSegment] {
        &self.segments
    }

    /// Number of frames covered.
    pub fn total_frames(&self) -> u64 {
        self.total
    }

    /// First frame whose path span exceeds the zoom-out threshold.
    pub fn t0_frame(&self) -> u64 {
        self.t0
    }

    /// Number of interior zoom-out/zoom-in cycles.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Segment containing frame `i`.
    pub fn segment_at(&self, i: u64) -> Option<&ScheduleSegment> {
        let idx = self.segments.partition_point(|s| s.end() <= i);
        self.segments.get(idx).filter(|s| s.start <= i)
    }

    /// Zoom level and blend fraction for frame `i`.
    pub fn sample(&self, i: u64) -> ZoomSample {
        let Some(seg) = self.segment_at(i) else {
            return ZoomSample {
                zoom_level: 0.0,
                fraction: 0.0,
                mode: CameraMode::CloseFollow,
            };
        };
        let k = (i - seg.start) as f64;
        let len = seg.len as f64;
        let fraction = match seg.mode {
            CameraMode::CloseFollow => 0.0,
            CameraMode::Overview => 1.0,
            CameraMode::ZoomingOut => cosine_ease(k / len),
            CameraMode::ZoomingIn => cosine_ease(1.0 - k / len),
        };
        ZoomSample {
            zoom_level: fraction * seg.level as f64,
            fraction,
            mode: seg.mode,
        }
    }

    /// Write `zoom_level` and `fraction` into every point.
    pub fn apply(&self, points: &mut [TrackPoint]) {
        for (i, p) in points.iter_mut().enumerate() {
            let s = self.sample(i as u64);
            p.zoom_level = s.zoom_level;
            p.fraction = s.fraction;
        }
    }
}

/// Number of interior cycles whose excursion ends before the closing zoom-out.
///
/// Cycle `p` starts zooming out at `t0 + follow + p·cycle`.
pub fn cycle_count(t0: u64, closing_start: u64, ft: &FrameTimings) -> usize {
    let first_out = t0 + ft.follow;
    let cycle = ft.cycle();
    if cycle == 0 || first_out + ft.excursion() > closing_start {
        return 0;
    }
    ((closing_start - first_out - ft.excursion()) / cycle + 1) as usize
}

/// Running bounding-box span `max(Δx, Δy)` of positions `0..=i` for every `i`.
pub fn prefix_spans(coords: &[Point]) -> Vec<f64> {
    let mut out = Vec::with_capacity(coords.len());
    let Some(first) = coords.first() else {
        return out;
    };
    let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.x, first.x, first.y, first.y);
    for c in coords {
        x_min = x_min.min(c.x);
        x_max = x_max.max(c.x);
        y_min = y_min.min(c.y);
        y_max = y_max.max(c.y);
        out.push((x_max - x_min).max(y_max - y_min));
    }
    out
}

/// Discrete raster level that fits a path span plus padding into the viewport.
pub fn level_for_span(span: f64, padding: f64, width: f64, level_count: usize) -> usize {
    let scale = ((span + padding) / width).max(1.0);
    let level = scale.log2().ceil().max(0.0) as usize;
    level.min(level_count.saturating_sub(1))
}

#[cfg(test)]
#[path = "../../tests/unit/camera/schedule.rs"]
mod tests;
