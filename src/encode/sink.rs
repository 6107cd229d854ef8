use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::FrameRGBA;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames in track order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order within the
/// requested render range.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> TrackreelResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrackreelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> TrackreelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    pub(crate) frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> TrackreelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrackreelResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> TrackreelResult<()> {
        Ok(())
    }
}

/// Writes each frame as `frame_NNNNNN.png` (straight alpha) into a directory.
///
/// Re-rendering into the same directory overwrites files with identical names.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            scratch: Vec::new(),
            cfg: None,
            written: 0,
        }
    }

    /// File name used for frame `idx`.
    pub fn frame_file_name(idx: FrameIndex) -> String {
        format!("frame_{:06}.png", idx.0)
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(Self::frame_file_name(idx))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frames written since the last `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> TrackreelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(TrackreelError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        ensure_parent_dir(&self.dir.join("frame"))?;
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrackreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TrackreelError::encode("png sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(TrackreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(&frame.data);
        if frame.premultiplied {
            unpremultiply_rgba8_in_place(&mut self.scratch);
        }

        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &self.scratch,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            TrackreelError::encode(format!("failed to write '{}': {e}", path.display()))
        })?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> TrackreelResult<()> {
        tracing::debug!(frames = self.written, dir = %self.dir.display(), "png sequence done");
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
