use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::foundation::math::{mul_div255_u16, unpremultiply_rgba8_in_place};
use crate::render::FrameRGBA;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

/// Output codec for [`FfmpegSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FfmpegCodec {
    /// libx264 + yuv420p MP4; alpha is flattened over the background.
    H264,
    /// ProRes 4444 MOV, keeping the alpha channel when `alpha` is set.
    ProRes4444 { alpha: bool },
}

impl FfmpegCodec {
    pub fn keeps_alpha(self) -> bool {
        matches!(self, Self::ProRes4444 { alpha: true })
    }

    /// Output-side encoder arguments.
    pub fn output_args(self) -> Vec<&'static str> {
        match self {
            Self::H264 => vec![
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ],
            Self::ProRes4444 { alpha } => vec![
                "-an",
                "-c:v",
                "prores_ks",
                "-profile:v",
                "4444",
                "-pix_fmt",
                if alpha { "yuva444p10le" } else { "yuv444p10le" },
            ],
        }
    }
}

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output video file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    pub codec: FfmpegCodec,
}

impl FfmpegSinkOpts {
    /// Create options for an H.264 MP4 at `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            codec: FfmpegCodec::H264,
        }
    }

    pub fn with_codec(mut self, codec: FfmpegCodec) -> Self {
        self.codec = codec;
        self
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    process: Option<FfmpegProcess>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            process: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Full `ffmpeg` argument list for `cfg`.
    pub fn command_args(&self, cfg: &SinkConfig) -> Vec<String> {
        let mut args = vec![if self.opts.overwrite { "-y" } else { "-n" }.to_string()];
        for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba", "-s"] {
            args.push(a.to_string());
        }
        args.push(format!("{}x{}", cfg.width, cfg.height));
        args.extend(input_fps_args(cfg.fps));
        args.push("-i".to_string());
        args.push("pipe:0".to_string());
        args.extend(self.opts.codec.output_args().into_iter().map(String::from));
        args.push(self.opts.out_path.display().to_string());
        args
    }

    fn check_config(&self, cfg: &SinkConfig) -> TrackreelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(TrackreelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(TrackreelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if self.opts.codec == FfmpegCodec::H264
            && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
        {
            return Err(TrackreelError::validation(format!(
                "H.264 output needs even width/height, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TrackreelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> TrackreelResult<()> {
        self.check_config(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(TrackreelError::encode(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        tracing::debug!(codec = ?self.opts.codec, out = %self.opts.out_path.display(), "spawning ffmpeg");
        self.process = Some(FfmpegProcess::spawn(self.command_args(&cfg))?);
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrackreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TrackreelError::encode("ffmpeg sink not started"))?;
        if self.last_idx.is_some_and(|last| idx.0 <= last.0) {
            return Err(TrackreelError::encode(format!(
                "ffmpeg sink got frame {} out of order",
                idx.0
            )));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(TrackreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(TrackreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(idx);

        // ffmpeg reads straight alpha: either keep it (unpremultiplied) or flatten it away.
        if self.opts.codec.keeps_alpha() {
            self.scratch.copy_from_slice(&frame.data);
            if frame.premultiplied {
                unpremultiply_rgba8_in_place(&mut self.scratch);
            }
        } else {
            flatten_premul_over_bg_to_opaque_rgba8(
                &mut self.scratch,
                &frame.data,
                self.opts.bg_rgba,
            )?;
        }

        self.process
            .as_mut()
            .ok_or_else(|| TrackreelError::encode("ffmpeg sink is already finalized"))?
            .write(&self.scratch)
    }

    fn end(&mut self) -> TrackreelResult<()> {
        let process = self
            .process
            .take()
            .ok_or_else(|| TrackreelError::encode("ffmpeg sink not started"))?;
        self.cfg = None;
        process.finish()
    }
}

impl Drop for FfmpegSink {
    // Reached with a live process only when a render failed before `end()`.
    fn drop(&mut self) {
        let Some(process) = self.process.take() else {
            return;
        };
        let status = process.abort();
        tracing::warn!(?status, out = %self.opts.out_path.display(), "ffmpeg aborted before end of stream");
        if let Err(e) = std::fs::remove_file(&self.opts.out_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(error = %e, "failed to remove partial video");
        }
    }
}

/// A running `ffmpeg` child with its stdin pipe and a thread collecting stderr.
struct FfmpegProcess {
    child: Child,
    stdin: ChildStdin,
    stderr_drain: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl FfmpegProcess {
    fn spawn(args: Vec<String>) -> TrackreelResult<Self> {
        Self::spawn_program("ffmpeg", args)
    }

    fn spawn_program(program: &str, args: Vec<String>) -> TrackreelResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TrackreelError::encode(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TrackreelError::encode("ffmpeg stdin was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| TrackreelError::encode("ffmpeg stderr was not captured"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });

        Ok(Self {
            child,
            stdin,
            stderr_drain,
        })
    }

    fn write(&mut self, bytes: &[u8]) -> TrackreelResult<()> {
        self.stdin
            .write_all(bytes)
            .map_err(|e| TrackreelError::encode(format!("failed to write frame to ffmpeg: {e}")))
    }

    /// Close stdin and wait; a non-zero exit carries ffmpeg's stderr.
    fn finish(self) -> TrackreelResult<()> {
        let Self {
            mut child,
            stdin,
            stderr_drain,
        } = self;
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| TrackreelError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = stderr_drain
            .join()
            .map_err(|_| TrackreelError::encode("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| TrackreelError::encode(format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            return Err(TrackreelError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl FfmpegProcess {
    /// Kill the child and reap it along with the stderr thread.
    fn abort(self) -> Option<ExitStatus> {
        let Self {
            mut child,
            stdin,
            stderr_drain,
        } = self;
        drop(stdin);
        let _ = child.kill();
        let status = child.wait().ok();
        let _ = stderr_drain.join();
        status
    }
}

// For rawvideo input, `-r` goes before `-i`; rational fps as `num/den`.
fn input_fps_args(fps: Fps) -> [String; 2] {
    ["-r".to_string(), format!("{}/{}", fps.num, fps.den)]
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> TrackreelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(TrackreelError::validation(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TrackreelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
