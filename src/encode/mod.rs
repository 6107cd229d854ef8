//! Encoding sinks.
//!
//! Sinks consume rendered frames in track order and are used by `RenderSession::render_range`.

/// `ffmpeg`-based sinks (H.264 MP4 or ProRes 4444 MOV via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
