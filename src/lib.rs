//! Trackreel renders flight tracks into overlay animations.
//!
//! A track of GPS samples is projected onto a stack of pre-stitched map rasters, a zoom schedule
//! decides when the camera follows the pilot and when it pulls out to show the whole path, and each
//! frame composites a minimap, altitude bar, goal field and flight statistics onto a transparent
//! canvas. The public API is session-oriented:
//!
//! - Load a [`RenderProject`] manifest (or assemble [`SessionInputs`] in memory)
//! - Create a [`RenderSession`]
//! - Render single frames or stream a range into a [`FrameSink`]
#![forbid(unsafe_code)]

pub mod camera;
pub mod encode;
mod foundation;
pub mod geo;
pub mod raster;
pub mod render;
pub mod session;
pub mod track;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRange, Rgba8};
pub use crate::foundation::error::{TrackreelError, TrackreelResult};

pub use crate::camera::mode::{CameraMode, PhaseTimings};
pub use crate::camera::schedule::{ScheduleSegment, ZoomSchedule};
pub use crate::encode::ffmpeg::{FfmpegCodec, FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::geo::projection::RasterMeta;
pub use crate::render::FrameRGBA;
pub use crate::render::compositor::FrameLayout;
pub use crate::render::goal::{GoalKind, GoalSettings};
pub use crate::session::project::{ProjectDef, RasterSource, RenderProject, TargetDef};
pub use crate::session::render_session::{
    RenderSession, RenderSessionOpts, RenderStats, SessionInputs,
};
pub use crate::track::point::TrackPoint;
