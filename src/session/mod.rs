//! Project manifests and the session that turns a track into frames.

pub mod project;
pub mod render_session;
