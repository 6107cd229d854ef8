/// Crate-wide result alias.
pub type TrackreelResult<T> = Result<T, TrackreelError>;

/// Error type shared by every stage of the animation pipeline.
///
/// All variants are fatal for a render run: the pipeline has no partial-output recovery.
#[derive(thiserror::Error, Debug)]
pub enum TrackreelError {
    /// Invalid input data or configuration (track, raster metadata, project manifest).
    #[error("validation error: {0}")]
    Validation(String),

    /// Zoom schedule could not be built for the given track.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Raster, text or compositing failure while producing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink or external encoder failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its context chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrackreelError {
    /// Build a [`TrackreelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TrackreelError::Schedule`].
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Build a [`TrackreelError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TrackreelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TrackreelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
