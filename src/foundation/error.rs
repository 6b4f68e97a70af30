/// Crate-wide result alias.
pub type TimewarpResult<T> = Result<T, TimewarpError>;

/// Errors surfaced by sources, sessions, export and the host controller.
#[derive(thiserror::Error, Debug)]
pub enum TimewarpError {
    /// The live capture device could not be acquired (permission denied, no device, busy).
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// A scan session could not be set up; no ticks were scheduled.
    #[error("initialization error: {0}")]
    Initialization(String),

    /// The finished image was requested before the scan completed.
    #[error("not ready: {0}")]
    NotReady(String),

    /// Reading a frame from an acquired source failed.
    #[error("frame error: {0}")]
    Frame(String),

    /// Invalid options or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Encoding the output surface to a raster image failed.
    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimewarpError {
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
