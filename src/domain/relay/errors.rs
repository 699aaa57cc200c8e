//! Error taxonomy for upgrades and sessions.

use serde_json::error::Category;
use thiserror::Error;

/// Boxed transport error, so the domain does not depend on a specific
/// WebSocket implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons an upgrade request is refused before any session exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpgradeError {
    #[error("upgrade request carries no Origin header")]
    MissingOrigin,

    #[error("origin '{presented}' is not allowed")]
    OriginMismatch { presented: String },

    #[error("upgrade negotiation failed: {0}")]
    Negotiation(String),

    #[error("connection limit of {limit} reached")]
    AtCapacity { limit: usize },
}

/// A frame arrived but does not hold a relay message.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("frame does not match the message schema: {0}")]
    Schema(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DecodeError::Schema(err),
            Category::Syntax | Category::Eof | Category::Io => DecodeError::Syntax(err),
        }
    }
}

/// Failures that end a live session. Every variant is terminal.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read frame: {0}")]
    FrameRead(#[source] BoxError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write frame: {0}")]
    FrameWrite(#[source] BoxError),
}

impl SessionError {
    pub fn read(err: impl Into<BoxError>) -> Self {
        SessionError::FrameRead(err.into())
    }

    pub fn write(err: impl Into<BoxError>) -> Self {
        SessionError::FrameWrite(err.into())
    }

    /// Short machine-friendly label used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::FrameRead(_) => "frame_read",
            SessionError::Decode(_) => "decode",
            SessionError::Encode(_) => "encode",
            SessionError::FrameWrite(_) => "frame_write",
        }
    }
}
