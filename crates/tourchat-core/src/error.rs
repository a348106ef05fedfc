//! Unified error type exposed by **`tourchat-core`**.
//!
//! Provider crates convert their internal errors into one of these variants
//! before handing them to the [`TurnDriver`](crate::driver::TurnDriver). The
//! driver decides which of them end up visible in the transcript and which
//! are returned to the caller untouched.

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The caller violated a precondition (empty text, a submission while a
    /// reply is still streaming, an out-of-order session call). Never written
    /// into the transcript; the session keeps its prior state.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The completion stream could not be established.
    #[error("could not open completion stream: {0}")]
    StreamOpen(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The source reported a failure after the stream was already open.
    #[error("completion stream failed: {0}")]
    StreamFault(String),

    /// Failure while serialising or deserialising JSON payloads.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic forwarding of any backend-specific error that doesn't fit
    /// another category.
    #[error("backend returned an error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Misconfiguration detected before any request was sent.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ChatError {
    /// Wrap any error raised while opening a stream.
    pub fn stream_open<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        ChatError::StreamOpen(err.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ChatError::InvalidInput(_))
    }
}
