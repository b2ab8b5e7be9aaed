//! Error types for the feedline system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the feedline system.
///
/// End of stream is deliberately absent: it is reported as
/// [`crate::Dispatch::EndOfStream`], never as a failure.
#[derive(Error, Debug)]
pub enum Error {
    /// Row could not be interpreted at all (e.g. zero columns).
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Data row belongs to a different request than the active one.
    #[error("incorrect request id: expected {expected:?}, got {actual:?}")]
    SubscriptionMismatch { expected: String, actual: String },

    /// The feed reported that nothing exists for the request.
    #[error("upstream error: !NO_DATA! (request {request_id:?})")]
    UpstreamNoData { request_id: String },

    /// Any other error notice sent by the feed.
    #[error("upstream error: {message} (request {request_id:?})")]
    Upstream { request_id: String, message: String },

    /// Row is shorter than the record shape requires.
    #[error("too few columns for {record}: need {required}, got {actual}")]
    TooFewColumns {
        record: &'static str,
        required: usize,
        actual: usize,
    },

    /// Timestamp field did not parse.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a malformed message error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedMessage(msg.into())
    }

    /// Whether the reader may drop the offending row and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::SubscriptionMismatch { .. } | Error::TooFewColumns { .. }
        )
    }

    /// Whether the feed has ended the request with an error notice.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Error::UpstreamNoData { .. } | Error::Upstream { .. })
    }
}
