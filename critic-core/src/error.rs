//! Error types for Critic

use thiserror::Error;

/// Result type alias for Critic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Critic operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source-control host or the AI endpoint answered with a failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The AI response could not be read as an issue list
    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    /// Unknown task, or a task without results yet
    #[error("Not found: {0}")]
    NotFound(String),

    /// The analysis request is not well formed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Result, cache or task store failure
    #[error("Store error: {0}")]
    Store(String),

    /// The task queue is no longer accepting work
    #[error("Queue error: {0}")]
    Queue(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether a failed task should be attempted again
    ///
    /// Only transient failures qualify; a bad request or an unreadable
    /// response will not improve on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Upstream(_) | Error::Store(_) | Error::Io(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}

#[cfg(feature = "database")]
impl From<critic_db::Error> for Error {
    fn from(err: critic_db::Error) -> Self {
        match err {
            critic_db::Error::NotFound(what) => Error::NotFound(what),
            other => Error::Store(other.to_string()),
        }
    }
}
