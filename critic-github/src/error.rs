//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Transport error while fetching raw content
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raw content request answered with a non-success status
    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },

    /// Client construction failed
    #[error("GitHub client error: {0}")]
    Client(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<Error> for critic_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Parse(msg) => critic_core::Error::InvalidRequest(msg),
            Error::Client(msg) => critic_core::Error::Config(msg),
            other => critic_core::Error::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_upstream() {
        let err: critic_core::Error = Error::Status {
            url: "https://raw.githubusercontent.com/a/b/c".to_string(),
            status: 404,
        }
        .into();
        assert!(matches!(err, critic_core::Error::Upstream(ref m) if m.contains("404")));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_parse_maps_to_invalid_request() {
        let err: critic_core::Error = Error::Parse("not a repository".to_string()).into();
        assert!(matches!(err, critic_core::Error::InvalidRequest(_)));
        assert!(!err.is_retryable());
    }
}
