//! Fixed retry policy for failed tasks

use std::time::Duration;

use crate::config::RetryConfig;
use crate::Error;

/// How many times a task is attempted again, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Whether attempt number `attempt` (1-based) may be followed by another
    pub fn should_retry(&self, attempt: u32, error: &Error) -> bool {
        error.is_retryable() && attempt <= self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_retries, config.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_secs(60));
    }

    #[test]
    fn test_four_attempts_in_total() {
        let policy = RetryPolicy::default();
        let err = Error::Upstream("502".to_string());

        assert!(policy.should_retry(1, &err));
        assert!(policy.should_retry(3, &err));
        assert!(!policy.should_retry(4, &err));
    }

    #[test]
    fn test_non_retryable_errors_fail_fast() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(1, &Error::InvalidRequest("bad url".to_string())));
        assert!(!policy.should_retry(1, &Error::MalformedResponse("not json".to_string())));
        assert!(!policy.should_retry(1, &Error::Config("no key".to_string())));
    }
}
