//! Analysis engine
//!
//! Lists the files a pull request changes, fetches each one, asks the AI
//! endpoint for a review and folds the answers into an [`AnalysisResult`].
//!
//! [`AnalysisResult`]: crate::model::AnalysisResult

mod completion;
mod engine;
mod language;
mod prompt;
mod response;
mod source;

pub use completion::{ChatCompletionClient, CompletionClient};
pub use engine::Analyzer;
pub use language::{detect_language, UNKNOWN_LANGUAGE};
pub use prompt::{build_user_message, render_review_prompt, SYSTEM_PROMPT};
pub use response::parse_issues;
pub use source::SourceHost;

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{CompletionClient, SourceHost};
    use crate::model::{FileDiff, FileStatus};
    use crate::{Error, Result};

    /// In-memory pull request with scripted failures
    #[derive(Default)]
    pub struct FakeSource {
        files: Vec<(FileDiff, String)>,
        listing_failures: AtomicUsize,
        listings: AtomicUsize,
        last_token: Mutex<Option<String>>,
    }

    impl FakeSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(mut self, name: &str, status: FileStatus, content: &str) -> Self {
            let diff = FileDiff {
                filename: name.to_string(),
                status,
                raw_url: format!("https://raw.example/{}", name),
            };
            self.files.push((diff, content.to_string()));
            self
        }

        /// Fail the first `n` listings with an upstream error
        pub fn failing_first(self, n: usize) -> Self {
            self.listing_failures.store(n, Ordering::SeqCst);
            self
        }

        pub fn failing_listing() -> Self {
            Self::new().failing_first(usize::MAX)
        }

        pub fn listings(&self) -> usize {
            self.listings.load(Ordering::SeqCst)
        }

        pub fn last_token(&self) -> Option<String> {
            self.last_token.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SourceHost for FakeSource {
        async fn list_pr_files(
            &self,
            _repo_url: &str,
            _pr_number: u64,
            token: Option<&str>,
        ) -> Result<Vec<FileDiff>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            *self.last_token.lock().unwrap() = token.map(str::to_string);

            let remaining = self.listing_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.listing_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(Error::Upstream("list files returned 502".to_string()));
            }

            Ok(self.files.iter().map(|(d, _)| d.clone()).collect())
        }

        async fn fetch_raw(&self, raw_url: &str, _token: Option<&str>) -> Result<String> {
            self.files
                .iter()
                .find(|(d, _)| d.raw_url == raw_url)
                .map(|(_, c)| c.clone())
                .ok_or_else(|| Error::Upstream(format!("{} returned 404", raw_url)))
        }
    }

    /// Scripted AI endpoint
    pub struct FakeCompletion {
        answers: Mutex<VecDeque<String>>,
        fallback: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeCompletion {
        pub fn always(answer: &str) -> Self {
            Self {
                answers: Mutex::new(VecDeque::new()),
                fallback: Some(answer.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn sequence(answers: Vec<&str>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().map(str::to_string).collect()),
                fallback: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self::sequence(Vec::new())
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for FakeCompletion {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(answer) = self.answers.lock().unwrap().pop_front() {
                return Ok(answer);
            }
            self.fallback
                .clone()
                .ok_or_else(|| Error::Upstream("AI endpoint returned 503".to_string()))
        }
    }
}
