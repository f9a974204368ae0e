//! Critic Core - asynchronous AI review of GitHub pull requests
//!
//! This crate holds the analysis engine, the task dispatcher and the
//! result/cache/task stores. The HTTP surface lives in `critic-api` and the
//! GitHub client in `critic-github`.

pub mod analysis;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod secrets;
pub mod store;

pub use analysis::{Analyzer, ChatCompletionClient, CompletionClient, SourceHost};
pub use config::{CliOverrides, Config};
pub use dispatch::{DispatchSettings, Dispatcher, RetryPolicy};
pub use error::{Error, Result};
pub use model::{
    AnalysisRequest, AnalysisResult, FileDiff, FileReport, FileStatus, Issue, IssueKind, Summary,
    TaskId, TaskStatus,
};
pub use secrets::Secrets;
pub use store::{CacheKey, CacheStore, MemoryStore, ResultStore, Stores, TaskRecord, TaskStore};
