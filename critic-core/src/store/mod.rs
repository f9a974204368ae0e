//! Result, cache and task stores
//!
//! Three key-partitioned namespaces: task id → result (write once),
//! fingerprint of (repository, PR) → result with expiry, and task id → status.
//! Writes to different namespaces are independent; nothing is rolled back.

mod memory;
#[cfg(feature = "database")]
mod sqlite;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::{AnalysisRequest, AnalysisResult, TaskId, TaskStatus};
use crate::Result;

pub use memory::MemoryStore;

/// Deterministic fingerprint of (repository URL, PR number)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// SHA-256 of `"{repo_url}_pr_{pr_number}"`, lowercase hex
    pub fn new(repo_url: &str, pr_number: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}_pr_{}", repo_url, pr_number).as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn for_request(request: &AnalysisRequest) -> Self {
        Self::new(&request.repo_url, request.pr_number)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completed results keyed by task id
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Store a task's result unless one is already present
    ///
    /// Returns `false` when an earlier result was kept.
    async fn put_result(&self, task_id: &TaskId, result: &AnalysisResult) -> Result<bool>;

    async fn get_result(&self, task_id: &TaskId) -> Result<Option<AnalysisResult>>;
}

/// Memoized analyses keyed by [`CacheKey`], with expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the entry if present and not yet expired
    async fn get_cached(&self, key: &CacheKey) -> Result<Option<AnalysisResult>>;

    /// Insert or replace an entry
    async fn put_cached(&self, key: &CacheKey, result: &AnalysisResult, ttl: Duration) -> Result<()>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> Result<u64>;
}

/// Persisted view of a submitted task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub repo_url: String,
    pub pr_number: u64,
    pub status: TaskStatus,
    pub attempts: u32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task status namespace, written by the dispatcher only
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Record a new task as pending
    async fn create_task(&self, id: &TaskId, request: &AnalysisRequest) -> Result<()>;

    /// Move a task to `status`, noting the attempt count and last error
    async fn update_task(
        &self,
        id: &TaskId,
        status: TaskStatus,
        attempts: u32,
        error: Option<&str>,
    ) -> Result<()>;

    async fn get_task(&self, id: &TaskId) -> Result<Option<TaskRecord>>;

    /// Mark tasks a previous process left unfinished as failed
    async fn fail_interrupted(&self) -> Result<u64>;
}

/// The three stores a dispatcher and API need
#[derive(Clone)]
pub struct Stores {
    pub results: Arc<dyn ResultStore>,
    pub cache: Arc<dyn CacheStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl Stores {
    /// Use one backend for every namespace
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ResultStore + CacheStore + TaskStore + 'static,
    {
        Self {
            results: store.clone(),
            cache: store.clone(),
            tasks: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
