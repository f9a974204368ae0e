//! In-process store, used by tests and `critic analyze`

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;

use super::{CacheKey, CacheStore, ResultStore, TaskRecord, TaskStore};
use crate::model::{AnalysisRequest, AnalysisResult, TaskId, TaskStatus};
use crate::{Error, Result};

#[derive(Debug)]
struct CachedResult {
    result: AnalysisResult,
    expires_at: Instant,
}

/// All three namespaces held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: Mutex<HashMap<TaskId, AnalysisResult>>,
    cache: Mutex<HashMap<CacheKey, CachedResult>>,
    tasks: Mutex<HashMap<TaskId, TaskRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Store("memory store lock poisoned".to_string())
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn put_result(&self, task_id: &TaskId, result: &AnalysisResult) -> Result<bool> {
        let mut results = self.results.lock().map_err(poisoned)?;
        if results.contains_key(task_id) {
            return Ok(false);
        }
        results.insert(task_id.clone(), result.clone());
        Ok(true)
    }

    async fn get_result(&self, task_id: &TaskId) -> Result<Option<AnalysisResult>> {
        let results = self.results.lock().map_err(poisoned)?;
        Ok(results.get(task_id).cloned())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_cached(&self, key: &CacheKey) -> Result<Option<AnalysisResult>> {
        let cache = self.cache.lock().map_err(poisoned)?;
        Ok(cache
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.result.clone()))
    }

    async fn put_cached(&self, key: &CacheKey, result: &AnalysisResult, ttl: Duration) -> Result<()> {
        let mut cache = self.cache.lock().map_err(poisoned)?;
        cache.insert(
            key.clone(),
            CachedResult {
                result: result.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let mut cache = self.cache.lock().map_err(poisoned)?;
        let before = cache.len();
        let now = Instant::now();
        cache.retain(|_, entry| entry.expires_at > now);
        Ok((before - cache.len()) as u64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, id: &TaskId, request: &AnalysisRequest) -> Result<()> {
        let now = Utc::now();
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        tasks.insert(
            id.clone(),
            TaskRecord {
                id: id.clone(),
                repo_url: request.repo_url.clone(),
                pr_number: request.pr_number,
                status: TaskStatus::Pending,
                attempts: 0,
                error: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn update_task(
        &self,
        id: &TaskId,
        status: TaskStatus,
        attempts: u32,
        error: Option<&str>,
    ) -> Result<()> {
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        let record = tasks
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("task {}", id)))?;
        record.status = status;
        record.attempts = attempts;
        record.error = error.map(str::to_string);
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<TaskRecord>> {
        let tasks = self.tasks.lock().map_err(poisoned)?;
        Ok(tasks.get(id).cloned())
    }

    async fn fail_interrupted(&self) -> Result<u64> {
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        let mut count = 0;
        for record in tasks.values_mut().filter(|r| !r.status.is_terminal()) {
            record.status = TaskStatus::Failed;
            record.error = Some("interrupted by restart".to_string());
            record.updated_at = Utc::now();
            count += 1;
        }
        Ok(count)
    }
}
