//! Store traits backed by the SQLite database

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use critic_db::{Database, TaskRow};

use super::{CacheKey, CacheStore, ResultStore, TaskRecord, TaskStore};
use crate::model::{AnalysisRequest, AnalysisResult, TaskId, TaskStatus};
use crate::{Error, Result};

const INTERRUPTED: &str = "interrupted by restart";

#[async_trait]
impl ResultStore for Database {
    async fn put_result(&self, task_id: &TaskId, result: &AnalysisResult) -> Result<bool> {
        let json = serde_json::to_string(result)?;
        Ok(self.results().insert_if_absent(task_id.as_str(), &json).await?)
    }

    async fn get_result(&self, task_id: &TaskId) -> Result<Option<AnalysisResult>> {
        match self.results().get(task_id.as_str()).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CacheStore for Database {
    async fn get_cached(&self, key: &CacheKey) -> Result<Option<AnalysisResult>> {
        match self.cache().get(key.as_str(), Utc::now()).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put_cached(&self, key: &CacheKey, result: &AnalysisResult, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Config(format!("cache ttl out of range: {}", e)))?;
        let json = serde_json::to_string(result)?;
        self.cache().put(key.as_str(), &json, Utc::now() + ttl).await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        Ok(self.cache().purge_expired(Utc::now()).await?)
    }
}

#[async_trait]
impl TaskStore for Database {
    async fn create_task(&self, id: &TaskId, request: &AnalysisRequest) -> Result<()> {
        let pr_number = i64::try_from(request.pr_number)
            .map_err(|_| Error::InvalidRequest(format!("PR number too large: {}", request.pr_number)))?;
        let row = TaskRow::new(
            id.as_str(),
            &request.repo_url,
            pr_number,
            TaskStatus::Pending.as_str(),
        );
        self.tasks().insert(&row).await?;
        Ok(())
    }

    async fn update_task(
        &self,
        id: &TaskId,
        status: TaskStatus,
        attempts: u32,
        error: Option<&str>,
    ) -> Result<()> {
        self.tasks()
            .update_status(id.as_str(), status.as_str(), i64::from(attempts), error)
            .await?;
        Ok(())
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<TaskRecord>> {
        let Some(row) = self.tasks().find(id.as_str()).await? else {
            return Ok(None);
        };

        Ok(Some(TaskRecord {
            id: TaskId::from(row.task_id),
            repo_url: row.repo_url,
            pr_number: u64::try_from(row.pr_number).unwrap_or_default(),
            status: row.status.parse().unwrap_or(TaskStatus::Unknown),
            attempts: u32::try_from(row.attempts).unwrap_or_default(),
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    async fn fail_interrupted(&self) -> Result<u64> {
        let unfinished = [TaskStatus::Pending.as_str(), TaskStatus::Processing.as_str()];
        Ok(self.tasks().fail_unfinished(&unfinished, INTERRUPTED).await?)
    }
}
