//! Repository for completed task results

use chrono::Utc;
use sqlx::SqlitePool;

use crate::Result;

/// Task id → serialized result, written at most once per task
#[derive(Debug, Clone)]
pub struct TaskResultsRepo {
    pool: SqlitePool,
}

impl TaskResultsRepo {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a result unless the task already has one
    ///
    /// Returns `true` when the row was written.
    pub async fn insert_if_absent(&self, task_id: &str, result_json: &str) -> Result<bool> {
        let outcome = sqlx::query(
            "INSERT OR IGNORE INTO task_results (task_id, result_json, created_at)
             VALUES (?, ?, ?)",
        )
        .bind(task_id)
        .bind(result_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(outcome.rows_affected() == 1)
    }

    /// Fetch a task's result
    pub async fn get(&self, task_id: &str) -> Result<Option<String>> {
        let json = sqlx::query_scalar::<_, String>("SELECT result_json FROM task_results WHERE task_id = ?")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(json)
    }
}
