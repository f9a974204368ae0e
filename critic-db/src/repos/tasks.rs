//! Repository for submitted tasks

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{Error, Result};

/// A row of the `tasks` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TaskRow {
    pub task_id: String,
    pub repo_url: String,
    pub pr_number: i64,
    pub status: String,
    pub attempts: i64,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    /// Create a new row in the given status
    pub fn new(
        task_id: impl Into<String>,
        repo_url: impl Into<String>,
        pr_number: i64,
        status: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            repo_url: repo_url.into(),
            pr_number,
            status: status.into(),
            attempts: 0,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository for managing task rows
#[derive(Debug, Clone)]
pub struct TasksRepo {
    pool: SqlitePool,
}

impl TasksRepo {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new task row
    pub async fn insert(&self, row: &TaskRow) -> Result<()> {
        sqlx::query(
            "INSERT INTO tasks (task_id, repo_url, pr_number, status, attempts, error, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.task_id)
        .bind(&row.repo_url)
        .bind(row.pr_number)
        .bind(&row.status)
        .bind(row.attempts)
        .bind(&row.error)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update a task's status, attempt count and last error
    pub async fn update_status(
        &self,
        task_id: &str,
        status: &str,
        attempts: i64,
        error: Option<&str>,
    ) -> Result<()> {
        let outcome = sqlx::query(
            "UPDATE tasks SET status = ?, attempts = ?, error = ?, updated_at = ? WHERE task_id = ?",
        )
        .bind(status)
        .bind(attempts)
        .bind(error)
        .bind(Utc::now())
        .bind(task_id)
        .execute(&self.pool)
        .await?;

        if outcome.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Task {} not found", task_id)));
        }

        Ok(())
    }

    /// Find a task by id
    pub async fn find(&self, task_id: &str) -> Result<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT task_id, repo_url, pr_number, status, attempts, error, created_at, updated_at
             FROM tasks WHERE task_id = ?",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Mark every task still in one of `unfinished` as failed (useful on startup)
    pub async fn fail_unfinished(&self, unfinished: &[&str], error: &str) -> Result<u64> {
        let mut total = 0;
        for status in unfinished {
            let outcome = sqlx::query(
                "UPDATE tasks SET status = 'failed', error = ?, updated_at = ? WHERE status = ?",
            )
            .bind(error)
            .bind(Utc::now())
            .bind(*status)
            .execute(&self.pool)
            .await?;
            total += outcome.rows_affected();
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use tempfile::TempDir;

    async fn database(temp_dir: &TempDir) -> Database {
        Database::new(temp_dir.path().join("test.db")).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_task() {
        let temp_dir = TempDir::new().unwrap();
        let repo = database(&temp_dir).await.tasks();

        let row = TaskRow::new("task-1", "https://github.com/acme/widgets", 42, "pending");
        repo.insert(&row).await.unwrap();

        let found = repo.find("task-1").await.unwrap().unwrap();
        assert_eq!(found.repo_url, "https://github.com/acme/widgets");
        assert_eq!(found.pr_number, 42);
        assert_eq!(found.status, "pending");
        assert_eq!(found.attempts, 0);

        assert!(repo.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status() {
        let temp_dir = TempDir::new().unwrap();
        let repo = database(&temp_dir).await.tasks();

        repo.insert(&TaskRow::new("task-1", "https://github.com/a/b", 1, "pending"))
            .await
            .unwrap();
        repo.update_status("task-1", "failed", 4, Some("upstream 502"))
            .await
            .unwrap();

        let found = repo.find("task-1").await.unwrap().unwrap();
        assert_eq!(found.status, "failed");
        assert_eq!(found.attempts, 4);
        assert_eq!(found.error.as_deref(), Some("upstream 502"));
    }

    #[tokio::test]
    async fn test_update_missing_task_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let repo = database(&temp_dir).await.tasks();

        let err = repo
            .update_status("ghost", "processing", 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fail_unfinished() {
        let temp_dir = TempDir::new().unwrap();
        let repo = database(&temp_dir).await.tasks();

        repo.insert(&TaskRow::new("a", "https://github.com/a/b", 1, "pending")).await.unwrap();
        repo.insert(&TaskRow::new("b", "https://github.com/a/b", 2, "processing")).await.unwrap();
        repo.insert(&TaskRow::new("c", "https://github.com/a/b", 3, "completed")).await.unwrap();

        let count = repo
            .fail_unfinished(&["pending", "processing"], "interrupted")
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(repo.find("a").await.unwrap().unwrap().status, "failed");
        assert_eq!(repo.find("c").await.unwrap().unwrap().status, "completed");
    }
}
