//! Repository for the per-pull-request analysis cache

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::Result;

/// Cache key → serialized result with an absolute expiry
#[derive(Debug, Clone)]
pub struct AnalysisCacheRepo {
    pool: SqlitePool,
}

impl AnalysisCacheRepo {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch an entry that has not expired at `now`
    pub async fn get(&self, cache_key: &str, now: DateTime<Utc>) -> Result<Option<String>> {
        let json = sqlx::query_scalar::<_, String>(
            "SELECT result_json FROM analysis_cache WHERE cache_key = ? AND expires_at > ?",
        )
        .bind(cache_key)
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        Ok(json)
    }

    /// Insert or replace an entry (last writer wins)
    pub async fn put(&self, cache_key: &str, result_json: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO analysis_cache (cache_key, result_json, expires_at)
             VALUES (?, ?, ?)",
        )
        .bind(cache_key)
        .bind(result_json)
        .bind(expires_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete entries that expired at or before `now`
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let outcome = sqlx::query("DELETE FROM analysis_cache WHERE expires_at <= ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;

        let purged = outcome.rows_affected();
        if purged > 0 {
            debug!(purged, "Purged expired cache entries");
        }
        Ok(purged)
    }
}
