//! Persistent search job store.
//!
//! Each job is a single row holding the full record as JSON. Every write is
//! a read-modify-write of that record, committed by one `UPDATE` guarded on
//! the row's `version`, so a reader always sees a whole record.

use crate::error::{DatabaseError, Result};
use lookout_core::{ClassifiedResultSet, EmailAddress, Job, JobId, LookoutError, Timestamp};
use sqlx::SqlitePool;
use std::time::Duration;

/// Message set on jobs that were still running when the process stopped.
pub const INTERRUPTED_MESSAGE: &str = "Interrupted by server restart";

/// Store for search job records.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct JobStore {
    pool: SqlitePool,
}

impl JobStore {
    /// Create a store over an already migrated pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create and persist a fresh running job for `email`.
    pub async fn init(&self, email: EmailAddress) -> Result<Job> {
        let job = Job::new(email);
        let record = serde_json::to_string(&job)?;
        let now = Timestamp::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO search_jobs (id, status, record, version, created_at, updated_at)
             VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(job.id.as_str())
        .bind(job.status.as_str())
        .bind(&record)
        .bind(job.created_at.to_rfc3339())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(job_id = %job.id, "search job created");

        Ok(job)
    }

    /// Read a job. Unknown ids yield `None`.
    pub async fn read(&self, id: &JobId) -> Result<Option<Job>> {
        Ok(self.fetch(id).await?.map(|(job, _)| job))
    }

    /// Record progress on a running job.
    ///
    /// Returns `Ok(false)` without writing if the job is already terminal.
    pub async fn update_progress(&self, id: &JobId, progress: u8, message: &str) -> Result<bool> {
        let changed = self
            .modify(id, |job| Ok(job.record_progress(progress, message)))
            .await?;

        if !changed {
            tracing::debug!(job_id = %id, progress, "ignoring progress update on finished job");
        }

        Ok(changed)
    }

    /// Attach final results and mark the job completed.
    ///
    /// Finalizing twice with identical results is a no-op returning
    /// `Ok(false)`.
    ///
    /// # Errors
    /// Returns `DatabaseError::Transition` if the job failed or was already
    /// completed with different results.
    pub async fn finalize(&self, id: &JobId, results: ClassifiedResultSet) -> Result<bool> {
        let found = results.found_count;
        let changed = self.modify(id, move |job| job.complete(results)).await?;

        if changed {
            tracing::info!(job_id = %id, found, "search job completed");
        } else {
            tracing::debug!(job_id = %id, "job already finalized with identical results");
        }

        Ok(changed)
    }

    /// Mark the job failed. No-op (returning `Ok(false)`) on a terminal job.
    pub async fn mark_error(&self, id: &JobId, message: &str) -> Result<bool> {
        let changed = self.modify(id, |job| Ok(job.fail(message))).await?;

        if changed {
            tracing::info!(job_id = %id, message, "search job failed");
        } else {
            tracing::debug!(job_id = %id, "ignoring failure on finished job");
        }

        Ok(changed)
    }

    /// Fail every job still marked running.
    ///
    /// Used at startup: nothing can be driving those jobs any more.
    pub async fn mark_interrupted(&self) -> Result<u64> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM search_jobs WHERE status = 'running'")
                .fetch_all(&self.pool)
                .await?;

        let mut interrupted = 0;
        for id in ids {
            let id = JobId::new(id).map_err(|e| DatabaseError::Decode(e.to_string()))?;
            if self.mark_error(&id, INTERRUPTED_MESSAGE).await? {
                interrupted += 1;
            }
        }

        if interrupted > 0 {
            tracing::warn!(count = interrupted, "marked interrupted jobs as failed");
        }

        Ok(interrupted)
    }

    /// Delete finished jobs whose last update is older than `retention`.
    ///
    /// Running jobs are never deleted.
    pub async fn purge_expired(&self, retention: Duration) -> Result<u64> {
        let retention = chrono::TimeDelta::from_std(retention)
            .map_err(|e| DatabaseError::Decode(format!("retention out of range: {e}")))?;
        let cutoff = Timestamp::from_datetime(chrono::Utc::now() - retention).to_rfc3339();

        let result =
            sqlx::query("DELETE FROM search_jobs WHERE status != 'running' AND updated_at < ?")
                .bind(&cutoff)
                .execute(&self.pool)
                .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::info!(count = purged, "purged expired jobs");
        }

        Ok(purged)
    }

    /// Number of stored jobs.
    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM search_jobs")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<(Job, i64)>> {
        let row = sqlx::query_as::<_, (String, i64)>(
            "SELECT record, version FROM search_jobs WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(record, version)| {
            serde_json::from_str::<Job>(&record)
                .map(|job| (job, version))
                .map_err(|e| DatabaseError::Decode(format!("job {id}: {e}")))
        })
        .transpose()
    }

    /// Apply `change` to the stored record and write it back if it reports a
    /// change.
    async fn modify<F>(&self, id: &JobId, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Job) -> std::result::Result<bool, LookoutError>,
    {
        let Some((mut job, version)) = self.fetch(id).await? else {
            return Err(DatabaseError::NotFound {
                job_id: id.to_string(),
            });
        };

        if !change(&mut job)? {
            return Ok(false);
        }

        self.replace(&job, version).await?;
        Ok(true)
    }

    /// Write `job` over the stored record if it is still at `version`.
    async fn replace(&self, job: &Job, version: i64) -> Result<()> {
        let record = serde_json::to_string(job)?;
        let result = sqlx::query(
            "UPDATE search_jobs
             SET record = ?, status = ?, version = version + 1, updated_at = ?
             WHERE id = ? AND version = ?",
        )
        .bind(&record)
        .bind(job.status.as_str())
        .bind(Timestamp::now().to_rfc3339())
        .bind(job.id.as_str())
        .bind(version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Conflict {
                job_id: job.id.to_string(),
            });
        }

        Ok(())
    }
}
