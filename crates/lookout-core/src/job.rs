//! Search job record and its lifecycle state machine.
//!
//! A job moves `running -> completed` or `running -> error` and never leaves a
//! terminal state. All mutation goes through the transition methods on
//! [`Job`], which keeps `results` and `status` consistent: results are only
//! ever attached together with the `completed` status.

use crate::error::LookoutError;
use crate::outcome::ClassifiedResultSet;
use crate::types::{EmailAddress, JobId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a search job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Probes are being executed
    Running,
    /// Results are attached and final
    Completed,
    /// The job failed as a whole
    Error,
}

impl JobStatus {
    /// Whether the status can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Storage/wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One email search, from submission to final results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier
    pub id: JobId,
    /// Email being searched
    pub email: EmailAddress,
    /// Current lifecycle status
    pub status: JobStatus,
    /// Progress percentage, 0-100
    pub progress: u8,
    /// Description of the current phase
    pub message: String,
    /// Final results, present only once completed
    pub results: Option<ClassifiedResultSet>,
    /// When the job was submitted
    pub created_at: Timestamp,
    /// When the job reached a terminal state
    pub completed_at: Option<Timestamp>,
}

impl Job {
    /// Message a freshly submitted job starts with.
    pub const INITIAL_MESSAGE: &'static str = "Starting search...";

    /// Create a new running job with a fresh ID.
    #[must_use]
    pub fn new(email: EmailAddress) -> Self {
        Self {
            id: JobId::generate(),
            email,
            status: JobStatus::Running,
            progress: 0,
            message: Self::INITIAL_MESSAGE.to_string(),
            results: None,
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// Whether the job reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record progress while running.
    ///
    /// Progress is clamped to 100 and never decreases. Returns `false`, and
    /// leaves the job untouched, if the job is already terminal.
    pub fn record_progress(&mut self, progress: u8, message: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }

        self.progress = self.progress.max(progress.min(100));
        self.message = message.into();
        true
    }

    /// Attach final results and mark the job completed.
    ///
    /// Returns `Ok(false)` if the job was already completed with identical
    /// results.
    ///
    /// # Errors
    /// Returns `LookoutError::InvalidTransition` if the job failed, or was
    /// already completed with different results.
    pub fn complete(&mut self, results: ClassifiedResultSet) -> Result<bool, LookoutError> {
        match self.status {
            JobStatus::Running => {
                self.message = format!("Found {} accounts", results.found_count);
                self.results = Some(results);
                self.status = JobStatus::Completed;
                self.progress = 100;
                self.completed_at = Some(Timestamp::now());
                Ok(true)
            }
            JobStatus::Completed if self.results.as_ref() == Some(&results) => Ok(false),
            JobStatus::Completed => Err(self.refuse("already completed with different results")),
            JobStatus::Error => Err(self.refuse("job already failed")),
        }
    }

    /// Mark the job failed.
    ///
    /// Returns `false`, and leaves the job untouched, if it is already
    /// terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }

        self.status = JobStatus::Error;
        self.message = message.into();
        self.completed_at = Some(Timestamp::now());
        true
    }

    /// Snapshot for status polling.
    #[must_use]
    pub fn status_view(&self) -> JobStatusView {
        JobStatusView {
            status: self.status,
            progress: self.progress,
            message: self.message.clone(),
        }
    }

    /// Results, only if the job completed.
    #[must_use]
    pub fn completed_results(&self) -> Option<&ClassifiedResultSet> {
        match self.status {
            JobStatus::Completed => self.results.as_ref(),
            JobStatus::Running | JobStatus::Error => None,
        }
    }

    fn refuse(&self, reason: &str) -> LookoutError {
        LookoutError::InvalidTransition {
            job_id: self.id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// What a status poll returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusView {
    /// Current lifecycle status
    pub status: JobStatus,
    /// Progress percentage
    pub progress: u8,
    /// Description of the current phase
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(found_count: usize) -> ClassifiedResultSet {
        ClassifiedResultSet {
            email: "test@example.com".to_string(),
            found: Vec::new(),
            not_found: Vec::new(),
            rate_limited: Vec::new(),
            error: Vec::new(),
            total_sites: 0,
            found_count,
            not_found_count: 0,
            rate_limited_count: 0,
            error_count: 0,
            search_time: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn job() -> Job {
        Job::new(EmailAddress::parse("test@example.com").expect("valid email"))
    }

    #[test]
    fn test_new_job_is_running() {
        let job = job();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 0);
        assert_eq!(job.message, "Starting search...");
        assert!(job.results.is_none());
        assert!(job.completed_results().is_none());
    }

    #[test]
    fn test_progress_never_decreases_and_is_clamped() {
        let mut job = job();
        assert!(job.record_progress(20, "Checking 3 websites..."));
        assert!(job.record_progress(10, "late update"));
        assert_eq!(job.progress, 20);
        assert_eq!(job.message, "late update");

        job.record_progress(250, "overflow");
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_complete_sets_results_atomically() {
        let mut job = job();
        assert!(job.complete(results(2)).expect("complete"));
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(job.message, "Found 2 accounts");
        assert!(job.completed_at.is_some());
        assert_eq!(job.completed_results(), Some(&results(2)));
    }

    #[test]
    fn test_terminal_job_ignores_progress() {
        let mut job = job();
        job.complete(results(1)).expect("complete");
        let before = job.clone();

        assert!(!job.record_progress(50, "should not apply"));
        assert!(!job.fail("should not apply"));
        assert_eq!(job, before);
    }

    #[test]
    fn test_complete_is_idempotent_for_identical_results() {
        let mut job = job();
        job.complete(results(1)).expect("first complete");
        let before = job.clone();

        assert!(!job.complete(results(1)).expect("second complete"));
        assert_eq!(job, before);
    }

    #[test]
    fn test_complete_with_different_results_is_refused() {
        let mut job = job();
        job.complete(results(1)).expect("first complete");
        let err = job.complete(results(5)).unwrap_err();
        assert!(matches!(err, LookoutError::InvalidTransition { .. }));
        assert_eq!(job.results.as_ref().map(|r| r.found_count), Some(1));
    }

    #[test]
    fn test_failed_job_cannot_complete() {
        let mut job = job();
        assert!(job.fail("Error: catalogue unavailable"));
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.complete(results(0)).is_err());
        assert!(job.results.is_none());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&JobStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }
}
