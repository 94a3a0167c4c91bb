//! Database error types.

use lookout_core::LookoutError;
use thiserror::Error;

/// Database-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open or create database connection.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// No job with this id exists.
    #[error("job not found: {job_id}")]
    NotFound {
        /// The id that was looked up
        job_id: String,
    },

    /// The record changed between read and write.
    #[error("concurrent modification of job {job_id}")]
    Conflict {
        /// Job that was being written
        job_id: String,
    },

    /// The requested lifecycle transition is not allowed.
    #[error(transparent)]
    Transition(#[from] LookoutError),

    /// Failed to decode database value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Serialization/deserialization of a job record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error during database operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_is_transparent() {
        let err = DatabaseError::from(LookoutError::InvalidTransition {
            job_id: "abc".to_string(),
            reason: "job already failed".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "invalid transition for job abc: job already failed"
        );
    }

    #[test]
    fn test_not_found_names_the_job() {
        let err = DatabaseError::NotFound {
            job_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "job not found: abc");
    }
}
