//! Errors that fail a whole search job.
//!
//! Per-probe failures never show up here; they become `error` outcomes.

use thiserror::Error;

/// Job-level failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The probe catalogue could not supply units.
    #[error("site catalogue unavailable: {0}")]
    Catalogue(#[from] lookout_sites::SiteError),

    /// The job store rejected a read or write.
    #[error("job store failure: {0}")]
    Store(#[from] lookout_db::DatabaseError),

    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
