//! Lookout Core - Foundation crate for the Lookout email reconnaissance service.
//!
//! This crate provides shared types, the search job model, error handling and
//! configuration management that all other Lookout crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`EmailAddress`, `JobId`, `SiteId`, `Timestamp`)
//! - [`outcome`] - Probe outcomes and the classified result set
//! - [`job`] - Search job record and its lifecycle transitions
//!
//! # Example
//!
//! ```rust
//! use lookout_core::{EmailAddress, Job, JobStatus};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let email = EmailAddress::parse("test@example.com")?;
//! let mut job = Job::new(email);
//! job.record_progress(10, "Loading modules...");
//! assert_eq!(job.status, JobStatus::Running);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod job;
pub mod outcome;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, ProbingConfig, ServerConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, LookoutError, Result};
pub use job::{Job, JobStatus, JobStatusView};
pub use outcome::{
    CheckMethod, ClassifiedResultSet, OutcomeBucket, ProbeOutcome, ProfileEntry, SiteInfo,
};
pub use types::{EmailAddress, JobId, SiteId, Timestamp};
