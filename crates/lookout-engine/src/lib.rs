//! Lookout Engine - Search job execution.
//!
//! Runs the probe units of a search concurrently, classifies what comes back
//! and moves the job to its terminal state in the job store.
//!
//! # Features
//!
//! - One background task per job, optionally capped by a semaphore
//! - Concurrent probing with a per-probe timeout and panic containment
//! - Deterministic result ordering and classification
//!
//! # Example
//!
//! ```rust,ignore
//! use lookout_engine::{JobRunner, ProbeEngine};
//! use std::sync::Arc;
//!
//! let runner = JobRunner::new(db.jobs(), Arc::new(registry), ProbeEngine::default());
//! let job_id = runner.submit(EmailAddress::parse("test@example.com")?).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod classifier;
pub mod engine;
pub mod error;
pub mod runner;

// Re-export commonly used types
pub use classifier::{classify, classify_at};
pub use engine::{EngineConfig, ProbeEngine, DEFAULT_PROBE_TIMEOUT};
pub use error::{EngineError, Result};
pub use runner::JobRunner;
