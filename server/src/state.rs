//! Application state shared by all handlers.

use lookout_db::JobStore;
use lookout_engine::JobRunner;

/// Shared state: the runner that accepts jobs, and through it the store
/// that status polls read from.
#[derive(Clone)]
pub struct AppState {
    runner: JobRunner,
}

impl AppState {
    /// Create state around a configured runner.
    #[must_use]
    pub fn new(runner: JobRunner) -> Self {
        Self { runner }
    }

    /// Runner used to submit jobs.
    #[must_use]
    pub fn runner(&self) -> &JobRunner {
        &self.runner
    }

    /// Store used to read jobs.
    #[must_use]
    pub fn store(&self) -> &JobStore {
        self.runner.store()
    }
}
