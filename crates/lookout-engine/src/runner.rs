//! Background execution of search jobs.
//!
//! [`JobRunner::submit`] persists a new job and hands it to a spawned task;
//! from then on the only channel to pollers is the job store.

use crate::classifier::classify;
use crate::engine::ProbeEngine;
use crate::error::Result;
use futures::FutureExt;
use lookout_core::{EmailAddress, Job, JobId};
use lookout_db::JobStore;
use lookout_sites::ProbeCatalogue;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Drives jobs from `running` to a terminal state.
#[derive(Clone)]
pub struct JobRunner {
    store: JobStore,
    catalogue: Arc<dyn ProbeCatalogue>,
    engine: Arc<ProbeEngine>,
    job_slots: Option<Arc<Semaphore>>,
}

impl JobRunner {
    /// Create a runner with no limit on concurrent jobs.
    #[must_use]
    pub fn new(store: JobStore, catalogue: Arc<dyn ProbeCatalogue>, engine: ProbeEngine) -> Self {
        Self {
            store,
            catalogue,
            engine: Arc::new(engine),
            job_slots: None,
        }
    }

    /// Let at most `max` jobs execute at once. Further jobs stay `running`
    /// at progress 0 until a slot frees up.
    #[must_use]
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.job_slots = Some(Arc::new(Semaphore::new(max.max(1))));
        self
    }

    /// Job store this runner writes to.
    #[must_use]
    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Create a job for `email` and start it in the background.
    ///
    /// Returns as soon as the job record exists.
    pub async fn submit(&self, email: EmailAddress) -> Result<JobId> {
        let (id, _task) = self.spawn(email).await?;
        Ok(id)
    }

    /// Like [`JobRunner::submit`], also returning the background task.
    pub async fn spawn(&self, email: EmailAddress) -> Result<(JobId, JoinHandle<()>)> {
        let job = self.store.init(email).await?;
        let id = job.id.clone();

        let runner = self.clone();
        let task = tokio::spawn(async move { runner.execute(job).await });

        Ok((id, task))
    }

    /// Run `job` to completion, recording any failure on the job itself.
    pub async fn execute(&self, job: Job) {
        let _slot = match &self.job_slots {
            Some(slots) => slots.clone().acquire_owned().await.ok(),
            None => None,
        };

        let failure = match AssertUnwindSafe(self.run_steps(&job.id, &job.email))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("job panicked: {}", panic_message(panic.as_ref())),
        };

        tracing::error!(job_id = %job.id, error = %failure, "search job failed");

        if let Err(store_err) = self
            .store
            .mark_error(&job.id, &format!("Error: {failure}"))
            .await
        {
            tracing::error!(
                job_id = %job.id,
                error = %store_err,
                "failed to record job failure"
            );
        }
    }

    async fn run_steps(&self, id: &JobId, email: &EmailAddress) -> Result<()> {
        self.store
            .update_progress(id, 10, "Loading modules...")
            .await?;
        let units = self.catalogue.load_units()?;

        tracing::info!(job_id = %id, count = units.len(), "checking sites");
        self.store
            .update_progress(id, 20, &format!("Checking {} websites...", units.len()))
            .await?;

        let outcomes = self.engine.run(email, &units).await?;

        self.store
            .update_progress(id, 90, "Processing results...")
            .await?;

        let results = classify(email, outcomes, units.len());
        self.store.finalize(id, results).await?;

        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
