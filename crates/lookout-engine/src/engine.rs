//! Concurrent probe execution.
//!
//! The engine runs every probe unit of a search against one email and one
//! shared HTTP client, and returns only once every unit has produced an
//! outcome. Probes are polled from the caller's task through a
//! `FuturesUnordered`, so none of them can outlive [`ProbeEngine::run`].

use crate::error::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use lookout_core::{EmailAddress, ProbeOutcome, ProbingConfig};
use lookout_sites::ProbeUnit;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Probe execution settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time a single probe may take before it is recorded as an error
    pub probe_timeout: Duration,
    /// Cap on probes running at once (`None` = all at once)
    pub max_in_flight: Option<usize>,
    /// User agent for the shared client
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&ProbingConfig::default())
    }
}

impl From<&ProbingConfig> for EngineConfig {
    fn from(config: &ProbingConfig) -> Self {
        Self {
            probe_timeout: config.timeout(),
            max_in_flight: config.max_concurrent_probes,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Runs probe units concurrently.
#[derive(Debug, Clone, Default)]
pub struct ProbeEngine {
    config: EngineConfig,
}

impl ProbeEngine {
    /// Create an engine.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine settings.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run all `units` against `email`.
    ///
    /// Builds a client for this run; it is dropped once every probe has
    /// resolved.
    ///
    /// # Errors
    /// Only fails if the HTTP client cannot be built. Individual probe
    /// failures, timeouts and panics are reported as `error` outcomes.
    pub async fn run(
        &self,
        email: &EmailAddress,
        units: &[Arc<dyn ProbeUnit>],
    ) -> Result<Vec<ProbeOutcome>> {
        let client = reqwest::Client::builder()
            .user_agent(&self.config.user_agent)
            .build()?;

        Ok(self.run_with_client(email, units, &client).await)
    }

    /// Run all `units` against `email` with an existing client.
    ///
    /// Returns one outcome per unit, sorted by site name then domain.
    pub async fn run_with_client(
        &self,
        email: &EmailAddress,
        units: &[Arc<dyn ProbeUnit>],
        client: &reqwest::Client,
    ) -> Vec<ProbeOutcome> {
        let max_in_flight = self.config.max_in_flight.unwrap_or(usize::MAX).max(1);
        let mut futures = FuturesUnordered::new();
        let mut outcomes = Vec::with_capacity(units.len());

        tracing::debug!(count = units.len(), "launching probes");

        for unit in units {
            futures.push(guarded_probe(
                unit.as_ref(),
                email,
                client,
                self.config.probe_timeout,
            ));

            while futures.len() >= max_in_flight {
                if let Some(outcome) = futures.next().await {
                    outcomes.push(outcome);
                }
            }
        }

        while let Some(outcome) = futures.next().await {
            outcomes.push(outcome);
        }

        outcomes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.domain.cmp(&b.domain)));
        outcomes
    }
}

/// Run one probe, turning a timeout or panic into an `error` outcome.
async fn guarded_probe(
    unit: &dyn ProbeUnit,
    email: &EmailAddress,
    client: &reqwest::Client,
    timeout: Duration,
) -> ProbeOutcome {
    let site = unit.site();
    let probe = AssertUnwindSafe(unit.probe(email, client)).catch_unwind();

    match tokio::time::timeout(timeout, probe).await {
        Ok(Ok(outcome)) => {
            tracing::debug!(site = %site.name, bucket = ?outcome.bucket(), "probe finished");
            outcome
        }
        Ok(Err(_)) => {
            tracing::warn!(site = %site.name, "probe panicked");
            ProbeOutcome::failed(site)
        }
        Err(_) => {
            tracing::warn!(site = %site.name, timeout = ?timeout, "probe timed out");
            ProbeOutcome::failed(site)
        }
    }
}
