//! Sources of probe units for a search.

use crate::error::{Result, SiteError};
use crate::loader::SiteLoader;
use crate::probe::{HttpProbe, ProbeUnit};
use crate::registry::SiteRegistry;
use std::sync::Arc;

/// Supplies the probe units a search should run.
///
/// Called once per job, so catalogues backed by disk pick up new definitions
/// without a restart.
pub trait ProbeCatalogue: Send + Sync {
    /// Load the units for one search.
    ///
    /// # Errors
    /// A failure here fails the whole job.
    fn load_units(&self) -> Result<Vec<Arc<dyn ProbeUnit>>>;
}

fn http_units(registry: &SiteRegistry) -> Result<Vec<Arc<dyn ProbeUnit>>> {
    let units: Vec<Arc<dyn ProbeUnit>> = registry
        .get_all()
        .into_iter()
        .map(|definition| Arc::new(HttpProbe::new(definition)) as Arc<dyn ProbeUnit>)
        .collect();

    if units.is_empty() {
        return Err(SiteError::EmptyCatalogue);
    }

    Ok(units)
}

impl ProbeCatalogue for SiteRegistry {
    fn load_units(&self) -> Result<Vec<Arc<dyn ProbeUnit>>> {
        http_units(self)
    }
}

impl ProbeCatalogue for SiteLoader {
    fn load_units(&self) -> Result<Vec<Arc<dyn ProbeUnit>>> {
        http_units(&SiteRegistry::load_from(self)?)
    }
}

/// Fixed set of units, mainly for embedding and tests.
#[derive(Clone, Default)]
pub struct StaticCatalogue {
    units: Vec<Arc<dyn ProbeUnit>>,
}

impl StaticCatalogue {
    /// Catalogue that always returns `units`.
    #[must_use]
    pub fn new(units: Vec<Arc<dyn ProbeUnit>>) -> Self {
        Self { units }
    }
}

impl ProbeCatalogue for StaticCatalogue {
    fn load_units(&self) -> Result<Vec<Arc<dyn ProbeUnit>>> {
        Ok(self.units.clone())
    }
}
