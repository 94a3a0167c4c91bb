//! In-memory site definition registry.

use crate::{
    definition::SiteDefinition,
    error::Result,
    loader::SiteLoader,
};
use lookout_core::SiteId;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-memory cache of site definitions.
///
/// Definitions are kept ordered by site ID so that catalogues built from the
/// registry are deterministic.
#[derive(Clone, Default)]
pub struct SiteRegistry {
    definitions: Arc<RwLock<BTreeMap<SiteId, SiteDefinition>>>,
}

impl SiteRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry and load all definitions from the given loader.
    pub fn load_from(loader: &SiteLoader) -> Result<Self> {
        let registry = Self::new();
        registry.reload(loader)?;
        Ok(registry)
    }

    /// Replace the cache with freshly loaded definitions.
    pub fn reload(&self, loader: &SiteLoader) -> Result<()> {
        let definitions = loader.load_all()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        cache.clear();
        for definition in definitions {
            cache.insert(definition.id().clone(), definition);
        }

        info!(count = cache.len(), "reloaded site definitions");

        Ok(())
    }

    /// All definitions, ordered by site ID.
    #[must_use]
    pub fn get_all(&self) -> Vec<SiteDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.values().cloned().collect()
    }

    /// Number of sites in the registry.
    #[must_use]
    pub fn count(&self) -> usize {
        self.definitions
            .read()
            .expect("acquire read lock on definitions")
            .len()
    }

    /// Add or replace a site definition.
    pub fn insert(&self, definition: SiteDefinition) -> Result<()> {
        definition.validate()?;

        let site_id = definition.id().clone();
        self.definitions
            .write()
            .expect("acquire write lock on definitions")
            .insert(site_id.clone(), definition);

        debug!(site_id = %site_id, "inserted site definition");

        Ok(())
    }
}
