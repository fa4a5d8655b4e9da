//! Registry for remote store backends

use crate::remote_store::{BoxedRemoteStore, SharedRemoteStore};
use anyhow::{anyhow, Result};
use efishpond_types::StoreConfig;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Function that creates a remote store
pub type StoreFactory = fn() -> BoxedRemoteStore;

/// Information about a registered store backend
#[derive(Debug, Clone)]
pub struct StoreInfo {
    pub id: String,
    pub display_name: String,
}

/// Registry for remote store backends
///
/// Built-in backends are registered at startup by `efishpond-sources`.
pub struct Registry {
    stores: HashMap<String, StoreFactory>,
    store_info: HashMap<String, StoreInfo>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            stores: HashMap::new(),
            store_info: HashMap::new(),
        }
    }

    /// Register a store backend
    pub fn register_store(&mut self, id: &str, factory: StoreFactory) {
        log::debug!("Registered store backend {}", id);
        self.stores.insert(id.to_string(), factory);
    }

    /// Register a store backend with a display name
    pub fn register_store_with_info(&mut self, id: &str, display_name: &str, factory: StoreFactory) {
        self.register_store(id, factory);
        self.store_info.insert(
            id.to_string(),
            StoreInfo {
                id: id.to_string(),
                display_name: display_name.to_string(),
            },
        );
    }

    /// Create a store by ID, unconfigured
    pub fn create_store(&self, id: &str) -> Result<BoxedRemoteStore> {
        let factory = self
            .stores
            .get(id)
            .ok_or_else(|| anyhow!("Unknown store backend: {}", id))?;
        Ok(factory())
    }

    /// Create and configure the store selected by `config`
    pub fn create_configured(&self, config: &StoreConfig) -> Result<SharedRemoteStore> {
        let mut store = self.create_store(config.backend.id())?;
        store.configure(config)?;
        Ok(Arc::from(store))
    }

    /// List all registered store IDs, sorted
    pub fn list_stores(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.stores.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get display info for a store backend
    pub fn store_info(&self, id: &str) -> Option<&StoreInfo> {
        self.store_info.get(id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::new()));

/// Get the global registry
pub fn global_registry() -> &'static RwLock<Registry> {
    &GLOBAL_REGISTRY
}
