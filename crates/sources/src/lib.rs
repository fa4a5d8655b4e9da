//! efishpond-sources: Remote store backends for the e-FishPond dashboard.

mod memory;
mod replay;
mod simulated;

pub use memory::MemoryStore;
pub use replay::{ReplayError, ReplayEvent, ReplayStore};
pub use simulated::{next_feed_time, SimulatedStore};

/// Register all built-in store backends with the global registry
pub fn register_all() {
    use efishpond_core::global_registry;

    let mut registry = global_registry()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    registry.register_store_with_info("memory", "Memory", || Box::new(MemoryStore::new()));
    registry.register_store_with_info("simulated", "Simulated", || {
        Box::new(SimulatedStore::new())
    });
    registry.register_store_with_info("replay", "Replay", || Box::new(ReplayStore::new()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use efishpond_core::global_registry;

    #[test]
    fn test_register_all_covers_every_backend() {
        register_all();
        let registry = global_registry().read().unwrap();
        assert_eq!(registry.list_stores(), vec!["memory", "replay", "simulated"]);
        assert!(registry.create_store("memory").is_ok());
    }
}
