//! efishpond-types: Shared data types for the e-FishPond dashboard.
//!
//! This crate contains pure data types (metric keys, readings, snapshots,
//! view state, store configuration) shared across all e-FishPond crates.
//! Nothing here performs I/O.

pub mod metric;
pub mod reading;
pub mod snapshot;
pub mod store_config;
pub mod view_state;

// Re-export commonly used types at the crate root for convenience
pub use metric::MetricKey;
pub use reading::{FeederSchedule, Reading, ReadingError, SensorReading};
pub use snapshot::Snapshot;
pub use store_config::{StoreBackend, StoreConfig};
pub use view_state::{MetricState, MetricViewState, Update};
