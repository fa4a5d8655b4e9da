//! efishpond-core: Core traits and registry for the e-FishPond dashboard.
//!
//! This crate contains the `RemoteStore` trait the dashboard reads from,
//! the notification queue that carries snapshots to the event loop, the
//! global store registry, and shared constants.

pub mod constants;
mod registry;
mod remote_store;

pub use constants::{APP_TITLE, DEFAULT_FEED_TIME, EVENT_LOOP_INTERVAL, LOADING_TEXT, NO_DATA_TEXT};
pub use registry::{global_registry, Registry, StoreFactory, StoreInfo};
pub use remote_store::{
    notification_channel, BoxedRemoteStore, ListenerId, Notification, NotificationReceiver,
    NotificationSender, RemoteStore, SharedRemoteStore, StoreMetadata,
};

// Re-export types used in trait signatures for convenience
pub use efishpond_types::{MetricKey, Snapshot, StoreConfig};
