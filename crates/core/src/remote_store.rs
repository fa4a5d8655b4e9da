//! Remote store trait and notification plumbing

use anyhow::Result;
use crossbeam::channel::{self, Receiver, Sender};
use efishpond_types::{Snapshot, StoreConfig};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one open listener on a remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a process-unique listener id
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A snapshot addressed to one listener
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub listener: ListenerId,
    pub path: String,
    pub snapshot: Snapshot,
}

/// Sending half handed to a store when a listener is opened
pub type NotificationSender = Sender<Notification>;

/// Receiving half drained by the UI event loop
pub type NotificationReceiver = Receiver<Notification>;

/// Create the queue that carries store notifications to the event loop
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    channel::unbounded()
}

/// Metadata about a remote store backend
#[derive(Debug, Clone)]
pub struct StoreMetadata {
    /// Unique identifier for this backend
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Description of where the data comes from
    pub description: String,
}

/// Trait for all remote stores
///
/// A remote store is a real-time key-value tree addressed by hierarchical
/// string paths. The dashboard only reads from it.
pub trait RemoteStore: Send + Sync {
    /// Get metadata about this store
    fn metadata(&self) -> &StoreMetadata;

    /// Open a listener on `path`
    ///
    /// The store must queue the path's current snapshot (present or absent)
    /// on `sink`, then one snapshot per change, in the order changes happen.
    fn observe(&self, path: &str, sink: NotificationSender) -> Result<ListenerId>;

    /// Close a listener. Unknown ids are ignored.
    fn release(&self, listener: ListenerId);

    /// Number of listeners currently open
    fn listener_count(&self) -> usize;

    /// Advance the store (e.g. emit the next simulated readings)
    fn update(&self) -> Result<()> {
        Ok(())
    }

    /// Configure the store from typed settings
    fn configure(&mut self, _config: &StoreConfig) -> Result<()> {
        Ok(())
    }
}

/// Type-erased store, before it is shared
pub type BoxedRemoteStore = Box<dyn RemoteStore>;

/// Store shared between the event loop and its listeners
pub type SharedRemoteStore = Arc<dyn RemoteStore>;
