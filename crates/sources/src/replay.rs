//! Replay of recorded database writes
//!
//! A replay script is a JSON array of timed writes:
//!
//! ```json
//! [
//!   { "at_ms": 0,    "path": "/sensors/ph_level", "value": { "value": 7.1, "unit": "" } },
//!   { "at_ms": 1500, "path": "/feeder/next_feed_time", "value": "4:00 PM" },
//!   { "at_ms": 4000, "path": "/sensors/dissolved_oxygen", "value": null }
//! ]
//! ```
//!
//! A `null` value removes the path. Events must be sorted by `at_ms`.

use crate::memory::MemoryStore;
use anyhow::Result;
use efishpond_core::{ListenerId, NotificationSender, RemoteStore, StoreMetadata};
use efishpond_types::StoreConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use thiserror::Error;

/// One recorded write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEvent {
    /// Offset from the start of the replay, in milliseconds
    pub at_ms: u64,
    pub path: String,
    #[serde(default)]
    pub value: Value,
}

/// A replay script that could not be loaded
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay backend needs a script file (store.replay_file)")]
    MissingScript,
    #[error("cannot read replay script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse replay script {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("replay event {index} at {at_ms}ms is earlier than the event before it")]
    OutOfOrder { index: usize, at_ms: u64 },
}

struct Cursor {
    started: Option<Instant>,
    next: usize,
}

/// Remote store that replays a script of timed writes
pub struct ReplayStore {
    metadata: StoreMetadata,
    tree: MemoryStore,
    events: Vec<ReplayEvent>,
    cursor: Mutex<Cursor>,
}

impl ReplayStore {
    pub fn new() -> Self {
        Self {
            metadata: StoreMetadata {
                id: "replay".to_string(),
                name: "Replay".to_string(),
                description: "Timed writes replayed from a JSON script".to_string(),
            },
            tree: MemoryStore::new(),
            events: Vec::new(),
            cursor: Mutex::new(Cursor {
                started: None,
                next: 0,
            }),
        }
    }

    /// Build a replay from events already in memory
    pub fn from_events(events: Vec<ReplayEvent>) -> Result<Self, ReplayError> {
        validate(&events)?;
        let mut store = Self::new();
        store.events = events;
        Ok(store)
    }

    /// Load and validate a script file
    pub fn load_script(path: &Path) -> Result<Vec<ReplayEvent>, ReplayError> {
        let content = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let events: Vec<ReplayEvent> =
            serde_json::from_str(&content).map_err(|source| ReplayError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        validate(&events)?;
        Ok(events)
    }

    /// Apply every event due at or before `elapsed_ms`. Returns how many were applied.
    pub fn advance_to(&self, elapsed_ms: u64) -> usize {
        let mut cursor = self.lock();
        let start = cursor.next;
        while let Some(event) = self.events.get(cursor.next) {
            if event.at_ms > elapsed_ms {
                break;
            }
            log::debug!("Replay {}ms: {} <- {}", event.at_ms, event.path, event.value);
            self.tree.set(&event.path, event.value.clone());
            cursor.next += 1;
        }
        cursor.next - start
    }

    /// True once every event has been applied
    pub fn finished(&self) -> bool {
        self.lock().next >= self.events.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ReplayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for ReplayStore {
    fn metadata(&self) -> &StoreMetadata {
        &self.metadata
    }

    fn observe(&self, path: &str, sink: NotificationSender) -> Result<ListenerId> {
        self.tree.observe(path, sink)
    }

    fn release(&self, listener: ListenerId) {
        self.tree.release(listener);
    }

    fn listener_count(&self) -> usize {
        self.tree.listener_count()
    }

    fn update(&self) -> Result<()> {
        let started = *self.lock().started.get_or_insert_with(Instant::now);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.advance_to(elapsed_ms);
        Ok(())
    }

    fn configure(&mut self, config: &StoreConfig) -> Result<()> {
        let path = config.replay_file.as_ref().ok_or(ReplayError::MissingScript)?;
        self.events = Self::load_script(path)?;
        *self.lock() = Cursor {
            started: None,
            next: 0,
        };
        log::info!("Loaded {} replay events from {}", self.events.len(), path.display());
        Ok(())
    }
}

fn validate(events: &[ReplayEvent]) -> Result<(), ReplayError> {
    for (index, pair) in events.windows(2).enumerate() {
        if pair[1].at_ms < pair[0].at_ms {
            return Err(ReplayError::OutOfOrder {
                index: index + 1,
                at_ms: pair[1].at_ms,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use efishpond_core::notification_channel;
    use efishpond_types::Snapshot;
    use serde_json::json;

    fn event(at_ms: u64, path: &str, value: Value) -> ReplayEvent {
        ReplayEvent {
            at_ms,
            path: path.to_string(),
            value,
        }
    }

    #[test]
    fn test_advance_applies_due_events_only() {
        let store = ReplayStore::from_events(vec![
            event(0, "/sensors/ph_level", json!({"value": 7.1, "unit": ""})),
            event(500, "/sensors/ph_level", json!({"value": 7.3, "unit": ""})),
            event(1000, "/sensors/ph_level", Value::Null),
        ])
        .unwrap();

        let (tx, rx) = notification_channel();
        store.observe("/sensors/ph_level", tx).unwrap();

        assert_eq!(store.advance_to(0), 1);
        assert_eq!(store.advance_to(499), 0);
        assert_eq!(store.advance_to(2000), 2);
        assert!(store.finished());

        let seen: Vec<Snapshot> = rx.try_iter().map(|n| n.snapshot).collect();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], Snapshot::absent());
        assert_eq!(seen[2].value["value"], json!(7.3));
        assert_eq!(seen[3], Snapshot::absent());
    }

    #[test]
    fn test_out_of_order_script_rejected() {
        let err = ReplayStore::from_events(vec![
            event(100, "/a", json!(1)),
            event(50, "/a", json!(2)),
        ])
        .err()
        .unwrap();
        assert!(matches!(err, ReplayError::OutOfOrder { index: 1, at_ms: 50 }));
    }

    #[test]
    fn test_configure_without_script_fails() {
        let mut store = ReplayStore::new();
        let err = store.configure(&StoreConfig::default()).unwrap_err();
        assert!(err.to_string().contains("replay_file"));
    }

    #[test]
    fn test_load_script_from_file() {
        let path = std::env::temp_dir().join(format!("efishpond-replay-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"at_ms": 0, "path": "/feeder/next_feed_time", "value": "4:00 PM"}]"#,
        )
        .unwrap();

        let mut store = ReplayStore::new();
        store
            .configure(&StoreConfig {
                replay_file: Some(path.clone()),
                ..StoreConfig::default()
            })
            .unwrap();
        store.advance_to(0);
        assert_eq!(store.tree.get("/feeder/next_feed_time"), Some(json!("4:00 PM")));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_unreadable_script_reports_path() {
        let err = ReplayStore::load_script(Path::new("/nonexistent/replay.json")).unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/replay.json"));
    }
}
