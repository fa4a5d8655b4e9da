//! In-memory remote store
//!
//! Holds a JSON tree addressed by `/`-separated paths and notifies listeners
//! whenever a write touches their path, an ancestor of it, or a descendant.
//! Used directly by tests and as the backing tree of the simulated and
//! replay backends.

use anyhow::Result;
use efishpond_core::{ListenerId, Notification, NotificationSender, RemoteStore, StoreMetadata};
use efishpond_types::Snapshot;
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// An open listener and the last snapshot value it was sent
struct Listener {
    path: String,
    sink: NotificationSender,
    last_sent: Option<Value>,
}

#[derive(Default)]
struct Tree {
    root: Value,
    listeners: HashMap<ListenerId, Listener>,
}

impl Tree {
    fn get(&self, path: &str) -> Value {
        let mut node = &self.root;
        for segment in segments(path) {
            match node.get(segment) {
                Some(child) => node = child,
                None => return Value::Null,
            }
        }
        node.clone()
    }

    fn set(&mut self, path: &str, value: Value) {
        let parts: Vec<&str> = segments(path).collect();
        if value.is_null() {
            remove_at(&mut self.root, &parts);
            return;
        }
        let Some((leaf, parents)) = parts.split_last() else {
            self.root = value;
            return;
        };
        let mut node = &mut self.root;
        for segment in parents {
            node = ensure_object(node)
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(node).insert(leaf.to_string(), value);
    }

    /// Send fresh snapshots to listeners related to `written`
    fn notify(&mut self, written: &str) {
        let mut closed = Vec::new();
        let related: Vec<(ListenerId, String)> = self
            .listeners
            .iter()
            .filter(|(_, l)| paths_related(&l.path, written))
            .map(|(id, l)| (*id, l.path.clone()))
            .collect();

        for (id, path) in related {
            let current = self.get(&path);
            let Some(listener) = self.listeners.get_mut(&id) else {
                continue;
            };
            if listener.last_sent.as_ref() == Some(&current) {
                continue;
            }
            let notification = Notification {
                listener: id,
                path: path.clone(),
                snapshot: Snapshot::new(current.clone()),
            };
            if listener.sink.send(notification).is_err() {
                closed.push(id);
            } else {
                listener.last_sent = Some(current);
            }
        }

        for id in closed {
            debug!("Dropping {} on {}: receiver gone", id, written);
            self.listeners.remove(&id);
        }
    }
}

/// In-memory observable JSON tree
pub struct MemoryStore {
    metadata: StoreMetadata,
    tree: Mutex<Tree>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            metadata: StoreMetadata {
                id: "memory".to_string(),
                name: "Memory".to_string(),
                description: "In-process tree written by the embedding code".to_string(),
            },
            tree: Mutex::new(Tree::default()),
        }
    }

    /// Write `value` at `path` (writing `null` removes it) and notify listeners
    pub fn set(&self, path: &str, value: Value) {
        let mut tree = self.lock();
        tree.set(path, value);
        tree.notify(path);
    }

    /// Remove whatever is stored at `path`
    pub fn remove(&self, path: &str) {
        self.set(path, Value::Null);
    }

    /// Current value at `path`, if any
    pub fn get(&self, path: &str) -> Option<Value> {
        let value = self.lock().get(path);
        if value.is_null() {
            None
        } else {
            Some(value)
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tree> {
        // Recover from a poisoned mutex; the tree itself is always consistent
        self.tree.lock().unwrap_or_else(|poisoned| {
            log::warn!("Memory store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryStore {
    fn metadata(&self) -> &StoreMetadata {
        &self.metadata
    }

    fn observe(&self, path: &str, sink: NotificationSender) -> Result<ListenerId> {
        let path = normalize(path);
        let id = ListenerId::next();
        let mut tree = self.lock();
        let current = tree.get(&path);
        sink.send(Notification {
            listener: id,
            path: path.clone(),
            snapshot: Snapshot::new(current.clone()),
        })?;
        tree.listeners.insert(
            id,
            Listener {
                path: path.clone(),
                sink,
                last_sent: Some(current),
            },
        );
        info!("{} opened {} on {}", self.metadata.id, id, path);
        Ok(id)
    }

    fn release(&self, listener: ListenerId) {
        if let Some(closed) = self.lock().listeners.remove(&listener) {
            info!("{} closed {} on {}", self.metadata.id, listener, closed.path);
        }
    }

    fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn normalize(path: &str) -> String {
    let joined: Vec<&str> = segments(path).collect();
    format!("/{}", joined.join("/"))
}

/// True if one path equals, contains or is contained by the other
fn paths_related(a: &str, b: &str) -> bool {
    let a: Vec<&str> = segments(a).collect();
    let b: Vec<&str> = segments(b).collect();
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

/// Remove the value at `parts`, pruning parents left empty
fn remove_at(node: &mut Value, parts: &[&str]) {
    let Some((first, rest)) = parts.split_first() else {
        *node = Value::Null;
        return;
    };
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() {
        map.remove(*first);
    } else if let Some(child) = map.get_mut(*first) {
        remove_at(child, rest);
        if child.is_null() || child.as_object().is_some_and(|m| m.is_empty()) {
            map.remove(*first);
        }
    }
}
