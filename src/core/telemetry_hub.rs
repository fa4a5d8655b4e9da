//! Telemetry hub - maintains a single remote listener per metric key
//!
//! Every mounted screen subscribes to the keys it shows. The hub opens one
//! listener on the remote store per key, reference-counts it across screen
//! subscriptions, and fans each snapshot out to the subscribers of that key.
//! When the last subscription for a key is released, the listener is closed.
//!
//! The hub lives on the UI thread. Store notifications are queued on a
//! channel and delivered by [`TelemetryHub::pump`]; nothing is delivered from
//! inside `subscribe`.

use anyhow::Result;
use efishpond_core::{
    notification_channel, ListenerId, Notification, NotificationReceiver, NotificationSender,
    SharedRemoteStore,
};
use efishpond_types::{MetricKey, Reading, Snapshot, Update};
use log::{debug, info, trace, warn};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Identifies one mounted screen instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(Uuid);

impl ScreenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen:{}", &self.0.simple().to_string()[..8])
    }
}

/// Identifies one screen's subscription to one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Proof of a live subscription, consumed by [`TelemetryHub::unsubscribe`]
#[must_use = "a subscription stays open until its handle is passed to unsubscribe"]
#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    key: MetricKey,
    owner: ScreenId,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> MetricKey {
        self.key
    }

    pub fn owner(&self) -> ScreenId {
        self.owner
    }
}

type UpdateCallback = Rc<RefCell<dyn FnMut(Update)>>;

struct Subscriber {
    key: MetricKey,
    owner: ScreenId,
    on_update: UpdateCallback,
}

/// One remote listener shared by every subscription to its key
struct SharedListener {
    listener: ListenerId,
    /// Number of screen subscriptions using this listener
    ref_count: usize,
    subscribers: Vec<SubscriptionId>,
    /// Most recent snapshot, replayed to subscriptions that join late
    latest: Option<Snapshot>,
}

struct HubState {
    store: SharedRemoteStore,
    sender: NotificationSender,
    receiver: NotificationReceiver,
    listeners: HashMap<MetricKey, SharedListener>,
    keys_by_listener: HashMap<ListenerId, MetricKey>,
    subscribers: HashMap<SubscriptionId, Subscriber>,
    by_owner: HashMap<(ScreenId, MetricKey), SubscriptionId>,
    /// Cached snapshots owed to subscriptions that joined an open listener
    replays: VecDeque<(SubscriptionId, Snapshot)>,
    next_id: u64,
}

/// Process-wide, reference-counted subscriptions to remote metric keys
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct TelemetryHub {
    state: Rc<RefCell<HubState>>,
}

impl TelemetryHub {
    pub fn new(store: SharedRemoteStore) -> Self {
        let (sender, receiver) = notification_channel();
        Self {
            state: Rc::new(RefCell::new(HubState {
                store,
                sender,
                receiver,
                listeners: HashMap::new(),
                keys_by_listener: HashMap::new(),
                subscribers: HashMap::new(),
                by_owner: HashMap::new(),
                replays: VecDeque::new(),
                next_id: 1,
            })),
        }
    }

    /// Subscribe `owner` to `key`
    ///
    /// `on_update` runs from [`pump`](Self::pump) once per snapshot, in the
    /// order the store emitted them. Subscribing again with the same owner and
    /// key before unsubscribing replaces the callback and returns a handle to
    /// the existing subscription rather than opening a second one.
    pub fn subscribe<F>(&self, owner: ScreenId, key: MetricKey, on_update: F) -> Result<SubscriptionHandle>
    where
        F: FnMut(Update) + 'static,
    {
        let on_update: UpdateCallback = Rc::new(RefCell::new(on_update));
        let mut state = self.state.borrow_mut();

        if let Some(&id) = state.by_owner.get(&(owner, key)) {
            if let Some(subscriber) = state.subscribers.get_mut(&id) {
                subscriber.on_update = on_update;
            }
            debug!("{} already subscribed to {} as {}", owner, key, id);
            return Ok(SubscriptionHandle { id, key, owner });
        }

        // Open the remote listener first so a failure leaves no bookkeeping behind
        if !state.listeners.contains_key(&key) {
            let listener = state.store.observe(key.remote_path(), state.sender.clone())?;
            info!("Opened {} for {} ({})", listener, key, key.remote_path());
            state.keys_by_listener.insert(listener, key);
            state.listeners.insert(
                key,
                SharedListener {
                    listener,
                    ref_count: 0,
                    subscribers: Vec::new(),
                    latest: None,
                },
            );
        }

        let id = SubscriptionId(state.next_id);
        state.next_id += 1;

        let HubState {
            listeners,
            replays,
            ..
        } = &mut *state;
        if let Some(shared) = listeners.get_mut(&key) {
            shared.ref_count += 1;
            shared.subscribers.push(id);
            if let Some(latest) = &shared.latest {
                replays.push_back((id, latest.clone()));
            }
            debug!(
                "{} subscribed to {} as {} (ref_count: {})",
                owner, key, id, shared.ref_count
            );
        }

        state.subscribers.insert(id, Subscriber { key, owner, on_update });
        state.by_owner.insert((owner, key), id);

        Ok(SubscriptionHandle { id, key, owner })
    }

    /// Release a subscription
    ///
    /// When the last subscription for a key goes, its remote listener is
    /// closed. Snapshots still queued for the subscription are discarded.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut state = self.state.borrow_mut();

        let Some(subscriber) = state.subscribers.remove(&handle.id) else {
            debug!("{} for {} was already released", handle.id, handle.key);
            return;
        };
        if state.by_owner.get(&(subscriber.owner, subscriber.key)) == Some(&handle.id) {
            state.by_owner.remove(&(subscriber.owner, subscriber.key));
        }
        state.replays.retain(|(id, _)| *id != handle.id);

        let should_close = match state.listeners.get_mut(&subscriber.key) {
            Some(shared) => {
                shared.ref_count = shared.ref_count.saturating_sub(1);
                shared.subscribers.retain(|id| *id != handle.id);
                debug!(
                    "Released {} on {} (ref_count: {})",
                    handle.id, subscriber.key, shared.ref_count
                );
                shared.ref_count == 0
            }
            None => false,
        };

        if should_close {
            if let Some(shared) = state.listeners.remove(&subscriber.key) {
                state.keys_by_listener.remove(&shared.listener);
                state.store.release(shared.listener);
                info!("Closed {} for {}", shared.listener, subscriber.key);
            }
        }
    }

    /// Deliver every queued snapshot. Returns the number of callbacks run.
    pub fn pump(&self) -> usize {
        let mut delivered = 0;

        loop {
            let next = self.state.borrow_mut().replays.pop_front();
            let Some((id, snapshot)) = next else {
                break;
            };
            let key = match self.state.borrow().subscribers.get(&id) {
                Some(subscriber) => subscriber.key,
                None => continue,
            };
            let update = to_update(key, &snapshot);
            if self.deliver(id, update) {
                delivered += 1;
            }
        }

        let receiver = self.state.borrow().receiver.clone();
        for notification in receiver.try_iter() {
            delivered += self.dispatch(notification);
        }

        if delivered > 0 {
            trace!("Pump delivered {} updates", delivered);
        }
        delivered
    }

    /// Fan one store notification out to the subscribers of its key
    fn dispatch(&self, notification: Notification) -> usize {
        let (update, targets) = {
            let mut state = self.state.borrow_mut();
            let Some(&key) = state.keys_by_listener.get(&notification.listener) else {
                debug!(
                    "Dropping late snapshot for closed {} ({})",
                    notification.listener, notification.path
                );
                return 0;
            };
            let Some(shared) = state.listeners.get_mut(&key) else {
                return 0;
            };
            shared.latest = Some(notification.snapshot.clone());
            let targets = shared.subscribers.clone();
            (to_update(key, &notification.snapshot), targets)
        };

        targets
            .into_iter()
            .filter(|id| self.deliver(*id, update.clone()))
            .count()
    }

    /// Run one subscriber's callback if the subscription is still live
    fn deliver(&self, id: SubscriptionId, update: Update) -> bool {
        // Look the callback up again: an earlier callback in this pump may
        // have released the subscription
        let callback = match self.state.borrow().subscribers.get(&id) {
            Some(subscriber) => Rc::clone(&subscriber.on_update),
            None => return false,
        };
        let Ok(mut on_update) = callback.try_borrow_mut() else {
            warn!("Skipping re-entrant delivery to {}", id);
            return false;
        };
        (*on_update)(update);
        true
    }

    /// Number of remote listeners currently open
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Number of live screen subscriptions
    pub fn subscription_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Screen subscriptions sharing the listener for `key`
    pub fn ref_count(&self, key: MetricKey) -> usize {
        self.state
            .borrow()
            .listeners
            .get(&key)
            .map_or(0, |shared| shared.ref_count)
    }

    /// Last snapshot received for `key`, if its listener is open
    pub fn latest(&self, key: MetricKey) -> Option<Snapshot> {
        self.state
            .borrow()
            .listeners
            .get(&key)
            .and_then(|shared| shared.latest.clone())
    }

    /// Debug: print all listeners and their ref counts
    pub fn debug_print_listeners(&self) {
        let state = self.state.borrow();
        info!("=== Telemetry listeners ({} total) ===", state.listeners.len());
        for (key, shared) in &state.listeners {
            info!(
                "  {} : {} ref_count={}, has_snapshot={}",
                key,
                shared.listener,
                shared.ref_count,
                shared.latest.is_some()
            );
        }
    }
}

/// Translate a snapshot into what subscribers see
///
/// A payload that does not decode is reported as empty rather than failing
/// the screen.
fn to_update(key: MetricKey, snapshot: &Snapshot) -> Update {
    match snapshot.value() {
        None => Update::Empty,
        Some(value) => match Reading::decode(key, value) {
            Ok(reading) => Update::Value(reading),
            Err(e) => {
                warn!("Ignoring undecodable snapshot: {}", e);
                Update::Empty
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efishpond_core::RemoteStore;
    use efishpond_sources::MemoryStore;
    use efishpond_types::SensorReading;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryStore>, TelemetryHub) {
        let store = Arc::new(MemoryStore::new());
        let hub = TelemetryHub::new(store.clone());
        (store, hub)
    }

    fn recorder() -> (Rc<RefCell<Vec<Update>>>, impl FnMut(Update) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |update| sink.borrow_mut().push(update))
    }

    fn ph(value: f64) -> Update {
        Update::Value(Reading::Sensor(SensorReading::new(value, "")))
    }

    #[test]
    fn test_subscribe_delivers_nothing_until_pumped() {
        let (store, hub) = setup();
        store.set("/sensors/ph_level", json!({"value": 7.1, "unit": ""}));
        let (seen, on_update) = recorder();

        let _handle = hub.subscribe(ScreenId::new(), MetricKey::Ph, on_update).unwrap();
        assert!(seen.borrow().is_empty());

        assert_eq!(hub.pump(), 1);
        assert_eq!(*seen.borrow(), vec![ph(7.1)]);
    }

    #[test]
    fn test_absent_snapshot_delivers_empty() {
        let (_store, hub) = setup();
        let (seen, on_update) = recorder();
        let _handle = hub
            .subscribe(ScreenId::new(), MetricKey::DissolvedOxygen, on_update)
            .unwrap();
        hub.pump();
        assert_eq!(*seen.borrow(), vec![Update::Empty]);
    }

    #[test]
    fn test_one_listener_shared_across_screens() {
        let (store, hub) = setup();
        let (_a_seen, a) = recorder();
        let (_b_seen, b) = recorder();

        let first = hub.subscribe(ScreenId::new(), MetricKey::Ph, a).unwrap();
        let second = hub.subscribe(ScreenId::new(), MetricKey::Ph, b).unwrap();
        assert_eq!(store.listener_count(), 1);
        assert_eq!(hub.ref_count(MetricKey::Ph), 2);

        hub.unsubscribe(first);
        assert_eq!(store.listener_count(), 1);
        hub.unsubscribe(second);
        assert_eq!(store.listener_count(), 0);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_duplicate_subscribe_is_idempotent() {
        let (store, hub) = setup();
        let screen = ScreenId::new();
        let (first_seen, first) = recorder();
        let (second_seen, second) = recorder();

        let a = hub.subscribe(screen, MetricKey::Temperature, first).unwrap();
        let b = hub.subscribe(screen, MetricKey::Temperature, second).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(hub.subscription_count(), 1);
        assert_eq!(hub.ref_count(MetricKey::Temperature), 1);

        hub.pump();
        assert!(first_seen.borrow().is_empty());
        assert_eq!(second_seen.borrow().len(), 1);

        hub.unsubscribe(a);
        hub.unsubscribe(b);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_late_joiner_receives_cached_snapshot() {
        let (store, hub) = setup();
        store.set("/feeder/next_feed_time", json!("6:00 PM"));
        let (_early_seen, early) = recorder();
        let _first = hub.subscribe(ScreenId::new(), MetricKey::Feeder, early).unwrap();
        hub.pump();

        let (late_seen, late) = recorder();
        let _second = hub.subscribe(ScreenId::new(), MetricKey::Feeder, late).unwrap();
        assert!(late_seen.borrow().is_empty());
        hub.pump();
        assert_eq!(late_seen.borrow().len(), 1);
        assert_eq!(late_seen.borrow()[0], Update::Value(Reading::Feeder(efishpond_types::FeederSchedule::new("6:00 PM"))));
    }

    #[test]
    fn test_late_delivery_after_release_is_dropped() {
        let (store, hub) = setup();
        let (seen, on_update) = recorder();
        let handle = hub.subscribe(ScreenId::new(), MetricKey::Ph, on_update).unwrap();

        // Initial snapshot and a change are queued but not yet pumped
        store.set("/sensors/ph_level", json!({"value": 6.9, "unit": ""}));
        hub.unsubscribe(handle);

        assert_eq!(hub.pump(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_updates_arrive_in_store_order() {
        let (store, hub) = setup();
        let (seen, on_update) = recorder();
        let _handle = hub.subscribe(ScreenId::new(), MetricKey::Ph, on_update).unwrap();
        for value in [6.8, 6.9, 7.0] {
            store.set("/sensors/ph_level", json!({"value": value, "unit": ""}));
        }
        store.remove("/sensors/ph_level");
        hub.pump();
        assert_eq!(
            *seen.borrow(),
            vec![Update::Empty, ph(6.8), ph(6.9), ph(7.0), Update::Empty]
        );
    }

    #[test]
    fn test_malformed_payload_is_empty() {
        let (store, hub) = setup();
        store.set("/sensors/ph_level", json!("seven"));
        let (seen, on_update) = recorder();
        let _handle = hub.subscribe(ScreenId::new(), MetricKey::Ph, on_update).unwrap();
        hub.pump();
        assert_eq!(*seen.borrow(), vec![Update::Empty]);
    }

    #[test]
    fn test_callback_may_release_another_subscription() {
        let (store, hub) = setup();
        let (victim_seen, victim_cb) = recorder();

        let victim = Rc::new(RefCell::new(None));
        let hub_for_killer = hub.clone();
        let victim_slot = Rc::clone(&victim);
        let _killer = hub
            .subscribe(ScreenId::new(), MetricKey::Ph, move |_| {
                if let Some(handle) = victim_slot.borrow_mut().take() {
                    hub_for_killer.unsubscribe(handle);
                }
            })
            .unwrap();
        *victim.borrow_mut() = Some(hub.subscribe(ScreenId::new(), MetricKey::Ph, victim_cb).unwrap());

        store.set("/sensors/ph_level", json!({"value": 7.0, "unit": ""}));
        hub.pump();
        assert!(victim_seen.borrow().is_empty());
        assert_eq!(hub.ref_count(MetricKey::Ph), 1);
    }
}
