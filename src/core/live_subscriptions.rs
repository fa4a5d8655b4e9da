//! Per-screen live subscriptions
//!
//! A screen owns one `LiveSubscriptions`. It subscribes to the keys the screen
//! shows, mirrors every delivery into the screen's own view state, and
//! releases every subscription when dropped, whichever way the screen goes
//! away.

use super::telemetry_hub::{ScreenId, SubscriptionHandle, TelemetryHub};
use anyhow::Result;
use efishpond_types::{MetricKey, MetricViewState};
use log::debug;
use std::cell::{Cell, Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// View state of every key a screen is subscribed to
pub type ViewStates = BTreeMap<MetricKey, MetricViewState>;

pub struct LiveSubscriptions {
    hub: TelemetryHub,
    screen: ScreenId,
    states: Rc<RefCell<ViewStates>>,
    handles: HashMap<MetricKey, SubscriptionHandle>,
    /// Bumped on every visible state change
    revision: Rc<Cell<u64>>,
}

impl LiveSubscriptions {
    pub fn new(hub: TelemetryHub) -> Self {
        Self {
            hub,
            screen: ScreenId::new(),
            states: Rc::new(RefCell::new(BTreeMap::new())),
            handles: HashMap::new(),
            revision: Rc::new(Cell::new(0)),
        }
    }

    /// Subscribe to `key`, starting its view state at Loading
    ///
    /// Does nothing if this screen is already subscribed to `key`.
    pub fn subscribe(&mut self, key: MetricKey) -> Result<()> {
        if self.handles.contains_key(&key) {
            return Ok(());
        }

        let states = Rc::downgrade(&self.states);
        let revision = Rc::downgrade(&self.revision);
        let handle = self.hub.subscribe(self.screen, key, move |update| {
            // Screen already gone: nothing to update
            let (Some(states), Some(revision)) = (states.upgrade(), revision.upgrade()) else {
                return;
            };
            let mut states = states.borrow_mut();
            if let Some(state) = states.get_mut(&key) {
                if state.apply(update) {
                    revision.set(revision.get() + 1);
                }
            }
        })?;

        self.states.borrow_mut().insert(key, MetricViewState::new(key));
        self.handles.insert(key, handle);
        self.bump();
        Ok(())
    }

    /// Subscribe to each of `keys`
    ///
    /// On failure, subscriptions already made stay owned by `self` and are
    /// released when it is dropped.
    pub fn subscribe_all(&mut self, keys: &[MetricKey]) -> Result<()> {
        for &key in keys {
            self.subscribe(key)?;
        }
        Ok(())
    }

    /// Release the subscription for `key` and discard its view state
    pub fn unsubscribe(&mut self, key: MetricKey) -> bool {
        let Some(handle) = self.handles.remove(&key) else {
            return false;
        };
        self.hub.unsubscribe(handle);
        self.states.borrow_mut().remove(&key);
        self.bump();
        true
    }

    /// Release every subscription. Returns how many were released.
    pub fn unsubscribe_all(&mut self) -> usize {
        let keys: Vec<MetricKey> = self.handles.keys().copied().collect();
        let released = keys.into_iter().filter(|key| self.unsubscribe(*key)).count();
        if released > 0 {
            debug!("{} released {} subscriptions", self.screen, released);
        }
        released
    }

    /// Snapshot of one key's view state
    pub fn state(&self, key: MetricKey) -> Option<MetricViewState> {
        self.states.borrow().get(&key).cloned()
    }

    /// Borrow all view states
    pub fn states(&self) -> Ref<'_, ViewStates> {
        self.states.borrow()
    }

    pub fn is_subscribed(&self, key: MetricKey) -> bool {
        self.handles.contains_key(&key)
    }

    pub fn subscription_count(&self) -> usize {
        self.handles.len()
    }

    pub fn screen_id(&self) -> ScreenId {
        self.screen
    }

    /// Changes whenever any view state changes
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    fn bump(&self) {
        self.revision.set(self.revision.get() + 1);
    }
}

impl Drop for LiveSubscriptions {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}
