//! Simulated pond sensors
//!
//! Starts from the values the field writer seeds the database with, then
//! drifts each sensor toward a healthy set point with a little noise on every
//! update interval. The feeder path advances to the next scheduled slot.

use crate::memory::MemoryStore;
use anyhow::Result;
use chrono::{Local, NaiveTime, Timelike};
use efishpond_core::{ListenerId, NotificationSender, RemoteStore, StoreMetadata};
use efishpond_types::{MetricKey, StoreConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Daily feeding slots as (hour, minute)
const FEED_SLOTS: [(u32, u32); 3] = [(8, 0), (12, 0), (16, 0)];

/// One simulated sensor channel
#[derive(Debug, Clone)]
struct Channel {
    key: MetricKey,
    unit: &'static str,
    value: f64,
    set_point: f64,
    /// Fraction of the gap to the set point closed per step
    pull: f64,
    noise: f64,
}

impl Channel {
    fn step(&mut self, rng: &mut StdRng) {
        let jitter = if self.noise > 0.0 {
            rng.gen_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        let next = self.value + (self.set_point - self.value) * self.pull + jitter;
        self.value = (next * 10.0).round() / 10.0;
    }
}

fn seed_channels() -> Vec<Channel> {
    vec![
        Channel {
            key: MetricKey::Ph,
            unit: "pH",
            value: 30.0,
            set_point: 7.0,
            pull: 0.35,
            noise: 0.1,
        },
        Channel {
            key: MetricKey::Temperature,
            unit: "°C",
            value: 27.5,
            set_point: 26.5,
            pull: 0.2,
            noise: 0.2,
        },
        Channel {
            key: MetricKey::DissolvedOxygen,
            unit: "mg/L",
            value: 1.0,
            set_point: 6.5,
            pull: 0.25,
            noise: 0.15,
        },
    ]
}

struct SimState {
    rng: StdRng,
    channels: Vec<Channel>,
    last_step: Option<Instant>,
}

/// Remote store backed by simulated sensors
pub struct SimulatedStore {
    metadata: StoreMetadata,
    tree: MemoryStore,
    interval: Duration,
    state: Mutex<SimState>,
}

impl SimulatedStore {
    pub fn new() -> Self {
        let store = Self {
            metadata: StoreMetadata {
                id: "simulated".to_string(),
                name: "Simulated".to_string(),
                description: "Synthetic pond readings drifting toward healthy set points".to_string(),
            },
            tree: MemoryStore::new(),
            interval: Duration::from_millis(StoreConfig::default().update_interval_ms),
            state: Mutex::new(SimState {
                rng: StdRng::from_entropy(),
                channels: seed_channels(),
                last_step: None,
            }),
        };
        store.publish_all();
        store
    }

    /// Advance every channel by one step and publish the results
    pub fn step(&self) {
        {
            let mut state = self.lock();
            let SimState { rng, channels, .. } = &mut *state;
            for channel in channels.iter_mut() {
                channel.step(rng);
            }
        }
        self.publish_all();
    }

    fn publish_all(&self) {
        let channels = self.lock().channels.clone();
        for channel in channels {
            self.tree.set(
                channel.key.remote_path(),
                json!({ "value": channel.value, "unit": channel.unit }),
            );
        }
        let now = Local::now().time();
        self.tree
            .set(MetricKey::Feeder.remote_path(), json!(next_feed_time(now)));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SimulatedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for SimulatedStore {
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
        let due = {
            let mut state = self.lock();
            let now = Instant::now();
            let due = state
                .last_step
                .map_or(true, |last| now.duration_since(last) >= self.interval);
            if due {
                state.last_step = Some(now);
            }
            due
        };
        if due {
            self.step();
        }
        Ok(())
    }

    fn configure(&mut self, config: &StoreConfig) -> Result<()> {
        self.interval = Duration::from_millis(config.update_interval_ms.max(1));
        if let Some(seed) = config.seed {
            self.lock().rng = StdRng::seed_from_u64(seed);
        }
        log::info!(
            "Simulated store: interval {:?}, seed {:?}",
            self.interval,
            config.seed
        );
        Ok(())
    }
}

/// The first feeding slot strictly after `now`, formatted like `"4:00 PM"`
pub fn next_feed_time(now: NaiveTime) -> String {
    let (hour, minute) = FEED_SLOTS
        .iter()
        .copied()
        .find(|&(h, m)| (h, m) > (now.hour(), now.minute()))
        .unwrap_or(FEED_SLOTS[0]);
    NaiveTime::from_hms_opt(hour, minute, 0)
        .map(|slot| slot.format("%-I:%M %p").to_string())
        .unwrap_or_else(|| format!("{}:{:02}", hour, minute))
}
