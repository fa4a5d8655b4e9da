//! Per-screen view state for a single metric

use crate::metric::MetricKey;
use crate::reading::Reading;

/// What a subscription delivers to its consumer for one snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// The path holds a value
    Value(Reading),
    /// The store answered and the path is empty
    Empty,
}

/// Load state of one metric on one screen
///
/// `Loading` until the first snapshot arrives, then one of the two settled
/// variants. There is no way back to `Loading`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetricState {
    #[default]
    Loading,
    HasValue(Reading),
    NoValue,
}

/// A screen's local copy of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricViewState {
    pub key: MetricKey,
    pub state: MetricState,
}

impl MetricViewState {
    /// Fresh state for a newly mounted subscription
    pub fn new(key: MetricKey) -> Self {
        Self {
            key,
            state: MetricState::Loading,
        }
    }

    /// Fold one delivery into the state. Returns true if anything changed.
    pub fn apply(&mut self, update: Update) -> bool {
        let next = match update {
            Update::Value(reading) => MetricState::HasValue(reading),
            Update::Empty => MetricState::NoValue,
        };
        if self.state == next {
            return false;
        }
        self.state = next;
        true
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, MetricState::Loading)
    }

    pub fn reading(&self) -> Option<&Reading> {
        match &self.state {
            MetricState::HasValue(reading) => Some(reading),
            MetricState::Loading | MetricState::NoValue => None,
        }
    }
}
