//! Metric identifiers and their remote paths

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One monitored quantity on the pond
///
/// Each key is bound to exactly one remote path for the lifetime of the
/// process. The same key selects the label and icon a screen renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Ph,
    Temperature,
    DissolvedOxygen,
    Feeder,
}

impl MetricKey {
    /// Every key, in summary display order
    pub const ALL: [MetricKey; 4] = [
        MetricKey::Ph,
        MetricKey::Temperature,
        MetricKey::DissolvedOxygen,
        MetricKey::Feeder,
    ];

    /// Remote path this key is observed at
    pub fn remote_path(self) -> &'static str {
        match self {
            MetricKey::Ph => "/sensors/ph_level",
            MetricKey::Temperature => "/sensors/water_temperature",
            MetricKey::DissolvedOxygen => "/sensors/dissolved_oxygen",
            MetricKey::Feeder => "/feeder/next_feed_time",
        }
    }

    /// Reverse lookup of [`MetricKey::remote_path`]
    pub fn from_remote_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.remote_path() == path)
    }

    /// Human-readable row label
    pub fn label(self) -> &'static str {
        match self {
            MetricKey::Ph => "pH Level",
            MetricKey::Temperature => "Water Temperature",
            MetricKey::DissolvedOxygen => "Dissolved Oxygen",
            MetricKey::Feeder => "Automated Fish Feeder",
        }
    }

    /// Stable short identifier (config files, CLI)
    pub fn id(self) -> &'static str {
        match self {
            MetricKey::Ph => "ph",
            MetricKey::Temperature => "temperature",
            MetricKey::DissolvedOxygen => "dissolved_oxygen",
            MetricKey::Feeder => "feeder",
        }
    }

    /// Whether readings for this key are feeder schedules rather than sensor values
    pub fn is_feeder(self) -> bool {
        matches!(self, MetricKey::Feeder)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MetricKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ph" => Ok(MetricKey::Ph),
            "temperature" | "temp" => Ok(MetricKey::Temperature),
            "dissolved_oxygen" | "oxygen" => Ok(MetricKey::DissolvedOxygen),
            "feeder" => Ok(MetricKey::Feeder),
            other => Err(format!("Unknown metric: {}", other)),
        }
    }
}
