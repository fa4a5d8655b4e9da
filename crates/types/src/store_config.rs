//! Remote store configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which remote store backend feeds the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-process tree, written only by the embedding code
    Memory,
    /// Drifting synthetic readings
    #[default]
    Simulated,
    /// Timed writes read from a JSON script
    Replay,
}

impl StoreBackend {
    pub fn id(self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Simulated => "simulated",
            StoreBackend::Replay => "replay",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StoreBackend::Memory),
            "simulated" => Ok(StoreBackend::Simulated),
            "replay" => Ok(StoreBackend::Replay),
            other => Err(format!("Unknown store backend: {}", other)),
        }
    }
}

fn default_update_interval() -> u64 {
    2000
}

/// Configuration for the remote store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Script file for the replay backend
    #[serde(default)]
    pub replay_file: Option<PathBuf>,
    /// RNG seed for the simulated backend (random if unset)
    #[serde(default)]
    pub seed: Option<u64>,
    /// How often the simulated backend writes new readings, in milliseconds
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            replay_file: None,
            seed: None,
            update_interval_ms: default_update_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"backend":"replay"}"#).unwrap();
        assert_eq!(config.backend, StoreBackend::Replay);
        assert_eq!(config.update_interval_ms, 2000);
        assert!(config.replay_file.is_none());
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("firebase".parse::<StoreBackend>().is_err());
    }
}
