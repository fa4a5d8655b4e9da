//! Application configuration

use anyhow::Result;
use efishpond_core::{DEFAULT_FEED_TIME, EVENT_LOOP_INTERVAL};
use efishpond_types::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ui::Route;

/// Application-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Version of the config format
    pub version: u32,
    /// Remote store backend and its settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Feeder display settings
    #[serde(default)]
    pub feeder: FeederConfig,
    /// Event loop and start screen
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "efishpond", "efishpond")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            store: StoreConfig::default(),
            feeder: FeederConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

/// Feeder display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeederConfig {
    /// Shown on the feeder screen until a schedule arrives
    #[serde(default = "default_feed_time")]
    pub default_feed_time: String,
}

fn default_feed_time() -> String {
    DEFAULT_FEED_TIME.to_string()
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            default_feed_time: default_feed_time(),
        }
    }
}

/// Event loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Event loop period in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Screen shown at startup
    #[serde(default)]
    pub start_screen: Route,
}

fn default_tick_interval() -> u64 {
    EVENT_LOOP_INTERVAL.as_millis() as u64
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            start_screen: Route::Home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efishpond_types::StoreBackend;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"version":1,"store":{"backend":"memory"}}"#).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.feeder.default_feed_time, "4:00 PM");
        assert_eq!(config.ui.tick_interval_ms, 250);
        assert_eq!(config.ui.start_screen, Route::Home);
    }

    #[test]
    fn test_save_and_load_path() {
        let path = std::env::temp_dir()
            .join(format!("efishpond-config-{}", std::process::id()))
            .join("config.json");

        let mut config = AppConfig::default();
        config.ui.start_screen = Route::FeederDetail;
        config.feeder.default_feed_time = "5:30 PM".to_string();
        config.save_to_path(&path).unwrap();

        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/efishpond/config.json");
        assert!(AppConfig::load_from_path(&path).is_err());
    }
}
