//! e-FishPond: live water-quality and feeder telemetry for aquaponics ponds
//!
//! This library provides:
//! - A telemetry hub that shares one remote-store listener per metric
//!   between every screen showing it
//! - Per-screen live subscriptions with loading / value / no-value state
//! - Metric presentation, icon resolution and navigation
//! - Configuration management

pub mod config;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use config::AppConfig;
pub use core::{LiveSubscriptions, TelemetryHub};
pub use ui::{Route, Screen, ScreenView};
