//! Summary and detail screens
//!
//! Each mounted screen owns its own [`LiveSubscriptions`]; mounting
//! subscribes, dropping the screen unsubscribes.

mod detail;
mod summary;

pub use detail::{DetailCard, DetailScreen};
pub use summary::{SummaryScreen, SUMMARY_KEYS};

use super::navigation::{Route, Router};
use super::presentation::MetricRow;
use crate::config::AppConfig;
use crate::core::{LiveSubscriptions, TelemetryHub};
use anyhow::Result;
use efishpond_core::DEFAULT_FEED_TIME;

/// Per-screen display settings
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    /// Feed time shown before the feeder schedule is known
    pub default_feed_time: String,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            default_feed_time: DEFAULT_FEED_TIME.to_string(),
        }
    }
}

impl From<&AppConfig> for ScreenSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_feed_time: config.feeder.default_feed_time.clone(),
        }
    }
}

/// What a screen currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenView {
    Summary {
        title: &'static str,
        section: &'static str,
        rows: Vec<MetricRow>,
    },
    Detail(DetailCard),
}

/// Common surface of every mounted screen
pub trait Screen {
    /// Route this screen is shown at
    fn route(&self) -> Route;

    /// Current renderable view
    fn view(&self) -> ScreenView;

    /// Subscriptions owned by this screen
    fn subscriptions(&self) -> &LiveSubscriptions;

    /// Changes whenever the view may have changed
    fn revision(&self) -> u64 {
        self.subscriptions().revision()
    }

    /// Handle the header back button
    fn back(&self, router: &mut dyn Router) -> bool {
        router.back()
    }
}

/// Mount the screen for `route`
pub fn mount(route: Route, hub: &TelemetryHub, settings: ScreenSettings) -> Result<Box<dyn Screen>> {
    Ok(match route.metric() {
        None => Box::new(SummaryScreen::mount(hub, settings)?),
        Some(key) => Box::new(DetailScreen::mount(hub, key, settings)?),
    })
}
