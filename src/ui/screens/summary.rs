//! Home screen: every metric in one list

use super::{Screen, ScreenSettings, ScreenView};
use crate::core::{LiveSubscriptions, TelemetryHub};
use crate::ui::icons::icons;
use crate::ui::navigation::{Route, Router};
use crate::ui::presentation::{build_rows, MetricRow};
use anyhow::Result;
use efishpond_core::APP_TITLE;
use efishpond_types::MetricKey;
use log::debug;

/// Keys on the summary, in display order
pub const SUMMARY_KEYS: [MetricKey; 4] = MetricKey::ALL;

const SECTION_TITLE: &str = "Water Quality";

pub struct SummaryScreen {
    subscriptions: LiveSubscriptions,
    settings: ScreenSettings,
}

impl SummaryScreen {
    pub fn mount(hub: &TelemetryHub, settings: ScreenSettings) -> Result<Self> {
        let mut subscriptions = LiveSubscriptions::new(hub.clone());
        subscriptions.subscribe_all(&SUMMARY_KEYS)?;
        debug!("Mounted summary as {}", subscriptions.screen_id());
        Ok(Self {
            subscriptions,
            settings,
        })
    }

    pub fn rows(&self) -> Vec<MetricRow> {
        build_rows(
            &SUMMARY_KEYS,
            &self.subscriptions.states(),
            icons(),
            &self.settings.default_feed_time,
        )
    }

    pub fn row(&self, key: MetricKey) -> Option<MetricRow> {
        self.rows().into_iter().find(|row| row.key == key)
    }

    /// Row tapped: open its detail screen
    pub fn select(&self, key: MetricKey, router: &mut dyn Router) -> bool {
        match self.row(key) {
            Some(row) if row.is_navigable => {
                router.push(row.route);
                true
            }
            _ => false,
        }
    }
}

impl Screen for SummaryScreen {
    fn route(&self) -> Route {
        Route::Home
    }

    fn view(&self) -> ScreenView {
        ScreenView::Summary {
            title: APP_TITLE,
            section: SECTION_TITLE,
            rows: self.rows(),
        }
    }

    fn subscriptions(&self) -> &LiveSubscriptions {
        &self.subscriptions
    }
}
