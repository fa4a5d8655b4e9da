//! Single-metric detail screen

use super::{Screen, ScreenSettings, ScreenView};
use crate::core::{LiveSubscriptions, TelemetryHub};
use crate::ui::icons::{icons, Glyph, IconName};
use crate::ui::navigation::{detail_route, Route};
use crate::ui::presentation::detail_value;
use anyhow::Result;
use efishpond_core::APP_TITLE;
use efishpond_types::{MetricKey, MetricViewState};
use log::debug;

/// Everything a detail screen draws
#[derive(Debug, Clone, PartialEq)]
pub struct DetailCard {
    pub key: MetricKey,
    pub header: &'static str,
    pub back_icon: Glyph,
    pub title: &'static str,
    pub icon: Glyph,
    pub status: &'static str,
    pub value: String,
    pub caption: &'static str,
    pub loading: bool,
}

fn status_text(key: MetricKey) -> &'static str {
    match key {
        MetricKey::Ph => "pH Active",
        MetricKey::Temperature => "Temperature Active",
        MetricKey::DissolvedOxygen => "Oxygen Active",
        MetricKey::Feeder => "Feeder Active",
    }
}

fn caption_text(key: MetricKey) -> &'static str {
    match key {
        MetricKey::Ph => "Optimal: 6.5 - 7.5",
        MetricKey::Temperature => "Optimal: 22 - 29 °C",
        MetricKey::DissolvedOxygen => "Optimal: 5.0 - 8.0 mg/L",
        MetricKey::Feeder => "Next Scheduled Feed",
    }
}

pub struct DetailScreen {
    key: MetricKey,
    subscriptions: LiveSubscriptions,
    settings: ScreenSettings,
}

impl DetailScreen {
    pub fn mount(hub: &TelemetryHub, key: MetricKey, settings: ScreenSettings) -> Result<Self> {
        let mut subscriptions = LiveSubscriptions::new(hub.clone());
        subscriptions.subscribe(key)?;
        debug!("Mounted {} detail as {}", key, subscriptions.screen_id());
        Ok(Self {
            key,
            subscriptions,
            settings,
        })
    }

    pub fn key(&self) -> MetricKey {
        self.key
    }

    pub fn card(&self) -> DetailCard {
        let state = self
            .subscriptions
            .state(self.key)
            .unwrap_or_else(|| MetricViewState::new(self.key));
        DetailCard {
            key: self.key,
            header: APP_TITLE,
            back_icon: icons().symbol(IconName::ChevronLeft),
            title: self.key.label(),
            icon: icons().metric_image(self.key),
            status: status_text(self.key),
            value: detail_value(&state, &self.settings.default_feed_time),
            caption: caption_text(self.key),
            loading: state.is_loading(),
        }
    }
}

impl Screen for DetailScreen {
    fn route(&self) -> Route {
        detail_route(self.key)
    }

    fn view(&self) -> ScreenView {
        ScreenView::Detail(self.card())
    }

    fn subscriptions(&self) -> &LiveSubscriptions {
        &self.subscriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::navigation::{Router, StackRouter};
    use efishpond_core::RemoteStore;
    use efishpond_sources::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryStore>, TelemetryHub) {
        let store = Arc::new(MemoryStore::new());
        let hub = TelemetryHub::new(store.clone());
        (store, hub)
    }

    #[test]
    fn test_subscribes_to_one_key() {
        let (store, hub) = setup();
        let screen = DetailScreen::mount(&hub, MetricKey::Ph, ScreenSettings::default()).unwrap();
        assert_eq!(screen.subscriptions().subscription_count(), 1);
        assert_eq!(store.listener_count(), 1);
        assert_eq!(screen.route(), Route::PhDetail);
    }

    #[test]
    fn test_temperature_card() {
        let (store, hub) = setup();
        store.set("/sensors/water_temperature", json!({"value": 26.5, "unit": "°C"}));
        let screen =
            DetailScreen::mount(&hub, MetricKey::Temperature, ScreenSettings::default()).unwrap();
        assert!(screen.card().loading);
        assert_eq!(screen.card().value, "--");

        hub.pump();
        let card = screen.card();
        assert_eq!(card.value, "26.5°C");
        assert_eq!(card.title, "Water Temperature");
        assert_eq!(card.status, "Temperature Active");
        assert_eq!(card.caption, "Optimal: 22 - 29 °C");
        assert_eq!(card.header, "e-FishPond");
    }

    #[test]
    fn test_oxygen_absent_shows_no_data() {
        let (_store, hub) = setup();
        let screen =
            DetailScreen::mount(&hub, MetricKey::DissolvedOxygen, ScreenSettings::default())
                .unwrap();
        hub.pump();
        assert_eq!(screen.card().value, "No data");
    }

    #[test]
    fn test_feeder_uses_configured_default() {
        let (store, hub) = setup();
        let settings = ScreenSettings {
            default_feed_time: "6:30 AM".to_string(),
        };
        let screen = DetailScreen::mount(&hub, MetricKey::Feeder, settings).unwrap();
        assert_eq!(screen.card().value, "6:30 AM");

        store.set("/feeder/next_feed_time", json!("12:00 PM"));
        hub.pump();
        assert_eq!(screen.card().value, "12:00 PM");
    }

    #[test]
    fn test_back_pops_router() {
        let (_store, hub) = setup();
        let screen = DetailScreen::mount(&hub, MetricKey::Feeder, ScreenSettings::default()).unwrap();
        let mut router = StackRouter::new();
        router.push(Route::FeederDetail);
        assert!(screen.back(&mut router));
        assert_eq!(router.current(), Route::Home);
    }
}
