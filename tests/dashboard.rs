//! End-to-end screen behaviour against the in-memory store

use efishpond::core::TelemetryHub;
use efishpond::ui::{
    icons, mount, DetailScreen, Route, Router, Screen, ScreenSettings, ScreenView, StackRouter,
    SummaryScreen,
};
use efishpond_core::RemoteStore;
use efishpond_sources::MemoryStore;
use efishpond_types::MetricKey;
use serde_json::json;
use std::sync::Arc;

fn setup() -> (Arc<MemoryStore>, TelemetryHub) {
    let store = Arc::new(MemoryStore::new());
    let hub = TelemetryHub::new(store.clone());
    (store, hub)
}

#[test]
fn summary_ph_row_shows_reading() {
    let (store, hub) = setup();
    let summary = SummaryScreen::mount(&hub, ScreenSettings::default()).unwrap();
    hub.pump();

    store.set("/sensors/ph_level", json!({"value": 7.1, "unit": ""}));
    hub.pump();

    let row = summary.row(MetricKey::Ph).unwrap();
    assert_eq!(row.display_value, "7.1");
    assert!(!row.loading);
}

#[test]
fn feeder_detail_keeps_default_without_snapshot() {
    let (_store, hub) = setup();
    let screen = DetailScreen::mount(&hub, MetricKey::Feeder, ScreenSettings::default()).unwrap();
    for _ in 0..5 {
        hub.pump();
        assert_eq!(screen.card().value, "4:00 PM");
    }
}

#[test]
fn oxygen_detail_absent_value_shows_no_data() {
    let (store, hub) = setup();
    store.set("/sensors/dissolved_oxygen", json!({"value": 6.2, "unit": "mg/L"}));
    let screen =
        DetailScreen::mount(&hub, MetricKey::DissolvedOxygen, ScreenSettings::default()).unwrap();
    assert_eq!(screen.card().value, "--");

    hub.pump();
    assert_eq!(screen.card().value, "6.2mg/L");

    store.remove("/sensors/dissolved_oxygen");
    hub.pump();
    assert_eq!(screen.card().value, "No data");
}

#[test]
fn summary_and_detail_share_one_listener() {
    let (store, hub) = setup();
    let summary = SummaryScreen::mount(&hub, ScreenSettings::default()).unwrap();
    let detail =
        DetailScreen::mount(&hub, MetricKey::Temperature, ScreenSettings::default()).unwrap();
    assert_eq!(store.listener_count(), 4);
    assert_eq!(hub.ref_count(MetricKey::Temperature), 2);

    store.set("/sensors/water_temperature", json!({"value": 26.5, "unit": "°C"}));
    hub.pump();
    assert_eq!(summary.row(MetricKey::Temperature).unwrap().display_value, "26.5°C");
    assert_eq!(detail.card().value, "26.5°C");

    drop(detail);
    assert_eq!(hub.ref_count(MetricKey::Temperature), 1);
    assert_eq!(store.listener_count(), 4);

    drop(summary);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn late_joiner_sees_cached_value() {
    let (store, hub) = setup();
    store.set("/feeder/next_feed_time", json!("8:00 AM"));
    let _summary = SummaryScreen::mount(&hub, ScreenSettings::default()).unwrap();
    hub.pump();

    let detail = DetailScreen::mount(&hub, MetricKey::Feeder, ScreenSettings::default()).unwrap();
    assert!(detail.card().loading);
    hub.pump();
    assert!(!detail.card().loading);
    assert_eq!(detail.card().value, "8:00 AM");
}

#[test]
fn updates_after_unmount_are_ignored() {
    let (store, hub) = setup();
    let screen = DetailScreen::mount(&hub, MetricKey::Ph, ScreenSettings::default()).unwrap();
    store.set("/sensors/ph_level", json!({"value": 7.0, "unit": ""}));
    drop(screen);

    assert_eq!(hub.pump(), 0);
    assert_eq!(hub.subscription_count(), 0);
}

#[test]
fn navigation_round_trip_remounts_fresh() {
    let (store, hub) = setup();
    store.set("/sensors/ph_level", json!({"value": 6.8, "unit": ""}));
    let mut router = StackRouter::new();

    let home = SummaryScreen::mount(&hub, ScreenSettings::default()).unwrap();
    hub.pump();
    assert!(home.select(MetricKey::Ph, &mut router));
    drop(home);

    let detail = mount(router.current(), &hub, ScreenSettings::default()).unwrap();
    assert_eq!(detail.route(), Route::PhDetail);
    match detail.view() {
        ScreenView::Detail(card) => assert!(card.loading),
        other => panic!("expected detail, got {:?}", other),
    }
    hub.pump();
    match detail.view() {
        ScreenView::Detail(card) => assert_eq!(card.value, "6.8"),
        other => panic!("expected detail, got {:?}", other),
    }

    assert!(detail.back(&mut router));
    assert_eq!(router.current(), Route::Home);
}

#[test]
fn unknown_icon_name_falls_back() {
    let glyph = icons().resolve("nonexistent-name");
    assert!(glyph.is_fallback());
}
