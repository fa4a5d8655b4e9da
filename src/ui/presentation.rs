//! Metric presentation - turns per-key view state into renderable rows

use super::icons::{Glyph, IconResolver};
use super::navigation::{detail_route, Route};
use crate::core::ViewStates;
use efishpond_core::{LOADING_TEXT, NO_DATA_TEXT};
use efishpond_types::{MetricKey, MetricState, MetricViewState};

/// One row of a metric list
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub key: MetricKey,
    pub label: &'static str,
    pub icon: Glyph,
    pub display_value: String,
    /// Secondary line under the label (feeder only)
    pub sub_label: Option<String>,
    pub loading: bool,
    pub is_navigable: bool,
    /// Where tapping the row goes
    pub route: Route,
}

/// Value text for a row
///
/// Loading shows `--`. A settled key without a reading shows `No data`,
/// except the feeder, which shows nothing. Otherwise the reading is shown as
/// value followed by unit, or the feed time as is.
pub fn display_value(state: &MetricViewState) -> String {
    match &state.state {
        MetricState::Loading => LOADING_TEXT.to_string(),
        MetricState::NoValue if state.key.is_feeder() => String::new(),
        MetricState::NoValue => NO_DATA_TEXT.to_string(),
        MetricState::HasValue(reading) => reading.to_string(),
    }
}

/// Headline value on a detail card
///
/// Same as [`display_value`] for sensors. The feeder card shows the
/// scheduled time once known and `default_feed_time` until then, including
/// while loading and when the store reports no schedule.
pub fn detail_value(state: &MetricViewState, default_feed_time: &str) -> String {
    if !state.key.is_feeder() {
        return display_value(state);
    }
    match state.reading() {
        Some(reading) => reading.to_string(),
        None => default_feed_time.to_string(),
    }
}

/// `Next Feed: ...` line for the feeder row
pub fn feeder_sub_label(state: &MetricViewState, default_feed_time: &str) -> String {
    format!("Next Feed: {}", detail_value(state, default_feed_time))
}

/// Build rows for `keys`, in order
///
/// A key with no view state (not subscribed) renders as loading.
pub fn build_rows(
    keys: &[MetricKey],
    states: &ViewStates,
    icons: &IconResolver,
    default_feed_time: &str,
) -> Vec<MetricRow> {
    keys.iter()
        .map(|&key| {
            let state = states
                .get(&key)
                .cloned()
                .unwrap_or_else(|| MetricViewState::new(key));
            let route = detail_route(key);
            MetricRow {
                key,
                label: key.label(),
                icon: icons.metric_image(key),
                display_value: display_value(&state),
                sub_label: key
                    .is_feeder()
                    .then(|| feeder_sub_label(&state, default_feed_time)),
                loading: state.is_loading(),
                is_navigable: route.metric().is_some(),
                route,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::icons::icons;
    use efishpond_core::DEFAULT_FEED_TIME;
    use efishpond_types::{FeederSchedule, Reading, SensorReading, Update};

    fn settled(key: MetricKey, update: Update) -> MetricViewState {
        let mut state = MetricViewState::new(key);
        state.apply(update);
        state
    }

    fn sensor(value: f64, unit: &str) -> Update {
        Update::Value(Reading::Sensor(SensorReading::new(value, unit)))
    }

    #[test]
    fn test_loading_shows_dashes() {
        for key in MetricKey::ALL {
            assert_eq!(display_value(&MetricViewState::new(key)), "--");
        }
    }

    #[test]
    fn test_value_and_unit_concatenated() {
        assert_eq!(display_value(&settled(MetricKey::Ph, sensor(6.8, ""))), "6.8");
        assert_eq!(
            display_value(&settled(MetricKey::Temperature, sensor(26.5, "°C"))),
            "26.5°C"
        );
    }

    #[test]
    fn test_no_value_policy() {
        assert_eq!(
            display_value(&settled(MetricKey::DissolvedOxygen, Update::Empty)),
            "No data"
        );
        assert_eq!(display_value(&settled(MetricKey::Feeder, Update::Empty)), "");
    }

    #[test]
    fn test_feeder_schedule_verbatim() {
        let state = settled(
            MetricKey::Feeder,
            Update::Value(Reading::Feeder(FeederSchedule::new("8:00 AM"))),
        );
        assert_eq!(display_value(&state), "8:00 AM");
        assert_eq!(detail_value(&state, DEFAULT_FEED_TIME), "8:00 AM");
    }

    #[test]
    fn test_feeder_detail_defaults() {
        let loading = MetricViewState::new(MetricKey::Feeder);
        assert_eq!(detail_value(&loading, DEFAULT_FEED_TIME), "4:00 PM");
        let empty = settled(MetricKey::Feeder, Update::Empty);
        assert_eq!(detail_value(&empty, DEFAULT_FEED_TIME), "4:00 PM");
        assert_eq!(feeder_sub_label(&empty, "9:15 AM"), "Next Feed: 9:15 AM");
    }

    #[test]
    fn test_rows_follow_requested_order() {
        let mut states = ViewStates::new();
        states.insert(MetricKey::Ph, settled(MetricKey::Ph, sensor(7.1, "")));

        let keys = [MetricKey::Feeder, MetricKey::Ph, MetricKey::Temperature];
        let rows = build_rows(&keys, &states, icons(), DEFAULT_FEED_TIME);

        let order: Vec<MetricKey> = rows.iter().map(|r| r.key).collect();
        assert_eq!(order, keys.to_vec());

        assert_eq!(rows[1].display_value, "7.1");
        assert!(!rows[1].loading);
        assert_eq!(rows[1].label, "pH Level");
        assert_eq!(rows[1].route, Route::PhDetail);

        assert!(rows[2].loading);
        assert_eq!(rows[2].display_value, "--");

        assert_eq!(rows[0].sub_label.as_deref(), Some("Next Feed: 4:00 PM"));
        assert!(rows[1].sub_label.is_none());
        assert!(rows.iter().all(|r| r.is_navigable));
    }
}
