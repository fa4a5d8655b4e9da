//! Shared constants for the dashboard

use std::time::Duration;

/// Display value while a metric has not heard from the store yet
pub const LOADING_TEXT: &str = "--";

/// Display value once the store reports a sensor path as empty
pub const NO_DATA_TEXT: &str = "No data";

/// Feed time shown before the feeder path has delivered a schedule
pub const DEFAULT_FEED_TIME: &str = "4:00 PM";

/// Period of the UI event loop
pub const EVENT_LOOP_INTERVAL: Duration = Duration::from_millis(250);

/// Application name shown in screen headers
pub const APP_TITLE: &str = "e-FishPond";
