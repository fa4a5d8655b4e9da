//! Live telemetry subscriptions

mod live_subscriptions;
mod telemetry_hub;

pub use live_subscriptions::{LiveSubscriptions, ViewStates};
pub use telemetry_hub::{ScreenId, SubscriptionHandle, SubscriptionId, TelemetryHub};
