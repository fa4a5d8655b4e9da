//! Sensor readings and feeder schedules as delivered by the remote store

use crate::metric::MetricKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A single sensor value with its unit (e.g. `26.5` / `"°C"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl SensorReading {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Next scheduled feed, already formatted for display (e.g. `"4:00 PM"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeederSchedule {
    pub next_feed_time: String,
}

impl FeederSchedule {
    pub fn new(next_feed_time: impl Into<String>) -> Self {
        Self {
            next_feed_time: next_feed_time.into(),
        }
    }
}

impl fmt::Display for FeederSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.next_feed_time)
    }
}

/// A captured value for any metric key
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Sensor(SensorReading),
    Feeder(FeederSchedule),
}

impl Reading {
    /// Decode a snapshot payload for `key`
    ///
    /// Sensor paths carry `{ "value": <number>, "unit": <string> }`. The feeder
    /// path carries a bare string; an object with `next_feed_time` is also
    /// accepted.
    pub fn decode(key: MetricKey, value: &Value) -> Result<Self, ReadingError> {
        if key.is_feeder() {
            return match value {
                Value::String(text) => Ok(Reading::Feeder(FeederSchedule::new(text.clone()))),
                Value::Object(_) => serde_json::from_value::<FeederSchedule>(value.clone())
                    .map(Reading::Feeder)
                    .map_err(|e| ReadingError::Malformed { key, reason: e.to_string() }),
                other => Err(ReadingError::UnexpectedType {
                    key,
                    expected: "string",
                    found: json_type_name(other),
                }),
            };
        }

        match value {
            Value::Object(_) => serde_json::from_value::<SensorReading>(value.clone())
                .map(Reading::Sensor)
                .map_err(|e| ReadingError::Malformed { key, reason: e.to_string() }),
            other => Err(ReadingError::UnexpectedType {
                key,
                expected: "object",
                found: json_type_name(other),
            }),
        }
    }

    pub fn as_sensor(&self) -> Option<&SensorReading> {
        match self {
            Reading::Sensor(reading) => Some(reading),
            Reading::Feeder(_) => None,
        }
    }

    pub fn as_feeder(&self) -> Option<&FeederSchedule> {
        match self {
            Reading::Feeder(schedule) => Some(schedule),
            Reading::Sensor(_) => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Sensor(reading) => reading.fmt(f),
            Reading::Feeder(schedule) => schedule.fmt(f),
        }
    }
}

/// A snapshot payload that could not be turned into a [`Reading`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadingError {
    #[error("{key}: expected {expected}, found {found}")]
    UnexpectedType {
        key: MetricKey,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{key}: malformed payload: {reason}")]
    Malformed { key: MetricKey, reason: String },
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
