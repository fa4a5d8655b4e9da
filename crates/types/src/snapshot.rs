//! Point-in-time notifications from the remote store

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One notification of a remote path's existence and value
///
/// A path with no value is reported as `exists: false` and a `null` value,
/// which is different from not having heard from the store at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub exists: bool,
    #[serde(default)]
    pub value: Value,
}

impl Snapshot {
    /// Snapshot of a path holding `value` (`null` counts as absent)
    pub fn new(value: Value) -> Self {
        Self {
            exists: !value.is_null(),
            value,
        }
    }

    /// Snapshot of a path with no value
    pub fn absent() -> Self {
        Self {
            exists: false,
            value: Value::Null,
        }
    }

    /// The payload, if the path currently holds one
    pub fn value(&self) -> Option<&Value> {
        if self.exists {
            Some(&self.value)
        } else {
            None
        }
    }
}
