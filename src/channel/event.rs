//! # Change Notifications
//!
//! Notification payloads for key changes, the tagged union both kinds are
//! normalized into, and the wire-format classification predicate.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Discriminant tag carried by in-context change notifications.
///
/// Distinct from [`NATIVE_SIGNAL`] so one listener can tell the two
/// notification kinds apart without a second registry.
pub const CHANGE_SIGNAL: &str = "keysync:change";

/// Discriminant tag carried by the store's native cross-context signal.
pub const NATIVE_SIGNAL: &str = "storage";

/// In-context change notification.
///
/// Broadcast by the storage facade after a successful mutation. Carries the
/// pre-serialization logical value so in-context observers skip a redundant
/// decode. Deletions carry the empty-string sentinel because the payload
/// always holds a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    /// Key that changed
    pub key: String,
    /// Post-change logical value (empty-string sentinel for deletions)
    pub value: Value,
}

impl ChangeNotification {
    /// Create a notification for a written value. Pure; always succeeds.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Create the deletion notification (empty-string sentinel).
    pub fn deleted(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::String(String::new()),
        }
    }

    /// Serialize to the tagged wire format.
    pub fn to_wire(&self) -> Value {
        json!({
            "type": CHANGE_SIGNAL,
            "payload": {
                "key": self.key,
                "value": self.value,
            }
        })
    }
}

/// Native cross-context change notification, as supplied by the store.
///
/// `new_value: None` signals deletion, or that the key no longer exists in
/// the notifying context's store snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeChangeNotification {
    /// Key that changed
    pub key: String,
    /// Raw post-change value (`None` = absent)
    #[serde(rename = "newValue")]
    pub new_value: Option<String>,
    /// Raw pre-change value, when the store knows it
    #[serde(rename = "oldValue", skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
}

impl NativeChangeNotification {
    /// Create a native notification.
    pub fn new(
        key: impl Into<String>,
        new_value: Option<String>,
        old_value: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            new_value,
            old_value,
        }
    }

    /// Serialize to the flat wire format used by the store's signal.
    pub fn to_wire(&self) -> Value {
        json!({
            "type": NATIVE_SIGNAL,
            "key": self.key,
            "newValue": self.new_value,
            "oldValue": self.old_value,
        })
    }
}

/// Returns true iff `candidate` is an in-context change notification:
/// non-absent, carrying a payload, with the discriminant tag equal to
/// [`CHANGE_SIGNAL`]. Anything not matching the shape is "not a match";
/// malformed input never panics.
pub fn is_change_notification(candidate: &Value) -> bool {
    candidate
        .as_object()
        .map(|obj| {
            obj.get("type").and_then(Value::as_str) == Some(CHANGE_SIGNAL)
                && obj.get("payload").map(|p| !p.is_null()).unwrap_or(false)
        })
        .unwrap_or(false)
}

/// A key-change notification, normalized into one variant at the boundary
/// where notifications enter the system.
///
/// Dispatch inside the crate is on the variant; runtime shape inspection
/// happens once, in [`StorageEvent::from_wire`].
#[derive(Debug, Clone, PartialEq)]
pub enum StorageEvent {
    /// In-context broadcast: rich payload, same-context only
    Local(ChangeNotification),
    /// Native cross-context signal: string-only payload, best-effort
    Remote(NativeChangeNotification),
}

impl StorageEvent {
    /// Key the event refers to, regardless of kind.
    pub fn key(&self) -> &str {
        match self {
            StorageEvent::Local(change) => &change.key,
            StorageEvent::Remote(change) => &change.key,
        }
    }

    /// Classifies an untyped wire payload into the internal variant.
    ///
    /// Returns `None` for anything that is neither notification kind;
    /// malformed shapes are non-matches, never errors.
    pub fn from_wire(candidate: &Value) -> Option<StorageEvent> {
        if is_change_notification(candidate) {
            let payload = candidate.get("payload")?;
            let key = payload.get("key")?.as_str()?;
            let value = payload.get("value")?.clone();
            return Some(StorageEvent::Local(ChangeNotification::new(key, value)));
        }

        let obj = candidate.as_object()?;
        if obj.get("type").and_then(Value::as_str) != Some(NATIVE_SIGNAL) {
            return None;
        }
        let key = obj.get("key")?.as_str()?;
        let new_value = match obj.get("newValue") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_str()?.to_string()),
        };
        let old_value = obj
            .get("oldValue")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(StorageEvent::Remote(NativeChangeNotification {
            key: key.to_string(),
            new_value,
            old_value,
        }))
    }

    /// Serialize to the wire format of the underlying kind.
    pub fn to_wire(&self) -> Value {
        match self {
            StorageEvent::Local(change) => change.to_wire(),
            StorageEvent::Remote(change) => change.to_wire(),
        }
    }
}
