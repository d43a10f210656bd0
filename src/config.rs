//! Serialization options.

use serde::{Deserialize, Serialize};

/// Free-form parameters forwarded to every (nested) `serialize` call.
///
/// The base serialization ignores them; entity types that override
/// `serialize` or `to_hash` may consult them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializeOptions {
    params: serde_json::Map<String, serde_json::Value>,
}

impl SerializeOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the options with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.params.get(key)
    }

    /// Value of `key` if it is a JSON boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(serde_json::Value::as_bool)
    }

}

/// What happens to already-applied fields when `deserialize` fails midway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeserializeMode {
    /// Fields are applied to a copy that replaces the entity's state only if
    /// every field succeeds. A failure leaves the entity untouched.
    #[default]
    Atomic,
    /// Fields are applied in place one by one. A failure leaves the fields
    /// applied before it.
    Eager,
}

/// Options for `deserialize_with`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeserializeOptions {
    /// Failure behavior.
    #[serde(default)]
    pub mode: DeserializeMode,
}

impl DeserializeOptions {
    /// All-or-nothing deserialization (the default).
    #[must_use]
    pub const fn atomic() -> Self {
        Self {
            mode: DeserializeMode::Atomic,
        }
    }

    /// In-place deserialization that keeps fields applied before a failure.
    #[must_use]
    pub const fn eager() -> Self {
        Self {
            mode: DeserializeMode::Eager,
        }
    }
}
