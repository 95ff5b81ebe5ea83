//! Free-form attribute maps with shallow-merge semantics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered string-to-value mapping used for event properties and profile
/// attributes.
///
/// Merging is shallow: an incoming key overwrites the stored value for that
/// key, keys absent from the incoming map are left untouched. Nested objects
/// are replaced wholesale, never merged recursively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Overlays `incoming` onto this map. Shared keys take the incoming
    /// value, keys only present here survive unchanged.
    pub fn merge(&mut self, incoming: &Attributes) {
        for (key, value) in &incoming.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Converts into a JSON object value for storage.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Builds an attribute map from a stored JSON value. Anything other than
    /// an object (including null) yields an empty map.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
