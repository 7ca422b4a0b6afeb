//! Shared metadata handle and the write contract for the reserved key.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Reserved metadata key owned by the logging context.
pub const RAW_REQUEST_KEY: &str = "raw_request";

/// Reference to one call's metadata mapping.
///
/// Cloning the handle clones the reference, not the data.
#[derive(Clone, Default)]
pub struct MetadataHandle {
    inner: Arc<RwLock<Map<String, Value>>>,
}

impl MetadataHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// True when both handles point at the same mapping.
    pub fn ptr_eq(&self, other: &MetadataHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// String value of `key`, if it holds a string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.read().get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.write().insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Faithful copy of the mapping at this instant.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Map<String, Value>> {
        // A poisoned lock only means a writer panicked mid-insert; the map is still usable.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Map<String, Value>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for MetadataHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataHandle")
            .field("keys", &self.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Serialize for MetadataHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MetadataHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(MetadataHandle::from_map)
    }
}

impl From<Map<String, Value>> for MetadataHandle {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

/// Call-level parameters forwarded to callbacks alongside the messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LitellmParams {
    /// Caller metadata. `None` until something needs to write to it.
    pub metadata: Option<MetadataHandle>,

    pub api_base: Option<String>,

    pub custom_llm_provider: Option<String>,
}

/// Return the call's metadata, attaching an empty mapping if none exists yet.
pub fn ensure_metadata(params: &mut LitellmParams) -> MetadataHandle {
    params.metadata.get_or_insert_with(MetadataHandle::new).clone()
}

/// Write the reserved `raw_request` key, leaving every other key untouched.
pub fn set_raw_request(metadata: &MetadataHandle, value: impl Into<String>) {
    let previous = metadata.insert(RAW_REQUEST_KEY, Value::String(value.into()));
    if let Some(prev) = previous {
        if !prev.is_string() {
            tracing::debug!(
                previous_type = %json_type(&prev),
                "Replaced non-string value under reserved raw_request key"
            );
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
