//! The live property store the RUNTIME stage writes to.

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock};

/// Process-wide key/value properties.
pub trait PropertyStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str);
    fn clear(&self, name: &str);
}

/// A call made against an [`InMemoryPropertyStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyCall {
    Set { name: String, value: String },
    Clear { name: String },
}

impl PropertyCall {
    pub fn name(&self) -> &str {
        match self {
            PropertyCall::Set { name, .. } | PropertyCall::Clear { name } => name,
        }
    }
}

/// Property store backed by a map. Records every mutating call in order.
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    values: RwLock<BTreeMap<String, String>>,
    calls: Mutex<Vec<PropertyCall>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate values without recording calls.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every set/clear call so far.
    pub fn calls(&self) -> Vec<PropertyCall> {
        self.calls.lock().clone()
    }

    /// Calls that touched `name`.
    pub fn calls_for(&self, name: &str) -> Vec<PropertyCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.name() == name)
            .cloned()
            .collect()
    }

    /// Current contents.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.values.read().clone()
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.read().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.values.write().insert(name.to_string(), value.to_string());
        self.calls.lock().push(PropertyCall::Set {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn clear(&self, name: &str) {
        self.values.write().remove(name);
        self.calls.lock().push(PropertyCall::Clear {
            name: name.to_string(),
        });
    }
}
