//! Applying resolved property values to the live store.

use std::fmt;
use std::sync::Arc;

use keel_core::{Attributes, OperationResult, Value};
use tracing::debug;

use crate::definition::VALUE;
use crate::resolve::resolve_value;
use crate::store::PropertyStore;
use crate::updater::SystemPropertyUpdater;

/// Writes properties to the store and notifies the updater. Shared by every
/// system-property handler of one registry.
#[derive(Clone)]
pub struct PropertyApplier {
    store: Arc<dyn PropertyStore>,
    updater: Option<Arc<dyn SystemPropertyUpdater>>,
}

impl PropertyApplier {
    pub fn new(
        store: Arc<dyn PropertyStore>,
        updater: Option<Arc<dyn SystemPropertyUpdater>>,
    ) -> Self {
        Self { store, updater }
    }

    pub fn store(&self) -> &dyn PropertyStore {
        self.store.as_ref()
    }

    pub fn updater(&self) -> Option<&dyn SystemPropertyUpdater> {
        self.updater.as_deref()
    }

    /// Whether `name` may change in the running process. Without an updater
    /// nothing touches the process.
    pub fn runtime_update_allowed(&self, name: &str, value: Option<&str>, booting: bool) -> bool {
        self.updater
            .as_ref()
            .is_some_and(|updater| updater.is_runtime_update_allowed(name, value, booting))
    }

    /// Current live value.
    pub fn current(&self, name: &str) -> Option<String> {
        self.store.get(name)
    }

    /// Set `name`, or clear it for `None`, then notify the updater.
    pub fn set_property(&self, name: &str, value: Option<&str>) {
        match value {
            Some(value) => self.store.set(name, value),
            None => self.store.clear(name),
        }
        debug!(property = name, value, "system property applied");
        if let Some(updater) = &self.updater {
            updater.property_updated(name, value);
        }
    }

    /// Resolve the `value` attribute of a stored model.
    pub fn resolve_model(&self, model: &Attributes) -> OperationResult<Option<String>> {
        let value = model.get(VALUE).unwrap_or(&Value::Undefined);
        resolve_value(value, self.store.as_ref())
    }
}

impl fmt::Debug for PropertyApplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyApplier")
            .field("has_updater", &self.updater.is_some())
            .finish()
    }
}
