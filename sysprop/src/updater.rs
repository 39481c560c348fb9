//! Runtime update policy for system properties.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use tracing::debug;

/// Decides whether a property may change in the running process, and hears
/// about every change that is made.
pub trait SystemPropertyUpdater: Send + Sync {
    fn is_runtime_update_allowed(&self, name: &str, value: Option<&str>, booting: bool) -> bool;

    fn property_updated(&self, name: &str, value: Option<&str>);
}

/// An applied update: the name and its new value, `None` when cleared.
pub type PropertyUpdate = (String, Option<String>);

/// Updater for the local process environment.
///
/// Protected names are read once at startup and may only be set while
/// booting; every other name can change at any time.
#[derive(Debug, Default)]
pub struct ProcessEnvironmentUpdater {
    protected: BTreeSet<String>,
    updates: Mutex<Vec<PropertyUpdate>>,
}

impl ProcessEnvironmentUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protected<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected: names.into_iter().map(Into::into).collect(),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.contains(name)
    }

    /// Every update notification so far, oldest first.
    pub fn updates(&self) -> Vec<PropertyUpdate> {
        self.updates.lock().clone()
    }
}

impl SystemPropertyUpdater for ProcessEnvironmentUpdater {
    fn is_runtime_update_allowed(&self, name: &str, _value: Option<&str>, booting: bool) -> bool {
        booting || !self.is_protected(name)
    }

    fn property_updated(&self, name: &str, value: Option<&str>) {
        debug!(property = name, value, "process environment updated");
        self.updates
            .lock()
            .push((name.to_string(), value.map(str::to_string)));
    }
}
