//! The `system-property=<name>` resource and its registration.

use std::fmt;
use std::sync::Arc;

use keel_controller::handlers::{add_definition, remove_definition, write_attribute_definition};
use keel_controller::OperationRegistryBuilder;
use keel_core::{names, Operation, PathAddress, PathElement, ValueType};
use keel_registry::{AttrDef, RegistryError};

use crate::add::SystemPropertyAddHandler;
use crate::apply::PropertyApplier;
use crate::remove::SystemPropertyRemoveHandler;
use crate::store::PropertyStore;
use crate::updater::SystemPropertyUpdater;
use crate::write::SystemPropertyWriteHandler;

pub const SYSTEM_PROPERTY: &str = "system-property";
pub const VALUE: &str = names::VALUE;
pub const BOOT_TIME: &str = "boot-time";

/// Attributes of a system property. `boot-time` only exists when supported.
pub fn attributes(use_boottime: bool) -> Vec<AttrDef> {
    let mut attributes = vec![AttrDef::new(VALUE, ValueType::String).allow_expression()];
    if use_boottime {
        attributes.push(AttrDef::new(BOOT_TIME, ValueType::Bool).with_default(true));
    }
    attributes
}

/// How system properties behave in this process.
#[derive(Clone, Default)]
pub struct SystemPropertyConfig {
    /// Whether the `boot-time` attribute is supported.
    pub use_boottime: bool,
    /// Runtime update policy. Without one, properties are model-only.
    pub updater: Option<Arc<dyn SystemPropertyUpdater>>,
}

impl SystemPropertyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boottime(mut self, use_boottime: bool) -> Self {
        self.use_boottime = use_boottime;
        self
    }

    pub fn with_updater(mut self, updater: Arc<dyn SystemPropertyUpdater>) -> Self {
        self.updater = Some(updater);
        self
    }
}

impl fmt::Debug for SystemPropertyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemPropertyConfig")
            .field("use_boottime", &self.use_boottime)
            .field("has_updater", &self.updater.is_some())
            .finish()
    }
}

/// Register `system-property=*` with its add, remove and write-attribute
/// handlers, all writing through `store`.
pub fn register(
    builder: &mut OperationRegistryBuilder,
    store: Arc<dyn PropertyStore>,
    config: SystemPropertyConfig,
) -> Result<(), RegistryError> {
    let attributes = attributes(config.use_boottime);
    let applier = PropertyApplier::new(store, config.updater);

    builder
        .add_resource(PathAddress::new(vec![PathElement::wildcard(SYSTEM_PROPERTY)]))
        .attrs(attributes.iter().cloned())
        .operation(
            add_definition(&attributes),
            Arc::new(SystemPropertyAddHandler::new(applier.clone())),
        )
        .operation(
            remove_definition(),
            Arc::new(SystemPropertyRemoveHandler::new(applier.clone())),
        )
        .operation(
            write_attribute_definition(),
            Arc::new(SystemPropertyWriteHandler::new(applier)),
        )
        .done()
}

/// Address of the property `name`.
pub fn address(name: &str) -> PathAddress {
    PathAddress::new(vec![PathElement::new(SYSTEM_PROPERTY, name)])
}

/// An `add` request for the property `name`.
pub fn add_operation(name: &str, value: Option<&str>, boot_time: Option<bool>) -> Operation {
    let mut operation = Operation::new(names::ADD, address(name));
    if let Some(value) = value {
        operation = operation.with_param(VALUE, value);
    }
    if let Some(boot_time) = boot_time {
        operation = operation.with_param(BOOT_TIME, boot_time);
    }
    operation
}

/// A `remove` request for the property `name`.
pub fn remove_operation(name: &str) -> Operation {
    Operation::new(names::REMOVE, address(name))
}

/// A `write-attribute` request setting `value` of the property `name`.
pub fn write_value_operation(name: &str, value: Option<&str>) -> Operation {
    let operation = Operation::new(names::WRITE_ATTRIBUTE, address(name)).with_param(names::NAME, VALUE);
    match value {
        Some(value) => operation.with_param(names::VALUE, value),
        None => operation,
    }
}
