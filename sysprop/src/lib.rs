//! Keel System Properties
//!
//! The `system-property=<name>` resource: a model entry whose value is also
//! applied to a live property store.
//!
//! Responsibilities:
//! - Resolve `${...}` expressions against the store
//! - Apply values in RUNTIME, or require a reload where updates are not allowed
//! - Defer values that reference properties applied later in the transaction
//! - Restore prior live values on rollback

mod add;
mod apply;
mod deferred;
mod definition;
mod remove;
mod resolve;
mod runtime;
mod store;
mod updater;
mod write;

pub use add::SystemPropertyAddHandler;
pub use apply::PropertyApplier;
pub use deferred::{
    defer, forget_deferred, process_deferred_properties, retry_deferred, DeferredEntry,
    DeferredProperties, DEFERRED_PROPERTIES,
};
pub use definition::{
    add_operation, address, attributes, register, remove_operation, write_value_operation,
    SystemPropertyConfig, BOOT_TIME, SYSTEM_PROPERTY, VALUE,
};
pub use remove::SystemPropertyRemoveHandler;
pub use resolve::{resolve_expression, resolve_value};
pub use runtime::{property_name, RuntimeAction};
pub use store::{InMemoryPropertyStore, PropertyCall, PropertyStore};
pub use updater::{ProcessEnvironmentUpdater, PropertyUpdate, SystemPropertyUpdater};
pub use write::SystemPropertyWriteHandler;
