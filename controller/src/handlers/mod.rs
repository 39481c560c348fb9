//! Generic model handlers.
//!
//! These operate on the transaction's working copy in MODEL only. Resources
//! with live runtime state wrap them and add their own RUNTIME steps.

mod add;
mod read;
mod remove;
mod write_attribute;

pub use add::{add_definition, create_and_populate, AddHandler};
pub use read::{
    read_attribute_definition, read_children_names_definition, read_resource_definition,
    ReadAttributeHandler, ReadChildrenNamesHandler, ReadResourceHandler, INCLUDE_DEFAULTS,
};
pub use remove::{remove_definition, remove_from_model, RemoveHandler};
pub use write_attribute::{
    write_attribute_definition, write_model_attribute, AttributeChange, WriteAttributeHandler,
};

use std::sync::Arc;

use keel_registry::{RegistryBuilder, RegistryError};

use crate::step::SharedHandler;

/// Register the operations every address supports: the reads,
/// `write-attribute` and `remove`. Resource registrations may override them.
pub fn register_global_operations(
    builder: &mut RegistryBuilder<SharedHandler>,
) -> Result<(), RegistryError> {
    builder
        .add_global_operation(read_resource_definition(), Arc::new(ReadResourceHandler))?
        .add_global_operation(read_attribute_definition(), Arc::new(ReadAttributeHandler))?
        .add_global_operation(
            read_children_names_definition(),
            Arc::new(ReadChildrenNamesHandler),
        )?
        .add_global_operation(write_attribute_definition(), Arc::new(WriteAttributeHandler))?
        .add_global_operation(remove_definition(), Arc::new(RemoveHandler))?;
    Ok(())
}
