//! WRITE-ATTRIBUTE - updates one attribute of an existing resource.

use keel_core::{names, Operation, OperationError, OperationResult, Value, ValueType};
use keel_registry::{validation, AttrDef, OperationDefinition};

use crate::context::OperationContext;
use crate::step::StepHandler;

/// `write-attribute(name, value)`. The value's type is checked against the
/// attribute's own definition, not here.
pub fn write_attribute_definition() -> OperationDefinition {
    OperationDefinition::new(names::WRITE_ATTRIBUTE)
        .param(AttrDef::new(names::NAME, ValueType::String).required())
        .param(AttrDef::new(names::VALUE, ValueType::String))
}

/// A model attribute change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    pub old: Value,
    pub new: Value,
}

/// Validate and store the attribute named by the operation. An undefined
/// value clears the attribute, or resets it to its default.
pub fn write_model_attribute(
    context: &mut OperationContext<'_>,
    operation: &Operation,
) -> OperationResult<AttributeChange> {
    let address = operation.address();
    let name = attribute_name(operation)?;
    let definition = context.resource_definition(address)?;
    let attr = definition.get_attr(name).ok_or_else(|| {
        OperationError::validation(format!("Unknown attribute {} at {}", name, address))
    })?;

    let new = validation::validate_attribute(attr, operation.param(names::VALUE))?;
    let node = context.read_resource_for_update(address)?;
    let old = if new.is_defined() {
        node.set_attr(name, new.clone())
    } else {
        node.remove_attr(name)
    };

    Ok(AttributeChange {
        name: name.to_string(),
        old: old.unwrap_or_default(),
        new,
    })
}

/// The `name` parameter of read/write-attribute.
pub(crate) fn attribute_name(operation: &Operation) -> OperationResult<&str> {
    operation
        .param(names::NAME)
        .and_then(|v| v.as_str())
        .ok_or_else(|| OperationError::validation("Missing required parameter: name"))
}

/// Model-only WRITE-ATTRIBUTE.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteAttributeHandler;

impl StepHandler for WriteAttributeHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        write_model_attribute(context, operation)?;
        Ok(())
    }
}
