//! Read-only operations: read-attribute, read-resource, read-children-names.

use keel_core::{
    names, Attributes, Operation, OperationError, OperationResult, PathAddress, Value, ValueType,
};
use keel_registry::{AttrDef, OperationDefinition, OperationFlag};

use crate::context::OperationContext;
use crate::handlers::write_attribute::attribute_name;
use crate::step::StepHandler;

pub fn read_attribute_definition() -> OperationDefinition {
    OperationDefinition::new(names::READ_ATTRIBUTE)
        .param(AttrDef::new(names::NAME, ValueType::String).required())
        .flag(OperationFlag::ReadOnly)
}

pub fn read_resource_definition() -> OperationDefinition {
    OperationDefinition::new(names::READ_RESOURCE)
        .param(AttrDef::new(names::RECURSIVE, ValueType::Bool).with_default(false))
        .param(AttrDef::new(INCLUDE_DEFAULTS, ValueType::Bool).with_default(true))
        .flag(OperationFlag::ReadOnly)
        .reply(ValueType::Object)
}

pub fn read_children_names_definition() -> OperationDefinition {
    OperationDefinition::new(names::READ_CHILDREN_NAMES)
        .param(AttrDef::new(names::CHILD_TYPE, ValueType::String).required())
        .flag(OperationFlag::ReadOnly)
        .reply_of(ValueType::List, ValueType::String)
}

/// Parameter asking read-resource to fill in unset attributes' defaults.
pub const INCLUDE_DEFAULTS: &str = "include-defaults";

/// Returns an attribute's stored value, or its default.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadAttributeHandler;

impl StepHandler for ReadAttributeHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        let address = operation.address();
        let name = attribute_name(operation)?;
        let definition = context.resource_definition(address)?;
        let attr = definition.get_attr(name).ok_or_else(|| {
            OperationError::validation(format!("Unknown attribute {} at {}", name, address))
        })?;

        let node = context.read_resource(address)?;
        let value = node
            .get_attr(name)
            .cloned()
            .or_else(|| attr.default.clone())
            .unwrap_or_default();
        context.set_result(value);
        Ok(())
    }
}

/// Returns a resource's attributes, optionally with its subtree.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadResourceHandler;

impl StepHandler for ReadResourceHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        let recursive = flag(operation, names::RECURSIVE, false);
        let include_defaults = flag(operation, INCLUDE_DEFAULTS, true);
        let described = describe(context, operation.address(), recursive, include_defaults)?;
        context.set_result(described);
        Ok(())
    }
}

fn flag(operation: &Operation, name: &str, default: bool) -> bool {
    operation
        .param(name)
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

/// Children are grouped by type, then keyed by name.
fn describe(
    context: &OperationContext<'_>,
    address: &PathAddress,
    recursive: bool,
    include_defaults: bool,
) -> OperationResult<Value> {
    let node = context.read_resource(address)?;
    let mut described = node.attributes().clone();

    if include_defaults {
        if let Ok(definition) = context.resource_definition(address) {
            for attr in &definition.attributes {
                if let Some(default) = &attr.default {
                    described
                        .entry(attr.name.clone())
                        .or_insert_with(|| default.clone());
                }
            }
        }
    }

    if recursive {
        let children: Vec<PathAddress> =
            context.model().tree().children(address).cloned().collect();
        for child in children {
            let Some(element) = child.last_element() else {
                continue;
            };
            let child_value = describe(context, &child, true, include_defaults)?;
            let group = described
                .entry(element.key.clone())
                .or_insert_with(|| Value::Object(Attributes::new()));
            if let Value::Object(group) = group {
                group.insert(element.value.clone(), child_value);
            }
        }
    }

    Ok(Value::Object(described))
}

/// Lists the names of a resource's children of one type.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadChildrenNamesHandler;

impl StepHandler for ReadChildrenNamesHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        let address = operation.address();
        let child_type = operation
            .param(names::CHILD_TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| OperationError::validation("Missing required parameter: child-type"))?;

        context.read_resource(address)?;
        let children: Vec<Value> = context
            .model()
            .tree()
            .children(address)
            .filter_map(PathAddress::last_element)
            .filter(|element| element.key == child_type)
            .map(|element| Value::from(element.value.as_str()))
            .collect();
        context.set_result(Value::List(children));
        Ok(())
    }
}
