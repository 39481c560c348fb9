//! REMOVE - deletes a resource without children.

use keel_core::{names, Operation, OperationResult};
use keel_registry::OperationDefinition;
use keel_tree::ResourceNode;

use crate::context::OperationContext;
use crate::step::StepHandler;

pub fn remove_definition() -> OperationDefinition {
    OperationDefinition::new(names::REMOVE)
}

/// Remove the addressed resource from the model. Returns what was removed.
pub fn remove_from_model(
    context: &mut OperationContext<'_>,
    operation: &Operation,
) -> OperationResult<ResourceNode> {
    context.remove_resource(operation.address())
}

/// Model-only REMOVE.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveHandler;

impl StepHandler for RemoveHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        remove_from_model(context, operation)?;
        Ok(())
    }
}
