//! ADD - creates a resource and populates its attributes.

use keel_core::{names, Attributes, Operation, OperationResult};
use keel_registry::{validation, AttrDef, OperationDefinition};

use crate::context::OperationContext;
use crate::step::StepHandler;

/// Definition of `add` for a resource with `attributes`. Every attribute is
/// accepted as a parameter.
pub fn add_definition(attributes: &[AttrDef]) -> OperationDefinition {
    OperationDefinition::new(names::ADD).params(attributes.iter().cloned())
}

/// Create the addressed resource and store its validated attributes.
///
/// Fails if the resource exists or its parent does not. All attributes are
/// validated before any is stored. Returns the stored attributes.
pub fn create_and_populate(
    context: &mut OperationContext<'_>,
    operation: &Operation,
) -> OperationResult<Attributes> {
    let address = operation.address();
    let definition = context.resource_definition(address)?;
    let node = context.create_resource(address)?;

    let validated = validation::validate_attributes(&definition.attributes, operation.params())?;
    node.replace_attributes(validated.clone());
    Ok(validated)
}

/// Model-only ADD.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddHandler;

impl StepHandler for AddHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        create_and_populate(context, operation)?;
        Ok(())
    }
}
