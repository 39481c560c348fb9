//! REMOVE for system properties.

use keel_controller::handlers::remove_from_model;
use keel_controller::{OperationContext, Stage, StepHandler};
use keel_core::{Attributes, Operation, OperationResult};

use crate::apply::PropertyApplier;
use crate::runtime::{property_name, update_runtime, RuntimeAction};

/// Removes the property resource in MODEL and clears the live value in
/// RUNTIME.
#[derive(Debug, Clone)]
pub struct SystemPropertyRemoveHandler {
    applier: PropertyApplier,
}

impl SystemPropertyRemoveHandler {
    pub fn new(applier: PropertyApplier) -> Self {
        Self { applier }
    }
}

impl StepHandler for SystemPropertyRemoveHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        remove_from_model(context, operation)?;

        let name = property_name(operation)?;
        let action = RuntimeAction::decide(
            &self.applier,
            context.process_type(),
            &name,
            None,
            context.is_booting(),
        );

        // An empty model resolves to no value, which clears the property.
        let applier = self.applier.clone();
        context.add_step(Stage::Runtime, move |context, _| {
            update_runtime(context, &applier, &name, &Attributes::new(), action)
        })
    }
}
