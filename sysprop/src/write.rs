//! WRITE-ATTRIBUTE for system properties.

use keel_controller::handlers::write_model_attribute;
use keel_controller::{OperationContext, Stage, StepHandler};
use keel_core::{Operation, OperationResult};

use crate::apply::PropertyApplier;
use crate::definition::VALUE;
use crate::runtime::{property_name, update_runtime, RuntimeAction};

/// Writes the model, then re-applies `value` the way ADD does. Other
/// attributes are model-only.
#[derive(Debug, Clone)]
pub struct SystemPropertyWriteHandler {
    applier: PropertyApplier,
}

impl SystemPropertyWriteHandler {
    pub fn new(applier: PropertyApplier) -> Self {
        Self { applier }
    }
}

impl StepHandler for SystemPropertyWriteHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        let change = write_model_attribute(context, operation)?;
        if change.name != VALUE || change.old == change.new {
            return Ok(());
        }

        let name = property_name(operation)?;
        let model = context.read_resource(operation.address())?.attributes().clone();
        let raw = change.new.to_plain_string();
        let action = RuntimeAction::decide(
            &self.applier,
            context.process_type(),
            &name,
            raw.as_deref(),
            context.is_booting(),
        );

        let applier = self.applier.clone();
        context.add_step(Stage::Runtime, move |context, _| {
            update_runtime(context, &applier, &name, &model, action)
        })
    }
}
