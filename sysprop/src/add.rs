//! ADD for system properties.

use keel_controller::handlers::create_and_populate;
use keel_controller::{OperationContext, Stage, StepHandler};
use keel_core::{Operation, OperationResult, Value};

use crate::apply::PropertyApplier;
use crate::definition::VALUE;
use crate::runtime::{property_name, update_runtime, RuntimeAction};

/// Creates the property resource in MODEL, then applies its value to the
/// process in RUNTIME when the updater allows it.
#[derive(Debug, Clone)]
pub struct SystemPropertyAddHandler {
    applier: PropertyApplier,
}

impl SystemPropertyAddHandler {
    pub fn new(applier: PropertyApplier) -> Self {
        Self { applier }
    }
}

impl StepHandler for SystemPropertyAddHandler {
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        let model = create_and_populate(context, operation)?;

        let name = property_name(operation)?;
        let raw = operation.param(VALUE).and_then(Value::to_plain_string);
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
