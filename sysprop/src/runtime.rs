//! The RUNTIME step shared by add, remove and write-attribute.

use keel_controller::{OperationContext, ProcessType};
use keel_core::{Attributes, Operation, OperationError, OperationResult};
use tracing::debug;

use crate::apply::PropertyApplier;
use crate::deferred::{defer, forget_deferred, retry_deferred};

/// How a model change reaches the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeAction {
    /// Write the resolved value to the property store now.
    Apply,
    /// Leave the store alone and put the process into reload-required.
    Reload,
    /// Model only.
    None,
}

impl RuntimeAction {
    /// Apply when the updater allows it; otherwise servers need a reload.
    pub fn decide(
        applier: &PropertyApplier,
        process_type: ProcessType,
        name: &str,
        value: Option<&str>,
        booting: bool,
    ) -> Self {
        if applier.runtime_update_allowed(name, value, booting) {
            RuntimeAction::Apply
        } else if process_type.is_server() {
            RuntimeAction::Reload
        } else {
            RuntimeAction::None
        }
    }
}

/// Bring the live value of `name` in line with `model`.
///
/// The prior live value is restored on rollback. A value that does not
/// resolve yet is deferred instead of failing the step.
pub(crate) fn update_runtime(
    context: &mut OperationContext<'_>,
    applier: &PropertyApplier,
    name: &str,
    model: &Attributes,
    action: RuntimeAction,
) -> OperationResult<()> {
    match action {
        RuntimeAction::Apply => {
            register_restore(context, applier, name)?;
            forget_deferred(context, name);
            match applier.resolve_model(model) {
                Ok(value) => {
                    applier.set_property(name, value.as_deref());
                    let resolved = retry_deferred(context, applier);
                    if resolved > 0 {
                        debug!(txn = context.id(), property = name, resolved, "applied deferred properties");
                    }
                    Ok(())
                }
                Err(failure) => defer(context, applier, name, model.clone(), failure),
            }
        }
        RuntimeAction::Reload => {
            context.reload_required();
            context.register_rollback(|rollback, _| {
                rollback.revert_reload_required();
                Ok(())
            })
        }
        RuntimeAction::None => Ok(()),
    }
}

/// Roll the live value back to what it is now, if it changed.
fn register_restore(
    context: &mut OperationContext<'_>,
    applier: &PropertyApplier,
    name: &str,
) -> OperationResult<()> {
    let prior = applier.current(name);
    let applier = applier.clone();
    let name = name.to_string();
    context.register_rollback(move |_, _| {
        if applier.current(&name) != prior {
            applier.set_property(&name, prior.as_deref());
        }
        Ok(())
    })
}

/// The property name: the value of the address's last element.
pub fn property_name(operation: &Operation) -> OperationResult<String> {
    operation
        .address()
        .last_element()
        .map(|element| element.value.clone())
        .ok_or_else(|| OperationError::validation("System property address must not be empty"))
}
