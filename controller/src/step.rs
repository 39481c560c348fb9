//! Step handlers and queued steps.

use std::fmt;
use std::sync::Arc;

use keel_core::{Operation, OperationResult};

use crate::context::OperationContext;

/// Logic run for one step of one operation.
///
/// Handlers are shared by every transaction, so they hold no per-transaction
/// state; that lives in the context's attachments.
pub trait StepHandler: Send + Sync {
    fn execute(&self, context: &mut OperationContext<'_>, operation: &Operation)
        -> OperationResult<()>;
}

/// A handler shared between the registry and queued steps.
pub type SharedHandler = Arc<dyn StepHandler>;

/// Adapts a closure into a [`StepHandler`].
pub struct FnStep<F>(pub(crate) F);

impl<F> StepHandler for FnStep<F>
where
    F: Fn(&mut OperationContext<'_>, &Operation) -> OperationResult<()> + Send + Sync,
{
    fn execute(
        &self,
        context: &mut OperationContext<'_>,
        operation: &Operation,
    ) -> OperationResult<()> {
        (self.0)(context, operation)
    }
}

/// Wrap a closure as a shared handler.
pub fn step_fn<F>(f: F) -> SharedHandler
where
    F: Fn(&mut OperationContext<'_>, &Operation) -> OperationResult<()> + Send + Sync + 'static,
{
    Arc::new(FnStep(f))
}

/// A unit of work queued for a stage.
#[derive(Clone)]
pub(crate) struct Step {
    /// Index of the submitted operation this step descends from.
    pub(crate) origin: usize,
    pub(crate) operation: Arc<Operation>,
    pub(crate) handler: SharedHandler,
}

impl Step {
    pub(crate) fn new(origin: usize, operation: Arc<Operation>, handler: SharedHandler) -> Self {
        Self {
            origin,
            operation,
            handler,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("origin", &self.origin)
            .field("operation", &self.operation.to_string())
            .finish()
    }
}
