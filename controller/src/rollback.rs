//! Rollback coordination.
//!
//! Steps register compensating handlers while they execute. On abort the
//! handlers run once, most recent first, each seeing the operation that
//! registered it.

use std::any::Any;
use std::sync::Arc;

use keel_core::{messages, Operation, OperationError, OperationResult};
use tracing::{debug, warn};

use crate::attachment::{AttachmentKey, Attachments};
use crate::process::{ProcessState, ReloadTracker};

/// A compensating action for one step.
pub type RollbackHandler =
    Box<dyn FnOnce(&mut RollbackContext<'_>, &Operation) -> OperationResult<()> + Send>;

/// What a rollback handler can see and undo.
pub struct RollbackContext<'a> {
    cause: &'a OperationError,
    process: &'a ProcessState,
    reload: &'a mut ReloadTracker,
    attachments: &'a Attachments,
}

impl<'a> RollbackContext<'a> {
    pub(crate) fn new(
        cause: &'a OperationError,
        process: &'a ProcessState,
        reload: &'a mut ReloadTracker,
        attachments: &'a Attachments,
    ) -> Self {
        Self {
            cause,
            process,
            reload,
            attachments,
        }
    }

    /// The failure that triggered the rollback.
    pub fn cause(&self) -> &OperationError {
        self.cause
    }

    pub fn is_reload_required(&self) -> bool {
        self.process.is_reload_required()
    }

    /// Restore the reload-required flag to its value before this transaction
    /// raised it. Safe to call more than once.
    pub fn revert_reload_required(&mut self) {
        self.reload.revert(self.process);
    }

    pub fn attachment<T: Any + Send>(&self, key: &AttachmentKey<T>) -> Option<&T> {
        self.attachments.get(key)
    }
}

struct Registered {
    operation: Arc<Operation>,
    handler: RollbackHandler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Triggered,
    Discarded,
}

/// Ordered rollback handlers of one transaction.
pub struct RollbackCoordinator {
    handlers: Vec<Registered>,
    phase: Phase,
}

impl Default for RollbackCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RollbackCoordinator {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            phase: Phase::Open,
        }
    }

    /// Append a handler. Fails once the transaction has committed or rolled
    /// back.
    pub fn register(
        &mut self,
        operation: Arc<Operation>,
        handler: RollbackHandler,
    ) -> OperationResult<()> {
        if self.phase != Phase::Open {
            return Err(OperationError::internal(messages::ERR_OUTSIDE_STEP));
        }
        self.handlers.push(Registered { operation, handler });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler in reverse registration order. A failing handler is
    /// logged and collected; the remaining handlers still run. Only the first
    /// call does anything.
    pub fn trigger(&mut self, context: &mut RollbackContext<'_>) -> Vec<OperationError> {
        if self.phase != Phase::Open {
            return Vec::new();
        }
        self.phase = Phase::Triggered;
        debug!(handlers = self.handlers.len(), "running rollback handlers");

        let mut failures = Vec::new();
        while let Some(Registered { operation, handler }) = self.handlers.pop() {
            if let Err(error) = handler(context, &operation) {
                warn!(operation = %operation, %error, "rollback handler failed");
                failures.push(error);
            }
        }
        failures
    }

    /// Drop every handler unrun. Called on commit.
    pub fn discard(&mut self) {
        self.handlers.clear();
        self.phase = Phase::Discarded;
    }
}

impl std::fmt::Debug for RollbackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollbackCoordinator")
            .field("handlers", &self.handlers.len())
            .field("phase", &self.phase)
            .finish()
    }
}
