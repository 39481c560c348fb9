//! The per-transaction operation context.
//!
//! Every step of a transaction receives the same context. It owns the
//! transaction's working copy of the model, its stage queues, attachments and
//! rollback handlers, and it is the only way a step can reach any of them.

use std::any::Any;
use std::sync::Arc;

use keel_core::{messages, Operation, OperationError, OperationResult, PathAddress, Value};
use keel_registry::ResourceDefinition;
use keel_tree::{ModelStore, ResourceNode, WorkingTree};
use tracing::{debug, info, warn};

use crate::attachment::{AttachmentKey, Attachments};
use crate::error::TransactionFailure;
use crate::process::{ProcessState, ProcessType, ReloadTracker};
use crate::rollback::{RollbackContext, RollbackCoordinator};
use crate::scheduler::StageQueues;
use crate::stage::{Stage, TransactionState};
use crate::step::{FnStep, SharedHandler, Step};
use crate::OperationRegistry;

/// Execution context of one transaction.
pub struct OperationContext<'a> {
    id: u64,
    registry: &'a OperationRegistry,
    process: &'a ProcessState,
    booting: bool,
    state: TransactionState,
    stage: Stage,
    queues: StageQueues,
    model: WorkingTree,
    attachments: Attachments,
    rollback: RollbackCoordinator,
    reload: ReloadTracker,
    /// Step currently executing: its origin index and operation.
    current: Option<(usize, Arc<Operation>)>,
    rollback_only: bool,
    /// First engine contract violation; fatal even if the step swallowed it.
    violation: Option<OperationError>,
    results: Vec<Value>,
}

impl<'a> OperationContext<'a> {
    pub(crate) fn new(
        id: u64,
        registry: &'a OperationRegistry,
        process: &'a ProcessState,
        booting: bool,
        model: WorkingTree,
        operations: usize,
    ) -> Self {
        Self {
            id,
            registry,
            process,
            booting,
            state: TransactionState::Pending,
            stage: Stage::Model,
            queues: StageQueues::new(),
            model,
            attachments: Attachments::new(),
            rollback: RollbackCoordinator::new(),
            reload: ReloadTracker::new(id),
            current: None,
            rollback_only: false,
            violation: None,
            results: vec![Value::Undefined; operations],
        }
    }

    // ==================== Status ====================

    /// Transaction id, unique per controller.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stage currently executing.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_booting(&self) -> bool {
        self.booting
    }

    pub fn process_type(&self) -> ProcessType {
        self.process.process_type()
    }

    /// Mark the transaction for rollback. The step may still return normally;
    /// no further step runs afterwards.
    pub fn set_rollback_only(&mut self) {
        if !self.rollback_only {
            debug!(txn = self.id, "transaction marked rollback-only");
        }
        self.rollback_only = true;
    }

    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    // ==================== Step Scheduling ====================

    /// Queue a closure for `stage` on behalf of the executing operation.
    pub fn add_step<F>(&mut self, stage: Stage, f: F) -> OperationResult<()>
    where
        F: Fn(&mut OperationContext<'_>, &Operation) -> OperationResult<()> + Send + Sync + 'static,
    {
        self.add_step_handler(stage, Arc::new(FnStep(f)))
    }

    /// Queue a handler for `stage` on behalf of the executing operation.
    pub fn add_step_handler(&mut self, stage: Stage, handler: SharedHandler) -> OperationResult<()> {
        let (origin, operation) = self.executing()?;
        self.enqueue(stage, Step::new(origin, operation, handler), false)
    }

    /// Queue a handler for `stage` that runs with `operation` instead of the
    /// executing one.
    pub fn add_step_for(
        &mut self,
        stage: Stage,
        operation: Operation,
        handler: SharedHandler,
    ) -> OperationResult<()> {
        let (origin, _) = self.executing()?;
        self.enqueue(stage, Step::new(origin, Arc::new(operation), handler), false)
    }

    /// Queue a closure at the head of `stage`, ahead of steps already waiting.
    pub fn add_step_first<F>(&mut self, stage: Stage, f: F) -> OperationResult<()>
    where
        F: Fn(&mut OperationContext<'_>, &Operation) -> OperationResult<()> + Send + Sync + 'static,
    {
        let (origin, operation) = self.executing()?;
        let step = Step::new(origin, operation, Arc::new(FnStep(f)));
        self.enqueue(stage, step, true)
    }

    fn enqueue(&mut self, stage: Stage, step: Step, first: bool) -> OperationResult<()> {
        let queued = if first {
            self.queues.push_front(stage, step)
        } else {
            self.queues.push(stage, step)
        };
        queued.map_err(|e| self.violate(e))
    }

    fn executing(&mut self) -> OperationResult<(usize, Arc<Operation>)> {
        if let Some((origin, operation)) = &self.current {
            return Ok((*origin, Arc::clone(operation)));
        }
        Err(self.violate(OperationError::internal(messages::ERR_OUTSIDE_STEP)))
    }

    /// Record a contract violation so it aborts the transaction regardless
    /// of what the step does with the returned error.
    fn violate(&mut self, error: OperationError) -> OperationError {
        warn!(txn = self.id, %error, "engine contract violation");
        self.violation.get_or_insert_with(|| error.clone());
        error
    }

    // ==================== Rollback ====================

    /// Register a compensating action for the executing step. It runs only if
    /// the transaction aborts, after the handlers of every later step.
    pub fn register_rollback<F>(&mut self, f: F) -> OperationResult<()>
    where
        F: FnOnce(&mut RollbackContext<'_>, &Operation) -> OperationResult<()> + Send + 'static,
    {
        let (_, operation) = self.executing()?;
        self.rollback
            .register(operation, Box::new(f))
            .map_err(|e| self.violate(e))
    }

    /// Put the process into reload-required. Reverted on abort.
    pub fn reload_required(&mut self) {
        self.reload.raise(self.process);
    }

    /// Undo this transaction's [`reload_required`](Self::reload_required).
    /// Safe to call more than once.
    pub fn revert_reload_required(&mut self) {
        self.reload.revert(self.process);
    }

    pub fn is_reload_required(&self) -> bool {
        self.process.is_reload_required()
    }

    // ==================== Attachments ====================

    pub fn attachment<T: Any + Send>(&self, key: &AttachmentKey<T>) -> Option<&T> {
        self.attachments.get(key)
    }

    pub fn attachment_mut<T: Any + Send>(&mut self, key: &AttachmentKey<T>) -> Option<&mut T> {
        self.attachments.get_mut(key)
    }

    /// Store an attachment, returning the previous value.
    pub fn attach<T: Any + Send>(&mut self, key: &AttachmentKey<T>, value: T) -> Option<T> {
        self.attachments.put(key, value)
    }

    pub fn attach_if_absent<T: Any + Send>(&mut self, key: &AttachmentKey<T>, value: T) -> Option<&T> {
        self.attachments.put_if_absent(key, value)
    }

    pub fn attachment_or_insert_with<T: Any + Send>(
        &mut self,
        key: &AttachmentKey<T>,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        self.attachments.get_or_insert_with(key, init)
    }

    pub fn detach<T: Any + Send>(&mut self, key: &AttachmentKey<T>) -> Option<T> {
        self.attachments.remove(key)
    }

    // ==================== Model ====================

    /// The transaction's view of the model, including its own writes.
    pub fn model(&self) -> &WorkingTree {
        &self.model
    }

    pub fn read_resource(&self, address: &PathAddress) -> OperationResult<&ResourceNode> {
        self.model.require(address)
    }

    pub fn has_resource(&self, address: &PathAddress) -> bool {
        self.model.contains(address)
    }

    /// Definition of the resource type at `address`.
    pub fn resource_definition(&self, address: &PathAddress) -> OperationResult<&'a ResourceDefinition> {
        self.registry.resource(address).ok_or_else(|| {
            OperationError::validation(format!("No resource definition for {}", address))
        })
    }

    /// Create a resource. MODEL stage only.
    pub fn create_resource(&mut self, address: &PathAddress) -> OperationResult<&mut ResourceNode> {
        self.check_model_write()?;
        self.model.create(address)
    }

    /// Mutable access to an existing resource. MODEL stage only.
    pub fn read_resource_for_update(
        &mut self,
        address: &PathAddress,
    ) -> OperationResult<&mut ResourceNode> {
        self.check_model_write()?;
        self.model.require_mut(address)
    }

    /// Remove a resource with no children. MODEL stage only.
    pub fn remove_resource(&mut self, address: &PathAddress) -> OperationResult<ResourceNode> {
        self.check_model_write()?;
        self.model.remove(address)
    }

    fn check_model_write(&self) -> OperationResult<()> {
        if self.stage != Stage::Model {
            return Err(OperationError::internal(format!(
                "Model writes are only allowed in MODEL, not {}",
                self.stage
            )));
        }
        Ok(())
    }

    // ==================== Results ====================

    /// Set the result of the submitted operation the executing step belongs to.
    pub fn set_result(&mut self, value: impl Into<Value>) {
        if let Some((origin, _)) = &self.current {
            if let Some(slot) = self.results.get_mut(*origin) {
                *slot = value.into();
            }
        }
    }

    // ==================== Execution ====================

    /// Queue the first MODEL step of a submitted operation.
    pub(crate) fn submit(&mut self, origin: usize, operation: Operation, handler: SharedHandler) {
        // Nothing has started yet, so MODEL still accepts steps.
        if let Err(error) = self
            .queues
            .push(Stage::Model, Step::new(origin, Arc::new(operation), handler))
        {
            self.violate(error);
        }
    }

    /// Drain MODEL, RUNTIME and VERIFY in order. Stops at the first failure.
    pub(crate) fn run(&mut self) -> OperationResult<()> {
        if let Some(violation) = self.violation.take() {
            return Err(violation);
        }
        for stage in Stage::ALL {
            self.state.transition(TransactionState::executing(stage))?;
            self.stage = stage;
            self.queues.begin(stage);
            debug!(txn = self.id, %stage, "entering stage");

            while let Some(step) = self.queues.pop() {
                debug!(txn = self.id, %stage, operation = %step.operation, "executing step");
                self.current = Some((step.origin, Arc::clone(&step.operation)));
                let outcome = step.handler.execute(self, &step.operation);
                self.current = None;

                if let Some(violation) = self.violation.take() {
                    return Err(violation);
                }
                outcome?;
                if self.rollback_only {
                    return Err(OperationError::failed(messages::ERR_ROLLBACK_ONLY));
                }
            }
        }
        Ok(())
    }

    /// Publish the working copy, keep any reload raise and drop every rollback
    /// handler unrun.
    pub(crate) fn commit(mut self, store: &ModelStore) -> OperationResult<(Vec<Value>, u64)> {
        self.state.transition(TransactionState::Committed)?;
        self.queues.close();
        self.rollback.discard();
        self.reload.commit(self.process);
        let version = store.publish(&self.model);
        info!(
            txn = self.id,
            version,
            touched = self.model.touched().len(),
            "transaction committed"
        );
        Ok((self.results, version))
    }

    /// Run rollback handlers, restore the reload flag and drop the working
    /// copy. Returns the failure to report.
    pub(crate) fn abort(mut self, cause: OperationError) -> TransactionFailure {
        warn!(txn = self.id, stage = %self.stage, error = %cause, "transaction rolling back");
        if self.state.is_executing() {
            let _ = self.state.transition(TransactionState::RollingBack);
        }
        self.queues.close();

        let failures = {
            let mut rollback_context =
                RollbackContext::new(&cause, self.process, &mut self.reload, &self.attachments);
            self.rollback.trigger(&mut rollback_context)
        };
        self.reload.revert(self.process);

        let _ = self.state.transition(TransactionState::Aborted);
        if !failures.is_empty() {
            warn!(txn = self.id, failures = failures.len(), "rollback incomplete");
        }
        TransactionFailure::new(cause).with_rollback_failures(failures)
    }
}

impl std::fmt::Debug for OperationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationContext")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("stage", &self.stage)
            .field("booting", &self.booting)
            .field("rollback_only", &self.rollback_only)
            .field("attachments", &self.attachments)
            .finish()
    }
}
