//! The model controller: entry point for submitting operations.
//!
//! A submission becomes one transaction: resolve handlers, validate
//! parameters, lock the target addresses, run the stages against a private
//! working copy, then publish it or roll back.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use keel_core::{messages, Operation, OperationError, PathAddress, Value};
use keel_registry::{validation, OperationFlag};
use keel_tree::{ModelStore, ResourceTree, WorkingTree};
use tracing::{debug, debug_span};

use crate::config::ControllerConfig;
use crate::context::OperationContext;
use crate::error::{TransactionFailure, TransactionResult};
use crate::process::ProcessState;
use crate::step::SharedHandler;
use crate::OperationRegistry;

/// Successful outcome of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResponse {
    /// The operation's result; a list of results for a composite.
    pub result: Value,
    /// Model version published by this transaction.
    pub version: u64,
    /// Whether the process requires a reload after this transaction.
    pub reload_required: bool,
}

/// Runs operations against a shared model.
///
/// Safe to share between threads; each call to [`execute`](Self::execute)
/// runs one transaction on the calling thread.
pub struct ModelController {
    registry: Arc<OperationRegistry>,
    store: Arc<ModelStore>,
    process: Arc<ProcessState>,
    booting: AtomicBool,
    next_txn_id: AtomicU64,
}

impl ModelController {
    pub fn new(registry: OperationRegistry, config: ControllerConfig) -> Self {
        Self::with_store(registry, Arc::new(ModelStore::new()), config)
    }

    /// Build a controller over an existing model.
    pub fn with_store(
        registry: OperationRegistry,
        store: Arc<ModelStore>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            process: Arc::new(ProcessState::new(config.process_type)),
            booting: AtomicBool::new(config.booting),
            next_txn_id: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn process(&self) -> &Arc<ProcessState> {
        &self.process
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    /// The committed model. Never blocks on running transactions.
    pub fn snapshot(&self) -> Arc<ResourceTree> {
        self.store.snapshot()
    }

    pub fn is_booting(&self) -> bool {
        self.booting.load(Ordering::Acquire)
    }

    /// Leave boot mode.
    pub fn finish_boot(&self) {
        if self.booting.swap(false, Ordering::AcqRel) {
            debug!("boot complete");
        }
    }

    // ==================== Submission ====================

    /// Run one operation as a transaction.
    pub fn execute(&self, operation: Operation) -> TransactionResult<OperationResponse> {
        let (mut results, version) = self.submit(vec![operation], self.is_booting())?;
        Ok(self.response(results.pop().unwrap_or_default(), version))
    }

    /// Run several operations as one transaction. Every operation's MODEL step
    /// runs before any RUNTIME step; either all commit or none do.
    pub fn execute_composite(
        &self,
        operations: Vec<Operation>,
    ) -> TransactionResult<OperationResponse> {
        let (results, version) = self.submit(operations, self.is_booting())?;
        Ok(self.response(Value::List(results), version))
    }

    /// Run the boot operations as one transaction in boot mode, then leave
    /// boot mode whatever the outcome.
    pub fn boot(&self, operations: Vec<Operation>) -> TransactionResult<OperationResponse> {
        let outcome = self.submit(operations, true);
        self.finish_boot();
        let (results, version) = outcome?;
        Ok(self.response(Value::List(results), version))
    }

    fn response(&self, result: Value, version: u64) -> OperationResponse {
        OperationResponse {
            result,
            version,
            reload_required: self.process.is_reload_required(),
        }
    }

    fn submit(&self, operations: Vec<Operation>, booting: bool) -> TransactionResult<(Vec<Value>, u64)> {
        let id = self.next_txn_id.fetch_add(1, Ordering::Relaxed);
        let span = debug_span!("transaction", txn = id, operations = operations.len());
        let _enter = span.enter();

        if operations.is_empty() {
            return Ok((Vec::new(), self.store.version()));
        }

        // Rejected requests never take a lock or run a step.
        let mut write_scope = Vec::new();
        let mut resolved = Vec::with_capacity(operations.len());
        for operation in operations {
            let handler = self.resolve(&operation, booting, &mut write_scope)?;
            resolved.push((operation, handler));
        }

        write_scope.sort();
        write_scope.dedup();
        let _locks = if write_scope.is_empty() {
            None
        } else {
            Some(self.store.locks().acquire(write_scope.clone()))
        };

        let model = WorkingTree::new(&self.store.snapshot(), write_scope);
        let mut context = OperationContext::new(
            id,
            &self.registry,
            &self.process,
            booting,
            model,
            resolved.len(),
        );
        for (origin, (operation, handler)) in resolved.into_iter().enumerate() {
            context.submit(origin, operation, handler);
        }

        match context.run() {
            Ok(()) => context.commit(&self.store).map_err(TransactionFailure::new),
            Err(cause) => Err(context.abort(cause)),
        }
    }

    /// Find the handler for `operation` and check its parameters. Addresses
    /// of mutating operations are added to `write_scope`.
    fn resolve(
        &self,
        operation: &Operation,
        booting: bool,
        write_scope: &mut Vec<PathAddress>,
    ) -> TransactionResult<SharedHandler> {
        let entry = self
            .registry
            .operation(operation.address(), operation.name())
            .ok_or_else(|| {
                OperationError::validation(format!(
                    "{} '{}' at {}",
                    messages::ERR_NO_HANDLER,
                    operation.name(),
                    operation.address()
                ))
            })?;

        if entry.definition.has_flag(OperationFlag::BootOnly) && !booting {
            return Err(OperationError::validation(format!(
                "Operation '{}' is only allowed during boot",
                operation.name()
            ))
            .into());
        }
        validation::check_parameters(&entry.definition.parameters, operation.params())?;

        if !entry.definition.is_read_only() {
            write_scope.push(operation.address().clone());
        }
        Ok(Arc::clone(&entry.handler))
    }
}

impl std::fmt::Debug for ModelController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelController")
            .field("resources", &self.registry.resource_count())
            .field("version", &self.store.version())
            .field("booting", &self.is_booting())
            .finish()
    }
}
