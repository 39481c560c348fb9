//! Common error messages used across Keel components.
//!
//! These constants keep wording consistent between the engine and handlers.

/// Error: a step was queued for a stage that already finished.
pub const ERR_STAGE_COMPLETED: &str = "Cannot add a step to a stage that has already completed";

/// Error: a step or rollback handler was registered outside step execution.
pub const ERR_OUTSIDE_STEP: &str =
    "Steps and rollback handlers may only be registered while a step is executing";

/// Error: a step wrote outside the addresses locked by its transaction.
pub const ERR_ADDRESS_NOT_LOCKED: &str = "Address is not locked by this transaction";

/// Error: a step marked the transaction rollback-only without a cause.
pub const ERR_ROLLBACK_ONLY: &str = "Operation was marked rollback-only";

/// Error: the resource still has children and cannot be removed.
pub const ERR_RESOURCE_HAS_CHILDREN: &str = "Resource has children";

/// Error: no handler is registered for the operation at the address.
pub const ERR_NO_HANDLER: &str = "No handler registered for operation";
