//! Keel Controller
//!
//! Staged transactional execution of management operations.
//!
//! Responsibilities:
//! - Run each submission as one transaction through MODEL, RUNTIME and VERIFY
//! - Let steps queue further steps, share typed attachments and register
//!   rollback handlers
//! - Lock target addresses, publish the working copy on commit
//! - Unwind in reverse order on failure, restoring the reload flag

mod attachment;
mod config;
mod context;
mod controller;
mod error;
pub mod handlers;
mod process;
mod rollback;
mod scheduler;
mod stage;
mod step;

pub use attachment::{AttachmentKey, Attachments};
pub use config::ControllerConfig;
pub use context::OperationContext;
pub use controller::{ModelController, OperationResponse};
pub use error::{TransactionFailure, TransactionResult};
pub use process::{ProcessState, ProcessType};
pub use rollback::{RollbackContext, RollbackCoordinator, RollbackHandler};
pub use stage::{Stage, TransactionState};
pub use step::{step_fn, FnStep, SharedHandler, StepHandler};

/// Registry of operation handlers the controller dispatches to.
pub type OperationRegistry = keel_registry::Registry<SharedHandler>;

/// Builder for an [`OperationRegistry`].
pub type OperationRegistryBuilder = keel_registry::RegistryBuilder<SharedHandler>;
