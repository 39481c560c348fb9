//! Stages and the transaction state machine.

use keel_core::{OperationError, OperationResult};
use std::fmt;

/// An ordered phase of execution. Steps queued for a stage run after every
/// step of all earlier stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Model validation and shape changes.
    Model,
    /// Side effects against the live system.
    Runtime,
    /// Cross-step invariant checks.
    Verify,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 3] = [Stage::Model, Stage::Runtime, Stage::Verify];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Model => "MODEL",
            Stage::Runtime => "RUNTIME",
            Stage::Verify => "VERIFY",
        };
        f.write_str(name)
    }
}

/// Lifecycle of one transaction.
///
/// `Pending -> Model -> Runtime -> Verify -> Committed`, with
/// `RollingBack -> Aborted` reachable from any executing stage (and
/// `Pending -> Aborted` when the request is rejected before any step runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Pending,
    Model,
    Runtime,
    Verify,
    Committed,
    RollingBack,
    Aborted,
}

impl TransactionState {
    /// The state a transaction is in while executing `stage`.
    pub fn executing(stage: Stage) -> Self {
        match stage {
            Stage::Model => TransactionState::Model,
            Stage::Runtime => TransactionState::Runtime,
            Stage::Verify => TransactionState::Verify,
        }
    }

    /// Returns true for `Committed` and `Aborted`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::Aborted)
    }

    /// Returns true while a stage is executing.
    pub fn is_executing(&self) -> bool {
        matches!(
            self,
            TransactionState::Model | TransactionState::Runtime | TransactionState::Verify
        )
    }

    pub fn can_transition_to(&self, next: TransactionState) -> bool {
        use TransactionState::{Aborted, Committed, Model, Pending, RollingBack, Runtime, Verify};
        matches!(
            (self, next),
            (Pending, Model)
                | (Pending, Aborted)
                | (Model, Runtime)
                | (Runtime, Verify)
                | (Verify, Committed)
                | (Model | Runtime | Verify, RollingBack)
                | (RollingBack, Aborted)
        )
    }

    /// Move to `next`, rejecting transitions the state machine forbids.
    pub fn transition(&mut self, next: TransactionState) -> OperationResult<()> {
        if !self.can_transition_to(next) {
            return Err(OperationError::internal(format!(
                "Illegal transaction state transition {:?} -> {:?}",
                self, next
            )));
        }
        *self = next;
        Ok(())
    }
}
