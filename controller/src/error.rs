//! Transaction failure reporting.

use keel_core::{ErrorKind, OperationError};
use thiserror::Error;

/// Why a submitted transaction did not commit.
///
/// `cause` is the first failure, unchanged. Failures raised by rollback
/// handlers while unwinding are reported next to it, never instead of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", .cause, rollback_suffix(.rollback_failures))]
pub struct TransactionFailure {
    #[source]
    pub cause: OperationError,
    pub rollback_failures: Vec<OperationError>,
}

impl TransactionFailure {
    pub fn new(cause: OperationError) -> Self {
        Self {
            cause,
            rollback_failures: Vec::new(),
        }
    }

    pub fn with_rollback_failures(mut self, failures: Vec<OperationError>) -> Self {
        self.rollback_failures = failures;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }

    pub fn cause(&self) -> &OperationError {
        &self.cause
    }

    /// The root cause's message.
    pub fn message(&self) -> String {
        self.cause.to_string()
    }

    pub fn remediation(&self) -> Option<&'static str> {
        self.cause.remediation()
    }

    /// Returns true if some compensating action failed while unwinding.
    pub fn rollback_incomplete(&self) -> bool {
        !self.rollback_failures.is_empty()
    }
}

impl From<OperationError> for TransactionFailure {
    fn from(cause: OperationError) -> Self {
        Self::new(cause)
    }
}

fn rollback_suffix(failures: &[OperationError]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = failures.iter().map(ToString::to_string).collect();
    format!(" (rollback failures: {})", joined.join("; "))
}

/// Result type for submitted transactions.
pub type TransactionResult<T> = Result<T, TransactionFailure>;
