//! Operation failure types shared by every stage of the pipeline.

use crate::PathAddress;
use std::fmt;
use thiserror::Error;

/// Coarse classification of an operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing parameter.
    Validation,
    /// A value could not be computed (e.g. an unresolvable expression).
    Resolution,
    /// ADD targeted an address that already holds a resource.
    DuplicateResource,
    /// The addressed resource does not exist.
    ResourceNotFound,
    /// Programming contract violation inside the engine or a handler.
    Internal,
    /// Any other handler-reported failure.
    Failed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Resolution => "resolution",
            ErrorKind::DuplicateResource => "duplicate-resource",
            ErrorKind::ResourceNotFound => "resource-not-found",
            ErrorKind::Internal => "internal",
            ErrorKind::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors raised by step handlers and the engine.
///
/// Cloneable so a captured failure can be stored and re-raised unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Cannot resolve expression '{expression}': {message}")]
    Resolution { expression: String, message: String },

    #[error("Resource already exists: {address}")]
    DuplicateResource { address: PathAddress },

    #[error("Resource not found: {address}")]
    ResourceNotFound { address: PathAddress },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Operation failed: {message}")]
    Failed { message: String },
}

impl OperationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn resolution(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            expression: expression.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_resource(address: PathAddress) -> Self {
        Self::DuplicateResource { address }
    }

    pub fn resource_not_found(address: PathAddress) -> Self {
        Self::ResourceNotFound { address }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OperationError::Validation { .. } => ErrorKind::Validation,
            OperationError::Resolution { .. } => ErrorKind::Resolution,
            OperationError::DuplicateResource { .. } => ErrorKind::DuplicateResource,
            OperationError::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            OperationError::Internal { .. } => ErrorKind::Internal,
            OperationError::Failed { .. } => ErrorKind::Failed,
        }
    }

    /// A suggested fix to show the caller, where one is known.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            OperationError::Resolution { .. } => Some(
                "define the referenced property in the same request or beforehand, \
                 or supply a default with ${name:default}",
            ),
            OperationError::DuplicateResource { .. } => {
                Some("remove the existing resource or use write-attribute instead")
            }
            OperationError::ResourceNotFound { .. } => {
                Some("check the address; parent resources must be added first")
            }
            _ => None,
        }
    }
}

/// Result type for operation handling.
pub type OperationResult<T> = Result<T, OperationError>;
