//! Error types for the scenario framework.

use keel_registry::RegistryError;
use thiserror::Error;

/// Result type for scenario runs.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when building or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The registry could not be built.
    #[error("failed to build registry: {0}")]
    Registry(#[from] RegistryError),

    /// Assertion failed.
    #[error("assertion failed for step '{step}': {message}")]
    AssertionFailed { step: String, message: String },

    /// A step submitted nothing.
    #[error("step '{step}' has no operations")]
    EmptyStep { step: String },
}

impl ScenarioError {
    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn empty_step(step: impl Into<String>) -> Self {
        Self::EmptyStep { step: step.into() }
    }
}
