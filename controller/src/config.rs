//! Controller configuration.

use crate::process::ProcessType;

/// Settings fixed when a controller is built.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Kind of process the model manages.
    pub process_type: ProcessType,
    /// Whether the controller starts in boot mode. Transactions see
    /// `is_booting() == true` until [`ModelController::finish_boot`] runs.
    ///
    /// [`ModelController::finish_boot`]: crate::ModelController::finish_boot
    pub booting: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            process_type: ProcessType::Server,
            booting: false,
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process_type(mut self, process_type: ProcessType) -> Self {
        self.process_type = process_type;
        self
    }

    pub fn with_booting(mut self, booting: bool) -> Self {
        self.booting = booting;
        self
    }
}
