//! Keel Integration Test Framework
//!
//! Provides a fluent API for writing transaction scenarios against a
//! controller with system properties registered.
//!
//! # Example
//!
//! ```ignore
//! use keel_tests::prelude::*;
//!
//! #[test]
//! fn test() {
//!     Scenario::new("literal")
//!         .step("add", vec![add_operation("foo", Some("bar"), None)], |a| {
//!             a.committed().property("foo", "bar")
//!         })
//!         .run()
//!         .unwrap();
//! }
//! ```

mod error;
mod harness;
pub mod logging;

pub use assertion::{Assertion, AssertionBuilder};
pub use error::{ScenarioError, ScenarioResult};
pub use harness::{Harness, HarnessBuilder};
pub use scenario::{Scenario, Step, Submission};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{Assertion, AssertionBuilder};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::harness::{Harness, HarnessBuilder};
    pub use crate::scenario::Scenario;
    pub use keel_controller::{ProcessType, Stage};
    pub use keel_core::{ErrorKind, Operation, PathAddress, PathElement, Value};
    pub use keel_sysprop::{
        add_operation, address, remove_operation, write_value_operation, PropertyCall,
    };
}
