//! Keel Registry
//!
//! Runtime lookup of resource definitions and operation handlers by address.
//! The registry is immutable after construction via RegistryBuilder.
//!
//! `validation` holds the validate-and-set helpers handlers use to turn
//! operation parameters into model values.

mod builder;
mod registry;
mod types;
pub mod validation;

pub use builder::{RegistryBuilder, RegistryError, ResourceBuilder};
pub use registry::{OperationEntry, Registry};
pub use types::*;
