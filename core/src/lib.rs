//! Keel Core Types
//!
//! This crate provides the foundational types used throughout Keel:
//! - Addresses (PathElement, PathAddress)
//! - Value types (the Value enum and declared ValueType)
//! - Operation requests
//! - Common error types

mod address;
mod error;
pub mod messages;
mod operation;
mod value;

pub use address::*;
pub use error::*;
pub use operation::*;
pub use value::*;
