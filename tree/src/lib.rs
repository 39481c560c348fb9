//! Keel Resource Tree
//!
//! This crate provides the addressable model storage:
//! - ResourceNode: attribute map held at one address
//! - ResourceTree: the hierarchy, keyed by PathAddress
//! - WorkingTree: a transaction's private, lock-scoped working copy
//! - ModelStore: the committed snapshot plus address-range locks

mod lock;
mod node;
mod store;
mod tree;
mod working;

pub use lock::{AddressLockGuard, AddressLocks};
pub use node::ResourceNode;
pub use store::ModelStore;
pub use tree::ResourceTree;
pub use working::WorkingTree;
