//! Committed model state.

use keel_core::PathAddress;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::lock::AddressLocks;
use crate::tree::ResourceTree;
use crate::working::WorkingTree;

/// Holder of the canonical resource tree.
///
/// Readers take an `Arc` to the current snapshot and never observe
/// uncommitted changes. Writers publish by swapping in a new snapshot that
/// merges their touched addresses into whatever is current, which is safe
/// because those addresses are covered by the writer's address locks.
#[derive(Debug)]
pub struct ModelStore {
    committed: RwLock<Arc<ResourceTree>>,
    locks: Arc<AddressLocks>,
    version: AtomicU64,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStore {
    /// A store holding an empty tree.
    pub fn new() -> Self {
        Self::with_tree(ResourceTree::new())
    }

    /// A store seeded with `tree`.
    pub fn with_tree(tree: ResourceTree) -> Self {
        Self {
            committed: RwLock::new(Arc::new(tree)),
            locks: Arc::new(AddressLocks::new()),
            version: AtomicU64::new(0),
        }
    }

    /// The current committed snapshot.
    pub fn snapshot(&self) -> Arc<ResourceTree> {
        self.committed.read().clone()
    }

    /// The address lock table for this model.
    pub fn locks(&self) -> &Arc<AddressLocks> {
        &self.locks
    }

    /// Number of publishes so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Make the working copy's changes canonical. Returns the new version.
    pub fn publish(&self, working: &WorkingTree) -> u64 {
        if !working.is_dirty() {
            return self.version();
        }

        let mut committed = self.committed.write();
        let mut next = ResourceTree::clone(&committed);
        for address in working.touched() {
            apply(&mut next, working.tree(), address);
        }
        *committed = Arc::new(next);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(version, changed = working.touched().len(), "published model snapshot");
        version
    }
}

fn apply(target: &mut ResourceTree, source: &ResourceTree, address: &PathAddress) {
    match source.get(address) {
        Some(node) => target.put(address.clone(), node.clone()),
        None => target.discard(address),
    }
}
