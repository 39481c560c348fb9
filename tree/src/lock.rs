//! Address-range write locks.
//!
//! A transaction locks the subtrees it will mutate before its first step
//! runs and keeps them until commit or abort. Two ranges conflict when one
//! address is a prefix of the other, so unrelated subtrees proceed in
//! parallel while overlapping ones serialize.

use keel_core::PathAddress;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
struct LockTable {
    /// Held ranges, tagged with the owning guard.
    held: Vec<(u64, PathAddress)>,
    next_owner: u64,
}

impl LockTable {
    fn conflicts(&self, wanted: &[PathAddress]) -> bool {
        self.held
            .iter()
            .any(|(_, held)| wanted.iter().any(|w| w.overlaps(held)))
    }

    fn grant(&mut self, wanted: &[PathAddress]) -> u64 {
        let owner = self.next_owner;
        self.next_owner += 1;
        self.held
            .extend(wanted.iter().cloned().map(|address| (owner, address)));
        owner
    }
}

/// The lock table shared by every transaction against one model.
#[derive(Debug, Default)]
pub struct AddressLocks {
    table: Mutex<LockTable>,
    released: Condvar,
}

impl AddressLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until every address in `wanted` can be locked, then lock them
    /// all at once. All-or-nothing acquisition rules out lock-order
    /// deadlocks between transactions.
    pub fn acquire(self: &Arc<Self>, wanted: Vec<PathAddress>) -> AddressLockGuard {
        let mut table = self.table.lock();
        while table.conflicts(&wanted) {
            trace!(ranges = wanted.len(), "waiting for address locks");
            self.released.wait(&mut table);
        }
        let owner = table.grant(&wanted);
        AddressLockGuard {
            locks: Arc::clone(self),
            owner,
            addresses: wanted,
        }
    }

    /// Lock `wanted` only if no conflicting range is held right now.
    pub fn try_acquire(self: &Arc<Self>, wanted: Vec<PathAddress>) -> Option<AddressLockGuard> {
        let mut table = self.table.lock();
        if table.conflicts(&wanted) {
            return None;
        }
        let owner = table.grant(&wanted);
        Some(AddressLockGuard {
            locks: Arc::clone(self),
            owner,
            addresses: wanted,
        })
    }

    /// Number of ranges currently held.
    pub fn held_count(&self) -> usize {
        self.table.lock().held.len()
    }

    fn release(&self, owner: u64) {
        let mut table = self.table.lock();
        table.held.retain(|(o, _)| *o != owner);
        drop(table);
        self.released.notify_all();
    }
}

/// Held address locks. Released on drop.
#[derive(Debug)]
pub struct AddressLockGuard {
    locks: Arc<AddressLocks>,
    owner: u64,
    addresses: Vec<PathAddress>,
}

impl AddressLockGuard {
    /// The locked subtree roots.
    pub fn addresses(&self) -> &[PathAddress] {
        &self.addresses
    }
}

impl Drop for AddressLockGuard {
    fn drop(&mut self) {
        self.locks.release(self.owner);
    }
}
