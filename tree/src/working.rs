//! A transaction's private working copy of the resource tree.

use keel_core::{messages, OperationError, OperationResult, PathAddress};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::node::ResourceNode;
use crate::tree::ResourceTree;

/// Working copy owned by exactly one transaction.
///
/// Reads see the transaction's own writes. Writes are only allowed inside
/// the address ranges the transaction has locked, and every written address
/// is recorded so that commit can publish exactly those changes.
#[derive(Debug)]
pub struct WorkingTree {
    tree: ResourceTree,
    scope: Vec<PathAddress>,
    touched: BTreeSet<PathAddress>,
}

impl WorkingTree {
    /// Start a working copy from a committed snapshot. `scope` lists the
    /// subtrees this transaction holds write locks on.
    pub fn new(base: &Arc<ResourceTree>, scope: Vec<PathAddress>) -> Self {
        Self {
            tree: ResourceTree::clone(base),
            scope,
            touched: BTreeSet::new(),
        }
    }

    /// Read-only view of the working copy.
    pub fn tree(&self) -> &ResourceTree {
        &self.tree
    }

    pub fn get(&self, address: &PathAddress) -> Option<&ResourceNode> {
        self.tree.get(address)
    }

    pub fn require(&self, address: &PathAddress) -> OperationResult<&ResourceNode> {
        self.tree.require(address)
    }

    pub fn contains(&self, address: &PathAddress) -> bool {
        self.tree.contains(address)
    }

    /// Returns true if `address` lies inside one of the locked subtrees.
    pub fn in_scope(&self, address: &PathAddress) -> bool {
        self.scope.iter().any(|root| address.starts_with(root))
    }

    /// Create a node (see [`ResourceTree::create`]).
    pub fn create(&mut self, address: &PathAddress) -> OperationResult<&mut ResourceNode> {
        self.check_scope(address)?;
        let node = self.tree.create(address)?;
        self.touched.insert(address.clone());
        Ok(node)
    }

    /// Mutable access to an existing node.
    pub fn require_mut(&mut self, address: &PathAddress) -> OperationResult<&mut ResourceNode> {
        self.check_scope(address)?;
        let node = self.tree.require_mut(address)?;
        self.touched.insert(address.clone());
        Ok(node)
    }

    /// Remove a leaf node (see [`ResourceTree::remove`]).
    pub fn remove(&mut self, address: &PathAddress) -> OperationResult<ResourceNode> {
        self.check_scope(address)?;
        let node = self.tree.remove(address)?;
        self.touched.insert(address.clone());
        Ok(node)
    }

    /// Addresses written by this transaction.
    pub fn touched(&self) -> &BTreeSet<PathAddress> {
        &self.touched
    }

    pub fn is_dirty(&self) -> bool {
        !self.touched.is_empty()
    }

    fn check_scope(&self, address: &PathAddress) -> OperationResult<()> {
        if self.in_scope(address) {
            Ok(())
        } else {
            Err(OperationError::internal(format!(
                "{}: {}",
                messages::ERR_ADDRESS_NOT_LOCKED,
                address
            )))
        }
    }
}
