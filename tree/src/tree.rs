//! Core resource tree implementation.

use keel_core::{messages, OperationError, OperationResult, PathAddress};
use std::collections::BTreeMap;

use crate::node::ResourceNode;

/// The in-memory resource hierarchy.
///
/// Every non-root node's parent is present. The root node always exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTree {
    /// Node storage, ordered so a subtree is a contiguous range.
    nodes: BTreeMap<PathAddress, ResourceNode>,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    /// Create a tree holding only an empty root resource.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathAddress::root(), ResourceNode::new());
        Self { nodes }
    }

    // ==================== Node Operations ====================

    /// Create an empty node at `address`.
    ///
    /// Fails if a node already exists there or the parent is missing.
    pub fn create(&mut self, address: &PathAddress) -> OperationResult<&mut ResourceNode> {
        if self.nodes.contains_key(address) {
            return Err(OperationError::duplicate_resource(address.clone()));
        }
        if let Some(parent) = address.parent() {
            if !self.nodes.contains_key(&parent) {
                return Err(OperationError::resource_not_found(parent));
            }
        }
        Ok(self
            .nodes
            .entry(address.clone())
            .or_insert_with(ResourceNode::new))
    }

    /// Get a node by address.
    pub fn get(&self, address: &PathAddress) -> Option<&ResourceNode> {
        self.nodes.get(address)
    }

    /// Get a mutable reference to a node by address.
    pub fn get_mut(&mut self, address: &PathAddress) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(address)
    }

    /// Get a node, failing with "resource not found" if absent.
    pub fn require(&self, address: &PathAddress) -> OperationResult<&ResourceNode> {
        self.nodes
            .get(address)
            .ok_or_else(|| OperationError::resource_not_found(address.clone()))
    }

    /// Mutable variant of [`ResourceTree::require`].
    pub fn require_mut(&mut self, address: &PathAddress) -> OperationResult<&mut ResourceNode> {
        self.nodes
            .get_mut(address)
            .ok_or_else(|| OperationError::resource_not_found(address.clone()))
    }

    pub fn contains(&self, address: &PathAddress) -> bool {
        self.nodes.contains_key(address)
    }

    /// Remove a leaf node.
    ///
    /// The root cannot be removed, and nodes with children must have their
    /// children removed first.
    pub fn remove(&mut self, address: &PathAddress) -> OperationResult<ResourceNode> {
        if address.is_root() {
            return Err(OperationError::validation("Cannot remove the root resource"));
        }
        if !self.nodes.contains_key(address) {
            return Err(OperationError::resource_not_found(address.clone()));
        }
        if self.children(address).next().is_some() {
            return Err(OperationError::validation(format!(
                "{}: {}",
                messages::ERR_RESOURCE_HAS_CHILDREN,
                address
            )));
        }
        self.nodes
            .remove(address)
            .ok_or_else(|| OperationError::resource_not_found(address.clone()))
    }

    /// Direct children of `address`, in address order.
    pub fn children<'a>(
        &'a self,
        address: &'a PathAddress,
    ) -> impl Iterator<Item = &'a PathAddress> + 'a {
        let depth = address.len() + 1;
        self.nodes
            .range(address.clone()..)
            .take_while(move |(a, _)| a.starts_with(address))
            .filter(move |(a, _)| a.len() == depth)
            .map(|(a, _)| a)
    }

    /// Put `node` at `address` unconditionally. Used when publishing a
    /// transaction's changes into a snapshot.
    pub(crate) fn put(&mut self, address: PathAddress, node: ResourceNode) {
        self.nodes.insert(address, node);
    }

    /// Drop whatever is at `address`. Used when publishing.
    pub(crate) fn discard(&mut self, address: &PathAddress) {
        self.nodes.remove(address);
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over all nodes in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathAddress, &ResourceNode)> {
        self.nodes.iter()
    }
}
