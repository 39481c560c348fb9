//! The Registry - immutable resource and operation lookup.

use crate::{OperationDefinition, ResourceDefinition};
use keel_core::PathAddress;
use std::collections::HashMap;

/// A registered operation: its definition plus the handler that runs it.
#[derive(Debug, Clone)]
pub struct OperationEntry<H> {
    pub definition: OperationDefinition,
    pub handler: H,
}

/// A resource type with its operations.
#[derive(Debug, Clone)]
pub(crate) struct ResourceRegistration<H> {
    pub(crate) definition: ResourceDefinition,
    pub(crate) operations: HashMap<String, OperationEntry<H>>,
}

/// The Registry provides runtime lookup of resource definitions and
/// operation handlers by address. It is immutable after construction.
///
/// `H` is the handler type; the registry itself never calls it.
#[derive(Debug)]
pub struct Registry<H> {
    /// Registrations, matched against addresses by pattern.
    resources: Vec<ResourceRegistration<H>>,
    /// Operations available at every address (e.g. read-resource).
    global: HashMap<String, OperationEntry<H>>,
}

impl<H> Registry<H> {
    pub(crate) fn new(
        resources: Vec<ResourceRegistration<H>>,
        global: HashMap<String, OperationEntry<H>>,
    ) -> Self {
        Self { resources, global }
    }

    // ==================== Resource Lookups ====================

    /// Find the registration for `address`. Exact segments win over
    /// wildcards when several patterns match.
    fn registration(&self, address: &PathAddress) -> Option<&ResourceRegistration<H>> {
        self.resources
            .iter()
            .filter(|r| address.matches(&r.definition.pattern))
            .min_by_key(|r| {
                r.definition
                    .pattern
                    .elements()
                    .iter()
                    .filter(|e| e.is_wildcard())
                    .count()
            })
    }

    /// Get the resource definition governing `address`.
    pub fn resource(&self, address: &PathAddress) -> Option<&ResourceDefinition> {
        self.registration(address).map(|r| &r.definition)
    }

    /// Get the number of registered resource types.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    // ==================== Operation Lookups ====================

    /// Resolve an operation at `address`. Resource-specific registrations
    /// shadow global ones.
    pub fn operation(&self, address: &PathAddress, name: &str) -> Option<&OperationEntry<H>> {
        self.registration(address)
            .and_then(|r| r.operations.get(name))
            .or_else(|| self.global.get(name))
    }

    /// Names of every operation callable at `address`, sorted.
    pub fn operation_names(&self, address: &PathAddress) -> Vec<&str> {
        let mut names: Vec<&str> = self.global.keys().map(String::as_str).collect();
        if let Some(r) = self.registration(address) {
            for name in r.operations.keys() {
                if !self.global.contains_key(name) {
                    names.push(name);
                }
            }
        }
        names.sort_unstable();
        names
    }
}
