//! Resource node storage.

use keel_core::{Attributes, Value};

/// A node in the resource tree: the attribute model held at one address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceNode {
    /// Attribute values.
    attributes: Attributes,
}

impl ResourceNode {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with the given attributes.
    pub fn with_attributes(attributes: Attributes) -> Self {
        Self { attributes }
    }

    /// Get an attribute value by name.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute value. Returns the previous value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(name.into(), value)
    }

    /// Remove an attribute.
    pub fn remove_attr(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// All attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Replace every attribute at once.
    pub fn replace_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }
}
