//! Operation requests.

use crate::{Attributes, PathAddress, Value};
use std::fmt;

/// Standard operation names.
pub mod names {
    pub const ADD: &str = "add";
    pub const REMOVE: &str = "remove";
    pub const WRITE_ATTRIBUTE: &str = "write-attribute";
    pub const READ_ATTRIBUTE: &str = "read-attribute";
    pub const READ_RESOURCE: &str = "read-resource";
    pub const READ_CHILDREN_NAMES: &str = "read-children-names";

    /// Parameter naming the attribute for read/write-attribute.
    pub const NAME: &str = "name";
    /// Parameter carrying the new value for write-attribute.
    pub const VALUE: &str = "value";
    /// Parameter selecting the child type for read-children-names.
    pub const CHILD_TYPE: &str = "child-type";
    /// Parameter asking read-resource to include children.
    pub const RECURSIVE: &str = "recursive";
}

/// An immutable request: operation name, target address and parameters.
///
/// Handlers read it and copy values out; nothing mutates it after
/// submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    address: PathAddress,
    params: Attributes,
}

impl Operation {
    pub fn new(name: impl Into<String>, address: PathAddress) -> Self {
        Self {
            name: name.into(),
            address,
            params: Attributes::new(),
        }
    }

    /// Builder-style parameter setter, used while constructing the request.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Attributes) -> Self {
        self.params.extend(params);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    pub fn params(&self) -> &Attributes {
        &self.params
    }

    /// Get a parameter. Missing parameters read as `None`.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Returns true if the parameter is present and not `Undefined`.
    pub fn has_defined(&self, name: &str) -> bool {
        self.params.get(name).is_some_and(Value::is_defined)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.name)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            for (i, (key, value)) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
