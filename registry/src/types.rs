//! Schema definition types.

use keel_core::{PathAddress, Value, ValueType};
use std::collections::HashSet;

/// Attribute (or operation parameter) definition.
#[derive(Debug, Clone)]
pub struct AttrDef {
    /// Attribute name.
    pub name: String,
    /// Declared type.
    pub value_type: ValueType,
    /// Whether this attribute must be supplied (or defaulted).
    pub required: bool,
    /// Whether this attribute may be undefined.
    pub nullable: bool,
    /// Whether `${...}` expressions are accepted in place of a literal.
    pub allow_expression: bool,
    /// Default value if not provided.
    pub default: Option<Value>,
    /// Minimum value constraint (for Int).
    pub min: Option<i64>,
    /// Maximum value constraint (for Int).
    pub max: Option<i64>,
    /// Match pattern constraint (regex) for String.
    pub match_pattern: Option<String>,
    /// Allowed values (in: [...] constraint).
    pub allowed_values: Option<Vec<Value>>,
    /// Minimum string length constraint.
    pub length_min: Option<usize>,
    /// Maximum string length constraint.
    pub length_max: Option<usize>,
}

impl AttrDef {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: false,
            nullable: true,
            allow_expression: false,
            default: None,
            min: None,
            max: None,
            match_pattern: None,
            allowed_values: None,
            length_min: None,
            length_max: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.nullable = false;
        self
    }

    pub fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn allow_expression(mut self) -> Self {
        self.allow_expression = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        // Merge rather than replace: only update if Some is provided
        if min.is_some() {
            self.min = min;
        }
        if max.is_some() {
            self.max = max;
        }
        self
    }

    pub fn with_match_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.match_pattern = Some(pattern.into());
        self
    }

    pub fn with_allowed_values(mut self, values: Vec<Value>) -> Self {
        self.allowed_values = Some(values);
        self
    }

    pub fn with_length(mut self, min: usize, max: usize) -> Self {
        self.length_min = Some(min);
        self.length_max = Some(max);
        self
    }
}

/// Behavioral flags of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationFlag {
    /// Does not modify the model; runs without address locks.
    ReadOnly,
    /// Applying it to a running process requires a reload.
    RestartRequired,
    /// Only valid while the process is booting.
    BootOnly,
}

/// Marks an operation as deprecated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationData {
    /// Version the deprecation took effect in.
    pub since: String,
    /// Optional replacement hint.
    pub note: Option<String>,
}

/// Defining characteristics of an operation on a resource.
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    /// Operation name, e.g. `add`.
    pub name: String,
    /// Declared parameters. Parameters not listed here are rejected.
    pub parameters: Vec<AttrDef>,
    /// Behavioral flags.
    pub flags: HashSet<OperationFlag>,
    /// Type of the result value, if any.
    pub reply_type: Option<ValueType>,
    /// For collection replies, the element type.
    pub reply_value_type: Option<ValueType>,
    /// Deprecation marker.
    pub deprecation: Option<DeprecationData>,
}

impl OperationDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            flags: HashSet::new(),
            reply_type: None,
            reply_value_type: None,
            deprecation: None,
        }
    }

    pub fn param(mut self, param: AttrDef) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = AttrDef>) -> Self {
        self.parameters.extend(params);
        self
    }

    pub fn flag(mut self, flag: OperationFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn reply(mut self, reply_type: ValueType) -> Self {
        self.reply_type = Some(reply_type);
        self
    }

    pub fn reply_of(mut self, reply_type: ValueType, value_type: ValueType) -> Self {
        self.reply_type = Some(reply_type);
        self.reply_value_type = Some(value_type);
        self
    }

    pub fn deprecated(mut self, since: impl Into<String>, note: Option<String>) -> Self {
        self.deprecation = Some(DeprecationData {
            since: since.into(),
            note,
        });
        self
    }

    pub fn has_flag(&self, flag: OperationFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_read_only(&self) -> bool {
        self.has_flag(OperationFlag::ReadOnly)
    }

    /// Get a parameter definition by name.
    pub fn get_param(&self, name: &str) -> Option<&AttrDef> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Resource type definition registered at an address pattern.
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    /// Address pattern, e.g. `/system-property=*`.
    pub pattern: PathAddress,
    /// Attribute definitions, in declaration order.
    pub attributes: Vec<AttrDef>,
}

impl ResourceDefinition {
    pub fn new(pattern: PathAddress) -> Self {
        Self {
            pattern,
            attributes: Vec::new(),
        }
    }

    /// Get an attribute definition by name.
    pub fn get_attr(&self, name: &str) -> Option<&AttrDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check if this resource has an attribute.
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Get all attribute names.
    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}
