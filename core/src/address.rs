//! Resource addresses.
//!
//! An address is an ordered, immutable sequence of `(key, value)` segments
//! identifying one node of the resource tree, e.g.
//! `[("subsystem", "logging"), ("handler", "console")]`. The empty address is
//! the root resource.

use std::fmt;

/// Wildcard segment value used by registration patterns.
pub const WILDCARD: &str = "*";

/// One `key=value` segment of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathElement {
    pub key: String,
    pub value: String,
}

impl PathElement {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A `key=*` element matching any value.
    pub fn wildcard(key: impl Into<String>) -> Self {
        Self::new(key, WILDCARD)
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }

    /// Returns true if this (pattern) element matches `other`.
    pub fn matches(&self, other: &PathElement) -> bool {
        self.key == other.key && (self.is_wildcard() || self.value == other.value)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Address of a resource in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PathAddress(Vec<PathElement>);

impl PathAddress {
    /// The root address.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }

    /// Build an address from `(key, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| PathElement::new(k, v))
                .collect(),
        )
    }

    /// A new address with `key=value` appended.
    pub fn append(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::new(key, value));
        Self(elements)
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last_element(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// The parent address, or `None` for the root.
    pub fn parent(&self) -> Option<PathAddress> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Returns true if `prefix` is this address or one of its ancestors.
    pub fn starts_with(&self, prefix: &PathAddress) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Two addresses overlap when one lies in the subtree of the other.
    pub fn overlaps(&self, other: &PathAddress) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Returns true if this address matches `pattern`, segment by segment,
    /// honoring `*` wildcard values in the pattern.
    pub fn matches(&self, pattern: &PathAddress) -> bool {
        self.0.len() == pattern.0.len()
            && pattern
                .0
                .iter()
                .zip(self.0.iter())
                .all(|(p, e)| p.matches(e))
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "/{}", element)?;
        }
        Ok(())
    }
}

impl From<Vec<PathElement>> for PathAddress {
    fn from(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }
}
