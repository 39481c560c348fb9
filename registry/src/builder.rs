//! RegistryBuilder for constructing an immutable Registry.

use crate::registry::{OperationEntry, ResourceRegistration};
use crate::{AttrDef, OperationDefinition, Registry, ResourceDefinition};
use keel_core::PathAddress;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate resource registration: {0}")]
    DuplicateResource(String),

    #[error("Duplicate operation {name} at {address}")]
    DuplicateOperation { address: String, name: String },

    #[error("Duplicate attribute {attr} at {address}")]
    DuplicateAttribute { address: String, attr: String },

    #[error("Invalid match pattern for {attr}: {message}")]
    InvalidPattern { attr: String, message: String },
}

/// Builder for constructing an immutable Registry.
#[derive(Debug)]
pub struct RegistryBuilder<H> {
    /// Resources being built.
    resources: Vec<ResourceRegistration<H>>,
    /// Operations registered for every address.
    global: HashMap<String, OperationEntry<H>>,
}

impl<H> Default for RegistryBuilder<H> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            global: HashMap::new(),
        }
    }
}

impl<H> RegistryBuilder<H> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource definition at an address pattern.
    pub fn add_resource(&mut self, pattern: PathAddress) -> ResourceBuilder<'_, H> {
        ResourceBuilder {
            builder: self,
            pattern,
            attributes: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Add an operation callable at every address.
    pub fn add_global_operation(
        &mut self,
        definition: OperationDefinition,
        handler: H,
    ) -> Result<&mut Self, RegistryError> {
        if self.global.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateOperation {
                address: "*".to_string(),
                name: definition.name,
            });
        }
        check_patterns(&definition.parameters)?;
        self.global.insert(
            definition.name.clone(),
            OperationEntry {
                definition,
                handler,
            },
        );
        Ok(self)
    }

    /// Build the registry.
    pub fn build(self) -> Result<Registry<H>, RegistryError> {
        Ok(Registry::new(self.resources, self.global))
    }
}

/// Builder for one resource registration.
pub struct ResourceBuilder<'a, H> {
    builder: &'a mut RegistryBuilder<H>,
    pattern: PathAddress,
    attributes: Vec<AttrDef>,
    operations: Vec<(OperationDefinition, H)>,
}

impl<'a, H> ResourceBuilder<'a, H> {
    /// Declare an attribute.
    pub fn attr(mut self, attr: AttrDef) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Declare several attributes.
    pub fn attrs(mut self, attrs: impl IntoIterator<Item = AttrDef>) -> Self {
        self.attributes.extend(attrs);
        self
    }

    /// Register an operation handler.
    pub fn operation(mut self, definition: OperationDefinition, handler: H) -> Self {
        self.operations.push((definition, handler));
        self
    }

    /// Finish the resource and add it to the registry.
    pub fn done(self) -> Result<(), RegistryError> {
        let address = self.pattern.to_string();

        if self
            .builder
            .resources
            .iter()
            .any(|r| r.definition.pattern == self.pattern)
        {
            return Err(RegistryError::DuplicateResource(address));
        }

        for (i, attr) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(RegistryError::DuplicateAttribute {
                    address,
                    attr: attr.name.clone(),
                });
            }
        }
        check_patterns(&self.attributes)?;

        let mut operations = HashMap::new();
        for (definition, handler) in self.operations {
            if operations.contains_key(&definition.name) {
                return Err(RegistryError::DuplicateOperation {
                    address,
                    name: definition.name,
                });
            }
            check_patterns(&definition.parameters)?;
            operations.insert(
                definition.name.clone(),
                OperationEntry {
                    definition,
                    handler,
                },
            );
        }

        let mut definition = ResourceDefinition::new(self.pattern);
        definition.attributes = self.attributes;
        self.builder.resources.push(ResourceRegistration {
            definition,
            operations,
        });
        Ok(())
    }
}

/// Compile every match pattern up front so bad schemas fail at build time.
fn check_patterns(attrs: &[AttrDef]) -> Result<(), RegistryError> {
    for attr in attrs {
        if let Some(pattern) = &attr.match_pattern {
            regex_lite::Regex::new(pattern).map_err(|e| RegistryError::InvalidPattern {
                attr: attr.name.clone(),
                message: e.to_string(),
            })?;
        }
    }
    Ok(())
}
