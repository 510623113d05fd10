//! Entity and property model
//!
//! An entity is an ordered bag of named, typed properties. Property counts
//! are small in practice, so lookups are plain linear scans.

use serde::{Deserialize, Serialize};

use super::schema::EdmType;
use super::value::EdmValue;

/// A named, typed property of an entity or complex value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Declared schema type
    pub edm_type: EdmType,
    /// Current value
    pub value: EdmValue,
}

impl Property {
    /// Create a new property
    pub fn new(name: impl Into<String>, edm_type: EdmType, value: EdmValue) -> Self {
        Self {
            name: name.into(),
            edm_type,
            value,
        }
    }

    /// Whether the property currently holds a structured value
    pub fn is_complex(&self) -> bool {
        self.value.is_complex()
    }
}

/// A nested structured value: the payload of a complex-typed property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexValue {
    /// Child properties, in declaration order
    pub properties: Vec<Property>,
}

impl ComplexValue {
    /// Create an empty complex value
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }

    /// Add a child property, builder style
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Find a child property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl Default for ComplexValue {
    fn default() -> Self {
        Self::new()
    }
}

/// The record being evaluated against: an ordered mapping from property name
/// to property value, immutable for the duration of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Properties, in declaration order
    pub properties: Vec<Property>,
}

impl Entity {
    /// Create an empty entity
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }

    /// Add a property, builder style
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Find a property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Entity> for ComplexValue {
    fn from(entity: Entity) -> Self {
        Self {
            properties: entity.properties,
        }
    }
}
