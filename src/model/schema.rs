//! Schema (EDM) type descriptors and lookup service
//!
//! The evaluator treats the schema as an opaque lookup service: given a type
//! or function name it returns classification facts (primitive, complex,
//! entity, enum) and enum member-to-integer mappings. Nothing here performs
//! evaluation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive scalar kinds of the type system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// The kind of the `null` literal
    Null,
    /// `Edm.Boolean`
    Boolean,
    /// `Edm.SByte`
    SByte,
    /// `Edm.Byte`
    Byte,
    /// `Edm.Int16`
    Int16,
    /// `Edm.Int32`
    Int32,
    /// `Edm.Int64`
    Int64,
    /// `Edm.Decimal`
    Decimal,
    /// `Edm.Double`
    Double,
    /// `Edm.String`
    String,
    /// `Edm.DateTimeOffset`
    DateTimeOffset,
    /// `Edm.Binary`
    Binary,
}

impl PrimitiveKind {
    /// Whether this kind participates in numeric promotion
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Decimal
                | Self::Double
        )
    }

    /// Whether this kind is an exact integer kind
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::SByte | Self::Byte | Self::Int16 | Self::Int32 | Self::Int64
        )
    }
}

/// A declared schema type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdmType {
    /// A primitive scalar type
    Primitive(PrimitiveKind),
    /// An enum type
    Enum(EdmEnumType),
    /// A complex (structured, non-entity) type, by name
    Complex(String),
    /// An entity type, by name
    Entity(String),
}

impl EdmType {
    /// Shorthand for `Edm.Boolean`
    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    /// Shorthand for `Edm.Int32`
    pub fn int32() -> Self {
        Self::Primitive(PrimitiveKind::Int32)
    }

    /// Shorthand for `Edm.Int64`
    pub fn int64() -> Self {
        Self::Primitive(PrimitiveKind::Int64)
    }

    /// Shorthand for `Edm.Decimal`
    pub fn decimal() -> Self {
        Self::Primitive(PrimitiveKind::Decimal)
    }

    /// Shorthand for `Edm.Double`
    pub fn double() -> Self {
        Self::Primitive(PrimitiveKind::Double)
    }

    /// Shorthand for `Edm.String`
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    /// Shorthand for `Edm.DateTimeOffset`
    pub fn datetime_offset() -> Self {
        Self::Primitive(PrimitiveKind::DateTimeOffset)
    }

    /// Shorthand for `Edm.Binary`
    pub fn binary() -> Self {
        Self::Primitive(PrimitiveKind::Binary)
    }

    /// The enum type descriptor, if this is an enum type
    pub fn as_enum(&self) -> Option<&EdmEnumType> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }
}

/// An enum type: a name plus an ordered member-to-integer mapping
///
/// Flag and non-flag enums are not distinguished; literal member lists always
/// combine with bitwise OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdmEnumType {
    /// Type name
    pub name: String,
    /// Members in declaration order, mapped to their underlying values
    pub members: IndexMap<String, i64>,
}

impl EdmEnumType {
    /// Create an enum type with no members
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: IndexMap::new(),
        }
    }

    /// Add a member, builder style
    pub fn with_member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.insert(name.into(), value);
        self
    }

    /// Resolve a member name to its underlying value
    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.members.get(member).copied()
    }
}

/// A schema-level function that can appear as a member reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdmFunction {
    /// Function name
    pub name: String,
    /// Declared return type
    pub return_type: EdmType,
    /// Whether the function returns a collection
    pub returns_collection: bool,
}

impl EdmFunction {
    /// Create a function descriptor
    pub fn new(name: impl Into<String>, return_type: EdmType, returns_collection: bool) -> Self {
        Self {
            name: name.into(),
            return_type,
            returns_collection,
        }
    }
}

/// The schema handle: a registry of enum types and functions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdmSchema {
    enums: IndexMap<String, EdmEnumType>,
    functions: IndexMap<String, EdmFunction>,
}

impl EdmSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enum type, builder style
    pub fn with_enum(mut self, enum_type: EdmEnumType) -> Self {
        self.enums.insert(enum_type.name.clone(), enum_type);
        self
    }

    /// Register a function, builder style
    pub fn with_function(mut self, function: EdmFunction) -> Self {
        self.functions.insert(function.name.clone(), function);
        self
    }

    /// Look up an enum type by name
    pub fn enum_type(&self, name: &str) -> Option<&EdmEnumType> {
        self.enums.get(name)
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<&EdmFunction> {
        self.functions.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_member_lookup() {
        let color = EdmEnumType::new("Color")
            .with_member("Red", 1)
            .with_member("Green", 2)
            .with_member("Blue", 4);

        assert_eq!(color.value_of("Red"), Some(1));
        assert_eq!(color.value_of("Blue"), Some(4));
        assert_eq!(color.value_of("Magenta"), None);
    }

    #[test]
    fn schema_registries() {
        let schema = EdmSchema::new()
            .with_enum(EdmEnumType::new("Color").with_member("Red", 1))
            .with_function(EdmFunction::new("TopProduct", EdmType::Entity("Product".into()), false));

        assert!(schema.enum_type("Color").is_some());
        assert!(schema.function("TopProduct").is_some());
        assert!(schema.function("Unknown").is_none());
    }
}
