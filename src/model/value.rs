//! Runtime value representation for entity properties and operands

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::ComplexValue;
use super::schema::PrimitiveKind;

/// A concrete value flowing through the evaluator
///
/// Every entity property, literal, and operator result is one of these
/// variants. The declared schema type travels separately (see
/// [`crate::evaluator::operand::TypedOperand`]); this enum encodes only the
/// runtime representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdmValue {
    /// The null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 8-bit signed integer (`Edm.SByte`)
    SByte(i8),
    /// 8-bit unsigned integer (`Edm.Byte`)
    Byte(u8),
    /// 16-bit signed integer (`Edm.Int16`)
    Int16(i16),
    /// 32-bit signed integer (`Edm.Int32`)
    Int32(i32),
    /// 64-bit signed integer (`Edm.Int64`)
    Int64(i64),
    /// Arbitrary-precision decimal (`Edm.Decimal`)
    Decimal(Decimal),
    /// IEEE double (`Edm.Double`)
    Double(f64),
    /// String value (`Edm.String`)
    String(String),
    /// Date/time with offset (`Edm.DateTimeOffset`)
    DateTime(DateTime<FixedOffset>),
    /// Byte sequence (`Edm.Binary`)
    Binary(Vec<u8>),
    /// Enum value as the underlying 64-bit representation
    Enum {
        /// Name of the enum type in the schema
        type_name: String,
        /// Combined member bits
        value: i64,
    },
    /// Nested structured value
    Complex(ComplexValue),
    /// Collection of values
    Collection(Vec<EdmValue>),
}

impl EdmValue {
    /// Whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value is a nested structured value
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    /// The primitive kind of this value, if it has one
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Null => Some(PrimitiveKind::Null),
            Self::Boolean(_) => Some(PrimitiveKind::Boolean),
            Self::SByte(_) => Some(PrimitiveKind::SByte),
            Self::Byte(_) => Some(PrimitiveKind::Byte),
            Self::Int16(_) => Some(PrimitiveKind::Int16),
            Self::Int32(_) => Some(PrimitiveKind::Int32),
            Self::Int64(_) => Some(PrimitiveKind::Int64),
            Self::Decimal(_) => Some(PrimitiveKind::Decimal),
            Self::Double(_) => Some(PrimitiveKind::Double),
            Self::String(_) => Some(PrimitiveKind::String),
            Self::DateTime(_) => Some(PrimitiveKind::DateTimeOffset),
            Self::Binary(_) => Some(PrimitiveKind::Binary),
            Self::Enum { .. } | Self::Complex(_) | Self::Collection(_) => None,
        }
    }

    /// Short description of the value's kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::SByte(_) => "SByte",
            Self::Byte(_) => "Byte",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Decimal(_) => "Decimal",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::DateTime(_) => "DateTimeOffset",
            Self::Binary(_) => "Binary",
            Self::Enum { .. } => "Enum",
            Self::Complex(_) => "Complex",
            Self::Collection(_) => "Collection",
        }
    }
}

impl fmt::Display for EdmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::SByte(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "'{v}'"),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Binary(v) => write!(f, "binary[{} bytes]", v.len()),
            Self::Enum { type_name, value } => write!(f, "{type_name}:{value}"),
            Self::Complex(v) => write!(f, "complex[{} properties]", v.properties.len()),
            Self::Collection(v) => write!(f, "collection[{} items]", v.len()),
        }
    }
}

impl From<bool> for EdmValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for EdmValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for EdmValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<Decimal> for EdmValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<f64> for EdmValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for EdmValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for EdmValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
