//! Operand model: the evaluator's uniform result currency
//!
//! Every visit produces exactly one operand. An operand either carries a
//! resolved value with its declared type, or the raw lexical text of a
//! literal whose type has not been needed yet. Inference happens lazily, at
//! the first point an untyped operand participates in a typed operation.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{EdmType, EdmValue, PrimitiveKind, Property};

/// A value whose semantic type is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedOperand {
    /// The resolved value
    pub value: EdmValue,
    /// The declared (or inferred) schema type
    pub edm_type: EdmType,
    /// The originating property descriptor, when the operand was resolved
    /// from a schema property; needed for enum/complex round-tripping
    pub property: Option<Property>,
}

impl TypedOperand {
    /// Create a typed operand without an originating property
    pub fn new(value: EdmValue, edm_type: EdmType) -> Self {
        Self {
            value,
            edm_type,
            property: None,
        }
    }

    /// Create a typed operand resolved from a schema property
    pub fn from_property(value: EdmValue, edm_type: EdmType, property: Property) -> Self {
        Self {
            value,
            edm_type,
            property: Some(property),
        }
    }

    /// Whether the carried value is null
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// The enum type name and bit value, when this operand is enum-typed
    ///
    /// Accepts either an [`EdmValue::Enum`] value or an integer value whose
    /// declared type is an enum.
    pub fn as_enum(&self) -> Option<(&str, i64)> {
        if let EdmValue::Enum { type_name, value } = &self.value {
            return Some((type_name.as_str(), *value));
        }
        if let EdmType::Enum(enum_type) = &self.edm_type {
            if let EdmValue::Int64(bits) = self.value {
                return Some((enum_type.name.as_str(), bits));
            }
        }
        None
    }
}

/// A raw literal whose type has not been resolved yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntypedOperand {
    /// The literal text, exactly as written in the expression
    pub text: String,
}

impl UntypedOperand {
    /// Wrap literal text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Infer a typed operand from the lexical form of the literal
    ///
    /// `null`, `true` and `false` resolve to their keywords; a whole number
    /// in `i64` range becomes Int64; a fractional or exponent form becomes
    /// Decimal; a single-quoted lexeme becomes its unescaped string content;
    /// anything else is kept as an opaque string.
    pub fn into_typed(self) -> TypedOperand {
        let text = self.text;

        match text.as_str() {
            "null" => {
                return TypedOperand::new(EdmValue::Null, EdmType::Primitive(PrimitiveKind::Null))
            }
            "true" => return TypedOperand::new(EdmValue::Boolean(true), EdmType::boolean()),
            "false" => return TypedOperand::new(EdmValue::Boolean(false), EdmType::boolean()),
            _ => {}
        }

        if let Ok(v) = text.parse::<i64>() {
            return TypedOperand::new(EdmValue::Int64(v), EdmType::int64());
        }

        if text.contains(['.', 'e', 'E']) && !text.starts_with('\'') {
            if let Ok(d) = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
                return TypedOperand::new(EdmValue::Decimal(d), EdmType::decimal());
            }
        }

        if let Some(inner) = strip_string_quotes(&text) {
            return TypedOperand::new(EdmValue::String(inner), EdmType::string());
        }

        TypedOperand::new(EdmValue::String(text), EdmType::string())
    }
}

/// The evaluator's core currency: either a typed value or a not-yet-typed
/// literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// A value with a resolved type
    Typed(TypedOperand),
    /// A raw literal awaiting inference
    Untyped(UntypedOperand),
}

impl Operand {
    /// A typed operand without an originating property
    pub fn typed(value: EdmValue, edm_type: EdmType) -> Self {
        Self::Typed(TypedOperand::new(value, edm_type))
    }

    /// A typed operand resolved from a schema property
    pub fn typed_from_property(value: EdmValue, edm_type: EdmType, property: Property) -> Self {
        Self::Typed(TypedOperand::from_property(value, edm_type, property))
    }

    /// An untyped operand from literal text
    pub fn untyped(text: impl Into<String>) -> Self {
        Self::Untyped(UntypedOperand::new(text))
    }

    /// Resolve to a typed operand, inferring the type from the lexical form
    /// when necessary
    pub fn into_typed(self) -> TypedOperand {
        match self {
            Self::Typed(typed) => typed,
            Self::Untyped(untyped) => untyped.into_typed(),
        }
    }
}

/// Strip surrounding single quotes and unescape doubled quotes, if the
/// lexeme is a string literal
fn strip_string_quotes(text: &str) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn infer(text: &str) -> TypedOperand {
        Operand::untyped(text).into_typed()
    }

    #[test]
    fn infers_null_and_booleans() {
        assert_eq!(infer("null").value, EdmValue::Null);
        assert_eq!(infer("true").value, EdmValue::Boolean(true));
        assert_eq!(infer("false").value, EdmValue::Boolean(false));
    }

    #[test]
    fn infers_integers_in_range() {
        assert_eq!(infer("42").value, EdmValue::Int64(42));
        assert_eq!(infer("-7").value, EdmValue::Int64(-7));
        assert_eq!(infer("9223372036854775807").value, EdmValue::Int64(i64::MAX));
    }

    #[test]
    fn infers_decimals_from_fractional_and_exponent_forms() {
        assert_eq!(infer("3.5").value, EdmValue::Decimal(Decimal::new(35, 1)));
        assert_eq!(infer("1.5e2").value, EdmValue::Decimal(Decimal::new(150, 0)));
    }

    #[test]
    fn infers_quoted_strings_with_unescaping() {
        assert_eq!(infer("'Milk'").value, EdmValue::String("Milk".into()));
        assert_eq!(infer("'O''Brien'").value, EdmValue::String("O'Brien".into()));
        assert_eq!(infer("''").value, EdmValue::String(String::new()));
    }

    #[test]
    fn falls_back_to_opaque_string() {
        assert_eq!(
            infer("2024-05-01T10:00:00Z").value,
            EdmValue::String("2024-05-01T10:00:00Z".into())
        );
    }

    #[test]
    fn typed_operand_passes_through_unchanged() {
        let operand = Operand::typed(EdmValue::Int32(5), EdmType::int32());
        let typed = operand.into_typed();
        assert_eq!(typed.value, EdmValue::Int32(5));
        assert_eq!(typed.edm_type, EdmType::int32());
    }

    #[test]
    fn as_enum_reads_value_or_declared_type() {
        let from_value = TypedOperand::new(
            EdmValue::Enum {
                type_name: "Color".into(),
                value: 5,
            },
            EdmType::int64(),
        );
        assert_eq!(from_value.as_enum(), Some(("Color", 5)));

        let from_type = TypedOperand::new(
            EdmValue::Int64(3),
            EdmType::Enum(crate::model::EdmEnumType::new("Color").with_member("Red", 1)),
        );
        assert_eq!(from_type.as_enum(), Some(("Color", 3)));

        let plain = TypedOperand::new(EdmValue::Int64(3), EdmType::int64());
        assert_eq!(plain.as_enum(), None);
    }
}
