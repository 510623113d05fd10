//! Unary operator implementations

use crate::ast::UnaryOperatorKind;
use crate::error::{EvaluationError, EvaluationResult};
use crate::model::{EdmType, EdmValue};

use super::operand::{Operand, TypedOperand};

/// A unary operator applied to one already-evaluated operand
pub struct UnaryOperator {
    operand: TypedOperand,
}

impl UnaryOperator {
    /// Resolve the operand, inferring the type of a raw literal
    pub fn new(operand: Operand) -> Self {
        Self {
            operand: operand.into_typed(),
        }
    }

    /// `-`: numeric negation, kind preserved
    ///
    /// A Byte operand widens to Int16, since its negation cannot stay
    /// unsigned.
    pub fn minus(&self) -> EvaluationResult<Operand> {
        let overflow = || EvaluationError::arithmetic("integer overflow in unary '-'");
        let value = match &self.operand.value {
            EdmValue::SByte(v) => EdmValue::SByte(v.checked_neg().ok_or_else(overflow)?),
            EdmValue::Byte(v) => EdmValue::Int16(-i16::from(*v)),
            EdmValue::Int16(v) => EdmValue::Int16(v.checked_neg().ok_or_else(overflow)?),
            EdmValue::Int32(v) => EdmValue::Int32(v.checked_neg().ok_or_else(overflow)?),
            EdmValue::Int64(v) => EdmValue::Int64(v.checked_neg().ok_or_else(overflow)?),
            EdmValue::Decimal(v) => EdmValue::Decimal(-v),
            EdmValue::Double(v) => EdmValue::Double(-v),
            other => {
                return Err(EvaluationError::unsupported(format!(
                    "unary '-' requires a numeric operand, got {}",
                    other.kind_name()
                )))
            }
        };
        let edm_type = value
            .primitive_kind()
            .map(EdmType::Primitive)
            .unwrap_or_else(EdmType::int64);
        Ok(Operand::typed(value, edm_type))
    }

    /// `not`: boolean negation
    pub fn not(&self) -> EvaluationResult<Operand> {
        match self.operand.value {
            EdmValue::Boolean(v) => Ok(Operand::typed(EdmValue::Boolean(!v), EdmType::boolean())),
            ref other => Err(EvaluationError::unsupported(format!(
                "'not' requires a boolean operand, got {}",
                other.kind_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn typed(value: EdmValue) -> Operand {
        let edm_type = value
            .primitive_kind()
            .map(EdmType::Primitive)
            .unwrap_or_else(EdmType::string);
        Operand::typed(value, edm_type)
    }

    fn value_of(result: EvaluationResult<Operand>) -> EdmValue {
        result.unwrap().into_typed().value
    }

    #[test]
    fn minus_preserves_the_numeric_kind() {
        assert_eq!(value_of(UnaryOperator::new(typed(EdmValue::Int32(5))).minus()), EdmValue::Int32(-5));
        assert_eq!(
            value_of(UnaryOperator::new(typed(EdmValue::Decimal(Decimal::new(35, 1)))).minus()),
            EdmValue::Decimal(Decimal::new(-35, 1))
        );
        assert_eq!(
            value_of(UnaryOperator::new(typed(EdmValue::Double(2.5))).minus()),
            EdmValue::Double(-2.5)
        );
        assert_eq!(
            value_of(UnaryOperator::new(typed(EdmValue::Byte(5))).minus()),
            EdmValue::Int16(-5)
        );
    }

    #[test]
    fn minus_overflow_is_an_arithmetic_error() {
        let err = UnaryOperator::new(typed(EdmValue::Int64(i64::MIN))).minus().unwrap_err();
        assert!(matches!(err, EvaluationError::ArithmeticError { .. }));
    }

    #[test]
    fn minus_rejects_non_numeric() {
        let err = UnaryOperator::new(typed(EdmValue::String("a".into()))).minus().unwrap_err();
        assert!(matches!(err, EvaluationError::UnsupportedOperation { .. }));
    }

    #[test]
    fn double_negation_is_identity() {
        for b in [true, false] {
            let once = UnaryOperator::new(typed(EdmValue::Boolean(b))).not().unwrap();
            let twice = UnaryOperator::new(once).not().unwrap();
            assert_eq!(twice.into_typed().value, EdmValue::Boolean(b));
        }
    }

    #[test]
    fn not_rejects_non_boolean() {
        let err = UnaryOperator::new(typed(EdmValue::Int32(1))).not().unwrap_err();
        assert!(matches!(err, EvaluationError::UnsupportedOperation { .. }));
    }

    #[test]
    fn untyped_literal_infers_before_negation() {
        assert_eq!(
            value_of(UnaryOperator::new(Operand::untyped("true")).not()),
            EdmValue::Boolean(false)
        );
    }
}
