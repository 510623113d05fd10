//! Binary operator implementations
//!
//! Both operands have already been evaluated by the tree walk before an
//! operator runs, so `and`/`or` see both sides unconditionally. Every
//! operator consumes two operands and returns exactly one.

use std::cmp::Ordering;

use crate::ast::BinaryOperatorKind;
use crate::error::{EvaluationError, EvaluationResult};
use crate::model::{EdmType, EdmValue, PrimitiveKind};

use super::coercion::{coerce_pair, integer_result, wider_integer_kind, CoercedPair};
use super::operand::{Operand, TypedOperand};

/// A binary operator applied to two already-evaluated operands
pub struct BinaryOperator {
    left: TypedOperand,
    right: TypedOperand,
}

impl BinaryOperator {
    /// Resolve both operands, inferring types of raw literals
    pub fn new(left: Operand, right: Operand) -> Self {
        Self {
            left: left.into_typed(),
            right: right.into_typed(),
        }
    }

    /// `and`: boolean conjunction, both operands already evaluated
    pub fn and(&self) -> EvaluationResult<Operand> {
        let (a, b) = self.booleans(BinaryOperatorKind::And)?;
        Ok(boolean_result(a && b))
    }

    /// `or`: boolean disjunction, both operands already evaluated
    pub fn or(&self) -> EvaluationResult<Operand> {
        let (a, b) = self.booleans(BinaryOperatorKind::Or)?;
        Ok(boolean_result(a || b))
    }

    /// `eq`: null-aware equality
    pub fn equals(&self) -> EvaluationResult<Operand> {
        self.equality().map(boolean_result)
    }

    /// `ne`: null-aware inequality
    pub fn not_equals(&self) -> EvaluationResult<Operand> {
        self.equality().map(|eq| boolean_result(!eq))
    }

    /// `ge`
    pub fn greater_equals(&self) -> EvaluationResult<Operand> {
        let ord = self.compare(BinaryOperatorKind::Ge)?;
        Ok(boolean_result(matches!(
            ord,
            Some(Ordering::Greater | Ordering::Equal)
        )))
    }

    /// `gt`
    pub fn greater_than(&self) -> EvaluationResult<Operand> {
        let ord = self.compare(BinaryOperatorKind::Gt)?;
        Ok(boolean_result(matches!(ord, Some(Ordering::Greater))))
    }

    /// `le`
    pub fn less_equals(&self) -> EvaluationResult<Operand> {
        let ord = self.compare(BinaryOperatorKind::Le)?;
        Ok(boolean_result(matches!(
            ord,
            Some(Ordering::Less | Ordering::Equal)
        )))
    }

    /// `lt`
    pub fn less_than(&self) -> EvaluationResult<Operand> {
        let ord = self.compare(BinaryOperatorKind::Lt)?;
        Ok(boolean_result(matches!(ord, Some(Ordering::Less))))
    }

    /// `add`/`sub`/`mul`/`div`/`mod` over the numeric kinds
    pub fn arithmetic(&self, op: BinaryOperatorKind) -> EvaluationResult<Operand> {
        if self.left.is_null() || self.right.is_null() {
            return Err(EvaluationError::unsupported(format!(
                "'{op}' is not defined for null operands"
            )));
        }

        match coerce_pair(&self.left, &self.right)? {
            CoercedPair::Integers(a, b) => {
                let target = wider_integer_kind(
                    integer_kind_of(&self.left.value),
                    integer_kind_of(&self.right.value),
                );
                let value = integer_arithmetic(op, a, b)?;
                Ok(typed_result(integer_result(target, value)))
            }
            CoercedPair::Unsigned(a, b) => {
                let value = unsigned_arithmetic(op, a, b)?;
                Ok(typed_result(value))
            }
            CoercedPair::Decimals(a, b) => {
                let value = decimal_arithmetic(op, a, b)?;
                Ok(typed_result(EdmValue::Decimal(value)))
            }
            CoercedPair::Doubles(a, b) => {
                // IEEE semantics: division by zero yields infinity or NaN
                let value = match op {
                    BinaryOperatorKind::Add => a + b,
                    BinaryOperatorKind::Sub => a - b,
                    BinaryOperatorKind::Mul => a * b,
                    BinaryOperatorKind::Div => a / b,
                    BinaryOperatorKind::Mod => a % b,
                    _ => return Err(not_arithmetic(op)),
                };
                Ok(typed_result(EdmValue::Double(value)))
            }
            _ => Err(EvaluationError::unsupported(format!(
                "'{op}' requires numeric operands, got {} and {}",
                self.left.value.kind_name(),
                self.right.value.kind_name()
            ))),
        }
    }

    /// `has`: enum flag containment, `left & right == right`
    pub fn has(&self) -> EvaluationResult<Operand> {
        let (left_type, left_bits) = self.left.as_enum().ok_or_else(|| enum_error(&self.left))?;
        let (right_type, right_bits) = self.right.as_enum().ok_or_else(|| enum_error(&self.right))?;

        if left_type != right_type {
            return Err(EvaluationError::unsupported(format!(
                "'has' requires operands of the same enum type, got {left_type} and {right_type}"
            )));
        }

        Ok(boolean_result(left_bits & right_bits == right_bits))
    }

    fn booleans(&self, op: BinaryOperatorKind) -> EvaluationResult<(bool, bool)> {
        match (&self.left.value, &self.right.value) {
            (EdmValue::Boolean(a), EdmValue::Boolean(b)) => Ok((*a, *b)),
            _ => Err(EvaluationError::unsupported(format!(
                "'{op}' requires boolean operands, got {} and {}",
                self.left.value.kind_name(),
                self.right.value.kind_name()
            ))),
        }
    }

    /// Null-aware equality: null equals null and nothing else
    fn equality(&self) -> EvaluationResult<bool> {
        match (self.left.is_null(), self.right.is_null()) {
            (true, true) => Ok(true),
            (true, false) | (false, true) => Ok(false),
            (false, false) => {
                // Enum values compare by type name and combined bits.
                if let (Some((lt, lb)), Some((rt, rb))) =
                    (self.left.as_enum(), self.right.as_enum())
                {
                    return Ok(lt == rt && lb == rb);
                }
                Ok(coerced_equals(&coerce_pair(&self.left, &self.right)?))
            }
        }
    }

    fn compare(&self, op: BinaryOperatorKind) -> EvaluationResult<Option<Ordering>> {
        if self.left.is_null() || self.right.is_null() {
            return Err(EvaluationError::unsupported(format!(
                "'{op}' is not defined for null operands"
            )));
        }
        Ok(coerced_compare(&coerce_pair(&self.left, &self.right)?))
    }
}

fn coerced_equals(pair: &CoercedPair) -> bool {
    match pair {
        CoercedPair::Booleans(a, b) => a == b,
        CoercedPair::Integers(a, b) => a == b,
        CoercedPair::Unsigned(a, b) => a == b,
        CoercedPair::Decimals(a, b) => a == b,
        CoercedPair::Doubles(a, b) => a == b,
        CoercedPair::Strings(a, b) => a == b,
        CoercedPair::DateTimes(a, b) => a == b,
        CoercedPair::Binaries(a, b) => a == b,
    }
}

fn coerced_compare(pair: &CoercedPair) -> Option<Ordering> {
    match pair {
        CoercedPair::Booleans(a, b) => Some(a.cmp(b)),
        CoercedPair::Integers(a, b) => Some(a.cmp(b)),
        CoercedPair::Unsigned(a, b) => Some(a.cmp(b)),
        CoercedPair::Decimals(a, b) => Some(a.cmp(b)),
        // NaN compares as neither less, equal, nor greater
        CoercedPair::Doubles(a, b) => a.partial_cmp(b),
        CoercedPair::Strings(a, b) => Some(a.cmp(b)),
        CoercedPair::DateTimes(a, b) => Some(a.cmp(b)),
        CoercedPair::Binaries(a, b) => Some(a.cmp(b)),
    }
}

fn integer_arithmetic(op: BinaryOperatorKind, a: i64, b: i64) -> EvaluationResult<i64> {
    let result = match op {
        BinaryOperatorKind::Add => a.checked_add(b),
        BinaryOperatorKind::Sub => a.checked_sub(b),
        BinaryOperatorKind::Mul => a.checked_mul(b),
        BinaryOperatorKind::Div => {
            if b == 0 {
                return Err(division_by_zero(op));
            }
            a.checked_div(b)
        }
        BinaryOperatorKind::Mod => {
            if b == 0 {
                return Err(division_by_zero(op));
            }
            a.checked_rem(b)
        }
        _ => return Err(not_arithmetic(op)),
    };
    result.ok_or_else(|| EvaluationError::arithmetic(format!("integer overflow in '{op}'")))
}

fn unsigned_arithmetic(op: BinaryOperatorKind, a: u64, b: u64) -> EvaluationResult<EdmValue> {
    let result = match op {
        BinaryOperatorKind::Add => a.checked_add(b),
        BinaryOperatorKind::Sub => a.checked_sub(b),
        BinaryOperatorKind::Mul => a.checked_mul(b),
        BinaryOperatorKind::Div => {
            if b == 0 {
                return Err(division_by_zero(op));
            }
            a.checked_div(b)
        }
        BinaryOperatorKind::Mod => {
            if b == 0 {
                return Err(division_by_zero(op));
            }
            a.checked_rem(b)
        }
        _ => return Err(not_arithmetic(op)),
    };
    let value =
        result.ok_or_else(|| EvaluationError::arithmetic(format!("unsigned overflow in '{op}'")))?;

    Ok(match u8::try_from(value) {
        Ok(narrow) => EdmValue::Byte(narrow),
        Err(_) => i64::try_from(value)
            .map(EdmValue::Int64)
            .map_err(|_| EvaluationError::arithmetic(format!("unsigned overflow in '{op}'")))?,
    })
}

fn decimal_arithmetic(
    op: BinaryOperatorKind,
    a: rust_decimal::Decimal,
    b: rust_decimal::Decimal,
) -> EvaluationResult<rust_decimal::Decimal> {
    let result = match op {
        BinaryOperatorKind::Add => a.checked_add(b),
        BinaryOperatorKind::Sub => a.checked_sub(b),
        BinaryOperatorKind::Mul => a.checked_mul(b),
        BinaryOperatorKind::Div => {
            if b.is_zero() {
                return Err(division_by_zero(op));
            }
            a.checked_div(b)
        }
        BinaryOperatorKind::Mod => {
            if b.is_zero() {
                return Err(division_by_zero(op));
            }
            a.checked_rem(b)
        }
        _ => return Err(not_arithmetic(op)),
    };
    result.ok_or_else(|| EvaluationError::arithmetic(format!("decimal overflow in '{op}'")))
}

fn integer_kind_of(value: &EdmValue) -> PrimitiveKind {
    value
        .primitive_kind()
        .filter(|k| k.is_integer())
        .unwrap_or(PrimitiveKind::Int64)
}

fn typed_result(value: EdmValue) -> Operand {
    let edm_type = value
        .primitive_kind()
        .map(EdmType::Primitive)
        .unwrap_or_else(EdmType::int64);
    Operand::typed(value, edm_type)
}

fn boolean_result(value: bool) -> Operand {
    Operand::typed(EdmValue::Boolean(value), EdmType::boolean())
}

fn division_by_zero(op: BinaryOperatorKind) -> EvaluationError {
    EvaluationError::arithmetic(format!("division by zero in '{op}'"))
}

fn not_arithmetic(op: BinaryOperatorKind) -> EvaluationError {
    EvaluationError::unsupported(format!("'{op}' is not an arithmetic operator"))
}

fn enum_error(operand: &TypedOperand) -> EvaluationError {
    EvaluationError::unsupported(format!(
        "'has' requires enum operands, got {}",
        operand.value.kind_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdmEnumType;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn typed(value: EdmValue) -> Operand {
        let edm_type = value
            .primitive_kind()
            .map(EdmType::Primitive)
            .unwrap_or_else(EdmType::string);
        Operand::typed(value, edm_type)
    }

    fn op(left: EdmValue, right: EdmValue) -> BinaryOperator {
        BinaryOperator::new(typed(left), typed(right))
    }

    fn value_of(result: EvaluationResult<Operand>) -> EdmValue {
        result.unwrap().into_typed().value
    }

    #[test]
    fn equality_is_null_aware() {
        assert_eq!(value_of(op(EdmValue::Null, EdmValue::Null).equals()), EdmValue::Boolean(true));
        assert_eq!(
            value_of(op(EdmValue::Null, EdmValue::Int32(1)).equals()),
            EdmValue::Boolean(false)
        );
        assert_eq!(
            value_of(op(EdmValue::Null, EdmValue::Int32(1)).not_equals()),
            EdmValue::Boolean(true)
        );
        assert_eq!(
            value_of(op(EdmValue::Int32(1), EdmValue::Int64(1)).equals()),
            EdmValue::Boolean(true)
        );
    }

    #[test]
    fn relational_comparison_rejects_null() {
        let err = op(EdmValue::Null, EdmValue::Int32(1)).less_than().unwrap_err();
        assert!(matches!(err, EvaluationError::UnsupportedOperation { .. }));
    }

    #[test]
    fn relational_comparison_by_common_kind() {
        assert_eq!(
            value_of(op(EdmValue::Int32(17), EdmValue::Int64(18)).greater_equals()),
            EdmValue::Boolean(false)
        );
        assert_eq!(
            value_of(op(EdmValue::String("apple".into()), EdmValue::String("banana".into())).less_than()),
            EdmValue::Boolean(true)
        );
        assert_eq!(
            value_of(op(EdmValue::Decimal(Decimal::new(25, 1)), EdmValue::Double(3.0)).less_equals()),
            EdmValue::Boolean(true)
        );
    }

    #[test]
    fn chronological_comparison() {
        use crate::evaluator::coercion::parse_datetime;
        let earlier = parse_datetime("2024-05-01T09:00:00Z").unwrap();
        assert_eq!(
            value_of(
                op(
                    EdmValue::DateTime(earlier),
                    EdmValue::String("2024-05-01T10:00:00Z".into())
                )
                .less_than()
            ),
            EdmValue::Boolean(true)
        );
    }

    #[test]
    fn and_or_require_booleans() {
        assert_eq!(
            value_of(op(EdmValue::Boolean(true), EdmValue::Boolean(false)).and()),
            EdmValue::Boolean(false)
        );
        assert_eq!(
            value_of(op(EdmValue::Boolean(true), EdmValue::Boolean(false)).or()),
            EdmValue::Boolean(true)
        );
        let err = op(EdmValue::Int32(1), EdmValue::Boolean(true)).and().unwrap_err();
        assert!(matches!(err, EvaluationError::UnsupportedOperation { .. }));
    }

    #[test]
    fn integer_arithmetic_uses_widest_kind_and_stays_exact() {
        assert_eq!(
            value_of(op(EdmValue::Int16(2), EdmValue::Int32(3)).arithmetic(BinaryOperatorKind::Add)),
            EdmValue::Int32(5)
        );
        assert_eq!(
            value_of(op(EdmValue::Int32(7), EdmValue::Int32(2)).arithmetic(BinaryOperatorKind::Div)),
            EdmValue::Int32(3)
        );
        assert_eq!(
            value_of(op(EdmValue::Int64(7), EdmValue::Int32(4)).arithmetic(BinaryOperatorKind::Mod)),
            EdmValue::Int64(3)
        );
    }

    #[test]
    fn byte_arithmetic_is_range_checked_unsigned() {
        assert_eq!(
            value_of(op(EdmValue::Byte(200), EdmValue::Byte(100)).arithmetic(BinaryOperatorKind::Add)),
            EdmValue::Int64(300)
        );
        assert_eq!(
            value_of(op(EdmValue::Byte(100), EdmValue::Byte(30)).arithmetic(BinaryOperatorKind::Sub)),
            EdmValue::Byte(70)
        );
        let err = op(EdmValue::Byte(1), EdmValue::Byte(2))
            .arithmetic(BinaryOperatorKind::Sub)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::ArithmeticError { .. }));
    }

    #[test]
    fn mixed_decimal_arithmetic_follows_wider_operand() {
        assert_eq!(
            value_of(
                op(EdmValue::Int32(2), EdmValue::Decimal(Decimal::new(15, 1)))
                    .arithmetic(BinaryOperatorKind::Mul)
            ),
            EdmValue::Decimal(Decimal::new(30, 1))
        );
    }

    #[test]
    fn exact_division_by_zero_is_an_arithmetic_error() {
        let err = op(EdmValue::Int32(1), EdmValue::Int32(0))
            .arithmetic(BinaryOperatorKind::Div)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::ArithmeticError { .. }));

        let err = op(EdmValue::Decimal(Decimal::ONE), EdmValue::Decimal(Decimal::ZERO))
            .arithmetic(BinaryOperatorKind::Mod)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::ArithmeticError { .. }));
    }

    #[test]
    fn double_division_by_zero_follows_ieee() {
        assert_eq!(
            value_of(op(EdmValue::Double(1.0), EdmValue::Double(0.0)).arithmetic(BinaryOperatorKind::Div)),
            EdmValue::Double(f64::INFINITY)
        );
    }

    #[test]
    fn string_arithmetic_is_unsupported() {
        let err = op(EdmValue::String("a".into()), EdmValue::Int32(1))
            .arithmetic(BinaryOperatorKind::Add)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::UnsupportedOperation { .. }));
    }

    #[test]
    fn has_tests_flag_containment() {
        let color = EdmType::Enum(
            EdmEnumType::new("Color")
                .with_member("Red", 1)
                .with_member("Blue", 4),
        );
        let enum_value = |bits: i64| {
            Operand::typed(
                EdmValue::Enum {
                    type_name: "Color".into(),
                    value: bits,
                },
                color.clone(),
            )
        };

        // reflexive over identical flag sets
        assert_eq!(
            value_of(BinaryOperator::new(enum_value(5), enum_value(5)).has()),
            EdmValue::Boolean(true)
        );
        assert_eq!(
            value_of(BinaryOperator::new(enum_value(5), enum_value(1)).has()),
            EdmValue::Boolean(true)
        );
        // right operand with a bit not set in the left
        assert_eq!(
            value_of(BinaryOperator::new(enum_value(1), enum_value(4)).has()),
            EdmValue::Boolean(false)
        );
    }

    #[test]
    fn enum_equality_compares_type_and_bits() {
        let color = |bits: i64| {
            Operand::typed(
                EdmValue::Enum {
                    type_name: "Color".into(),
                    value: bits,
                },
                EdmType::int64(),
            )
        };
        assert_eq!(
            value_of(BinaryOperator::new(color(5), color(5)).equals()),
            EdmValue::Boolean(true)
        );
        assert_eq!(
            value_of(BinaryOperator::new(color(5), color(1)).not_equals()),
            EdmValue::Boolean(true)
        );
    }

    #[test]
    fn has_rejects_non_enum_and_mismatched_enums() {
        let err = BinaryOperator::new(typed(EdmValue::Int32(1)), typed(EdmValue::Int32(1)))
            .has()
            .unwrap_err();
        assert!(matches!(err, EvaluationError::UnsupportedOperation { .. }));

        let left = Operand::typed(
            EdmValue::Enum {
                type_name: "Color".into(),
                value: 1,
            },
            EdmType::int64(),
        );
        let right = Operand::typed(
            EdmValue::Enum {
                type_name: "Size".into(),
                value: 1,
            },
            EdmType::int64(),
        );
        let err = BinaryOperator::new(left, right).has().unwrap_err();
        assert!(matches!(err, EvaluationError::UnsupportedOperation { .. }));
    }

    #[test]
    fn untyped_literals_infer_before_the_operation() {
        let result = BinaryOperator::new(Operand::untyped("2"), Operand::untyped("3"))
            .arithmetic(BinaryOperatorKind::Add);
        assert_eq!(value_of(result), EdmValue::Int64(5));
    }
}
