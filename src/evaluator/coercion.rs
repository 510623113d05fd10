//! Type coercion engine
//!
//! Given two typed operands, decides the single common kind both must be
//! evaluated in and converts both values into it. The promotion ladder,
//! narrow to wide: Boolean, 8/16/32-bit signed integers, 64-bit signed
//! integer, range-checked unsigned (only when both operands are statically
//! non-negative kinds), Decimal, Double. Decimal converts to Double when the
//! other operand is a Double, never the reverse. Strings, date/times, byte
//! sequences, and booleans pair only with their own kind.
//!
//! The coerced pair is an internal intermediate, recomputed per operator
//! invocation and never persisted.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{EvaluationError, EvaluationResult};
use crate::model::{EdmValue, PrimitiveKind};

use super::operand::TypedOperand;

/// Two operand values converted into their common evaluation kind
///
/// Construction through [`coerce_pair`] guarantees both sides are in the
/// same kind, so operator implementations can match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedPair {
    /// Both operands as booleans
    Booleans(bool, bool),
    /// Both operands as 64-bit signed integers
    Integers(i64, i64),
    /// Both operands as range-checked unsigned integers
    Unsigned(u64, u64),
    /// Both operands as arbitrary-precision decimals
    Decimals(Decimal, Decimal),
    /// Both operands as IEEE doubles
    Doubles(f64, f64),
    /// Both operands as strings
    Strings(String, String),
    /// Both operands as date/times
    DateTimes(DateTime<FixedOffset>, DateTime<FixedOffset>),
    /// Both operands as byte sequences
    Binaries(Vec<u8>, Vec<u8>),
}

/// The common evaluation kind for a pair of operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommonKind {
    Boolean,
    Integer,
    Unsigned,
    Decimal,
    Double,
    String,
    DateTime,
    Binary,
}

/// Coerce two operands into their common evaluation kind
///
/// Null operands have no common kind here; null-aware operators (`eq`/`ne`)
/// handle null before calling in.
pub fn coerce_pair(left: &TypedOperand, right: &TypedOperand) -> EvaluationResult<CoercedPair> {
    let kind = common_kind(left, right)?;
    Ok(match kind {
        CommonKind::Boolean => CoercedPair::Booleans(as_boolean(left)?, as_boolean(right)?),
        CommonKind::Integer => CoercedPair::Integers(as_integer(left)?, as_integer(right)?),
        CommonKind::Unsigned => CoercedPair::Unsigned(as_unsigned(left)?, as_unsigned(right)?),
        CommonKind::Decimal => CoercedPair::Decimals(as_decimal(left)?, as_decimal(right)?),
        CommonKind::Double => CoercedPair::Doubles(as_double(left)?, as_double(right)?),
        CommonKind::String => CoercedPair::Strings(as_string(left)?, as_string(right)?),
        CommonKind::DateTime => CoercedPair::DateTimes(as_datetime(left)?, as_datetime(right)?),
        CommonKind::Binary => CoercedPair::Binaries(as_binary(left)?, as_binary(right)?),
    })
}

fn common_kind(left: &TypedOperand, right: &TypedOperand) -> EvaluationResult<CommonKind> {
    let no_promotion = || {
        EvaluationError::unsupported(format!(
            "no common evaluation kind for {} and {}",
            left.value.kind_name(),
            right.value.kind_name()
        ))
    };

    let a = left.value.primitive_kind().ok_or_else(no_promotion)?;
    let b = right.value.primitive_kind().ok_or_else(no_promotion)?;

    use PrimitiveKind as K;
    if a.is_numeric() && b.is_numeric() {
        return Ok(if a == K::Double || b == K::Double {
            CommonKind::Double
        } else if a == K::Decimal || b == K::Decimal {
            CommonKind::Decimal
        } else if a == K::Byte && b == K::Byte {
            CommonKind::Unsigned
        } else {
            CommonKind::Integer
        });
    }

    match (a, b) {
        (K::Boolean, K::Boolean) => Ok(CommonKind::Boolean),
        (K::String, K::String) => Ok(CommonKind::String),
        (K::DateTimeOffset, K::DateTimeOffset)
        | (K::DateTimeOffset, K::String)
        | (K::String, K::DateTimeOffset) => Ok(CommonKind::DateTime),
        (K::Binary, K::Binary) => Ok(CommonKind::Binary),
        _ => Err(no_promotion()),
    }
}

fn as_boolean(operand: &TypedOperand) -> EvaluationResult<bool> {
    match operand.value {
        EdmValue::Boolean(v) => Ok(v),
        _ => Err(conversion_error(operand, "Boolean")),
    }
}

fn as_integer(operand: &TypedOperand) -> EvaluationResult<i64> {
    match operand.value {
        EdmValue::SByte(v) => Ok(i64::from(v)),
        EdmValue::Byte(v) => Ok(i64::from(v)),
        EdmValue::Int16(v) => Ok(i64::from(v)),
        EdmValue::Int32(v) => Ok(i64::from(v)),
        EdmValue::Int64(v) => Ok(v),
        _ => Err(conversion_error(operand, "Int64")),
    }
}

fn as_unsigned(operand: &TypedOperand) -> EvaluationResult<u64> {
    match operand.value {
        EdmValue::Byte(v) => Ok(u64::from(v)),
        _ => Err(conversion_error(operand, "unsigned")),
    }
}

fn as_decimal(operand: &TypedOperand) -> EvaluationResult<Decimal> {
    match &operand.value {
        EdmValue::SByte(v) => Ok(Decimal::from(*v)),
        EdmValue::Byte(v) => Ok(Decimal::from(*v)),
        EdmValue::Int16(v) => Ok(Decimal::from(*v)),
        EdmValue::Int32(v) => Ok(Decimal::from(*v)),
        EdmValue::Int64(v) => Ok(Decimal::from(*v)),
        EdmValue::Decimal(v) => Ok(*v),
        _ => Err(conversion_error(operand, "Decimal")),
    }
}

fn as_double(operand: &TypedOperand) -> EvaluationResult<f64> {
    match &operand.value {
        EdmValue::SByte(v) => Ok(f64::from(*v)),
        EdmValue::Byte(v) => Ok(f64::from(*v)),
        EdmValue::Int16(v) => Ok(f64::from(*v)),
        EdmValue::Int32(v) => Ok(f64::from(*v)),
        EdmValue::Int64(v) => Ok(*v as f64),
        EdmValue::Decimal(v) => v.to_f64().ok_or_else(|| conversion_error(operand, "Double")),
        EdmValue::Double(v) => Ok(*v),
        _ => Err(conversion_error(operand, "Double")),
    }
}

fn as_string(operand: &TypedOperand) -> EvaluationResult<String> {
    match &operand.value {
        EdmValue::String(v) => Ok(v.clone()),
        _ => Err(conversion_error(operand, "String")),
    }
}

fn as_datetime(operand: &TypedOperand) -> EvaluationResult<DateTime<FixedOffset>> {
    match &operand.value {
        EdmValue::DateTime(v) => Ok(*v),
        EdmValue::String(v) => parse_datetime(v),
        _ => Err(conversion_error(operand, "DateTimeOffset")),
    }
}

fn as_binary(operand: &TypedOperand) -> EvaluationResult<Vec<u8>> {
    match &operand.value {
        EdmValue::Binary(v) => Ok(v.clone()),
        _ => Err(conversion_error(operand, "Binary")),
    }
}

fn conversion_error(operand: &TypedOperand, target: &str) -> EvaluationError {
    EvaluationError::unsupported(format!(
        "cannot evaluate {} as {target}",
        operand.value.kind_name()
    ))
}

/// Parse a date/time lexeme: RFC 3339, or a bare date taken as midnight UTC
pub fn parse_datetime(text: &str) -> EvaluationResult<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_naive_utc_and_offset(midnight, Utc.fix()));
        }
    }
    Err(EvaluationError::type_error(format!(
        "cannot interpret '{text}' as Edm.DateTimeOffset"
    )))
}

/// The wider of two exact integer kinds, used to type arithmetic results
pub(crate) fn wider_integer_kind(a: PrimitiveKind, b: PrimitiveKind) -> PrimitiveKind {
    if integer_rank(b) > integer_rank(a) {
        b
    } else {
        a
    }
}

fn integer_rank(kind: PrimitiveKind) -> u8 {
    match kind {
        PrimitiveKind::SByte | PrimitiveKind::Byte => 1,
        PrimitiveKind::Int16 => 2,
        PrimitiveKind::Int32 => 3,
        _ => 4,
    }
}

/// Narrow an integer result back into the target kind when it fits; results
/// that overflow the target widen to Int64 instead of losing exactness
pub(crate) fn integer_result(target: PrimitiveKind, value: i64) -> EdmValue {
    match target {
        PrimitiveKind::SByte => i8::try_from(value)
            .map(EdmValue::SByte)
            .unwrap_or(EdmValue::Int64(value)),
        PrimitiveKind::Byte => u8::try_from(value)
            .map(EdmValue::Byte)
            .unwrap_or(EdmValue::Int64(value)),
        PrimitiveKind::Int16 => i16::try_from(value)
            .map(EdmValue::Int16)
            .unwrap_or(EdmValue::Int64(value)),
        PrimitiveKind::Int32 => i32::try_from(value)
            .map(EdmValue::Int32)
            .unwrap_or(EdmValue::Int64(value)),
        _ => EdmValue::Int64(value),
    }
}
