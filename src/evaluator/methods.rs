//! Built-in method implementations
//!
//! Each method validates its argument count, then its argument kinds, and
//! only then executes. String indices are in characters, not bytes, and
//! `substring` clamps out-of-range start/length values instead of failing.

use chrono::{Datelike, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::ast::MethodKind;
use crate::error::{EvaluationError, EvaluationResult};
use crate::model::{EdmType, EdmValue};

use super::coercion::parse_datetime;
use super::operand::{Operand, TypedOperand};

/// A built-in method call over already-evaluated argument operands
pub struct MethodCallOperator {
    parameters: Vec<TypedOperand>,
}

impl MethodCallOperator {
    /// Resolve all arguments, inferring types of raw literals
    pub fn new(parameters: Vec<Operand>) -> Self {
        Self {
            parameters: parameters.into_iter().map(Operand::into_typed).collect(),
        }
    }

    /// `startswith(string, string)`; every string starts with the empty string
    pub fn starts_with(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::StartsWith, 2, 2)?;
        let s = self.string_arg(0, MethodKind::StartsWith)?;
        let prefix = self.string_arg(1, MethodKind::StartsWith)?;
        Ok(boolean_result(s.starts_with(&prefix)))
    }

    /// `endswith(string, string)`
    pub fn ends_with(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::EndsWith, 2, 2)?;
        let s = self.string_arg(0, MethodKind::EndsWith)?;
        let suffix = self.string_arg(1, MethodKind::EndsWith)?;
        Ok(boolean_result(s.ends_with(&suffix)))
    }

    /// `contains(string, string)`
    pub fn contains(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::Contains, 2, 2)?;
        let s = self.string_arg(0, MethodKind::Contains)?;
        let needle = self.string_arg(1, MethodKind::Contains)?;
        Ok(boolean_result(s.contains(&needle)))
    }

    /// `indexof(string, string)`: character index of the first match, -1
    /// when absent
    pub fn index_of(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::IndexOf, 2, 2)?;
        let s = self.string_arg(0, MethodKind::IndexOf)?;
        let needle = self.string_arg(1, MethodKind::IndexOf)?;
        let index = match s.find(&needle) {
            Some(byte_index) => s[..byte_index].chars().count() as i32,
            None => -1,
        };
        Ok(int32_result(index))
    }

    /// `length(string)`: length in characters
    pub fn length(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::Length, 1, 1)?;
        let s = self.string_arg(0, MethodKind::Length)?;
        Ok(int32_result(s.chars().count() as i32))
    }

    /// `tolower(string)`
    pub fn to_lower(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::ToLower, 1, 1)?;
        let s = self.string_arg(0, MethodKind::ToLower)?;
        Ok(string_result(s.to_lowercase()))
    }

    /// `toupper(string)`
    pub fn to_upper(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::ToUpper, 1, 1)?;
        let s = self.string_arg(0, MethodKind::ToUpper)?;
        Ok(string_result(s.to_uppercase()))
    }

    /// `trim(string)`
    pub fn trim(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::Trim, 1, 1)?;
        let s = self.string_arg(0, MethodKind::Trim)?;
        Ok(string_result(s.trim().to_string()))
    }

    /// `substring(string, start [, length])`: out-of-range start and length
    /// clamp rather than erroring
    pub fn substring(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::Substring, 2, 3)?;
        let s = self.string_arg(0, MethodKind::Substring)?;
        let chars: Vec<char> = s.chars().collect();
        let total = chars.len() as i64;

        let start = self.integer_arg(1, MethodKind::Substring)?.clamp(0, total) as usize;
        let end = match self.parameters.len() {
            3 => {
                let length = self
                    .integer_arg(2, MethodKind::Substring)?
                    .clamp(0, total - start as i64);
                start + length as usize
            }
            _ => chars.len(),
        };

        Ok(string_result(chars[start..end].iter().collect()))
    }

    /// `concat(string, string)`
    pub fn concat(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::Concat, 2, 2)?;
        let a = self.string_arg(0, MethodKind::Concat)?;
        let b = self.string_arg(1, MethodKind::Concat)?;
        Ok(string_result(format!("{a}{b}")))
    }

    /// `year(datetime)`
    pub fn year(&self) -> EvaluationResult<Operand> {
        self.datetime_component(MethodKind::Year, |dt| dt.year())
    }

    /// `month(datetime)`
    pub fn month(&self) -> EvaluationResult<Operand> {
        self.datetime_component(MethodKind::Month, |dt| dt.month() as i32)
    }

    /// `day(datetime)`
    pub fn day(&self) -> EvaluationResult<Operand> {
        self.datetime_component(MethodKind::Day, |dt| dt.day() as i32)
    }

    /// `hour(datetime)`
    pub fn hour(&self) -> EvaluationResult<Operand> {
        self.datetime_component(MethodKind::Hour, |dt| dt.hour() as i32)
    }

    /// `minute(datetime)`
    pub fn minute(&self) -> EvaluationResult<Operand> {
        self.datetime_component(MethodKind::Minute, |dt| dt.minute() as i32)
    }

    /// `second(datetime)`
    pub fn second(&self) -> EvaluationResult<Operand> {
        self.datetime_component(MethodKind::Second, |dt| dt.second() as i32)
    }

    /// `fractionalseconds(datetime)`: the sub-second part as a decimal
    pub fn fractionalseconds(&self) -> EvaluationResult<Operand> {
        self.require_args(MethodKind::FractionalSeconds, 1, 1)?;
        let dt = self.datetime_arg(0, MethodKind::FractionalSeconds)?;
        let fraction = Decimal::new(i64::from(dt.nanosecond()), 9).normalize();
        Ok(Operand::typed(EdmValue::Decimal(fraction), EdmType::decimal()))
    }

    /// `round(numeric)`: half away from zero; identity on integer kinds
    pub fn round(&self) -> EvaluationResult<Operand> {
        self.rounding(MethodKind::Round, |d| {
            d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }, f64::round)
    }

    /// `floor(numeric)`
    pub fn floor(&self) -> EvaluationResult<Operand> {
        self.rounding(MethodKind::Floor, Decimal::floor, f64::floor)
    }

    /// `ceiling(numeric)`
    pub fn ceiling(&self) -> EvaluationResult<Operand> {
        self.rounding(MethodKind::Ceiling, Decimal::ceil, f64::ceil)
    }

    fn rounding(
        &self,
        method: MethodKind,
        decimal_op: impl Fn(&Decimal) -> Decimal,
        double_op: impl Fn(f64) -> f64,
    ) -> EvaluationResult<Operand> {
        self.require_args(method, 1, 1)?;
        let operand = &self.parameters[0];
        match &operand.value {
            EdmValue::SByte(_)
            | EdmValue::Byte(_)
            | EdmValue::Int16(_)
            | EdmValue::Int32(_)
            | EdmValue::Int64(_) => Ok(Operand::typed(operand.value.clone(), operand.edm_type.clone())),
            EdmValue::Decimal(d) => Ok(Operand::typed(EdmValue::Decimal(decimal_op(d)), EdmType::decimal())),
            EdmValue::Double(f) => Ok(Operand::typed(EdmValue::Double(double_op(*f)), EdmType::double())),
            other => Err(kind_mismatch(method, "a numeric", other)),
        }
    }

    fn datetime_component(
        &self,
        method: MethodKind,
        component: impl Fn(&chrono::DateTime<chrono::FixedOffset>) -> i32,
    ) -> EvaluationResult<Operand> {
        self.require_args(method, 1, 1)?;
        let dt = self.datetime_arg(0, method)?;
        Ok(int32_result(component(&dt)))
    }

    fn require_args(&self, method: MethodKind, min: usize, max: usize) -> EvaluationResult<()> {
        let count = self.parameters.len();
        if count < min || count > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} or {max}")
            };
            return Err(EvaluationError::type_error(format!(
                "'{method}' expects {expected} argument(s), got {count}"
            )));
        }
        Ok(())
    }

    fn string_arg(&self, index: usize, method: MethodKind) -> EvaluationResult<String> {
        match &self.parameters[index].value {
            EdmValue::String(s) => Ok(s.clone()),
            other => Err(kind_mismatch(method, "a string", other)),
        }
    }

    fn integer_arg(&self, index: usize, method: MethodKind) -> EvaluationResult<i64> {
        match self.parameters[index].value {
            EdmValue::SByte(v) => Ok(i64::from(v)),
            EdmValue::Byte(v) => Ok(i64::from(v)),
            EdmValue::Int16(v) => Ok(i64::from(v)),
            EdmValue::Int32(v) => Ok(i64::from(v)),
            EdmValue::Int64(v) => Ok(v),
            ref other => Err(kind_mismatch(method, "an integer", other)),
        }
    }

    fn datetime_arg(
        &self,
        index: usize,
        method: MethodKind,
    ) -> EvaluationResult<chrono::DateTime<chrono::FixedOffset>> {
        match &self.parameters[index].value {
            EdmValue::DateTime(dt) => Ok(*dt),
            EdmValue::String(s) => parse_datetime(s),
            other => Err(kind_mismatch(method, "a date/time", other)),
        }
    }
}

fn kind_mismatch(method: MethodKind, expected: &str, actual: &EdmValue) -> EvaluationError {
    EvaluationError::unsupported(format!(
        "'{method}' requires {expected} argument, got {}",
        actual.kind_name()
    ))
}

fn boolean_result(value: bool) -> Operand {
    Operand::typed(EdmValue::Boolean(value), EdmType::boolean())
}

fn int32_result(value: i32) -> Operand {
    Operand::typed(EdmValue::Int32(value), EdmType::int32())
}

fn string_result(value: String) -> Operand {
    Operand::typed(EdmValue::String(value), EdmType::string())
}
