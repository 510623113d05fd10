//! Error types for filter-expression evaluation
//!
//! Every failure is terminal for the expression node being evaluated and
//! propagates to the caller unchanged; there is no local recovery and no
//! defaulting to null.

use thiserror::Error;

/// Result type alias for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur while evaluating a filter expression node
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The expression uses a construct this evaluator intentionally does not
    /// support (lambdas, lambda-variable references, type literals,
    /// multi-segment function paths).
    #[error("not implemented: {feature}")]
    NotImplemented {
        /// Description of the unsupported construct
        feature: String,
    },

    /// An operand's kind is incompatible with the requested operator or
    /// method: wrong arity, wrong primitive kind, unknown enum member,
    /// malformed member path.
    #[error("type error: {message}")]
    TypeError {
        /// Human-readable error message
        message: String,
    },

    /// Operands are individually well-typed but no coercion or operation is
    /// defined for the combination.
    #[error("unsupported operation: {message}")]
    UnsupportedOperation {
        /// Human-readable error message
        message: String,
    },

    /// A numeric operation is well-typed but cannot produce a result, such
    /// as division by zero in an exact numeric kind.
    #[error("arithmetic error: {message}")]
    ArithmeticError {
        /// Human-readable error message
        message: String,
    },
}

impl EvaluationError {
    /// Create a not-implemented error
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Create an arithmetic error
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::ArithmeticError {
            message: message.into(),
        }
    }
}
