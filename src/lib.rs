//! Typed evaluation of OData `$filter`/`$orderby` expression trees
//!
//! This crate walks an already-parsed filter expression bottom-up and
//! produces typed values by evaluating literals, entity-property references,
//! unary/binary operators, and a fixed catalog of built-in methods against a
//! single in-memory entity described by an EDM-like schema.
//!
//! # Example
//!
//! ```
//! use odata_filter_eval::ast::{BinaryOperatorKind, Expression};
//! use odata_filter_eval::evaluator::ExpressionVisitor;
//! use odata_filter_eval::model::{EdmSchema, EdmType, EdmValue, Entity, Property};
//!
//! let entity = Entity::new().with_property(Property::new(
//!     "Age",
//!     EdmType::int32(),
//!     EdmValue::Int32(17),
//! ));
//! let schema = EdmSchema::new();
//!
//! // Age ge 18
//! let expression = Expression::binary(
//!     BinaryOperatorKind::Ge,
//!     Expression::member("Age"),
//!     Expression::literal("18"),
//! );
//!
//! let visitor = ExpressionVisitor::new(&entity, &schema);
//! let result = visitor.evaluate(&expression).unwrap();
//! assert_eq!(result.into_typed().value, EdmValue::Boolean(false));
//! ```
//!
//! Evaluation is synchronous and free of shared mutable state; a visitor is
//! built per request and discarded afterwards. Lambda expressions,
//! lambda-variable references, and type literals are rejected as
//! not-implemented by design.

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod model;

pub use ast::{
    BinaryOperatorKind, Expression, FunctionParameter, MemberPath, MethodKind, PathSegment,
    UnaryOperatorKind,
};
pub use error::{EvaluationError, EvaluationResult};
pub use evaluator::operand::{Operand, TypedOperand, UntypedOperand};
pub use evaluator::ExpressionVisitor;
pub use model::{
    ComplexValue, DataProvider, EdmEnumType, EdmFunction, EdmSchema, EdmType, EdmValue, Entity,
    PrimitiveKind, Property,
};
