//! Data-provider boundary for function-call member references
//!
//! Function references embedded in filter expressions resolve against an
//! external store. The evaluator only chooses the invocation shape from the
//! function's declared return shape; storage and concurrency are the
//! provider's concern.

use crate::ast::FunctionParameter;
use crate::error::EvaluationResult;

use super::entity::Entity;
use super::schema::EdmFunction;
use super::value::EdmValue;

/// Resolves schema-level function invocations embedded in filter expressions
pub trait DataProvider {
    /// Invoke a function declared to return a single entity
    fn read_function_entity(
        &self,
        function: &EdmFunction,
        parameters: &[FunctionParameter],
    ) -> EvaluationResult<Entity>;

    /// Invoke a function declared to return an entity collection
    fn read_function_entity_collection(
        &self,
        function: &EdmFunction,
        parameters: &[FunctionParameter],
    ) -> EvaluationResult<Vec<Entity>>;

    /// Invoke a function declared to return a primitive or complex value
    fn read_function_primitive_complex(
        &self,
        function: &EdmFunction,
        parameters: &[FunctionParameter],
    ) -> EvaluationResult<EdmValue>;
}
