//! Expression dispatcher, member/path resolver, and tree walk
//!
//! [`ExpressionVisitor`] is constructed fresh per evaluation request with an
//! immutable view of one entity, one schema handle, and the alias bindings of
//! the surrounding query. It retains no state across visits, performs no
//! I/O of its own (only the data provider may block), and is safe to run
//! concurrently with other independent evaluations.

pub mod binary;
pub mod coercion;
pub mod methods;
pub mod operand;
pub mod unary;

use std::collections::HashMap;

use log::{debug, trace};

use crate::ast::{
    BinaryOperatorKind, Expression, FunctionParameter, MemberPath, MethodKind, PathSegment,
    UnaryOperatorKind,
};
use crate::error::{EvaluationError, EvaluationResult};
use crate::model::{DataProvider, EdmSchema, EdmType, EdmValue, Entity, Property};

use binary::BinaryOperator;
use methods::MethodCallOperator;
use operand::Operand;
use unary::UnaryOperator;

/// Evaluates filter-expression nodes against one entity
///
/// The dispatcher receives each node together with its already-evaluated
/// child operands and routes it to the operator library; [`Self::evaluate`]
/// is the bundled bottom-up walk that supplies those children. Both children
/// of `and`/`or` are evaluated unconditionally before the operator runs.
pub struct ExpressionVisitor<'a> {
    entity: &'a Entity,
    schema: &'a EdmSchema,
    provider: Option<&'a dyn DataProvider>,
    aliases: HashMap<String, String>,
}

impl<'a> ExpressionVisitor<'a> {
    /// Create a visitor for one entity and schema
    pub fn new(entity: &'a Entity, schema: &'a EdmSchema) -> Self {
        Self {
            entity,
            schema,
            provider: None,
            aliases: HashMap::new(),
        }
    }

    /// Attach a data provider for function-call member references
    pub fn with_provider(mut self, provider: &'a dyn DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Bind a query alias to its literal text
    pub fn with_alias(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), text.into());
        self
    }

    /// Evaluate a whole expression tree bottom-up
    pub fn evaluate(&self, expression: &Expression) -> EvaluationResult<Operand> {
        trace!("evaluating node: {expression:?}");
        match expression {
            Expression::Literal(text) => Ok(self.visit_literal(text)),
            Expression::Member(path) => self.visit_member(path),
            Expression::Alias(name) => self.visit_alias(name),
            Expression::Enum { enum_type, members } => self.visit_enum(enum_type, members),
            Expression::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                self.visit_unary_operator(*op, operand)
            }
            Expression::Binary { op, left, right } => {
                // Both sides are evaluated before the operator runs, even for
                // and/or. Short-circuiting here would change which failures
                // surface.
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.visit_binary_operator(*op, left, right)
            }
            Expression::Method { method, parameters } => {
                let parameters = parameters
                    .iter()
                    .map(|p| self.evaluate(p))
                    .collect::<EvaluationResult<Vec<_>>>()?;
                self.visit_method_call(*method, parameters)
            }
            Expression::Lambda {
                function,
                variable,
                expression,
            } => self.visit_lambda_expression(function, variable, expression),
            Expression::LambdaReference(name) => self.visit_lambda_reference(name),
            Expression::TypeLiteral(name) => self.visit_type_literal(name),
        }
    }

    /// Route a binary operator node to its handler
    pub fn visit_binary_operator(
        &self,
        op: BinaryOperatorKind,
        left: Operand,
        right: Operand,
    ) -> EvaluationResult<Operand> {
        let operator = BinaryOperator::new(left, right);
        match op {
            BinaryOperatorKind::And => operator.and(),
            BinaryOperatorKind::Or => operator.or(),
            BinaryOperatorKind::Eq => operator.equals(),
            BinaryOperatorKind::Ne => operator.not_equals(),
            BinaryOperatorKind::Ge => operator.greater_equals(),
            BinaryOperatorKind::Gt => operator.greater_than(),
            BinaryOperatorKind::Le => operator.less_equals(),
            BinaryOperatorKind::Lt => operator.less_than(),
            BinaryOperatorKind::Add
            | BinaryOperatorKind::Sub
            | BinaryOperatorKind::Mul
            | BinaryOperatorKind::Div
            | BinaryOperatorKind::Mod => operator.arithmetic(op),
            BinaryOperatorKind::Has => operator.has(),
        }
    }

    /// Route a unary operator node to its handler
    pub fn visit_unary_operator(
        &self,
        op: UnaryOperatorKind,
        operand: Operand,
    ) -> EvaluationResult<Operand> {
        let operator = UnaryOperator::new(operand);
        match op {
            UnaryOperatorKind::Minus => operator.minus(),
            UnaryOperatorKind::Not => operator.not(),
        }
    }

    /// Route a method-call node to its handler
    pub fn visit_method_call(
        &self,
        method: MethodKind,
        parameters: Vec<Operand>,
    ) -> EvaluationResult<Operand> {
        let call = MethodCallOperator::new(parameters);
        match method {
            MethodKind::StartsWith => call.starts_with(),
            MethodKind::EndsWith => call.ends_with(),
            MethodKind::Contains => call.contains(),
            MethodKind::IndexOf => call.index_of(),
            MethodKind::Length => call.length(),
            MethodKind::ToLower => call.to_lower(),
            MethodKind::ToUpper => call.to_upper(),
            MethodKind::Trim => call.trim(),
            MethodKind::Substring => call.substring(),
            MethodKind::Concat => call.concat(),
            MethodKind::Year => call.year(),
            MethodKind::Month => call.month(),
            MethodKind::Day => call.day(),
            MethodKind::Hour => call.hour(),
            MethodKind::Minute => call.minute(),
            MethodKind::Second => call.second(),
            MethodKind::FractionalSeconds => call.fractionalseconds(),
            MethodKind::Round => call.round(),
            MethodKind::Floor => call.floor(),
            MethodKind::Ceiling => call.ceiling(),
        }
    }

    /// Wrap a literal token as an untyped operand; its type is inferred the
    /// first time it participates in a typed operation
    pub fn visit_literal(&self, text: &str) -> Operand {
        Operand::untyped(text)
    }

    /// Resolve a member path against the current entity, or a function-call
    /// member against the data provider
    pub fn visit_member(&self, path: &MemberPath) -> EvaluationResult<Operand> {
        let first = path.segments.first().ok_or_else(|| {
            EvaluationError::type_error("member path must contain at least one segment")
        })?;

        match first {
            PathSegment::Property(name) => self.resolve_property_path(name, &path.segments[1..]),
            PathSegment::Function { name, parameters } => {
                if path.segments.len() > 1 {
                    return Err(EvaluationError::not_implemented(
                        "member path continuing past a function call",
                    ));
                }
                self.resolve_function(name, parameters)
            }
        }
    }

    fn resolve_property_path(
        &self,
        first: &str,
        rest: &[PathSegment],
    ) -> EvaluationResult<Operand> {
        let mut current: &Property = self.entity.property(first).ok_or_else(|| {
            EvaluationError::type_error(format!("property '{first}' not found on entity"))
        })?;

        for segment in rest {
            let name = match segment {
                PathSegment::Property(name) => name,
                PathSegment::Function { name, .. } => {
                    return Err(EvaluationError::not_implemented(format!(
                        "function call '{name}' inside a member path"
                    )))
                }
            };
            current = match &current.value {
                EdmValue::Complex(complex) => complex.property(name).ok_or_else(|| {
                    EvaluationError::type_error(format!(
                        "property '{}' has no child property '{name}'",
                        current.name
                    ))
                })?,
                _ => {
                    return Err(EvaluationError::type_error(format!(
                        "property '{}' is not complex, cannot navigate to '{name}'",
                        current.name
                    )))
                }
            };
        }

        debug!("member path resolved to property '{}'", current.name);
        Ok(Operand::typed_from_property(
            current.value.clone(),
            current.edm_type.clone(),
            current.clone(),
        ))
    }

    fn resolve_function(
        &self,
        name: &str,
        parameters: &[FunctionParameter],
    ) -> EvaluationResult<Operand> {
        let function = self.schema.function(name).ok_or_else(|| {
            EvaluationError::type_error(format!("function '{name}' not found in schema"))
        })?;
        let provider = self.provider.ok_or_else(|| {
            EvaluationError::unsupported(format!(
                "no data provider bound, cannot invoke function '{name}'"
            ))
        })?;

        debug!("invoking function '{name}' via data provider");
        let value = match &function.return_type {
            EdmType::Entity(_) if function.returns_collection => {
                let entities = provider.read_function_entity_collection(function, parameters)?;
                EdmValue::Collection(
                    entities
                        .into_iter()
                        .map(|e| EdmValue::Complex(e.into()))
                        .collect(),
                )
            }
            EdmType::Entity(_) => {
                let entity = provider.read_function_entity(function, parameters)?;
                EdmValue::Complex(entity.into())
            }
            _ => provider.read_function_primitive_complex(function, parameters)?,
        };

        Ok(Operand::typed(value, function.return_type.clone()))
    }

    /// Resolve a query alias to its bound literal text
    pub fn visit_alias(&self, name: &str) -> EvaluationResult<Operand> {
        self.aliases
            .get(name)
            .map(|text| Operand::untyped(text.clone()))
            .ok_or_else(|| EvaluationError::type_error(format!("alias '{name}' is not bound")))
    }

    /// Combine an enum literal list into its underlying value with bitwise OR
    pub fn visit_enum(&self, enum_type: &str, members: &[String]) -> EvaluationResult<Operand> {
        let declared = self.schema.enum_type(enum_type).ok_or_else(|| {
            EvaluationError::type_error(format!("enum type '{enum_type}' not found in schema"))
        })?;

        let mut combined: Option<i64> = None;
        for member in members {
            let bits = declared.value_of(member).ok_or_else(|| {
                EvaluationError::type_error(format!(
                    "'{member}' is not a member of enum type '{enum_type}'"
                ))
            })?;
            combined = Some(combined.unwrap_or(0) | bits);
        }
        debug!("enum literal {enum_type}{members:?} combined to {combined:?}");

        let value = match combined {
            Some(bits) => EdmValue::Enum {
                type_name: declared.name.clone(),
                value: bits,
            },
            None => EdmValue::Null,
        };
        Ok(Operand::typed(value, EdmType::Enum(declared.clone())))
    }

    /// Lambda expressions (`any`/`all`) are rejected by design
    pub fn visit_lambda_expression(
        &self,
        function: &str,
        _variable: &str,
        _expression: &Expression,
    ) -> EvaluationResult<Operand> {
        Err(EvaluationError::not_implemented(format!(
            "lambda expression '{function}'"
        )))
    }

    /// Lambda-variable references are rejected by design
    pub fn visit_lambda_reference(&self, name: &str) -> EvaluationResult<Operand> {
        Err(EvaluationError::not_implemented(format!(
            "lambda variable reference '{name}'"
        )))
    }

    /// Type literals are rejected by design
    pub fn visit_type_literal(&self, name: &str) -> EvaluationResult<Operand> {
        Err(EvaluationError::not_implemented(format!("type literal '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdmEnumType, EdmSchema, PrimitiveKind};
    use pretty_assertions::assert_eq;

    fn entity() -> Entity {
        Entity::new().with_property(Property::new(
            "Age",
            EdmType::Primitive(PrimitiveKind::Int32),
            EdmValue::Int32(17),
        ))
    }

    #[test]
    fn literal_nodes_stay_untyped_until_used() {
        let entity = entity();
        let schema = EdmSchema::new();
        let visitor = ExpressionVisitor::new(&entity, &schema);
        let operand = visitor.visit_literal("42");
        assert_eq!(operand, Operand::untyped("42"));
    }

    #[test]
    fn alias_resolution_is_strict() {
        let entity = entity();
        let schema = EdmSchema::new();
        let visitor = ExpressionVisitor::new(&entity, &schema).with_alias("@min", "18");

        assert_eq!(visitor.visit_alias("@min").unwrap(), Operand::untyped("18"));
        assert!(matches!(
            visitor.visit_alias("@unknown").unwrap_err(),
            EvaluationError::TypeError { .. }
        ));
    }

    #[test]
    fn enum_literals_fold_with_bitwise_or() {
        let entity = entity();
        let schema = EdmSchema::new().with_enum(
            EdmEnumType::new("Color")
                .with_member("Red", 1)
                .with_member("Green", 2)
                .with_member("Blue", 4),
        );
        let visitor = ExpressionVisitor::new(&entity, &schema);

        let operand = visitor
            .visit_enum("Color", &["Red".into(), "Blue".into()])
            .unwrap();
        assert_eq!(
            operand.into_typed().value,
            EdmValue::Enum {
                type_name: "Color".into(),
                value: 5
            }
        );
    }

    #[test]
    fn unknown_enum_member_is_a_type_error() {
        let entity = entity();
        let schema = EdmSchema::new().with_enum(EdmEnumType::new("Color").with_member("Red", 1));
        let visitor = ExpressionVisitor::new(&entity, &schema);

        assert!(matches!(
            visitor.visit_enum("Color", &["Magenta".into()]).unwrap_err(),
            EvaluationError::TypeError { .. }
        ));
        assert!(matches!(
            visitor.visit_enum("Size", &["Red".into()]).unwrap_err(),
            EvaluationError::TypeError { .. }
        ));
    }

    #[test]
    fn lambda_constructs_are_not_implemented() {
        let entity = entity();
        let schema = EdmSchema::new();
        let visitor = ExpressionVisitor::new(&entity, &schema);

        assert!(matches!(
            visitor.visit_lambda_reference("x").unwrap_err(),
            EvaluationError::NotImplemented { .. }
        ));
        assert!(matches!(
            visitor.visit_type_literal("Edm.Int32").unwrap_err(),
            EvaluationError::NotImplemented { .. }
        ));
    }
}
