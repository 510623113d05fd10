//! Expression tree consumed by the evaluator
//!
//! The evaluator does not parse `$filter` text itself; it receives an
//! already-parsed tree of these nodes from the surrounding query layer and
//! evaluates it bottom-up against a single entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operator kinds of the filter expression language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorKind {
    /// Logical and (`and`)
    And,
    /// Logical or (`or`)
    Or,
    /// Equality (`eq`)
    Eq,
    /// Inequality (`ne`)
    Ne,
    /// Greater than or equal (`ge`)
    Ge,
    /// Greater than (`gt`)
    Gt,
    /// Less than or equal (`le`)
    Le,
    /// Less than (`lt`)
    Lt,
    /// Addition (`add`)
    Add,
    /// Subtraction (`sub`)
    Sub,
    /// Multiplication (`mul`)
    Mul,
    /// Division (`div`)
    Div,
    /// Modulo (`mod`)
    Mod,
    /// Enum flag containment (`has`)
    Has,
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Ge => "ge",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Lt => "lt",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Has => "has",
        };
        write!(f, "{symbol}")
    }
}

/// Unary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperatorKind {
    /// Numeric negation (`-`)
    Minus,
    /// Boolean negation (`not`)
    Not,
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minus => write!(f, "-"),
            Self::Not => write!(f, "not"),
        }
    }
}

/// Built-in method kinds of the filter expression language
///
/// The catalog is closed: dispatch over this enum is an exhaustive match, so
/// adding a kind without a handler fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    /// `startswith(string, string)`
    StartsWith,
    /// `endswith(string, string)`
    EndsWith,
    /// `contains(string, string)`
    Contains,
    /// `indexof(string, string)`
    IndexOf,
    /// `length(string)`
    Length,
    /// `tolower(string)`
    ToLower,
    /// `toupper(string)`
    ToUpper,
    /// `trim(string)`
    Trim,
    /// `substring(string, int [, int])`
    Substring,
    /// `concat(string, string)`
    Concat,
    /// `year(datetime)`
    Year,
    /// `month(datetime)`
    Month,
    /// `day(datetime)`
    Day,
    /// `hour(datetime)`
    Hour,
    /// `minute(datetime)`
    Minute,
    /// `second(datetime)`
    Second,
    /// `fractionalseconds(datetime)`
    FractionalSeconds,
    /// `round(numeric)`, half away from zero
    Round,
    /// `floor(numeric)`
    Floor,
    /// `ceiling(numeric)`
    Ceiling,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Contains => "contains",
            Self::IndexOf => "indexof",
            Self::Length => "length",
            Self::ToLower => "tolower",
            Self::ToUpper => "toupper",
            Self::Trim => "trim",
            Self::Substring => "substring",
            Self::Concat => "concat",
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::FractionalSeconds => "fractionalseconds",
            Self::Round => "round",
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
        };
        write!(f, "{name}")
    }
}

/// A bound parameter of a function-call member reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    /// Parameter name as declared by the function
    pub name: String,
    /// Literal text of the bound argument
    pub text: String,
}

impl FunctionParameter {
    /// Create a new bound parameter
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// One segment of a member-reference path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSegment {
    /// A property-name segment
    Property(String),
    /// A schema-level function invocation with bound parameters
    Function {
        /// Function name as registered in the schema
        name: String,
        /// Bound parameters, in declaration order
        parameters: Vec<FunctionParameter>,
    },
}

/// A member-reference path: a sequence of segments navigating from the
/// current entity (or a function result) to a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPath {
    /// Path segments, outermost first
    pub segments: Vec<PathSegment>,
}

impl MemberPath {
    /// A single-segment property path
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Property(name.into())],
        }
    }

    /// A multi-segment property path
    pub fn properties<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: names
                .into_iter()
                .map(|n| PathSegment::Property(n.into()))
                .collect(),
        }
    }

    /// A single-segment function-call path
    pub fn function(name: impl Into<String>, parameters: Vec<FunctionParameter>) -> Self {
        Self {
            segments: vec![PathSegment::Function {
                name: name.into(),
                parameters,
            }],
        }
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match segment {
                PathSegment::Property(name) => write!(f, "{name}")?,
                PathSegment::Function { name, .. } => write!(f, "{name}(...)")?,
            }
        }
        Ok(())
    }
}

/// A parsed filter-expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A literal token, still in its lexical form (`2`, `3.5`, `'Milk'`,
    /// `true`, `null`, `2024-05-01T10:00:00Z`)
    Literal(String),
    /// A member-reference path rooted at the current entity
    Member(MemberPath),
    /// A reference to a query alias (`@name`)
    Alias(String),
    /// An enum literal list, e.g. `Color'Red,Blue'`
    Enum {
        /// Name of the enum type in the schema
        enum_type: String,
        /// Member names, in written order
        members: Vec<String>,
    },
    /// A unary operator applied to one child
    Unary {
        /// Operator kind
        op: UnaryOperatorKind,
        /// Operand expression
        operand: Box<Expression>,
    },
    /// A binary operator applied to two children
    Binary {
        /// Operator kind
        op: BinaryOperatorKind,
        /// Left operand expression
        left: Box<Expression>,
        /// Right operand expression
        right: Box<Expression>,
    },
    /// A built-in method call
    Method {
        /// Method kind
        method: MethodKind,
        /// Argument expressions, in written order
        parameters: Vec<Expression>,
    },
    /// A lambda expression (`any`/`all`); rejected as not implemented
    Lambda {
        /// Lambda function name
        function: String,
        /// Lambda variable name
        variable: String,
        /// Lambda body
        expression: Box<Expression>,
    },
    /// A lambda-variable reference; rejected as not implemented
    LambdaReference(String),
    /// A type literal; rejected as not implemented
    TypeLiteral(String),
}

impl Expression {
    /// Shorthand for a literal node
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Shorthand for a single-property member node
    pub fn member(name: impl Into<String>) -> Self {
        Self::Member(MemberPath::property(name))
    }

    /// Shorthand for a binary node
    pub fn binary(op: BinaryOperatorKind, left: Expression, right: Expression) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Shorthand for a unary node
    pub fn unary(op: UnaryOperatorKind, operand: Expression) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Shorthand for a method-call node
    pub fn method(method: MethodKind, parameters: Vec<Expression>) -> Self {
        Self::Method { method, parameters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_display_matches_filter_syntax() {
        assert_eq!(BinaryOperatorKind::Ge.to_string(), "ge");
        assert_eq!(BinaryOperatorKind::Has.to_string(), "has");
        assert_eq!(UnaryOperatorKind::Not.to_string(), "not");
        assert_eq!(MethodKind::FractionalSeconds.to_string(), "fractionalseconds");
    }

    #[test]
    fn member_path_display_joins_segments() {
        let path = MemberPath::properties(["Address", "City"]);
        assert_eq!(path.to_string(), "Address/City");
    }
}
