//! Entity, value, and schema model shared by the whole evaluator

pub mod entity;
pub mod provider;
pub mod schema;
pub mod value;

pub use entity::{ComplexValue, Entity, Property};
pub use provider::DataProvider;
pub use schema::{EdmEnumType, EdmFunction, EdmSchema, EdmType, PrimitiveKind};
pub use value::EdmValue;
