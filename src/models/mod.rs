//! Models module for the SDK
//!
//! Defines the property container data model: properties, schemas, values and
//! the two container shapes (mutable and immutable).

pub mod container;
pub mod property;
pub mod schema;
pub mod value;

pub use container::{
    ContainerParts, ContainerView, ImmutableContainer, PropertyContainer, PropertyValue,
    SearchMode,
};
pub use property::Property;
pub use schema::Schema;
pub use value::{Decimal, Value};

/// Error raised when a value does not fit its property
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContainerError {
    #[error("Type mismatch for property '{property}': expected {expected}, got {actual}")]
    TypeMismatch {
        property: String,
        expected: String,
        actual: String,
    },
    #[error("Property '{0}' is not nullable")]
    NullNotAllowed(String),
    #[error("Value '{value}' is not allowed for property '{property}'")]
    ValueNotAllowed { property: String, value: String },
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),
}
