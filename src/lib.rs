//! Property Container SDK - Typed property containers with self-describing JSON
//!
//! Provides unified interfaces for:
//! - Type aliases and the registry that resolves them
//! - Property containers (mutable and immutable) with schema validation
//! - Compact schema encoding embedded in JSON documents
//! - JSON reading/writing with schema precedence and inference
//! - XML inference, OpenAPI export and value formatting
//!
//! # Example
//!
//! ```rust
//! use property_container::json::{ContainerJsonReader, ContainerJsonWriter};
//! use property_container::models::{ContainerView, Property, PropertyContainer, Value};
//! use property_container::types::TypeTag;
//!
//! let mut person = PropertyContainer::new();
//! person.set(Property::new("Age", TypeTag::Int), Value::Int(36)).unwrap();
//! person
//!     .set(
//!         Property::new("Tags", TypeTag::array_of(TypeTag::String)),
//!         Value::Array(vec!["math".into(), "engines".into()]),
//!     )
//!     .unwrap();
//!
//! let json = ContainerJsonWriter::with_defaults().to_string(&person).unwrap();
//! assert!(json.contains(r#"["Age@type=int","Tags@type=string[]"]"#));
//!
//! let back = ContainerJsonReader::with_defaults().read_str(&json).unwrap();
//! assert_eq!(back, person);
//! ```

pub mod codec;
#[cfg(feature = "config")]
pub mod config;
pub mod export;
pub mod format;
pub mod json;
pub mod models;
pub mod types;
pub mod validation;
#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use codec::{CompactSchemaCodec, FailurePolicy, NamingPolicy, SchemaError, SchemaRepository};
#[cfg(feature = "config")]
pub use config::{ConfigError, SerializerConfig};
pub use export::{ExportError, ExportResult, OpenApiSchemaExporter};
pub use format::{FormatterChain, ValueFormatter};
pub use json::{
    ContainerJsonOptions, ContainerJsonReader, ContainerJsonWriter, ContainerShape,
    DecodedContainer, JsonError,
};
pub use models::{
    ContainerError, ContainerView, ImmutableContainer, Property, PropertyContainer, Schema, Value,
};
pub use types::{TypeRegistry, TypeTag};
pub use validation::ValidationError;
#[cfg(feature = "xml")]
pub use xml::{XmlContainerParser, XmlError};
