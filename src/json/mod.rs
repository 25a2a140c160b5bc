//! JSON serialization of property containers
//!
//! A container is written as a flat JSON object, optionally preceded by its
//! compact schema:
//!
//! ```json
//! {
//!   "$metadata.schema.compact": ["Age@type=int", "Born@type=LocalDate"],
//!   "Age": 36,
//!   "Born": "1988-02-11"
//! }
//! ```
//!
//! Reading uses, in order of precedence, a known schema supplied by the
//! caller, the inline compact schema, the legacy positional type list, and
//! finally inference from the JSON tokens.

pub mod formatter;
pub mod options;
pub mod reader;
pub mod repository;
pub mod shape;
pub mod writer;

pub use formatter::CompactArrayFormatter;
pub use options::ContainerJsonOptions;
pub use reader::ContainerJsonReader;
pub use shape::{ContainerFactory, ContainerShape, CustomShape, DecodedContainer};
pub use writer::ContainerJsonWriter;

use crate::codec::SchemaError;
use crate::models::{ContainerError, PropertyContainer};

/// Key of the inline compact schema array.
pub const COMPACT_SCHEMA_KEY: &str = "$metadata.schema.compact";

/// Key of the legacy positional type list.
pub const LEGACY_TYPES_KEY: &str = "@metadata.types";

/// Key referencing a schema in the document's schema section.
pub const SCHEMA_REF_KEY: &str = "$metadata.schema.ref";

/// Key of the document-level schema section.
pub const SCHEMAS_KEY: &str = "$metadata.schemas";

pub(crate) const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub(crate) const LOCAL_TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Whether a JSON key is reserved for container metadata.
pub fn is_metadata_key(key: &str) -> bool {
    matches!(
        key,
        COMPACT_SCHEMA_KEY | LEGACY_TYPES_KEY | SCHEMA_REF_KEY | SCHEMAS_KEY
    )
}

/// Error during container JSON reading or writing
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Expected a JSON object, found {0}")]
    ExpectedObject(&'static str),
    #[error("Invalid value for property '{property}': expected {expected}, found {found}")]
    InvalidValue {
        property: String,
        expected: String,
        found: String,
    },
    #[error("Property '{0}' holds a non-finite number")]
    NonFiniteNumber(String),
}

/// Short name of a JSON token kind, for error messages.
pub(crate) fn token_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_f64() => "number",
        serde_json::Value::Number(_) => "integer",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Write a container with the shared registry and default options.
pub fn to_string(container: &PropertyContainer) -> Result<String, JsonError> {
    ContainerJsonWriter::with_defaults().to_string(container)
}

/// Read a container with the shared registry and default options.
pub fn from_str(json: &str) -> Result<PropertyContainer, JsonError> {
    ContainerJsonReader::with_defaults().read_str(json)
}
