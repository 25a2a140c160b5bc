//! Compact schema codec
//!
//! Encodes schemas as string arrays that can be embedded in JSON documents:
//!
//! ```text
//! ["Age@type=int", "Tags@type=string[]"]
//! ```
//!
//! Provides:
//! - [`CompactSchemaCodec`]: encode/decode of property lists
//! - [`NamingPolicy`]: property name resolution applied when writing
//! - [`SchemaRepository`]: named schema collection shared across a document

pub mod compact;
pub mod naming;
pub mod repository;

pub use compact::{ALTERNATE_SEPARATOR, CompactSchemaCodec, DEFAULT_SEPARATOR, TYPE_PREFIX};
pub use naming::NamingPolicy;
pub use repository::SchemaRepository;

use serde::{Deserialize, Serialize};

/// How decode errors on a single entry are handled.
///
/// `Lenient` logs the failure and skips the entry, `Strict` aborts the whole
/// operation with the first error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    Strict,
    #[default]
    Lenient,
}

impl FailurePolicy {
    pub fn is_strict(self) -> bool {
        self == FailurePolicy::Strict
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(FailurePolicy::Strict),
            "lenient" => Ok(FailurePolicy::Lenient),
            _ => Err(format!(
                "Unknown failure policy: {}. Use 'strict' or 'lenient'.",
                s
            )),
        }
    }
}

/// Error during schema encoding, decoding or alias resolution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown type alias: {0}")]
    UnknownTypeAlias(String),
    #[error("Malformed compact schema entry: '{0}'")]
    MalformedEntry(String),
    #[error("Invalid separator: {0}")]
    InvalidSeparator(String),
    #[error("Unknown schema reference: {0}")]
    UnknownSchemaRef(String),
    #[error("Invalid schema section: {0}")]
    InvalidSection(String),
}
