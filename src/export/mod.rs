//! Export functionality
//!
//! Provides exporters for schema description formats:
//! - OpenAPI 3 schema objects (JSON or YAML)

pub mod openapi;

/// Result of an export operation.
///
/// Contains the exported content and format identifier.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[must_use = "export results contain the exported content and should be used"]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Unresolved schema reference: {0}")]
    UnresolvedReference(String),
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

// Re-export for convenience
pub use openapi::{OpenApiFormat, OpenApiSchemaExporter};
