//! CLI-specific error types

use crate::codec::SchemaError;
use crate::export::ExportError;
use crate::json::JsonError;
use crate::validation::ValidationError;
use crate::xml::XmlError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),

    #[error("JSON error: {0}")]
    JsonError(#[from] JsonError),

    #[error("XML error: {0}")]
    XmlError(#[from] XmlError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),
}
