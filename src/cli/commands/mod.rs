//! CLI command implementations

pub mod convert;
pub mod openapi;
pub mod schema;

use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::error::CliError;
use crate::models::{Property, Schema};

/// Load input content from file or stdin
pub fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// A property list, bare or wrapped in a named schema.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaInput {
    Properties(Vec<Property>),
    Schema(Schema),
}

/// Parse a schema from JSON, or YAML when the file extension says so.
pub fn parse_schema(content: &str, path: &Path) -> Result<Schema, CliError> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );

    let input: SchemaInput = if is_yaml {
        serde_yaml::from_str(content)
            .map_err(|e| CliError::ParseError(path.display().to_string(), e.to_string()))?
    } else {
        serde_json::from_str(content)
            .map_err(|e| CliError::ParseError(path.display().to_string(), e.to_string()))?
    };

    Ok(match input {
        SchemaInput::Properties(properties) => Schema::from_properties(properties),
        SchemaInput::Schema(schema) => schema,
    })
}
