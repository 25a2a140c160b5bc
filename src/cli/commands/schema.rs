//! Schema encode/decode commands

use std::path::Path;

use super::{load_input, parse_schema};
use crate::cli::error::CliError;
use crate::codec::CompactSchemaCodec;
use crate::config::SerializerConfig;
use crate::types::TypeRegistry;
use crate::validation::{validate_compact_line, validate_schema};

fn codec(config: &SerializerConfig) -> Result<CompactSchemaCodec, CliError> {
    Ok(config.to_options().codec(TypeRegistry::shared())?)
}

/// Handle `schema encode`: property list file to compact lines.
pub fn handle_schema_encode(input: &str, config: &SerializerConfig) -> Result<String, CliError> {
    let content = load_input(input)?;
    let schema = parse_schema(&content, Path::new(input))?;
    validate_schema(&schema)?;

    let lines = codec(config)?.encode(&schema);
    serde_json::to_string_pretty(&lines)
        .map_err(|e| CliError::ParseError("compact schema".to_string(), e.to_string()))
}

/// Handle `schema decode`: compact lines, one per line or as a JSON array,
/// to a property list.
pub fn handle_schema_decode(input: &str, config: &SerializerConfig) -> Result<String, CliError> {
    let content = load_input(input)?;
    let lines: Vec<String> = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content)
            .map_err(|e| CliError::ParseError(input.to_string(), e.to_string()))?
    } else {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    };

    let policy = config.json.failure_policy;
    if policy.is_strict() {
        for line in &lines {
            validate_compact_line(line, &config.schema.separator)?;
        }
    }

    let schema = codec(config)?.decode(&lines, policy)?;
    serde_json::to_string_pretty(&schema.properties)
        .map_err(|e| CliError::ParseError("property list".to_string(), e.to_string()))
}
