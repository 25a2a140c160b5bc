//! Input validation utilities.
//!
//! Checks property names and compact schema lines before they are encoded
//! or accepted from user input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::codec::TYPE_PREFIX;
use crate::json::is_metadata_key;
use crate::models::Schema;

/// Maximum length for property names
pub const MAX_PROPERTY_NAME_LENGTH: usize = 255;

static RE_TYPE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^type=[A-Za-z_][A-Za-z0-9_<>,]*(\[\])*$").unwrap());

static RE_KEY_VALUE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=.*$").unwrap());

/// Errors that can occur during input validation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),

    /// Input is a reserved word
    #[error("{field} cannot be a reserved word: {word}")]
    ReservedWord { field: &'static str, word: String },

    /// Name appears more than once
    #[error("duplicate property name: {0}")]
    DuplicateName(String),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a property name.
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 255 characters
/// - Must not contain control characters
/// - Cannot be a reserved metadata key
///
/// # Examples
///
/// ```
/// use property_container::validation::validate_property_name;
///
/// assert!(validate_property_name("FirstName").is_ok());
/// assert!(validate_property_name("").is_err());
/// assert!(validate_property_name("$metadata.schema.compact").is_err());
/// ```
pub fn validate_property_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Empty("property name"));
    }

    let length = name.chars().count();
    if length > MAX_PROPERTY_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "property name",
            max: MAX_PROPERTY_NAME_LENGTH,
            actual: length,
        });
    }

    if let Some(c) = name.chars().find(|c| c.is_control()) {
        return Err(ValidationError::InvalidCharacters {
            field: "property name",
            reason: format!("control character U+{:04X}", c as u32),
        });
    }

    if is_metadata_key(name) {
        return Err(ValidationError::ReservedWord {
            field: "property name",
            word: name.to_string(),
        });
    }

    Ok(())
}

/// Validate one compact schema line written with `separator`.
///
/// # Rules
///
/// - The name before the first separator is a valid property name
/// - Every following token has the form `key=value`
/// - At most one `type=` token, holding a well-formed alias
///
/// # Examples
///
/// ```
/// use property_container::validation::validate_compact_line;
///
/// assert!(validate_compact_line("Tags@type=string[]", "@").is_ok());
/// assert!(validate_compact_line("Tags@string[]", "@").is_err());
/// assert!(validate_compact_line("@type=int", "@").is_err());
/// ```
pub fn validate_compact_line(line: &str, separator: &str) -> ValidationResult<()> {
    if line.trim().is_empty() {
        return Err(ValidationError::Empty("compact schema line"));
    }

    let mut tokens = line.split(separator);
    let name = tokens.next().map(str::trim).unwrap_or_default();
    validate_property_name(name)?;

    let mut type_tokens = 0;
    for token in tokens.map(str::trim) {
        if token.starts_with(TYPE_PREFIX) {
            type_tokens += 1;
            if !RE_TYPE_TOKEN.is_match(token) {
                return Err(ValidationError::InvalidFormat(
                    "compact schema line",
                    format!("malformed type token '{}'", token),
                ));
            }
        } else if !RE_KEY_VALUE_TOKEN.is_match(token) {
            return Err(ValidationError::InvalidFormat(
                "compact schema line",
                format!("expected key=value, got '{}'", token),
            ));
        }
    }

    if type_tokens > 1 {
        return Err(ValidationError::InvalidFormat(
            "compact schema line",
            format!("{} type tokens in '{}'", type_tokens, line),
        ));
    }
    Ok(())
}

/// Validate every property name of a schema and check they are unique.
pub fn validate_schema(schema: &Schema) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for property in schema {
        validate_property_name(&property.name)?;
        if !seen.insert(property.name.as_str()) {
            return Err(ValidationError::DuplicateName(property.name.clone()));
        }
    }
    Ok(())
}
