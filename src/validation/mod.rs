//! Validation functionality
//!
//! Provides validation logic for:
//! - Property names (length, characters, reserved metadata keys)
//! - Compact schema lines

pub mod input;

pub use input::{
    MAX_PROPERTY_NAME_LENGTH, ValidationError, ValidationResult, validate_compact_line,
    validate_property_name, validate_schema,
};
