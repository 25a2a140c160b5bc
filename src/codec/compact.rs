//! Compact schema encoding
//!
//! Each property is one line of the form `{name}{separator}type={alias}`.
//! Lines written with the default `@` separator can also be read back when the
//! producer used the alternate `:` separator.

use std::sync::Arc;
use tracing::{debug, warn};

use super::{FailurePolicy, NamingPolicy, SchemaError};
use crate::models::{Property, Schema};
use crate::types::{TypeRegistry, TypeTag};

/// Separator written between the name and the type token.
pub const DEFAULT_SEPARATOR: &str = "@";

/// Separator accepted when the primary one is absent from a line.
pub const ALTERNATE_SEPARATOR: &str = ":";

/// Prefix of the type token.
pub const TYPE_PREFIX: &str = "type=";

/// Encoder/decoder for compact schema lines.
///
/// # Example
///
/// ```rust
/// use property_container::codec::{CompactSchemaCodec, FailurePolicy};
/// use property_container::models::{Property, Schema};
/// use property_container::types::{TypeRegistry, TypeTag};
///
/// let codec = CompactSchemaCodec::new(TypeRegistry::shared());
/// let schema = Schema::new()
///     .with(Property::new("Age", TypeTag::Int))
///     .with(Property::new("Tags", TypeTag::array_of(TypeTag::String)));
///
/// let lines = codec.encode(&schema);
/// assert_eq!(lines, vec!["Age@type=int", "Tags@type=string[]"]);
/// assert_eq!(codec.decode(&lines, FailurePolicy::Strict).unwrap(), schema);
/// ```
#[derive(Debug, Clone)]
pub struct CompactSchemaCodec {
    registry: Arc<TypeRegistry>,
    separator: String,
    alternate_separator: Option<String>,
    naming: NamingPolicy,
}

impl CompactSchemaCodec {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            separator: DEFAULT_SEPARATOR.to_string(),
            alternate_separator: Some(ALTERNATE_SEPARATOR.to_string()),
            naming: NamingPolicy::AsIs,
        }
    }

    /// Replace the primary and alternate separators.
    ///
    /// Separators must be non-empty and must not contain `=`.
    pub fn with_separators(
        mut self,
        separator: impl Into<String>,
        alternate: Option<String>,
    ) -> Result<Self, SchemaError> {
        let separator = separator.into();
        check_separator(&separator)?;
        if let Some(alt) = &alternate {
            check_separator(alt)?;
        }
        self.separator = separator;
        self.alternate_separator = alternate;
        Ok(self)
    }

    /// Naming policy applied to property names on encode.
    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn naming(&self) -> &NamingPolicy {
        &self.naming
    }

    /// Encode one property.
    pub fn encode_property(&self, property: &Property) -> String {
        let name = self.naming.apply(&property.name);
        if name.contains(self.separator.as_str()) {
            warn!(
                "Property name '{}' contains the schema separator '{}' and will not decode cleanly",
                name, self.separator
            );
        }
        format!(
            "{}{}{}{}",
            name,
            self.separator,
            TYPE_PREFIX,
            self.registry.alias_of(&property.type_tag)
        )
    }

    /// Encode every property of a schema, in order.
    pub fn encode(&self, schema: &Schema) -> Vec<String> {
        schema
            .iter()
            .map(|property| self.encode_property(property))
            .collect()
    }

    /// Decode one line.
    ///
    /// A line without a `type=` token decodes to an `Object` property, whose
    /// values are inferred when read.
    pub fn decode_line(&self, line: &str) -> Result<Property, SchemaError> {
        let separator = self.separator_for(line);
        let mut tokens = line.split(separator);

        let name = tokens.next().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(SchemaError::MalformedEntry(line.to_string()));
        }

        let alias = tokens.find_map(|token| token.trim().strip_prefix(TYPE_PREFIX));
        let type_tag = match alias {
            Some(alias) => self.registry.resolve(alias)?,
            None => {
                debug!("No type token in '{}', type will be inferred", line);
                TypeTag::Object
            }
        };

        Ok(Property::new(name, type_tag))
    }

    /// Decode a list of lines into a schema, preserving order.
    pub fn decode<S: AsRef<str>>(
        &self,
        lines: &[S],
        policy: FailurePolicy,
    ) -> Result<Schema, SchemaError> {
        let mut schema = Schema::new();
        for line in lines {
            match self.decode_line(line.as_ref()) {
                Ok(property) => schema.push(property),
                Err(e) if !policy.is_strict() => {
                    warn!("Skipping compact schema entry '{}': {}", line.as_ref(), e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(schema)
    }

    /// Resolve a positional list of aliases.
    ///
    /// In lenient mode unresolvable entries become `Object` so later positions
    /// keep their alignment.
    pub fn decode_positional<S: AsRef<str>>(
        &self,
        aliases: &[S],
        policy: FailurePolicy,
    ) -> Result<Vec<TypeTag>, SchemaError> {
        aliases
            .iter()
            .map(|alias| match self.registry.resolve(alias.as_ref()) {
                Ok(tag) => Ok(tag),
                Err(e) if !policy.is_strict() => {
                    warn!(
                        "Positional type '{}' unresolved, inferring instead: {}",
                        alias.as_ref(),
                        e
                    );
                    Ok(TypeTag::Object)
                }
                Err(e) => Err(e),
            })
            .collect()
    }

    fn separator_for(&self, line: &str) -> &str {
        if line.contains(self.separator.as_str()) {
            return &self.separator;
        }
        match &self.alternate_separator {
            Some(alt) if line.contains(alt.as_str()) => alt,
            _ => &self.separator,
        }
    }
}

fn check_separator(separator: &str) -> Result<(), SchemaError> {
    if separator.is_empty() || separator.contains('=') {
        return Err(SchemaError::InvalidSeparator(separator.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> CompactSchemaCodec {
        CompactSchemaCodec::new(TypeRegistry::shared())
    }

    #[test]
    fn test_decode_alternate_separator() {
        let prop = codec().decode_line("Born:type=LocalDate").unwrap();
        assert_eq!(prop, Property::new("Born", TypeTag::LocalDate));
    }

    #[test]
    fn test_primary_separator_wins_over_alternate() {
        let prop = codec().decode_line("Start@type=LocalTime").unwrap();
        assert_eq!(prop.name, "Start");
        let prop = codec().decode_line("urn:id@type=Guid").unwrap();
        assert_eq!(prop.name, "urn:id");
        assert_eq!(prop.type_tag, TypeTag::Guid);
    }

    #[test]
    fn test_decode_without_type_token() {
        let prop = codec().decode_line("Anything").unwrap();
        assert_eq!(prop.type_tag, TypeTag::Object);
    }

    #[test]
    fn test_decode_ignores_extra_tokens() {
        let prop = codec()
            .decode_line("Price@description=net@type=decimal")
            .unwrap();
        assert_eq!(prop.type_tag, TypeTag::Decimal);
    }

    #[test]
    fn test_malformed_and_unknown() {
        assert!(matches!(
            codec().decode_line("@type=int"),
            Err(SchemaError::MalformedEntry(_))
        ));
        assert!(matches!(
            codec().decode_line("Price@type=Money"),
            Err(SchemaError::UnknownTypeAlias(_))
        ));
    }

    #[test]
    fn test_lenient_skips_bad_lines() {
        let lines = ["A@type=int", "B@type=Money", "C@type=bool"];
        let schema = codec().decode(&lines, FailurePolicy::Lenient).unwrap();
        assert_eq!(schema.names(), vec!["A", "C"]);
        assert!(codec().decode(&lines, FailurePolicy::Strict).is_err());
    }

    #[test]
    fn test_positional_keeps_alignment() {
        let tags = codec()
            .decode_positional(&["int", "Money", "string"], FailurePolicy::Lenient)
            .unwrap();
        assert_eq!(tags, vec![TypeTag::Int, TypeTag::Object, TypeTag::String]);
    }

    #[test]
    fn test_naming_policy_applied_on_encode() {
        let codec = codec().with_naming(NamingPolicy::CamelCase);
        let schema = Schema::new().with(Property::new("FirstName", TypeTag::String));
        assert_eq!(codec.encode(&schema), vec!["firstName@type=string"]);
    }

    #[test]
    fn test_custom_separator() {
        let codec = codec()
            .with_separators("|", Some(";".to_string()))
            .unwrap();
        let schema = Schema::new().with(Property::new("A", TypeTag::Long));
        let lines = codec.encode(&schema);
        assert_eq!(lines, vec!["A|type=long"]);
        assert_eq!(codec.decode(&lines, FailurePolicy::Strict).unwrap(), schema);
        assert_eq!(codec.decode_line("A;type=bool").unwrap().type_tag, TypeTag::Bool);
        assert!(CompactSchemaCodec::new(TypeRegistry::shared())
            .with_separators("", None)
            .is_err());
    }
}
