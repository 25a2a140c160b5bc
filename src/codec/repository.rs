//! Named schema collection
//!
//! A repository holds schemas by name. It serves as the set of known schemas
//! for readers and exporters, and as the pass-scoped registry that collects
//! every schema touched while writing a document.

use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use super::{CompactSchemaCodec, FailurePolicy, SchemaError};
use crate::models::Schema;

/// Ordered collection of named schemas.
///
/// # Example
///
/// ```rust
/// use property_container::codec::SchemaRepository;
/// use property_container::models::{Property, Schema};
/// use property_container::types::TypeTag;
///
/// let mut repo = SchemaRepository::new();
/// let point = Schema::new()
///     .with(Property::new("X", TypeTag::Int))
///     .with(Property::new("Y", TypeTag::Int));
///
/// let first = repo.register(&point);
/// let second = repo.register(&point);
/// assert_eq!(first, "Schema1");
/// assert_eq!(first, second);
/// assert_eq!(repo.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRepository {
    schemas: Vec<Schema>,
}

impl SchemaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a schema under its own name, or a generated one.
    /// Returns the name it is stored under.
    pub fn insert(&mut self, mut schema: Schema) -> String {
        let name = schema
            .name
            .clone()
            .unwrap_or_else(|| self.generated_name());
        schema.name = Some(name.clone());
        match self.schemas.iter().position(|s| s.name == schema.name) {
            Some(index) => self.schemas[index] = schema,
            None => self.schemas.push(schema),
        }
        name
    }

    /// Add a schema unless one with the same shape is already present.
    /// Returns the name to reference it by.
    ///
    /// Named schemas only match stored schemas with the same name; a name
    /// already taken by a different shape gets a numeric suffix.
    pub fn register(&mut self, schema: &Schema) -> String {
        let existing = self.schemas.iter().find(|stored| {
            stored.same_shape(schema) && (schema.name.is_none() || stored.name == schema.name)
        });
        if let Some(stored) = existing {
            return stored.name.clone().unwrap_or_default();
        }

        let base = schema.name.clone().unwrap_or_else(|| self.generated_name());
        let mut name = base.clone();
        let mut suffix = 2;
        while self.get(&name).is_some() {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        let mut stored = schema.clone();
        stored.name = Some(name.clone());
        self.schemas.push(stored);
        name
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas
            .iter()
            .find(|s| s.name.as_deref() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Schema> {
        self.schemas.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas
            .iter()
            .filter_map(|s| s.name.as_deref())
            .collect()
    }

    /// Encode as a JSON object of compact schema arrays keyed by name.
    pub fn to_section(&self, codec: &CompactSchemaCodec) -> JsonValue {
        let mut section = Map::new();
        for schema in &self.schemas {
            let lines = codec
                .encode(schema)
                .into_iter()
                .map(JsonValue::String)
                .collect();
            section.insert(
                schema.name.clone().unwrap_or_default(),
                JsonValue::Array(lines),
            );
        }
        JsonValue::Object(section)
    }

    /// Decode a section written by [`SchemaRepository::to_section`].
    pub fn from_section(
        section: &JsonValue,
        codec: &CompactSchemaCodec,
        policy: FailurePolicy,
    ) -> Result<Self, SchemaError> {
        let entries = section.as_object().ok_or_else(|| {
            SchemaError::InvalidSection("schema section must be an object".to_string())
        })?;

        let mut repository = Self::new();
        for (name, lines) in entries {
            let decoded = string_array(lines)
                .ok_or_else(|| {
                    SchemaError::InvalidSection(format!(
                        "schema '{}' must be an array of strings",
                        name
                    ))
                })
                .and_then(|lines| codec.decode(&lines, policy));

            match decoded {
                Ok(mut schema) => {
                    schema.name = Some(name.clone());
                    repository.insert(schema);
                }
                Err(e) if !policy.is_strict() => {
                    warn!("Skipping schema '{}' in schema section: {}", name, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(repository)
    }

    fn generated_name(&self) -> String {
        let mut n = self.schemas.len() + 1;
        loop {
            let name = format!("Schema{}", n);
            if self.get(&name).is_none() {
                return name;
            }
            n += 1;
        }
    }
}

/// Strings of a JSON array, or `None` if it is not an array of strings.
pub(crate) fn string_array(value: &JsonValue) -> Option<Vec<&str>> {
    value
        .as_array()?
        .iter()
        .map(JsonValue::as_str)
        .collect()
}
