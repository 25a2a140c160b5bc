//! OpenAPI exporter
//!
//! Maps schemas to OpenAPI 3 schema objects, referencing known nested
//! schemas through `#/components/schemas/<name>`.

use serde_json::{Map, Value as JsonValue, json};
use std::str::FromStr;
use tracing::debug;

use super::{ExportError, ExportResult};
use crate::codec::SchemaRepository;
use crate::models::{Property, Schema};
use crate::types::TypeTag;

/// Prefix of component references.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenApiFormat {
    #[default]
    Json,
    Yaml,
}

impl OpenApiFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenApiFormat::Json => "json",
            OpenApiFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for OpenApiFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OpenApiFormat::Json),
            "yaml" | "yml" => Ok(OpenApiFormat::Yaml),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// OpenAPI schema exporter
#[derive(Debug, Default)]
pub struct OpenApiSchemaExporter {
    strict_refs: bool,
}

impl OpenApiSchemaExporter {
    /// Create a new OpenApiSchemaExporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail instead of falling back to `type: object` when a container
    /// property references a schema the repository does not hold.
    pub fn strict_refs(mut self, strict: bool) -> Self {
        self.strict_refs = strict;
        self
    }

    /// Export one schema as an OpenAPI schema object.
    ///
    /// # Arguments
    ///
    /// * `schema` - The schema to export
    /// * `known` - Repository that container property references resolve against
    ///
    /// # Returns
    ///
    /// A `serde_json::Value` holding the schema object.
    ///
    /// # Example
    ///
    /// ```rust
    /// use property_container::codec::SchemaRepository;
    /// use property_container::export::OpenApiSchemaExporter;
    /// use property_container::models::{Property, Schema};
    /// use property_container::types::TypeTag;
    ///
    /// let mut known = SchemaRepository::new();
    /// known.insert(Schema::named("Address").with(Property::new("City", TypeTag::String)));
    ///
    /// let person = Schema::named("Person")
    ///     .with(Property::new("Age", TypeTag::Int).with_nullable(false))
    ///     .with(Property::new("Home", TypeTag::Container).with_schema_ref("Address"));
    ///
    /// let object = OpenApiSchemaExporter::new().export_schema(&person, Some(&known)).unwrap();
    /// assert_eq!(object["properties"]["Age"]["format"], "int32");
    /// assert_eq!(object["properties"]["Home"]["$ref"], "#/components/schemas/Address");
    /// assert_eq!(object["required"][0], "Age");
    /// ```
    pub fn export_schema(
        &self,
        schema: &Schema,
        known: Option<&SchemaRepository>,
    ) -> Result<JsonValue, ExportError> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for property in schema {
            properties.insert(property.name.clone(), self.export_property(property, known)?);
            if property.nullable == Some(false) {
                required.push(json!(property.name));
            }
        }

        let mut object = Map::new();
        if let Some(name) = &schema.name {
            object.insert("title".to_string(), json!(name));
        }
        object.insert("type".to_string(), json!("object"));
        object.insert("properties".to_string(), JsonValue::Object(properties));
        if !required.is_empty() {
            object.insert("required".to_string(), JsonValue::Array(required));
        }
        Ok(JsonValue::Object(object))
    }

    /// Export every schema of a repository under `components.schemas`.
    pub fn export_components(
        &self,
        repository: &SchemaRepository,
    ) -> Result<JsonValue, ExportError> {
        let mut schemas = Map::new();
        for schema in repository.iter() {
            let name = schema.name.clone().unwrap_or_default();
            schemas.insert(name, self.export_schema(schema, Some(repository))?);
        }
        Ok(json!({ "components": { "schemas": schemas } }))
    }

    /// Export one schema in the requested format.
    pub fn export(
        &self,
        schema: &Schema,
        known: Option<&SchemaRepository>,
        format: OpenApiFormat,
    ) -> Result<ExportResult, ExportError> {
        let value = self.export_schema(schema, known)?;
        render(&value, format)
    }

    /// Export a repository's components in the requested format.
    pub fn export_repository(
        &self,
        repository: &SchemaRepository,
        format: OpenApiFormat,
    ) -> Result<ExportResult, ExportError> {
        let value = self.export_components(repository)?;
        render(&value, format)
    }

    fn export_property(
        &self,
        property: &Property,
        known: Option<&SchemaRepository>,
    ) -> Result<JsonValue, ExportError> {
        let mut object = self.export_type(&property.type_tag, property, known)?;

        // a $ref replaces the whole object
        if object.contains_key("$ref") {
            return Ok(JsonValue::Object(object));
        }
        if let Some(description) = &property.description {
            object.insert("description".to_string(), json!(description));
        }
        if property.nullable == Some(true) {
            object.insert("nullable".to_string(), json!(true));
        }
        if !property.allowed_values.is_empty() {
            let values: Vec<JsonValue> = property
                .allowed_values
                .iter()
                .map(|v| enum_value(v, &property.type_tag))
                .collect();
            object.insert("enum".to_string(), JsonValue::Array(values));
        }
        Ok(JsonValue::Object(object))
    }

    fn export_type(
        &self,
        tag: &TypeTag,
        property: &Property,
        known: Option<&SchemaRepository>,
    ) -> Result<Map<String, JsonValue>, ExportError> {
        let mut object = Map::new();
        match tag {
            TypeTag::Array(element) => {
                object.insert("type".to_string(), json!("array"));
                let items = self.export_type(element, property, known)?;
                object.insert("items".to_string(), JsonValue::Object(items));
            }
            TypeTag::Container => match self.resolve_ref(property, known)? {
                Some(reference) => {
                    object.insert("$ref".to_string(), json!(reference));
                }
                None => {
                    object.insert("type".to_string(), json!("object"));
                }
            },
            TypeTag::Object => {}
            scalar => {
                let (json_type, format) = map_scalar(scalar);
                object.insert("type".to_string(), json!(json_type));
                if let Some(format) = format {
                    object.insert("format".to_string(), json!(format));
                }
            }
        }
        Ok(object)
    }

    fn resolve_ref(
        &self,
        property: &Property,
        known: Option<&SchemaRepository>,
    ) -> Result<Option<String>, ExportError> {
        let Some(name) = &property.schema_ref else {
            return Ok(None);
        };
        if known.and_then(|repo| repo.get(name)).is_some() {
            return Ok(Some(format!("{}{}", COMPONENTS_PREFIX, name)));
        }
        if self.strict_refs {
            return Err(ExportError::UnresolvedReference(name.clone()));
        }
        debug!(
            "Schema '{}' referenced by '{}' is not known, exporting as plain object",
            name, property.name
        );
        Ok(None)
    }
}

/// Map scalar tags to OpenAPI type and format.
fn map_scalar(tag: &TypeTag) -> (&'static str, Option<&'static str>) {
    match tag {
        TypeTag::String => ("string", None),
        TypeTag::Bool => ("boolean", None),
        TypeTag::Int => ("integer", Some("int32")),
        TypeTag::Long => ("integer", Some("int64")),
        TypeTag::Double => ("number", Some("double")),
        TypeTag::Decimal => ("number", Some("decimal")),
        TypeTag::DateTime | TypeTag::LocalDateTime => ("string", Some("date-time")),
        TypeTag::LocalDate => ("string", Some("date")),
        TypeTag::LocalTime => ("string", Some("time")),
        TypeTag::Guid => ("string", Some("uuid")),
        TypeTag::Bytes => ("string", Some("byte")),
        TypeTag::Object | TypeTag::Container | TypeTag::Array(_) => ("object", None),
    }
}

/// Allowed values keep their JSON type for numeric and boolean properties.
fn enum_value(raw: &str, tag: &TypeTag) -> JsonValue {
    match tag {
        TypeTag::Int | TypeTag::Long => raw.parse::<i64>().map(|v| json!(v)).unwrap_or(json!(raw)),
        TypeTag::Double | TypeTag::Decimal => {
            raw.parse::<f64>().map(|v| json!(v)).unwrap_or(json!(raw))
        }
        TypeTag::Bool => raw.parse::<bool>().map(|v| json!(v)).unwrap_or(json!(raw)),
        _ => json!(raw),
    }
}

fn render(value: &JsonValue, format: OpenApiFormat) -> Result<ExportResult, ExportError> {
    let content = match format {
        OpenApiFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?,
        OpenApiFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?,
    };
    Ok(ExportResult {
        content,
        format: format.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_mapping() {
        let schema = Schema::new()
            .with(Property::new("When", TypeTag::DateTime))
            .with(Property::new("Id", TypeTag::Guid).with_nullable(true))
            .with(Property::new("Any", TypeTag::Object));
        let object = OpenApiSchemaExporter::new().export_schema(&schema, None).unwrap();

        assert_eq!(object["properties"]["When"], json!({"type": "string", "format": "date-time"}));
        assert_eq!(object["properties"]["Id"]["nullable"], json!(true));
        assert_eq!(object["properties"]["Any"], json!({}));
        assert!(object.get("required").is_none());
    }

    #[test]
    fn test_array_of_refs() {
        let mut known = SchemaRepository::new();
        known.insert(Schema::named("Line").with(Property::new("Qty", TypeTag::Int)));
        let order = Schema::named("Order").with(
            Property::new("Lines", TypeTag::array_of(TypeTag::Container)).with_schema_ref("Line"),
        );

        let object = OpenApiSchemaExporter::new()
            .export_schema(&order, Some(&known))
            .unwrap();
        assert_eq!(
            object["properties"]["Lines"],
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Line"}})
        );
    }

    #[test]
    fn test_unresolved_ref() {
        let schema = Schema::new()
            .with(Property::new("Home", TypeTag::Container).with_schema_ref("Address"));

        let lenient = OpenApiSchemaExporter::new().export_schema(&schema, None).unwrap();
        assert_eq!(lenient["properties"]["Home"], json!({"type": "object"}));

        let strict = OpenApiSchemaExporter::new()
            .strict_refs(true)
            .export_schema(&schema, None);
        assert!(matches!(strict, Err(ExportError::UnresolvedReference(name)) if name == "Address"));
    }

    #[test]
    fn test_enum_values_typed() {
        let schema = Schema::new().with(
            Property::new("Level", TypeTag::Int)
                .with_allowed_values(vec!["1".to_string(), "2".to_string()]),
        );
        let object = OpenApiSchemaExporter::new().export_schema(&schema, None).unwrap();
        assert_eq!(object["properties"]["Level"]["enum"], json!([1, 2]));
    }

    #[test]
    fn test_yaml_output() {
        let schema = Schema::named("Flag").with(Property::new("On", TypeTag::Bool));
        let result = OpenApiSchemaExporter::new()
            .export(&schema, None, OpenApiFormat::Yaml)
            .unwrap();
        assert_eq!(result.format, "yaml");
        assert!(result.content.contains("title: Flag"));
        assert!(result.content.contains("type: boolean"));
    }
}
