//! Container to JSON

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};
use std::io;
use std::sync::Arc;
use tracing::debug;

use super::{
    COMPACT_SCHEMA_KEY, CompactArrayFormatter, ContainerJsonOptions, JsonError,
    LOCAL_DATE_FORMAT, LOCAL_DATE_TIME_FORMAT, LOCAL_TIME_FORMAT, SCHEMA_REF_KEY,
};
use crate::codec::{CompactSchemaCodec, SchemaRepository};
use crate::models::{ContainerView, Value};
use crate::types::TypeRegistry;

/// Writes property containers as JSON objects.
///
/// # Example
///
/// ```rust
/// use property_container::json::ContainerJsonWriter;
/// use property_container::models::{Property, PropertyContainer, Value};
/// use property_container::types::TypeTag;
///
/// let mut person = PropertyContainer::new();
/// person.set(Property::new("Name", TypeTag::String), "Ada".into()).unwrap();
/// person.set(Property::new("Age", TypeTag::Int), Value::Int(36)).unwrap();
///
/// let json = ContainerJsonWriter::with_defaults().to_string(&person).unwrap();
/// assert_eq!(
///     json,
///     r#"{"$metadata.schema.compact":["Name@type=string","Age@type=int"],"Name":"Ada","Age":36}"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ContainerJsonWriter {
    pub(super) codec: CompactSchemaCodec,
    pub(super) options: ContainerJsonOptions,
}

impl ContainerJsonWriter {
    /// Create a writer for the given registry and options.
    ///
    /// # Errors
    ///
    /// Fails when the configured separators are invalid.
    pub fn new(
        registry: Arc<TypeRegistry>,
        options: ContainerJsonOptions,
    ) -> Result<Self, JsonError> {
        let codec = options.codec(registry)?;
        Ok(Self { codec, options })
    }

    /// Writer over the shared registry with default options.
    pub fn with_defaults() -> Self {
        Self {
            codec: CompactSchemaCodec::new(TypeRegistry::shared()),
            options: ContainerJsonOptions::default(),
        }
    }

    pub fn options(&self) -> &ContainerJsonOptions {
        &self.options
    }

    pub fn codec(&self) -> &CompactSchemaCodec {
        &self.codec
    }

    /// Convert a container into a JSON value.
    pub fn to_value(&self, container: &dyn ContainerView) -> Result<JsonValue, JsonError> {
        if self.options.use_schema_repository {
            return self.to_value_with_repository(container);
        }
        self.container_to_json(container, None)
    }

    /// Serialize a container to a string, honoring the formatting options.
    pub fn to_string(&self, container: &dyn ContainerView) -> Result<String, JsonError> {
        let mut out = Vec::new();
        self.write(container, &mut out)?;
        // serde_json only emits UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Serialize a container into a writer.
    pub fn write<W: io::Write>(
        &self,
        container: &dyn ContainerView,
        writer: W,
    ) -> Result<(), JsonError> {
        let value = self.to_value(container)?;
        self.emit(&value, writer)
    }

    pub(super) fn emit<W: io::Write>(&self, value: &JsonValue, writer: W) -> Result<(), JsonError> {
        match (self.options.pretty, self.options.compact_arrays) {
            (false, _) => serde_json::to_writer(writer, value)?,
            (true, false) => serde_json::to_writer_pretty(writer, value)?,
            (true, true) => {
                let mut ser =
                    serde_json::Serializer::with_formatter(writer, CompactArrayFormatter::new());
                value.serialize(&mut ser)?;
            }
        }
        Ok(())
    }

    /// Convert one container. With a repository, the schema is registered
    /// there and referenced by name instead of written inline.
    pub(super) fn container_to_json(
        &self,
        container: &dyn ContainerView,
        mut repository: Option<&mut SchemaRepository>,
    ) -> Result<JsonValue, JsonError> {
        let mut map = Map::new();
        let schema = container.schema();

        if !schema.is_empty() {
            if let Some(repository) = repository.as_deref_mut() {
                let name = repository.register(&schema);
                map.insert(SCHEMA_REF_KEY.to_string(), JsonValue::String(name));
            } else if self.options.emit_schema {
                let lines = self
                    .codec
                    .encode(&schema)
                    .into_iter()
                    .map(JsonValue::String)
                    .collect();
                map.insert(COMPACT_SCHEMA_KEY.to_string(), JsonValue::Array(lines));
            }
        }

        for pv in container.properties() {
            let key = self.codec.naming().apply(pv.name());
            let value = self.value_to_json(&pv.value, pv.name(), repository.as_deref_mut())?;
            if map.insert(key.clone(), value).is_some() {
                debug!("Property '{}' maps to duplicate key '{}'", pv.name(), key);
            }
        }

        Ok(JsonValue::Object(map))
    }

    fn value_to_json(
        &self,
        value: &Value,
        property: &str,
        mut repository: Option<&mut SchemaRepository>,
    ) -> Result<JsonValue, JsonError> {
        let json = match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(v) => JsonValue::from(*v),
            Value::Long(v) => JsonValue::from(*v),
            Value::Double(v) => Number::from_f64(*v)
                .map(JsonValue::Number)
                .ok_or_else(|| JsonError::NonFiniteNumber(property.to_string()))?,
            // numbers only when they print back to the same text
            Value::Decimal(d) => match d.as_str().parse::<Number>() {
                Ok(n) if n.to_string() == d.as_str() => JsonValue::Number(n),
                _ => JsonValue::String(d.to_string()),
            },
            Value::String(s) => JsonValue::String(s.clone()),
            Value::DateTime(dt) => {
                JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::LocalDate(d) => JsonValue::String(d.format(LOCAL_DATE_FORMAT).to_string()),
            Value::LocalDateTime(dt) => {
                JsonValue::String(dt.format(LOCAL_DATE_TIME_FORMAT).to_string())
            }
            Value::LocalTime(t) => JsonValue::String(t.format(LOCAL_TIME_FORMAT).to_string()),
            Value::Guid(id) => JsonValue::String(id.hyphenated().to_string()),
            Value::Bytes(bytes) => JsonValue::String(BASE64.encode(bytes)),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.value_to_json(item, property, repository.as_deref_mut())?);
                }
                JsonValue::Array(out)
            }
            Value::Container(nested) => self.container_to_json(nested, repository)?,
            Value::Object(raw) => raw.clone(),
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decimal, Property, PropertyContainer};
    use crate::types::TypeTag;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_value_mapping() {
        let mut c = PropertyContainer::new();
        c.set_value("Born", NaiveDate::from_ymd_opt(1815, 12, 10).unwrap().into())
            .unwrap();
        c.set_value("Raw", Value::Bytes(vec![1, 2, 3])).unwrap();
        for (name, text) in [("Price", "12.5"), ("Scaled", "12.50"), ("Big", "1e2")] {
            let decimal: Decimal = text.parse().unwrap();
            c.set(Property::new(name, TypeTag::Decimal), Value::Decimal(decimal))
                .unwrap();
        }

        let value = ContainerJsonWriter::with_defaults().to_value(&c).unwrap();
        assert_eq!(value["Born"], json!("1815-12-10"));
        assert_eq!(value["Raw"], json!("AQID"));
        assert_eq!(value["Price"], json!(12.5));
        assert_eq!(value["Scaled"], json!("12.50"));
        assert_eq!(value["Big"], json!("1e2"));
    }

    #[test]
    fn test_non_finite_double_fails() {
        let mut c = PropertyContainer::new();
        c.set_value("Ratio", Value::Double(f64::NAN)).unwrap();
        let result = ContainerJsonWriter::with_defaults().to_value(&c);
        assert!(matches!(result, Err(JsonError::NonFiniteNumber(name)) if name == "Ratio"));
    }

    #[test]
    fn test_emit_schema_off() {
        let mut c = PropertyContainer::new();
        c.set_value("A", Value::Int(1)).unwrap();
        let writer = ContainerJsonWriter::new(
            TypeRegistry::shared(),
            ContainerJsonOptions::new().emit_schema(false),
        )
        .unwrap();
        assert_eq!(writer.to_string(&c).unwrap(), r#"{"A":1}"#);
    }

    #[test]
    fn test_empty_container_has_no_schema() {
        let json = ContainerJsonWriter::with_defaults()
            .to_string(&PropertyContainer::new())
            .unwrap();
        assert_eq!(json, "{}");
    }
}
