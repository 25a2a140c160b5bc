//! JSON to container
//!
//! Each property's type is resolved, in order, from the known schema, the
//! inline compact schema or legacy positional list, and finally from the
//! JSON token itself.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    COMPACT_SCHEMA_KEY, ContainerJsonOptions, ContainerShape, DecodedContainer, JsonError,
    LEGACY_TYPES_KEY, LOCAL_DATE_FORMAT, LOCAL_DATE_TIME_FORMAT, LOCAL_TIME_FORMAT,
    SCHEMA_REF_KEY, SCHEMAS_KEY, token_kind,
};
use crate::codec::repository::string_array;
use crate::codec::{CompactSchemaCodec, SchemaError, SchemaRepository};
use crate::models::{
    ContainerParts, Decimal, Property, PropertyContainer, PropertyValue, Schema, Value,
};
use crate::types::{TypeRegistry, TypeTag};

/// Schemas visible while reading one document.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct ReadContext<'a> {
    pub(super) document_schemas: Option<&'a SchemaRepository>,
}

/// Reads JSON objects into property containers.
///
/// # Example
///
/// ```rust
/// use property_container::json::ContainerJsonReader;
/// use property_container::models::{ContainerView, Value};
///
/// let json = r#"{"$metadata.schema.compact":["Count@type=long"],"Count":3,"Ratio":0.5}"#;
/// let container = ContainerJsonReader::with_defaults().read_str(json).unwrap();
///
/// assert_eq!(container.get("Count"), Some(&Value::Long(3)));
/// assert_eq!(container.get("Ratio"), Some(&Value::Double(0.5)));
/// ```
#[derive(Debug, Clone)]
pub struct ContainerJsonReader {
    pub(super) codec: CompactSchemaCodec,
    pub(super) options: ContainerJsonOptions,
    pub(super) known_schemas: SchemaRepository,
}

impl ContainerJsonReader {
    /// Create a reader for the given registry and options.
    ///
    /// # Errors
    ///
    /// Fails when the configured separators are invalid.
    pub fn new(
        registry: Arc<TypeRegistry>,
        options: ContainerJsonOptions,
    ) -> Result<Self, JsonError> {
        let codec = options.codec(registry)?;
        Ok(Self {
            codec,
            options,
            known_schemas: SchemaRepository::new(),
        })
    }

    /// Reader over the shared registry with default options.
    pub fn with_defaults() -> Self {
        Self {
            codec: CompactSchemaCodec::new(TypeRegistry::shared()),
            options: ContainerJsonOptions::default(),
            known_schemas: SchemaRepository::new(),
        }
    }

    /// Schemas that `$metadata.schema.ref` and nested container properties
    /// may refer to, in addition to the document's own schema section.
    pub fn with_known_schemas(mut self, schemas: SchemaRepository) -> Self {
        self.known_schemas = schemas;
        self
    }

    pub fn options(&self) -> &ContainerJsonOptions {
        &self.options
    }

    pub fn known_schemas(&self) -> &SchemaRepository {
        &self.known_schemas
    }

    /// Read a mutable container from a JSON string.
    pub fn read_str(&self, json: &str) -> Result<PropertyContainer, JsonError> {
        let value: JsonValue = serde_json::from_str(json)?;
        self.read_value(&value)
    }

    /// Read a mutable container from a parsed JSON value.
    pub fn read_value(&self, json: &JsonValue) -> Result<PropertyContainer, JsonError> {
        Ok(self
            .read_value_as(json, &ContainerShape::Mutable, None)?
            .into_mutable())
    }

    /// Read with a schema whose declarations override the inline metadata.
    pub fn read_str_with_schema(
        &self,
        json: &str,
        known: &Schema,
    ) -> Result<PropertyContainer, JsonError> {
        let value: JsonValue = serde_json::from_str(json)?;
        Ok(self
            .read_value_as(&value, &ContainerShape::Mutable, Some(known))?
            .into_mutable())
    }

    /// Read into the requested shape.
    pub fn read_as(
        &self,
        json: &str,
        shape: &ContainerShape,
    ) -> Result<DecodedContainer, JsonError> {
        let value: JsonValue = serde_json::from_str(json)?;
        self.read_value_as(&value, shape, None)
    }

    /// Read a parsed value into the requested shape.
    ///
    /// `known` takes precedence over the shape's own known schema.
    pub fn read_value_as(
        &self,
        json: &JsonValue,
        shape: &ContainerShape,
        known: Option<&Schema>,
    ) -> Result<DecodedContainer, JsonError> {
        let document_schemas = self.document_schemas(json)?;
        let ctx = ReadContext {
            document_schemas: document_schemas.as_ref(),
        };

        let known = known.or_else(|| shape.known_schema());
        let values = self.read_values(json, known, ctx)?;
        Ok(shape.build(ContainerParts {
            values,
            ..Default::default()
        }))
    }

    /// Read the values of one JSON object.
    pub(super) fn read_values(
        &self,
        json: &JsonValue,
        known: Option<&Schema>,
        ctx: ReadContext<'_>,
    ) -> Result<Vec<PropertyValue>, JsonError> {
        let object = json
            .as_object()
            .ok_or_else(|| JsonError::ExpectedObject(token_kind(json)))?;

        let mut schema = known.cloned().unwrap_or_default();
        let mut positional: Option<Vec<TypeTag>> = None;
        let mut position = 0;
        let mut values = Vec::with_capacity(object.len());

        for (key, token) in object {
            match key.as_str() {
                COMPACT_SCHEMA_KEY => {
                    if let Some(inline) = self.lenient(key, self.decode_inline(token))? {
                        schema = self.merge(&schema, &inline);
                    }
                    continue;
                }
                LEGACY_TYPES_KEY => {
                    positional = self.lenient(key, self.decode_positional(token))?;
                    continue;
                }
                SCHEMA_REF_KEY => {
                    if let Some(referenced) = self.lenient(key, self.resolve_ref(token, ctx))? {
                        schema = self.merge(&schema, &referenced);
                    }
                    continue;
                }
                SCHEMAS_KEY => continue,
                _ => {}
            }

            let declared = match &positional {
                Some(types) => known
                    .and_then(|k| self.lookup(k, key))
                    .cloned()
                    .or_else(|| {
                        types
                            .get(position)
                            .map(|tag| Property::new(key.as_str(), tag.clone()))
                    }),
                None => self.lookup(&schema, key).cloned(),
            };
            position += 1;

            match self.read_property(key, token, declared, ctx) {
                Ok(pv) => values.push(pv),
                Err(e) if !self.options.failure_policy.is_strict() => {
                    warn!("Skipping property '{}': {}", key, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(values)
    }

    fn read_property(
        &self,
        key: &str,
        token: &JsonValue,
        declared: Option<Property>,
        ctx: ReadContext<'_>,
    ) -> Result<PropertyValue, JsonError> {
        let (property, value) = match declared {
            Some(property) => {
                let value = self.read_typed(token, &property.type_tag, &property, ctx)?;
                (property, value)
            }
            None => {
                let value = self.infer(token, ctx)?;
                (Property::new(key, value.type_tag()), value)
            }
        };
        Ok(PropertyValue::new(property, value)?)
    }

    /// Read a token as the declared type.
    fn read_typed(
        &self,
        token: &JsonValue,
        tag: &TypeTag,
        property: &Property,
        ctx: ReadContext<'_>,
    ) -> Result<Value, JsonError> {
        if token.is_null() {
            return Ok(Value::Null);
        }
        let mismatch = |found: String| JsonError::InvalidValue {
            property: property.name.clone(),
            expected: self.codec.registry().alias_of(tag),
            found,
        };
        let text = || token.as_str().ok_or_else(|| mismatch(token_kind(token).to_string()));

        let value = match tag {
            TypeTag::Object => self.infer(token, ctx)?,
            TypeTag::String => Value::String(text()?.to_string()),
            TypeTag::Bool => Value::Bool(
                token
                    .as_bool()
                    .ok_or_else(|| mismatch(token_kind(token).to_string()))?,
            ),
            TypeTag::Int => integral(token)
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::Int)
                .ok_or_else(|| mismatch(token.to_string()))?,
            TypeTag::Long => integral(token)
                .map(Value::Long)
                .ok_or_else(|| mismatch(token.to_string()))?,
            TypeTag::Double => token
                .as_f64()
                .map(Value::Double)
                .ok_or_else(|| mismatch(token_kind(token).to_string()))?,
            TypeTag::Decimal => {
                let raw = match token {
                    JsonValue::Number(n) => n.to_string(),
                    JsonValue::String(s) => s.clone(),
                    other => return Err(mismatch(token_kind(other).to_string())),
                };
                Value::Decimal(raw.parse::<Decimal>()?)
            }
            TypeTag::DateTime => DateTime::parse_from_rfc3339(text()?)
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| mismatch(e.to_string()))?,
            TypeTag::LocalDate => NaiveDate::parse_from_str(text()?, LOCAL_DATE_FORMAT)
                .map(Value::LocalDate)
                .map_err(|e| mismatch(e.to_string()))?,
            TypeTag::LocalDateTime => NaiveDateTime::parse_from_str(text()?, LOCAL_DATE_TIME_FORMAT)
                .map(Value::LocalDateTime)
                .map_err(|e| mismatch(e.to_string()))?,
            TypeTag::LocalTime => NaiveTime::parse_from_str(text()?, LOCAL_TIME_FORMAT)
                .map(Value::LocalTime)
                .map_err(|e| mismatch(e.to_string()))?,
            TypeTag::Guid => Uuid::parse_str(text()?)
                .map(Value::Guid)
                .map_err(|e| mismatch(e.to_string()))?,
            TypeTag::Bytes => BASE64
                .decode(text()?)
                .map(Value::Bytes)
                .map_err(|e| mismatch(e.to_string()))?,
            TypeTag::Container => {
                if !token.is_object() {
                    return Err(mismatch(token_kind(token).to_string()));
                }
                let nested_schema = property
                    .schema_ref
                    .as_deref()
                    .and_then(|name| self.find_schema(ctx, name));
                if let (Some(name), None) = (&property.schema_ref, nested_schema) {
                    debug!("Schema '{}' for '{}' not found, reading untyped", name, property.name);
                }
                let values = self.read_values(token, nested_schema, ctx)?;
                Value::Container(PropertyContainer::from_parts(ContainerParts {
                    values,
                    ..Default::default()
                }))
            }
            TypeTag::Array(element) => {
                let items = token
                    .as_array()
                    .ok_or_else(|| mismatch(token_kind(token).to_string()))?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.read_typed(item, element, property, ctx)?);
                }
                Value::Array(out)
            }
        };
        Ok(value)
    }

    /// Infer a value from the JSON token alone.
    fn infer(&self, token: &JsonValue, ctx: ReadContext<'_>) -> Result<Value, JsonError> {
        let value = match token {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(v) = n.as_i64() {
                    i32::try_from(v).map(Value::Int).unwrap_or(Value::Long(v))
                } else if n.is_u64() {
                    Value::Decimal(n.to_string().parse()?)
                } else {
                    Value::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.infer(item, ctx))
                    .collect::<Result<_, _>>()?,
            ),
            JsonValue::Object(_) => {
                let values = self.read_values(token, None, ctx)?;
                Value::Container(PropertyContainer::from_parts(ContainerParts {
                    values,
                    ..Default::default()
                }))
            }
        };
        Ok(value)
    }

    fn decode_inline(&self, token: &JsonValue) -> Result<Schema, JsonError> {
        let lines = string_array(token).ok_or_else(|| {
            SchemaError::InvalidSection(format!(
                "{} must be an array of strings",
                COMPACT_SCHEMA_KEY
            ))
        })?;
        Ok(self.codec.decode(&lines, self.options.failure_policy)?)
    }

    fn decode_positional(&self, token: &JsonValue) -> Result<Vec<TypeTag>, JsonError> {
        let aliases = string_array(token).ok_or_else(|| {
            SchemaError::InvalidSection(format!(
                "{} must be an array of strings",
                LEGACY_TYPES_KEY
            ))
        })?;
        Ok(self
            .codec
            .decode_positional(&aliases, self.options.failure_policy)?)
    }

    fn resolve_ref(&self, token: &JsonValue, ctx: ReadContext<'_>) -> Result<Schema, JsonError> {
        let name = token.as_str().ok_or_else(|| {
            SchemaError::InvalidSection(format!("{} must be a string", SCHEMA_REF_KEY))
        })?;
        self.find_schema(ctx, name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownSchemaRef(name.to_string()).into())
    }

    /// Find a named schema in the document section, then in the known schemas.
    fn find_schema<'s>(&'s self, ctx: ReadContext<'s>, name: &str) -> Option<&'s Schema> {
        ctx.document_schemas
            .and_then(|schemas| schemas.get(name))
            .or_else(|| self.known_schemas.get(name))
    }

    /// Find a property by wire key, matching declared names through the
    /// naming policy.
    fn lookup<'s>(&self, schema: &'s Schema, key: &str) -> Option<&'s Property> {
        schema.get(key).or_else(|| {
            schema
                .iter()
                .find(|p| self.codec.naming().apply(&p.name) == key)
        })
    }

    fn merge(&self, known: &Schema, inline: &Schema) -> Schema {
        Schema::merge_known_with(known, inline, |name| self.codec.naming().apply(name))
    }

    /// Turn a metadata error into a skip under the lenient policy.
    fn lenient<T>(&self, key: &str, result: Result<T, JsonError>) -> Result<Option<T>, JsonError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if !self.options.failure_policy.is_strict() => {
                warn!("Ignoring '{}': {}", key, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Integer value of a token, accepting floats without a fractional part.
fn integral(token: &JsonValue) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    token.as_i64().or_else(|| {
        token
            .as_f64()
            .filter(|v| v.fract() == 0.0 && *v >= -TWO_POW_63 && *v < TWO_POW_63)
            .map(|v| v as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{FailurePolicy, NamingPolicy};
    use crate::models::ContainerView;
    use serde_json::json;

    fn strict() -> ContainerJsonReader {
        ContainerJsonReader::new(TypeRegistry::shared(), ContainerJsonOptions::new().strict())
            .unwrap()
    }

    #[test]
    fn test_inference() {
        let c = ContainerJsonReader::with_defaults()
            .read_value(&json!({
                "I": 42, "D": 42.0, "L": 5_000_000_000i64, "S": "x", "B": true, "N": null,
                "A": [1, 2], "M": [1, "x"], "C": {"Inner": 1}
            }))
            .unwrap();

        assert_eq!(c.get("I"), Some(&Value::Int(42)));
        assert_eq!(c.get("D"), Some(&Value::Double(42.0)));
        assert_eq!(c.get("L"), Some(&Value::Long(5_000_000_000)));
        assert_eq!(c.get("N"), Some(&Value::Null));
        assert_eq!(
            c.get_property_value("A").unwrap().property.type_tag,
            TypeTag::array_of(TypeTag::Int)
        );
        assert_eq!(
            c.get_property_value("M").unwrap().property.type_tag,
            TypeTag::array_of(TypeTag::Object)
        );
        assert_eq!(c.get_property_value("N").unwrap().property.type_tag, TypeTag::Object);
        match c.get("C") {
            Some(Value::Container(inner)) => assert_eq!(inner.get("Inner"), Some(&Value::Int(1))),
            other => panic!("expected nested container, got {:?}", other),
        }
    }

    #[test]
    fn test_declared_int_accepts_integral_float() {
        let c = strict()
            .read_value(&json!({"$metadata.schema.compact": ["N@type=int"], "N": 7.0}))
            .unwrap();
        assert_eq!(c.get("N"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_integral_range() {
        assert_eq!(integral(&json!(9_223_372_036_854_775_807i64)), Some(i64::MAX));
        assert_eq!(integral(&json!(-9_223_372_036_854_775_808.0)), Some(i64::MIN));
        assert_eq!(integral(&json!(9_223_372_036_854_775_808.0)), None);
        assert_eq!(integral(&json!(1.5)), None);
    }

    #[test]
    fn test_lenient_skips_bad_value() {
        let json = json!({
            "$metadata.schema.compact": ["Id@type=Guid", "Name@type=string"],
            "Id": "nope",
            "Name": "x"
        });
        let c = ContainerJsonReader::with_defaults().read_value(&json).unwrap();
        assert!(!c.contains("Id"));
        assert_eq!(c.get("Name"), Some(&Value::from("x")));

        assert!(matches!(
            strict().read_value(&json),
            Err(JsonError::InvalidValue { property, .. }) if property == "Id"
        ));
    }

    #[test]
    fn test_unknown_ref_follows_policy() {
        let json = json!({"$metadata.schema.ref": "Missing", "A": 1});
        let c = ContainerJsonReader::with_defaults().read_value(&json).unwrap();
        assert_eq!(c.get("A"), Some(&Value::Int(1)));

        assert!(matches!(
            strict().read_value(&json),
            Err(JsonError::Schema(SchemaError::UnknownSchemaRef(_)))
        ));
    }

    #[test]
    fn test_known_names_match_through_naming_policy() {
        let options = ContainerJsonOptions::new()
            .naming(NamingPolicy::CamelCase)
            .failure_policy(FailurePolicy::Strict);
        let reader = ContainerJsonReader::new(TypeRegistry::shared(), options).unwrap();
        let known = Schema::new().with(Property::new("FirstSeen", TypeTag::LocalDate));

        let c = reader
            .read_str_with_schema(
                r#"{"$metadata.schema.compact":["firstSeen@type=string"],"firstSeen":"2024-05-01"}"#,
                &known,
            )
            .unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(
            c.get("FirstSeen"),
            Some(&Value::LocalDate(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            ContainerJsonReader::with_defaults().read_str("[1, 2]"),
            Err(JsonError::ExpectedObject("array"))
        ));
    }
}
