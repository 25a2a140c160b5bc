//! Property model for the SDK

use serde::{Deserialize, Serialize};

use super::{ContainerError, Value};
use crate::types::TypeTag;

/// A named, typed slot in a schema.
///
/// # Example
///
/// ```rust
/// use property_container::models::Property;
/// use property_container::types::TypeTag;
///
/// let age = Property::new("Age", TypeTag::Int).with_description("Age in years");
/// assert_eq!(age.name, "Age");
/// assert!(age.accepts_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property name, unique within a schema by convention
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit nullability; `None` means null is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Enumerated allowed values, compared by their text form
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    /// Name of the known schema describing a nested container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            description: None,
            nullable: None,
            allowed_values: Vec::new(),
            schema_ref: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Reference a named schema for a nested container property.
    pub fn with_schema_ref(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_ref = Some(schema_name.into());
        self
    }

    pub fn accepts_null(&self) -> bool {
        self.nullable != Some(false)
    }

    /// Check that a value fits this property.
    pub fn validate(&self, value: &Value) -> Result<(), ContainerError> {
        if value.is_null() {
            return if self.accepts_null() {
                Ok(())
            } else {
                Err(ContainerError::NullNotAllowed(self.name.clone()))
            };
        }

        if !value.matches(&self.type_tag) {
            return Err(ContainerError::TypeMismatch {
                property: self.name.clone(),
                expected: self.type_tag.to_string(),
                actual: value.type_tag().to_string(),
            });
        }

        if !self.allowed_values.is_empty() {
            let text = value.to_string();
            if !self.allowed_values.iter().any(|allowed| allowed == &text) {
                return Err(ContainerError::ValueNotAllowed {
                    property: self.name.clone(),
                    value: text,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_type() {
        let prop = Property::new("Age", TypeTag::Int);
        assert!(prop.validate(&Value::Int(3)).is_ok());
        assert!(prop.validate(&Value::Null).is_ok());
        assert!(matches!(
            prop.validate(&Value::String("3".to_string())),
            Err(ContainerError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_non_nullable() {
        let prop = Property::new("Id", TypeTag::Guid).with_nullable(false);
        assert_eq!(
            prop.validate(&Value::Null),
            Err(ContainerError::NullNotAllowed("Id".to_string()))
        );
    }

    #[test]
    fn test_validate_allowed_values() {
        let prop =
            Property::new("Status", TypeTag::String).with_allowed_values(["draft", "active"]);
        assert!(prop.validate(&Value::from("draft")).is_ok());
        assert!(matches!(
            prop.validate(&Value::from("deleted")),
            Err(ContainerError::ValueNotAllowed { .. })
        ));
    }

    #[test]
    fn test_serde_shape() {
        let prop = Property::new("Tags", TypeTag::array_of(TypeTag::String));
        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Tags", "type": "string[]"}));

        let parsed: Property = serde_json::from_value(serde_json::json!({
            "name": "Born",
            "type": "LocalDate",
            "nullable": false
        }))
        .unwrap();
        assert_eq!(parsed.type_tag, TypeTag::LocalDate);
        assert_eq!(parsed.nullable, Some(false));
    }
}
