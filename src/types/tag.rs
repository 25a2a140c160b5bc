//! Semantic type tags for properties

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::TypeRegistry;
use crate::codec::SchemaError;

/// Declared type of a property.
///
/// Tags are semantic: they describe what a value means (a local date, a
/// 32-bit integer) rather than how it happens to be stored in JSON.
/// `Object` is the untyped tag; values declared as `Object` are inferred
/// from their JSON token when read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Untyped value, inferred from its representation
    Object,
    String,
    Bool,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    Double,
    /// Exact decimal number
    Decimal,
    /// Instant in UTC
    DateTime,
    LocalDate,
    LocalDateTime,
    LocalTime,
    Guid,
    /// Opaque binary payload (base64 on the wire)
    Bytes,
    /// Nested property container
    Container,
    /// Single-dimension array of the element type
    Array(Box<TypeTag>),
}

impl TypeTag {
    /// Create an array tag for the given element type.
    pub fn array_of(element: TypeTag) -> Self {
        TypeTag::Array(Box::new(element))
    }

    /// Element type if this is an array tag.
    pub fn element(&self) -> Option<&TypeTag> {
        match self {
            TypeTag::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeTag::Array(_))
    }

    /// Whether values of this tag are written as JSON numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeTag::Int | TypeTag::Long | TypeTag::Double | TypeTag::Decimal
        )
    }

    /// Rust type name of the tag, used as the alias of last resort.
    ///
    /// # Example
    ///
    /// ```rust
    /// use property_container::types::TypeTag;
    ///
    /// assert_eq!(TypeTag::Int.full_name(), "i32");
    /// assert_eq!(TypeTag::array_of(TypeTag::LocalDate).full_name(), "Vec<NaiveDate>");
    /// ```
    pub fn full_name(&self) -> String {
        match self {
            TypeTag::Object => "Value".to_string(),
            TypeTag::String => "String".to_string(),
            TypeTag::Bool => "bool".to_string(),
            TypeTag::Int => "i32".to_string(),
            TypeTag::Long => "i64".to_string(),
            TypeTag::Double => "f64".to_string(),
            TypeTag::Decimal => "Decimal".to_string(),
            TypeTag::DateTime => "DateTime<Utc>".to_string(),
            TypeTag::LocalDate => "NaiveDate".to_string(),
            TypeTag::LocalDateTime => "NaiveDateTime".to_string(),
            TypeTag::LocalTime => "NaiveTime".to_string(),
            TypeTag::Guid => "Uuid".to_string(),
            TypeTag::Bytes => "Vec<u8>".to_string(),
            TypeTag::Container => "PropertyContainer".to_string(),
            TypeTag::Array(element) => format!("Vec<{}>", element.full_name()),
        }
    }

    /// Parse a name produced by [`TypeTag::full_name`].
    pub fn from_full_name(name: &str) -> Option<Self> {
        let tag = match name {
            "Value" => TypeTag::Object,
            "String" => TypeTag::String,
            "bool" => TypeTag::Bool,
            "i32" => TypeTag::Int,
            "i64" => TypeTag::Long,
            "f64" => TypeTag::Double,
            "Decimal" => TypeTag::Decimal,
            "DateTime<Utc>" => TypeTag::DateTime,
            "NaiveDate" => TypeTag::LocalDate,
            "NaiveDateTime" => TypeTag::LocalDateTime,
            "NaiveTime" => TypeTag::LocalTime,
            "Uuid" => TypeTag::Guid,
            "Vec<u8>" => TypeTag::Bytes,
            "PropertyContainer" => TypeTag::Container,
            _ => {
                let inner = name.strip_prefix("Vec<")?.strip_suffix('>')?;
                return Self::from_full_name(inner).map(Self::array_of);
            }
        };
        Some(tag)
    }
}

/// Renders the alias from the shared registry.
impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TypeRegistry::shared().alias_of(self))
    }
}

impl FromStr for TypeTag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRegistry::shared().resolve(s)
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let alias = String::deserialize(deserializer)?;
        alias.parse().map_err(serde::de::Error::custom)
    }
}
