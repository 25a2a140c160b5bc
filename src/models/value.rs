//! Property values

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{ContainerError, PropertyContainer};
use crate::format::FormatterChain;
use crate::types::TypeTag;

static RE_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap());

/// Exact decimal number kept in its textual form.
///
/// # Example
///
/// ```rust
/// use property_container::models::Decimal;
///
/// let price: Decimal = "19.99".parse().unwrap();
/// assert_eq!(price.as_str(), "19.99");
/// assert!("abc".parse::<Decimal>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal(String);

impl Decimal {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.parse().unwrap_or(f64::NAN)
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then(|| Decimal(value.to_string()))
    }
}

impl FromStr for Decimal {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !RE_DECIMAL.is_match(trimmed) {
            return Err(ContainerError::InvalidDecimal(s.to_string()));
        }
        Ok(Decimal(trimmed.trim_start_matches('+').to_string()))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    DateTime(DateTime<Utc>),
    LocalDate(NaiveDate),
    LocalDateTime(NaiveDateTime),
    LocalTime(NaiveTime),
    Guid(Uuid),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Container(PropertyContainer),
    /// Raw JSON kept as-is
    Object(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Tag describing the runtime type of this value.
    ///
    /// Arrays report the common tag of their non-null elements, or `Object`
    /// when the elements disagree.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null | Value::Object(_) => TypeTag::Object,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Long(_) => TypeTag::Long,
            Value::Double(_) => TypeTag::Double,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::String(_) => TypeTag::String,
            Value::DateTime(_) => TypeTag::DateTime,
            Value::LocalDate(_) => TypeTag::LocalDate,
            Value::LocalDateTime(_) => TypeTag::LocalDateTime,
            Value::LocalTime(_) => TypeTag::LocalTime,
            Value::Guid(_) => TypeTag::Guid,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::Container(_) => TypeTag::Container,
            Value::Array(items) => TypeTag::array_of(common_tag(items)),
        }
    }

    /// Whether this value can be stored under a property of the given tag.
    ///
    /// `Null` and `Object` tags are permissive; arrays match element-wise.
    pub fn matches(&self, tag: &TypeTag) -> bool {
        match (self, tag) {
            (Value::Null, _) | (_, TypeTag::Object) => true,
            (Value::Array(items), TypeTag::Array(element)) => {
                items.iter().all(|item| item.matches(element))
            }
            (value, tag) => &value.type_tag() == tag,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&PropertyContainer> {
        match self {
            Value::Container(container) => Some(container),
            _ => None,
        }
    }
}

fn common_tag(items: &[Value]) -> TypeTag {
    let mut tags = items.iter().filter(|v| !v.is_null()).map(Value::type_tag);
    let Some(first) = tags.next() else {
        return TypeTag::Object;
    };
    if tags.all(|tag| tag == first) {
        first
    } else {
        TypeTag::Object
    }
}

/// Renders through the default [`FormatterChain`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&FormatterChain::shared().format(self))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::LocalDate(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::LocalDateTime(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::LocalTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

impl From<PropertyContainer> for Value {
    fn from(v: PropertyContainer) -> Self {
        Value::Container(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_parse() {
        assert_eq!("+1.50".parse::<Decimal>().unwrap().as_str(), "1.50");
        assert_eq!(".5".parse::<Decimal>().unwrap().as_str(), ".5");
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("".parse::<Decimal>().is_err());
        assert_eq!(Decimal::from_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_array_type_tag() {
        let ints = Value::from(vec![1, 2, 3]);
        assert_eq!(ints.type_tag(), TypeTag::array_of(TypeTag::Int));

        let mixed = Value::Array(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(mixed.type_tag(), TypeTag::array_of(TypeTag::Object));

        let with_null = Value::Array(vec![Value::Null, Value::from("a")]);
        assert_eq!(with_null.type_tag(), TypeTag::array_of(TypeTag::String));
    }

    #[test]
    fn test_matches() {
        let tags = TypeTag::array_of(TypeTag::String);
        assert!(Value::from(vec!["a", "b"]).matches(&tags));
        assert!(Value::Array(vec![]).matches(&tags));
        assert!(!Value::from(vec![1]).matches(&tags));
        assert!(Value::Int(1).matches(&TypeTag::Object));
        assert!(!Value::Int(1).matches(&TypeTag::Long));
    }
}
