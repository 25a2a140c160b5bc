//! XML to container
//!
//! Infers a property container from an XML document: attributes and leaf
//! elements become scalar properties, elements with children become nested
//! containers, and repeated siblings become arrays.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::codec::SchemaError;
use crate::json::{LOCAL_DATE_FORMAT, LOCAL_DATE_TIME_FORMAT, LOCAL_TIME_FORMAT};
use crate::models::{ContainerError, Decimal, Property, PropertyContainer, Value};
use crate::types::{TypeRegistry, TypeTag};

/// Attribute that forces the type of a leaf element.
pub const TYPE_ATTRIBUTE: &str = "type";

/// Property holding the text of a leaf element that also has attributes.
pub const TEXT_PROPERTY: &str = "Value";

/// Error during XML parsing
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(String),
    #[error("XML document has no root element")]
    Empty,
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Invalid value for element '{element}': {message}")]
    InvalidValue { element: String, message: String },
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Parse(e.to_string()))?;
            if attr.key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Parse(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn type_attribute(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == TYPE_ATTRIBUTE)
            .map(|(_, v)| v.as_str())
    }

    fn data_attributes(&self) -> impl Iterator<Item = &(String, String)> {
        self.attributes.iter().filter(|(k, _)| k != TYPE_ATTRIBUTE)
    }
}

/// Parser inferring containers from XML documents.
///
/// # Example
///
/// ```rust
/// use property_container::xml::XmlContainerParser;
/// use property_container::models::{ContainerView, Value};
///
/// let xml = r#"<order id="7"><item>pen</item><item>ink</item><paid/></order>"#;
/// let order = XmlContainerParser::with_defaults().parse_str(xml).unwrap();
///
/// assert_eq!(order.get("id"), Some(&Value::Int(7)));
/// assert_eq!(order.get("paid"), Some(&Value::Null));
/// assert_eq!(
///     order.get("item"),
///     Some(&Value::Array(vec!["pen".into(), "ink".into()]))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct XmlContainerParser {
    registry: Arc<TypeRegistry>,
    infer_types: bool,
}

impl XmlContainerParser {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            infer_types: true,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(TypeRegistry::shared())
    }

    /// When disabled, untyped scalars stay strings.
    pub fn infer_types(mut self, infer: bool) -> Self {
        self.infer_types = infer;
        self
    }

    /// Parse a document into a container built from its root element.
    pub fn parse_str(&self, xml: &str) -> Result<PropertyContainer, XmlError> {
        let root = self.parse_tree(xml)?;
        debug!("Parsed XML root element '{}'", root.name);
        self.to_container(&root)
    }

    fn parse_tree(&self, xml: &str) -> Result<Element, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(XmlError::Parse(format!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            };
            match event {
                Event::Start(start) => stack.push(Element::open(&start)?),
                Event::Empty(start) => {
                    let element = Element::open(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Parse("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(open) = stack.last_mut() {
                        let text = text.unescape().map_err(|e| XmlError::Parse(e.to_string()))?;
                        open.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(open) = stack.last_mut() {
                        open.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Parse(format!("element '{}' is not closed", open.name)));
        }
        root.ok_or(XmlError::Empty)
    }

    fn to_container(&self, element: &Element) -> Result<PropertyContainer, XmlError> {
        let mut container = PropertyContainer::new();

        for (key, raw) in element.data_attributes() {
            let value = self.infer_scalar(raw);
            container.set(Property::new(key.as_str(), value.type_tag()), value)?;
        }

        // group siblings by name, in order of first appearance
        let mut groups: Vec<(&str, Vec<&Element>)> = Vec::new();
        for child in &element.children {
            match groups.iter_mut().find(|(name, _)| *name == child.name) {
                Some((_, members)) => members.push(child),
                None => groups.push((child.name.as_str(), vec![child])),
            }
        }

        for (name, members) in groups {
            let value = if members.len() == 1 {
                self.element_value(members[0])?
            } else {
                let items = members
                    .into_iter()
                    .map(|member| self.element_value(member))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::Array(items)
            };
            container.set(Property::new(name, value.type_tag()), value)?;
        }

        Ok(container)
    }

    fn element_value(&self, element: &Element) -> Result<Value, XmlError> {
        if !element.children.is_empty() {
            return Ok(Value::Container(self.to_container(element)?));
        }

        let text = element.text.trim();
        if element.data_attributes().next().is_some() {
            let mut nested = self.to_container(element)?;
            if !text.is_empty() {
                let value = self.leaf_value(element, text)?;
                nested.set(Property::new(TEXT_PROPERTY, value.type_tag()), value)?;
            }
            return Ok(Value::Container(nested));
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        self.leaf_value(element, text)
    }

    fn leaf_value(&self, element: &Element, text: &str) -> Result<Value, XmlError> {
        match element.type_attribute() {
            Some(alias) => {
                let tag = self.registry.resolve(alias)?;
                parse_text(text, &tag).map_err(|message| XmlError::InvalidValue {
                    element: element.name.clone(),
                    message,
                })
            }
            None => Ok(self.infer_scalar(text)),
        }
    }

    fn infer_scalar(&self, text: &str) -> Value {
        if !self.infer_types {
            return Value::String(text.to_string());
        }
        infer_text(text)
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::Parse(format!(
            "second root element '{}'",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Infer a scalar from element or attribute text.
fn infer_text(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(v) = text.parse::<i64>() {
        return i32::try_from(v).map(Value::Int).unwrap_or(Value::Long(v));
    }
    if text.contains(['.', 'e', 'E'])
        && let Ok(v) = text.parse::<f64>()
        && v.is_finite()
    {
        return Value::Double(v);
    }
    Value::String(text.to_string())
}

/// Parse text as the given scalar type.
fn parse_text(text: &str, tag: &TypeTag) -> Result<Value, String> {
    let value = match tag {
        TypeTag::Object => infer_text(text),
        TypeTag::String => Value::String(text.to_string()),
        TypeTag::Bool => Value::Bool(text.parse().map_err(|e| format!("{}", e))?),
        TypeTag::Int => Value::Int(text.parse().map_err(|e| format!("{}", e))?),
        TypeTag::Long => Value::Long(text.parse().map_err(|e| format!("{}", e))?),
        TypeTag::Double => Value::Double(text.parse().map_err(|e| format!("{}", e))?),
        TypeTag::Decimal => Value::Decimal(text.parse::<Decimal>().map_err(|e| e.to_string())?),
        TypeTag::DateTime => DateTime::parse_from_rfc3339(text)
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
            .map_err(|e| e.to_string())?,
        TypeTag::LocalDate => NaiveDate::parse_from_str(text, LOCAL_DATE_FORMAT)
            .map(Value::LocalDate)
            .map_err(|e| e.to_string())?,
        TypeTag::LocalDateTime => NaiveDateTime::parse_from_str(text, LOCAL_DATE_TIME_FORMAT)
            .map(Value::LocalDateTime)
            .map_err(|e| e.to_string())?,
        TypeTag::LocalTime => NaiveTime::parse_from_str(text, LOCAL_TIME_FORMAT)
            .map(Value::LocalTime)
            .map_err(|e| e.to_string())?,
        TypeTag::Guid => Uuid::parse_str(text)
            .map(Value::Guid)
            .map_err(|e| e.to_string())?,
        TypeTag::Bytes => BASE64
            .decode(text)
            .map(Value::Bytes)
            .map_err(|e| e.to_string())?,
        TypeTag::Container | TypeTag::Array(_) => {
            return Err(format!("type '{}' cannot be read from element text", tag));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContainerView;

    #[test]
    fn test_infer_text() {
        assert_eq!(infer_text("42"), Value::Int(42));
        assert_eq!(infer_text("42.0"), Value::Double(42.0));
        assert_eq!(infer_text("9000000000"), Value::Long(9_000_000_000));
        assert_eq!(infer_text("true"), Value::Bool(true));
        assert_eq!(infer_text("inf"), Value::from("inf"));
        assert_eq!(infer_text("1.2.3"), Value::from("1.2.3"));
    }

    #[test]
    fn test_type_attribute_forces_type() {
        let xml = r#"<row><Id type="Guid">67e55044-10b1-426f-9247-bb680e5fe0c8</Id><Code type="string">007</Code></row>"#;
        let row = XmlContainerParser::with_defaults().parse_str(xml).unwrap();
        assert!(matches!(row.get("Id"), Some(Value::Guid(_))));
        assert_eq!(row.get("Code"), Some(&Value::from("007")));
    }

    #[test]
    fn test_leaf_with_attributes_becomes_container() {
        let xml = r#"<item><price currency="EUR">9.5</price></item>"#;
        let item = XmlContainerParser::with_defaults().parse_str(xml).unwrap();
        match item.get("price") {
            Some(Value::Container(price)) => {
                assert_eq!(price.get("currency"), Some(&Value::from("EUR")));
                assert_eq!(price.get(TEXT_PROPERTY), Some(&Value::Double(9.5)));
            }
            other => panic!("expected container, got {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        let parser = XmlContainerParser::with_defaults();
        assert!(matches!(parser.parse_str(""), Err(XmlError::Empty)));
        assert!(matches!(parser.parse_str("<a><b></a>"), Err(XmlError::Parse(_))));
        assert!(matches!(parser.parse_str("<a/><b/>"), Err(XmlError::Parse(_))));
        assert!(matches!(
            parser.parse_str(r#"<a><n type="int">x</n></a>"#),
            Err(XmlError::InvalidValue { .. })
        ));
        assert!(matches!(
            parser.parse_str(r#"<a><n type="Money">1</n></a>"#),
            Err(XmlError::Schema(SchemaError::UnknownTypeAlias(_)))
        ));
    }
}
