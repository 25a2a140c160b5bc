//! Schema model for the SDK

use serde::{Deserialize, Serialize};

use super::Property;

/// Ordered set of properties.
///
/// Property order is insertion order and is preserved by every encoding.
///
/// # Example
///
/// ```rust
/// use property_container::models::{Property, Schema};
/// use property_container::types::TypeTag;
///
/// let schema = Schema::new()
///     .with(Property::new("Age", TypeTag::Int))
///     .with(Property::new("Tags", TypeTag::array_of(TypeTag::String)));
///
/// assert_eq!(schema.names(), vec!["Age", "Tags"]);
/// assert_eq!(schema.position("Tags"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Optional schema name, used as the key in schema repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            properties: Vec::new(),
        }
    }

    pub fn from_properties(properties: Vec<Property>) -> Self {
        let mut schema = Self::new();
        for property in properties {
            schema.push(property);
        }
        schema
    }

    /// Builder form of [`Schema::push`].
    pub fn with(mut self, property: Property) -> Self {
        self.push(property);
        self
    }

    /// Append a property, replacing in place any property with the same name.
    pub fn push(&mut self, property: Property) {
        match self.position(&property.name) {
            Some(index) => self.properties[index] = property,
            None => self.properties.push(property),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn get_at(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.properties.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    /// Merge an inline schema into a known one.
    ///
    /// Known properties come first and win on name collision; inline
    /// properties the known schema does not define are appended in order.
    pub fn merge_known(known: &Schema, inline: &Schema) -> Schema {
        Self::merge_known_with(known, inline, |name| name.to_string())
    }

    /// [`Schema::merge_known`] where known names are first mapped into the
    /// inline schema's naming, e.g. by a naming policy.
    pub fn merge_known_with(
        known: &Schema,
        inline: &Schema,
        wire_name: impl Fn(&str) -> String,
    ) -> Schema {
        let mut merged = known.clone();
        for property in &inline.properties {
            let defined = merged
                .properties
                .iter()
                .any(|p| p.name == property.name || wire_name(&p.name) == property.name);
            if !defined {
                merged.properties.push(property.clone());
            }
        }
        merged
    }

    /// Same properties in the same order, ignoring the schema name.
    pub fn same_shape(&self, other: &Schema) -> bool {
        self.properties == other.properties
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

impl FromIterator<Property> for Schema {
    fn from_iter<T: IntoIterator<Item = Property>>(iter: T) -> Self {
        Self::from_properties(iter.into_iter().collect())
    }
}
