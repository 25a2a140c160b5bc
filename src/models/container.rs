//! Property containers
//!
//! A container is an ordered list of (property, value) pairs with an optional
//! parent. Lookups that miss fall through to the parent when the container's
//! [`SearchMode`] allows it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{ContainerError, Property, Schema, Value};
use crate::format::FormatterChain;

/// Whether lookups consult the parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    /// Look in the container, then in its parent chain
    #[default]
    IncludeParent,
    /// Only look at the container's own values
    ExistingOnly,
}

/// A property together with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: Property,
    pub value: Value,
}

impl PropertyValue {
    /// Pair a property with a value, validating the value against it.
    pub fn new(property: Property, value: Value) -> Result<Self, ContainerError> {
        property.validate(&value)?;
        Ok(Self { property, value })
    }

    pub fn name(&self) -> &str {
        &self.property.name
    }
}

/// The three pieces every container is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerParts {
    pub values: Vec<PropertyValue>,
    pub parent: Option<Arc<ImmutableContainer>>,
    pub search_mode: SearchMode,
}

/// Read access shared by every container shape.
pub trait ContainerView: fmt::Debug {
    /// Own values in order.
    fn properties(&self) -> &[PropertyValue];

    fn parent(&self) -> Option<&ImmutableContainer>;

    fn search_mode(&self) -> SearchMode;

    fn len(&self) -> usize {
        self.properties().len()
    }

    fn is_empty(&self) -> bool {
        self.properties().is_empty()
    }

    /// Find a property value by name, honoring the search mode.
    fn get_property_value(&self, name: &str) -> Option<&PropertyValue> {
        if let Some(found) = self.properties().iter().find(|pv| pv.name() == name) {
            return Some(found);
        }
        match (self.search_mode(), self.parent()) {
            (SearchMode::IncludeParent, Some(parent)) => parent.get_property_value(name),
            _ => None,
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.get_property_value(name).map(|pv| &pv.value)
    }

    fn contains(&self, name: &str) -> bool {
        self.get_property_value(name).is_some()
    }

    /// Schema of the container's own properties.
    fn schema(&self) -> Schema {
        Schema::from_properties(
            self.properties()
                .iter()
                .map(|pv| pv.property.clone())
                .collect(),
        )
    }
}

/// Mutable property container.
///
/// # Example
///
/// ```rust
/// use property_container::models::{ContainerView, Property, PropertyContainer, Value};
/// use property_container::types::TypeTag;
///
/// let mut person = PropertyContainer::new();
/// person.set(Property::new("Name", TypeTag::String), "Ada".into()).unwrap();
/// person.set(Property::new("Age", TypeTag::Int), Value::Int(36)).unwrap();
///
/// assert_eq!(person.get("Age"), Some(&Value::Int(36)));
/// assert!(person.set(Property::new("Age", TypeTag::Int), "old".into()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyContainer {
    values: Vec<PropertyValue>,
    parent: Option<Arc<ImmutableContainer>>,
    search_mode: SearchMode,
}

impl PropertyContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(parts: ContainerParts) -> Self {
        Self {
            values: parts.values,
            parent: parts.parent,
            search_mode: parts.search_mode,
        }
    }

    /// Empty container whose lookups may fall through to `parent`.
    pub fn with_parent(parent: Arc<ImmutableContainer>, search_mode: SearchMode) -> Self {
        Self {
            values: Vec::new(),
            parent: Some(parent),
            search_mode,
        }
    }

    /// Set a value, replacing any existing value with the same property name.
    pub fn set(&mut self, property: Property, value: Value) -> Result<(), ContainerError> {
        let entry = PropertyValue::new(property, value)?;
        match self.values.iter().position(|pv| pv.name() == entry.name()) {
            Some(index) => self.values[index] = entry,
            None => self.values.push(entry),
        }
        Ok(())
    }

    /// Set a value by name.
    ///
    /// An existing property keeps its declaration and validates the value;
    /// otherwise a property is declared from the value's runtime type.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), ContainerError> {
        let property = match self.get_property_value(name) {
            Some(existing) => existing.property.clone(),
            None => Property::new(name, value.type_tag()),
        };
        self.set(property, value)
    }

    /// Builder form of [`PropertyContainer::set`].
    pub fn with(mut self, property: Property, value: Value) -> Result<Self, ContainerError> {
        self.set(property, value)?;
        Ok(self)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        let index = self.values.iter().position(|pv| pv.name() == name)?;
        Some(self.values.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyValue> {
        self.values.iter()
    }

    pub fn into_parts(self) -> ContainerParts {
        ContainerParts {
            values: self.values,
            parent: self.parent,
            search_mode: self.search_mode,
        }
    }

    /// Convert into an immutable, cheaply clonable container.
    pub fn freeze(self) -> ImmutableContainer {
        ImmutableContainer::from_parts(self.into_parts())
    }
}

impl ContainerView for PropertyContainer {
    fn properties(&self) -> &[PropertyValue] {
        &self.values
    }

    fn parent(&self) -> Option<&ImmutableContainer> {
        self.parent.as_deref()
    }

    fn search_mode(&self) -> SearchMode {
        self.search_mode
    }
}

impl fmt::Display for PropertyContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&FormatterChain::shared().format_container(self))
    }
}

/// Immutable property container sharing its values.
///
/// Updates return a new container; clones are cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableContainer {
    values: Arc<[PropertyValue]>,
    parent: Option<Arc<ImmutableContainer>>,
    search_mode: SearchMode,
}

impl Default for ImmutableContainer {
    fn default() -> Self {
        Self::from_parts(ContainerParts::default())
    }
}

impl ImmutableContainer {
    pub fn from_parts(parts: ContainerParts) -> Self {
        Self {
            values: parts.values.into(),
            parent: parts.parent,
            search_mode: parts.search_mode,
        }
    }

    /// Copy with a value set or replaced.
    pub fn with_value(&self, property: Property, value: Value) -> Result<Self, ContainerError> {
        let mut mutable = self.to_mutable();
        mutable.set(property, value)?;
        Ok(mutable.freeze())
    }

    pub fn to_mutable(&self) -> PropertyContainer {
        PropertyContainer::from_parts(ContainerParts {
            values: self.values.to_vec(),
            parent: self.parent.clone(),
            search_mode: self.search_mode,
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyValue> {
        self.values.iter()
    }
}

impl ContainerView for ImmutableContainer {
    fn properties(&self) -> &[PropertyValue] {
        &self.values
    }

    fn parent(&self) -> Option<&ImmutableContainer> {
        self.parent.as_deref()
    }

    fn search_mode(&self) -> SearchMode {
        self.search_mode
    }
}

impl fmt::Display for ImmutableContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&FormatterChain::shared().format_container(self))
    }
}
