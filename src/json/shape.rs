//! Container shapes a reader can produce

use std::fmt;
use std::sync::Arc;

use crate::models::{ContainerParts, ContainerView, ImmutableContainer, PropertyContainer, Schema};

/// Builds a user container type from decoded parts.
pub type ContainerFactory =
    Arc<dyn Fn(ContainerParts) -> Box<dyn ContainerView + Send + Sync> + Send + Sync>;

/// A user container type with an optional statically known schema.
#[derive(Clone)]
pub struct CustomShape {
    name: String,
    factory: ContainerFactory,
    known_schema: Option<Schema>,
}

impl CustomShape {
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn(ContainerParts) -> Box<dyn ContainerView + Send + Sync>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            known_schema: None,
        }
    }

    /// Schema whose declarations take precedence over inline metadata.
    pub fn with_known_schema(mut self, schema: Schema) -> Self {
        self.known_schema = Some(schema);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomShape")
            .field("name", &self.name)
            .field("known_schema", &self.known_schema)
            .finish_non_exhaustive()
    }
}

/// Target shape of a read.
#[derive(Debug, Clone, Default)]
pub enum ContainerShape {
    #[default]
    Mutable,
    Immutable,
    Custom(CustomShape),
}

impl ContainerShape {
    pub fn custom(shape: CustomShape) -> Self {
        ContainerShape::Custom(shape)
    }

    pub fn known_schema(&self) -> Option<&Schema> {
        match self {
            ContainerShape::Custom(shape) => shape.known_schema.as_ref(),
            _ => None,
        }
    }

    pub fn build(&self, parts: ContainerParts) -> DecodedContainer {
        match self {
            ContainerShape::Mutable => {
                DecodedContainer::Mutable(PropertyContainer::from_parts(parts))
            }
            ContainerShape::Immutable => {
                DecodedContainer::Immutable(ImmutableContainer::from_parts(parts))
            }
            ContainerShape::Custom(shape) => DecodedContainer::Custom((shape.factory)(parts)),
        }
    }
}

/// A container produced by a read, in the requested shape.
#[derive(Debug)]
pub enum DecodedContainer {
    Mutable(PropertyContainer),
    Immutable(ImmutableContainer),
    Custom(Box<dyn ContainerView + Send + Sync>),
}

impl DecodedContainer {
    pub fn as_view(&self) -> &dyn ContainerView {
        match self {
            DecodedContainer::Mutable(c) => c,
            DecodedContainer::Immutable(c) => c,
            DecodedContainer::Custom(c) => c.as_ref(),
        }
    }

    /// Copy the decoded values into a mutable container.
    pub fn into_mutable(self) -> PropertyContainer {
        match self {
            DecodedContainer::Mutable(c) => c,
            DecodedContainer::Immutable(c) => c.to_mutable(),
            DecodedContainer::Custom(c) => PropertyContainer::from_parts(ContainerParts {
                values: c.properties().to_vec(),
                parent: None,
                search_mode: c.search_mode(),
            }),
        }
    }

    pub fn into_immutable(self) -> ImmutableContainer {
        match self {
            DecodedContainer::Immutable(c) => c,
            other => other.into_mutable().freeze(),
        }
    }
}
