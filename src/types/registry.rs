//! Type alias registry
//!
//! The registry is a plain value: build one, register custom aliases on it and
//! hand it (usually behind an `Arc`) to the codec and the JSON reader/writer.
//! [`TypeRegistry::shared`] returns a lazily built registry holding only the
//! built-in aliases.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::TypeTag;
use crate::codec::SchemaError;

/// Canonical built-in aliases. These are the names written on the wire.
const BUILTIN_ALIASES: &[(&str, TypeTag)] = &[
    ("object", TypeTag::Object),
    ("string", TypeTag::String),
    ("bool", TypeTag::Bool),
    ("int", TypeTag::Int),
    ("long", TypeTag::Long),
    ("double", TypeTag::Double),
    ("decimal", TypeTag::Decimal),
    ("DateTime", TypeTag::DateTime),
    ("LocalDate", TypeTag::LocalDate),
    ("LocalDateTime", TypeTag::LocalDateTime),
    ("LocalTime", TypeTag::LocalTime),
    ("Guid", TypeTag::Guid),
    ("byte[]", TypeTag::Bytes),
    ("container", TypeTag::Container),
];

/// Aliases accepted when reading but never emitted.
const BUILTIN_SYNONYMS: &[(&str, TypeTag)] = &[
    ("Object", TypeTag::Object),
    ("Boolean", TypeTag::Bool),
    ("Int32", TypeTag::Int),
    ("Int64", TypeTag::Long),
    ("Double", TypeTag::Double),
    ("float", TypeTag::Double),
    ("DateTimeOffset", TypeTag::DateTime),
    ("uuid", TypeTag::Guid),
    ("PropertyContainer", TypeTag::Container),
];

static SHARED: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(TypeRegistry::new()));

/// Bidirectional alias table.
///
/// Every tag has at most one canonical alias (the one written by
/// [`TypeRegistry::alias_of`]); any number of synonyms may resolve to the same
/// tag.
///
/// # Example
///
/// ```rust
/// use property_container::types::{TypeRegistry, TypeTag};
///
/// let mut registry = TypeRegistry::new();
/// registry.register("Money", TypeTag::Decimal);
///
/// assert_eq!(registry.resolve("Money").unwrap(), TypeTag::Decimal);
/// assert_eq!(registry.alias_of(&TypeTag::Decimal), "Money");
/// assert_eq!(registry.resolve("int[]").unwrap(), TypeTag::array_of(TypeTag::Int));
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    by_alias: HashMap<String, TypeTag>,
    by_type: HashMap<TypeTag, String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry with the built-in aliases.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (alias, tag) in BUILTIN_ALIASES {
            registry.register(*alias, tag.clone());
        }
        for (alias, tag) in BUILTIN_SYNONYMS {
            registry.register_synonym(*alias, tag.clone());
        }
        registry
    }

    /// Registry without any alias. Tags still round-trip through their full
    /// names.
    pub fn empty() -> Self {
        Self {
            by_alias: HashMap::new(),
            by_type: HashMap::new(),
        }
    }

    /// Shared read-only registry with the built-in aliases.
    pub fn shared() -> Arc<TypeRegistry> {
        Arc::clone(&SHARED)
    }

    /// Register `alias` as the canonical alias of `tag`.
    ///
    /// A previous canonical alias of the same tag keeps resolving but is no
    /// longer emitted.
    pub fn register(&mut self, alias: impl Into<String>, tag: TypeTag) -> &mut Self {
        let alias = alias.into();
        debug!("Registering type alias '{}' for {}", alias, tag.full_name());
        self.repoint(&alias, &tag);
        self.by_alias.insert(alias.clone(), tag.clone());
        self.by_type.insert(tag, alias);
        self
    }

    /// Register an alias that resolves to `tag` without becoming its canonical
    /// name.
    pub fn register_synonym(&mut self, alias: impl Into<String>, tag: TypeTag) -> &mut Self {
        let alias = alias.into();
        self.repoint(&alias, &tag);
        self.by_alias.insert(alias, tag);
        self
    }

    /// Forget `alias` as the canonical name of the tag it resolved to before.
    fn repoint(&mut self, alias: &str, tag: &TypeTag) {
        if let Some(previous) = self.by_alias.get(alias)
            && previous != tag
            && self.by_type.get(previous).is_some_and(|a| a == alias)
        {
            debug!("Alias '{}' no longer names {}", alias, previous.full_name());
            let previous = previous.clone();
            self.by_type.remove(&previous);
        }
    }

    /// Resolve an alias to a tag.
    ///
    /// Lookup order: exact alias, `X[]` as an array of `X`, then tag full
    /// names such as `i32` or `Vec<NaiveDate>`.
    pub fn resolve(&self, alias: &str) -> Result<TypeTag, SchemaError> {
        let alias = alias.trim();
        self.try_resolve(alias)
            .ok_or_else(|| SchemaError::UnknownTypeAlias(alias.to_string()))
    }

    fn try_resolve(&self, alias: &str) -> Option<TypeTag> {
        if let Some(tag) = self.by_alias.get(alias) {
            return Some(tag.clone());
        }
        if let Some(element) = alias.strip_suffix("[]")
            && !element.is_empty()
        {
            return self.try_resolve(element).map(TypeTag::array_of);
        }
        TypeTag::from_full_name(alias)
    }

    /// Canonical alias of a tag, falling back to its full name.
    pub fn alias_of(&self, tag: &TypeTag) -> String {
        if let Some(alias) = self.by_type.get(tag) {
            return alias.clone();
        }
        match tag {
            TypeTag::Array(element) => format!("{}[]", self.alias_of(element)),
            other => other.full_name(),
        }
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.by_alias.contains_key(alias)
    }

    /// Canonical (alias, tag) pairs, sorted by alias.
    pub fn aliases(&self) -> Vec<(&str, &TypeTag)> {
        let mut pairs: Vec<(&str, &TypeTag)> = self
            .by_type
            .iter()
            .map(|(tag, alias)| (alias.as_str(), tag))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
    }
}
