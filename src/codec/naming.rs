//! Property name resolution

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Naming policy applied to property names when writing.
///
/// # Example
///
/// ```rust
/// use property_container::codec::NamingPolicy;
///
/// assert_eq!(NamingPolicy::CamelCase.apply("FirstName"), "firstName");
/// assert_eq!(NamingPolicy::SnakeCase.apply("FirstName"), "first_name");
/// assert_eq!(NamingPolicy::AsIs.apply("FirstName"), "FirstName");
/// ```
#[derive(Clone, Default)]
pub enum NamingPolicy {
    #[default]
    AsIs,
    CamelCase,
    PascalCase,
    SnakeCase,
    KebabCase,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NamingPolicy {
    /// Wrap an arbitrary name resolution function.
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        NamingPolicy::Custom(Arc::new(f))
    }

    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingPolicy::AsIs => name.to_string(),
            NamingPolicy::CamelCase => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            NamingPolicy::PascalCase => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            NamingPolicy::SnakeCase => separate_words(name, '_'),
            NamingPolicy::KebabCase => separate_words(name, '-'),
            NamingPolicy::Custom(f) => f(name),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            NamingPolicy::AsIs => "as_is",
            NamingPolicy::CamelCase => "camel_case",
            NamingPolicy::PascalCase => "pascal_case",
            NamingPolicy::SnakeCase => "snake_case",
            NamingPolicy::KebabCase => "kebab_case",
            NamingPolicy::Custom(_) => "custom",
        }
    }
}

/// Lower-case words split on case changes, joined by `separator`.
fn separate_words(name: &str, separator: char) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !out.is_empty() && !out.ends_with(separator) {
                out.push(separator);
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with(separator)
            {
                out.push(separator);
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

impl fmt::Debug for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl PartialEq for NamingPolicy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NamingPolicy::Custom(a), NamingPolicy::Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => a.label() == b.label(),
        }
    }
}

impl std::str::FromStr for NamingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "as_is" | "asis" | "none" => Ok(NamingPolicy::AsIs),
            "camel_case" | "camelcase" | "camel" => Ok(NamingPolicy::CamelCase),
            "pascal_case" | "pascalcase" | "pascal" => Ok(NamingPolicy::PascalCase),
            "snake_case" | "snakecase" | "snake" => Ok(NamingPolicy::SnakeCase),
            "kebab_case" | "kebabcase" | "kebab" => Ok(NamingPolicy::KebabCase),
            _ => Err(format!(
                "Unknown naming policy: {}. \
                 Use as_is, camel_case, pascal_case, snake_case or kebab_case.",
                s
            )),
        }
    }
}

impl Serialize for NamingPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for NamingPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
