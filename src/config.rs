//! Serializer configuration file support
//!
//! Handles parsing of `.property-container.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codec::{ALTERNATE_SEPARATOR, DEFAULT_SEPARATOR, FailurePolicy, NamingPolicy};
use crate::json::ContainerJsonOptions;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".property-container.toml";

/// Environment variable for the failure policy
pub const ENV_FAILURE_POLICY: &str = "PROPERTY_CONTAINER_FAILURE_POLICY";

/// Environment variable for the naming policy
pub const ENV_NAMING_POLICY: &str = "PROPERTY_CONTAINER_NAMING_POLICY";

/// Environment variable for the compact schema separator
pub const ENV_SEPARATOR: &str = "PROPERTY_CONTAINER_SEPARATOR";

/// Error during configuration loading or saving
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Config error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// JSON reader/writer section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSection {
    /// Write the inline compact schema
    #[serde(default = "default_true")]
    pub emit_schema: bool,

    /// Indent output
    #[serde(default)]
    pub pretty: bool,

    /// Keep arrays on one line when indenting
    #[serde(default)]
    pub compact_arrays: bool,

    /// Naming policy for property names on the wire
    #[serde(default)]
    pub naming_policy: NamingPolicy,

    /// "lenient" (default) or "strict"
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Lift schemas into a shared `$metadata.schemas` section
    #[serde(default)]
    pub use_schema_repository: bool,
}

fn default_true() -> bool {
    true
}

impl Default for JsonSection {
    fn default() -> Self {
        Self {
            emit_schema: true,
            pretty: false,
            compact_arrays: false,
            naming_policy: NamingPolicy::AsIs,
            failure_policy: FailurePolicy::Lenient,
            use_schema_repository: false,
        }
    }
}

/// Compact schema section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSection {
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Accepted when the primary separator is absent; empty disables it
    #[serde(default = "default_alternate_separator")]
    pub alternate_separator: String,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_alternate_separator() -> String {
    ALTERNATE_SEPARATOR.to_string()
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            alternate_separator: default_alternate_separator(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.property-container.toml` configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SerializerConfig {
    #[serde(default)]
    pub json: JsonSection,

    #[serde(default)]
    pub schema: SchemaSection,
}

impl SerializerConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.property-container.toml` in the directory.
    /// Falls back to defaults if not found.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> ConfigResult<()> {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(policy) = lookup(ENV_FAILURE_POLICY)
            && let Ok(policy) = policy.parse()
        {
            self.json.failure_policy = policy;
        }

        if let Some(naming) = lookup(ENV_NAMING_POLICY)
            && let Ok(naming) = naming.parse()
        {
            self.json.naming_policy = naming;
        }

        if let Some(separator) = lookup(ENV_SEPARATOR)
            && !separator.is_empty()
        {
            self.schema.separator = separator;
        }
    }

    /// Reader/writer options for this configuration
    pub fn to_options(&self) -> ContainerJsonOptions {
        let alternate = Some(self.schema.alternate_separator.clone()).filter(|s| !s.is_empty());
        ContainerJsonOptions::new()
            .emit_schema(self.json.emit_schema)
            .pretty(self.json.pretty)
            .compact_arrays(self.json.compact_arrays)
            .naming(self.json.naming_policy.clone())
            .failure_policy(self.json.failure_policy)
            .use_schema_repository(self.json.use_schema_repository)
            .separators(self.schema.separator.clone(), alternate)
    }

    /// Check if configuration exists in a directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(CONFIG_FILENAME).exists()
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Property Container Configuration
# This file configures how property containers are written to and read from JSON.

[json]
# Write "$metadata.schema.compact" ahead of the values
emit_schema = true

# Indent output, optionally keeping arrays on a single line
pretty = false
compact_arrays = false

# Property naming on the wire: as_is, camel_case, pascal_case, snake_case, kebab_case
naming_policy = "as_is"

# "lenient" skips bad entries with a warning, "strict" fails on the first one
failure_policy = "lenient"

# Write each distinct schema once under "$metadata.schemas"
use_schema_repository = false

[schema]
# Separator between the property name and the type token
separator = "@"

# Separator also accepted when reading (empty to disable)
alternate_separator = ":"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SerializerConfig::new();
        assert!(config.json.emit_schema);
        assert_eq!(config.json.failure_policy, FailurePolicy::Lenient);
        assert_eq!(config.schema.separator, DEFAULT_SEPARATOR);
        assert_eq!(config.to_options(), ContainerJsonOptions::default());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[json]
pretty = true
naming_policy = "camel_case"
failure_policy = "strict"

[schema]
separator = "|"
alternate_separator = ""
"#;
        let config = SerializerConfig::parse(toml).unwrap();
        assert!(config.json.emit_schema);
        assert!(config.json.pretty);
        assert_eq!(config.json.naming_policy, NamingPolicy::CamelCase);

        let options = config.to_options();
        assert!(options.failure_policy.is_strict());
        assert_eq!(options.separator, "|");
        assert_eq!(options.alternate_separator, None);
    }

    #[test]
    fn test_parse_invalid_policy() {
        let result = SerializerConfig::parse("[json]\nfailure_policy = \"sometimes\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_FAILURE_POLICY, "strict"),
            (ENV_NAMING_POLICY, "not-a-policy"),
            (ENV_SEPARATOR, "#"),
        ]);
        let mut config = SerializerConfig::new();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.json.failure_policy, FailurePolicy::Strict);
        assert_eq!(config.json.naming_policy, NamingPolicy::AsIs);
        assert_eq!(config.schema.separator, "#");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = SerializerConfig::new();
        config.json.compact_arrays = true;
        config.json.naming_policy = NamingPolicy::SnakeCase;

        config.save(dir.path()).unwrap();
        assert!(SerializerConfig::exists(dir.path()));

        let content = std::fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(SerializerConfig::parse(&content).unwrap(), config);
    }

    #[test]
    fn test_load_missing_uses_defaults() {
        let dir = tempdir().unwrap();
        let loaded = SerializerConfig::load(dir.path()).unwrap();
        assert!(loaded.json.emit_schema);
        assert!(!loaded.json.use_schema_repository);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let sample = sample_config();
        let result = SerializerConfig::parse(sample);
        assert!(result.is_ok(), "Sample config should be valid TOML");
    }
}
