//! Reader/writer options

use std::sync::Arc;

use crate::codec::{
    ALTERNATE_SEPARATOR, CompactSchemaCodec, DEFAULT_SEPARATOR, FailurePolicy, NamingPolicy,
    SchemaError,
};
use crate::types::TypeRegistry;

/// Options shared by [`ContainerJsonWriter`](super::ContainerJsonWriter) and
/// [`ContainerJsonReader`](super::ContainerJsonReader).
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerJsonOptions {
    /// Write `$metadata.schema.compact` ahead of the values
    pub emit_schema: bool,
    /// Naming policy for property names on the wire
    pub naming: NamingPolicy,
    /// Indent output
    pub pretty: bool,
    /// Keep arrays on one line when indenting
    pub compact_arrays: bool,
    /// Per-property error handling when reading
    pub failure_policy: FailurePolicy,
    /// Lift schemas into a shared `$metadata.schemas` section
    pub use_schema_repository: bool,
    pub separator: String,
    pub alternate_separator: Option<String>,
}

impl Default for ContainerJsonOptions {
    fn default() -> Self {
        Self {
            emit_schema: true,
            naming: NamingPolicy::AsIs,
            pretty: false,
            compact_arrays: false,
            failure_policy: FailurePolicy::Lenient,
            use_schema_repository: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            alternate_separator: Some(ALTERNATE_SEPARATOR.to_string()),
        }
    }
}

impl ContainerJsonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_schema(mut self, emit: bool) -> Self {
        self.emit_schema = emit;
        self
    }

    pub fn naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn compact_arrays(mut self, compact: bool) -> Self {
        self.compact_arrays = compact;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn strict(self) -> Self {
        self.failure_policy(FailurePolicy::Strict)
    }

    pub fn use_schema_repository(mut self, enabled: bool) -> Self {
        self.use_schema_repository = enabled;
        self
    }

    pub fn separators(mut self, separator: impl Into<String>, alternate: Option<String>) -> Self {
        self.separator = separator.into();
        self.alternate_separator = alternate;
        self
    }

    /// Build the compact schema codec these options describe.
    pub fn codec(&self, registry: Arc<TypeRegistry>) -> Result<CompactSchemaCodec, SchemaError> {
        Ok(CompactSchemaCodec::new(registry)
            .with_separators(self.separator.clone(), self.alternate_separator.clone())?
            .with_naming(self.naming.clone()))
    }
}
