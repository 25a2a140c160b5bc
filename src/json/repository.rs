//! Schema repository pass
//!
//! With `use_schema_repository` enabled, the writer registers every container
//! schema in a document-scoped [`SchemaRepository`], writes
//! `$metadata.schema.ref` in place of inline schemas, and appends the
//! collected schemas under `$metadata.schemas` on the root object. Identical
//! schemas are written once however many containers share them.
//!
//! The reader decodes that section before reading the root, so references
//! resolve regardless of where the section sits in the document.

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::{ContainerJsonReader, ContainerJsonWriter, JsonError, SCHEMAS_KEY};
use crate::codec::SchemaRepository;
use crate::models::ContainerView;

impl ContainerJsonWriter {
    /// Convert a container, lifting every schema into `$metadata.schemas`.
    pub fn to_value_with_repository(
        &self,
        container: &dyn ContainerView,
    ) -> Result<JsonValue, JsonError> {
        let mut repository = SchemaRepository::new();
        let mut root = self.container_to_json(container, Some(&mut repository))?;
        info!("Collected {} schema(s) for the document", repository.len());

        if let JsonValue::Object(map) = &mut root
            && !repository.is_empty()
        {
            map.insert(SCHEMAS_KEY.to_string(), repository.to_section(&self.codec));
        }
        Ok(root)
    }
}

impl ContainerJsonReader {
    /// Decode the document's `$metadata.schemas` section, if any.
    pub(super) fn document_schemas(
        &self,
        json: &JsonValue,
    ) -> Result<Option<SchemaRepository>, JsonError> {
        let Some(section) = json.get(SCHEMAS_KEY) else {
            return Ok(None);
        };
        let schemas =
            SchemaRepository::from_section(section, &self.codec, self.options.failure_policy)?;
        debug!("Document declares schemas: {:?}", schemas.names());
        Ok(Some(schemas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::ContainerJsonOptions;
    use crate::models::{PropertyContainer, Value};
    use crate::types::TypeRegistry;
    use serde_json::json;

    fn point(x: i32, y: i32) -> PropertyContainer {
        let mut p = PropertyContainer::new();
        p.set_value("X", Value::Int(x)).unwrap();
        p.set_value("Y", Value::Int(y)).unwrap();
        p
    }

    #[test]
    fn test_shared_schema_written_once() {
        let mut line = PropertyContainer::new();
        line.set_value("From", Value::Container(point(0, 0))).unwrap();
        line.set_value("To", Value::Container(point(3, 4))).unwrap();

        let writer = ContainerJsonWriter::new(
            TypeRegistry::shared(),
            ContainerJsonOptions::new().use_schema_repository(true),
        )
        .unwrap();
        let value = writer.to_value(&line).unwrap();

        assert_eq!(value["$metadata.schema.ref"], json!("Schema1"));
        assert_eq!(value["From"]["$metadata.schema.ref"], json!("Schema2"));
        assert_eq!(value["To"]["$metadata.schema.ref"], json!("Schema2"));
        assert_eq!(
            value["$metadata.schemas"],
            json!({
                "Schema1": ["From@type=container", "To@type=container"],
                "Schema2": ["X@type=int", "Y@type=int"]
            })
        );
        assert!(value.get("$metadata.schema.compact").is_none());
    }

    #[test]
    fn test_section_before_or_after_root_values() {
        let reader = ContainerJsonReader::with_defaults();
        let after = r#"{"$metadata.schema.ref":"P","Id":"7","$metadata.schemas":{"P":["Id@type=long"]}}"#;
        let before = r#"{"$metadata.schemas":{"P":["Id@type=long"]},"$metadata.schema.ref":"P","Id":"7"}"#;

        // string token for a long property is a type error; lenient drops it
        assert!(reader.read_str(after).unwrap().is_empty());
        assert!(reader.read_str(before).unwrap().is_empty());

        let ok = r#"{"$metadata.schema.ref":"P","Id":7,"$metadata.schemas":{"P":["Id@type=long"]}}"#;
        assert_eq!(reader.read_str(ok).unwrap().get("Id"), Some(&Value::Long(7)));
    }
}
