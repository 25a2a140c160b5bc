//! OpenAPI export command

use std::path::Path;

use super::{load_input, parse_schema};
use crate::cli::error::CliError;
use crate::export::{OpenApiFormat, OpenApiSchemaExporter};

/// Handle `openapi`: property list file to an OpenAPI schema object.
///
/// An unnamed schema takes the file stem as its title.
pub fn handle_openapi(input: &str, yaml: bool) -> Result<String, CliError> {
    let content = load_input(input)?;
    let path = Path::new(input);
    let mut schema = parse_schema(&content, path)?;
    if schema.name.is_none() {
        schema.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| *s != "-")
            .map(String::from);
    }

    let format = if yaml {
        OpenApiFormat::Yaml
    } else {
        OpenApiFormat::Json
    };
    let result = OpenApiSchemaExporter::new().export(&schema, None, format)?;
    Ok(result.content)
}
