//! Container conversion commands

use super::load_input;
use crate::cli::error::CliError;
use crate::config::SerializerConfig;
use crate::json::{ContainerJsonReader, ContainerJsonWriter};
use crate::types::TypeRegistry;
use crate::xml::XmlContainerParser;

/// Handle `xml`: XML document to container JSON.
pub fn handle_xml(
    input: &str,
    infer_types: bool,
    config: &SerializerConfig,
) -> Result<String, CliError> {
    let content = load_input(input)?;
    let container = XmlContainerParser::new(TypeRegistry::shared())
        .infer_types(infer_types)
        .parse_str(&content)?;

    let writer = ContainerJsonWriter::new(TypeRegistry::shared(), config.to_options())?;
    Ok(writer.to_string(&container)?)
}

/// Handle `normalize`: container JSON read and written back under the
/// loaded configuration.
pub fn handle_normalize(input: &str, config: &SerializerConfig) -> Result<String, CliError> {
    let content = load_input(input)?;
    let options = config.to_options();

    let reader = ContainerJsonReader::new(TypeRegistry::shared(), options.clone())?;
    let container = reader.read_str(&content)?;

    let writer = ContainerJsonWriter::new(TypeRegistry::shared(), options)?;
    Ok(writer.to_string(&container)?)
}
