//! CLI binary entry point for property-container-cli

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use property_container::cli::commands::convert::{handle_normalize, handle_xml};
use property_container::cli::commands::openapi::handle_openapi;
use property_container::cli::commands::schema::{handle_schema_decode, handle_schema_encode};
use property_container::config::SerializerConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "property-container-cli")]
#[command(about = "CLI wrapper for the property container serializer")]
#[command(version)]
struct Cli {
    /// Directory holding .property-container.toml
    #[arg(short, long, default_value = ".")]
    config_dir: PathBuf,
    /// Indent JSON output regardless of configuration
    #[arg(short, long)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compact schema encoding
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Infer a container from an XML document and write it as JSON
    Xml {
        /// Input file path or '-' for stdin
        input: String,
        /// Keep untyped values as strings
        #[arg(long)]
        no_infer: bool,
    },
    /// Export a property list as an OpenAPI schema
    Openapi {
        /// Property list file (.json, .yaml)
        input: String,
        /// Write YAML instead of JSON
        #[arg(long)]
        yaml: bool,
    },
    /// Read container JSON and write it back under the loaded configuration
    Normalize {
        /// Input file path or '-' for stdin
        input: String,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Encode a property list (.json, .yaml) into compact lines
    Encode {
        /// Property list file
        input: String,
    },
    /// Decode compact lines into a property list
    Decode {
        /// Input file path or '-' for stdin
        #[arg(default_value = "-")]
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SerializerConfig::load(&cli.config_dir).with_context(|| {
        format!("Failed to load configuration from {}", cli.config_dir.display())
    })?;
    if cli.pretty {
        config.json.pretty = true;
    }

    let output = match cli.command {
        Commands::Schema { command } => match command {
            SchemaCommands::Encode { input } => handle_schema_encode(&input, &config),
            SchemaCommands::Decode { input } => handle_schema_decode(&input, &config),
        },
        Commands::Xml { input, no_infer } => handle_xml(&input, !no_infer, &config),
        Commands::Openapi { input, yaml } => handle_openapi(&input, yaml),
        Commands::Normalize { input } => handle_normalize(&input, &config),
    }?;

    println!("{}", output);
    Ok(())
}
