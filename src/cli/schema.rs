//! Schema command implementation for configuration validation and JSON schema generation

use clap::{Args, Subcommand};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use schemars::schema_for;
use serde_json::Value;
use crate::config::{Config, FileConfig};

const SCHEMA_TITLE: &str = "Catalog Browser Configuration";
const SCHEMA_DESCRIPTION: &str = "Configuration file schema for the catalog browser";

/// Generate and validate configuration schemas
#[derive(Debug, Args)]
pub struct SchemaCommand {
    /// Output format for schema generation
    #[arg(short, long, default_value = "json")]
    pub format: SchemaFormat,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty print the output
    #[arg(short, long)]
    pub pretty: bool,

    /// Subcommands for schema operations
    #[command(subcommand)]
    pub command: Option<SchemaSubcommand>,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum SchemaFormat {
    Json,
    Yaml,
}

#[derive(Debug, Subcommand)]
pub enum SchemaSubcommand {
    /// Generate JSON schema for the configuration file
    Generate,
    /// Validate a configuration file against the schema
    Validate {
        /// Configuration file to validate
        config_file: PathBuf,
    },
}

impl SchemaCommand {
    /// Execute the schema command
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Some(SchemaSubcommand::Validate { config_file }) => {
                let report = validate_config_file(config_file)?;
                println!("{}", report);
                Ok(())
            }
            Some(SchemaSubcommand::Generate) | None => self.generate_schema(),
        }
    }

    /// Generate JSON schema for configuration
    fn generate_schema(&self) -> Result<()> {
        let output = self.render_schema(&schema_value()?)?;

        if let Some(ref output_path) = self.output {
            fs::write(output_path, output)
                .with_context(|| format!("Failed to write schema to: {}", output_path.display()))?;
            println!("Schema written to: {}", output_path.display());
        } else {
            println!("{}", output);
        }

        Ok(())
    }

    fn render_schema(&self, schema: &Value) -> Result<String> {
        Ok(match self.format {
            SchemaFormat::Json if self.pretty => serde_json::to_string_pretty(schema)?,
            SchemaFormat::Json => serde_json::to_string(schema)?,
            SchemaFormat::Yaml => {
                serde_yaml::to_string(schema).context("Failed to convert schema to YAML")?
            }
        })
    }
}

/// JSON schema of the config file, with title and description filled in
pub fn schema_value() -> Result<Value> {
    let schema = schema_for!(FileConfig);
    let mut schema_value =
        serde_json::to_value(schema).context("Failed to convert schema to JSON value")?;

    if let Some(obj) = schema_value.as_object_mut() {
        obj.insert("title".to_string(), Value::String(SCHEMA_TITLE.to_string()));
        obj.insert(
            "description".to_string(),
            Value::String(SCHEMA_DESCRIPTION.to_string()),
        );
    }

    Ok(schema_value)
}

/// Check a config file against the schema, then check that it loads.
///
/// Returns a short report on success; schema violations and load failures
/// are returned as errors.
pub fn validate_config_file(config_file: &Path) -> Result<String> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed to read config file: {}", config_file.display()))?;
    let config_value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON config: {}", config_file.display()))?;

    let schema = schema_value()?;
    let compiled = jsonschema::JSONSchema::compile(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile JSON schema: {}", e))?;

    if let Err(errors) = compiled.validate(&config_value) {
        let details = errors
            .map(|error| format!("  - {}: {}", error.instance_path, error))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(anyhow::anyhow!(
            "Configuration validation failed:\n{}",
            details
        ));
    }

    // Schema-valid files can still carry values the app rejects
    let file_config: FileConfig = serde_json::from_value(config_value)
        .context("Configuration is schema-valid but cannot be loaded")?;
    let mut config = Config::default();
    config.merge_with(file_config)?;
    config.validate()?;

    Ok(format!("Configuration is valid: {}", config_file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_config(dir: &Path, value: &Value) -> PathBuf {
        let path = dir.join("catalog.json");
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_schema_lists_config_fields() {
        let schema = schema_value().unwrap();
        assert_eq!(schema["title"], SCHEMA_TITLE);

        let properties = schema["properties"].as_object().unwrap();
        for field in ["base_url", "limit", "page_window", "request_timeout", "placeholder_image", "user_agent"] {
            assert!(properties.contains_key(field), "missing {}", field);
        }
    }

    #[test]
    fn test_render_yaml() {
        let cmd = SchemaCommand {
            format: SchemaFormat::Yaml,
            output: None,
            pretty: false,
            command: None,
        };
        let yaml = cmd.render_schema(&schema_value().unwrap()).unwrap();
        assert!(yaml.contains("base_url"));
    }

    #[tokio::test]
    async fn test_generate_to_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("schema.json");
        let cmd = SchemaCommand {
            format: SchemaFormat::Json,
            output: Some(output.clone()),
            pretty: true,
            command: Some(SchemaSubcommand::Generate),
        };

        cmd.execute().await.unwrap();
        let written: Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written, schema_value().unwrap());
    }

    #[test]
    fn test_validate_valid_config() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            &json!({
                "base_url": "http://localhost:3000",
                "limit": 12,
                "request_timeout": "5s"
            }),
        );

        let report = validate_config_file(&path).unwrap();
        assert!(report.contains("valid"));
    }

    #[test]
    fn test_validate_rejects_wrong_types_and_unknown_fields() {
        let dir = tempdir().unwrap();

        let path = write_config(dir.path(), &json!({ "limit": "twenty" }));
        let err = validate_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("validation failed"));

        let path = write_config(dir.path(), &json!({ "colour": "blue" }));
        assert!(validate_config_file(&path).is_err());
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let dir = tempdir().unwrap();

        let path = write_config(dir.path(), &json!({ "limit": 0 }));
        assert!(validate_config_file(&path).is_err());

        let path = write_config(dir.path(), &json!({ "request_timeout": "soon" }));
        assert!(validate_config_file(&path).is_err());
    }
}
