use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::StackConfig;

/// Commands for flexfn maintenance tasks.
#[derive(Subcommand, Debug)]
pub enum MaintenanceCommands {
    /// Generate JSON schema for stack files.
    GenerateConfigSchema(GenerateSchema),
}

impl MaintenanceCommands {
    pub async fn run(&self) -> anyhow::Result<()> {
        match self {
            MaintenanceCommands::GenerateConfigSchema(cmd) => cmd.run().await,
        }
    }
}

#[derive(Parser, Debug)]
pub struct GenerateSchema {
    /// The file to which to generate the JSON schema. If omitted, it is generated to stdout.
    #[clap(short = 'o')]
    pub output: Option<PathBuf>,
}

impl GenerateSchema {
    async fn run(&self) -> anyhow::Result<()> {
        let schema = schemars::schema_for!(StackConfig);
        let schema_json = serde_json::to_string_pretty(&schema)?;
        write(&self.output, &schema_json)?;
        Ok(())
    }
}

fn write(output: &Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_describes_stack_fields() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("schema.json");
        GenerateSchema {
            output: Some(path.clone()),
        }
        .run()
        .await?;

        let schema: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let properties = schema["properties"].as_object().unwrap();
        for field in ["name", "resource_group_name", "runtime", "app_settings"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
        Ok(())
    }
}
