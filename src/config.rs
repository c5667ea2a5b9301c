//! Stack files and app setting sources.

use std::{path::Path, path::PathBuf, str::FromStr};

use anyhow::{bail, Context as _};
use flexfn_azure::web::{FunctionsRuntime, NameValuePair};
use flexfn_common::ui::quoted_path;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The parameters of one function app, as written in a stack file.
///
/// Every field can also be given on the command line, which wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// Logical name of the component. Storage account, hosting plan and
    /// function app are named after it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The resource group every resource is created in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,
    /// The language runtime, e.g. `{ name = "python", version = "3.11" }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<FunctionsRuntime>,
    /// Upper bound on scaled-out instances. Defaults to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_instance_count: Option<u32>,
    /// Memory per instance, in MB. Defaults to 2048.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_memory_mb: Option<u32>,
    /// App settings added after the defaults, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub app_settings: Vec<NameValuePair>,
}

impl StackConfig {
    /// Loads a stack file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stack file {}", quoted_path(path)))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse stack file {}", quoted_path(path)))
    }
}

/// Where `--app-setting` values come from.
#[derive(Clone, Debug, PartialEq)]
pub enum AppSettingSource {
    /// The setting has the given literal value.
    Literal(String, String),
    /// The setting's value is the content of the given file.
    FileContent(String, PathBuf),
    /// The file holds a map of setting names to values.
    JsonFile(PathBuf),
    /// The file holds a map of setting names to values.
    TomlFile(PathBuf),
}

impl AppSettingSource {
    /// Reads the settings, keeping the order they appear in.
    pub fn get_settings(&self) -> anyhow::Result<Vec<NameValuePair>> {
        match self {
            Self::Literal(name, value) => Ok(vec![NameValuePair::new(name, value)]),
            Self::FileContent(name, path) => {
                let value = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}.", quoted_path(path)))?;
                Ok(vec![NameValuePair::new(name, value)])
            }
            Self::JsonFile(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read {}.", quoted_path(path)))?;
                let settings: IndexMap<String, String> = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Failed to parse JSON from {}.", quoted_path(path)))?;
                Ok(pairs(settings))
            }
            Self::TomlFile(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}.", quoted_path(path)))?;
                let settings: IndexMap<String, String> = toml::from_str(&text)
                    .with_context(|| format!("Failed to parse TOML from {}.", quoted_path(path)))?;
                Ok(pairs(settings))
            }
        }
    }
}

fn pairs(settings: IndexMap<String, String>) -> Vec<NameValuePair> {
    settings
        .into_iter()
        .map(|(name, value)| NameValuePair::new(name, value))
        .collect()
}

impl FromStr for AppSettingSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix('@') {
            let path = PathBuf::from(path);
            match path.extension().and_then(|s| s.to_str()) {
                Some("json") => Ok(Self::JsonFile(path)),
                Some("toml") => Ok(Self::TomlFile(path)),
                _ => bail!("app setting files must end in .json or .toml"),
            }
        } else if let Some((name, value)) = s.split_once('=') {
            if name.is_empty() {
                bail!("app setting name is empty in '{s}'");
            }
            match value.strip_prefix('@') {
                Some(path) => Ok(Self::FileContent(name.to_string(), PathBuf::from(path))),
                None => Ok(Self::Literal(name.to_string(), value.to_string())),
            }
        } else {
            bail!("app settings must be in the form 'NAME=value' or '@file'")
        }
    }
}
