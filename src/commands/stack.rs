use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use flexfn_azure::web::FunctionsRuntime;
use flexfn_function_app::{FunctionAppArgs, FunctionAppComponent};
use flexfn_resource::{Context, ResourceOptions};

use crate::config::{AppSettingSource, StackConfig};

const RESOURCE_GROUP_ENV: &str = "FLEXFN_RESOURCE_GROUP";

/// The parameters of the function app to declare.
#[derive(Args, Debug)]
pub struct StackArgs {
    /// Stack file holding the component's parameters. Flags override its values.
    #[clap(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Stack the declarations belong to.
    #[clap(long = "stack", default_value = "dev")]
    pub stack: String,

    /// Name of the function app component.
    #[clap(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Resource group to create everything in.
    #[clap(short = 'g', long = "resource-group", env = RESOURCE_GROUP_ENV)]
    pub resource_group: Option<String>,

    /// Language runtime, as `NAME` or `NAME:VERSION` (e.g. `python:3.11`).
    #[clap(long = "runtime")]
    pub runtime: Option<FunctionsRuntime>,

    /// Upper bound on scaled-out instances [default: 100].
    #[clap(long = "maximum-instance-count")]
    pub maximum_instance_count: Option<u32>,

    /// Memory per instance, in MB [default: 2048].
    #[clap(long = "instance-memory-mb")]
    pub instance_memory_mb: Option<u32>,

    /// Extra app setting, as `NAME=value`, `NAME=@file`, `@file.json` or
    /// `@file.toml`. May be repeated; settings keep the order given.
    #[clap(long = "app-setting")]
    pub app_settings: Vec<AppSettingSource>,
}

/// A fully resolved set of component parameters.
#[derive(Debug)]
pub struct Stack {
    /// Stack name.
    pub stack: String,
    /// Component name.
    pub name: String,
    /// Component arguments.
    pub args: FunctionAppArgs,
}

impl StackArgs {
    /// Merges the stack file with the flags.
    pub fn resolve(&self) -> Result<Stack> {
        let config = match &self.config {
            Some(path) => StackConfig::from_file(path)?,
            None => StackConfig::default(),
        };

        let name = self
            .name
            .clone()
            .or(config.name)
            .context("No component name: pass --name or set `name` in the stack file")?;
        let resource_group = self
            .resource_group
            .clone()
            .or(config.resource_group_name)
            .with_context(|| format!("No resource group: pass --resource-group, set {RESOURCE_GROUP_ENV}, or set `resource_group_name` in the stack file"))?;
        let runtime = self
            .runtime
            .clone()
            .or(config.runtime)
            .context("No runtime: pass --runtime or set `runtime` in the stack file")?;

        let mut app_settings = config.app_settings;
        for source in &self.app_settings {
            app_settings.extend(source.get_settings()?);
        }

        let mut args = FunctionAppArgs::new(resource_group, runtime);
        args.maximum_instance_count = self.maximum_instance_count.or(config.maximum_instance_count);
        args.instance_memory_mb = self.instance_memory_mb.or(config.instance_memory_mb);
        if !app_settings.is_empty() {
            args = args.with_app_settings(app_settings);
        }

        Ok(Stack {
            stack: self.stack.clone(),
            name,
            args,
        })
    }
}

impl Stack {
    /// Declares the component in a fresh context.
    pub fn declare(self) -> Result<(Context, FunctionAppComponent)> {
        let mut ctx = Context::new(self.stack, self.name.clone());
        let component =
            FunctionAppComponent::new(&mut ctx, &self.name, self.args, &ResourceOptions::new())
                .with_context(|| format!("Failed to declare function app '{}'", self.name))?;
        Ok((ctx, component))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[clap(flatten)]
        stack: StackArgs,
    }

    fn parse(args: &[&str]) -> StackArgs {
        Cli::parse_from(std::iter::once("flexfn").chain(args.iter().copied())).stack
    }

    #[test]
    fn flags_alone_are_enough() {
        let stack = parse(&[
            "--name",
            "orders",
            "--resource-group",
            "rg",
            "--runtime",
            "node:20",
            "--app-setting",
            "A=1",
            "--app-setting",
            "B=2",
        ])
        .resolve()
        .unwrap();
        assert_eq!("orders", stack.name);
        assert_eq!("dev", stack.stack);
        assert!(stack.args.app_settings.is_some());
        assert_eq!(None, stack.args.maximum_instance_count);
    }

    #[test]
    fn flags_override_the_stack_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(
            br#"
name = "from-file"
resource_group_name = "rg-file"
runtime = { name = "python", version = "3.11" }
maximum_instance_count = 40
instance_memory_mb = 4096
"#,
        )
        .unwrap();
        let path = file.into_temp_path();
        let config = path.to_str().unwrap();

        let stack = parse(&["--config", config, "--maximum-instance-count", "5"])
            .resolve()
            .unwrap();
        assert_eq!("from-file", stack.name);
        assert_eq!(Some(5), stack.args.maximum_instance_count);
        assert_eq!(Some(4096), stack.args.instance_memory_mb);
        assert!(stack.args.app_settings.is_none());
    }

    #[test]
    fn missing_runtime_is_reported() {
        let err = parse(&["--name", "orders", "--resource-group", "rg"])
            .resolve()
            .unwrap_err();
        assert!(err.to_string().contains("No runtime"));
    }

    #[test]
    fn invalid_runtime_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from(["flexfn", "--runtime", "cobol"]);
        assert!(result.is_err());
    }
}
