use anyhow::{Context as _, Result};
use clap::Parser;
use flexfn_engine::{preview, simulator::AzureSimulator, Plan};

use super::{stack::StackArgs, OutputFormat};

/// Print the order a function app's resources would be deleted in.
///
/// Nothing is deleted: the resources are resolved with simulated provider
/// outputs and listed dependents first.
#[derive(Parser, Debug)]
pub struct DestroyCommand {
    #[clap(flatten)]
    pub stack: StackArgs,

    /// Output format.
    #[clap(long = "format", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl DestroyCommand {
    pub async fn run(self) -> Result<()> {
        let (ctx, component) = self.stack.resolve()?.declare()?;
        let deployment = preview(&ctx, &AzureSimulator::default())
            .await
            .context("Preview failed")?;
        let plan = Plan::teardown(&deployment);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            OutputFormat::Table => {
                println!(
                    "Deleting {} resources of {} (dependents first):",
                    plan.steps().len(),
                    component.urn().name()
                );
                for (index, step) in plan.steps().iter().enumerate() {
                    let id = deployment
                        .resource(&step.urn)
                        .map(|state| state.id.as_str())
                        .unwrap_or_default();
                    println!("{:>4}. {}  {id}", index + 1, step.urn.type_token());
                }
            }
        }
        Ok(())
    }
}
