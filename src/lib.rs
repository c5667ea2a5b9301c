pub mod commands;
pub mod config;

use anyhow::{Context, Error};
use clap::Parser;
use commands::{destroy::DestroyCommand, maintenance::MaintenanceCommands, preview::PreviewCommand};

pub async fn run() -> anyhow::Result<()> {
    flexfn_telemetry::init().context("Failed to initialize telemetry")?;

    FlexFnApp::parse()
        .run()
        .await
        .inspect_err(|err| tracing::debug!(?err))
}

/// Declare and preview Flex Consumption function apps
#[derive(Parser)]
#[clap(
    name = "flexfn",
    version,
    styles = flexfn_common::cli::CLAP_STYLES,
    // Sort subcommands
    next_display_order = None,
)]
enum FlexFnApp {
    #[clap(alias = "p")]
    Preview(PreviewCommand),
    Destroy(DestroyCommand),
    #[clap(subcommand, hide = true)]
    Maintenance(MaintenanceCommands),
}

impl FlexFnApp {
    /// The main entry point to flexfn.
    pub async fn run(self) -> Result<(), Error> {
        match self {
            Self::Preview(cmd) => cmd.run().await,
            Self::Destroy(cmd) => cmd.run().await,
            Self::Maintenance(cmd) => cmd.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        FlexFnApp::command().debug_assert();
    }
}
