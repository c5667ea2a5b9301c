use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use flexfn_common::ui::quoted_path;
use flexfn_engine::{preview, simulator::AzureSimulator, Deployment, Graph, Operation, Plan};
use flexfn_output::Urn;
use serde::{Deserialize, Serialize};

use super::{stack::StackArgs, OutputFormat};

const SUBSCRIPTION_ENV: &str = "FLEXFN_SUBSCRIPTION_ID";

/// Preview the resources a function app declares, with simulated provider
/// outputs.
#[derive(Parser, Debug)]
pub struct PreviewCommand {
    #[clap(flatten)]
    pub stack: StackArgs,

    /// Subscription the simulated resources are placed in.
    #[clap(long = "subscription-id", env = SUBSCRIPTION_ENV)]
    pub subscription_id: Option<String>,

    /// A JSON preview saved earlier; prints what would change since then.
    #[clap(long = "compare")]
    pub compare: Option<PathBuf>,

    /// Output format.
    #[clap(long = "format", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Everything a preview found out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewReport {
    /// Resources grouped into the waves they are created in.
    pub waves: Vec<Vec<Urn>>,
    /// `(dependent, dependency)` pairs.
    pub edges: Vec<Edge>,
    /// The resolved resources and component outputs.
    pub deployment: Deployment,
    /// Changes since the compared preview, if one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

/// One dependency edge.
#[derive(Debug, Serialize)]
pub struct Edge {
    /// The resource that waits.
    pub dependent: Urn,
    /// The resource it waits for.
    pub dependency: Urn,
}

/// The part of a saved report needed to compare against it.
#[derive(Deserialize)]
struct SavedReport {
    deployment: Deployment,
}

impl PreviewCommand {
    pub async fn run(self) -> Result<()> {
        let (ctx, component) = self.stack.resolve()?.declare()?;

        let graph = Graph::from_context(&ctx)?;
        let waves: Vec<Vec<Urn>> = graph
            .waves()?
            .into_iter()
            .map(|wave| wave.into_iter().map(|d| d.urn().clone()).collect::<Vec<_>>())
            .collect();
        let edges: Vec<Edge> = graph
            .edges()
            .into_iter()
            .map(|(dependent, dependency)| Edge {
                dependent: dependent.clone(),
                dependency: dependency.clone(),
            })
            .collect();

        let simulator = match &self.subscription_id {
            Some(id) => AzureSimulator::new(id),
            None => AzureSimulator::default(),
        };
        tracing::info!(component = %component.urn(), "Previewing");
        let deployment = preview(&ctx, &simulator)
            .await
            .context("Preview failed")?;

        let plan = match &self.compare {
            Some(path) => Some(Plan::between(&load_saved(path)?, &deployment)),
            None => None,
        };

        let report = PreviewReport {
            waves,
            edges,
            deployment,
            plan,
        };
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Table => print_report(&report, component.urn()),
        }
        Ok(())
    }
}

fn load_saved(path: &Path) -> Result<Deployment> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read saved preview {}", quoted_path(path)))?;
    let saved: SavedReport = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse saved preview {}", quoted_path(path)))?;
    Ok(saved.deployment)
}

fn print_report(report: &PreviewReport, component: &Urn) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Wave").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Depends on").fg(Color::Cyan),
        Cell::new("ID").fg(Color::Cyan),
    ]);
    for (index, wave) in report.waves.iter().enumerate() {
        for urn in wave {
            let Some(state) = report.deployment.resource(urn) else {
                continue;
            };
            let dependencies = state
                .dependencies
                .iter()
                .map(Urn::name)
                .collect::<Vec<_>>()
                .join("\n");
            table.add_row(vec![
                Cell::new(index),
                Cell::new(&state.type_token),
                Cell::new(&state.name),
                Cell::new(dependencies),
                Cell::new(&state.id),
            ]);
        }
    }
    println!("{table}");

    if let Some(outputs) = report
        .deployment
        .component_outputs(component)
        .and_then(|outputs| outputs.as_object())
    {
        println!("\nOutputs of {}:", component.name());
        for (key, value) in outputs {
            println!("    {key}: {value}");
        }
    }

    if let Some(plan) = &report.plan {
        if plan.is_noop() {
            println!("\nNo changes.");
        } else {
            println!("\nChanges:");
            for step in plan.changes() {
                let summary = match &step.operation {
                    Operation::Create => "create".to_string(),
                    Operation::Update { changed } => format!("update ({})", changed.join(", ")),
                    Operation::Delete => "delete".to_string(),
                    Operation::Same => continue,
                };
                println!("    {summary:<8} {}", step.urn);
            }
        }
    }
}
