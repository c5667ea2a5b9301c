//! Commands for the flexfn CLI.

/// Command to print the order a function app would be torn down in.
pub mod destroy;
/// Commands for flexfn maintenance tasks.
pub mod maintenance;
/// Command to preview the resources a function app declares.
pub mod preview;
/// Component parameters shared by the commands.
pub mod stack;

/// How command results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Table,
    /// JSON, for scripting.
    Json,
}
