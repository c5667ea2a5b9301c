//! Common CLI code and constants

use clap::builder::{styling::AnsiColor, Styles};

/// Clap [`Styles`] for the flexfn CLI.
pub const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Blue.on_default());
