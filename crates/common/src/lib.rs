//! Code shared by the flexfn CLI commands.

#![deny(missing_docs)]

pub mod cli;
pub mod ui;
