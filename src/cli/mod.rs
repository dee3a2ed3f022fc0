//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};

/// Vigil - screen-session supervisor.
#[derive(Debug, Parser)]
#[command(name = "vigil", version, about, long_about = None)]
pub struct Cli {
    /// Emit machine-readable JSON output where supported
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default configuration and a sample region file
    Init(commands::init::InitArgs),
    /// Run the supervisor loop
    Run(commands::run::RunArgs),
    /// Show recent status journal entries
    Status(commands::status::StatusArgs),
}

/// Render a top-level error and exit nonzero.
pub fn handle_error(err: &anyhow::Error, json: bool) {
    if json {
        eprintln!("{}", serde_json::json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
