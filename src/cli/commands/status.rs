//! `vigil status` - render recent status journal entries.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::status_journal::StatusJournal;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Load configuration from this file instead of the .vigil hierarchy
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of entries to show
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

pub fn execute(args: &StatusArgs, json: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let journal = StatusJournal::new(&config.journal, &config.markers);
    let entries = journal.recent(args.limit)?;

    if json {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "timestamp": e.timestamp,
                    "focus": e.focus,
                    "status": e.status,
                    "instruction": e.instruction_prefix,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No status entries yet. The journal fills as interventions are dispatched.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Timestamp", "Focus", "Status", "Instruction"]);
    for entry in &entries {
        table.add_row([
            Cell::new(&entry.timestamp),
            Cell::new(&entry.focus),
            Cell::new(&entry.status),
            Cell::new(&entry.instruction_prefix),
        ]);
    }
    println!("{table}");
    Ok(())
}
