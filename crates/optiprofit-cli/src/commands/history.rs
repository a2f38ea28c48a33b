//! History command - list or clear recorded checks.

use clap::{Args, Subcommand};
use console::style;

use optiprofit_core::extract::numbers::{format_amount, format_percent};
use optiprofit_core::{HistoryEntry, HistoryStore};

use super::{OutputFormat, history_store, load_config};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List recorded checks, newest first
    List {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove all recorded checks
    Clear,

    /// Show the history file path
    Path,
}

pub fn run(args: HistoryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = history_store(&config);

    match args.command {
        HistoryCommand::List { limit, format } => {
            let mut entries = store.load();
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
                OutputFormat::Text if entries.is_empty() => {
                    println!("{} No checks recorded yet.", style("ℹ").blue());
                }
                OutputFormat::Text => {
                    for entry in &entries {
                        println!("{}", format_entry(entry));
                    }
                }
            }
        }
        HistoryCommand::Clear => {
            store.clear()?;
            println!("{} History cleared", style("✓").green());
        }
        HistoryCommand::Path => {
            println!("History file: {}", store.path().display());
        }
    }

    Ok(())
}

/// One line per entry: timestamp, input and the headline figures.
fn format_entry(entry: &HistoryEntry) -> String {
    let when = entry
        .created_at_utc()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{}  {}  DB {}  Marge {}",
        when,
        entry.input,
        format_amount(entry.result.db, 2),
        format_percent(entry.result.marge_pct)
    )
}
