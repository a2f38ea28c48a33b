//! Batch command - check every line of one or more text files.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, warn};

use optiprofit_core::check::{self, CheckOutcome};
use optiprofit_core::extract::Extractor;

use super::check::build_extractor;
use super::{ExtractorArg, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Write the CSV summary to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extractor to use (defaults to the configured one)
    #[arg(short, long, value_enum)]
    extractor: Option<ExtractorArg>,

    /// Continue when a line fails to extract
    #[arg(long)]
    continue_on_error: bool,
}

/// One row of the CSV summary.
#[derive(Debug, Serialize)]
struct BatchRow {
    file: String,
    line: usize,
    status: &'static str,
    item: String,
    ek: String,
    vk: String,
    menge: String,
    db: String,
    marge_pct: String,
    db_netto: String,
    break_even_menge: String,
    recommendation: String,
    message: String,
}

impl BatchRow {
    fn new(file: &str, line: usize, status: &'static str) -> Self {
        Self {
            file: file.to_string(),
            line,
            status,
            item: String::new(),
            ek: String::new(),
            vk: String::new(),
            menge: String::new(),
            db: String::new(),
            marge_pct: String::new(),
            db_netto: String::new(),
            break_even_menge: String::new(),
            recommendation: String::new(),
            message: String::new(),
        }
    }

    fn from_outcome(file: &str, line: usize, outcome: CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Checked(check) => {
                let recommendation = check.recommendation();
                let r = &check.result;
                Self {
                    item: check.parsed.item.clone().unwrap_or_default(),
                    ek: cell(check.parsed.ek),
                    vk: cell(check.parsed.vk),
                    menge: cell(Some(check.parsed.menge)),
                    db: cell(r.db),
                    marge_pct: cell(r.marge_pct.map(|v| v.round_dp(1))),
                    db_netto: cell(r.db_netto),
                    break_even_menge: cell(r.break_even_menge),
                    recommendation: recommendation
                        .map(|rec| rec.message().to_string())
                        .unwrap_or_default(),
                    ..Self::new(file, line, "checked")
                }
            }
            incomplete => {
                let message = incomplete.notice().unwrap_or_default().to_string();
                let mut row = Self::new(file, line, "incomplete");
                if let CheckOutcome::NeedsPrices { parsed } = incomplete {
                    row.item = parsed.item.unwrap_or_default();
                    row.ek = cell(parsed.ek);
                    row.vk = cell(parsed.vk);
                    row.menge = cell(Some(parsed.menge));
                }
                row.message = message;
                row
            }
        }
    }
}

fn cell(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_default()
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let extractor = build_extractor(args.extractor, &config)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let mut lines = Vec::new();
    for path in &files {
        let content = fs::read_to_string(path)?;
        let name = path.display().to_string();
        for (index, line) in content.lines().enumerate() {
            if !line.trim().is_empty() {
                lines.push((name.clone(), index + 1, line.to_string()));
            }
        }
    }

    eprintln!(
        "{} Found {} lines in {} files",
        style("ℹ").blue(),
        lines.len(),
        files.len()
    );

    let pb = ProgressBar::new(lines.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines")?
            .progress_chars("=>-"),
    );

    let mut rows = Vec::with_capacity(lines.len());
    for (file, line, text) in &lines {
        match check_line(text, &extractor).await {
            Ok(outcome) => rows.push(BatchRow::from_outcome(file, *line, outcome)),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to check {}:{}: {}", file, line, error_msg);
                    let mut row = BatchRow::new(file, *line, "error");
                    row.message = error_msg;
                    rows.push(row);
                } else {
                    pb.abandon();
                    error!("Failed to check {}:{}: {}", file, line, error_msg);
                    anyhow::bail!("Check failed: {}", error_msg);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    match &args.output {
        Some(path) => {
            write_summary(csv::Writer::from_path(path)?, &rows)?;
            eprintln!(
                "{} Summary written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => write_summary(csv::Writer::from_writer(io::stdout()), &rows)?,
    }

    let checked = rows.iter().filter(|r| r.status == "checked").count();
    eprintln!(
        "{} Checked {} lines in {:?}",
        style("✓").green(),
        rows.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} complete, {} incomplete or failed",
        style(checked).green(),
        style(rows.len() - checked).red()
    );

    Ok(())
}

async fn check_line(text: &str, extractor: &Extractor) -> anyhow::Result<CheckOutcome> {
    let outcome = check::check(text, extractor).await?;
    debug!("Checked line: {:?}", outcome.notice());
    Ok(outcome)
}

fn write_summary<W: io::Write>(mut wtr: csv::Writer<W>, rows: &[BatchRow]) -> anyhow::Result<()> {
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
