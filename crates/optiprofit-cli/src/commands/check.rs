//! Check and parse commands for a single line.

use clap::Args;
use console::style;
use tracing::{debug, warn};

use optiprofit_core::check::{self, CheckOutcome};
use optiprofit_core::extract::{Extractor, ParseResponse};
use optiprofit_core::{ExtractorKind, HistoryStore, InputExtractor, OptiConfig};

use super::{ExtractorArg, OutputFormat, format_check_text, history_store, load_config, parsed_summary};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Check line; several words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    /// Extractor to use (defaults to the configured one)
    #[arg(short, long, value_enum)]
    extractor: Option<ExtractorArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Do not record the check in the history
    #[arg(long)]
    no_history: bool,
}

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Check line; several words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    /// Extractor to use (defaults to the configured one)
    #[arg(short, long, value_enum)]
    extractor: Option<ExtractorArg>,
}

/// Resolve the extractor from the flag or the configuration.
pub(crate) fn build_extractor(
    arg: Option<ExtractorArg>,
    config: &OptiConfig,
) -> anyhow::Result<Extractor> {
    let kind = arg
        .map(ExtractorKind::from)
        .unwrap_or(config.extraction.default_extractor);
    debug!("Using {} extractor", kind);
    Ok(Extractor::from_config(kind, config)?)
}

pub async fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let extractor = build_extractor(args.extractor, &config)?;
    let text = args.text.join(" ");

    let outcome = check::check(&text, &extractor).await?;

    let check = match outcome {
        CheckOutcome::Checked(check) => check,
        incomplete => {
            if args.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&incomplete)?);
            } else if let CheckOutcome::NeedsPrices { parsed } = &incomplete {
                println!("{}", parsed_summary(parsed));
            }
            let notice = incomplete.notice().unwrap_or_default();
            anyhow::bail!("{}", notice);
        }
    };

    match args.format {
        OutputFormat::Json => {
            let view = serde_json::json!({
                "check": &check,
                "recommendation": check.recommendation().map(|r| r.message()),
                "tone": check.tone(),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Text => print!("{}", format_check_text(&check)),
    }

    if !args.no_history {
        let store = history_store(&config);
        let now = chrono::Utc::now().timestamp_millis();
        let entry = check.into_history_entry(format!("h_{now}"), now);
        match store.save(entry) {
            Ok(entries) => debug!("History now holds {} entries", entries.len()),
            Err(e) => {
                warn!("Could not save history: {}", e);
                eprintln!("{} History not saved: {}", style("!").yellow(), e);
            }
        }
    }

    Ok(())
}

pub async fn run_parse(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let extractor = build_extractor(args.extractor, &config)?;
    let text = args.text.join(" ");

    if text.trim().is_empty() {
        anyhow::bail!("{}", check::NOTICE_EMPTY);
    }

    let parsed = extractor.extract(text.trim()).await?;
    println!("{}", serde_json::to_string_pretty(&ParseResponse::from(parsed))?);

    Ok(())
}
