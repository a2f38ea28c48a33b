//! Subcommands and the helpers they share.

pub mod batch;
pub mod check;
pub mod config;
pub mod history;
pub mod serve;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::debug;

use optiprofit_core::extract::numbers::{format_amount, format_percent};
use optiprofit_core::{Check, ExtractorKind, JsonFileStore, OptiConfig, ParsedInput};

/// Extractor choice on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtractorArg {
    /// Local keyword rules
    Local,
    /// Language model (needs the API key env var)
    Llm,
    /// Running parse proxy
    Backend,
}

impl From<ExtractorArg> for ExtractorKind {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::Local => ExtractorKind::Local,
            ExtractorArg::Llm => ExtractorKind::Llm,
            ExtractorArg::Backend => ExtractorKind::Backend,
        }
    }
}

/// Output format for single results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("optiprofit")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<OptiConfig> {
    let config = match config_path {
        Some(path) => OptiConfig::from_file(Path::new(path))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Using config file {}", path.display());
                OptiConfig::from_file(&path)?
            } else {
                OptiConfig::default()
            }
        }
    };
    Ok(config.with_env_overrides())
}

/// History store as configured.
pub fn history_store(config: &OptiConfig) -> JsonFileStore {
    let path = config.history.path.clone().unwrap_or_else(|| {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        JsonFileStore::default_path(&data_dir)
    });
    JsonFileStore::new(path).with_limit(config.history.limit)
}

/// One-line summary of the extracted prices.
pub fn parsed_summary(parsed: &ParsedInput) -> String {
    format!(
        "EK {} | VK {} | Menge {}",
        format_amount(parsed.ek, 2),
        format_amount(parsed.vk, 2),
        parsed.menge.normalize()
    )
}

/// Multi-line text rendering of a completed check.
pub fn format_check_text(check: &Check) -> String {
    let r = &check.result;
    let mut output = String::new();

    if let Some(item) = &check.parsed.item {
        output.push_str(&format!("{}\n", item));
    }
    output.push_str(&format!("{}\n", parsed_summary(&check.parsed)));
    if let Some(normal) = check.parsed.vk_normal {
        output.push_str(&format!("Normalpreis {}\n", format_amount(Some(normal), 2)));
    }
    if let Some(wkz) = check.parsed.wkz_total {
        output.push_str(&format!("WKZ gesamt {}\n", format_amount(Some(wkz), 2)));
    }
    output.push('\n');

    let lines = [
        ("DB pro Stueck", format_amount(r.db, 2)),
        ("Marge", format_percent(r.marge_pct)),
        ("Gewinn / 100 Stk", format_amount(r.gewinn_100, 2)),
        ("WKZ pro Stueck", format_amount(r.wkz_einheit, 2)),
        ("DB netto", format_amount(r.db_netto, 2)),
        ("DB normal", format_amount(r.db_norm, 2)),
        ("DB Aktion", format_amount(r.db_akt, 2)),
        ("DB Differenz", format_amount(r.db_diff, 2)),
        ("Break-even Menge", format_amount(r.break_even_menge, 0)),
    ];
    for (label, value) in lines {
        output.push_str(&format!("  {:<18}{:>12}\n", label, value));
    }

    if let Some(recommendation) = check.recommendation() {
        output.push_str(&format!("\n{}\n", recommendation.message()));
    }

    output
}
