//! The check pipeline: extract, apply the EK/VK policy, calculate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calc::calculate;
use crate::extract::{self, InputExtractor, parse_input};
use crate::models::history::HistoryEntry;
use crate::models::pricing::{CalcResult, ParsedInput};

/// Notice shown when nothing was entered.
pub const NOTICE_EMPTY: &str = "Bitte einen Text eingeben.";

/// Notice shown when EK or VK could not be extracted.
pub const NOTICE_MISSING_PRICES: &str = "Bitte EK und VK angeben.";

/// Margin percentage below which a margin is considered thin.
const THIN_MARGIN_PCT: i64 = 10;

/// A completed check with all figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Trimmed input text.
    pub input: String,
    pub parsed: ParsedInput,
    pub result: CalcResult,
}

/// Outcome of one check action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// No text was entered.
    NeedsInput,
    /// Text was entered but EK or VK is missing.
    NeedsPrices { parsed: ParsedInput },
    /// Both prices were found and the figures calculated.
    Checked(Check),
}

impl CheckOutcome {
    /// User-facing notice for incomplete checks.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            CheckOutcome::NeedsInput => Some(NOTICE_EMPTY),
            CheckOutcome::NeedsPrices { .. } => Some(NOTICE_MISSING_PRICES),
            CheckOutcome::Checked(_) => None,
        }
    }

    /// The completed check, if any.
    pub fn into_check(self) -> Option<Check> {
        match self {
            CheckOutcome::Checked(check) => Some(check),
            _ => None,
        }
    }
}

/// Display tone of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Good,
    Warn,
    Neutral,
}

/// Short advice derived from the figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Selling below purchase price.
    BelowCost,
    /// Margin under ten percent.
    ThinMargin,
    /// Nothing to worry about.
    Solid,
}

impl Recommendation {
    /// Derive the advice; absent when there is no unit margin.
    pub fn for_result(result: &CalcResult) -> Option<Self> {
        let db = result.db?;
        if db < Decimal::ZERO {
            return Some(Recommendation::BelowCost);
        }
        match result.marge_pct {
            Some(pct) if pct < Decimal::from(THIN_MARGIN_PCT) => Some(Recommendation::ThinMargin),
            _ => Some(Recommendation::Solid),
        }
    }

    /// German advice text.
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::BelowCost => "Achtung: Verkauf unter EK.",
            Recommendation::ThinMargin => "Marge ist knapp, Aktion pruefen.",
            Recommendation::Solid => "Preis wirkt solide. Aktion nur wenn noetig.",
        }
    }
}

impl Tone {
    /// Tone for a result: warn below cost, good otherwise, neutral without a margin.
    pub fn for_result(result: &CalcResult) -> Self {
        match result.db {
            None => Tone::Neutral,
            Some(db) if db < Decimal::ZERO => Tone::Warn,
            Some(_) => Tone::Good,
        }
    }
}

impl Check {
    pub fn recommendation(&self) -> Option<Recommendation> {
        Recommendation::for_result(&self.result)
    }

    pub fn tone(&self) -> Tone {
        Tone::for_result(&self.result)
    }

    /// Build the history record for this check.
    pub fn into_history_entry(self, id: impl Into<String>, created_at: i64) -> HistoryEntry {
        HistoryEntry {
            id: id.into(),
            created_at,
            input: self.input,
            parsed: self.parsed,
            result: self.result,
        }
    }
}

/// Run a check with the given extractor.
///
/// Only remote extractors can fail; an incomplete line is an outcome, not an error.
pub async fn check<E: InputExtractor>(text: &str, extractor: &E) -> extract::Result<CheckOutcome> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(CheckOutcome::NeedsInput);
    }

    let parsed = extractor.extract(trimmed).await?;
    debug!(extractor = extractor.name(), "Extracted check line");
    Ok(evaluate(trimmed, parsed))
}

/// Run a check with the local keyword extractor.
pub fn check_local(text: &str) -> CheckOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return CheckOutcome::NeedsInput;
    }
    evaluate(trimmed, parse_input(trimmed))
}

fn evaluate(trimmed: &str, parsed: ParsedInput) -> CheckOutcome {
    if !parsed.has_prices() {
        info!(missing = ?parsed.missing_prices(), "Check incomplete");
        return CheckOutcome::NeedsPrices { parsed };
    }

    let result = calculate(&parsed);
    CheckOutcome::Checked(Check {
        input: trimmed.to_string(),
        parsed,
        result,
    })
}
