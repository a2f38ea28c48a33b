//! WASM bindings for retail price checks.
//!
//! This crate exposes the local extractor, the calculator and the bounded
//! history list to browsers and JS-based mobile front ends.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use optiprofit_core::check::{CheckOutcome, check_local};
use optiprofit_core::extract::numbers::{format_amount, format_percent};
use optiprofit_core::history::History;
use optiprofit_core::models::pricing::ParsedInput;
use optiprofit_core::{HistoryEntry, Recommendation, Tone};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Serialize with `null` for absent fields, as JSON consumers expect.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract the fields of one check line.
#[wasm_bindgen]
pub fn parse_input(text: &str) -> Result<JsValue, JsValue> {
    to_js(&optiprofit_core::parse_input(text))
}

/// Calculate the figures for an extracted (or remotely parsed) input.
#[wasm_bindgen]
pub fn calculate(parsed: JsValue) -> Result<JsValue, JsValue> {
    let parsed: ParsedInput = from_js(parsed)?;
    to_js(&optiprofit_core::calculate(&parsed))
}

/// Check outcome flattened for display.
#[derive(Serialize)]
struct CheckView {
    outcome: CheckOutcome,
    notice: Option<&'static str>,
    recommendation: Option<&'static str>,
    tone: Tone,
}

impl From<CheckOutcome> for CheckView {
    fn from(outcome: CheckOutcome) -> Self {
        let (recommendation, tone) = match &outcome {
            CheckOutcome::Checked(check) => (
                check.recommendation().map(|r| r.message()),
                check.tone(),
            ),
            _ => (None, Tone::Neutral),
        };

        Self {
            notice: outcome.notice(),
            outcome,
            recommendation,
            tone,
        }
    }
}

/// Run a full local check.
#[wasm_bindgen]
pub fn check(text: &str) -> Result<JsValue, JsValue> {
    to_js(&CheckView::from(check_local(text)))
}

/// Newest-first history list capped at a fixed number of entries.
#[wasm_bindgen]
pub struct HistoryList {
    history: History,
}

#[wasm_bindgen]
impl HistoryList {
    /// Create a history list; `limit` defaults to 200.
    #[wasm_bindgen(constructor)]
    pub fn new(limit: Option<usize>) -> Self {
        let history = match limit {
            Some(limit) => History::with_limit(limit),
            None => History::new(),
        };
        Self { history }
    }

    /// Restore entries previously returned by [`HistoryList::entries`].
    #[wasm_bindgen]
    pub fn load(&mut self, entries: JsValue) -> Result<(), JsValue> {
        let entries: Vec<HistoryEntry> = from_js(entries)?;
        self.history = History::from_entries(entries, self.history.limit());
        Ok(())
    }

    /// Check a line and, when complete, record it. Returns the check view.
    #[wasm_bindgen]
    pub fn record(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let outcome = check_local(text);
        if let CheckOutcome::Checked(check) = &outcome {
            let now = js_sys::Date::now() as i64;
            self.history
                .push(check.clone().into_history_entry(format!("h_{now}"), now));
        }
        to_js(&CheckView::from(outcome))
    }

    /// All entries, newest first.
    #[wasm_bindgen]
    pub fn entries(&self) -> Result<JsValue, JsValue> {
        to_js(&self.history.entries())
    }

    #[wasm_bindgen]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Display helpers.
#[wasm_bindgen]
pub struct PriceFormat;

#[wasm_bindgen]
impl PriceFormat {
    /// Fixed-digit amount, `-` when absent.
    #[wasm_bindgen]
    pub fn amount(value: Option<f64>, digits: u32) -> String {
        format_amount(value.and_then(Decimal::from_f64), digits)
    }

    /// One-digit percentage, `-` when absent.
    #[wasm_bindgen]
    pub fn percent(value: Option<f64>) -> String {
        format_percent(value.and_then(Decimal::from_f64))
    }

    /// Advice text for a unit margin and margin percentage.
    #[wasm_bindgen]
    pub fn recommendation(db: Option<f64>, marge_pct: Option<f64>) -> Option<String> {
        let result = optiprofit_core::CalcResult {
            db: db.and_then(Decimal::from_f64),
            marge_pct: marge_pct.and_then(Decimal::from_f64),
            ..Default::default()
        };
        Recommendation::for_result(&result).map(|r| r.message().to_string())
    }
}
