//! Core library for retail price checks.
//!
//! This crate provides:
//! - Keyword-driven field extraction from one free-text line (EK, VK, Aktion, statt, WKZ, Menge)
//! - Remote extractors backed by a language model or the parse proxy (feature `remote`)
//! - Margin, promotion and break-even calculation
//! - The check pipeline and a bounded, newest-first check history

pub mod error;
pub mod models;
pub mod extract;
pub mod calc;
pub mod check;
pub mod history;

pub use error::{OptiError, ExtractionError, HistoryError, Result};
pub use models::pricing::{ParsedInput, CalcResult};
pub use models::history::HistoryEntry;
pub use models::config::OptiConfig;
pub use extract::{parse_input, InputExtractor, LocalExtractor, ExtractorKind};
#[cfg(feature = "remote")]
pub use extract::{BackendExtractor, LlmExtractor};
pub use calc::calculate;
pub use check::{check, Check, CheckOutcome, Recommendation, Tone};
pub use history::{History, HistoryStore, JsonFileStore, HISTORY_LIMIT};
