//! Wire payload shared by the parse proxy and its clients.
//!
//! Remote parsers answer with camelCase keys and loosely typed values
//! (numbers may arrive as strings like `"0,89"`). Incoming payloads are
//! normalized with the same rules as the local extractor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::pricing::ParsedInput;

use super::numbers::{normalize_text, normalize_value};

/// Untrusted parse result as received from a model or the proxy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayload {
    pub item: Value,
    pub ek: Value,
    pub vk: Value,
    pub vk_normal: Value,
    pub wkz_total: Value,
    pub menge: Value,
    pub notes: Value,
}

impl RawPayload {
    /// Normalize into the shared [`ParsedInput`] shape.
    pub fn into_parsed(self) -> ParsedInput {
        ParsedInput {
            item: normalize_text(&self.item),
            ek: normalize_value(&self.ek),
            vk: normalize_value(&self.vk),
            vk_normal: normalize_value(&self.vk_normal),
            wkz_total: normalize_value(&self.wkz_total),
            menge: normalize_value(&self.menge).unwrap_or(Decimal::ONE),
            notes: normalize_text(&self.notes),
        }
    }
}

/// Parse result as served by the proxy's `/parse` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub item: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub ek: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub vk: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub vk_normal: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub wkz_total: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub menge: Decimal,
    pub notes: Option<String>,
}

impl From<ParsedInput> for ParseResponse {
    fn from(parsed: ParsedInput) -> Self {
        Self {
            item: parsed.item,
            ek: parsed.ek,
            vk: parsed.vk,
            vk_normal: parsed.vk_normal,
            wkz_total: parsed.wkz_total,
            menge: parsed.menge,
            notes: parsed.notes,
        }
    }
}
