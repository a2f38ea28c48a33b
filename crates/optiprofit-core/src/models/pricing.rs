//! Extraction output and calculation results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured fields extracted from one free-text check line.
///
/// Every extractor produces this shape, so the calculator does not care which
/// one ran. `menge` is never absent: it is the parsed quantity or 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInput {
    /// Guessed product label (text before the first keyword).
    #[serde(default)]
    pub item: Option<String>,

    /// Purchase price per unit (EK).
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub ek: Option<Decimal>,

    /// Operative sale price per unit (VK, or the Aktion price when stated).
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vk: Option<Decimal>,

    /// Reference price ("statt").
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vk_normal: Option<Decimal>,

    /// Total promotional fund (WKZ) for the whole line.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub wkz_total: Option<Decimal>,

    /// Unit count; `null` reads as 1.
    #[serde(
        default = "default_menge",
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "menge_or_one"
    )]
    pub menge: Decimal,

    /// Free-text remarks; only remote extractors fill this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_menge() -> Decimal {
    Decimal::ONE
}

fn menge_or_one<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    rust_decimal::serde::float_option::deserialize(deserializer).map(|m| m.unwrap_or_else(default_menge))
}

impl Default for ParsedInput {
    fn default() -> Self {
        Self {
            item: None,
            ek: None,
            vk: None,
            vk_normal: None,
            wkz_total: None,
            menge: default_menge(),
            notes: None,
        }
    }
}

impl ParsedInput {
    /// Whether both prices needed for a margin check are present.
    pub fn has_prices(&self) -> bool {
        self.ek.is_some() && self.vk.is_some()
    }

    /// Names of the price fields still missing for a check.
    pub fn missing_prices(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.ek.is_none() {
            missing.push("ek");
        }
        if self.vk.is_none() {
            missing.push("vk");
        }
        missing
    }
}

/// Margin and break-even figures derived from a [`ParsedInput`].
///
/// Each field is absent whenever one of its inputs is absent or its
/// denominator guard fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcResult {
    /// Unit margin (Deckungsbeitrag): vk - ek.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub db: Option<Decimal>,

    /// Margin in percent of the sale price.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub marge_pct: Option<Decimal>,

    /// Profit per 100 units.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub gewinn_100: Option<Decimal>,

    /// Promotional fund allocated per unit.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub wkz_einheit: Option<Decimal>,

    /// Unit margin including the promotional allocation.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub db_netto: Option<Decimal>,

    /// Unit margin at the reference price.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub db_norm: Option<Decimal>,

    /// Unit margin at the active price; mirrors `db`.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub db_akt: Option<Decimal>,

    /// Margin given up per unit by the promotion.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub db_diff: Option<Decimal>,

    /// Units to sell before the promotional fund is recouped.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub break_even_menge: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_quantity_is_one() {
        let parsed = ParsedInput::default();
        assert_eq!(parsed.menge, Decimal::ONE);
        assert!(!parsed.has_prices());
        assert_eq!(parsed.missing_prices(), vec!["ek", "vk"]);
    }

    #[test]
    fn test_parsed_input_json_shape() {
        let parsed = ParsedInput {
            item: Some("Monster".to_string()),
            ek: Some(Decimal::new(89, 2)),
            vk: Some(Decimal::new(129, 2)),
            ..Default::default()
        };

        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "item": "Monster",
                "ek": 0.89,
                "vk": 1.29,
                "vk_normal": null,
                "wkz_total": null,
                "menge": 1.0,
            })
        );
    }

    #[test]
    fn test_missing_menge_deserializes_to_one() {
        let parsed: ParsedInput = serde_json::from_str(r#"{"item": null, "ek": 1.5}"#).unwrap();
        assert_eq!(parsed.menge, Decimal::ONE);
        assert_eq!(parsed.ek, Some(Decimal::new(15, 1)));
        assert_eq!(parsed.vk, None);
    }

    #[test]
    fn test_null_menge_deserializes_to_one() {
        let parsed: ParsedInput = serde_json::from_str(r#"{"ek": 1, "vk": 2, "menge": null}"#).unwrap();
        assert_eq!(parsed.menge, Decimal::ONE);

        let parsed: ParsedInput = serde_json::from_str(r#"{"menge": 24}"#).unwrap();
        assert_eq!(parsed.menge, Decimal::from(24));
    }
}
