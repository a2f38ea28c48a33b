//! Regex patterns for check-line extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Number token following a keyword: optional minus, digits, optional `.`/`,` fraction.
pub const NUMBER_TOKEN: &str = r"-?[0-9]+(?:[.,][0-9]+)?";

/// Builds the "keyword, filler, number" pattern for one keyword.
///
/// Case folding is ASCII-only for the keyword, so `ſtatt` or a Kelvin-sign `K`
/// do not match; word boundaries stay Unicode-aware.
fn labeled_number(keyword: &str) -> Regex {
    Regex::new(&format!(r"\b(?i-u:{keyword})\b[^0-9-]*({NUMBER_TOKEN})")).unwrap()
}

lazy_static! {
    // First reserved keyword, used to cut the item label
    pub static ref ANY_KEYWORD: Regex = Regex::new(
        r"\b(?i-u:ek|vk|wkz|menge|aktion|statt)\b"
    ).unwrap();

    // Purchase price (Einkaufspreis)
    pub static ref EK: Regex = labeled_number("ek");

    // Sale price (Verkaufspreis)
    pub static ref VK: Regex = labeled_number("vk");

    // Promotional fund (Werbekostenzuschuss)
    pub static ref WKZ: Regex = labeled_number("wkz");

    // Quantity
    pub static ref MENGE: Regex = labeled_number("menge");

    // Promotional sale price
    pub static ref AKTION: Regex = labeled_number("aktion");

    // Reference price ("instead of")
    pub static ref STATT: Regex = labeled_number("statt");

    // Trailing separators left over after cutting the item label
    pub static ref TRAILING_SEPARATORS: Regex = Regex::new(r"[:,-]+$").unwrap();

    // Leading numeric prefix of a free-form string, after comma normalization.
    // Groups: mantissa, optional exponent.
    pub static ref LEADING_NUMBER: Regex = Regex::new(
        r"^([+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+))(?:[eE]([+-]?[0-9]+))?"
    ).unwrap();
}
