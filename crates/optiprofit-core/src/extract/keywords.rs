//! Keyword-driven extraction of a single check line.
//!
//! Recognized keywords (case-insensitive, whole words): `ek`, `vk`, `wkz`,
//! `menge`, `aktion`, `statt`. Each is followed by optional filler and a
//! number; the first match per keyword wins.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::pricing::ParsedInput;

use super::numbers::parse_number;
use super::patterns::{AKTION, ANY_KEYWORD, EK, MENGE, STATT, TRAILING_SEPARATORS, VK, WKZ};

/// Extract the structured fields from one free-text line.
///
/// Never fails: unrecognized input yields absent fields and `menge = 1`.
pub fn parse_input(text: &str) -> ParsedInput {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return ParsedInput::default();
    }

    let ek = extract_after(cleaned, &EK);
    let vk = extract_after(cleaned, &VK);
    let wkz = extract_after(cleaned, &WKZ);
    let menge = extract_after(cleaned, &MENGE);
    let aktion_vk = extract_after(cleaned, &AKTION);
    let vk_normal = extract_after(cleaned, &STATT);

    let parsed = ParsedInput {
        item: guess_item(cleaned),
        ek,
        // A stated promotional price is the one actually charged
        vk: aktion_vk.or(vk),
        vk_normal,
        wkz_total: wkz,
        menge: menge.unwrap_or(Decimal::ONE),
        notes: None,
    };

    debug!(
        item = ?parsed.item,
        ek = ?parsed.ek,
        vk = ?parsed.vk,
        "Parsed check line of {} characters",
        cleaned.len()
    );

    parsed
}

/// Guess the product label: everything before the first keyword.
///
/// When the line starts with a keyword (or has none) the whole line is used.
pub fn guess_item(text: &str) -> Option<String> {
    let raw = match ANY_KEYWORD.find(text) {
        Some(m) if m.start() > 0 => &text[..m.start()],
        _ => text,
    };

    let trimmed = TRAILING_SEPARATORS.replace(raw.trim(), "");
    let trimmed = trimmed.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Number captured after a keyword pattern, if any.
fn extract_after(text: &str, label: &Regex) -> Option<Decimal> {
    let caps = label.captures(text)?;
    parse_number(caps.get(1)?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_input(""), ParsedInput::default());
        assert_eq!(parse_input("   \t "), ParsedInput::default());
    }

    #[test]
    fn test_basic_line() {
        let parsed = parse_input("Monster EK 0,89 VK 1,29");
        assert_eq!(parsed.item.as_deref(), Some("Monster"));
        assert_eq!(parsed.ek, Some(dec("0.89")));
        assert_eq!(parsed.vk, Some(dec("1.29")));
        assert_eq!(parsed.vk_normal, None);
        assert_eq!(parsed.wkz_total, None);
        assert_eq!(parsed.menge, Decimal::ONE);
    }

    #[test]
    fn test_decimal_separators_are_equivalent() {
        let comma = parse_input("EK 0,89 VK 1,29");
        let dot = parse_input("EK 0.89 VK 1.29");
        assert_eq!(comma.ek, Some(dec("0.89")));
        assert_eq!(comma.vk, Some(dec("1.29")));
        assert_eq!(comma.ek, dot.ek);
        assert_eq!(comma.vk, dot.vk);
    }

    #[test]
    fn test_aktion_overrides_vk() {
        let parsed = parse_input("Kasten Wasser EK 3,90 Aktion 4,49 statt 4,99");
        assert_eq!(parsed.item.as_deref(), Some("Kasten Wasser"));
        assert_eq!(parsed.ek, Some(dec("3.90")));
        assert_eq!(parsed.vk, Some(dec("4.49")));
        assert_eq!(parsed.vk_normal, Some(dec("4.99")));

        let parsed = parse_input("VK 1,29 Aktion 0,99");
        assert_eq!(parsed.vk, Some(dec("0.99")));
    }

    #[test]
    fn test_wkz_and_menge() {
        let parsed = parse_input("Red Bull EK 0,72 VK 1,19 WKZ 200 Menge 1000");
        assert_eq!(parsed.item.as_deref(), Some("Red Bull"));
        assert_eq!(parsed.wkz_total, Some(dec("200")));
        assert_eq!(parsed.menge, dec("1000"));
    }

    #[test]
    fn test_menge_defaults_to_one() {
        assert_eq!(parse_input("Cola EK 0,50 VK 0,99").menge, Decimal::ONE);
        assert_eq!(parse_input("Cola Menge viele").menge, Decimal::ONE);
        assert_eq!(parse_input("Menge: -").menge, Decimal::ONE);
    }

    #[test]
    fn test_menge_zero_is_kept() {
        assert_eq!(parse_input("EK 1 VK 2 Menge 0").menge, Decimal::ZERO);
    }

    #[test]
    fn test_case_insensitive_keywords_and_filler() {
        let parsed = parse_input("Chips ek: 1,10 vk = 1,79 wKz: EUR 50");
        assert_eq!(parsed.ek, Some(dec("1.10")));
        assert_eq!(parsed.vk, Some(dec("1.79")));
        assert_eq!(parsed.wkz_total, Some(dec("50")));
    }

    #[test]
    fn test_negative_values_are_extracted() {
        let parsed = parse_input("Test EK -1,5 VK 2");
        assert_eq!(parsed.ek, Some(dec("-1.5")));
    }

    #[test]
    fn test_first_match_wins() {
        let parsed = parse_input("EK 1,00 EK 2,00 VK 3,00 VK 4,00");
        assert_eq!(parsed.ek, Some(dec("1.00")));
        assert_eq!(parsed.vk, Some(dec("3.00")));
    }

    #[test]
    fn test_keywords_must_be_whole_words() {
        // "vkp" and "Brekkie" contain keyword letters but are not keywords
        let parsed = parse_input("Brekkie vkp 2,00");
        assert_eq!(parsed.ek, None);
        assert_eq!(parsed.vk, None);
        assert_eq!(parsed.item.as_deref(), Some("Brekkie vkp 2,00"));
    }

    #[test]
    fn test_keywords_fold_ascii_case_only() {
        // long s (U+017F) and Kelvin sign (U+212A) fold to "s" and "k" under Unicode rules
        let parsed = parse_input("Wasser E\u{212A} 3,90 VK 4,49 \u{17F}tatt 4,99");
        assert_eq!(parsed.ek, None);
        assert_eq!(parsed.vk_normal, None);
        assert_eq!(parsed.vk, Some(dec("4.49")));
        assert_eq!(guess_item("Wasser E\u{212A} 3,90 VK 4,49"), Some("Wasser E\u{212A} 3,90".to_string()));

        let parsed = parse_input("wasser eK 3,90 vK 4,49 STATT 4,99");
        assert_eq!(parsed.ek, Some(dec("3.90")));
        assert_eq!(parsed.vk_normal, Some(dec("4.99")));
    }

    #[test]
    fn test_filler_may_skip_past_other_keywords() {
        // Filler is anything but digits and '-', so "EK VK 1,29" binds 1,29 to both
        let parsed = parse_input("EK VK 1,29");
        assert_eq!(parsed.ek, Some(dec("1.29")));
        assert_eq!(parsed.vk, Some(dec("1.29")));
    }

    #[test]
    fn test_unparsable_number_is_absent() {
        let parsed = parse_input("EK 99999999999999999999999999999999 VK 1");
        assert_eq!(parsed.ek, None);
        assert_eq!(parsed.vk, Some(dec("1")));
    }

    #[test]
    fn test_guess_item() {
        assert_eq!(guess_item("Monster EK 0,89"), Some("Monster".to_string()));
        assert_eq!(guess_item("Monster: EK 0,89"), Some("Monster".to_string()));
        assert_eq!(guess_item("Monster -, EK 0,89"), Some("Monster".to_string()));
        assert_eq!(guess_item("Nur ein Produkt"), Some("Nur ein Produkt".to_string()));
        assert_eq!(guess_item(": EK 1"), None);
    }

    #[test]
    fn test_leading_keyword_keeps_whole_line_as_item() {
        let parsed = parse_input("EK 0,89 VK 1,29");
        assert_eq!(parsed.item.as_deref(), Some("EK 0,89 VK 1,29"));
    }

    #[test]
    fn test_idempotent() {
        let text = "Red Bull EK 0,72 Aktion 1,19 statt 1,29 WKZ 200 Menge 1000";
        assert_eq!(parse_input(text), parse_input(text));
    }
}
