//! Numeric normalization shared by all extractors, plus display helpers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

use super::patterns::LEADING_NUMBER;

/// Parse a number written with `.` or `,` as decimal separator.
///
/// Only the first `,` is replaced. The leading numeric prefix is used, so
/// `"0,89 EUR"` yields 0.89 and `"2,5e2"` yields 250; text without a numeric
/// prefix, or a value outside the decimal range, yields `None`.
pub fn parse_number(s: &str) -> Option<Decimal> {
    let normalized = s.trim().replacen(',', ".", 1);
    let caps = LEADING_NUMBER.captures(&normalized)?;

    let mantissa = caps.get(1)?.as_str().trim_start_matches('+');
    let mantissa = mantissa.strip_suffix('.').unwrap_or(mantissa);
    let mantissa = match mantissa.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{rest}"),
        _ if mantissa.starts_with('.') => format!("0{mantissa}"),
        _ => mantissa.to_string(),
    };

    match caps.get(2) {
        Some(exp) => {
            let exp = exp.as_str().trim_start_matches('+');
            Decimal::from_scientific(&format!("{mantissa}e{exp}"))
                .ok()
                .map(|d| d.normalize())
        }
        None => Decimal::from_str(&mantissa).ok(),
    }
}

/// Normalize a loosely typed JSON value into a decimal.
///
/// Numbers pass through when they fit the decimal range (about ±7.9e28),
/// strings go through [`parse_number`], anything else (null, booleans,
/// arrays, objects) is absent.
pub fn normalize_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Normalize a loosely typed JSON value into trimmed, non-empty text.
pub fn normalize_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Format an optional amount with a fixed number of digits, `-` when absent.
pub fn format_amount(value: Option<Decimal>, digits: u32) -> String {
    match value {
        Some(v) => {
            let rounded = v.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", digits as usize, rounded)
        }
        None => "-".to_string(),
    }
}

/// Format an optional percentage with one digit, `-` when absent.
pub fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(_) => format!("{}%", format_amount(value, 1)),
        None => "-".to_string(),
    }
}
