//! Margin, promotion and break-even calculation.
//!
//! Every figure is derived independently and is absent whenever one of its
//! inputs is absent. Denominators are guarded (`vk > 0`, `menge > 0`,
//! `db_diff > 0`), and decimal overflow also yields an absent figure.

use rust_decimal::Decimal;

use crate::models::pricing::{CalcResult, ParsedInput};

/// Calculate all figures for one extracted check line.
pub fn calculate(input: &ParsedInput) -> CalcResult {
    let ek = input.ek;
    let vk = input.vk;
    let hundred = Decimal::ONE_HUNDRED;

    let db = ek.zip(vk).and_then(|(ek, vk)| vk.checked_sub(ek));

    let marge_pct = match (db, vk) {
        (Some(db), Some(vk)) if vk > Decimal::ZERO => {
            db.checked_div(vk).and_then(|ratio| ratio.checked_mul(hundred))
        }
        _ => None,
    };

    let gewinn_100 = db.and_then(|db| db.checked_mul(hundred));

    let wkz_einheit = match input.wkz_total {
        Some(wkz) if input.menge > Decimal::ZERO => wkz.checked_div(input.menge),
        _ => None,
    };

    let db_netto = db.zip(wkz_einheit).and_then(|(db, per_unit)| db.checked_add(per_unit));

    let db_norm = input
        .vk_normal
        .zip(ek)
        .and_then(|(normal, ek)| normal.checked_sub(ek));

    let db_akt = db;

    let db_diff = db_norm.zip(db_akt).and_then(|(norm, akt)| norm.checked_sub(akt));

    let break_even_menge = match (input.wkz_total, db_diff) {
        (Some(wkz), Some(diff)) if diff > Decimal::ZERO => wkz.checked_div(diff).map(|q| q.ceil()),
        _ => None,
    };

    CalcResult {
        db,
        marge_pct,
        gewinn_100,
        wkz_einheit,
        db_netto,
        db_norm,
        db_akt,
        db_diff,
        break_even_menge,
    }
}
