//! Purse math: unit rounding and the top-3 payout split.

use std::collections::BTreeMap;

/// Round an amount to the given unit (nearest).
pub fn round_to_unit(x: f64, unit: i64) -> i64 {
    if unit <= 1 {
        return x.round() as i64;
    }
    (x / unit as f64).round() as i64 * unit
}

/// Top-3 payouts by finishing position: winner takes the listed purse,
/// 2nd 30%, 3rd 20%.
pub fn purse_payouts_top3(winner_purse: i64) -> BTreeMap<u32, i64> {
    BTreeMap::from([
        (1, winner_purse),
        (2, (winner_purse as f64 * 0.3) as i64),
        (3, (winner_purse as f64 * 0.2) as i64),
    ])
}

/// Thousands-separated money formatting ("1,320,000").
pub fn format_money(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative { format!("-{out}") } else { out }
}
