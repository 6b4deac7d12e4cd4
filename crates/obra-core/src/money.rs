//! Amount display formatting
//!
//! Amounts are shown with thousands separators and at most two decimals,
//! trailing zeros dropped. The sign goes after the currency symbol
//! (`$-15,000`).

use crate::Amount;

/// `1234567.5` -> `"1,234,567.5"`
pub fn format_amount(amount: Amount) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let negative = amount < 0.0 && (int_part != "0" || !frac.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// `25000.0` -> `"$25,000"`
pub fn format_currency(amount: Amount) -> String {
    format!("${}", format_amount(amount))
}
