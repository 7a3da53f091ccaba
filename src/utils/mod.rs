//! Utility functions for formatting
//!
//! Centralized number formatting so every table prints amounts, shares and
//! percentages the same way.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount with thousands separators and 2 decimals: "1,234.56".
///
/// Values with more than 2 decimal places are truncated, not rounded.
///
/// # Examples
/// ```
/// use portfolio_report::utils::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(1234.56)), "1,234.56");
/// assert_eq!(format_amount(dec!(-500)), "-500.00");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let is_negative = value < Decimal::ZERO;
    let truncated = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);

    let formatted = format!("{:.2}", truncated);
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    // Thousands separators on the integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative && !truncated.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, with_separators, decimal_part)
}

/// Format a share count, dropping trailing zeros: "3.5", "10"
pub fn format_shares(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Format a fraction as a percentage with 2 decimals: 0.1234 → "12.34%"
///
/// # Examples
/// ```
/// use portfolio_report::utils::format_pct;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_pct(dec!(0.1234)), "12.34%");
/// ```
pub fn format_pct(fraction: Decimal) -> String {
    let pct = (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", pct)
}

/// Format a return the way the report states it: rounded to 4 decimal places
/// first, then shown as a percentage.
///
/// # Examples
/// ```
/// use portfolio_report::utils::format_return_pct;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_return_pct(dec!(0.1)), "10.00%");
/// assert_eq!(format_return_pct(dec!(0.048808848)), "4.88%");
/// ```
pub fn format_return_pct(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven);
    format!("{:.2}%", rounded * Decimal::ONE_HUNDRED)
}
