//! Display formatting for amounts.

use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Formats the absolute value of `amount` with two fraction digits and
/// Indian digit grouping: the last three integer digits, then groups of two.
///
/// The sign is dropped; callers label direction ("you owe", "owed to you")
/// themselves.
///
/// ```
/// use debt_reckoning::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(12345650, 2), "₹"), "₹1,23,456.50");
/// ```
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let mut rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let text = rounded.to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{symbol}{}.{fraction}", group_indian(integer))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
