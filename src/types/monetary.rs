use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

/// `part / whole * 100`, or zero when `whole` is not positive.
///
/// Saturates at `Decimal::MAX` (or `MIN` for a negative part) when the ratio cannot be represented.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO
    }

    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| {
            warn!("Percentage of {part} over {whole} overflowed, saturating");
            if part.is_sign_negative() { Decimal::MIN } else { Decimal::MAX }
        })
}

/// Sums amounts, saturating instead of overflowing.
pub fn total<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Formats an amount as US dollars with two decimals and thousands separators, e.g. `-$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let (sign, integer, fraction) = split(rounded, 2);

    format!("{sign}${}.{:02}", group_thousands(integer), fraction)
}

/// Formats a percentage value (already scaled to 0..100) with one decimal, e.g. `85.0%`.
pub fn format_percentage(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    let (sign, integer, fraction) = split(rounded, 1);

    format!("{sign}{}.{}%", group_thousands(integer), fraction)
}

fn split(value: Decimal, decimal_places: u32) -> (&'static str, u64, u64) {
    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    let abs = value.abs();
    let integer = abs.trunc();
    let scale = Decimal::from(10u64.pow(decimal_places));
    let fraction = ((abs - integer) * scale).trunc();

    //NOTE: Amounts beyond u64 are not meaningful for a personal ledger, they render as zero rather than panic
    (sign, integer.to_u64().unwrap_or_default(), fraction.to_u64().unwrap_or_default())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}
