//! Scholar payout formatting and display helpers.

use crate::domain::{AggregatedTotals, Decimal, PriceQuotes, TokenSymbol};
use std::collections::BTreeMap;

/// Reference token that scholar payouts are denominated in.
pub const BASE_TOKEN: &str = "SPS";

/// Returned when the target currency has no usable price.
pub const PAYOUT_UNAVAILABLE: &str = "unavailable";

/// Placeholder for a missing value in display strings.
pub const MISSING_DISPLAY: &str = "-";

/// Render a USD amount as `$1,234.56`.
pub fn format_usd(value: Decimal) -> String {
    let fixed = value.abs().to_fixed(2);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_negative() && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Render a unit price with six decimals, or `-` when unknown.
pub fn format_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) => format!("${}", p.to_fixed(6)),
        None => MISSING_DISPLAY.to_string(),
    }
}

/// `"100 SPS ($5.00); 20 DEC ($0.02)"`, or `-` for an empty map.
pub fn format_token_amounts(amounts: &BTreeMap<TokenSymbol, Decimal>, prices: &PriceQuotes) -> String {
    if amounts.is_empty() {
        return MISSING_DISPLAY.to_string();
    }
    amounts
        .iter()
        .map(|(token, amount)| {
            let usd = prices.usd_value(token.as_str(), *amount);
            format!("{} {} ({})", amount.to_canonical_string(), token, format_usd(usd))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Scholar's base-token payout: the override when present, else the share of
/// the overall base-token holdings.
pub fn base_payout_amount(
    totals: &AggregatedTotals,
    scholar_pct: Decimal,
    override_amount: Option<Decimal>,
) -> Decimal {
    override_amount.unwrap_or_else(|| totals.scholar_share_tokens(BASE_TOKEN, scholar_pct))
}

/// Format the scholar payout in `currency` (USD, the base token, or any priced token).
///
/// Returns [`PAYOUT_UNAVAILABLE`] only when conversion into `currency` is
/// impossible; a zero payout renders as an explicit zero.
pub fn format_payout(
    currency: &str,
    totals: &AggregatedTotals,
    scholar_pct: Decimal,
    prices: &PriceQuotes,
    override_amount: Option<Decimal>,
) -> String {
    let currency = currency.trim().to_uppercase();
    let base_amount = base_payout_amount(totals, scholar_pct, override_amount);
    let base_usd = prices.usd_value(BASE_TOKEN, base_amount);

    if currency == "USD" {
        return format_usd(base_usd);
    }

    if currency == BASE_TOKEN {
        return format!("{} {} ({})", base_amount.to_fixed(2), BASE_TOKEN, format_usd(base_usd));
    }

    let target_price = match prices.get(&currency) {
        Some(p) if p.is_positive() => p,
        _ => return PAYOUT_UNAVAILABLE.to_string(),
    };

    if base_amount.is_zero() || base_usd.is_zero() {
        return format!("{} {}", Decimal::zero().to_fixed(2), currency);
    }

    match base_usd.checked_div(target_price) {
        Some(converted) => format!("{} {}", converted.to_fixed(2), currency),
        None => PAYOUT_UNAVAILABLE.to_string(),
    }
}
