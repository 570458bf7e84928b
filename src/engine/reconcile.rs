//! Totals reconciliation.
//!
//! Forward: category totals are merged into the overall bucket.
//! Inverse: a stored snapshot row is rebuilt into the same aggregate shape.

use crate::domain::{
    AggregatedTotals, Category, CategoryTotals, Decimal, SnapshotRecord, TimeMs, TokenSymbol,
};
use crate::engine::normalize::{coerce_decimal, parse_decimal, parse_i64, parse_timestamp, parse_token_map};
use std::collections::BTreeMap;
use tracing::warn;

/// Union token maps (summing shared keys) and sum the four USD values.
///
/// A non-zero `stored_overall_usd` takes precedence over the computed sum.
pub fn reconcile_overall(
    ranked: CategoryTotals,
    brawl: CategoryTotals,
    tournament: CategoryTotals,
    entry_fees: CategoryTotals,
    stored_overall_usd: Option<Decimal>,
) -> AggregatedTotals {
    let mut token_amounts: BTreeMap<TokenSymbol, Decimal> = BTreeMap::new();
    let mut summed_usd = Decimal::zero();

    for bucket in [&ranked, &brawl, &tournament, &entry_fees] {
        for (token, amount) in &bucket.token_amounts {
            let total = token_amounts.entry(token.clone()).or_insert_with(Decimal::zero);
            match total.checked_add(*amount) {
                Some(sum) => *total = sum,
                None => warn!(token = %token, amount = %amount, "Overall token total overflows, skipping amount"),
            }
        }
        match summed_usd.checked_add(bucket.usd) {
            Some(sum) => summed_usd = sum,
            None => warn!(usd = %bucket.usd, "Overall USD overflows, skipping category value"),
        }
    }

    let usd = stored_overall_usd
        .filter(|u| !u.is_zero())
        .unwrap_or(summed_usd);

    AggregatedTotals {
        ranked,
        brawl,
        tournament,
        entry_fees,
        overall: CategoryTotals::new(token_amounts, usd),
    }
}

fn category_from_record(record: &SnapshotRecord, category: Category) -> CategoryTotals {
    CategoryTotals::new(
        parse_token_map(record.tokens_field(category)),
        coerce_decimal(Some(record.usd_field(category)), Decimal::zero()),
    )
}

/// Rebuild an aggregate from a stored snapshot row.
pub fn reconstruct(record: &SnapshotRecord) -> AggregatedTotals {
    reconcile_overall(
        category_from_record(record, Category::Ranked),
        category_from_record(record, Category::Brawl),
        category_from_record(record, Category::Tournament),
        category_from_record(record, Category::EntryFees),
        parse_decimal(&record.overall_usd),
    )
}

impl SnapshotRecord {
    pub fn season_id(&self) -> i64 {
        parse_i64(&self.season_id).unwrap_or(0)
    }

    pub fn username(&self) -> String {
        self.username.as_str().unwrap_or_default().to_string()
    }

    pub fn season_start(&self) -> Option<TimeMs> {
        parse_timestamp(&self.season_start)
    }

    pub fn season_end(&self) -> Option<TimeMs> {
        parse_timestamp(&self.season_end)
    }

    pub fn scholar_pct(&self) -> Decimal {
        coerce_decimal(Some(&self.scholar_pct), Decimal::zero())
    }

    /// Stored payout currency, uppercase. Empty or missing falls back to USD.
    pub fn payout_currency(&self) -> String {
        self.payout_currency
            .as_str()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "USD".to_string())
    }

    /// Manually recorded scholar payout in the base token, if any.
    pub fn payout_override(&self) -> Option<Decimal> {
        parse_decimal(&self.scholar_payout)
    }
}
