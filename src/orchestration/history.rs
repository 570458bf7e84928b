//! Stored season history, rebuilt into aggregates with formatted payouts.

use crate::datasource::DataSource;
use crate::domain::{AggregatedTotals, Decimal, PriceQuotes, Username};
use crate::engine::payout::format_payout;
use crate::engine::reconcile::reconstruct;
use crate::store::{SnapshotStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub season_id: i64,
    pub season_start: Option<String>,
    pub season_end: Option<String>,
    pub scholar_pct: Decimal,
    pub payout_currency: String,
    pub payout: String,
    pub payout_override: Option<Decimal>,
    pub totals: AggregatedTotals,
}

#[derive(Clone)]
pub struct HistoryService {
    datasource: Arc<dyn DataSource>,
    store: Arc<dyn SnapshotStore>,
}

impl HistoryService {
    pub fn new(datasource: Arc<dyn DataSource>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { datasource, store }
    }

    /// Every stored season for `username`, newest first.
    ///
    /// Payouts are formatted with current prices; when prices cannot be
    /// fetched the entries still load and conversions degrade.
    pub async fn history(&self, username: &Username) -> Result<Vec<HistoryEntry>, StoreError> {
        let records = self.store.fetch_history(username).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let prices = match self.datasource.fetch_prices().await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(error = %e, "Prices unavailable for history payouts");
                PriceQuotes::new()
            }
        };

        Ok(records
            .iter()
            .map(|record| {
                let totals = reconstruct(record);
                let scholar_pct = record.scholar_pct();
                let payout_currency = record.payout_currency();
                let payout_override = record.payout_override();
                HistoryEntry {
                    season_id: record.season_id(),
                    season_start: record.season_start().map(|t| t.to_rfc3339()),
                    season_end: record.season_end().map(|t| t.to_rfc3339()),
                    payout: format_payout(&payout_currency, &totals, scholar_pct, &prices, payout_override),
                    scholar_pct,
                    payout_currency,
                    payout_override,
                    totals,
                }
            })
            .collect())
    }
}
