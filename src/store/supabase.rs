//! Hosted snapshot store speaking the PostgREST protocol.

use super::{SnapshotStore, StoreError};
use crate::domain::{Decimal, SeasonSnapshot, SnapshotRecord, TournamentLog, Username};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

pub const SEASON_TABLE: &str = "season_rewards";
pub const TOURNAMENT_TABLE: &str = "tournament_logs";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, key: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    async fn check(response: Response, action: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %body, "Supabase {} failed", action);
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn upsert_rows(&self, table: &str, rows: &Value, on_conflict: &str) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.post(self.table_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        Self::check(response, "upsert").await?;
        Ok(())
    }

    /// PATCH one season row; true when a row matched.
    async fn patch_season(
        &self,
        username: &Username,
        season_id: i64,
        body: Value,
    ) -> Result<bool, StoreError> {
        let response = self
            .authed(self.client.patch(self.table_url(SEASON_TABLE)))
            .query(&[
                ("username", format!("eq.{}", username)),
                ("season_id", format!("eq.{}", season_id)),
            ])
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response, "update").await?;
        let updated: Value = response.json().await?;
        Ok(updated.as_array().map(|rows| !rows.is_empty()).unwrap_or(false))
    }
}

/// PATCH body for the payout override; amounts go over the wire as decimal strings.
fn override_body(amount: Option<Decimal>) -> Value {
    json!({ "scholar_payout": amount.map(|a| a.to_canonical_string()) })
}

#[async_trait]
impl SnapshotStore for SupabaseStore {
    async fn upsert_season(&self, snapshot: &SeasonSnapshot) -> Result<(), StoreError> {
        debug!(username = %snapshot.username, season_id = snapshot.season_id, "Upserting season snapshot");
        self.upsert_rows(SEASON_TABLE, &snapshot.to_row(), "season_id,username").await
    }

    async fn upsert_tournament_logs(&self, logs: &[TournamentLog]) -> Result<usize, StoreError> {
        if logs.is_empty() {
            return Ok(0);
        }
        debug!(count = logs.len(), "Upserting tournament logs");
        let rows = Value::Array(logs.iter().map(TournamentLog::to_row).collect());
        self.upsert_rows(TOURNAMENT_TABLE, &rows, "username,tournament_id").await?;
        Ok(logs.len())
    }

    async fn fetch_history(&self, username: &Username) -> Result<Vec<SnapshotRecord>, StoreError> {
        let response = self
            .authed(self.client.get(self.table_url(SEASON_TABLE)))
            .query(&[
                ("username", format!("eq.{}", username)),
                ("order", "season_id.desc".to_string()),
            ])
            .send()
            .await?;
        let response = Self::check(response, "fetch").await?;
        let body: Value = response.json().await?;

        let rows = match body {
            Value::Array(rows) => rows,
            _ => return Ok(Vec::new()),
        };
        let records = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value::<SnapshotRecord>(row).ok())
            .collect::<Vec<_>>();
        debug!(username = %username, count = records.len(), "Fetched history rows");
        Ok(records)
    }

    async fn update_currency(
        &self,
        username: &Username,
        season_id: i64,
        currency: &str,
    ) -> Result<bool, StoreError> {
        self.patch_season(
            username,
            season_id,
            json!({ "payout_currency": currency.trim().to_uppercase() }),
        )
        .await
    }

    async fn set_payout_override(
        &self,
        username: &Username,
        season_id: i64,
        amount: Option<Decimal>,
    ) -> Result<bool, StoreError> {
        self.patch_season(username, season_id, override_body(amount)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AggregatedTotals, CategoryTotals, SeasonWindow, TimeMs, TokenSymbol};
    use crate::engine::reconcile::reconstruct;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let store = SupabaseStore::new("https://project.supabase.co/", "key");
        assert_eq!(
            store.table_url(SEASON_TABLE),
            "https://project.supabase.co/rest/v1/season_rewards"
        );
    }

    #[test]
    fn test_override_body_serializes_null_when_cleared() {
        assert_eq!(override_body(None), json!({"scholar_payout": null}));
        assert_eq!(
            override_body(Some(Decimal::from_str("12.000000000000000001").unwrap())),
            json!({"scholar_payout": "12.000000000000000001"})
        );
    }

    #[test]
    fn test_season_payload_round_trips_exact_amounts() {
        let season = SeasonWindow::new(205, TimeMs::new(1_704_067_200_000), TimeMs::new(1_706_745_600_000));
        let precise = Decimal::from_str("123456.123456789012345").unwrap();
        let mut tokens = BTreeMap::new();
        tokens.insert(TokenSymbol::new("SPS"), precise);
        let totals = AggregatedTotals {
            tournament: CategoryTotals::new(tokens.clone(), precise),
            overall: CategoryTotals::new(tokens, precise),
            ..Default::default()
        };
        let snapshot = SeasonSnapshot::from_totals(&season, &Username::new("alice"), &totals, Decimal::from(50), "USD");

        // What PostgREST receives and hands back for the row.
        let wire = serde_json::to_string(&snapshot.to_row()).unwrap();
        let record: SnapshotRecord = serde_json::from_str(&wire).unwrap();
        let rebuilt = reconstruct(&record);

        assert_eq!(rebuilt.tournament.amount("SPS"), precise);
        assert_eq!(rebuilt.overall.amount("SPS"), precise);
        assert_eq!(rebuilt.overall.usd, precise);
    }
}
