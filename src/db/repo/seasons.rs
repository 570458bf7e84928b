//! Season snapshot operations for the repository.

use crate::domain::snapshot::token_map_json;
use crate::domain::{Decimal, SeasonSnapshot, SnapshotRecord, TimeMs, TokenSymbol, Username};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::BTreeMap;

use super::Repository;

/// Token map as JSON text with canonical decimal strings.
fn encode_token_map(map: &BTreeMap<TokenSymbol, Decimal>) -> String {
    token_map_json(map).to_string()
}

fn text(row: &SqliteRow, column: &str) -> Value {
    row.get::<Option<String>, _>(column)
        .map(Value::String)
        .unwrap_or(Value::Null)
}

fn row_to_record(row: &SqliteRow) -> SnapshotRecord {
    SnapshotRecord {
        season_id: Value::from(row.get::<i64, _>("season_id")),
        season_start: text(row, "season_start"),
        season_end: text(row, "season_end"),
        username: text(row, "username"),
        scholar_pct: text(row, "scholar_pct"),
        payout_currency: text(row, "payout_currency"),
        ranked_tokens: text(row, "ranked_tokens"),
        brawl_tokens: text(row, "brawl_tokens"),
        tournament_tokens: text(row, "tournament_tokens"),
        entry_fees_tokens: text(row, "entry_fees_tokens"),
        ranked_usd: text(row, "ranked_usd"),
        brawl_usd: text(row, "brawl_usd"),
        tournament_usd: text(row, "tournament_usd"),
        entry_fees_usd: text(row, "entry_fees_usd"),
        overall_usd: text(row, "overall_usd"),
        scholar_payout: text(row, "scholar_payout"),
    }
}

impl Repository {
    /// Insert or replace the snapshot for `(season_id, username)`.
    ///
    /// `scholar_payout` is not in the update set, so a recorded override
    /// survives re-syncs.
    pub(super) async fn upsert_season_row(&self, snapshot: &SeasonSnapshot) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO season_rewards (
                season_id, username, season_start, season_end, scholar_pct, payout_currency,
                ranked_tokens, brawl_tokens, tournament_tokens, entry_fees_tokens,
                ranked_usd, brawl_usd, tournament_usd, entry_fees_usd, overall_usd,
                updated_at_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(season_id, username) DO UPDATE SET
                season_start = excluded.season_start,
                season_end = excluded.season_end,
                scholar_pct = excluded.scholar_pct,
                payout_currency = excluded.payout_currency,
                ranked_tokens = excluded.ranked_tokens,
                brawl_tokens = excluded.brawl_tokens,
                tournament_tokens = excluded.tournament_tokens,
                entry_fees_tokens = excluded.entry_fees_tokens,
                ranked_usd = excluded.ranked_usd,
                brawl_usd = excluded.brawl_usd,
                tournament_usd = excluded.tournament_usd,
                entry_fees_usd = excluded.entry_fees_usd,
                overall_usd = excluded.overall_usd,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(snapshot.season_id)
        .bind(snapshot.username.as_str())
        .bind(snapshot.season_start.as_str())
        .bind(snapshot.season_end.as_str())
        .bind(snapshot.scholar_pct.to_canonical_string())
        .bind(snapshot.payout_currency.as_str())
        .bind(encode_token_map(&snapshot.ranked_tokens))
        .bind(encode_token_map(&snapshot.brawl_tokens))
        .bind(encode_token_map(&snapshot.tournament_tokens))
        .bind(encode_token_map(&snapshot.entry_fees_tokens))
        .bind(snapshot.ranked_usd.to_canonical_string())
        .bind(snapshot.brawl_usd.to_canonical_string())
        .bind(snapshot.tournament_usd.to_canonical_string())
        .bind(snapshot.entry_fees_usd.to_canonical_string())
        .bind(snapshot.overall_usd.to_canonical_string())
        .bind(TimeMs::now().as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All snapshot rows for a user, newest season first.
    pub(super) async fn query_season_rows(
        &self,
        username: &Username,
    ) -> Result<Vec<SnapshotRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT season_id, username, season_start, season_end, scholar_pct, payout_currency,
                   ranked_tokens, brawl_tokens, tournament_tokens, entry_fees_tokens,
                   ranked_usd, brawl_usd, tournament_usd, entry_fees_usd, overall_usd,
                   scholar_payout
            FROM season_rewards
            WHERE username = ?
            ORDER BY season_id DESC
            "#,
        )
        .bind(username.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    pub(super) async fn update_season_currency(
        &self,
        username: &Username,
        season_id: i64,
        currency: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE season_rewards SET payout_currency = ?, updated_at_ms = ? WHERE username = ? AND season_id = ?",
        )
        .bind(currency.trim().to_uppercase())
        .bind(TimeMs::now().as_i64())
        .bind(username.as_str())
        .bind(season_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn update_season_payout(
        &self,
        username: &Username,
        season_id: i64,
        amount: Option<Decimal>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE season_rewards SET scholar_payout = ?, updated_at_ms = ? WHERE username = ? AND season_id = ?",
        )
        .bind(amount.map(|a| a.to_canonical_string()))
        .bind(TimeMs::now().as_i64())
        .bind(username.as_str())
        .bind(season_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
