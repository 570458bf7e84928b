//! Tournament log operations for the repository.

use crate::domain::snapshot::token_amounts_json;
use crate::domain::{TimeMs, TournamentLog};

use super::Repository;

impl Repository {
    /// Insert or replace tournament logs in a single transaction.
    ///
    /// Returns the number of rows written. On any failure nothing is committed.
    pub(super) async fn upsert_tournament_rows(&self, logs: &[TournamentLog]) -> Result<usize, sqlx::Error> {
        if logs.is_empty() {
            return Ok(0);
        }

        let updated_at = TimeMs::now().as_i64();
        let mut tx = self.pool.begin().await?;

        for log in logs {
            let rewards = token_amounts_json(&log.rewards).to_string();
            let raw = log.raw.to_string();
            sqlx::query(
                r#"
                INSERT INTO tournament_logs (
                    username, tournament_id, name, start_date, finish,
                    entry_fee_token, entry_fee_amount, rewards, raw, updated_at_ms
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(username, tournament_id) DO UPDATE SET
                    name = excluded.name,
                    start_date = excluded.start_date,
                    finish = excluded.finish,
                    entry_fee_token = excluded.entry_fee_token,
                    entry_fee_amount = excluded.entry_fee_amount,
                    rewards = excluded.rewards,
                    raw = excluded.raw,
                    updated_at_ms = excluded.updated_at_ms
                "#,
            )
            .bind(log.username.as_str())
            .bind(log.tournament_id.as_str())
            .bind(log.name.as_str())
            .bind(log.start_date.as_deref())
            .bind(log.finish)
            .bind(log.entry_fee_token.as_ref().map(|t| t.as_str().to_string()))
            .bind(log.entry_fee_amount.map(|a| a.to_canonical_string()))
            .bind(rewards)
            .bind(raw)
            .bind(updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(logs.len())
    }
}
