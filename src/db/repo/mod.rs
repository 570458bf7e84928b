//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by table:
//! - `seasons.rs` - Season snapshot rows and their narrow updates
//! - `tournaments.rs` - Tournament log rows

mod seasons;
mod tournaments;

use crate::domain::{Decimal, SeasonSnapshot, SnapshotRecord, TournamentLog, Username};
use crate::store::{SnapshotStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Verify the database answers a trivial query.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for Repository {
    async fn upsert_season(&self, snapshot: &SeasonSnapshot) -> Result<(), StoreError> {
        Ok(self.upsert_season_row(snapshot).await?)
    }

    async fn upsert_tournament_logs(&self, logs: &[TournamentLog]) -> Result<usize, StoreError> {
        Ok(self.upsert_tournament_rows(logs).await?)
    }

    async fn fetch_history(&self, username: &Username) -> Result<Vec<SnapshotRecord>, StoreError> {
        Ok(self.query_season_rows(username).await?)
    }

    async fn update_currency(
        &self,
        username: &Username,
        season_id: i64,
        currency: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.update_season_currency(username, season_id, currency).await?)
    }

    async fn set_payout_override(
        &self,
        username: &Username,
        season_id: i64,
        amount: Option<Decimal>,
    ) -> Result<bool, StoreError> {
        Ok(self.update_season_payout(username, season_id, amount).await?)
    }
}
