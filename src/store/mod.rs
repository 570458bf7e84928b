//! Snapshot persistence.
//!
//! Two backends implement [`SnapshotStore`]: the local SQLite
//! [`crate::db::Repository`] and the hosted [`SupabaseStore`].

pub mod supabase;

pub use supabase::SupabaseStore;

use crate::domain::{Decimal, SeasonSnapshot, SnapshotRecord, TournamentLog, Username};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no snapshot store configured")]
    NotConfigured,
}

/// Keyed persistence of season snapshots and tournament logs.
///
/// Snapshots are keyed by `(season_id, username)`; tournament logs by
/// `(username, tournament_id)`. Writing the same key twice replaces the first
/// write. Username comparisons are exact.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert or replace a snapshot. Never touches a recorded payout override.
    async fn upsert_season(&self, snapshot: &SeasonSnapshot) -> Result<(), StoreError>;

    /// Insert or replace tournament logs. All rows are written or none are.
    async fn upsert_tournament_logs(&self, logs: &[TournamentLog]) -> Result<usize, StoreError>;

    /// All snapshots for a user, newest season first.
    async fn fetch_history(&self, username: &Username) -> Result<Vec<SnapshotRecord>, StoreError>;

    /// Change only the payout currency. Returns false when no row matches.
    async fn update_currency(
        &self,
        username: &Username,
        season_id: i64,
        currency: &str,
    ) -> Result<bool, StoreError>;

    /// Set or clear (`None`) the recorded payout override. Returns false when no row matches.
    async fn set_payout_override(
        &self,
        username: &Username,
        season_id: i64,
        amount: Option<Decimal>,
    ) -> Result<bool, StoreError>;
}
