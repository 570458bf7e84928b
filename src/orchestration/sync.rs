//! Season snapshot synchronisation into the configured store.

use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{Decimal, SeasonSnapshot, TournamentLog, Username};
use crate::engine::aggregate::{aggregate_season, filter_season_tournaments};
use crate::orchestration::summary::SummaryService;
use crate::store::{SnapshotStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedUser {
    pub username: Username,
    pub overall_usd: Decimal,
    pub tournaments_logged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub username: Username,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub season_id: i64,
    pub synced: Vec<SyncedUser>,
    pub failures: Vec<SyncFailure>,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

#[derive(Clone)]
pub struct SyncService {
    summary: SummaryService,
    store: Arc<dyn SnapshotStore>,
}

impl SyncService {
    pub fn new(datasource: Arc<dyn DataSource>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            summary: SummaryService::new(datasource),
            store,
        }
    }

    /// Persist one snapshot plus the season's tournament logs per user.
    ///
    /// Each user is written independently; a failing user is reported and the
    /// rest continue. Season or price failures abort before any write.
    pub async fn sync(
        &self,
        usernames: &[Username],
        scholar_pct: Decimal,
        payout_currency: &str,
    ) -> Result<SyncReport, SyncError> {
        let (season, prices) = self.summary.load_base().await?;
        let mut report = SyncReport {
            season_id: season.id,
            synced: Vec::new(),
            failures: Vec::new(),
        };

        let mut fetched = Vec::with_capacity(usernames.len());
        for (username, result) in self.summary.fetch_all(usernames).await {
            match result {
                Ok(data) => fetched.push(data),
                Err(e) => {
                    warn!(username = %username, error = %e, "Failed to fetch user data for sync");
                    report.failures.push(SyncFailure {
                        username,
                        error: e.to_string(),
                    });
                }
            }
        }

        for data in &fetched {
            let totals = aggregate_season(&season, &data.rewards, &data.tournaments, &prices);
            let snapshot =
                SeasonSnapshot::from_totals(&season, &data.username, &totals, scholar_pct, payout_currency);
            let logs: Vec<TournamentLog> = filter_season_tournaments(&season, &data.tournaments)
                .into_iter()
                .map(|t| TournamentLog::from_result(&data.username, t))
                .collect();

            match self.write_user(&snapshot, &logs).await {
                Ok(()) => {
                    info!(
                        username = %data.username,
                        season_id = season.id,
                        tournaments = logs.len(),
                        "Season snapshot synced"
                    );
                    report.synced.push(SyncedUser {
                        username: data.username.clone(),
                        overall_usd: totals.overall.usd,
                        tournaments_logged: logs.len(),
                    });
                }
                Err(e) => {
                    warn!(username = %data.username, error = %e, "Failed to sync season snapshot");
                    report.failures.push(SyncFailure {
                        username: data.username.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn write_user(&self, snapshot: &SeasonSnapshot, logs: &[TournamentLog]) -> Result<(), StoreError> {
        self.store.upsert_season(snapshot).await?;
        self.store.upsert_tournament_logs(logs).await?;
        Ok(())
    }
}
