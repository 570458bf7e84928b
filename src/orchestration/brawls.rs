//! Guild brawl player statistics.

use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{BrawlPlayerRow, BrawlRecord, PlayerBrawlStats};
use crate::engine::brawl::{compute_player_stats, parse_brawl_players, recent_brawls};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const DETAIL_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrawlReport {
    pub guild_id: String,
    pub window: usize,
    pub brawls_loaded: usize,
    pub brawls_skipped: usize,
    pub players: Vec<PlayerBrawlStats>,
}

#[derive(Clone)]
pub struct BrawlService {
    datasource: Arc<dyn DataSource>,
}

impl BrawlService {
    pub fn new(datasource: Arc<dyn DataSource>) -> Self {
        Self { datasource }
    }

    /// Per-player stats over the `window` newest cycles among the guild's
    /// `max_brawls` most recent brawls. Brawls whose details fail are skipped.
    pub async fn player_stats(
        &self,
        guild_id: &str,
        window: usize,
        max_brawls: usize,
    ) -> Result<BrawlReport, DataSourceError> {
        let history = self.datasource.fetch_guild_brawls(guild_id).await?;
        let recent: Vec<BrawlRecord> = recent_brawls(&history, max_brawls).into_iter().cloned().collect();
        debug!(guild_id, brawls = recent.len(), "Loading brawl details");

        let results: Vec<(BrawlRecord, Result<Value, DataSourceError>)> = stream::iter(recent)
            .map(|brawl| {
                let datasource = Arc::clone(&self.datasource);
                let guild_id = guild_id.to_string();
                async move {
                    let details = datasource
                        .fetch_brawl_details(&brawl.tournament_id, &guild_id)
                        .await;
                    (brawl, details)
                }
            })
            .buffered(DETAIL_CONCURRENCY)
            .collect()
            .await;

        let mut rows: Vec<BrawlPlayerRow> = Vec::new();
        let mut loaded = 0;
        let mut skipped = 0;
        for (brawl, details) in results {
            match details {
                Ok(details) => {
                    loaded += 1;
                    rows.extend(parse_brawl_players(&brawl, &details));
                }
                Err(e) => {
                    skipped += 1;
                    warn!(tournament_id = %brawl.tournament_id, error = %e, "Skipping brawl with no details");
                }
            }
        }

        Ok(BrawlReport {
            guild_id: guild_id.to_string(),
            window,
            brawls_loaded: loaded,
            brawls_skipped: skipped,
            players: compute_player_stats(&rows, window),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockDataSource;
    use crate::engine::brawl::parse_brawl_record;
    use serde_json::json;

    fn mock() -> MockDataSource {
        let brawls = (1..=3)
            .map(|c| parse_brawl_record(&json!({"cycle": c, "tournament_id": format!("b-{}", c)})).unwrap())
            .collect();
        MockDataSource::new()
            .with_brawls(brawls)
            .with_brawl_details("b-3", json!({"players": [{"player": "alice", "wins": 4, "losses": 1}]}))
            .with_brawl_details("b-2", json!({"players": [{"player": "alice", "wins": 1, "losses": 1, "draws": 1}]}))
            .with_brawl_details("b-1", json!({"players": [{"player": "alice", "wins": 9}]}))
    }

    #[tokio::test]
    async fn test_player_stats_over_window() {
        let service = BrawlService::new(Arc::new(mock()));
        let report = service.player_stats("guild", 2, 40).await.unwrap();

        assert_eq!(report.brawls_loaded, 3);
        assert_eq!(report.brawls_skipped, 0);
        assert_eq!(report.players.len(), 1);
        let alice = &report.players[0];
        assert_eq!((alice.wins, alice.losses, alice.draws), (5, 2, 1));
        assert_eq!(alice.brawls_played, 2);
    }

    #[tokio::test]
    async fn test_missing_details_are_skipped() {
        let brawl = parse_brawl_record(&json!({"cycle": 9, "tournament_id": "b-9"})).unwrap();
        let service = BrawlService::new(Arc::new(mock().with_brawls(vec![brawl])));
        let report = service.player_stats("guild", 5, 40).await.unwrap();
        assert_eq!(report.brawls_skipped, 1);
        assert_eq!(report.brawls_loaded, 3);
    }

    #[tokio::test]
    async fn test_max_brawls_limits_fetches() {
        let service = BrawlService::new(Arc::new(mock()));
        let report = service.player_stats("guild", 5, 1).await.unwrap();
        assert_eq!(report.brawls_loaded, 1);
        assert_eq!(report.players[0].wins, 4);
    }

    #[test]
    fn test_player_stats_future_is_send() {
        fn assert_send<T: Send>(_: T) {}
        let service = BrawlService::new(Arc::new(mock()));
        assert_send(service.player_stats("guild", 5, 40));
    }
}
