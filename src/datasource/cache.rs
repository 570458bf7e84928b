//! Time-bounded memoization of data source responses.

use super::{DataSource, DataSourceError};
use crate::domain::{
    BrawlRecord, PriceQuotes, RewardEntry, SeasonWindow, TournamentResult, Username,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Key/value store whose entries expire after a fixed TTL.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, v)| v.clone())
    }

    pub async fn insert(&self, key: String, value: V) {
        self.entries.write().await.insert(key, (Instant::now(), value));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Return the cached value or run `fetch`, storing only successes.
    pub async fn get_or_fetch<F, Fut>(&self, key: String, fetch: F) -> Result<V, DataSourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, DataSourceError>>,
    {
        if let Some(hit) = self.get(&key).await {
            debug!(key = %key, "Cache hit");
            return Ok(hit);
        }
        let value = fetch().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }
}

/// Wraps another data source and memoizes every call for the TTL.
#[derive(Debug)]
pub struct CachedDataSource {
    inner: Arc<dyn DataSource>,
    seasons: TtlCache<SeasonWindow>,
    prices: TtlCache<PriceQuotes>,
    rewards: TtlCache<Vec<RewardEntry>>,
    tournaments: TtlCache<Vec<TournamentResult>>,
    brawls: TtlCache<Vec<BrawlRecord>>,
    brawl_details: TtlCache<Value>,
}

impl CachedDataSource {
    pub fn new(inner: Arc<dyn DataSource>, ttl: Duration) -> Self {
        Self {
            inner,
            seasons: TtlCache::new(ttl),
            prices: TtlCache::new(ttl),
            rewards: TtlCache::new(ttl),
            tournaments: TtlCache::new(ttl),
            brawls: TtlCache::new(ttl),
            brawl_details: TtlCache::new(ttl),
        }
    }

    /// Drop every cached response so the next call hits the upstream source.
    pub async fn clear(&self) {
        self.seasons.clear().await;
        self.prices.clear().await;
        self.rewards.clear().await;
        self.tournaments.clear().await;
        self.brawls.clear().await;
        self.brawl_details.clear().await;
        debug!("Data source cache cleared");
    }
}

fn user_key(username: &Username) -> String {
    username.as_str().to_lowercase()
}

#[async_trait]
impl DataSource for CachedDataSource {
    async fn fetch_current_season(&self) -> Result<SeasonWindow, DataSourceError> {
        self.seasons
            .get_or_fetch("current".to_string(), || self.inner.fetch_current_season())
            .await
    }

    async fn fetch_prices(&self) -> Result<PriceQuotes, DataSourceError> {
        self.prices
            .get_or_fetch("prices".to_string(), || self.inner.fetch_prices())
            .await
    }

    async fn fetch_unclaimed_balance_history(
        &self,
        username: &Username,
    ) -> Result<Vec<RewardEntry>, DataSourceError> {
        self.rewards
            .get_or_fetch(user_key(username), || {
                self.inner.fetch_unclaimed_balance_history(username)
            })
            .await
    }

    async fn fetch_tournaments(
        &self,
        username: &Username,
    ) -> Result<Vec<TournamentResult>, DataSourceError> {
        self.tournaments
            .get_or_fetch(user_key(username), || self.inner.fetch_tournaments(username))
            .await
    }

    async fn fetch_guild_brawls(&self, guild_id: &str) -> Result<Vec<BrawlRecord>, DataSourceError> {
        self.brawls
            .get_or_fetch(guild_id.to_string(), || self.inner.fetch_guild_brawls(guild_id))
            .await
    }

    async fn fetch_brawl_details(
        &self,
        tournament_id: &str,
        guild_id: &str,
    ) -> Result<Value, DataSourceError> {
        self.brawl_details
            .get_or_fetch(format!("{}:{}", guild_id, tournament_id), || {
                self.inner.fetch_brawl_details(tournament_id, guild_id)
            })
            .await
    }
}
