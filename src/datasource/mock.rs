//! Mock data source for testing without network calls.

use super::{DataSource, DataSourceError};
use crate::domain::{
    BrawlRecord, PriceQuotes, RewardEntry, SeasonWindow, TournamentResult, Username,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock data source that returns predefined test data.
///
/// Clones share the call counter.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    season: Option<SeasonWindow>,
    prices: Option<PriceQuotes>,
    rewards: HashMap<String, Vec<RewardEntry>>,
    tournaments: HashMap<String, Vec<TournamentResult>>,
    failing_users: HashSet<String>,
    brawls: Vec<BrawlRecord>,
    brawl_details: HashMap<String, Value>,
    calls: Arc<AtomicUsize>,
}

fn key(username: &str) -> String {
    username.trim().to_lowercase()
}

impl MockDataSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_season(mut self, season: SeasonWindow) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_prices(mut self, prices: PriceQuotes) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Add reward history entries for a user.
    pub fn with_rewards(mut self, username: &str, rewards: Vec<RewardEntry>) -> Self {
        self.rewards.entry(key(username)).or_default().extend(rewards);
        self
    }

    /// Add completed tournaments for a user.
    pub fn with_tournaments(mut self, username: &str, tournaments: Vec<TournamentResult>) -> Self {
        self.tournaments
            .entry(key(username))
            .or_default()
            .extend(tournaments);
        self
    }

    /// Every per-user fetch for this user fails with a network error.
    pub fn with_failing_user(mut self, username: &str) -> Self {
        self.failing_users.insert(key(username));
        self
    }

    pub fn with_brawls(mut self, brawls: Vec<BrawlRecord>) -> Self {
        self.brawls.extend(brawls);
        self
    }

    pub fn with_brawl_details(mut self, tournament_id: &str, details: Value) -> Self {
        self.brawl_details.insert(tournament_id.to_string(), details);
        self
    }

    /// Number of trait calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_user(&self, username: &Username) -> Result<String, DataSourceError> {
        let k = key(username.as_str());
        if self.failing_users.contains(&k) {
            return Err(DataSourceError::NetworkError(format!(
                "simulated failure for {}",
                username
            )));
        }
        Ok(k)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_current_season(&self) -> Result<SeasonWindow, DataSourceError> {
        self.record_call();
        self.season
            .clone()
            .ok_or_else(|| DataSourceError::Other("no season configured".to_string()))
    }

    async fn fetch_prices(&self) -> Result<PriceQuotes, DataSourceError> {
        self.record_call();
        self.prices
            .clone()
            .ok_or_else(|| DataSourceError::Other("no prices configured".to_string()))
    }

    async fn fetch_unclaimed_balance_history(
        &self,
        username: &Username,
    ) -> Result<Vec<RewardEntry>, DataSourceError> {
        self.record_call();
        let k = self.check_user(username)?;
        Ok(self.rewards.get(&k).cloned().unwrap_or_default())
    }

    async fn fetch_tournaments(
        &self,
        username: &Username,
    ) -> Result<Vec<TournamentResult>, DataSourceError> {
        self.record_call();
        let k = self.check_user(username)?;
        Ok(self.tournaments.get(&k).cloned().unwrap_or_default())
    }

    async fn fetch_guild_brawls(&self, _guild_id: &str) -> Result<Vec<BrawlRecord>, DataSourceError> {
        self.record_call();
        Ok(self.brawls.clone())
    }

    async fn fetch_brawl_details(
        &self,
        tournament_id: &str,
        _guild_id: &str,
    ) -> Result<Value, DataSourceError> {
        self.record_call();
        self.brawl_details
            .get(tournament_id)
            .cloned()
            .ok_or_else(|| DataSourceError::HttpError {
                status: 404,
                message: format!("brawl {} not found", tournament_id),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, RewardCategory, TimeMs, TokenSymbol};

    fn make_reward() -> RewardEntry {
        RewardEntry::new(
            TokenSymbol::new("SPS"),
            Decimal::from_str_canonical("100").unwrap(),
            RewardCategory::Ranked,
            TimeMs::new(1000),
        )
    }

    #[tokio::test]
    async fn test_mock_rewards_are_per_user_case_insensitive() {
        let mock = MockDataSource::new().with_rewards("Alice", vec![make_reward()]);
        let rewards = mock
            .fetch_unclaimed_balance_history(&Username::new("alice"))
            .await
            .unwrap();
        assert_eq!(rewards, vec![make_reward()]);

        let none = mock
            .fetch_unclaimed_balance_history(&Username::new("bob"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_mock_failing_user() {
        let mock = MockDataSource::new().with_failing_user("bob");
        let err = mock.fetch_tournaments(&Username::new("BOB")).await.unwrap_err();
        assert!(matches!(err, DataSourceError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_mock_season_and_prices_unset() {
        let mock = MockDataSource::new();
        assert!(mock.fetch_current_season().await.is_err());
        assert!(mock.fetch_prices().await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_call_counter_shared_by_clones() {
        let mock = MockDataSource::new().with_prices(PriceQuotes::new());
        let clone = mock.clone();
        clone.fetch_prices().await.unwrap();
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_brawl_details_missing() {
        let mock = MockDataSource::new().with_brawl_details("b-1", serde_json::json!({"players": []}));
        assert!(mock.fetch_brawl_details("b-1", "g").await.is_ok());
        assert!(mock.fetch_brawl_details("b-2", "g").await.is_err());
    }
}
