//! Data source abstraction for the game's public API and price quotes.

use crate::domain::{BrawlRecord, PriceQuotes, RewardEntry, SeasonWindow, TournamentResult, Username};
use async_trait::async_trait;
use std::fmt;

pub mod cache;
pub mod mock;
pub mod splinterlands;

pub use cache::CachedDataSource;
pub use mock::MockDataSource;
pub use splinterlands::SplinterlandsDataSource;

/// Fetches season windows, prices, rewards, tournaments and guild brawls.
///
/// Implementations own transport concerns (retry/backoff, pagination).
/// Malformed individual records are skipped, never surfaced as errors.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// The currently running season.
    async fn fetch_current_season(&self) -> Result<SeasonWindow, DataSourceError>;

    /// USD unit prices keyed by lowercase token symbol. May be partial.
    async fn fetch_prices(&self) -> Result<PriceQuotes, DataSourceError>;

    /// Unclaimed reward history for a player.
    async fn fetch_unclaimed_balance_history(
        &self,
        username: &Username,
    ) -> Result<Vec<RewardEntry>, DataSourceError>;

    /// Completed tournaments the player entered.
    async fn fetch_tournaments(
        &self,
        username: &Username,
    ) -> Result<Vec<TournamentResult>, DataSourceError>;

    /// A guild's brawl history.
    async fn fetch_guild_brawls(&self, guild_id: &str) -> Result<Vec<BrawlRecord>, DataSourceError>;

    /// Raw details payload for one brawl (contains the `players` list).
    async fn fetch_brawl_details(
        &self,
        tournament_id: &str,
        guild_id: &str,
    ) -> Result<serde_json::Value, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 404, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasource_error_display() {
        let err = DataSourceError::NetworkError("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = DataSourceError::HttpError {
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 404: Not found");

        let err = DataSourceError::ParseError("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid JSON");

        assert_eq!(DataSourceError::RateLimited.to_string(), "Rate limited");
    }
}
