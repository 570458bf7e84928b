//! Splinterlands public API client implementation.

use super::{DataSource, DataSourceError};
use crate::domain::{
    BrawlRecord, PriceQuotes, RewardEntry, SeasonWindow, TimeMs, TournamentResult, Username,
};
use crate::engine::brawl::parse_brawl_record;
use crate::engine::normalize::{parse_decimal, parse_i64, parse_reward_entry, parse_timestamp, parse_tournament};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const HISTORY_PAGE_SIZE: usize = 500;
const HISTORY_MAX_PAGES: usize = 20;
const DETAIL_CONCURRENCY: usize = 4;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Data source backed by the public game API and the price service.
#[derive(Debug, Clone)]
pub struct SplinterlandsDataSource {
    client: Client,
    api_url: String,
    prices_url: String,
}

impl SplinterlandsDataSource {
    pub fn new(api_url: String, prices_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            prices_url: prices_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, DataSourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }

    async fn season_end(&self, id: i64) -> Result<TimeMs, DataSourceError> {
        let url = format!("{}/season", self.api_url);
        let body = self.get_json(&url, &[("id", id.to_string())]).await?;
        body.get("ends")
            .and_then(parse_timestamp)
            .ok_or_else(|| DataSourceError::ParseError(format!("season {} has no end date", id)))
    }

    /// Attach the tournament details payload under `detail` so finish
    /// placement can be resolved from it.
    async fn with_detail(&self, mut record: Value, username: &Username) -> Value {
        let has_finish = record.get("finish").map(|f| !f.is_null()).unwrap_or(false);
        if has_finish || record.get("detail").is_some() {
            return record;
        }
        let Some(id) = record.get("id").and_then(Value::as_str).map(str::to_string) else {
            return record;
        };

        let url = format!("{}/tournaments/find", self.api_url);
        match self
            .get_json(&url, &[("id", id.clone()), ("username", username.to_string())])
            .await
        {
            Ok(detail) => {
                if let Some(obj) = record.as_object_mut() {
                    obj.insert("detail".to_string(), detail);
                }
            }
            Err(e) => warn!(tournament_id = %id, error = %e, "Failed to fetch tournament detail"),
        }
        record
    }
}

#[async_trait]
impl DataSource for SplinterlandsDataSource {
    async fn fetch_current_season(&self) -> Result<SeasonWindow, DataSourceError> {
        debug!("Fetching current season");
        let url = format!("{}/settings", self.api_url);
        let settings = self.get_json(&url, &[]).await?;
        let season = settings
            .get("season")
            .ok_or_else(|| DataSourceError::ParseError("Missing season block".to_string()))?;

        let id = season
            .get("id")
            .and_then(parse_i64)
            .ok_or_else(|| DataSourceError::ParseError("Missing season id".to_string()))?;
        let end = season
            .get("ends")
            .and_then(parse_timestamp)
            .ok_or_else(|| DataSourceError::ParseError("Missing season end".to_string()))?;
        let start = match season.get("starts").and_then(parse_timestamp) {
            Some(start) => start,
            None => self.season_end(id - 1).await?,
        };

        Ok(SeasonWindow::new(id, start, end))
    }

    async fn fetch_prices(&self) -> Result<PriceQuotes, DataSourceError> {
        debug!("Fetching price quotes");
        let url = format!("{}/prices", self.prices_url);
        let body = self.get_json(&url, &[]).await?;
        parse_prices(&body)
    }

    async fn fetch_unclaimed_balance_history(
        &self,
        username: &Username,
    ) -> Result<Vec<RewardEntry>, DataSourceError> {
        debug!(username = %username, "Fetching unclaimed balance history");
        let url = format!("{}/players/unclaimed_balance_history", self.api_url);

        let mut entries = Vec::new();
        for page in 0..HISTORY_MAX_PAGES {
            let query = [
                ("username", username.to_string()),
                ("token_type", "SPS".to_string()),
                ("offset", (page * HISTORY_PAGE_SIZE).to_string()),
                ("limit", HISTORY_PAGE_SIZE.to_string()),
            ];
            let body = self.get_json(&url, &query).await?;
            let records = body
                .as_array()
                .ok_or_else(|| DataSourceError::ParseError("Expected array response".to_string()))?;

            for record in records {
                match parse_reward_entry(record) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => debug!(username = %username, error = %e, "Skipping reward record"),
                }
            }

            if records.len() < HISTORY_PAGE_SIZE {
                break;
            }
        }

        Ok(entries)
    }

    async fn fetch_tournaments(
        &self,
        username: &Username,
    ) -> Result<Vec<TournamentResult>, DataSourceError> {
        debug!(username = %username, "Fetching completed tournaments");
        let url = format!("{}/tournaments/completed", self.api_url);
        let body = self.get_json(&url, &[("username", username.to_string())]).await?;
        let records = body
            .as_array()
            .cloned()
            .ok_or_else(|| DataSourceError::ParseError("Expected array response".to_string()))?;

        let enriched: Vec<Value> = stream::iter(records)
            .map(|record| self.with_detail(record, username))
            .buffered(DETAIL_CONCURRENCY)
            .collect()
            .await;

        let mut results = Vec::with_capacity(enriched.len());
        for record in &enriched {
            match parse_tournament(record, username) {
                Ok(t) => results.push(t),
                Err(e) => warn!(username = %username, error = %e, "Failed to parse tournament"),
            }
        }
        Ok(results)
    }

    async fn fetch_guild_brawls(&self, guild_id: &str) -> Result<Vec<BrawlRecord>, DataSourceError> {
        debug!(guild_id, "Fetching guild brawl records");
        let url = format!("{}/guilds/brawl_records", self.api_url);
        let body = self.get_json(&url, &[("guild_id", guild_id.to_string())]).await?;

        let records = body
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut brawls = Vec::new();
        for record in records {
            match parse_brawl_record(record) {
                Ok(b) => brawls.push(b),
                Err(e) => warn!(guild_id, error = %e, "Failed to parse brawl record"),
            }
        }
        Ok(brawls)
    }

    async fn fetch_brawl_details(
        &self,
        tournament_id: &str,
        guild_id: &str,
    ) -> Result<Value, DataSourceError> {
        debug!(tournament_id, guild_id, "Fetching brawl details");
        let url = format!("{}/tournaments/find_brawl", self.api_url);
        self.get_json(
            &url,
            &[("id", tournament_id.to_string()), ("guild_id", guild_id.to_string())],
        )
        .await
    }
}

/// Accepts `{"sps": 0.05, ...}` or `[{"token": "SPS", "usd": 0.05}, ...]`.
/// Entries without a numeric price are skipped.
fn parse_prices(body: &Value) -> Result<PriceQuotes, DataSourceError> {
    let mut prices = PriceQuotes::new();
    match body {
        Value::Object(map) => {
            for (token, raw) in map {
                match parse_decimal(raw) {
                    Some(price) => prices.insert(token, price),
                    None => debug!(token = %token, "Skipping non-numeric price"),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let token = ["token", "symbol"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(Value::as_str));
                let price = ["usd", "price"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(parse_decimal));
                if let (Some(token), Some(price)) = (token, price) {
                    prices.insert(token, price);
                }
            }
        }
        _ => {
            return Err(DataSourceError::ParseError(
                "Expected object or array of prices".to_string(),
            ))
        }
    }
    Ok(prices)
}
