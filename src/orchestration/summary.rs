//! Multi-user season summary with per-user failure isolation.

use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{
    AggregatedTotals, Category, Decimal, PriceQuotes, RewardEntry, SeasonWindow, TournamentResult,
    Username,
};
use crate::engine::aggregate::aggregate_season;
use crate::engine::payout::{format_price, format_token_amounts, BASE_TOKEN};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const NO_DATA_MESSAGE: &str = "No data found yet. Try adding usernames.";

/// Raw fetched inputs for one user.
#[derive(Debug, Clone)]
pub struct UserData {
    pub username: Username,
    pub rewards: Vec<RewardEntry>,
    pub tournaments: Vec<TournamentResult>,
}

impl UserData {
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty() && self.tournaments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub username: Username,
    pub totals: AggregatedTotals,
    pub scholar_share_usd: Decimal,
    pub owner_share_usd: Decimal,
    pub scholar_share_sps: Decimal,
}

/// One row of the per-source breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakdown {
    pub category: Category,
    pub label: &'static str,
    pub usd: Decimal,
    pub tokens: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCaptions {
    pub sps: String,
    pub dec: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub season: SeasonWindow,
    pub season_label: String,
    pub prices: PriceCaptions,
    pub scholar_pct: Decimal,
    pub users: Vec<UserSummary>,
    pub combined: Option<AggregatedTotals>,
    pub sources: Vec<SourceBreakdown>,
    pub warnings: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to load base data: {0}")]
    BaseData(#[from] DataSourceError),
}

#[derive(Clone)]
pub struct SummaryService {
    datasource: Arc<dyn DataSource>,
}

impl SummaryService {
    pub fn new(datasource: Arc<dyn DataSource>) -> Self {
        Self { datasource }
    }

    /// Season window and price quotes; both are required for any aggregation.
    pub async fn load_base(&self) -> Result<(SeasonWindow, PriceQuotes), DataSourceError> {
        futures::try_join!(
            self.datasource.fetch_current_season(),
            self.datasource.fetch_prices()
        )
    }

    /// Fetch rewards and tournaments for one user.
    pub async fn fetch_user(&self, username: &Username) -> Result<UserData, DataSourceError> {
        debug!(username = %username, "Fetching user data");
        let (rewards, tournaments) = futures::try_join!(
            self.datasource.fetch_unclaimed_balance_history(username),
            self.datasource.fetch_tournaments(username)
        )?;
        Ok(UserData {
            username: username.clone(),
            rewards,
            tournaments,
        })
    }

    /// Fetch every user concurrently, keeping each user's outcome.
    pub async fn fetch_all(
        &self,
        usernames: &[Username],
    ) -> Vec<(Username, Result<UserData, DataSourceError>)> {
        join_all(usernames.iter().cloned().map(|username| {
            let service = self.clone();
            async move {
                let result = service.fetch_user(&username).await;
                (username, result)
            }
        }))
        .await
    }

    /// Fetch every user concurrently. Failures become warnings.
    pub async fn fetch_users(&self, usernames: &[Username]) -> (Vec<UserData>, Vec<String>) {
        let mut fetched = Vec::with_capacity(usernames.len());
        let mut warnings = Vec::new();
        for (username, result) in self.fetch_all(usernames).await {
            match result {
                Ok(data) => fetched.push(data),
                Err(e) => {
                    warn!(username = %username, error = %e, "Failed to fetch user data");
                    warnings.push(format!("Failed to fetch data for {}: {}", username, e));
                }
            }
        }
        (fetched, warnings)
    }

    pub async fn summarize(
        &self,
        usernames: &[Username],
        scholar_pct: Decimal,
    ) -> Result<SeasonSummary, SummaryError> {
        let (season, prices) = self.load_base().await?;
        let (fetched, warnings) = self.fetch_users(usernames).await;
        Ok(build_summary(season, &prices, &fetched, scholar_pct, warnings))
    }
}

fn user_summary(data: &UserData, season: &SeasonWindow, prices: &PriceQuotes, scholar_pct: Decimal) -> UserSummary {
    let totals = aggregate_season(season, &data.rewards, &data.tournaments, prices);
    UserSummary {
        username: data.username.clone(),
        scholar_share_usd: totals.scholar_share_usd(scholar_pct),
        owner_share_usd: totals.owner_share_usd(scholar_pct),
        scholar_share_sps: totals.scholar_share_tokens(BASE_TOKEN, scholar_pct),
        totals,
    }
}

/// Assemble the summary from already fetched inputs.
pub fn build_summary(
    season: SeasonWindow,
    prices: &PriceQuotes,
    fetched: &[UserData],
    scholar_pct: Decimal,
    warnings: Vec<String>,
) -> SeasonSummary {
    let captions = PriceCaptions {
        sps: format_price(prices.get("sps")),
        dec: format_price(prices.get("dec")),
    };
    let season_label = format!(
        "Season {}: {} \u{2192} {}",
        season.id,
        season.start.to_date_string(),
        season.end.to_date_string()
    );

    let users: Vec<UserSummary> = fetched
        .iter()
        .map(|data| user_summary(data, &season, prices, scholar_pct))
        .collect();

    if fetched.iter().all(UserData::is_empty) {
        return SeasonSummary {
            season,
            season_label,
            prices: captions,
            scholar_pct,
            users,
            combined: None,
            sources: Vec::new(),
            warnings,
            message: Some(NO_DATA_MESSAGE.to_string()),
        };
    }

    let all_rewards: Vec<RewardEntry> = fetched.iter().flat_map(|d| d.rewards.iter().cloned()).collect();
    let all_tournaments: Vec<TournamentResult> =
        fetched.iter().flat_map(|d| d.tournaments.iter().cloned()).collect();
    let combined = aggregate_season(&season, &all_rewards, &all_tournaments, prices);

    let sources = Category::ALL
        .iter()
        .map(|&category| {
            let bucket = combined.category(category);
            SourceBreakdown {
                category,
                label: category.label(),
                usd: bucket.usd,
                tokens: format_token_amounts(&bucket.token_amounts, prices),
            }
        })
        .collect();

    SeasonSummary {
        season,
        season_label,
        prices: captions,
        scholar_pct,
        users,
        combined: Some(combined),
        sources,
        warnings,
        message: None,
    }
}
