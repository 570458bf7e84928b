pub mod brawls;
pub mod health;
pub mod history;
pub mod summary;
pub mod sync;

use crate::config::Config;
use crate::datasource::{CachedDataSource, DataSource};
use crate::domain::{Decimal, Username};
use crate::engine::normalize::parse_decimal;
use crate::error::AppError;
use crate::store::{SnapshotStore, StoreError};
use axum::{
    routing::{get, patch, post},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub datasource: Arc<CachedDataSource>,
    pub store: Option<Arc<dyn SnapshotStore>>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        datasource: Arc<CachedDataSource>,
        store: Option<Arc<dyn SnapshotStore>>,
        config: Config,
    ) -> Self {
        Self {
            datasource,
            store,
            config,
        }
    }

    pub fn datasource(&self) -> Arc<dyn DataSource> {
        self.datasource.clone()
    }

    pub fn require_store(&self) -> Result<Arc<dyn SnapshotStore>, StoreError> {
        self.store.clone().ok_or(StoreError::NotConfigured)
    }

    /// Requested usernames, or the configured defaults when none are given.
    pub fn usernames_or_default(&self, requested: Vec<Username>) -> Vec<Username> {
        if requested.is_empty() {
            self.config.default_usernames.clone()
        } else {
            requested
        }
    }

    /// Validate a requested scholar percentage, falling back to the configured default.
    pub fn scholar_pct_or_default(&self, raw: Option<&Value>) -> Result<Decimal, AppError> {
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            return Ok(self.config.default_scholar_pct);
        };
        parse_decimal(raw)
            .filter(|pct| !pct.is_negative() && *pct <= Decimal::hundred())
            .ok_or_else(|| AppError::BadRequest("scholarPct must be a number between 0 and 100".into()))
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/summary", get(summary::get_summary))
        .route("/v1/refresh", post(summary::refresh))
        .route("/v1/sync", post(sync::post_sync))
        .route("/v1/history", get(history::get_history))
        .route("/v1/history/currency", patch(history::patch_currency))
        .route("/v1/history/payout", patch(history::patch_payout))
        .route("/v1/brawls", get(brawls::get_brawls))
        .layer(cors)
        .with_state(state)
}
