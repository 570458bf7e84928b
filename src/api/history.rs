use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::AppState;
use crate::domain::{Decimal, Username};
use crate::engine::normalize::parse_decimal;
use crate::error::AppError;
use crate::orchestration::{HistoryEntry, HistoryService};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user: String,
    pub seasons: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyUpdate {
    pub user: String,
    pub season_id: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutUpdate {
    pub user: String,
    pub season_id: i64,
    #[serde(default)]
    pub amount: Value,
}

fn require_user(raw: Option<&str>) -> Result<Username, AppError> {
    let user = Username::new(raw.unwrap_or_default());
    if user.as_str().is_empty() {
        return Err(AppError::BadRequest("user is required".into()));
    }
    Ok(user)
}

fn not_found(user: &Username, season_id: i64) -> AppError {
    AppError::NotFound(format!("no snapshot for {} in season {}", user, season_id))
}

pub async fn get_history(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let user = require_user(params.user.as_deref())?;
    let store = state.require_store()?;

    let seasons = HistoryService::new(state.datasource(), store)
        .history(&user)
        .await?;

    Ok(Json(HistoryResponse {
        user: user.to_string(),
        seasons,
    }))
}

pub async fn patch_currency(
    State(state): State<AppState>,
    Json(body): Json<CurrencyUpdate>,
) -> Result<Json<Value>, AppError> {
    let user = require_user(Some(body.user.as_str()))?;
    let currency = body.currency.trim();
    if currency.is_empty() {
        return Err(AppError::BadRequest("currency is required".into()));
    }

    let store = state.require_store()?;
    if !store.update_currency(&user, body.season_id, currency).await? {
        return Err(not_found(&user, body.season_id));
    }

    Ok(Json(serde_json::json!({"updated": true})))
}

/// Set the recorded payout override, or clear it with a null amount.
pub async fn patch_payout(
    State(state): State<AppState>,
    Json(body): Json<PayoutUpdate>,
) -> Result<Json<Value>, AppError> {
    let user = require_user(Some(body.user.as_str()))?;
    let amount: Option<Decimal> = match &body.amount {
        Value::Null => None,
        raw => Some(
            parse_decimal(raw)
                .filter(|amount| !amount.is_negative())
                .ok_or_else(|| AppError::BadRequest("amount must be a non-negative number".into()))?,
        ),
    };

    let store = state.require_store()?;
    if !store
        .set_payout_override(&user, body.season_id, amount)
        .await?
    {
        return Err(not_found(&user, body.season_id));
    }

    Ok(Json(serde_json::json!({"updated": true})))
}
