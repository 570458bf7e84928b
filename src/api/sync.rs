use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::AppState;
use crate::domain::Username;
use crate::error::AppError;
use crate::orchestration::{SyncReport, SyncService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub users: Vec<String>,
    pub scholar_pct: Option<Value>,
    pub payout_currency: Option<String>,
}

pub async fn post_sync(
    State(state): State<AppState>,
    Json(body): Json<SyncRequest>,
) -> Result<Json<SyncReport>, AppError> {
    let store = state.require_store()?;

    let requested = body
        .users
        .iter()
        .map(Username::new)
        .filter(|u| !u.as_str().is_empty())
        .collect();
    let usernames = state.usernames_or_default(requested);
    if usernames.is_empty() {
        return Err(AppError::BadRequest("at least one username is required".into()));
    }

    let scholar_pct = state.scholar_pct_or_default(body.scholar_pct.as_ref())?;
    let currency = body
        .payout_currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("USD");

    let report = SyncService::new(state.datasource(), store)
        .sync(&usernames, scholar_pct, currency)
        .await?;

    Ok(Json(report))
}
