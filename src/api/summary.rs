use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::AppState;
use crate::domain::Username;
use crate::error::AppError;
use crate::orchestration::{SeasonSummary, SummaryService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub users: Option<String>,
    pub scholar_pct: Option<String>,
}

pub async fn get_summary(
    Query(params): Query<SummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<SeasonSummary>, AppError> {
    let usernames =
        state.usernames_or_default(params.users.as_deref().map(Username::parse_list).unwrap_or_default());
    let scholar_pct = state.scholar_pct_or_default(params.scholar_pct.map(Value::String).as_ref())?;

    let summary = SummaryService::new(state.datasource())
        .summarize(&usernames, scholar_pct)
        .await?;

    Ok(Json(summary))
}

/// Drop every cached upstream response.
pub async fn refresh(State(state): State<AppState>) -> Json<Value> {
    state.datasource.clear().await;
    Json(serde_json::json!({"status": "refreshed"}))
}
