use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::{BrawlReport, BrawlService};

const DEFAULT_WINDOW: usize = 5;
const DEFAULT_MAX_BRAWLS: usize = 40;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrawlQuery {
    pub guild_id: Option<String>,
    pub window: Option<usize>,
    pub max_brawls: Option<usize>,
}

pub async fn get_brawls(
    Query(params): Query<BrawlQuery>,
    State(state): State<AppState>,
) -> Result<Json<BrawlReport>, AppError> {
    let guild_id = params
        .guild_id
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(&state.config.guild_id)
        .to_string();
    let window = params.window.unwrap_or(DEFAULT_WINDOW);
    let max_brawls = params.max_brawls.unwrap_or(DEFAULT_MAX_BRAWLS);
    if window == 0 || max_brawls == 0 {
        return Err(AppError::BadRequest(
            "window and maxBrawls must be at least 1".into(),
        ));
    }

    let report = BrawlService::new(state.datasource())
        .player_stats(&guild_id, window, max_brawls)
        .await?;

    Ok(Json(report))
}
