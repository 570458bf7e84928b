use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::config::StoreBackend;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness plus the active snapshot store backend.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = match (&state.config.store, state.store.is_some()) {
        (_, false) => "none",
        (StoreBackend::Sqlite { .. }, true) => "sqlite",
        (StoreBackend::Supabase { .. }, true) => "supabase",
        (StoreBackend::None, true) => "custom",
    };
    Json(serde_json::json!({"status": "ready", "store": store}))
}
