use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppState;

/// Active facet configuration and the facet definitions derived from it
#[utoipa::path(
    get,
    path = "/1/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Facet settings and definitions", body = serde_json::Value)
    )
)]
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.counters.record_request("settings");
    Json(serde_json::json!({
        "settings": state.executor.settings(),
        "facets": state.executor.definitions(),
    }))
}
