use axum::{extract::State, Json};
use carfacets::{CorpusProvider, CorpusSnapshot, FacetError};
use std::sync::Arc;

use super::AppState;
use crate::dto::CorpusSummary;

fn summarize(snapshot: &CorpusSnapshot) -> CorpusSummary {
    CorpusSummary {
        items: snapshot.len(),
        fields: snapshot.schema().iter().map(|f| f.as_str().to_string()).collect(),
    }
}

/// Replace the corpus snapshot
///
/// Requests already running keep the snapshot they started with.
#[utoipa::path(
    put,
    path = "/1/corpus",
    tag = "corpus",
    request_body(content = serde_json::Value, description = "Array of items, or {\"items\": [...], \"fields\": [...]}"),
    responses(
        (status = 200, description = "Corpus replaced", body = CorpusSummary),
        (status = 400, description = "Body is not a valid corpus")
    )
)]
pub async fn put_corpus(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<Json<CorpusSummary>, FacetError> {
    state.counters.record_request("corpus");

    let _upload = state.upload_lock.lock().await;
    let store = state.corpus.clone();
    let data_dir = state.data_dir.clone();
    let summary = tokio::task::spawn_blocking(move || -> Result<CorpusSummary, FacetError> {
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        let snapshot = CorpusSnapshot::from_json(value)?;
        if let Some(dir) = data_dir {
            std::fs::create_dir_all(&dir)?;
            std::fs::write(dir.join("items.json"), &body)?;
        }
        let summary = summarize(&snapshot);
        store.replace(snapshot);
        Ok(summary)
    })
    .await
    .map_err(|e| FacetError::Internal(format!("spawn_blocking join error: {}", e)))??;

    Ok(Json(summary))
}

/// Size and schema of the current corpus snapshot
#[utoipa::path(
    get,
    path = "/1/corpus",
    tag = "corpus",
    responses(
        (status = 200, description = "Current corpus summary", body = CorpusSummary)
    )
)]
pub async fn get_corpus(State(state): State<Arc<AppState>>) -> Json<CorpusSummary> {
    state.counters.record_request("corpus");
    Json(summarize(&state.corpus.snapshot()))
}
