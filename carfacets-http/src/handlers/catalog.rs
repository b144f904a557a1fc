use axum::{extract::State, Json};
use carfacets::{Catalog, FacetError};
use std::sync::Arc;

use super::AppState;
use crate::dto::CatalogSummary;

/// Replace the label catalog
#[utoipa::path(
    put,
    path = "/1/catalog",
    tag = "catalog",
    request_body(content = serde_json::Value, description = "makes, models, transmissionTypes, bodyTypes and fuelTypes arrays of {code, name}"),
    responses(
        (status = 200, description = "Catalog replaced", body = CatalogSummary),
        (status = 400, description = "Body is not a valid catalog")
    )
)]
pub async fn put_catalog(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<Json<CatalogSummary>, FacetError> {
    state.counters.record_request("catalog");

    let value: serde_json::Value = serde_json::from_slice(&body)?;
    let catalog = Catalog::from_json(value)?;
    let _upload = state.upload_lock.lock().await;
    if let Some(dir) = &state.data_dir {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join("catalog.json"), &body).await?;
    }
    let labels = catalog.len();
    state.catalog.replace(catalog);

    Ok(Json(CatalogSummary { labels }))
}
