use axum::{
    extract::{RawQuery, State},
    Json,
};
use carfacets::{CorpusProvider, FacetCountsResponse, FacetError, FilterSelection};
use std::sync::Arc;

use super::AppState;
use crate::dto::{parse_facet_params, FacetParamsBody};

/// Facet counts for the selection in the query string
#[utoipa::path(
    get,
    path = "/1/facets",
    tag = "facets",
    params(
        ("makeCodes" = Option<String>, Query, description = "Comma-separated make codes"),
        ("modelCodes" = Option<String>, Query, description = "Comma-separated model codes"),
        ("transmissionTypeCodes" = Option<String>, Query, description = "Comma-separated transmission codes"),
        ("bodyTypeCodes" = Option<String>, Query, description = "Comma-separated body type codes"),
        ("fuelTypeCodes" = Option<String>, Query, description = "Comma-separated fuel type codes"),
        ("seats" = Option<String>, Query, description = "Comma-separated seat counts"),
        ("doors" = Option<String>, Query, description = "Comma-separated door counts"),
        ("priceMin" = Option<f64>, Query, description = "Lower price bound"),
        ("priceMax" = Option<f64>, Query, description = "Upper price bound"),
        ("mileageMin" = Option<f64>, Query, description = "Lower mileage bound"),
        ("mileageMax" = Option<f64>, Query, description = "Upper mileage bound"),
        ("yearMin" = Option<f64>, Query, description = "Lower model year bound"),
        ("yearMax" = Option<f64>, Query, description = "Upper model year bound")
    ),
    responses(
        (status = 200, description = "Facet counts, range options and labels", body = serde_json::Value)
    )
)]
pub async fn get_facets(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<FacetCountsResponse>, FacetError> {
    state.counters.record_request("facets");
    let selection = parse_facet_params(query.as_deref().unwrap_or(""));
    compute_facets(state, selection).await.map(Json)
}

/// Facet counts for the selection in a `{"params": "..."}` body
#[utoipa::path(
    post,
    path = "/1/facets",
    tag = "facets",
    request_body = FacetParamsBody,
    responses(
        (status = 200, description = "Facet counts, range options and labels", body = serde_json::Value),
        (status = 400, description = "Malformed body")
    )
)]
pub async fn post_facets(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<Json<FacetCountsResponse>, FacetError> {
    state.counters.record_request("facets");
    let params = if body.iter().all(u8::is_ascii_whitespace) {
        FacetParamsBody::default()
    } else {
        serde_json::from_slice::<FacetParamsBody>(&body)?
    };
    let selection = parse_facet_params(&params.params);
    compute_facets(state, selection).await.map(Json)
}

/// Runs the executor off the async runtime against the current snapshots.
///
/// Both snapshots are taken once, so a concurrent upload never mixes two
/// corpora into one response.
pub(crate) async fn compute_facets(
    state: Arc<AppState>,
    selection: FilterSelection,
) -> Result<FacetCountsResponse, FacetError> {
    let computation = tokio::task::spawn_blocking(move || {
        let corpus = state.corpus.snapshot();
        let catalog = state.catalog.snapshot();
        let computation = state
            .executor
            .execute_detailed(&corpus, catalog.as_ref(), &selection);
        for fault in &computation.faults {
            state.counters.record_fault(fault.field);
        }
        computation
    })
    .await
    .map_err(|e| FacetError::Internal(format!("spawn_blocking join error: {}", e)))?;

    Ok(computation.response)
}
