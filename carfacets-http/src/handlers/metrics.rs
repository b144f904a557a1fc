//! Prometheus `/metrics` endpoint.
//!
//! Snapshot sizes, uptime, per-route request counts and per-facet fault
//! counts, rendered in Prometheus text exposition format.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use carfacets::CorpusProvider;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::AppState;

/// GET /metrics
///
/// A fresh registry is built per scrape from the live counters, so nothing
/// here holds global prometheus state.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = Registry::new();

    let corpus = state.corpus.snapshot();
    register_gauge(
        &registry,
        "carfacets_corpus_items",
        "Items in the current corpus snapshot",
        corpus.len() as f64,
    );
    register_gauge(
        &registry,
        "carfacets_corpus_fields",
        "Fields provided by the current corpus snapshot",
        corpus.schema().len() as f64,
    );
    register_gauge(
        &registry,
        "carfacets_catalog_labels",
        "Labelled codes in the current catalog",
        state.catalog.snapshot().len() as f64,
    );
    register_gauge(
        &registry,
        "carfacets_uptime_seconds",
        "Seconds since the server started",
        state.start_time.elapsed().as_secs_f64(),
    );

    if let Some(requests) = register_gauge_vec(
        &registry,
        "carfacets_requests_total",
        "Requests served per route",
        "route",
    ) {
        for entry in state.counters.requests.iter() {
            requests
                .with_label_values(&[*entry.key()])
                .set(entry.value().load(Ordering::Relaxed) as f64);
        }
    }

    if let Some(faults) = register_gauge_vec(
        &registry,
        "carfacets_facet_faults_total",
        "Facets omitted from a response because they could not be computed",
        "facet",
    ) {
        for entry in state.counters.facet_faults.iter() {
            faults
                .with_label_values(&[entry.key().as_str()])
                .set(entry.value().load(Ordering::Relaxed) as f64);
        }
    }

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!("[METRICS] encode failed: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        buffer,
    )
        .into_response()
}

fn register_gauge(registry: &Registry, name: &str, help: &str, value: f64) {
    match prometheus::Gauge::new(name, help) {
        Ok(gauge) => {
            if registry.register(Box::new(gauge.clone())).is_ok() {
                gauge.set(value);
            }
        }
        Err(e) => tracing::warn!("[METRICS] gauge {}: {}", name, e),
    }
}

fn register_gauge_vec(registry: &Registry, name: &str, help: &str, label: &str) -> Option<GaugeVec> {
    let gauge = GaugeVec::new(Opts::new(name, help), &[label])
        .map_err(|e| tracing::warn!("[METRICS] gauge {}: {}", name, e))
        .ok()?;
    registry.register(Box::new(gauge.clone())).ok()?;
    Some(gauge)
}
