use carfacets::{CatalogStore, CorpusStore, FacetExecutor, Field};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub mod catalog;
pub mod corpus;
pub mod facets;
pub mod health;
pub mod metrics;
pub mod settings;

pub struct AppState {
    pub executor: Arc<FacetExecutor>,
    pub corpus: Arc<CorpusStore>,
    pub catalog: Arc<CatalogStore>,
    /// Where uploads are persisted; `None` keeps them in memory only.
    pub data_dir: Option<PathBuf>,
    /// Held across persist and swap so the file on disk always matches the
    /// snapshot last installed.
    pub upload_lock: tokio::sync::Mutex<()>,
    pub counters: Arc<RequestCounters>,
    pub start_time: std::time::Instant,
}

/// Monotonic counters read by `/metrics`.
#[derive(Default)]
pub struct RequestCounters {
    pub requests: DashMap<&'static str, AtomicU64>,
    pub facet_faults: DashMap<Field, AtomicU64>,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, route: &'static str) {
        self.requests
            .entry(route)
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fault(&self, field: Field) {
        self.facet_faults
            .entry(field)
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self, route: &str) -> u64 {
        self.requests
            .get(route)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    pub fn faults(&self, field: Field) -> u64 {
        self.facet_faults
            .get(&field)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }
}
