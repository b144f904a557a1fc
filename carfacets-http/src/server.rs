use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use carfacets::{CatalogStore, CorpusProvider, CorpusStore, FacetExecutor, FacetSettings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{self, AppState, RequestCounters};
use crate::openapi::ApiDoc;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7800";
const DEFAULT_MAX_BODY_MB: usize = 100;

/// Builds the state `serve` runs with from the files under `data_dir`.
///
/// `settings.json`, `items.json` and `catalog.json` are each optional.
pub fn load_state(data_dir: &str) -> Result<Arc<AppState>, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(data_dir)?;
    let settings = FacetSettings::load_or_default(data_dir)?;
    let corpus = CorpusStore::load_or_empty(data_dir)?;
    let catalog = CatalogStore::load_or_empty(data_dir)?;

    Ok(Arc::new(AppState {
        executor: Arc::new(FacetExecutor::new(Arc::new(settings))),
        corpus: Arc::new(corpus),
        catalog: Arc::new(catalog),
        data_dir: Some(PathBuf::from(data_dir)),
        upload_lock: tokio::sync::Mutex::new(()),
        counters: Arc::new(RequestCounters::new()),
        start_time: Instant::now(),
    }))
}

pub fn build_router(state: Arc<AppState>, max_body_mb: usize) -> Router {
    let swagger = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .route(
            "/1/facets",
            get(handlers::facets::get_facets).post(handlers::facets::post_facets),
        )
        .route(
            "/1/corpus",
            put(handlers::corpus::put_corpus).get(handlers::corpus::get_corpus),
        )
        .route("/1/catalog", put(handlers::catalog::put_catalog))
        .route("/1/settings", get(handlers::settings::get_settings))
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .with_state(state)
        .merge(swagger)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_mb * 1024 * 1024))
        .layer(CorsLayer::very_permissive().max_age(std::time::Duration::from_secs(86400)))
}

pub async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let startup_start = Instant::now();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = std::env::var("CARFACETS_DATA_DIR").unwrap_or_else(|_| "./data".into());
    let bind_addr =
        std::env::var("CARFACETS_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
    let max_body_mb = std::env::var("CARFACETS_MAX_BODY_MB")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_BODY_MB);

    let state = load_state(&data_dir)?;
    let settings = state.executor.settings();
    tracing::info!(
        data_dir = %data_dir,
        items = state.corpus.snapshot().len(),
        labels = state.catalog.snapshot().len(),
        price_step = settings.price_step,
        mileage_step = settings.mileage_step,
        max_body_mb,
        "Facet engine ready"
    );

    let app = build_router(state, max_body_mb);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let local_addr = listener.local_addr()?;

    print_startup_banner(&local_addr.to_string(), startup_start.elapsed().as_millis(), &data_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn print_startup_banner(bind_addr: &str, startup_ms: u128, data_dir: &str) {
    use colored::Colorize;

    let url = format!("http://{}", bind_addr);
    let version = format!("v{}", env!("CARGO_PKG_VERSION"));
    let timing = format!("ready in {}ms", startup_ms);

    println!();
    println!(
        "  {} {}  {}",
        "Carfacets".bold().bright_green(),
        version.as_str().dimmed(),
        timing.as_str().dimmed(),
    );
    println!();
    println!("  {}  Local:      {}", "➜".green(), url.as_str().cyan());
    let docs = format!("{}/swagger-ui", url);
    println!("  {}  API Docs:   {}", "➜".green(), docs.as_str().cyan());
    println!("  {}  Data:       {}", "➜".green(), data_dir.dimmed());
    println!();
}
