use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Starts the full router on an ephemeral port backed by a fresh data dir.
///
/// Returns the bound `host:port` and the dir, which must outlive the test.
#[allow(dead_code)]
pub async fn spawn_server() -> (String, TempDir) {
    spawn_server_with(|_| {}).await
}

/// Like [`spawn_server`], but lets the caller seed the data dir first.
pub async fn spawn_server_with<F>(seed: F) -> (String, TempDir)
where
    F: FnOnce(&std::path::Path),
{
    let temp_dir = TempDir::new().unwrap();
    seed(temp_dir.path());

    let state = carfacets_http::server::load_state(temp_dir.path().to_str().unwrap()).unwrap();
    let app = carfacets_http::build_router(Arc::clone(&state), 100);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr.to_string(), temp_dir)
}

/// Listings used across the HTTP scenarios.
#[allow(dead_code)]
pub fn sample_corpus() -> serde_json::Value {
    serde_json::json!([
        {"id": "1", "makeCode": "BMW", "modelCode": "X5", "fuelTypeCode": "DIESEL",
         "bodyTypeCode": "SUV", "price": 15300, "mileage": 42000, "modelYear": 2019, "seats": 5},
        {"id": "2", "makeCode": "BMW", "modelCode": "320", "fuelTypeCode": "PETROL",
         "bodyTypeCode": "SEDAN", "price": 9800, "mileage": 88000, "modelYear": 2016, "seats": 5},
        {"id": "3", "makeCode": "AUDI", "modelCode": "A4", "fuelTypeCode": "DIESEL",
         "bodyTypeCode": "ESTATE", "price": 5200, "mileage": 150, "modelYear": 2021, "seats": 5},
        {"id": "4", "makeCode": "AUDI", "modelCode": "Q7", "fuelTypeCode": "DIESEL",
         "bodyTypeCode": "SUV", "price": 4500, "mileage": 3500, "modelYear": 2012, "seats": 7},
        {"id": "5", "makeCode": "SKODA", "modelCode": "FABIA", "fuelTypeCode": "PETROL",
         "bodyTypeCode": "HATCH", "price": 4000, "mileage": 120000, "modelYear": 2010, "seats": 5}
    ])
}

#[allow(dead_code)]
pub fn sample_catalog() -> serde_json::Value {
    serde_json::json!({
        "makes": [
            {"code": "BMW", "name": "BMW"},
            {"code": "AUDI", "name": "Audi"},
            {"code": "SKODA", "name": "Škoda"}
        ],
        "models": [
            {"code": "X5", "name": "X5", "makeCode": "BMW"},
            {"code": "320", "name": "3 Series", "makeCode": "BMW"},
            {"code": "A4", "name": "A4", "makeCode": "AUDI"},
            {"code": "Q7", "name": "Q7", "makeCode": "AUDI"},
            {"code": "FABIA", "name": "Fabia", "makeCode": "SKODA"}
        ],
        "fuelTypes": [
            {"code": "DIESEL", "name": "Diesel"},
            {"code": "PETROL", "name": "Petrol"}
        ]
    })
}
