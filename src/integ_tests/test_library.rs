//! Library wiring: data dir loading, snapshot swaps, concurrent callers.

use crate::catalog::{CatalogStore, LabelSource};
use crate::index::corpus::{CorpusProvider, CorpusSnapshot, CorpusStore};
use crate::index::settings::FacetSettings;
use crate::query::FacetExecutor;
use crate::types::{FacetKey, Field, FilterSelection, Item};
use std::sync::Arc;
use tempfile::TempDir;

fn write_data_dir(dir: &std::path::Path) {
    std::fs::write(
        dir.join("settings.json"),
        r#"{"priceStep": 1000, "mileageSeeds": [0, 1000], "disabledFacets": ["doors"]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("items.json"),
        r#"[
            {"id": "1", "makeCode": "skoda", "modelCode": "octavia", "price": 12500, "mileage": 800},
            {"id": "2", "makeCode": "skoda", "modelCode": "fabia", "price": 7400, "mileage": 64000},
            {"id": "3", "makeCode": "seat", "modelCode": "leon", "price": 13999.99, "mileage": 31000}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("catalog.json"),
        r#"{
            "makes": [{"code": "SKODA", "name": "Škoda"}, {"code": "SEAT", "name": "SEAT"}],
            "models": [
                {"code": "OCTAVIA", "name": "Octavia", "makeCode": "SKODA"},
                {"code": "FABIA", "name": "Fabia", "makeCode": "SKODA"},
                {"code": "LEON", "name": "Leon", "makeCode": "SEAT"}
            ]
        }"#,
    )
    .unwrap();
}

#[test]
fn test_data_dir_end_to_end() {
    let tmp = TempDir::new().unwrap();
    write_data_dir(tmp.path());

    let settings = FacetSettings::load_or_default(tmp.path()).unwrap();
    let corpus = CorpusStore::load_or_empty(tmp.path()).unwrap();
    let catalog = CatalogStore::load_or_empty(tmp.path()).unwrap();
    let exec = FacetExecutor::new(Arc::new(settings));

    let sel = FilterSelection::new().with_codes(Field::Make, ["skoda"]);
    let resp = exec.execute(&corpus.snapshot(), catalog.snapshot().as_ref(), &sel);

    assert_eq!(resp.price_step, 1000);
    assert!(resp.doors.is_none());
    let prices: Vec<i64> = resp.prices.as_ref().unwrap().keys().copied().collect();
    assert_eq!(prices, vec![7000, 12000]);
    assert_eq!(resp.make_labels.get("SKODA").map(String::as_str), Some("Škoda"));
    assert_eq!(resp.makes.as_ref().unwrap().get(&FacetKey::code("SEAT")), Some(&1));
    assert!(!resp.models.as_ref().unwrap().contains_key(&FacetKey::code("LEON")));
    assert_eq!(resp.min_mileage, 800);
}

#[test]
fn test_corpus_swap_does_not_affect_held_snapshot() {
    let store = CorpusStore::new(CorpusSnapshot::new(vec![Item::new("1").with_make("BMW")]));
    let exec = FacetExecutor::new(Arc::new(FacetSettings::default()));

    let held = store.snapshot();
    store.replace(CorpusSnapshot::new(vec![
        Item::new("a").with_make("AUDI"),
        Item::new("b").with_make("AUDI"),
    ]));

    let before = exec.execute(&held, &crate::catalog::NoLabels, &FilterSelection::new());
    let after = exec.execute(&store.snapshot(), &crate::catalog::NoLabels, &FilterSelection::new());
    assert_eq!(before.makes.as_ref().unwrap().get(&FacetKey::code("BMW")), Some(&1));
    assert_eq!(after.makes.as_ref().unwrap().get(&FacetKey::code("AUDI")), Some(&2));
}

#[test]
fn test_concurrent_requests_agree() {
    let items: Vec<Item> = (0..500)
        .map(|i| {
            Item::new(i.to_string())
                .with_make(if i % 3 == 0 { "BMW" } else { "VW" })
                .with_price((i * 97 % 30000) as f64)
                .with_mileage((i * 1013 % 200000) as f64)
        })
        .collect();
    let store = Arc::new(CorpusStore::new(CorpusSnapshot::new(items)));
    let exec = Arc::new(FacetExecutor::new(Arc::new(FacetSettings::default())));
    let sel = FilterSelection::new()
        .with_codes(Field::Make, ["VW"])
        .with_range(Field::Price, Some(1000.0), Some(20000.0));

    let expected = exec.execute(&store.snapshot(), &crate::catalog::NoLabels, &sel);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let exec = Arc::clone(&exec);
            let sel = sel.clone();
            std::thread::spawn(move || exec.execute(&store.snapshot(), &crate::catalog::NoLabels, &sel))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn test_label_source_through_arc() {
    let tmp = TempDir::new().unwrap();
    write_data_dir(tmp.path());
    let store = CatalogStore::load_or_empty(tmp.path()).unwrap();
    let snapshot = store.snapshot();
    let source: &dyn LabelSource = &snapshot;
    assert_eq!(source.label(Field::Model, "LEON"), Some("Leon"));
    assert_eq!(source.make_of_model("FABIA"), Some("SKODA"));
}
