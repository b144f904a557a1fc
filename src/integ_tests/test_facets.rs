//! Facet scenarios against small literal corpora.

use crate::catalog::{Catalog, NoLabels};
use crate::index::corpus::CorpusSnapshot;
use crate::index::settings::FacetSettings;
use crate::query::FacetExecutor;
use crate::types::{FacetKey, Field, FilterSelection, Item, RangeBound};
use std::sync::Arc;

// ============================================================
// Shared helpers
// ============================================================

fn executor() -> FacetExecutor {
    FacetExecutor::new(Arc::new(FacetSettings::default()))
}

fn priced(prices: &[f64]) -> CorpusSnapshot {
    CorpusSnapshot::new(
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| Item::new(format!("car{}", i)).with_price(*p))
            .collect(),
    )
}

fn code(c: &str) -> FacetKey {
    FacetKey::code(c)
}

// ============================================================
// Range facets
// ============================================================

#[test]
fn test_price_buckets_and_from_without_selection() {
    let corpus = priced(&[4000.0, 4500.0, 5200.0, 9800.0, 15300.0]);
    let resp = executor().execute(&corpus, &NoLabels, &FilterSelection::new());

    let prices: Vec<(i64, u64)> = resp.prices.as_ref().unwrap().iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(
        prices,
        vec![(4000, 1), (4500, 1), (5000, 1), (9500, 1), (15000, 1)]
    );

    let opts = resp.price_options.as_ref().unwrap();
    assert_eq!(opts.from_count(RangeBound::Bound(5000)), Some(3));
    assert_eq!(opts.from_count(RangeBound::Unbounded), Some(5));
}

#[test]
fn test_price_from_respects_selected_max() {
    let corpus = priced(&[4000.0, 4500.0, 5200.0, 9800.0, 15300.0]);
    let sel = FilterSelection::new().with_range(Field::Price, None, Some(9999.0));
    let resp = executor().execute(&corpus, &NoLabels, &sel);

    let opts = resp.price_options.as_ref().unwrap();
    assert_eq!(opts.from_count(RangeBound::Bound(4000)), Some(4));
    assert_eq!(opts.from_count(RangeBound::Unbounded), Some(4));
    // own selection does not hide buckets
    assert_eq!(resp.prices.as_ref().unwrap().len(), 5);
}

#[test]
fn test_to_options_respect_selected_min() {
    let corpus = priced(&[4000.0, 4500.0, 5200.0, 9800.0, 15300.0]);
    let sel = FilterSelection::new().with_range(Field::Price, Some(5000.0), None);
    let resp = executor().execute(&corpus, &NoLabels, &sel);

    let opts = resp.price_options.as_ref().unwrap();
    assert_eq!(opts.to_count(RangeBound::Unbounded), Some(3));
    assert_eq!(opts.to_count(RangeBound::Bound(5000)), Some(1));
    assert_eq!(opts.to_count(RangeBound::Bound(9500)), Some(2));
    assert_eq!(opts.to_count(RangeBound::Bound(4500)), None);
}

#[test]
fn test_any_option_always_first() {
    let corpus = priced(&[100.0, 200.0]);
    let resp = executor().execute(&corpus, &NoLabels, &FilterSelection::new());
    let opts = resp.price_options.as_ref().unwrap();
    assert_eq!(opts.from[0].bound, RangeBound::Unbounded);
    assert_eq!(opts.to[0].bound, RangeBound::Unbounded);
}

#[test]
fn test_negative_one_is_an_ordinary_value() {
    let corpus = priced(&[-1.0, 0.0, 10.0]);
    let settings = FacetSettings {
        price_step: 1,
        ..FacetSettings::default()
    };
    let resp = FacetExecutor::new(Arc::new(settings)).execute(&corpus, &NoLabels, &FilterSelection::new());
    let opts = resp.price_options.as_ref().unwrap();
    assert_eq!(opts.from_count(RangeBound::Bound(-1)), Some(3));
    assert_eq!(opts.from_count(RangeBound::Unbounded), Some(3));
    assert_eq!(opts.to_count(RangeBound::Bound(-1)), Some(1));
}

#[test]
fn test_year_every_distinct_year_is_a_bucket() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_year(2015),
        Item::new("2").with_year(2016),
        Item::new("3").with_year(2016),
        Item::new("4").with_year(2021),
    ]);
    let resp = executor().execute(&corpus, &NoLabels, &FilterSelection::new());
    let years: Vec<(i64, u64)> = resp.years.as_ref().unwrap().iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(years, vec![(2015, 1), (2016, 2), (2021, 1)]);
}

#[test]
fn test_mileage_seeds_and_min_mileage() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_mileage(80.0),
        Item::new("2").with_mileage(1200.0),
        Item::new("3").with_mileage(3100.0),
        Item::new("4").with_mileage(17000.0),
    ]);
    let resp = executor().execute(&corpus, &NoLabels, &FilterSelection::new());

    assert_eq!(resp.min_mileage, 80);
    let keys: Vec<i64> = resp.mileages.as_ref().unwrap().keys().copied().collect();
    assert_eq!(keys, vec![0, 1000, 3000, 15000]);

    let exact: Vec<i64> = resp.mileage_exact.keys().copied().collect();
    assert_eq!(exact, vec![80, 1200, 3100]);

    let opts = resp.mileage_options.as_ref().unwrap();
    // seeds up to the highest populated low bucket are offered
    assert_eq!(opts.from_count(RangeBound::Bound(100)), Some(3));
    assert_eq!(opts.from_count(RangeBound::Bound(2000)), Some(2));
    assert_eq!(opts.from_count(RangeBound::Bound(4000)), None);
}

// ============================================================
// Categorical facets
// ============================================================

#[test]
fn test_fuel_self_exclusion() {
    let mut items = Vec::new();
    for i in 0..6 {
        items.push(Item::new(format!("p{}", i)).with_fuel("PETROL"));
    }
    for i in 0..4 {
        items.push(Item::new(format!("e{}", i)).with_fuel("ELECTRIC"));
    }
    let corpus = CorpusSnapshot::new(items);
    let sel = FilterSelection::new().with_codes(Field::Fuel, ["ELECTRIC"]);
    let resp = executor().execute(&corpus, &NoLabels, &sel);

    let fuels = resp.fuels.as_ref().unwrap();
    assert_eq!(fuels.get(&code("PETROL")), Some(&6));
    assert_eq!(fuels.get(&code("ELECTRIC")), Some(&4));
    assert_eq!(fuels.len(), 2);
}

#[test]
fn test_other_facets_narrow_counts() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_make("BMW").with_fuel("PETROL"),
        Item::new("2").with_make("BMW").with_fuel("DIESEL"),
        Item::new("3").with_make("AUDI").with_fuel("PETROL"),
    ]);
    let sel = FilterSelection::new().with_codes(Field::Fuel, ["PETROL"]);
    let resp = executor().execute(&corpus, &NoLabels, &sel);

    let makes = resp.makes.as_ref().unwrap();
    assert_eq!(makes.get(&code("BMW")), Some(&1));
    assert_eq!(makes.get(&code("AUDI")), Some(&1));
}

#[test]
fn test_zero_counts_are_omitted() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_make("BMW").with_body("SUV"),
        Item::new("2").with_make("AUDI").with_body("HATCH"),
    ]);
    let sel = FilterSelection::new().with_codes(Field::Make, ["BMW"]);
    let resp = executor().execute(&corpus, &NoLabels, &sel);
    let bodies = resp.bodies.as_ref().unwrap();
    assert!(!bodies.contains_key(&code("HATCH")));
    assert_eq!(bodies.get(&code("SUV")), Some(&1));
}

#[test]
fn test_codes_are_case_normalized() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_make("bmw"),
        Item::new("2").with_make(" BMW "),
        Item::new("3").with_make("Audi"),
    ]);
    let sel = FilterSelection::new().with_codes(Field::Make, ["audi"]);
    let resp = executor().execute(&corpus, &NoLabels, &sel);
    assert_eq!(resp.makes.as_ref().unwrap().get(&code("BMW")), Some(&2));
}

#[test]
fn test_seats_and_doors_exact_match() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_seats(5).with_doors(5).with_fuel("PETROL"),
        Item::new("2").with_seats(7).with_doors(5).with_fuel("DIESEL"),
        Item::new("3").with_seats(2).with_doors(3).with_fuel("PETROL"),
    ]);
    let sel = FilterSelection::new().with_numbers(Field::Seats, [5, 7]);
    let resp = executor().execute(&corpus, &NoLabels, &sel);

    let fuels = resp.fuels.as_ref().unwrap();
    assert_eq!(fuels.get(&code("PETROL")), Some(&1));
    assert_eq!(fuels.get(&code("DIESEL")), Some(&1));
    assert_eq!(resp.seats.as_ref().unwrap().len(), 3);
    assert_eq!(resp.doors.as_ref().unwrap().get(&FacetKey::Number(5)), Some(&2));
}

#[test]
fn test_unknown_code_is_unconstrained() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_make("BMW").with_fuel("PETROL"),
        Item::new("2").with_make("AUDI").with_fuel("DIESEL"),
    ]);
    let sel = FilterSelection::new().with_codes(Field::Make, ["TRABANT"]);
    let resp = executor().execute(&corpus, &NoLabels, &sel);
    assert_eq!(resp.fuels.as_ref().unwrap().len(), 2);
}

// ============================================================
// Model display filter and labels
// ============================================================

fn toyota_catalog() -> Catalog {
    Catalog::new()
        .with_label(Field::Make, "TOYOTA", "Toyota")
        .with_label(Field::Make, "BMW", "BMW")
        .with_model("TOYOTA", "COROLLA", "Corolla")
        .with_model("TOYOTA", "YARIS", "Yaris")
        .with_model("BMW", "X5", "X5")
        .with_label(Field::Fuel, "PETROL", "Petrol")
}

#[test]
fn test_make_selection_removes_foreign_models() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_make("TOYOTA").with_model("COROLLA"),
        Item::new("2").with_make("TOYOTA").with_model("YARIS"),
        Item::new("3").with_make("BMW").with_model("X5"),
        // inconsistent listing: catalog says X5 is a BMW
        Item::new("4").with_make("TOYOTA").with_model("X5"),
    ]);
    let sel = FilterSelection::new()
        .with_codes(Field::Make, ["TOYOTA"])
        .with_codes(Field::Model, ["X5"]);
    let resp = executor().execute(&corpus, &toyota_catalog(), &sel);

    let models = resp.models.as_ref().unwrap();
    assert!(models.contains_key(&code("COROLLA")));
    assert!(models.contains_key(&code("YARIS")));
    assert!(!models.contains_key(&code("X5")));
    assert!(!resp.model_labels.contains_key("X5"));

    // makes are counted with the model filter applied, ignoring the make selection
    let makes = resp.makes.as_ref().unwrap();
    assert_eq!(makes.get(&code("TOYOTA")), Some(&1));
    assert_eq!(makes.get(&code("BMW")), Some(&1));
}

#[test]
fn test_labels_attached_for_present_codes() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_make("TOYOTA").with_model("COROLLA").with_fuel("PETROL"),
        Item::new("2").with_make("DACIA").with_fuel("LPG"),
    ]);
    let resp = executor().execute(&corpus, &toyota_catalog(), &FilterSelection::new());

    assert_eq!(resp.make_labels.get("TOYOTA").map(String::as_str), Some("Toyota"));
    assert!(!resp.make_labels.contains_key("DACIA"));
    assert!(!resp.make_labels.contains_key("BMW"));
    assert_eq!(resp.model_labels.get("COROLLA").map(String::as_str), Some("Corolla"));
    assert_eq!(resp.model_make_codes.get("COROLLA").map(String::as_str), Some("TOYOTA"));
    assert_eq!(resp.fuel_labels.get("PETROL").map(String::as_str), Some("Petrol"));
    assert!(!resp.fuel_labels.contains_key("LPG"));
}

// ============================================================
// Empty and degraded inputs
// ============================================================

#[test]
fn test_empty_corpus() {
    let resp = executor().execute(&CorpusSnapshot::empty(), &toyota_catalog(), &FilterSelection::new());
    assert!(resp.makes.as_ref().unwrap().is_empty());
    assert!(resp.prices.as_ref().unwrap().is_empty());
    assert!(resp.mileages.as_ref().unwrap().is_empty());
    assert_eq!(resp.price_step, 500);
    assert_eq!(resp.mileage_step, 5000);
    assert!(resp.make_labels.is_empty());
}

#[test]
fn test_empty_corpus_with_selection() {
    let sel = FilterSelection::new()
        .with_codes(Field::Make, ["BMW"])
        .with_range(Field::Mileage, Some(1000.0), Some(50000.0));
    let resp = executor().execute(&CorpusSnapshot::empty(), &NoLabels, &sel);
    assert!(resp.makes.as_ref().unwrap().is_empty());
    assert_eq!(resp.min_mileage, 0);
}

#[test]
fn test_non_finite_range_is_unbounded() {
    let corpus = priced(&[1000.0, 2000.0]);
    let sel = FilterSelection::new().with_range(Field::Price, Some(f64::NAN), Some(f64::INFINITY));
    let resp = executor().execute(&corpus, &NoLabels, &sel);
    let opts = resp.price_options.as_ref().unwrap();
    assert_eq!(opts.from_count(RangeBound::Unbounded), Some(2));
    assert_eq!(opts.to_count(RangeBound::Unbounded), Some(2));
}

#[test]
fn test_items_without_value_are_not_bucketed() {
    let corpus = CorpusSnapshot::new(vec![
        Item::new("1").with_price(1000.0),
        Item::new("2"),
        Item::new("3").with_price(f64::NAN),
    ]);
    let resp = executor().execute(&corpus, &NoLabels, &FilterSelection::new());
    let total: u64 = resp.prices.as_ref().unwrap().values().sum();
    assert_eq!(total, 1);
}
