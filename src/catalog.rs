//! Display labels for facet codes.
//!
//! The engine never invents a label: a code the catalog does not know simply
//! has no entry in the response's label maps.

use crate::error::{FacetError, Result};
use crate::index::snapshot::SnapshotCell;
use crate::types::{normalize_code, Field};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only code → name lookup used by the response assembler.
pub trait LabelSource: Send + Sync {
    /// Display name for a normalized code of a code field.
    fn label(&self, field: Field, code: &str) -> Option<&str>;

    /// Make code owning a model code, when known.
    fn make_of_model(&self, model_code: &str) -> Option<&str>;
}

/// Label source that knows nothing. Every label map comes back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl LabelSource for NoLabels {
    fn label(&self, _field: Field, _code: &str) -> Option<&str> {
        None
    }

    fn make_of_model(&self, _model_code: &str) -> Option<&str> {
        None
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    code: String,
    name: String,
    #[serde(default)]
    make_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CatalogDocument {
    makes: Vec<CatalogEntry>,
    models: Vec<CatalogEntry>,
    transmission_types: Vec<CatalogEntry>,
    body_types: Vec<CatalogEntry>,
    fuel_types: Vec<CatalogEntry>,
}

/// In-memory catalog snapshot: names per code field plus model → make.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names: HashMap<Field, HashMap<String, String>>,
    model_makes: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, field: Field, code: &str, name: &str) -> Self {
        self.insert(field, code, name);
        self
    }

    pub fn with_model(mut self, make_code: &str, model_code: &str, name: &str) -> Self {
        self.insert(Field::Model, model_code, name);
        self.model_makes
            .insert(normalize_code(model_code), normalize_code(make_code));
        self
    }

    fn insert(&mut self, field: Field, code: &str, name: &str) {
        self.names
            .entry(field)
            .or_default()
            .insert(normalize_code(code), name.to_string());
    }

    /// Parses `{"makes": [...], "models": [...], "transmissionTypes": [...],
    /// "bodyTypes": [...], "fuelTypes": [...]}`; every list is optional and
    /// each entry is `{"code", "name"}` (models also carry `makeCode`).
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let doc: CatalogDocument = serde_json::from_value(value)
            .map_err(|e| FacetError::InvalidCatalog(e.to_string()))?;

        let mut catalog = Catalog::new();
        for (field, entries) in [
            (Field::Make, doc.makes),
            (Field::Transmission, doc.transmission_types),
            (Field::Body, doc.body_types),
            (Field::Fuel, doc.fuel_types),
        ] {
            for entry in entries {
                catalog.insert(field, &entry.code, &entry.name);
            }
        }
        for entry in doc.models {
            match entry.make_code.as_deref() {
                Some(make) => catalog = catalog.with_model(make, &entry.code, &entry.name),
                None => catalog.insert(Field::Model, &entry.code, &entry.name),
            }
        }
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        Self::from_json(value)
    }

    /// Number of labelled codes across all fields.
    pub fn len(&self) -> usize {
        self.names.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LabelSource for Catalog {
    fn label(&self, field: Field, code: &str) -> Option<&str> {
        self.names
            .get(&field)
            .and_then(|m| m.get(code))
            .map(String::as_str)
    }

    fn make_of_model(&self, model_code: &str) -> Option<&str> {
        self.model_makes.get(model_code).map(String::as_str)
    }
}

impl<T: LabelSource + ?Sized> LabelSource for Arc<T> {
    fn label(&self, field: Field, code: &str) -> Option<&str> {
        (**self).label(field, code)
    }

    fn make_of_model(&self, model_code: &str) -> Option<&str> {
        (**self).make_of_model(model_code)
    }
}

/// Swappable catalog snapshot shared by request handlers.
#[derive(Default)]
pub struct CatalogStore {
    cell: SnapshotCell<Catalog>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        CatalogStore {
            cell: SnapshotCell::new(catalog),
        }
    }

    /// Loads `{dir}/catalog.json` if present, otherwise starts empty.
    pub fn load_or_empty<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join("catalog.json");
        if !path.exists() {
            tracing::info!("No catalog.json in {}, labels disabled", dir.as_ref().display());
            return Ok(Self::default());
        }
        let catalog = Catalog::load(&path)?;
        tracing::info!(labels = catalog.len(), "Catalog loaded from {}", path.display());
        Ok(Self::new(catalog))
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.cell.load()
    }

    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let labels = catalog.len();
        let previous = self.cell.store(catalog);
        tracing::info!(labels, "Catalog snapshot replaced");
        previous
    }
}
