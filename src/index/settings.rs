use crate::error::{FacetError, Result};
use crate::types::{Field, FieldKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_price_step() -> i64 {
    500
}

fn default_mileage_step() -> i64 {
    5000
}

fn default_year_step() -> i64 {
    1
}

fn default_mileage_seeds() -> Vec<i64> {
    vec![0, 100, 500, 1000, 2000, 3000, 4000]
}

/// Facet configuration, loaded once at startup from `settings.json`.
///
/// Every field has a default so a partial (or missing) file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FacetSettings {
    #[serde(default = "default_price_step")]
    pub price_step: i64,

    #[serde(default = "default_mileage_step")]
    pub mileage_step: i64,

    #[serde(default = "default_year_step")]
    pub year_step: i64,

    /// Extra low-end price buckets below the first natural step.
    pub price_seeds: Vec<i64>,

    /// Extra low-end mileage buckets below the first natural step.
    #[serde(default = "default_mileage_seeds")]
    pub mileage_seeds: Vec<i64>,

    /// Facets that are never computed nor returned.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_facets: Vec<Field>,
}

impl Default for FacetSettings {
    fn default() -> Self {
        FacetSettings {
            price_step: default_price_step(),
            mileage_step: default_mileage_step(),
            year_step: default_year_step(),
            price_seeds: Vec::new(),
            mileage_seeds: default_mileage_seeds(),
            disabled_facets: Vec::new(),
        }
    }
}

static DEFAULT_SETTINGS: Lazy<FacetSettings> = Lazy::new(FacetSettings::default);

/// Bucketing for a range facet: fixed step plus optional low-end seeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeBucketing {
    pub step: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seeds: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FacetKind {
    Categorical,
    Range(RangeBucketing),
}

/// Static metadata for one facet. Built from [`FacetSettings`], never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetDefinition {
    pub field: Field,
    #[serde(flatten)]
    pub kind: FacetKind,
}

impl FacetDefinition {
    pub fn bucketing(&self) -> Option<&RangeBucketing> {
        match &self.kind {
            FacetKind::Range(b) => Some(b),
            FacetKind::Categorical => None,
        }
    }
}

impl FacetSettings {
    pub fn defaults() -> &'static FacetSettings {
        &DEFAULT_SETTINGS
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: FacetSettings = serde_json::from_str(&content).map_err(|e| {
            FacetError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Ok(settings)
    }

    /// Loads `{dir}/settings.json`, falling back to defaults when absent.
    pub fn load_or_default<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join("settings.json");
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::info!("No settings.json in {}, using defaults", dir.as_ref().display());
            Ok(Self::defaults().clone())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn is_enabled(&self, field: Field) -> bool {
        !self.disabled_facets.contains(&field)
    }

    /// Configured bucketing for a range field; `None` for categorical fields.
    pub fn bucketing(&self, field: Field) -> Option<RangeBucketing> {
        let (step, seeds) = match field {
            Field::Price => (self.price_step, self.price_seeds.clone()),
            Field::Mileage => (self.mileage_step, self.mileage_seeds.clone()),
            Field::Year => (self.year_step, Vec::new()),
            _ => return None,
        };
        Some(RangeBucketing { step, seeds })
    }

    /// Facet definitions for every enabled field, in [`Field::ALL`] order.
    pub fn definitions(&self) -> Vec<FacetDefinition> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.is_enabled(*f))
            .map(|field| {
                let kind = match (field.kind(), self.bucketing(field)) {
                    (FieldKind::Range, Some(b)) => FacetKind::Range(b),
                    _ => FacetKind::Categorical,
                };
                FacetDefinition { field, kind }
            })
            .collect()
    }
}
