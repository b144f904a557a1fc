mod facets;
mod ranges;

pub use ranges::RangeFacet;

use crate::catalog::LabelSource;
use crate::error::FacetError;
use crate::index::corpus::CorpusSnapshot;
use crate::index::settings::{FacetDefinition, FacetKind, FacetSettings};
use crate::query::buckets::RangeBucketer;
use crate::query::filter::{CompiledFilter, FilterCompiler, MatchMasks};
use crate::types::{FacetCountsResponse, Field, FilterSelection};
use std::sync::Arc;
use std::time::Instant;

/// A facet that could not be computed and was left out of the response.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetFault {
    pub field: Field,
    pub error: FacetError,
}

/// Response plus the facets that were omitted while assembling it.
#[derive(Debug, Clone)]
pub struct FacetComputation {
    pub response: FacetCountsResponse,
    pub faults: Vec<FacetFault>,
}

/// Computes facet counts for one selection over one corpus snapshot.
///
/// Holds only configuration; every call is a pure function of its arguments
/// and shares nothing with concurrent calls.
pub struct FacetExecutor {
    settings: Arc<FacetSettings>,
    definitions: Vec<FacetDefinition>,
    price_step: i64,
    mileage_step: i64,
}

impl FacetExecutor {
    pub fn new(settings: Arc<FacetSettings>) -> Self {
        let definitions = settings.definitions();
        let price_step = RangeBucketer::new(settings.price_step, &[]).step();
        let mileage_step = RangeBucketer::new(settings.mileage_step, &[]).step();
        FacetExecutor {
            settings,
            definitions,
            price_step,
            mileage_step,
        }
    }

    pub fn settings(&self) -> &FacetSettings {
        &self.settings
    }

    pub fn definitions(&self) -> &[FacetDefinition] {
        &self.definitions
    }

    pub fn execute(
        &self,
        corpus: &CorpusSnapshot,
        labels: &dyn LabelSource,
        selection: &FilterSelection,
    ) -> FacetCountsResponse {
        self.execute_detailed(corpus, labels, selection).response
    }

    pub fn execute_detailed(
        &self,
        corpus: &CorpusSnapshot,
        labels: &dyn LabelSource,
        selection: &FilterSelection,
    ) -> FacetComputation {
        let t0 = Instant::now();
        let filter = FilterCompiler::new(corpus).compile(selection);
        let masks = filter.evaluate(corpus.items());
        let t_filter = t0.elapsed();

        let mut response = FacetCountsResponse {
            price_step: self.price_step,
            mileage_step: self.mileage_step,
            ..Default::default()
        };
        let mut faults = Vec::new();

        for def in &self.definitions {
            if let Err(error) = self.compute_facet(corpus, &filter, &masks, def, &mut response) {
                tracing::warn!("[FACETS] omitting {}: {}", def.field, error);
                faults.push(FacetFault {
                    field: def.field,
                    error,
                });
            }
        }
        let t_counts = t0.elapsed();

        self.apply_model_display_filter(&filter, labels, &mut response);
        self.attach_labels(&filter, labels, selection, &mut response);

        tracing::debug!(
            "[FACETS] items={} constrained={} filter={:?} counts={:?} total={:?} omitted={}",
            corpus.len(),
            filter.fields().count(),
            t_filter,
            t_counts.saturating_sub(t_filter),
            t0.elapsed(),
            faults.len()
        );

        FacetComputation { response, faults }
    }

    fn compute_facet(
        &self,
        corpus: &CorpusSnapshot,
        filter: &CompiledFilter,
        masks: &MatchMasks,
        def: &FacetDefinition,
        response: &mut FacetCountsResponse,
    ) -> crate::error::Result<()> {
        if !corpus.provides(def.field) {
            return Err(FacetError::FieldNotConfigured(def.field.as_str().to_string()));
        }

        match &def.kind {
            FacetKind::Categorical => {
                let counts = self.count_categorical(corpus.items(), masks, def.field);
                let slot = response.categorical_slot(def.field).ok_or_else(|| {
                    FacetError::Internal(format!("{} has no categorical slot", def.field))
                })?;
                *slot = Some(counts);
            }
            FacetKind::Range(bucketing) => {
                let facet = self.compute_range(corpus.items(), filter, masks, def.field, bucketing);
                if def.field == Field::Mileage {
                    response.min_mileage = facet.min_value.unwrap_or(0);
                    response.mileage_exact = facet.exact.clone();
                }
                let (buckets, options) = response.range_slots(def.field).ok_or_else(|| {
                    FacetError::Internal(format!("{} has no range slot", def.field))
                })?;
                *buckets = Some(facet.buckets);
                *options = Some(facet.options);
            }
        }
        Ok(())
    }
}
