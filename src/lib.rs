//! Faceted filter aggregation for car listings.
//!
//! Given a corpus of items and the active selections, [`FacetExecutor`]
//! computes self-excluding categorical counts, range buckets and cumulative
//! "From"/"To" option counts, and attaches display labels from a
//! [`LabelSource`].

pub mod catalog;
pub mod error;
pub mod index;
pub mod query;
pub mod types;

#[cfg(test)]
mod integ_tests;

pub use catalog::{Catalog, CatalogStore, LabelSource, NoLabels};
pub use error::{FacetError, Result};
pub use index::{
    CorpusProvider, CorpusSnapshot, CorpusStore, CumulativeIndex, FacetDefinition, FacetKind,
    FacetSettings, RangeBucketing,
};
pub use query::{FacetComputation, FacetExecutor, FacetFault, RangeBucketer};
pub use types::{
    BucketCount, FacetCountsResponse, FacetKey, Field, FieldKind, FilterSelection, Item,
    RangeBound, RangeOption, RangeOptions, RangeSelection,
};
