pub mod buckets;
pub mod executor;
pub mod filter;

pub use buckets::RangeBucketer;
pub use executor::{FacetComputation, FacetExecutor, FacetFault, RangeFacet};
pub use filter::{CompiledFilter, Constraint, FilterCompiler, MatchMasks};
