pub mod corpus;
pub mod cumulative;
pub mod settings;
pub mod snapshot;

pub use corpus::{CorpusProvider, CorpusSnapshot, CorpusStore};
pub use cumulative::CumulativeIndex;
pub use settings::{FacetDefinition, FacetKind, FacetSettings, RangeBucketing};
