pub mod feature;

pub use feature::{EnrichedCollection, EnrichedFeature, EnrichedProperties, SourceFeature};
