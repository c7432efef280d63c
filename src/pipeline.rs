use std::path::Path;

use crate::api::Source;
use crate::config::EnrichConfig;
use crate::domain::{EnrichedCollection, SourceFeature};
use crate::enrich::Enricher;
use crate::error::Result;
use crate::output::{WriteSummary, write_collection};

/// load → parse → enrich → write, one stage per method so callers can
/// report progress between them.
pub struct Pipeline {
    enricher: Enricher,
}

impl Pipeline {
    pub fn new(config: &EnrichConfig) -> Self {
        Self {
            enricher: Enricher::new(config),
        }
    }

    /// Load and validate the source document. Nothing per-feature runs
    /// until this succeeds.
    pub fn load(&self, source: &dyn Source) -> Result<Vec<SourceFeature>> {
        let document = source.load()?;
        SourceFeature::collection_from_value(document)
    }

    pub fn enrich(&self, features: Vec<SourceFeature>) -> EnrichedCollection {
        self.enricher.enrich_all(features)
    }

    pub fn write(&self, out: &Path, collection: &EnrichedCollection) -> Result<WriteSummary> {
        write_collection(out, collection)
    }

    pub fn run(&self, source: &dyn Source, out: &Path) -> Result<WriteSummary> {
        let features = self.load(source)?;
        let collection = self.enrich(features);
        self.write(out, &collection)
    }
}
