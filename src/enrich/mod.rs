use serde_json::{Map, Value};

use crate::config::{EnrichConfig, NameKeys};
use crate::domain::{EnrichedCollection, EnrichedFeature, EnrichedProperties, SourceFeature};
use crate::geometry::{estimate_centroid, to_lat_lon};
use crate::synth::Synthesizer;

pub const UNKNOWN_NAME: &str = "Unknown";

/// Pick the display name: first key in priority order holding a non-empty
/// string, else `"Unknown"`.
pub fn resolve_name(properties: &Map<String, Value>, names: &NameKeys) -> String {
    names
        .keys
        .iter()
        .find_map(|key| match properties.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Turns source features into enriched ones. Holds no per-run state.
#[derive(Debug, Clone, Default)]
pub struct Enricher {
    names: NameKeys,
    synth: Synthesizer,
}

impl Enricher {
    pub fn new(config: &EnrichConfig) -> Self {
        Self {
            names: config.names.clone(),
            synth: Synthesizer::new(config.synth.hash, config.locale),
        }
    }

    pub fn enrich_feature(&self, feature: SourceFeature) -> EnrichedFeature {
        let name = resolve_name(&feature.properties, &self.names);
        let center = to_lat_lon(estimate_centroid(feature.geometry.as_ref()));
        let attrs = self.synth.attributes(&name);

        let properties = EnrichedProperties {
            name,
            population: attrs.population,
            gdp: attrs.gdp,
            water_score: attrs.water_score,
            water_resources: attrs.water_resources,
            center,
        };
        EnrichedFeature::new(properties, feature.geometry)
    }

    /// Enrich every feature, preserving count and order
    pub fn enrich_all(&self, features: Vec<SourceFeature>) -> EnrichedCollection {
        let enriched: Vec<EnrichedFeature> = features
            .into_iter()
            .map(|f| self.enrich_feature(f))
            .collect();

        let unknown = enriched
            .iter()
            .filter(|f| f.properties.name == UNKNOWN_NAME)
            .count();
        if unknown > 0 {
            log::warn!("{} feature(s) had no usable name property", unknown);
        }

        EnrichedCollection::new(enriched)
    }
}
