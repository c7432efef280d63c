use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BuildError, Result};

/// One input feature, reduced to the parts the enricher reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFeature {
    pub properties: Map<String, Value>,
    /// Raw geometry, copied to the output untouched
    pub geometry: Option<Value>,
}

impl SourceFeature {
    /// Build from an arbitrary JSON value. Non-object features and
    /// non-object property sets are read as empty rather than rejected.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut object) = value else {
            return Self::default();
        };

        let properties = match object.remove("properties") {
            Some(Value::Object(props)) => props,
            _ => Map::new(),
        };
        let geometry = object.remove("geometry").filter(|g| !g.is_null());

        Self {
            properties,
            geometry,
        }
    }

    /// Parse a FeatureCollection document into its features, in order.
    ///
    /// Fails when the document is not an object, declares a `type` other
    /// than `FeatureCollection`, or has no `features` array.
    pub fn collection_from_value(document: Value) -> Result<Vec<SourceFeature>> {
        let Value::Object(mut object) = document else {
            return Err(BuildError::Malformed(
                "top-level value is not a JSON object".to_string(),
            ));
        };

        match object.get("type") {
            None => {}
            Some(Value::String(kind)) if kind == "FeatureCollection" => {}
            Some(other) => {
                return Err(BuildError::Malformed(format!(
                    "expected type \"FeatureCollection\", found {other}"
                )));
            }
        }

        match object.remove("features") {
            Some(Value::Array(features)) => {
                Ok(features.into_iter().map(SourceFeature::from_value).collect())
            }
            Some(_) => Err(BuildError::Malformed(
                "`features` is not an array".to_string(),
            )),
            None => Err(BuildError::Malformed("missing `features`".to_string())),
        }
    }
}

/// Replacement property set written for every feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProperties {
    pub name: String,
    pub population: u64,
    pub gdp: u64,
    pub water_score: u8,
    pub water_resources: String,
    /// [lat, lon]
    pub center: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFeature {
    #[serde(rename = "type")]
    pub type_: String,
    pub properties: EnrichedProperties,
    pub geometry: Value,
}

impl EnrichedFeature {
    pub fn new(properties: EnrichedProperties, geometry: Option<Value>) -> Self {
        Self {
            type_: "Feature".to_string(),
            properties,
            geometry: geometry.unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCollection {
    #[serde(rename = "type")]
    pub type_: String,
    pub features: Vec<EnrichedFeature>,
}

impl EnrichedCollection {
    pub fn new(features: Vec<EnrichedFeature>) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_properties_and_geometry() {
        let feature = SourceFeature::from_value(json!({
            "type": "Feature",
            "properties": {"ADMIN": "Chile"},
            "geometry": {"type": "Point", "coordinates": [-70.6, -33.4]}
        }));
        assert_eq!(feature.properties["ADMIN"], "Chile");
        assert_eq!(feature.geometry.unwrap()["type"], "Point");
    }

    #[test]
    fn test_from_value_lenient() {
        let feature = SourceFeature::from_value(json!("not a feature"));
        assert!(feature.properties.is_empty());
        assert!(feature.geometry.is_none());

        let feature = SourceFeature::from_value(json!({"properties": null, "geometry": null}));
        assert!(feature.properties.is_empty());
        assert!(feature.geometry.is_none());
    }

    #[test]
    fn test_collection_keeps_every_entry() {
        let features = SourceFeature::collection_from_value(json!({
            "type": "FeatureCollection",
            "features": [{"properties": {"NAME": "A"}}, 42, {"properties": {"NAME": "C"}}]
        }))
        .unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].properties["NAME"], "A");
        assert!(features[1].properties.is_empty());
        assert_eq!(features[2].properties["NAME"], "C");
    }

    #[test]
    fn test_collection_without_type_is_accepted() {
        let features = SourceFeature::collection_from_value(json!({"features": []})).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_collection_rejects_malformed() {
        for doc in [
            json!([1, 2, 3]),
            json!({"type": "Feature", "features": []}),
            json!({"type": "FeatureCollection"}),
            json!({"type": "FeatureCollection", "features": {}}),
        ] {
            assert!(matches!(
                SourceFeature::collection_from_value(doc),
                Err(BuildError::Malformed(_))
            ));
        }
    }

    #[test]
    fn test_output_key_order() {
        let feature = EnrichedFeature::new(
            EnrichedProperties {
                name: "Peru".to_string(),
                population: 5_000_001,
                gdp: 5_000_000_001,
                water_score: 3,
                water_resources: "text".to_string(),
                center: [-9.0, -75.0],
            },
            None,
        );
        let json = serde_json::to_string(&EnrichedCollection::new(vec![feature])).unwrap();
        assert_eq!(
            json,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"name":"Peru","population":5000001,"gdp":5000000001,"waterScore":3,"waterResources":"text","center":[-9.0,-75.0]},"geometry":null}]}"#
        );
    }
}
