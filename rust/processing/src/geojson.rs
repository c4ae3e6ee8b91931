// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoJSON footprint input
//!
//! Reads a `FeatureCollection` whose features carry polygon footprints and a
//! numeric elevation property. Problems with individual features are kept on
//! the record so the batch can report them; only a malformed document fails.

use crate::error::{ProcessingError, Result};
use crate::types::{FootprintGeometry, FootprintRecord};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Which feature properties feed the records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoJsonOptions {
    /// Property holding the aggregated elevation
    pub elevation_property: String,
    /// Property used as id when the feature has no top-level `id`
    pub id_property: Option<String>,
}

impl Default for GeoJsonOptions {
    fn default() -> Self {
        Self {
            elevation_property: "elevation".to_string(),
            id_property: Some("id".to_string()),
        }
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Parse a GeoJSON FeatureCollection into footprint records, in feature order
pub fn parse_feature_collection(
    content: &str,
    options: &GeoJsonOptions,
) -> Result<Vec<FootprintRecord>> {
    let collection: FeatureCollection = serde_json::from_str(content)?;
    if collection.kind != "FeatureCollection" {
        return Err(ProcessingError::InvalidInput(format!(
            "expected a FeatureCollection, found {}",
            collection.kind
        )));
    }

    Ok(collection
        .features
        .into_iter()
        .map(|feature| to_record(feature, options))
        .collect())
}

fn to_record(feature: Feature, options: &GeoJsonOptions) -> FootprintRecord {
    let properties = feature.properties.unwrap_or_default();

    let id = feature
        .id
        .as_ref()
        .and_then(value_to_id)
        .or_else(|| {
            options
                .id_property
                .as_ref()
                .and_then(|key| properties.get(key))
                .and_then(value_to_id)
        });

    // Missing, null, or non-numeric values all mean "no elevation"
    let elevation = properties
        .get(&options.elevation_property)
        .and_then(Value::as_f64);

    let geometry = match feature.geometry {
        Some(geometry) => parse_geometry(&geometry),
        None => FootprintGeometry::Invalid("feature has no geometry".to_string()),
    };

    FootprintRecord {
        id,
        geometry,
        elevation,
    }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geometry(geometry: &Value) -> FootprintGeometry {
    let kind = geometry.get("type").and_then(Value::as_str).unwrap_or("null");
    if kind != "Polygon" {
        return FootprintGeometry::Invalid(format!("unsupported geometry type {}", kind));
    }

    let rings: Vec<Vec<Vec<f64>>> = match geometry
        .get("coordinates")
        .map(|c| serde_json::from_value(c.clone()))
    {
        Some(Ok(rings)) => rings,
        Some(Err(e)) => {
            return FootprintGeometry::Invalid(format!("malformed polygon coordinates: {}", e))
        }
        None => return FootprintGeometry::Invalid("polygon has no coordinates".to_string()),
    };

    let Some((exterior, interiors)) = rings.split_first() else {
        return FootprintGeometry::Invalid("polygon has no rings".to_string());
    };

    let mut ring = Vec::with_capacity(exterior.len());
    for position in exterior {
        match position.as_slice() {
            [x, y, ..] => ring.push([*x, *y]),
            _ => {
                return FootprintGeometry::Invalid(
                    "position with fewer than two coordinates".to_string(),
                )
            }
        }
    }

    FootprintGeometry::Polygon {
        exterior: ring,
        interior_rings: interiors.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": 17,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [4, 0], [4, 3], [0, 3], [0, 0]]]
                },
                "properties": { "elevation": 9.5 }
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[0, 0, 1], [10, 0, 1], [10, 10, 1], [0, 10, 1], [0, 0, 1]],
                        [[4, 4], [6, 4], [6, 6], [4, 4]]
                    ]
                },
                "properties": { "id": "b-2", "elevation": "n/a" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [1, 2] },
                "properties": { "elevation": 3 }
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_records() {
        let records = parse_feature_collection(SAMPLE, &GeoJsonOptions::default()).unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].id.as_deref(), Some("17"));
        assert_eq!(records[0].elevation, Some(9.5));
        assert_eq!(
            records[0].geometry,
            FootprintGeometry::Polygon {
                exterior: vec![[0.0, 0.0], [4.0, 0.0], [4.0, 3.0], [0.0, 3.0], [0.0, 0.0]],
                interior_rings: 0,
            }
        );

        assert_eq!(records[1].id.as_deref(), Some("b-2"));
        assert_eq!(records[1].elevation, None);
        match &records[1].geometry {
            FootprintGeometry::Polygon {
                exterior,
                interior_rings,
            } => {
                assert_eq!(exterior[1], [10.0, 0.0]);
                assert_eq!(*interior_rings, 1);
            }
            other => panic!("expected polygon, got {:?}", other),
        }

        assert!(matches!(
            &records[2].geometry,
            FootprintGeometry::Invalid(m) if m.contains("Point")
        ));
        assert!(matches!(records[3].geometry, FootprintGeometry::Invalid(_)));
        assert_eq!(records[3].elevation, None);
    }

    #[test]
    fn test_custom_elevation_property() {
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1]]]},
             "properties": {"mean": 4.25, "elevation": 1.0}}
        ]}"#;
        let options = GeoJsonOptions {
            elevation_property: "mean".to_string(),
            id_property: None,
        };
        let records = parse_feature_collection(content, &options).unwrap();
        assert_eq!(records[0].elevation, Some(4.25));
        assert_eq!(records[0].id, None);
    }

    #[test]
    fn test_rejects_non_collection() {
        let result = parse_feature_collection(
            r#"{"type": "Feature", "features": []}"#,
            &GeoJsonOptions::default(),
        );
        assert!(matches!(result, Err(ProcessingError::InvalidInput(_))));
        assert!(parse_feature_collection("not json", &GeoJsonOptions::default()).is_err());
    }
}
