//! Converts persisted import records back into canonical features.
//!
//! The backend returns imports either paginated (`{"results": [...]}`), as a
//! bare array, or as a single object. All three are accepted.

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{Feature, Geometry, LatLon, Position, DEFAULT_NAME};
use crate::parser::coordinates::parse_lenient;

/// A stored import: the uploaded file label plus its features.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub features: Vec<StoredFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoredFeature {
    #[serde(default)]
    pub feature_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub points: Vec<StoredPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoredPoint {
    #[serde(default)]
    pub latitude: Coordinate,
    #[serde(default)]
    pub longitude: Coordinate,
}

/// A coordinate as the API may send it: a number, a numeric string, or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Coordinate {
    /// The numeric value, `NaN` when missing or not a number.
    pub fn value(&self) -> f64 {
        match self {
            Coordinate::Number(n) => *n,
            Coordinate::Text(s) => parse_lenient(s),
            Coordinate::Missing => f64::NAN,
        }
    }
}

impl From<f64> for Coordinate {
    fn from(n: f64) -> Self {
        Coordinate::Number(n)
    }
}

/// The three response shapes the imports endpoint produces.
///
/// `Page` must stay first: any JSON object would otherwise match `One`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImportPayload {
    Page { results: Vec<ImportRecord> },
    Many(Vec<ImportRecord>),
    One(ImportRecord),
}

impl ImportPayload {
    pub fn into_records(self) -> Vec<ImportRecord> {
        match self {
            ImportPayload::Page { results } => results,
            ImportPayload::Many(records) => records,
            ImportPayload::One(record) => vec![record],
        }
    }
}

impl From<Vec<ImportRecord>> for ImportPayload {
    fn from(records: Vec<ImportRecord>) -> Self {
        ImportPayload::Many(records)
    }
}

impl From<ImportRecord> for ImportPayload {
    fn from(record: ImportRecord) -> Self {
        ImportPayload::One(record)
    }
}

/// Normalizes every stored feature of every record, in order.
///
/// Features with no points or an unknown `feature_type` are dropped.
/// `proyecto` is set to the record's filename on `Point`/`Poste` only.
/// Missing or empty names fall back to the default label.
pub fn normalize_imports(payload: impl Into<ImportPayload>) -> Vec<Feature> {
    let records = payload.into().into_records();
    let mut features = Vec::new();

    for record in &records {
        for stored in &record.features {
            match normalize_feature(stored, record.filename.as_deref()) {
                Some(feature) => features.push(feature),
                None => debug!(
                    "Skipping stored feature {:?} of type {:?} ({} points)",
                    stored.name,
                    stored.feature_type,
                    stored.points.len()
                ),
            }
        }
    }

    debug!(
        "Normalized {} features from {} import records",
        features.len(),
        records.len()
    );
    features
}

/// Deserializes an imports response body and normalizes it.
pub fn normalize_json(body: &str) -> Result<Vec<Feature>> {
    let payload: ImportPayload = serde_json::from_str(body)?;
    Ok(normalize_imports(payload))
}

fn normalize_feature(stored: &StoredFeature, label: Option<&str>) -> Option<Feature> {
    let first = stored.points.first()?;
    let position = || Position {
        lat: first.latitude.value(),
        lon: first.longitude.value(),
        alt: 0.0,
    };
    let path = || -> Vec<LatLon> {
        stored
            .points
            .iter()
            .map(|p| LatLon {
                lat: p.latitude.value(),
                lon: p.longitude.value(),
            })
            .collect()
    };

    let (geometry, proyecto) = match stored.feature_type.to_lowercase().as_str() {
        "point" => (Geometry::Point(position()), label.map(str::to_string)),
        "poste" => (Geometry::Poste(position()), label.map(str::to_string)),
        "linestring" => (Geometry::LineString(path()), None),
        "polygon" => (Geometry::Polygon(path()), None),
        _ => return None,
    };

    Some(Feature {
        name: stored
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_NAME)
            .to_string(),
        description: stored.description.clone().unwrap_or_default(),
        proyecto,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureKind;

    const RECORD: &str = r#"{
        "filename": "circuito_norte.kmz",
        "features": [
            {"feature_type": "Poste", "name": "P-1", "description": "", "points": [{"latitude": 10.98, "longitude": "-74.78"}]},
            {"feature_type": "LineString", "name": "Red", "description": "baja tensión", "points": [
                {"latitude": 1, "longitude": 2}, {"latitude": 3, "longitude": 4}, {"latitude": 5, "longitude": 6}
            ]},
            {"feature_type": "polygon", "name": "Zona", "description": "", "points": [{"latitude": 0, "longitude": 0}]},
            {"feature_type": "point", "name": "Sin puntos", "description": "", "points": []},
            {"feature_type": "circle", "name": "Desconocido", "description": "", "points": [{"latitude": 0, "longitude": 0}]}
        ]
    }"#;

    #[test]
    fn test_normalize_record() {
        let features = normalize_json(RECORD).unwrap();
        let kinds: Vec<FeatureKind> = features.iter().map(Feature::kind).collect();
        assert_eq!(
            kinds,
            vec![FeatureKind::Poste, FeatureKind::LineString, FeatureKind::Polygon]
        );

        let poste = &features[0];
        assert_eq!(poste.proyecto.as_deref(), Some("circuito_norte.kmz"));
        assert_eq!(
            poste.geometry.position(),
            Some(&Position {
                lat: 10.98,
                lon: -74.78,
                alt: 0.0
            })
        );

        let line = &features[1];
        assert_eq!(line.proyecto, None, "paths never carry proyecto");
        assert_eq!(line.description, "baja tensión");
        assert_eq!(
            line.geometry.path().unwrap(),
            &[
                LatLon { lat: 1.0, lon: 2.0 },
                LatLon { lat: 3.0, lon: 4.0 },
                LatLon { lat: 5.0, lon: 6.0 },
            ]
        );
    }

    #[test]
    fn test_point_uses_first_pair_only() {
        let features = normalize_json(
            r#"{"filename": "a", "features": [{"feature_type": "POINT", "name": "x", "points": [
                {"latitude": 1, "longitude": 2}, {"latitude": 9, "longitude": 9}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].kind(), FeatureKind::Point);
        assert_eq!(features[0].geometry.position().unwrap().lat, 1.0);
    }

    #[test]
    fn test_accepts_all_payload_shapes() {
        let bare = normalize_json(&format!("[{}]", RECORD)).unwrap();
        let single = normalize_json(RECORD).unwrap();
        let paged =
            normalize_json(&format!(r#"{{"count": 1, "next": null, "results": [{}]}}"#, RECORD))
                .unwrap();
        assert_eq!(bare, single);
        assert_eq!(paged, single);
        assert_eq!(single.len(), 3);
    }

    #[test]
    fn test_typed_payloads_match_json() {
        let record: ImportRecord = serde_json::from_str(RECORD).unwrap();
        let from_record = normalize_imports(record.clone());
        let from_vec = normalize_imports(vec![record]);
        assert_eq!(from_record, from_vec);
        assert_eq!(from_record, normalize_json(RECORD).unwrap());
    }

    #[test]
    fn test_malformed_coordinates_are_nan() {
        let features = normalize_json(
            r#"[{"filename": "a", "features": [{"feature_type": "point", "points": [
                {"latitude": "n/a", "longitude": null}
            ]}]}]"#,
        )
        .unwrap();
        let p = features[0].geometry.position().unwrap();
        assert!(p.lat.is_nan());
        assert!(p.lon.is_nan());
        assert_eq!(features[0].name, DEFAULT_NAME);
    }

    #[test]
    fn test_null_filename_and_empty_name() {
        let features = normalize_json(
            r#"[{"filename": null, "features": [
                {"feature_type": "poste", "name": "", "points": [{"latitude": 1, "longitude": 2}]}
            ]}, {"filename": "b.kmz", "features": [
                {"feature_type": "point", "name": "P-9", "points": [{"latitude": 3, "longitude": 4}]}
            ]}]"#,
        )
        .unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].name, DEFAULT_NAME);
        assert_eq!(features[0].proyecto, None);
        assert_eq!(features[1].proyecto.as_deref(), Some("b.kmz"));
    }

    #[test]
    fn test_empty_page() {
        assert!(normalize_json(r#"{"results": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_object_payload() {
        assert!(normalize_json("42").is_err());
    }
}
