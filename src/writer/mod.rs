use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::model::{Feature, Geometry, LatLon, Position};

#[derive(Debug, Clone, Default)]
pub struct GeoJsonWriterConfig {
    /// Indent the output.
    pub pretty: bool,
}

/// Exports canonical features as a GeoJSON `FeatureCollection`.
///
/// Coordinates use GeoJSON axis order (`[lon, lat]`, plus altitude for
/// points). `NaN` components are written as `null`.
#[derive(Debug, Default)]
pub struct GeoJsonWriter {
    config: GeoJsonWriterConfig,
}

impl GeoJsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeoJsonWriterConfig) -> Self {
        Self { config }
    }

    pub fn to_value(&self, features: &[Feature]) -> Value {
        let features: Vec<Value> = features.iter().map(feature_to_value).collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    pub fn to_string(&self, features: &[Feature]) -> Result<String> {
        let value = self.to_value(features);
        let text = if self.config.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.context("Failed to serialize GeoJSON")
    }

    pub fn write(&self, features: &[Feature], output_path: &Path) -> Result<()> {
        tracing::info!(
            "Writing {} features to {:?}",
            features.len(),
            output_path
        );

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create {:?}", output_path))?;
        let writer = BufWriter::new(file);
        let value = self.to_value(features);

        if self.config.pretty {
            serde_json::to_writer_pretty(writer, &value)
        } else {
            serde_json::to_writer(writer, &value)
        }
        .context("Failed to write GeoJSON")?;

        Ok(())
    }
}

fn feature_to_value(feature: &Feature) -> Value {
    let mut properties = json!({
        "name": feature.name,
        "description": feature.description,
        "type": feature.kind().as_str(),
    });
    if let Some(proyecto) = &feature.proyecto {
        properties["proyecto"] = json!(proyecto);
    }

    json!({
        "type": "Feature",
        "geometry": geometry_to_value(&feature.geometry),
        "properties": properties,
    })
}

fn geometry_to_value(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::Point(p) | Geometry::Poste(p) => json!({
            "type": "Point",
            "coordinates": position_coords(p),
        }),
        Geometry::LineString(path) => json!({
            "type": "LineString",
            "coordinates": path_coords(path),
        }),
        Geometry::Polygon(ring) => json!({
            "type": "Polygon",
            "coordinates": [path_coords(ring)],
        }),
    }
}

fn position_coords(p: &Position) -> Value {
    json!([p.lon, p.lat, p.alt])
}

fn path_coords(path: &[LatLon]) -> Value {
    Value::Array(path.iter().map(|p| json!([p.lon, p.lat])).collect())
}
