use ::kmz_features::model::{Feature, Geometry};
use ::kmz_features::{normalizer, parser, pipeline, Error};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

#[pymodule]
fn kmz_features(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFeature>()?;
    m.add_function(wrap_pyfunction!(parse_kmz, m)?)?;
    m.add_function(wrap_pyfunction!(parse_kml, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_records, m)?)?;
    Ok(())
}

#[pyclass(name = "Feature")]
#[derive(Clone)]
pub struct PyFeature {
    /// "Point", "Poste", "LineString" or "Polygon"
    #[pyo3(get)]
    pub kind: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub description: String,
    #[pyo3(get)]
    pub proyecto: Option<String>,
    /// (lat, lon, alt) tuples; alt is 0.0 for line and polygon vertices
    #[pyo3(get)]
    pub points: Vec<(f64, f64, f64)>,
}

impl From<Feature> for PyFeature {
    fn from(feature: Feature) -> Self {
        let points = match &feature.geometry {
            Geometry::Point(p) | Geometry::Poste(p) => vec![(p.lat, p.lon, p.alt)],
            Geometry::LineString(path) | Geometry::Polygon(path) => {
                path.iter().map(|p| (p.lat, p.lon, 0.0)).collect()
            }
        };
        PyFeature {
            kind: feature.kind().to_string(),
            name: feature.name,
            description: feature.description,
            proyecto: feature.proyecto,
            points,
        }
    }
}

#[pymethods]
impl PyFeature {
    fn __repr__(&self) -> String {
        format!(
            "Feature(kind='{}', name='{}', points={})",
            self.kind,
            self.name,
            self.points.len()
        )
    }
}

fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::Io(e) => PyIOError::new_err(format!("Failed to read file: {}", e)),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn into_py_features(features: Vec<Feature>) -> Vec<PyFeature> {
    features.into_iter().map(PyFeature::from).collect()
}

/// Parses a KMZ archive on disk. Raises ValueError when no features are found.
#[pyfunction]
pub fn parse_kmz(path: String) -> PyResult<Vec<PyFeature>> {
    pipeline::parse_kmz_file(&path)
        .map(into_py_features)
        .map_err(to_py_err)
}

/// Parses KML text. An empty document returns an empty list.
#[pyfunction]
pub fn parse_kml(text: String) -> PyResult<Vec<PyFeature>> {
    parser::parse_kml(&text)
        .map(into_py_features)
        .map_err(to_py_err)
}

/// Normalizes an imports API response body (page, list or single record).
#[pyfunction]
pub fn normalize_records(json: String) -> PyResult<Vec<PyFeature>> {
    normalizer::normalize_json(&json)
        .map(into_py_features)
        .map_err(to_py_err)
}
