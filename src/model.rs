use serde::Serialize;
use std::fmt;

/// Label used when a placemark or stored feature carries no name.
pub const DEFAULT_NAME: &str = "Sin nombre";

/// A single located point with altitude (metres, 0 when absent).
///
/// Fields may be `NaN` when the source text was not a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

/// A vertex of a path or ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Geometry of a canonical feature, tagged by its classification.
///
/// Serializes as `{"type": ..., "coordinates": ...}`, the shape read by the
/// map components.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    /// A point whose icon marks it as a utility pole.
    Poste(Position),
    /// Ordered vertices; order defines the path.
    LineString(Vec<LatLon>),
    /// Outer ring only.
    Polygon(Vec<LatLon>),
}

impl Geometry {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Geometry::Point(_) => FeatureKind::Point,
            Geometry::Poste(_) => FeatureKind::Poste,
            Geometry::LineString(_) => FeatureKind::LineString,
            Geometry::Polygon(_) => FeatureKind::Polygon,
        }
    }

    /// The single position of a `Point`/`Poste`, `None` for paths.
    pub fn position(&self) -> Option<&Position> {
        match self {
            Geometry::Point(p) | Geometry::Poste(p) => Some(p),
            _ => None,
        }
    }

    /// The vertex sequence of a `LineString`/`Polygon`, `None` for points.
    pub fn path(&self) -> Option<&[LatLon]> {
        match self {
            Geometry::LineString(v) | Geometry::Polygon(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Point,
    Poste,
    LineString,
    Polygon,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Point => "Point",
            FeatureKind::Poste => "Poste",
            FeatureKind::LineString => "LineString",
            FeatureKind::Polygon => "Polygon",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical feature produced both by KML extraction and by
/// normalization of persisted import records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    /// Originating import label. Only set on normalized `Point`/`Poste` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proyecto: Option<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        self.geometry.kind()
    }
}

/// Feature counts per geometry type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSummary {
    pub points: usize,
    pub postes: usize,
    pub lines: usize,
    pub polygons: usize,
}

impl FeatureSummary {
    pub fn from_features(features: &[Feature]) -> Self {
        let mut summary = Self::default();
        for feature in features {
            match feature.kind() {
                FeatureKind::Point => summary.points += 1,
                FeatureKind::Poste => summary.postes += 1,
                FeatureKind::LineString => summary.lines += 1,
                FeatureKind::Polygon => summary.polygons += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.points + self.postes + self.lines + self.polygons
    }
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} postes, {} points, {} lines, {} polygons",
            self.postes, self.points, self.lines, self.polygons
        )
    }
}
