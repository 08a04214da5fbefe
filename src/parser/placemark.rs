use tracing::debug;

use super::coordinates::{parse_path, parse_position};
use super::style::StyleMap;
use super::tree::Element;
use crate::model::{Feature, Geometry, DEFAULT_NAME};

/// Icon filename fragment that marks a point as a utility pole. Matches both
/// `placemark_circle.png` and `placemark_circle_highlight.png`, whether they
/// are referenced by URL or by a relative path inside the KMZ.
pub const POSTE_ICON_MARKER: &str = "placemark_circle";

/// Extracts one feature per geometry of every `<Placemark>`, in document order.
///
/// Each of `<Point>`, `<LineString>` and `<Polygon>` is looked up
/// independently (first occurrence of each), so a placemark yields zero to
/// three features. Polygons contribute their outer ring only. Lines and rings
/// without any coordinate tuple are dropped.
pub fn extract_features(document: &Element, styles: &StyleMap) -> Vec<Feature> {
    let placemarks = document.descendants("Placemark");
    let mut features = Vec::with_capacity(placemarks.len());

    for placemark in &placemarks {
        let name = placemark
            .find_text("name")
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_NAME);
        let description = placemark.find_text("description").unwrap_or_default();
        let icon = placemark
            .find_text("styleUrl")
            .and_then(|url| styles.icon(url))
            .unwrap_or_default();
        let is_poste = icon.contains(POSTE_ICON_MARKER);

        let mut push = |geometry: Geometry| {
            features.push(Feature {
                name: name.to_string(),
                description: description.to_string(),
                proyecto: None,
                geometry,
            });
        };

        if let Some(point) = placemark.find("Point") {
            let position = parse_position(point.find_text("coordinates").unwrap_or_default());
            push(if is_poste {
                Geometry::Poste(position)
            } else {
                Geometry::Point(position)
            });
        }

        if let Some(line) = placemark.find("LineString") {
            let path = parse_path(line.find_text("coordinates").unwrap_or_default());
            if !path.is_empty() {
                push(Geometry::LineString(path));
            }
        }

        if let Some(polygon) = placemark.find("Polygon") {
            let ring = polygon
                .find("outerBoundaryIs")
                .and_then(|outer| outer.find_text("coordinates"))
                .unwrap_or_default();
            let ring = parse_path(ring);
            if !ring.is_empty() {
                push(Geometry::Polygon(ring));
            }
        }
    }

    debug!(
        "Extracted {} features from {} placemarks",
        features.len(),
        placemarks.len()
    );
    features
}
