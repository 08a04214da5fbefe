//! KML document parsing: XML tree, style resolution and placemark extraction.

pub mod coordinates;
pub mod placemark;
pub mod style;
pub mod tree;

pub use placemark::{extract_features, POSTE_ICON_MARKER};
pub use style::StyleMap;

use tracing::debug;

use crate::error::Result;
use crate::model::Feature;

/// Parses KML text into canonical features.
///
/// Only malformed XML is an error. A well-formed document without placemarks
/// yields an empty vector.
pub fn parse_kml(text: &str) -> Result<Vec<Feature>> {
    debug!("Parsing KML document of {} bytes", text.len());
    let document = tree::parse_document(text)?;
    let styles = StyleMap::resolve(&document);
    Ok(extract_features(&document, &styles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SURVEY: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Style id="sn_circle"><IconStyle><Icon><href>http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png</href></Icon></IconStyle></Style>
    <Style id="sh_circle"><IconStyle><Icon><href>http://maps.google.com/mapfiles/kml/shapes/placemark_circle_highlight.png</href></Icon></IconStyle></Style>
    <StyleMap id="msn_circle">
      <Pair><key>normal</key><styleUrl>#sn_circle</styleUrl></Pair>
      <Pair><key>highlight</key><styleUrl>#sh_circle</styleUrl></Pair>
    </StyleMap>
    <Folder>
      <name>Postes</name>
      <Placemark><name>P-001</name><styleUrl>#msn_circle</styleUrl><Point><coordinates>-74.80,10.98,0</coordinates></Point></Placemark>
      <Placemark><name>P-002</name><description>Poste de concreto</description><styleUrl>#msn_circle</styleUrl><Point><coordinates>-74.81,10.99,0</coordinates></Point></Placemark>
    </Folder>
    <Placemark><name>Red</name><LineString><coordinates>-74.80,10.98,0 -74.81,10.99,0</coordinates></LineString></Placemark>
  </Document>
</kml>"##;

    #[test]
    fn test_parse_survey() {
        let features = parse_kml(SURVEY).unwrap();
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["P-001", "P-002", "Red"]);
        assert_eq!(features[1].description, "Poste de concreto");
        assert!(matches!(features[0].geometry, crate::model::Geometry::Poste(_)));
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse_kml(SURVEY).unwrap(), parse_kml(SURVEY).unwrap());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = parse_kml("<kml><Placemark></kml>");
        assert!(matches!(result, Err(Error::Xml(_))), "got {:?}", result);
    }
}
