//! Upload entry points: archive → KML text → canonical features.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{Feature, FeatureSummary};
use crate::parser::parse_kml;
use crate::zip_handler::{read_kml_from_bytes, ZipHandler};

/// Local file header signature every ZIP (and so KMZ) archive starts with.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Parses an uploaded KMZ archive.
///
/// Fails with [`Error::NoValidFeatures`] when the document parses but holds
/// no Point, LineString or Polygon.
pub fn parse_kmz(data: &[u8]) -> Result<Vec<Feature>> {
    let payload = read_kml_from_bytes(data)?;
    info!("Parsing {:?} from KMZ upload", payload.entry_name);
    parse_kml_document(&payload.text)
}

/// Parses a KMZ archive from disk.
pub fn parse_kmz_file<P: AsRef<Path>>(path: P) -> Result<Vec<Feature>> {
    let payload = ZipHandler::new(path).read_kml()?;
    parse_kml_document(&payload.text)
}

/// Parses KML text, applying the same empty-result check as [`parse_kmz`].
pub fn parse_kml_document(text: &str) -> Result<Vec<Feature>> {
    let features = parse_kml(text)?;
    if features.is_empty() {
        warn!("KML document contains no usable geometries");
        return Err(Error::NoValidFeatures);
    }
    info!(
        "Extracted {} features ({})",
        features.len(),
        FeatureSummary::from_features(&features)
    );
    Ok(features)
}

/// Parses an upload that may be either a KMZ archive or a bare KML file.
pub fn parse_upload(data: &[u8]) -> Result<Vec<Feature>> {
    if is_zip(data) {
        parse_kmz(data)
    } else {
        parse_kml_document(&String::from_utf8_lossy(data))
    }
}

fn is_zip(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}
