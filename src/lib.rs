pub mod error;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod writer;
pub mod zip_handler;

pub use error::{Error, Result};
pub use model::{Feature, FeatureKind, FeatureSummary, Geometry, LatLon, Position};
pub use normalizer::{normalize_imports, normalize_json, ImportPayload, ImportRecord};
pub use parser::parse_kml;
pub use pipeline::{parse_kml_document, parse_kmz, parse_kmz_file, parse_upload};
pub use writer::{GeoJsonWriter, GeoJsonWriterConfig};
pub use zip_handler::{KmlPayload, ZipHandler};
