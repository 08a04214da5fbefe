use thiserror::Error;

/// Errors surfaced by the KMZ/KML pipeline.
///
/// Display messages are shown verbatim to inspectors in the upload flow.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No se pudo abrir el archivo KMZ: {0}")]
    ArchiveCorrupt(#[source] zip::result::ZipError),

    #[error("No se encontró ningún archivo KML dentro del KMZ")]
    NoKmlEntryFound,

    #[error("El documento KML no es XML válido: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("No se encontraron elementos válidos en el archivo")]
    NoValidFeatures,

    #[error("Los registros de importación no tienen un formato reconocido: {0}")]
    InvalidRecords(#[from] serde_json::Error),

    #[error("Error de lectura: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ArchiveCorrupt(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
