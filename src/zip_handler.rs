use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{Error, Result};

const KML_EXTENSION: &str = ".kml";

/// Text of the KML document found inside a KMZ archive.
#[derive(Debug, Clone, PartialEq)]
pub struct KmlPayload {
    pub entry_name: String,
    pub text: String,
}

/// Reads the embedded KML document of a KMZ archive on disk.
pub struct ZipHandler {
    path: PathBuf,
}

impl ZipHandler {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn read_kml(&self) -> Result<KmlPayload> {
        info!("Opening KMZ archive: {:?}", self.path);
        let file = File::open(&self.path)?;
        read_kml_from_reader(BufReader::new(file))
    }
}

/// Returns the first `.kml` entry of an in-memory KMZ archive.
pub fn read_kml_from_bytes(data: &[u8]) -> Result<KmlPayload> {
    read_kml_from_reader(std::io::Cursor::new(data))
}

/// Returns the first entry, in central-directory order, whose name ends in
/// `.kml` (ASCII case-insensitive). Archives holding several KML documents
/// are not disambiguated; whichever the archiver listed first wins.
pub fn read_kml_from_reader<R: Read + Seek>(reader: R) -> Result<KmlPayload> {
    let mut archive = ZipArchive::new(reader)?;
    debug!("KMZ archive contains {} entries", archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !is_kml_name(entry.name()) {
            continue;
        }

        let entry_name = entry.name().to_string();
        // The declared size comes from the upload, so it is not used as a
        // capacity hint.
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| Error::ArchiveCorrupt(e.into()))?;
        info!("Using KML entry {:?} ({} bytes)", entry_name, bytes.len());

        return Ok(KmlPayload {
            entry_name,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    Err(Error::NoKmlEntryFound)
}

fn is_kml_name(name: &str) -> bool {
    name.len() >= KML_EXTENSION.len()
        && name
            .get(name.len() - KML_EXTENSION.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(KML_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_first_kml_entry() {
        let data = build_archive(&[
            ("files/icon.png", "not a kml"),
            ("doc.kml", "<kml>first</kml>"),
            ("other.kml", "<kml>second</kml>"),
        ]);
        let payload = read_kml_from_bytes(&data).unwrap();
        assert_eq!(payload.entry_name, "doc.kml");
        assert_eq!(payload.text, "<kml>first</kml>");
    }

    #[test]
    fn test_extension_match_ignores_case() {
        let data = build_archive(&[("SURVEY.KML", "<kml/>")]);
        let payload = read_kml_from_bytes(&data).unwrap();
        assert_eq!(payload.entry_name, "SURVEY.KML");
    }

    #[test]
    fn test_missing_kml_entry() {
        let data = build_archive(&[("readme.txt", "hola"), ("doc.kml.bak", "<kml/>")]);
        let result = read_kml_from_bytes(&data);
        assert!(
            matches!(result, Err(Error::NoKmlEntryFound)),
            "expected NoKmlEntryFound, got {:?}",
            result
        );
    }

    #[test]
    fn test_corrupt_archive() {
        let result = read_kml_from_bytes(b"definitely not a zip archive");
        assert!(
            matches!(result, Err(Error::ArchiveCorrupt(_))),
            "expected ArchiveCorrupt, got {:?}",
            result
        );
    }

    #[test]
    fn test_forged_entry_size_does_not_panic() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("doc.kml", options).unwrap();
        writer.write_all(b"<kml/>").unwrap();
        let mut data = writer.finish().unwrap().into_inner();

        // Uncompressed size field of the central directory header.
        let header = data
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        data[header + 24..header + 28].copy_from_slice(&0xFFFF_FFFEu32.to_le_bytes());

        match read_kml_from_bytes(&data) {
            Ok(payload) => assert_eq!(payload.text, "<kml/>"),
            Err(Error::ArchiveCorrupt(_)) => (),
            Err(other) => panic!("expected ArchiveCorrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_handler_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("survey.kmz");
        std::fs::write(&path, build_archive(&[("doc.kml", "<kml/>")])).unwrap();

        let payload = ZipHandler::new(&path).read_kml().unwrap();
        assert_eq!(payload.text, "<kml/>");
    }
}
