use anyhow::{Context, Result};
use clap::Parser;
use kmz_features::{
    normalize_json, parse_kml_document, parse_kmz_file, Feature, FeatureSummary, GeoJsonWriter,
    GeoJsonWriterConfig,
};
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input KMZ, KML or import-records JSON file, or a directory of them
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for the GeoJSON files
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Indent the GeoJSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy)]
enum FileType {
    Kmz,
    Kml,
    Records,
}

impl FileType {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "kmz" => Some(FileType::Kmz),
            "kml" => Some(FileType::Kml),
            "json" => Some(FileType::Records),
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let start_time = std::time::Instant::now();

    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {:?}", args.output))?;

    if args.input.is_file() {
        let Some(file_type) = FileType::from_path(&args.input) else {
            error!("Unsupported file type: {:?}", args.input);
            anyhow::bail!("Input file must be .kmz, .kml or .json");
        };
        process_file(&args.input, file_type, &args)?;
    } else if args.input.is_dir() {
        info!("Processing directory: {:?}", args.input);
        process_directory(&args.input, &args)?;
    } else {
        error!("Invalid input path: {:?}", args.input);
        anyhow::bail!("Input path must be a file or directory");
    }

    info!("Total processing time: {:?}", start_time.elapsed());

    Ok(())
}

fn process_file(path: &Path, file_type: FileType, args: &Args) -> Result<()> {
    info!("Processing {:?} as {:?}", path, file_type);

    let features = load_features(path, file_type)
        .with_context(|| format!("Failed to read features from {:?}", path))?;
    info!(
        "{:?}: {} features ({})",
        path,
        features.len(),
        FeatureSummary::from_features(&features)
    );

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("features");
    let output_path = args.output.join(format!("{}.geojson", stem));

    let writer = GeoJsonWriter::with_config(GeoJsonWriterConfig { pretty: args.pretty });
    writer.write(&features, &output_path)?;
    info!("Written GeoJSON: {:?}", output_path);

    Ok(())
}

fn load_features(path: &Path, file_type: FileType) -> Result<Vec<Feature>> {
    let features = match file_type {
        FileType::Kmz => parse_kmz_file(path)?,
        FileType::Kml => parse_kml_document(&fs::read_to_string(path)?)?,
        FileType::Records => normalize_json(&fs::read_to_string(path)?)?,
    };
    Ok(features)
}

fn process_directory(dir: &Path, args: &Args) -> Result<()> {
    use rayon::prelude::*;

    let input_files = collect_input_files(dir)?;
    info!("Found {} input files (KMZ/KML/JSON)", input_files.len());

    let results: Vec<Result<()>> = input_files
        .par_iter()
        .map(|(path, file_type)| process_file(path, *file_type, args))
        .collect();

    let mut errors = Vec::new();
    for ((path, _), result) in input_files.iter().zip(results) {
        if let Err(e) = result {
            errors.push(format!("{}: {:#}", path.display(), e));
        }
    }

    if !errors.is_empty() {
        error!("Failed to process {} files:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        anyhow::bail!("{} files failed to process", errors.len());
    }

    Ok(())
}

/// Recursively collects supported files, sorted by path so runs are
/// reproducible.
fn collect_input_files(dir: &Path) -> Result<Vec<(PathBuf, FileType)>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(collect_input_files(&path)?);
        } else if let Some(file_type) = FileType::from_path(&path) {
            files.push((path, file_type));
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_extension() {
        assert!(matches!(
            FileType::from_path(Path::new("a/survey.KMZ")),
            Some(FileType::Kmz)
        ));
        assert!(matches!(
            FileType::from_path(Path::new("doc.kml")),
            Some(FileType::Kml)
        ));
        assert!(matches!(
            FileType::from_path(Path::new("imports.json")),
            Some(FileType::Records)
        ));
        assert!(FileType::from_path(Path::new("photo.jpg")).is_none());
        assert!(FileType::from_path(Path::new("README")).is_none());
    }
}
