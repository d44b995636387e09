//! Contact-map sources and track file readers for ProHiC
//!
//! Contact maps come from a [`ContactSource`]: flat numeric text files, in
//! memory, or (with the `cooler` feature) `.cool` / `.mcool` containers.
//! Track files are BED regions, GFF features and bedGraph signals.

pub mod bed;
pub mod bedgraph;
#[cfg(feature = "cooler")]
pub mod cooler;
pub mod gff;
pub mod matrix;

pub use matrix::{FlatMatrixSource, MemorySource};
#[cfg(feature = "cooler")]
pub use cooler::CoolerSource;

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{ContactMatrix, GenomicPos, Resolution, Strand};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unrecognized source: {path}")]
    Unrecognized { path: PathBuf },

    #[error("Malformed source {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Parse error in {path} at line {line}: {message}")]
    Parse { path: PathBuf, line: usize, message: String },

    #[error("{path} needs the `{feature}` feature")]
    FeatureDisabled { path: PathBuf, feature: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn malformed<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Malformed { path: path.into(), message: message.into() }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Shape of a contact-map container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Several zoom levels, listed in the container's order.
    MultiResolution(Vec<Resolution>),
    /// One matrix with a fixed bin size.
    SingleResolution(Resolution),
    /// A bare numeric matrix without genomic units.
    Flat,
}

impl SourceKind {
    pub fn resolutions(&self) -> Vec<Resolution> {
        match self {
            SourceKind::MultiResolution(list) => list.clone(),
            SourceKind::SingleResolution(bin_size) => vec![*bin_size],
            SourceKind::Flat => Vec::new(),
        }
    }
}

/// Anything a balanced contact matrix can be read from.
pub trait ContactSource {
    /// Display name, usually the file name.
    fn name(&self) -> &str;

    fn path(&self) -> Option<&Path> {
        None
    }

    fn kind(&self) -> SourceKind;

    /// Balanced matrix at one of the resolutions reported by [`kind`](Self::kind).
    /// Flat sources ignore the argument.
    fn balanced_matrix(&self, resolution: Resolution) -> SourceResult<ContactMatrix>;
}

/// Exact match if available, otherwise the resolution with the smallest
/// absolute difference. Ties go to the first one listed.
pub fn select_resolution(available: &[Resolution], requested: Resolution) -> Option<Resolution> {
    if available.contains(&requested) {
        return Some(requested);
    }
    available
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|&(index, res)| ((res as i64 - requested as i64).unsigned_abs(), index))
        .map(|(_, res)| res)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    MultiCooler,
    Cooler,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFormat {
    Bed,
    Gff,
    BedGraph,
}

/// Lower-cased file name with a trailing `.gz` removed.
fn format_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match name.strip_suffix(".gz") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

pub fn detect_matrix_format(path: &Path) -> Option<MatrixFormat> {
    let stem = format_stem(path);
    if stem.ends_with(".mcool") {
        Some(MatrixFormat::MultiCooler)
    } else if stem.ends_with(".cool") {
        Some(MatrixFormat::Cooler)
    } else if [".np", ".txt", ".tsv", ".matrix"].iter().any(|ext| stem.ends_with(ext)) {
        Some(MatrixFormat::Text)
    } else {
        None
    }
}

pub fn detect_track_format(path: &Path) -> Option<TrackFormat> {
    let stem = format_stem(path);
    if stem.ends_with(".bedgraph") {
        Some(TrackFormat::BedGraph)
    } else if stem.ends_with(".bed") {
        Some(TrackFormat::Bed)
    } else if [".gff", ".gff2", ".gff3"].iter().any(|ext| stem.ends_with(ext)) {
        Some(TrackFormat::Gff)
    } else {
        None
    }
}

/// Open a contact-map file by its extension.
pub fn open_source<P: AsRef<Path>>(path: P) -> SourceResult<Box<dyn ContactSource>> {
    let path = path.as_ref();
    match detect_matrix_format(path) {
        Some(MatrixFormat::Text) => Ok(Box::new(FlatMatrixSource::open(path)?)),
        #[cfg(feature = "cooler")]
        Some(MatrixFormat::MultiCooler) | Some(MatrixFormat::Cooler) => {
            Ok(Box::new(CoolerSource::open(path)?))
        }
        #[cfg(not(feature = "cooler"))]
        Some(MatrixFormat::MultiCooler) | Some(MatrixFormat::Cooler) => {
            Err(SourceError::FeatureDisabled { path: path.to_path_buf(), feature: "cooler" })
        }
        None => Err(SourceError::Unrecognized { path: path.to_path_buf() }),
    }
}

/// Buffered line reader, transparently decompressing `.gz` files.
pub fn open_text_reader(path: &Path) -> SourceResult<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gz = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);
    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// A discrete feature read from a BED or GFF file.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub start: GenomicPos,
    pub end: GenomicPos,
    pub label: String,
    pub strand: Strand,
}

/// One bedGraph interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRecord {
    pub start: GenomicPos,
    pub end: GenomicPos,
    pub value: f64,
}

impl SignalRecord {
    pub fn midpoint(&self) -> f64 {
        (self.start as f64 + self.end as f64) / 2.0
    }
}

/// Browser/track header lines and comments shared by BED-like formats.
pub(crate) fn is_bed_header(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}
