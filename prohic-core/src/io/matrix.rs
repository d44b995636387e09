//! Flat numeric matrices and in-memory sources.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use super::{open_text_reader, ContactSource, SourceError, SourceKind, SourceResult};
use crate::types::{ContactMatrix, Resolution};

/// Whitespace or tab delimited matrix text, one row per line. `#` starts a
/// comment; `nan` marks a missing bin. Resolution is always 1.
#[derive(Debug, Clone)]
pub struct FlatMatrixSource {
    path: PathBuf,
    name: String,
    matrix: ContactMatrix,
}

impl FlatMatrixSource {
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let path = path.as_ref();
        let reader = open_text_reader(path)?;
        let matrix = parse_matrix(reader, path)?;
        log::debug!("Read {}x{} matrix from {}", matrix.nrows(), matrix.ncols(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            name: display_name(path),
            matrix,
        })
    }
}

impl ContactSource for FlatMatrixSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Flat
    }

    fn balanced_matrix(&self, _resolution: Resolution) -> SourceResult<ContactMatrix> {
        Ok(self.matrix.clone())
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_matrix<R: BufRead>(reader: R, path: &Path) -> SourceResult<ContactMatrix> {
    let mut values = Vec::new();
    let mut width: Option<usize> = None;
    let mut rows = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let content = match line.split_once('#') {
            Some((before, _)) => before,
            None => line.as_str(),
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }

        let row: Vec<f64> = content
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|_| SourceError::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message: format!("not a number: {}", field),
                })
            })
            .collect::<SourceResult<_>>()?;

        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(SourceError::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message: format!("expected {} columns, found {}", w, row.len()),
                });
            }
            Some(_) => {}
        }
        values.extend(row);
        rows += 1;
    }

    let cols = width.unwrap_or(0);
    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| SourceError::malformed(path, e.to_string()))
}

/// Matrices held in memory, keyed by resolution. Handy for tests and for
/// callers that build matrices themselves.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    kind: SourceKind,
    matrices: BTreeMap<Resolution, ContactMatrix>,
}

impl MemorySource {
    /// A flat matrix with unit resolution.
    pub fn flat<S: Into<String>>(name: S, matrix: ContactMatrix) -> Self {
        let mut matrices = BTreeMap::new();
        matrices.insert(1, matrix);
        Self { name: name.into(), kind: SourceKind::Flat, matrices }
    }

    pub fn single<S: Into<String>>(name: S, bin_size: Resolution, matrix: ContactMatrix) -> Self {
        let mut matrices = BTreeMap::new();
        matrices.insert(bin_size, matrix);
        Self { name: name.into(), kind: SourceKind::SingleResolution(bin_size), matrices }
    }

    /// Zoom levels in the given order; that order decides resolution ties.
    pub fn multi<S: Into<String>>(name: S, levels: Vec<(Resolution, ContactMatrix)>) -> Self {
        let order = levels.iter().map(|(res, _)| *res).collect();
        Self {
            name: name.into(),
            kind: SourceKind::MultiResolution(order),
            matrices: levels.into_iter().collect(),
        }
    }
}

impl ContactSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind.clone()
    }

    fn balanced_matrix(&self, resolution: Resolution) -> SourceResult<ContactMatrix> {
        let key = match self.kind {
            SourceKind::Flat => 1,
            _ => resolution,
        };
        self.matrices
            .get(&key)
            .cloned()
            .ok_or_else(|| {
                let message = format!("no matrix at resolution {}", resolution);
                SourceError::malformed(&self.name, message)
            })
    }
}
