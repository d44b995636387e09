//! `.cool` and `.mcool` contact containers (HDF5).
//!
//! A cooler group stores bins (with balancing weights under `bins/weight`)
//! and the upper triangle of the contact matrix as sparse pixels. A
//! multi-resolution file keeps one cooler group per bin size under
//! `resolutions/<bin size>`.

use std::path::{Path, PathBuf};

use hdf5::{File as H5File, Group};
use ndarray::Array2;

use super::matrix::display_name;
use super::{
    detect_matrix_format, ContactSource, MatrixFormat, SourceError, SourceKind, SourceResult,
};
use crate::types::{ContactMatrix, Resolution};

pub struct CoolerSource {
    path: PathBuf,
    name: String,
    kind: SourceKind,
}

impl CoolerSource {
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let path = path.as_ref();
        let file = H5File::open(path).map_err(|e| h5_error(path, e))?;

        let kind = match detect_matrix_format(path) {
            Some(MatrixFormat::MultiCooler) => {
                let group = file.group("resolutions").map_err(|e| h5_error(path, e))?;
                let mut resolutions: Vec<Resolution> = group
                    .member_names()
                    .map_err(|e| h5_error(path, e))?
                    .iter()
                    .filter_map(|name| name.parse().ok())
                    .collect();
                resolutions.sort_unstable();
                if resolutions.is_empty() {
                    return Err(SourceError::malformed(path, "no resolutions in container"));
                }
                SourceKind::MultiResolution(resolutions)
            }
            Some(MatrixFormat::Cooler) => {
                let bin_size = file
                    .attr("bin-size")
                    .and_then(|attr| attr.read_scalar::<i64>())
                    .map_err(|e| h5_error(path, e))?;
                let bin_size = Resolution::try_from(bin_size).map_err(|_| {
                    SourceError::malformed(path, format!("invalid bin size {}", bin_size))
                })?;
                SourceKind::SingleResolution(bin_size)
            }
            _ => return Err(SourceError::Unrecognized { path: path.to_path_buf() }),
        };

        log::debug!("Opened cooler {} ({:?})", path.display(), kind);
        Ok(Self { path: path.to_path_buf(), name: display_name(path), kind })
    }

    fn cooler_group(&self, file: &H5File, resolution: Resolution) -> SourceResult<Group> {
        let group_path = match self.kind {
            SourceKind::MultiResolution(_) => format!("resolutions/{}", resolution),
            _ => "/".to_string(),
        };
        file.group(&group_path).map_err(|e| h5_error(&self.path, e))
    }
}

impl ContactSource for CoolerSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn kind(&self) -> SourceKind {
        self.kind.clone()
    }

    fn balanced_matrix(&self, resolution: Resolution) -> SourceResult<ContactMatrix> {
        let file = H5File::open(&self.path).map_err(|e| h5_error(&self.path, e))?;
        let group = self.cooler_group(&file, resolution)?;
        let read = |name: &str| -> SourceResult<Vec<f64>> {
            group
                .dataset(name)
                .and_then(|ds| ds.read_raw::<f64>())
                .map_err(|e| h5_error(&self.path, e))
        };

        let weights = read("bins/weight").map_err(|_| {
            SourceError::malformed(&self.path, "matrix is not balanced (no bins/weight)")
        })?;
        let bin1 = read("pixels/bin1_id")?;
        let bin2 = read("pixels/bin2_id")?;
        let counts = read("pixels/count")?;
        if bin1.len() != bin2.len() || bin1.len() != counts.len() {
            return Err(SourceError::malformed(&self.path, "pixel columns differ in length"));
        }

        let n = weights.len();
        let mut matrix = Array2::<f64>::zeros((n, n));
        for ((&i, &j), &count) in bin1.iter().zip(&bin2).zip(&counts) {
            let (i, j) = (i as usize, j as usize);
            if i >= n || j >= n {
                let message = format!("pixel ({}, {}) outside {} bins", i, j, n);
                return Err(SourceError::malformed(&self.path, message));
            }
            matrix[[i, j]] = count;
            matrix[[j, i]] = count;
        }

        // Bins without a weight were masked by balancing; they become NaN.
        for ((i, j), value) in matrix.indexed_iter_mut() {
            *value *= weights[i] * weights[j];
        }

        log::info!("Loaded {} bins at {} bp from {}", n, resolution, self.name);
        Ok(matrix)
    }
}

fn h5_error(path: &Path, err: hdf5::Error) -> SourceError {
    SourceError::malformed(path, err.to_string())
}
