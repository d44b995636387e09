//! Map store: the loaded contact matrix and everything derived from it.
//!
//! The store keeps two separate buffers. `raw` is the balanced matrix as
//! read from the source and never changes until the next load. `display` is
//! rebuilt from `raw` by the transform pipeline whenever a flag changes. The
//! circular shift is applied lazily by [`MapStore::current_view`], so moving
//! the view never re-runs the pipeline.

use std::path::{Path, PathBuf};

use crate::io::{self, select_resolution, ContactSource, SourceError, SourceKind, SourceResult};
use crate::transform::{roll_view, Pipeline};
use crate::types::{ContactMatrix, GenomicPos, Resolution, DEFAULT_RESOLUTION};

/// Shift steps that make up one full turn of the map.
pub const SHIFT_STEPS: i32 = 100;

/// Flag and resolution values a fresh load starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDefaults {
    pub resolution: Resolution,
    pub log: bool,
    pub observed_over_expected: bool,
}

impl Default for StoreDefaults {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            log: true,
            observed_over_expected: false,
        }
    }
}

#[derive(Debug, Clone)]
struct LoadedMap {
    name: String,
    path: Option<PathBuf>,
    resolution: Resolution,
    resolutions: Vec<Resolution>,
    raw: ContactMatrix,
}

#[derive(Debug, Clone)]
pub struct MapStore {
    defaults: StoreDefaults,
    map: Option<LoadedMap>,
    preferred_resolution: Resolution,
    log_enabled: bool,
    oe_enabled: bool,
    shift_units: i32,
    display: ContactMatrix,
}

impl MapStore {
    pub fn new() -> Self {
        Self::with_defaults(StoreDefaults::default())
    }

    pub fn with_defaults(defaults: StoreDefaults) -> Self {
        Self {
            defaults,
            map: None,
            preferred_resolution: defaults.resolution,
            log_enabled: defaults.log,
            oe_enabled: defaults.observed_over_expected,
            shift_units: 0,
            display: ContactMatrix::zeros((0, 0)),
        }
    }

    /// Load a contact map from any source.
    ///
    /// Multi-resolution sources use the requested resolution, or the nearest
    /// available one; `None` asks for the last loaded (or default)
    /// resolution. On error the store is left exactly as it was.
    pub fn load(
        &mut self,
        source: &dyn ContactSource,
        resolution: Option<Resolution>,
    ) -> SourceResult<()> {
        let requested = resolution.unwrap_or(self.preferred_resolution);
        let kind = source.kind();
        let (resolution, resolutions) = match &kind {
            SourceKind::MultiResolution(list) => {
                let chosen = select_resolution(list, requested).ok_or_else(|| {
                    SourceError::malformed(source.name(), "container lists no resolutions")
                })?;
                if chosen != requested {
                    log::info!("Resolution {} bp not available, using {} bp", requested, chosen);
                }
                (chosen, list.clone())
            }
            SourceKind::SingleResolution(bin_size) => (*bin_size, kind.resolutions()),
            SourceKind::Flat => (1, Vec::new()),
        };

        let raw = source.balanced_matrix(resolution)?;
        let (rows, cols) = raw.dim();
        if rows != cols {
            return Err(SourceError::malformed(
                source.name(),
                format!("contact matrix must be square, got {}x{}", rows, cols),
            ));
        }
        if rows == 0 {
            return Err(SourceError::malformed(source.name(), "contact matrix is empty"));
        }

        let log_enabled = self.defaults.log;
        let oe_enabled = self.defaults.observed_over_expected;
        let display = Pipeline::new(oe_enabled, log_enabled).apply(&raw);

        self.map = Some(LoadedMap {
            name: source.name().to_string(),
            path: source.path().map(Path::to_path_buf),
            resolution,
            resolutions,
            raw,
        });
        if !matches!(kind, SourceKind::Flat) {
            self.preferred_resolution = resolution;
        }
        self.log_enabled = log_enabled;
        self.oe_enabled = oe_enabled;
        self.shift_units = 0;
        self.display = display;

        log::info!(
            "Loaded {}: {} bins at {} bp ({} bp total)",
            self.name().unwrap_or_default(),
            rows,
            resolution,
            self.size_bp()
        );
        Ok(())
    }

    /// Open a file by extension and load it.
    pub fn load_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        resolution: Option<Resolution>,
    ) -> SourceResult<()> {
        let source = io::open_source(path)?;
        self.load(source.as_ref(), resolution)
    }

    /// Forget the map and return to the initial state.
    pub fn close(&mut self) {
        if let Some(name) = self.name() {
            log::info!("Closing {}", name);
        }
        *self = Self::with_defaults(self.defaults);
    }

    pub fn toggle_observed_over_expected(&mut self) {
        if self.map.is_none() {
            return;
        }
        self.oe_enabled = !self.oe_enabled;
        self.recompute();
    }

    pub fn toggle_log(&mut self) {
        if self.map.is_none() {
            return;
        }
        self.log_enabled = !self.log_enabled;
        self.recompute();
    }

    /// Move the view by `delta` percent of the map. Reaching a full turn in
    /// either direction resets to 0.
    pub fn set_shift(&mut self, delta: i32) {
        self.shift_units += delta;
        if self.shift_units >= SHIFT_STEPS || self.shift_units <= -SHIFT_STEPS {
            self.shift_units = 0;
        }
    }

    /// The display matrix rolled by the current shift along both axes.
    pub fn current_view(&self) -> ContactMatrix {
        roll_view(&self.display, self.shift_cells())
    }

    /// Cells the view is rolled by: `shift_units * side / 100`, truncated.
    pub fn shift_cells(&self) -> isize {
        let step = self.side() as f64 / SHIFT_STEPS as f64;
        (self.shift_units as f64 * step) as isize
    }

    fn recompute(&mut self) {
        if let Some(map) = &self.map {
            log::debug!("Recomputing display (oe={}, log={})", self.oe_enabled, self.log_enabled);
            self.display = Pipeline::new(self.oe_enabled, self.log_enabled).apply(&map.raw);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.map.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.map.as_ref().map(|m| m.name.as_str())
    }

    pub fn path(&self) -> Option<&Path> {
        self.map.as_ref().and_then(|m| m.path.as_deref())
    }

    /// Resolution of the loaded map, or the one the next load will ask for.
    pub fn resolution(&self) -> Resolution {
        self.map.as_ref().map(|m| m.resolution).unwrap_or(self.preferred_resolution)
    }

    pub fn resolutions(&self) -> &[Resolution] {
        self.map.as_ref().map(|m| m.resolutions.as_slice()).unwrap_or(&[])
    }

    /// Matrix side length in bins.
    pub fn side(&self) -> usize {
        self.map.as_ref().map(|m| m.raw.nrows()).unwrap_or(0)
    }

    /// Total map size in base pairs; 0 when nothing is loaded.
    pub fn size_bp(&self) -> GenomicPos {
        self.map
            .as_ref()
            .map(|m| m.raw.nrows() as GenomicPos * m.resolution as GenomicPos)
            .unwrap_or(0)
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }

    pub fn oe_enabled(&self) -> bool {
        self.oe_enabled
    }

    pub fn shift_units(&self) -> i32 {
        self.shift_units
    }

    /// Base pairs covered by one shift step.
    pub fn shift_step_bp(&self) -> f64 {
        self.size_bp() as f64 / SHIFT_STEPS as f64
    }

    /// Current shift in base pairs, truncated.
    pub fn shift_bp(&self) -> i64 {
        (self.shift_units as f64 * self.shift_step_bp()) as i64
    }

    pub fn display(&self) -> &ContactMatrix {
        &self.display
    }

    pub fn raw(&self) -> Option<&ContactMatrix> {
        self.map.as_ref().map(|m| &m.raw)
    }
}

impl Default for MapStore {
    fn default() -> Self {
        Self::new()
    }
}
