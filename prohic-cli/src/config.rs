//! Configuration handling for ProHiC CLI
//!
//! Supports loading configuration from prohic.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use prohic_core::colormap::{DEFAULT_COLORMAP, REGION_COLORMAP};
use prohic_core::types::{Resolution, DEFAULT_RESOLUTION};
use prohic_core::{SessionSettings, StoreDefaults};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub tracks: TracksConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Resolution requested from multi-resolution containers
    #[serde(default = "default_resolution")]
    pub default_resolution: Resolution,

    /// Start with log compression on
    #[serde(default = "default_true")]
    pub log: bool,

    /// Start with observed/expected on
    #[serde(default)]
    pub observed_over_expected: bool,

    /// Colormap for the contact matrix
    #[serde(default = "default_colormap")]
    pub colormap: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksConfig {
    /// Colormap region colours are drawn from
    #[serde(default = "default_region_palette")]
    pub region_palette: String,

    /// Seed for region colours (0 picks a fresh one per run)
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Digits after the decimal point in TSV output
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Text written for missing values in TSV output
    #[serde(default = "default_nan")]
    pub nan: String,
}

// Default value functions
fn default_resolution() -> Resolution { DEFAULT_RESOLUTION }
fn default_true() -> bool { true }
fn default_colormap() -> String { DEFAULT_COLORMAP.to_string() }
fn default_region_palette() -> String { REGION_COLORMAP.to_string() }
fn default_precision() -> usize { 6 }
fn default_nan() -> String { "nan".to_string() }

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_resolution: default_resolution(),
            log: true,
            observed_over_expected: false,
            colormap: default_colormap(),
        }
    }
}

impl Default for TracksConfig {
    fn default() -> Self {
        Self {
            region_palette: default_region_palette(),
            seed: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            nan: default_nan(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find prohic.toml in current directory
                let default_path = PathBuf::from("prohic.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: prohic.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")
    }

    /// Session startup values taken from the `[map]` and `[tracks]` tables
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            defaults: StoreDefaults {
                resolution: self.map.default_resolution,
                log: self.map.log,
                observed_over_expected: self.map.observed_over_expected,
            },
            colormap: self.map.colormap.clone(),
            region_palette: self.tracks.region_palette.clone(),
            seed: (self.tracks.seed != 0).then_some(self.tracks.seed),
        }
    }
}
