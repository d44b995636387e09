//! Config command implementation - example, write and check prohic.toml

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::CliError;
use prohic_core::colormap;

pub fn execute(
    config: &Config,
    example: bool,
    write: Option<PathBuf>,
    check: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = check {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| CliError::file_not_found(path.clone()))?;
        let checked: Config = toml::from_str(&content).map_err(CliError::from)?;
        validate(&checked)?;
        println!("{}: ok", path.display());
        return Ok(());
    }

    if let Some(path) = write {
        Config::default().save_to_file(&path)?;
        log::info!("Default configuration written to: {}", path.display());
        return Ok(());
    }

    if example {
        print!("{}", Config::example_toml()?);
    } else {
        print!("{}", toml::to_string_pretty(config).map_err(|e| CliError::config(e.to_string()))?);
    }
    Ok(())
}

/// Check values serde cannot: colormap names and the resolution.
fn validate(config: &Config) -> Result<(), CliError> {
    for name in [&config.map.colormap, &config.tracks.region_palette] {
        if colormap::definition(name).is_err() {
            return Err(CliError::config(format!("unknown colormap '{}'", name)));
        }
    }
    if config.map.default_resolution == 0 {
        return Err(CliError::config("default_resolution must be positive"));
    }
    Ok(())
}
