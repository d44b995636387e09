//! Colormap commands - list palettes and dump lookup tables

use anyhow::{Context, Result};
use prohic_core::colormap::{self, LookupTable};
use std::io::Write;

use crate::config::Config;
use crate::error::CliError;
use crate::OutputFormat;

pub fn execute_lut(config: &Config, name: Option<String>, format: OutputFormat) -> Result<()> {
    let name = name.unwrap_or_else(|| config.map.colormap.clone());
    let table = colormap::build_lookup_table(&name)
        .map_err(|_| CliError::Colormap { name: name.clone() })?;
    log::debug!("Built lookup table for {}", name);

    let mut writer = super::output_writer(None)?;
    write_table(&mut writer, &table, format)?;
    super::finish(writer, None)
}

pub fn execute_list(config: &Config) -> Result<()> {
    let mut writer = super::output_writer(None)?;
    for name in colormap::available_colormaps() {
        let marker = if name == config.map.colormap { " (default)" } else { "" };
        writeln!(writer, "{}{}", name, marker)?;
    }
    super::finish(writer, None)
}

fn write_table<W: Write + ?Sized>(
    writer: &mut W,
    table: &LookupTable,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Tsv => {
            for (index, [r, g, b]) in table.iter().enumerate() {
                writeln!(writer, "{}\t{}\t{}\t{}", index, r, g, b)
                    .context("Failed to write lookup table")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, &table.to_vec())
                .context("Failed to write lookup table")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
