//! View command implementation - dump the processed matrix as the viewer shows it

use anyhow::{Context, Result};
use prohic_core::ContactMatrix;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::config::{Config, OutputConfig};
use crate::{MapArgs, OutputFormat};

#[derive(Serialize)]
struct ViewDump {
    name: Option<String>,
    resolution: u32,
    shift_bp: i64,
    log: bool,
    observed_over_expected: bool,
    /// NaN cells serialize as null
    matrix: Vec<Vec<f64>>,
}

pub fn execute(
    config: &Config,
    args: &MapArgs,
    out: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let browser = super::open_session(config, args)?;
    let view = browser.current_view();
    log::info!(
        "Writing {}x{} view shifted by {} bp",
        view.nrows(),
        view.ncols(),
        browser.store().shift_bp()
    );

    let mut writer = super::output_writer(out.as_deref())?;
    match format {
        OutputFormat::Tsv => write_tsv(&mut writer, &view, &config.output)?,
        OutputFormat::Json => {
            let summary = browser.summary();
            let dump = ViewDump {
                name: summary.name,
                resolution: summary.resolution,
                shift_bp: summary.shift_bp,
                log: summary.log,
                observed_over_expected: summary.observed_over_expected,
                matrix: view.rows().into_iter().map(|row| row.to_vec()).collect(),
            };
            serde_json::to_writer(&mut writer, &dump).context("Failed to write JSON view")?;
            writeln!(writer)?;
        }
    }
    super::finish(writer, out.as_deref())
}

fn write_tsv<W: Write + ?Sized>(
    writer: &mut W,
    view: &ContactMatrix,
    output: &OutputConfig,
) -> Result<()> {
    for row in view.rows() {
        let fields: Vec<String> = row.iter().map(|v| super::format_value(*v, output)).collect();
        writeln!(writer, "{}", fields.join("\t")).context("Failed to write view")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsv_rows() {
        let view = ContactMatrix::from_shape_vec((2, 2), vec![0.0, 0.25, f64::NAN, 1.0]).unwrap();
        let output = OutputConfig { precision: 2, nan: "nan".to_string() };
        let mut buffer = Vec::new();
        write_tsv(&mut buffer, &view, &output).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "0.00\t0.25\nnan\t1.00\n");
    }
}
