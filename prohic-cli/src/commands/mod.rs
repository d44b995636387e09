//! Command implementations for ProHiC CLI

pub mod info;
pub mod view;
pub mod track;
pub mod palette;
pub mod config;

use anyhow::{Context, Result};
use prohic_core::store::SHIFT_STEPS;
use prohic_core::Browser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::{Config, OutputConfig};
use crate::error::{CliError, CliResult};
use crate::MapArgs;

/// Open the map named on the command line and bring the session to the
/// requested flags and shift.
pub fn open_session(config: &Config, args: &MapArgs) -> Result<Browser> {
    if !args.map.exists() {
        return Err(CliError::file_not_found(args.map.clone()).into());
    }

    let mut browser = Browser::with_settings(config.session_settings()).map_err(CliError::from)?;
    browser
        .open(&args.map, args.resolution)
        .map_err(CliError::from)?;

    if args.log.is_some_and(|log| log != browser.store().log_enabled()) {
        browser.toggle_log();
    }
    if args.oe.is_some_and(|oe| oe != browser.store().oe_enabled()) {
        browser.toggle_oe();
    }
    apply_shift(&mut browser, args.shift);

    Ok(browser)
}

/// Step a freshly loaded view `steps` times; negative values go left.
///
/// Every full turn in one direction lands back on 0, so only the remainder
/// is stepped.
pub fn apply_shift(browser: &mut Browser, steps: i32) {
    let steps = steps % SHIFT_STEPS;
    for _ in 0..steps.unsigned_abs() {
        if steps > 0 {
            browser.shift_right();
        } else {
            browser.shift_left();
        }
    }
}

/// Buffered writer for `--out`, or stdout.
pub fn output_writer(out: Option<&Path>) -> CliResult<Box<dyn Write>> {
    match out {
        Some(path) => {
            let file = File::create(path)?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

/// One value in TSV output.
pub fn format_value(value: f64, output: &OutputConfig) -> String {
    if value.is_nan() {
        output.nan.clone()
    } else {
        format!("{:.*}", output.precision, value)
    }
}

pub fn finish(mut writer: Box<dyn Write>, out: Option<&Path>) -> Result<()> {
    writer.flush().context("Failed to flush output")?;
    if let Some(path) = out {
        log::info!("Output written to: {}", path.display());
    }
    Ok(())
}
