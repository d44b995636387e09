//! Track command implementation - align annotation files to the shifted map

use anyhow::{Context, Result};
use prohic_core::{Browser, Strand, Track};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::config::{Config, OutputConfig};
use crate::error::CliError;
use crate::{MapArgs, OutputFormat};

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Row<'a> {
    Region {
        track: &'a str,
        start: f64,
        end: f64,
        strand: Strand,
        lane: i8,
        color: String,
        visible: bool,
        label: &'a str,
    },
    Point {
        track: &'a str,
        x: f64,
        y: f64,
    },
}

pub fn execute(
    config: &Config,
    args: &MapArgs,
    tracks: &[PathBuf],
    curve_log: bool,
    all: bool,
    out: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut browser = super::open_session(config, args)?;

    for path in tracks {
        if !path.exists() {
            return Err(CliError::file_not_found(path.clone()).into());
        }
        let id = browser.import_track(path).map_err(CliError::from)?;
        if curve_log {
            browser.toggle_track_log(id).map_err(CliError::from)?;
        }
    }

    let rows = collect_rows(&browser, all);
    log::info!("Writing {} aligned track items", rows.len());

    let mut writer = super::output_writer(out.as_deref())?;
    match format {
        OutputFormat::Tsv => write_tsv(&mut writer, &rows, &config.output)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut writer, &rows).context("Failed to write JSON tracks")?;
            writeln!(writer)?;
        }
    }
    super::finish(writer, out.as_deref())
}

fn collect_rows(browser: &Browser, all: bool) -> Vec<Row<'_>> {
    browser
        .tracks()
        .flat_map(|(_, track)| track_rows(track, all))
        .collect()
}

fn track_rows(track: &Track, all: bool) -> Vec<Row<'_>> {
    let regions = track
        .regions()
        .filter(|region| all || region.is_visible())
        .map(move |region| {
            let [r, g, b] = region.color();
            Row::Region {
                track: &track.name,
                start: region.start(),
                end: region.end(),
                strand: region.strand(),
                lane: region.lane(),
                color: format!("#{:02x}{:02x}{:02x}", r, g, b),
                visible: region.is_visible(),
                label: region.label(),
            }
        });
    let points = track.curves().flat_map(move |curve| {
        curve
            .points()
            .iter()
            .map(move |point| Row::Point { track: &track.name, x: point.x, y: point.y })
    });
    regions.chain(points).collect()
}

fn write_tsv<W: Write + ?Sized>(
    writer: &mut W,
    rows: &[Row<'_>],
    output: &OutputConfig,
) -> Result<()> {
    for row in rows {
        let line = match row {
            Row::Region { track, start, end, strand, lane, color, visible, label } => format!(
                "{}\tregion\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                track,
                super::format_value(*start, output),
                super::format_value(*end, output),
                char::from(*strand),
                lane,
                color,
                visible,
                label.replace('\n', " | ")
            ),
            Row::Point { track, x, y } => format!(
                "{}\tpoint\t{}\t{}",
                track,
                super::format_value(*x, output),
                super::format_value(*y, output)
            ),
        };
        writeln!(writer, "{}", line).context("Failed to write tracks")?;
    }
    Ok(())
}
