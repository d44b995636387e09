//! Info command implementation - print the map summary board

use anyhow::{Context, Result};
use prohic_core::summary::format_resolution;
use prohic_core::{Browser, MapSummary};
use serde::Serialize;

use crate::config::Config;
use crate::MapArgs;

#[derive(Debug, Serialize)]
struct InfoReport<'a> {
    summary: MapSummary,
    bins: usize,
    resolutions: &'a [u32],
}

pub fn execute(config: &Config, args: &MapArgs, json: bool) -> Result<()> {
    let browser = super::open_session(config, args)?;
    println!("{}", render(&browser, json)?);
    Ok(())
}

fn render(browser: &Browser, json: bool) -> Result<String> {
    let store = browser.store();
    if json {
        let report = InfoReport {
            summary: browser.summary(),
            bins: store.side(),
            resolutions: store.resolutions(),
        };
        return serde_json::to_string_pretty(&report).context("Failed to serialize summary");
    }

    let mut text = browser.summary().to_string();
    text.push_str(&format!("\nBins: {}", store.side()));
    if !store.resolutions().is_empty() {
        let levels: Vec<String> =
            store.resolutions().iter().map(|r| format_resolution(*r)).collect();
        text.push_str(&format!("\nResolutions: {}", levels.join(", ")));
    }
    Ok(text)
}
