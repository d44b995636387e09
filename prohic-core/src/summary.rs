//! Board summary of the opened map.

use std::fmt;

use serde::Serialize;

use crate::store::MapStore;
use crate::types::{GenomicPos, Resolution};

const NAME_LIMIT: usize = 18;
const NAME_KEEP: usize = 15;

/// Snapshot of what the info board shows. `None` fields mean no map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub name: Option<String>,
    pub size_bp: GenomicPos,
    pub resolution: Resolution,
    pub log: bool,
    pub observed_over_expected: bool,
    pub shift_bp: i64,
    pub colormap: String,
}

impl MapSummary {
    pub fn from_store(store: &MapStore, colormap: &str) -> Self {
        Self {
            name: store.name().map(str::to_string),
            size_bp: store.size_bp(),
            resolution: store.resolution(),
            log: store.log_enabled(),
            observed_over_expected: store.oe_enabled(),
            shift_bp: store.shift_bp(),
            colormap: colormap.to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.name.is_some()
    }
}

/// Names longer than 18 characters keep their first 15 and get `...`.
pub fn short_name(name: &str) -> String {
    if name.chars().count() > NAME_LIMIT {
        let head: String = name.chars().take(NAME_KEEP).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// `1234567` becomes `1'234'567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\'');
        }
        out.push(c);
    }
    out
}

/// `5000` becomes `5k`; anything not a multiple of 1000 is printed as is.
pub fn format_resolution(resolution: Resolution) -> String {
    if resolution != 0 && resolution % 1000 == 0 {
        format!("{}k", resolution / 1000)
    } else {
        resolution.to_string()
    }
}

impl fmt::Display for MapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(name) = &self.name else {
            return write!(f, "No map is opened");
        };
        writeln!(f, "Name: {}", short_name(name))?;
        writeln!(f, "Size: {}", group_thousands(self.size_bp))?;
        writeln!(f, "Resolution: {}", format_resolution(self.resolution))?;
        writeln!(f, "LOG={}  OE={}", self.log, self.observed_over_expected)?;
        writeln!(f, "Shift: {}", self.shift_bp)?;
        write!(f, "Colormap: {}", self.colormap)
    }
}
