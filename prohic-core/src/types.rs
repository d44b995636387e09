use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Base-pair coordinate on the concatenated genome map.
pub type GenomicPos = u64;
/// Base pairs covered by one matrix bin.
pub type Resolution = u32;
/// Square contact matrix; NaN marks masked or missing bins.
pub type ContactMatrix = Array2<f64>;

/// Resolution requested when nothing else is known, in bp.
pub const DEFAULT_RESOLUTION: Resolution = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
    Unstranded,
}

impl Strand {
    /// Reads a strand column. Anything mentioning `+` is forward, then `-` is
    /// reverse; `.`, empty and unknown values are unstranded.
    pub fn from_field(field: &str) -> Self {
        if field.contains('+') {
            Strand::Forward
        } else if field.contains('-') {
            Strand::Reverse
        } else {
            Strand::Unstranded
        }
    }

    /// Vertical lane a feature of this strand is drawn in.
    pub fn lane_offset(self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
            Strand::Unstranded => 0,
        }
    }
}

impl Default for Strand {
    fn default() -> Self {
        Strand::Unstranded
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unstranded => '.',
        }
    }
}

/// One sample of a signal curve, x in base pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
