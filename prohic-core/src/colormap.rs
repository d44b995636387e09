//! Named colour definitions and 256-entry lookup tables.
//!
//! A definition is stored as a handful of colour stops and expanded into
//! three 256-sample curves (red, green, blue) on demand. The lookup table
//! zips those curves together and casts to bytes.

use thiserror::Error;

pub const LUT_SIZE: usize = 256;

/// One RGB entry per byte value.
pub type LookupTable = [[u8; 3]; LUT_SIZE];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColormapError {
    #[error("Unknown colormap: {0}")]
    Unknown(String),
}

pub type ColormapResult<T> = Result<T, ColormapError>;

/// Colormap used for the contact map when none is chosen.
pub const DEFAULT_COLORMAP: &str = "magma";

/// Qualitative map region strands are coloured from.
pub const REGION_COLORMAP: &str = "rainbow";

/// Position in `[0, 1]` and the 0-255 RGB value there.
type Stop = (f64, [f64; 3]);

#[derive(Debug, Clone, Copy)]
pub struct ColormapDefinition {
    pub name: &'static str,
    stops: &'static [Stop],
}

/// The three curves of a definition, each `LUT_SIZE` long.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCurves {
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
}

impl ColormapDefinition {
    /// Interpolated colour at fraction `t`, channels in 0-255.
    pub fn color_at(&self, t: f64) -> [f64; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let stops = self.stops;
        let upper = stops.iter().position(|(pos, _)| *pos >= t).unwrap_or(stops.len() - 1);
        if upper == 0 {
            return stops[0].1;
        }
        let (p0, c0) = stops[upper - 1];
        let (p1, c1) = stops[upper];
        let w = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
        [
            c0[0] + (c1[0] - c0[0]) * w,
            c0[1] + (c1[1] - c0[1]) * w,
            c0[2] + (c1[2] - c0[2]) * w,
        ]
    }

    pub fn curves(&self) -> ColorCurves {
        let mut curves = ColorCurves {
            red: Vec::with_capacity(LUT_SIZE),
            green: Vec::with_capacity(LUT_SIZE),
            blue: Vec::with_capacity(LUT_SIZE),
        };
        for i in 0..LUT_SIZE {
            let [r, g, b] = self.color_at(i as f64 / (LUT_SIZE - 1) as f64);
            curves.red.push(r);
            curves.green.push(g);
            curves.blue.push(b);
        }
        curves
    }
}

const MAGMA: &[Stop] = &[
    (0.000, [0.0, 0.0, 4.0]),
    (0.125, [28.0, 16.0, 68.0]),
    (0.250, [79.0, 18.0, 123.0]),
    (0.375, [129.0, 37.0, 129.0]),
    (0.500, [181.0, 54.0, 122.0]),
    (0.625, [229.0, 80.0, 100.0]),
    (0.750, [251.0, 135.0, 97.0]),
    (0.875, [254.0, 194.0, 135.0]),
    (1.000, [252.0, 253.0, 191.0]),
];

const INFERNO: &[Stop] = &[
    (0.000, [0.0, 0.0, 4.0]),
    (0.125, [31.0, 12.0, 72.0]),
    (0.250, [85.0, 15.0, 109.0]),
    (0.375, [136.0, 34.0, 106.0]),
    (0.500, [186.0, 54.0, 85.0]),
    (0.625, [227.0, 89.0, 51.0]),
    (0.750, [249.0, 140.0, 10.0]),
    (0.875, [249.0, 201.0, 50.0]),
    (1.000, [252.0, 255.0, 164.0]),
];

const PLASMA: &[Stop] = &[
    (0.000, [13.0, 8.0, 135.0]),
    (0.125, [75.0, 3.0, 161.0]),
    (0.250, [125.0, 3.0, 168.0]),
    (0.375, [168.0, 34.0, 150.0]),
    (0.500, [203.0, 70.0, 121.0]),
    (0.625, [229.0, 107.0, 93.0]),
    (0.750, [248.0, 148.0, 65.0]),
    (0.875, [253.0, 195.0, 40.0]),
    (1.000, [240.0, 249.0, 33.0]),
];

const VIRIDIS: &[Stop] = &[
    (0.000, [68.0, 1.0, 84.0]),
    (0.125, [72.0, 36.0, 117.0]),
    (0.250, [59.0, 82.0, 139.0]),
    (0.375, [44.0, 114.0, 142.0]),
    (0.500, [33.0, 145.0, 140.0]),
    (0.625, [40.0, 174.0, 128.0]),
    (0.750, [94.0, 201.0, 98.0]),
    (0.875, [170.0, 220.0, 50.0]),
    (1.000, [253.0, 231.0, 37.0]),
];

const HOT: &[Stop] = &[
    (0.000, [11.0, 0.0, 0.0]),
    (0.365, [255.0, 0.0, 0.0]),
    (0.746, [255.0, 255.0, 0.0]),
    (1.000, [255.0, 255.0, 255.0]),
];

const GREYS: &[Stop] = &[(0.0, [255.0, 255.0, 255.0]), (1.0, [0.0, 0.0, 0.0])];

const REDS: &[Stop] = &[
    (0.000, [255.0, 245.0, 240.0]),
    (0.125, [254.0, 224.0, 210.0]),
    (0.250, [252.0, 187.0, 161.0]),
    (0.375, [252.0, 146.0, 114.0]),
    (0.500, [251.0, 106.0, 74.0]),
    (0.625, [239.0, 59.0, 44.0]),
    (0.750, [203.0, 24.0, 29.0]),
    (0.875, [165.0, 15.0, 21.0]),
    (1.000, [103.0, 0.0, 13.0]),
];

const YLORRD: &[Stop] = &[
    (0.000, [255.0, 255.0, 204.0]),
    (0.125, [255.0, 237.0, 160.0]),
    (0.250, [254.0, 217.0, 118.0]),
    (0.375, [254.0, 178.0, 76.0]),
    (0.500, [253.0, 141.0, 60.0]),
    (0.625, [252.0, 78.0, 42.0]),
    (0.750, [227.0, 26.0, 28.0]),
    (0.875, [189.0, 0.0, 38.0]),
    (1.000, [128.0, 0.0, 38.0]),
];

const RAINBOW: &[Stop] = &[
    (0.00, [0.0, 52.0, 245.0]),
    (0.20, [0.0, 150.0, 220.0]),
    (0.40, [62.0, 188.0, 82.0]),
    (0.60, [222.0, 200.0, 40.0]),
    (0.80, [250.0, 120.0, 30.0]),
    (1.00, [200.0, 20.0, 20.0]),
];

const REGISTRY: &[ColormapDefinition] = &[
    ColormapDefinition { name: "magma", stops: MAGMA },
    ColormapDefinition { name: "inferno", stops: INFERNO },
    ColormapDefinition { name: "plasma", stops: PLASMA },
    ColormapDefinition { name: "viridis", stops: VIRIDIS },
    ColormapDefinition { name: "hot", stops: HOT },
    ColormapDefinition { name: "greys", stops: GREYS },
    ColormapDefinition { name: "reds", stops: REDS },
    ColormapDefinition { name: "ylorrd", stops: YLORRD },
    ColormapDefinition { name: REGION_COLORMAP, stops: RAINBOW },
];

pub fn available_colormaps() -> Vec<&'static str> {
    REGISTRY.iter().map(|def| def.name).collect()
}

pub fn definition(name: &str) -> ColormapResult<&'static ColormapDefinition> {
    REGISTRY
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| ColormapError::Unknown(name.to_string()))
}

/// Build the 256-entry RGB lookup table for a named colormap.
pub fn build_lookup_table(name: &str) -> ColormapResult<LookupTable> {
    let curves = definition(name)?.curves();
    let mut table = [[0u8; 3]; LUT_SIZE];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = [
            to_byte(curves.red[i]),
            to_byte(curves.green[i]),
            to_byte(curves.blue[i]),
        ];
    }
    Ok(table)
}

/// Byte colour at fraction `t` of a named colormap.
pub fn sample(name: &str, t: f64) -> ColormapResult<[u8; 3]> {
    let [r, g, b] = definition(name)?.color_at(t);
    Ok([to_byte(r), to_byte(g), to_byte(b)])
}

fn to_byte(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.clamp(0.0, 255.0) as u8
    }
}
