//! bedGraph signal tracks: `chrom start end value`.

use std::io::BufRead;
use std::path::Path;

use super::{is_bed_header, open_text_reader, SignalRecord, SourceResult};
use crate::types::{CurvePoint, GenomicPos};

pub fn read_bedgraph<P: AsRef<Path>>(path: P) -> SourceResult<Vec<SignalRecord>> {
    let path = path.as_ref();
    parse_bedgraph(open_text_reader(path)?, path)
}

pub fn parse_bedgraph<R: BufRead>(reader: R, path: &Path) -> SourceResult<Vec<SignalRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if is_bed_header(line) {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            log::warn!("{}:{}: expected 4 columns, skipping", path.display(), index + 1);
            continue;
        }
        let parsed = (
            fields[1].trim().parse::<GenomicPos>(),
            fields[2].trim().parse::<GenomicPos>(),
            fields[3].trim().parse::<f64>(),
        );
        match parsed {
            (Ok(start), Ok(end), Ok(value)) => records.push(SignalRecord { start, end, value }),
            _ => log::warn!("{}:{}: unparsable interval, skipping", path.display(), index + 1),
        }
    }
    Ok(records)
}

/// One curve sample per interval, placed at its midpoint.
pub fn to_curve_points(records: &[SignalRecord]) -> Vec<CurvePoint> {
    records
        .iter()
        .map(|r| CurvePoint::new(r.midpoint(), r.value))
        .collect()
}
