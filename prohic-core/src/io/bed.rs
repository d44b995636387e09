//! BED region tracks: `chrom start end name`, tab separated.

use std::io::BufRead;
use std::path::Path;

use super::{is_bed_header, open_text_reader, FeatureRecord, SourceResult};
use crate::types::{GenomicPos, Strand};

pub fn read_bed<P: AsRef<Path>>(path: P) -> SourceResult<Vec<FeatureRecord>> {
    let path = path.as_ref();
    parse_bed(open_text_reader(path)?, path)
}

/// Region records; header and comment lines are skipped, as are lines whose
/// coordinates do not parse. BED regions carry no strand.
pub fn parse_bed<R: BufRead>(reader: R, path: &Path) -> SourceResult<Vec<FeatureRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if is_bed_header(line) {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            log::warn!("{}:{}: expected at least 3 columns, skipping", path.display(), index + 1);
            continue;
        }
        let start = fields[1].trim().parse::<GenomicPos>();
        let end = fields[2].trim().parse::<GenomicPos>();
        let (start, end) = match (start, end) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                log::warn!("{}:{}: bad coordinates, skipping", path.display(), index + 1);
                continue;
            }
        };

        records.push(FeatureRecord {
            start,
            end,
            label: fields.get(3).map(|s| s.to_string()).unwrap_or_default(),
            strand: Strand::Unstranded,
        });
    }
    Ok(records)
}
