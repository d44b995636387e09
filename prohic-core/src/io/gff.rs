//! GFF/GFF2/GFF3 gene features.
//!
//! Only type (column 3), start, end, strand and attributes are used. A
//! feature's label is its type and attributes on two lines.

use std::io::BufRead;
use std::path::Path;

use super::{open_text_reader, FeatureRecord, SourceResult};
use crate::types::{GenomicPos, Strand};

const GFF_COLUMNS: usize = 9;

pub fn read_gff<P: AsRef<Path>>(path: P) -> SourceResult<Vec<FeatureRecord>> {
    let path = path.as_ref();
    let records = parse_gff(open_text_reader(path)?, path)?;
    Ok(merge_shared_starts(records))
}

pub fn parse_gff<R: BufRead>(reader: R, path: &Path) -> SourceResult<Vec<FeatureRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < GFF_COLUMNS {
            log::warn!(
                "{}:{}: expected {} columns, got {}, skipping",
                path.display(),
                index + 1,
                GFF_COLUMNS,
                fields.len()
            );
            continue;
        }
        let start = fields[3].trim().parse::<GenomicPos>();
        let end = fields[4].trim().parse::<GenomicPos>();
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
            label: format!("{}\n{}", fields[2], fields[8]),
            strand: Strand::from_field(fields[6]),
        });
    }
    Ok(records)
}

/// Collapse runs of neighbouring features that start at the same position
/// (a gene and its mRNA, say) into the first one; labels are joined with a
/// blank line.
pub fn merge_shared_starts(records: Vec<FeatureRecord>) -> Vec<FeatureRecord> {
    let mut merged: Vec<FeatureRecord> = Vec::with_capacity(records.len());
    for record in records {
        match merged.last_mut() {
            Some(last) if last.start == record.start => {
                last.label.push_str("\n\n");
                last.label.push_str(&record.label);
            }
            _ => merged.push(record),
        }
    }
    merged
}
