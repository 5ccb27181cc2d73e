//! Normalizer for route-collector prefix-to-ASN files.
//!
//! Collector exports list `<prefix> <asn>` with two quirks: multi-origin
//! routes join origins with `_` (ordered by occurrence upstream, so the
//! first is the preferred one) and AS-SET origins join members with `,`.
//! Both are reduced to the first-listed ASN, which is why this source
//! needs no conflict resolution of its own.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::dedup::{DedupStats, Gate};
use crate::entry::{extract_asn, parse_prefix, MapEntry};
use crate::error::Result;

/// Clean a raw collector file into the collector artifact at `out_file`.
///
/// Candidate-source data, so malformed lines are skipped with a
/// diagnostic rather than aborting the run.
pub fn parse_collectors(input: &Path, out_file: &Path, gate: Gate) -> Result<DedupStats> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(out_file)?);
    let mut stats = DedupStats::default();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // First origin of a multi-origin route, first member of an AS-SET
        let reduced = trimmed
            .split('_')
            .next()
            .and_then(|s| s.split(',').next())
            .unwrap_or(trimmed);

        let entry = match parse_line(reduced) {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping collector line: {e}");
                stats.rejected_incomplete += 1;
                continue;
            }
        };

        if gate.rejects(&entry.prefix, entry.asn) {
            stats.rejected_invalid += 1;
            continue;
        }

        writeln!(writer, "{entry}")?;
        stats.accepted += 1;
    }
    writer.flush()?;

    info!(
        "collectors: {} entries written, {} rejected",
        stats.accepted, stats.rejected_invalid
    );
    Ok(stats)
}

fn parse_line(line: &str) -> Result<MapEntry> {
    let (prefix_str, asn_str) = line.split_once(' ').ok_or_else(|| {
        crate::error::PfxmapError::InvalidLine {
            line: line.to_string(),
        }
    })?;
    Ok(MapEntry::new(
        parse_prefix(prefix_str)?,
        extract_asn(asn_str)?,
    ))
}
