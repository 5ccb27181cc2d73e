//! Cross-source merge: fold a lower-precedence candidate set into a base
//! map, keeping only candidates not already covered by the base.
//!
//! Retained candidates are tested against the base alone, never against
//! each other. Per-source deduplication guarantees one record per prefix
//! within a source but not subnet-disjointness between two different
//! candidate prefixes, so two retained candidates may overlap. That is a
//! known property of the pipeline, kept as-is.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::entry::MapEntry;
use crate::error::Result;
use crate::index::RootNetworkIndex;

/// Counters from one merge pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeStats {
    pub base_entries: usize,
    pub candidates_total: usize,
    pub candidates_retained: usize,
    pub candidates_unparsable: usize,
}

/// In-memory merge: `base` entries plus every candidate whose prefix is
/// not equal to or a subnet of a base prefix.
pub fn merge_candidates(base: &[MapEntry], candidates: &[MapEntry]) -> Vec<MapEntry> {
    let mut index = RootNetworkIndex::new();
    for entry in base {
        index.update(&entry.prefix);
    }

    let mut merged = base.to_vec();
    merged.extend(
        candidates
            .iter()
            .filter(|c| !index.contains(&c.prefix))
            .copied(),
    );
    merged
}

/// File-based merge stage.
///
/// The base file passes through to `out_file` verbatim, followed by every
/// retained candidate line. Candidate lines that fail to parse are skipped
/// with a diagnostic (bulk third-party data, one bad line must not void
/// the run); a missing or unreadable file is fatal. If `filtered_file` is
/// given, the retained candidates are also written there on their own.
pub fn merge_files(
    base_file: &Path,
    extra_file: &Path,
    filtered_file: Option<&Path>,
    out_file: &Path,
) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    let mut index = RootNetworkIndex::new();
    let base_lines = read_lines(base_file)?;
    for line in &base_lines {
        if line.is_empty() {
            continue;
        }
        match MapEntry::from_line(line) {
            Ok(entry) => {
                index.update(&entry.prefix);
                stats.base_entries += 1;
            }
            Err(e) => warn!("skipping invalid base line: {e}"),
        }
    }

    let mut retained = Vec::new();
    for line in read_lines(extra_file)? {
        if line.is_empty() {
            continue;
        }
        stats.candidates_total += 1;
        match MapEntry::from_line(&line) {
            Ok(entry) => {
                if !index.contains(&entry.prefix) {
                    retained.push(entry);
                }
            }
            Err(e) => {
                stats.candidates_unparsable += 1;
                warn!("skipping invalid candidate line: {e}");
            }
        }
    }
    stats.candidates_retained = retained.len();

    if let Some(path) = filtered_file {
        let mut writer = BufWriter::new(File::create(path)?);
        for entry in &retained {
            writeln!(writer, "{entry}")?;
        }
        writer.flush()?;
    }

    let mut writer = BufWriter::new(File::create(out_file)?);
    for line in &base_lines {
        if !line.is_empty() {
            writeln!(writer, "{line}")?;
        }
    }
    for entry in &retained {
        writeln!(writer, "{entry}")?;
    }
    writer.flush()?;

    info!(
        "merged {} candidates into {} base entries, {} retained",
        stats.candidates_total, stats.base_entries, stats.candidates_retained
    );
    Ok(stats)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?.trim_end().to_string());
    }
    Ok(lines)
}
