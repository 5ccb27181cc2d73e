//! Canonical ordering of the final map artifact.
//!
//! IPv4 before IPv6, numerically smaller network first, and at an equal
//! network address the more specific (longer) prefix first, so a reader
//! scanning top-down inside one address sees the most specific entry
//! before its covering aggregates.

use std::cmp::Reverse;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ipnet::IpNet;

use crate::entry::{prefix_ints, MapEntry};
use crate::error::Result;

fn sort_key(entry: &MapEntry) -> (bool, u128, Reverse<u8>) {
    let (net, _) = prefix_ints(&entry.prefix);
    (
        matches!(entry.prefix, IpNet::V6(_)),
        net,
        Reverse(entry.prefix.prefix_len()),
    )
}

/// Sort entries in place into the canonical artifact order.
pub fn sort_entries(entries: &mut [MapEntry]) {
    entries.sort_by_key(sort_key);
}

/// Read a map file, sort it, and write the ordered result.
///
/// This runs over the pipeline's own final artifact, so parsing is
/// fail-fast like every other final-map consumer.
pub fn sort_map_file(in_file: &Path, out_file: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(in_file)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        entries.push(MapEntry::from_line(trimmed)?);
    }

    sort_entries(&mut entries);

    let mut writer = BufWriter::new(File::create(out_file)?);
    for entry in &entries {
        writeln!(writer, "{entry}")?;
    }
    writer.flush()?;
    Ok(entries.len())
}
