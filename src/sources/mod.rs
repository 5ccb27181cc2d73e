//! Source normalizers: turn already-fetched local source files into
//! gated, deduplicated `<prefix> AS<digits>` artifacts.
//!
//! Fetching and external RPKI validation stay outside this crate; each
//! normalizer consumes whatever the fetch stage left on disk for its
//! source.

pub mod collectors;
pub mod irr;
pub mod rpki;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::entry::MapEntry;
use crate::error::Result;

/// Write one artifact, one entry per line.
pub(crate) fn write_entries(path: &Path, entries: &[MapEntry]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for entry in entries {
        writeln!(writer, "{entry}")?;
    }
    writer.flush()?;
    Ok(())
}
