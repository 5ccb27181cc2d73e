//! The full map-building run: normalize each source, merge in precedence
//! order, sort, and publish the final artifact.
//!
//! Precedence is fixed: RPKI over IRR over route collectors. Each merge
//! stage only starts once its source's normalization has fully completed;
//! every stage works over total, already-resolved datasets, never partial
//! ones.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::context::Context;
use crate::error::Result;
use crate::merge::merge_files;
use crate::sort::sort_map_file;
use crate::sources::{collectors, irr, rpki};

/// Raw source files for one run, already fetched and (for RPKI)
/// externally validated.
#[derive(Debug, Clone)]
pub struct MapInputs {
    /// JSON dump from the RPKI validator. Always required; RPKI is the
    /// base layer of the map.
    pub rpki_json: PathBuf,
    /// IRR database files, empty to skip the IRR layer.
    pub irr_files: Vec<PathBuf>,
    /// Route-collector prefix-to-ASN file, `None` to skip that layer.
    pub collectors_file: Option<PathBuf>,
}

/// Run the whole pipeline; returns the path of the final sorted map.
pub fn run_map(ctx: &Context, inputs: &MapInputs) -> Result<PathBuf> {
    let rpki_final = ctx.out_dir_rpki.join("rpki_final.txt");
    rpki::parse_rpki(&inputs.rpki_json, &rpki_final, ctx.gate)?;

    let mut base = rpki_final;

    if !inputs.irr_files.is_empty() {
        let irr_final = ctx.out_dir_irr.join("irr_final.txt");
        let irr_filtered = ctx.out_dir_irr.join("irr_filtered.txt");
        let merged = ctx.out_dir.join("merged_rpki_irr.txt");

        irr::parse_irr(&inputs.irr_files, &irr_final, ctx.gate)?;
        merge_files(&base, &irr_final, Some(&irr_filtered), &merged)?;
        base = merged;
    }

    if let Some(collectors_file) = &inputs.collectors_file {
        let clean = ctx.out_dir_collectors.join("pfx2asn_clean.txt");
        let filtered = ctx.out_dir_collectors.join("pfx2asn_filtered.txt");
        let merged = ctx.out_dir.join("merged_with_collectors.txt");

        collectors::parse_collectors(collectors_file, &clean, ctx.gate)?;
        merge_files(&base, &clean, Some(&filtered), &merged)?;
        base = merged;
    }

    let sorted = ctx.out_dir.join("merged_sorted.txt");
    let count = sort_map_file(&base, &sorted)?;
    fs::copy(&sorted, &ctx.final_result_file)?;

    info!(
        "map complete: {} entries in {}",
        count,
        ctx.final_result_file.display()
    );
    info!(
        "SHA-256 of the result file: {}",
        sha256_file(&ctx.final_result_file)?
    );
    Ok(ctx.final_result_file.clone())
}

/// Hex SHA-256 of a finished artifact, the run's verification
/// fingerprint: two runs over the same inputs must produce the same
/// digest.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(fs::read(path)?);
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

/// Standalone merge of two existing map files, the `merge` subcommand.
pub fn run_merge(base: &Path, extra: &Path, out: &Path) -> Result<()> {
    merge_files(base, extra, None, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_end_to_end_map_run() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::with_epoch(dir.path(), 0, 1700000000).unwrap();

        let rpki_json = dir.path().join("rpki_raw.json");
        write(
            &rpki_json,
            r#"{"roas": [
                {"asn": "AS100", "prefix": "5.0.0.0/8", "expires": 1800000000},
                {"asn": "AS600", "prefix": "2001:4860::/32", "expires": 1800000000}
            ]}"#,
        );

        let irr_db = dir.path().join("ripe.db");
        write(
            &irr_db,
            "route: 5.1.0.0/16\norigin: AS200\nsource: RIPE\n\n\
             route: 11.0.0.0/8\norigin: AS300\nsource: RIPE\n\n",
        );

        let collectors = dir.path().join("pfx2asn.txt");
        write(&collectors, "11.1.0.0/16 AS400\n12.0.0.0/8 AS500\n");

        let final_path = run_map(
            &ctx,
            &MapInputs {
                rpki_json,
                irr_files: vec![irr_db],
                collectors_file: Some(collectors),
            },
        )
        .unwrap();

        // 5.1.0.0/16 is covered by the RPKI /8; 11.1.0.0/16 is covered by
        // the IRR /8 that entered the base in the first merge stage.
        let result = fs::read_to_string(&final_path).unwrap();
        assert_eq!(
            result,
            "5.0.0.0/8 AS100\n11.0.0.0/8 AS300\n12.0.0.0/8 AS500\n2001:4860::/32 AS600\n"
        );
    }

    #[test]
    fn test_rpki_only_run() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::with_epoch(dir.path(), 0, 1700000001).unwrap();

        let rpki_json = dir.path().join("rpki_raw.json");
        write(
            &rpki_json,
            r#"{"roas": [{"asn": 100, "prefix": "5.0.0.0/8", "expires": 1800000000}]}"#,
        );

        let final_path = run_map(
            &ctx,
            &MapInputs {
                rpki_json,
                irr_files: vec![],
                collectors_file: None,
            },
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&final_path).unwrap(),
            "5.0.0.0/8 AS100\n"
        );
        assert_eq!(
            sha256_file(&final_path).unwrap(),
            "617809a46cf3b2c08edef41a11b0697f08471120f555b5ad4c5a99fa6b6486c8"
        );
    }
}
