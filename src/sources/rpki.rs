//! Normalizer for the validated RPKI dataset.
//!
//! Consumes the JSON dump written by an external validator
//! (rpki-client-style: a `metadata` object plus a flat `roas` array) and
//! produces the deduplicated RPKI artifact. The validator sometimes emits
//! ASNs as `"AS13335"` strings and sometimes as bare numbers; both forms
//! are accepted.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::dedup::{DedupStats, Gate, RoaRecord, RpkiDedup};
use crate::entry::{extract_asn, parse_prefix};
use crate::error::Result;
use crate::sources::write_entries;

#[derive(Debug, Deserialize)]
struct RoaDump {
    #[serde(default)]
    metadata: DumpMetadata,
    roas: Vec<RoaJson>,
}

#[derive(Debug, Default, Deserialize)]
struct DumpMetadata {
    /// ROA count as reported by the validator, informational only.
    #[serde(default)]
    roas: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RoaJson {
    asn: AsnField,
    prefix: String,
    /// End of the validity window, unix seconds.
    expires: i64,
    /// Start of the validity window; older validator versions omit it.
    #[serde(default, alias = "notBefore")]
    not_before: i64,
}

/// The `asn` field appears either as a number or an `AS`-prefixed string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AsnField {
    Number(u32),
    Text(String),
}

/// Parse the validator's JSON dump into the RPKI artifact at `out_file`.
///
/// Records that fail prefix/ASN parsing are dropped with a diagnostic,
/// like bogons; a dump that is not valid JSON is fatal.
pub fn parse_rpki(input: &Path, out_file: &Path, gate: Gate) -> Result<DedupStats> {
    let data = fs::read_to_string(input)?;
    let dump: RoaDump = serde_json::from_str(&data)?;

    if let Some(count) = dump.metadata.roas {
        info!("parsing {count} ROAs");
    }

    let mut dedup = RpkiDedup::new(gate);
    for roa in dump.roas {
        let asn = match &roa.asn {
            AsnField::Number(n) => Ok(*n),
            AsnField::Text(s) => extract_asn(s),
        };
        let (prefix, asn) = match parse_prefix(&roa.prefix).and_then(|p| Ok((p, asn?))) {
            Ok(pair) => pair,
            Err(e) => {
                warn!("dropping ROA: {e}");
                continue;
            }
        };
        dedup.offer(RoaRecord {
            prefix,
            asn,
            valid_since: roa.not_before,
            valid_until: roa.expires,
        });
    }

    let stats = dedup.stats();
    let entries = dedup.into_entries();
    write_entries(out_file, &entries)?;

    info!(
        "RPKI: {} entries written, {} duplicates resolved, {} rejected",
        entries.len(),
        stats.duplicates,
        stats.rejected_invalid
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(json: &str) -> (String, DedupStats) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rpki_raw.json");
        let output = dir.path().join("rpki_final.txt");
        fs::write(&input, json).unwrap();
        let stats = parse_rpki(&input, &output, Gate::default()).unwrap();
        (fs::read_to_string(&output).unwrap(), stats)
    }

    #[test]
    fn test_parse_basic_dump() {
        let (out, stats) = run(
            r#"{
                "metadata": {"roas": 2},
                "roas": [
                    {"asn": "AS13335", "prefix": "1.1.1.0/24", "expires": 1700000000},
                    {"asn": 15169, "prefix": "8.8.8.0/24", "expires": 1700000000}
                ]
            }"#,
        );
        assert_eq!(stats.accepted, 2);
        assert_eq!(out, "1.1.1.0/24 AS13335\n8.8.8.0/24 AS15169\n");
    }

    #[test]
    fn test_duplicate_resolved_by_longer_validity() {
        let (out, stats) = run(
            r#"{
                "roas": [
                    {"asn": "AS100", "prefix": "1.1.1.0/24", "expires": 100},
                    {"asn": "AS200", "prefix": "1.1.1.0/24", "expires": 200}
                ]
            }"#,
        );
        assert_eq!(stats.duplicates, 1);
        assert_eq!(out, "1.1.1.0/24 AS200\n");
    }

    #[test]
    fn test_bogons_and_malformed_dropped() {
        let (out, stats) = run(
            r#"{
                "roas": [
                    {"asn": "AS100", "prefix": "192.168.0.0/16", "expires": 100},
                    {"asn": "ASxyz", "prefix": "1.1.1.0/24", "expires": 100},
                    {"asn": "AS200", "prefix": "2.2.2.0/24", "expires": 100}
                ]
            }"#,
        );
        assert_eq!(stats.rejected_invalid, 1);
        assert_eq!(out, "2.2.2.0/24 AS200\n");
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rpki_raw.json");
        fs::write(&input, "not json").unwrap();
        assert!(parse_rpki(&input, &dir.path().join("out.txt"), Gate::default()).is_err());
    }
}
