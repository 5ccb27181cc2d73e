//! Normalizer for IRR database dumps.
//!
//! IRR files are RPSL: blank-line separated objects of `key: value`
//! attributes, encoded in ISO-8859-1. A usable route object needs `route`
//! or `route6`, an `origin`, and a `source`. Registries mirror each
//! other's databases, so an object whose `source:` names a different
//! registry than the file it came from is a mirrored copy and is dropped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::dedup::{DedupStats, Gate, IrrDedup, IrrRecord};
use crate::entry::{extract_asn, parse_prefix};
use crate::error::{PfxmapError, Result};
use crate::sources::write_entries;

/// Fallback `last-modified` for registries that no longer publish the
/// attribute (AFRINIC, LACNIC): 2009-01-03T19:15:05Z. Fixed so the dedup
/// tie-break stays deterministic across runs.
const DEFAULT_LAST_MODIFIED: i64 = 1231010105;

/// Infer the registry operator from an IRR file's name.
pub fn registry_from_path(path: &Path) -> Result<&'static str> {
    let name = path.to_string_lossy().to_lowercase();
    for registry in ["arin", "ripe", "lacnic", "afrinic", "apnic"] {
        if name.contains(registry) {
            return Ok(match registry {
                "arin" => "ARIN",
                "ripe" => "RIPE",
                "lacnic" => "LACNIC",
                "afrinic" => "AFRINIC",
                _ => "APNIC",
            });
        }
    }
    Err(PfxmapError::UnknownRegistry {
        path: path.to_string_lossy().to_string(),
    })
}

/// Parse a set of IRR database files into the IRR artifact at `out_file`.
pub fn parse_irr(files: &[PathBuf], out_file: &Path, gate: Gate) -> Result<DedupStats> {
    let mut dedup = IrrDedup::new(gate, "");

    for file in files {
        let registry = registry_from_path(file)?;
        dedup.set_registry(registry);
        let before = dedup.len();

        let text = read_latin1(file)?;
        for object in rpsl_objects(&text) {
            offer_object(&mut dedup, &object);
        }
        info!(
            "parsed {}, found {} new entries",
            file.display(),
            dedup.len() - before
        );
    }

    let stats = dedup.stats();
    let entries = dedup.into_entries();
    write_entries(out_file, &entries)?;

    info!(
        "IRR: {} entries written, {} duplicates resolved, {} rejected, {} incomplete",
        entries.len(),
        stats.duplicates,
        stats.rejected_invalid,
        stats.rejected_incomplete
    );
    Ok(stats)
}

/// IRR dumps are ISO-8859-1; every byte maps directly to the same code
/// point.
fn read_latin1(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Split RPSL text into attribute maps, one per blank-line separated
/// object. Lines without a `:` (continuations, comments) are ignored.
fn rpsl_objects(text: &str) -> Vec<HashMap<String, String>> {
    let mut objects = Vec::new();
    let mut current = HashMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                objects.push(std::mem::take(&mut current));
            }
        } else if let Some((key, value)) = line.split_once(':') {
            current.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    if !current.is_empty() {
        objects.push(current);
    }
    objects
}

fn offer_object(dedup: &mut IrrDedup, object: &HashMap<String, String>) {
    let route = match object.get("route").or_else(|| object.get("route6")) {
        Some(r) => r,
        None => return,
    };
    let (origin, source) = match (object.get("origin"), object.get("source")) {
        (Some(o), Some(s)) => (o, s),
        _ => {
            dedup.reject_incomplete();
            return;
        }
    };

    let prefix = match parse_prefix(route) {
        Ok(p) => p,
        Err(e) => {
            debug!("could not parse route attribute: {e}");
            dedup.reject_invalid();
            return;
        }
    };
    // Origins sometimes carry trailing comments
    let origin = origin.split(" #").next().unwrap_or(origin).to_uppercase();
    let asn = match extract_asn(&origin) {
        Ok(a) => a,
        Err(e) => {
            warn!("could not parse origin attribute: {e}");
            dedup.reject_invalid();
            return;
        }
    };

    let last_modified = object
        .get("last-modified")
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ").ok())
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(DEFAULT_LAST_MODIFIED);

    dedup.offer(IrrRecord {
        prefix,
        asn,
        last_modified,
        source: source.to_uppercase(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_db(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn run(name: &str, contents: &str) -> (String, DedupStats) {
        let dir = tempfile::tempdir().unwrap();
        let db = write_db(dir.path(), name, contents);
        let out = dir.path().join("irr_final.txt");
        let stats = parse_irr(&[db], &out, Gate::default()).unwrap();
        (fs::read_to_string(&out).unwrap(), stats)
    }

    #[test]
    fn test_basic_route_object() {
        let (out, stats) = run(
            "ripe.db",
            "route: 5.5.0.0/16\norigin: AS5000\nsource: RIPE\nlast-modified: 2021-06-01T10:00:00Z\n\n",
        );
        assert_eq!(stats.accepted, 1);
        assert_eq!(out, "5.5.0.0/16 AS5000\n");
    }

    #[test]
    fn test_route6_objects() {
        let (out, _) = run(
            "apnic.db.route6",
            "route6: 2401:3c00::/32\norigin: AS9498\nsource: APNIC\n\n",
        );
        assert_eq!(out, "2401:3c00::/32 AS9498\n");
    }

    #[test]
    fn test_mirrored_entries_excluded() {
        let (out, stats) = run(
            "apnic.db",
            "route: 5.5.0.0/16\norigin: AS5000\nsource: RIPE\n\n\
             route: 6.6.0.0/16\norigin: AS6000\nsource: APNIC\n\n",
        );
        assert_eq!(stats.rejected_invalid, 1);
        assert_eq!(out, "6.6.0.0/16 AS6000\n");
    }

    #[test]
    fn test_newer_last_modified_wins() {
        let (out, stats) = run(
            "ripe.db",
            "route: 5.5.0.0/16\norigin: AS1\nsource: RIPE\nlast-modified: 2020-01-01T00:00:00Z\n\n\
             route: 5.5.0.0/16\norigin: AS2\nsource: RIPE\nlast-modified: 2022-01-01T00:00:00Z\n\n",
        );
        assert_eq!(stats.duplicates, 1);
        assert_eq!(out, "5.5.0.0/16 AS2\n");
    }

    #[test]
    fn test_missing_last_modified_uses_fallback() {
        // The object without the attribute loses to any dated object
        let (out, _) = run(
            "lacnic.db",
            "route: 5.5.0.0/16\norigin: AS1\nsource: LACNIC\n\n\
             route: 5.5.0.0/16\norigin: AS2\nsource: LACNIC\nlast-modified: 2022-01-01T00:00:00Z\n\n",
        );
        assert_eq!(out, "5.5.0.0/16 AS2\n");
    }

    #[test]
    fn test_origin_comment_stripped() {
        let (out, _) = run(
            "ripe.db",
            "route: 5.5.0.0/16\norigin: AS5000 # legacy object\nsource: RIPE\n\n",
        );
        assert_eq!(out, "5.5.0.0/16 AS5000\n");
    }

    #[test]
    fn test_incomplete_objects_counted() {
        let (_, stats) = run(
            "ripe.db",
            "route: 5.5.0.0/16\nsource: RIPE\n\nroute: 6.6.0.0/16\norigin: AS6\nsource: RIPE\n\n",
        );
        assert_eq!(stats.rejected_incomplete, 1);
        assert_eq!(stats.accepted, 1);
    }

    #[test]
    fn test_unknown_registry_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let db = write_db(dir.path(), "mystery.db", "route: 5.5.0.0/16\n");
        let result = parse_irr(&[db], &dir.path().join("out.txt"), Gate::default());
        assert!(result.is_err());
    }
}
