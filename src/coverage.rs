//! Coverage reporting: which of a list of addresses the final map covers,
//! and under which origin ASN.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::IpAddr;
use std::path::Path;

use tabled::Tabled;
use tracing::info;

use crate::error::{PfxmapError, Result};
use crate::trie::PrefixTrie;

/// Outcome of one coverage check.
#[derive(Debug)]
pub struct CoverageReport {
    /// Addresses found in the map, with their origin ASN.
    pub covered: Vec<(IpAddr, u32)>,
    /// Addresses with no covering prefix.
    pub uncovered: Vec<IpAddr>,
}

/// Row shape for the CLI summary table.
#[derive(Tabled)]
pub struct CoverageSummary {
    pub covered: usize,
    pub total: usize,
    pub percentage: String,
}

impl CoverageReport {
    pub fn total(&self) -> usize {
        self.covered.len() + self.uncovered.len()
    }

    pub fn percentage(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.covered.len() as f64 / self.total() as f64 * 100.0
    }

    pub fn summary(&self) -> CoverageSummary {
        CoverageSummary {
            covered: self.covered.len(),
            total: self.total(),
            percentage: format!("{:.2}%", self.percentage()),
        }
    }

    /// Write `<address> AS<asn>` lines for the covered addresses.
    pub fn write_covered(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for (addr, asn) in &self.covered {
            writeln!(writer, "{addr} AS{asn}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write one address per line for the uncovered addresses.
    pub fn write_uncovered(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for addr in &self.uncovered {
            writeln!(writer, "{addr}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Check every address in `ip_list_file` against the map in `map_file`.
///
/// Fail-fast on both inputs: a map line or address that does not parse
/// aborts the whole check naming the offending line. Addresses are host
/// routes, implicitly /32 or /128.
pub fn coverage(map_file: &Path, ip_list_file: &Path) -> Result<CoverageReport> {
    let trie = PrefixTrie::from_map_file(map_file)?;

    let reader = BufReader::new(File::open(ip_list_file)?);
    let mut addrs: Vec<IpAddr> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let addr = trimmed
            .parse::<IpAddr>()
            .map_err(|e| PfxmapError::InvalidPrefix {
                input: trimmed.to_string(),
                reason: e.to_string(),
            })?;
        addrs.push(addr);
    }

    let mut report = CoverageReport {
        covered: Vec::new(),
        uncovered: Vec::new(),
    };
    for addr in addrs {
        match trie.lookup(addr) {
            Some(asn) => report.covered.push((addr, asn)),
            None => report.uncovered.push(addr),
        }
    }

    info!(
        "{} of {} addresses covered by the map ({:.2}%)",
        report.covered.len(),
        report.total(),
        report.percentage()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_coverage_report() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("map.txt");
        let ips = dir.path().join("ips.txt");
        fs::write(&map, "10.0.0.0/8 AS100\n2001:db8::/32 AS600\n").unwrap();
        fs::write(&ips, "10.1.2.3\n11.0.0.1\n2001:db8::1\n").unwrap();

        let report = coverage(&map, &ips).unwrap();
        assert_eq!(
            report.covered,
            vec![
                ("10.1.2.3".parse().unwrap(), 100),
                ("2001:db8::1".parse().unwrap(), 600)
            ]
        );
        assert_eq!(report.uncovered, vec!["11.0.0.1".parse::<IpAddr>().unwrap()]);
        assert!((report.percentage() - 66.66).abs() < 0.1);
    }

    #[test]
    fn test_invalid_address_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("map.txt");
        let ips = dir.path().join("ips.txt");
        fs::write(&map, "10.0.0.0/8 AS100\n").unwrap();
        fs::write(&ips, "10.0.0.1\nnot-an-ip\n").unwrap();

        let err = coverage(&map, &ips).unwrap_err();
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn test_invalid_map_line_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("map.txt");
        let ips = dir.path().join("ips.txt");
        fs::write(&map, "10.0.0.0/8 ASxyz\n").unwrap();
        fs::write(&ips, "10.0.0.1\n").unwrap();

        assert!(coverage(&map, &ips).is_err());
    }

    #[test]
    fn test_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("map.txt");
        let ips = dir.path().join("ips.txt");
        fs::write(&map, "10.0.0.0/8 AS100\n").unwrap();
        fs::write(&ips, "10.0.0.1\n192.0.2.9\n").unwrap();

        let report = coverage(&map, &ips).unwrap();
        let covered = dir.path().join("covered.txt");
        let uncovered = dir.path().join("uncovered.txt");
        report.write_covered(&covered).unwrap();
        report.write_uncovered(&uncovered).unwrap();

        assert_eq!(fs::read_to_string(&covered).unwrap(), "10.0.0.1 AS100\n");
        assert_eq!(fs::read_to_string(&uncovered).unwrap(), "192.0.2.9\n");
    }
}
