//! The `<prefix> AS<digits>` line format used by every artifact in the
//! pipeline, plus prefix/ASN text normalization helpers.

use std::fmt;
use std::str::FromStr;

use ipnet::IpNet;

use crate::error::{PfxmapError, Result};

/// One surviving `(prefix, origin ASN)` pair.
///
/// Entries in a single artifact never share a prefix; that is enforced
/// upstream by per-source deduplication and the merge containment check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub prefix: IpNet,
    pub asn: u32,
}

impl MapEntry {
    pub fn new(prefix: IpNet, asn: u32) -> MapEntry {
        MapEntry { prefix, asn }
    }

    /// Parse a `<prefix> AS<digits>` line, exactly one space between the
    /// two fields.
    pub fn from_line(line: &str) -> Result<MapEntry> {
        let (prefix_str, asn_str) = line
            .split_once(' ')
            .ok_or_else(|| PfxmapError::InvalidLine {
                line: line.to_string(),
            })?;
        if asn_str.contains(' ') {
            return Err(PfxmapError::InvalidLine {
                line: line.to_string(),
            });
        }
        let prefix = parse_prefix(prefix_str)?;
        let asn = extract_asn(asn_str)?;
        Ok(MapEntry { prefix, asn })
    }
}

impl fmt::Display for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS{}", self.prefix, self.asn)
    }
}

/// Parse a prefix in canonical CIDR notation.
///
/// Host bits must be zero: `10.0.0.1/8` is rejected rather than truncated,
/// since a truncating parser would silently alter what a source asserted.
pub fn parse_prefix(s: &str) -> Result<IpNet> {
    let net = IpNet::from_str(s).map_err(|e| PfxmapError::InvalidPrefix {
        input: s.to_string(),
        reason: e.to_string(),
    })?;
    if net.addr() != net.network() {
        return Err(PfxmapError::InvalidPrefix {
            input: s.to_string(),
            reason: "host bits set".to_string(),
        });
    }
    Ok(net)
}

/// Normalize an ASN token to its numeric value.
///
/// Accepts a plain decimal number or an `AS`/`as`-prefixed one, with
/// surrounding whitespace tolerated.
pub fn extract_asn(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    let digits = match trimmed.get(..2) {
        Some(p) if p.eq_ignore_ascii_case("as") => &trimmed[2..],
        _ => trimmed,
    };
    digits
        .trim()
        .parse::<u32>()
        .map_err(|_| PfxmapError::InvalidAsn {
            input: s.to_string(),
        })
}

/// Network address and netmask of a prefix as fixed-width integers.
///
/// IPv4 values are widened to `u128` so both versions share one shape; the
/// containment test `net & mask == base` is width-agnostic.
pub fn prefix_ints(net: &IpNet) -> (u128, u128) {
    match net {
        IpNet::V4(n) => (
            u32::from(n.network()) as u128,
            u32::from(n.netmask()) as u128,
        ),
        IpNet::V6(n) => (u128::from(n.network()), u128::from(n.netmask())),
    }
}
