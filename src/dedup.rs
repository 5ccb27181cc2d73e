//! Per-source deduplication: reduce one source's candidate stream to a
//! single record per unique prefix with a deterministic tie-break.
//!
//! Registry data routinely carries several records for the same prefix
//! (re-issued ROAs, stale IRR objects). The winner must not depend on
//! input order, so each source defines a strict ordering:
//!
//! - RPKI: later `valid_until`, then later `valid_since`, then lower ASN.
//! - IRR: later `last_modified`, then lower ASN.
//! - Route collectors: no conflicts expected; multi-origin lines are
//!   reduced to a single origin before reaching this module.
//!
//! Bogon and encoding-range gating happens here too, before any record can
//! claim a prefix. Rejection is a filtering decision, never an error.

use std::collections::BTreeMap;

use ipnet::IpNet;
use tracing::debug;

use crate::bogon::{is_bogon_asn, is_bogon_prefix, is_out_of_encoding_range};
use crate::entry::MapEntry;

/// Validity gate applied to every candidate before deduplication.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gate {
    /// Highest ASN the downstream encoder can represent; 0 disables the
    /// check.
    pub max_encode: u32,
}

impl Gate {
    pub fn new(max_encode: u32) -> Gate {
        Gate { max_encode }
    }

    /// Both gates must pass: not a bogon, and within encoding range.
    pub fn rejects(&self, prefix: &IpNet, asn: u32) -> bool {
        is_bogon_prefix(prefix)
            || is_bogon_asn(asn)
            || is_out_of_encoding_range(asn, self.max_encode)
    }
}

/// Observability counters for one source's dedup pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct DedupStats {
    pub accepted: u64,
    pub duplicates: u64,
    pub rejected_invalid: u64,
    pub rejected_incomplete: u64,
}

/// A normalized ROA from the validated RPKI dataset.
#[derive(Debug, Clone, Copy)]
pub struct RoaRecord {
    pub prefix: IpNet,
    pub asn: u32,
    /// Start of the validity window, unix seconds.
    pub valid_since: i64,
    /// End of the validity window, unix seconds.
    pub valid_until: i64,
}

/// A normalized route object from one IRR database file.
#[derive(Debug, Clone)]
pub struct IrrRecord {
    pub prefix: IpNet,
    pub asn: u32,
    /// `last-modified` attribute, unix seconds.
    pub last_modified: i64,
    /// `source:` attribute, the registry that claims authorship.
    pub source: String,
}

/// Dedup cache for the RPKI source.
#[derive(Debug, Default)]
pub struct RpkiDedup {
    gate: Gate,
    cache: BTreeMap<IpNet, RoaRecord>,
    stats: DedupStats,
}

impl RpkiDedup {
    pub fn new(gate: Gate) -> RpkiDedup {
        RpkiDedup {
            gate,
            ..RpkiDedup::default()
        }
    }

    pub fn offer(&mut self, record: RoaRecord) {
        if self.gate.rejects(&record.prefix, record.asn) {
            self.stats.rejected_invalid += 1;
            debug!("rejected ROA {} AS{}", record.prefix, record.asn);
            return;
        }
        match self.cache.get_mut(&record.prefix) {
            None => {
                self.cache.insert(record.prefix, record);
                self.stats.accepted += 1;
            }
            Some(old) => {
                self.stats.duplicates += 1;
                if roa_wins(&record, old) {
                    *old = record;
                }
            }
        }
    }

    pub fn stats(&self) -> DedupStats {
        self.stats
    }

    /// Winning entries, ordered by prefix.
    pub fn into_entries(self) -> Vec<MapEntry> {
        self.cache
            .into_values()
            .map(|r| MapEntry::new(r.prefix, r.asn))
            .collect()
    }
}

/// ROA precedence: longer-lived wins, then later-issued, then lower ASN.
fn roa_wins(new: &RoaRecord, old: &RoaRecord) -> bool {
    (new.valid_until, new.valid_since, old.asn) > (old.valid_until, old.valid_since, new.asn)
}

/// Dedup cache for one registry's IRR data.
#[derive(Debug)]
pub struct IrrDedup {
    gate: Gate,
    /// Registry operator the current file belongs to; records claiming a
    /// different `source:` are mirrored copies and get dropped.
    registry: String,
    cache: BTreeMap<IpNet, IrrRecord>,
    stats: DedupStats,
}

impl IrrDedup {
    pub fn new(gate: Gate, registry: &str) -> IrrDedup {
        IrrDedup {
            gate,
            registry: registry.to_string(),
            cache: BTreeMap::new(),
            stats: DedupStats::default(),
        }
    }

    /// Switch to the next registry file while keeping the cache, since IRR
    /// artifacts accumulate across registries.
    pub fn set_registry(&mut self, registry: &str) {
        self.registry = registry.to_string();
    }

    /// Record a route object that was missing required attributes.
    pub fn reject_incomplete(&mut self) {
        self.stats.rejected_incomplete += 1;
    }

    /// Record a route object whose route or origin attribute would not
    /// parse.
    pub fn reject_invalid(&mut self) {
        self.stats.rejected_invalid += 1;
    }

    pub fn offer(&mut self, record: IrrRecord) {
        if record.source != self.registry {
            // Cross-mirrored entry, owned by some other registry's file
            self.stats.rejected_invalid += 1;
            return;
        }
        if self.gate.rejects(&record.prefix, record.asn) {
            self.stats.rejected_invalid += 1;
            debug!("rejected route object {} AS{}", record.prefix, record.asn);
            return;
        }
        match self.cache.get_mut(&record.prefix) {
            None => {
                self.cache.insert(record.prefix, record);
                self.stats.accepted += 1;
            }
            Some(old) => {
                self.stats.duplicates += 1;
                if irr_wins(&record, old) {
                    *old = record;
                }
            }
        }
    }

    pub fn stats(&self) -> DedupStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn into_entries(self) -> Vec<MapEntry> {
        self.cache
            .into_values()
            .map(|r| MapEntry::new(r.prefix, r.asn))
            .collect()
    }
}

/// IRR precedence: newer `last-modified` wins, then lower ASN.
fn irr_wins(new: &IrrRecord, old: &IrrRecord) -> bool {
    (new.last_modified, old.asn) > (old.last_modified, new.asn)
}
