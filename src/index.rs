//! Coarse bucketed index over a base map for subnet-containment queries.
//!
//! Buckets are keyed by the "root network" of a prefix: the leading octet
//! for IPv4, the leading 16-bit group for IPv6. Keys are version-namespaced
//! by living in separate maps, so `0x2001` the hextet and any v4 octet can
//! never collide. A containment query touches only the candidate's bucket,
//! which brings the average cost down from O(base size) to O(bucket size);
//! base and candidate sets can each run to hundreds of thousands of
//! entries, so the partition is what keeps the merge tractable. Within a
//! bucket the scan is linear.

use std::collections::HashMap;

use ipnet::IpNet;

use crate::entry::prefix_ints;

/// `(network, netmask)` integer pairs from a base map, bucketed by root
/// network.
#[derive(Debug, Default)]
pub struct RootNetworkIndex {
    v4: HashMap<u8, Vec<(u128, u128)>>,
    v6: HashMap<u16, Vec<(u128, u128)>>,
}

impl RootNetworkIndex {
    pub fn new() -> RootNetworkIndex {
        RootNetworkIndex::default()
    }

    /// Append a base prefix to its bucket.
    pub fn update(&mut self, prefix: &IpNet) {
        let pair = prefix_ints(prefix);
        match prefix {
            IpNet::V4(n) => {
                self.v4.entry(n.network().octets()[0]).or_default().push(pair);
            }
            IpNet::V6(n) => {
                self.v6.entry(n.network().segments()[0]).or_default().push(pair);
            }
        }
    }

    /// True iff `candidate` equals or is a subnet of some indexed base
    /// prefix, by the mask test `candidate_network & base_mask ==
    /// base_network` over the candidate's bucket only.
    ///
    /// O(bucket size) per query. A base prefix shorter than the bucket key
    /// (v4 shorter than /8, v6 shorter than /16) spans several root
    /// networks but is indexed under its own leading group only; routing
    /// registries do not publish such prefixes, so the coarse key stays
    /// sound in practice.
    pub fn contains(&self, candidate: &IpNet) -> bool {
        let (cand_net, _) = prefix_ints(candidate);
        let bucket = match candidate {
            IpNet::V4(n) => self.v4.get(&n.network().octets()[0]),
            IpNet::V6(n) => self.v6.get(&n.network().segments()[0]),
        };
        match bucket {
            None => false,
            Some(pairs) => pairs
                .iter()
                .any(|&(base_net, base_mask)| cand_net & base_mask == base_net),
        }
    }
}
