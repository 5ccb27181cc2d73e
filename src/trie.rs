//! Binary trie over IP prefixes with longest-prefix-match lookup.
//!
//! Two independent roots, one per IP version, so a v4 walk can never touch
//! v6 state. Nodes own their children outright; there is no sharing, so the
//! whole structure drops with the trie at the end of a run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;

use ipnet::IpNet;

use crate::entry::MapEntry;
use crate::error::Result;

#[derive(Debug, Default)]
struct TrieNode {
    children: [Option<Box<TrieNode>>; 2],
    asn: Option<u32>,
}

/// A prefix-to-ASN trie keyed by address bits, most significant first.
#[derive(Debug, Default)]
pub struct PrefixTrie {
    v4_root: TrieNode,
    v6_root: TrieNode,
}

impl PrefixTrie {
    pub fn new() -> PrefixTrie {
        PrefixTrie::default()
    }

    /// Insert a network, overwriting any ASN previously stored at exactly
    /// this prefix (last write wins).
    pub fn insert(&mut self, network: IpNet, asn: u32) {
        // Left-align v4 bits so both versions walk from bit 127 down.
        let (root, addr) = match network {
            IpNet::V4(n) => (&mut self.v4_root, (u32::from(n.network()) as u128) << 96),
            IpNet::V6(n) => (&mut self.v6_root, u128::from(n.network())),
        };

        let mut node = root;
        for i in 0..network.prefix_len() {
            let bit = ((addr >> (127 - i)) & 1) as usize;
            node = node.children[bit].get_or_insert_with(Box::default).as_mut();
        }
        node.asn = Some(asn);
    }

    /// Longest-prefix-match lookup: returns the ASN of the deepest visited
    /// node that carries one, the root included. Walking may descend past
    /// the final match into payload-free interior nodes; those do not
    /// affect the result.
    pub fn lookup(&self, ip: IpAddr) -> Option<u32> {
        let (root, addr, max_bits) = match ip {
            IpAddr::V4(a) => (&self.v4_root, (u32::from(a) as u128) << 96, 32),
            IpAddr::V6(a) => (&self.v6_root, u128::from(a), 128),
        };

        let mut best = None;
        let mut node = root;
        for i in 0..max_bits {
            if node.asn.is_some() {
                best = node.asn;
            }
            let bit = ((addr >> (127 - i)) & 1) as usize;
            match &node.children[bit] {
                Some(child) => node = child.as_ref(),
                None => break,
            }
        }
        if node.asn.is_some() {
            best = node.asn;
        }
        best
    }

    /// Load `<prefix> AS<digits>` lines, one entry per line, blank lines
    /// ignored.
    ///
    /// Fail-fast: any malformed line aborts the load and the trie keeps no
    /// partial state from it. A wrong entry in a final map would become a
    /// routing-filter decision, so this path never skips.
    pub fn bulk_load<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Parse everything before touching the trie so an error partway
        // through leaves it unchanged.
        let mut entries = Vec::new();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            entries.push(MapEntry::from_line(line)?);
        }
        for entry in entries {
            self.insert(entry.prefix, entry.asn);
        }
        Ok(())
    }

    /// Build a trie from a map file on disk.
    pub fn from_map_file(path: &Path) -> Result<PrefixTrie> {
        let reader = BufReader::new(File::open(path)?);
        let mut trie = PrefixTrie::new();
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        trie.bulk_load(&lines)?;
        Ok(trie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    #[test]
    fn test_longest_prefix_match() {
        let mut trie = PrefixTrie::new();
        trie.insert(net("10.0.0.0/8"), 100);
        trie.insert(net("10.1.0.0/16"), 200);
        trie.insert(net("10.1.2.0/24"), 300);

        assert_eq!(trie.lookup(ip("10.1.2.3")), Some(300));
        assert_eq!(trie.lookup(ip("10.1.9.9")), Some(200));
        assert_eq!(trie.lookup(ip("10.9.9.9")), Some(100));
        assert_eq!(trie.lookup(ip("11.0.0.1")), None);
    }

    #[test]
    fn test_match_is_deepest_visited_payload() {
        // 10.0.0.0/8 has a payload; 10.1.0.0/16 exists only as interior
        // structure for 10.1.2.0/24. An address under /16 but not /24 must
        // fall back to the /8.
        let mut trie = PrefixTrie::new();
        trie.insert(net("10.0.0.0/8"), 100);
        trie.insert(net("10.1.2.0/24"), 300);

        assert_eq!(trie.lookup(ip("10.1.3.1")), Some(100));
    }

    #[test]
    fn test_insert_overwrite_same_prefix() {
        let mut trie = PrefixTrie::new();
        trie.insert(net("10.0.0.0/8"), 100);
        trie.insert(net("10.0.0.0/8"), 200);

        assert_eq!(trie.lookup(ip("10.1.1.1")), Some(200));
    }

    #[test]
    fn test_zero_length_prefix_matches_everything() {
        let mut trie = PrefixTrie::new();
        trie.insert(net("0.0.0.0/0"), 42);

        assert_eq!(trie.lookup(ip("203.0.113.7")), Some(42));
        // The v6 default route is a separate root
        assert_eq!(trie.lookup(ip("2001:db8::1")), None);
    }

    #[test]
    fn test_ipv4_does_not_affect_ipv6() {
        let mut trie = PrefixTrie::new();
        trie.insert(net("10.0.0.0/8"), 100);
        trie.insert(net("2001:db8::/32"), 600);

        assert_eq!(trie.lookup(ip("10.0.0.1")), Some(100));
        assert_eq!(trie.lookup(ip("2001:db8::1")), Some(600));
        // An IPv6 address sharing leading bits with a v4 prefix never
        // crosses roots
        assert_eq!(trie.lookup(ip("a00::1")), None);
    }

    #[test]
    fn test_full_length_host_routes() {
        let mut trie = PrefixTrie::new();
        trie.insert(net("192.0.2.1/32"), 7);
        trie.insert(net("2001:db8::1/128"), 8);

        assert_eq!(trie.lookup(ip("192.0.2.1")), Some(7));
        assert_eq!(trie.lookup(ip("192.0.2.2")), None);
        assert_eq!(trie.lookup(ip("2001:db8::1")), Some(8));
        assert_eq!(trie.lookup(ip("2001:db8::2")), None);
    }

    #[test]
    fn test_bulk_load() {
        let mut trie = PrefixTrie::new();
        trie.bulk_load(["10.0.0.0/8 AS100", "", "2001:db8::/32 AS600"])
            .unwrap();

        assert_eq!(trie.lookup(ip("10.1.1.1")), Some(100));
        assert_eq!(trie.lookup(ip("2001:db8::1")), Some(600));
    }

    #[test]
    fn test_bulk_load_is_fail_fast_with_no_partial_state() {
        let mut trie = PrefixTrie::new();
        let result = trie.bulk_load(["10.0.0.0/8 AS100", "garbage line"]);
        assert!(result.is_err());
        // The valid line before the bad one must not have been inserted
        assert_eq!(trie.lookup(ip("10.1.1.1")), None);
    }
}
