//! Bogon filtering: membership tests against the IANA special-purpose
//! address registries and the reserved ASN ranges.
//!
//! A positive result is a filtering decision, not an error; nothing here can
//! fail except ASN text normalization, which lives in [`crate::entry`].
//!
//! Sources:
//! - <https://www.iana.org/assignments/iana-ipv4-special-registry/iana-ipv4-special-registry.xhtml>
//! - <https://www.iana.org/assignments/iana-ipv6-special-registry/iana-ipv6-special-registry.xhtml>
//! - <https://www.iana.org/assignments/iana-as-numbers-special-registry/iana-as-numbers-special-registry.xhtml>
//! - <https://bgpfilterguide.nlnog.net/guides/bogon_prefixes/>

use std::sync::LazyLock;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

/// Special-purpose IPv4 ranges. Deprecated registry entries (e.g. the old
/// 6to4 relay anycast 192.88.99.0/24) are left out since they may be
/// reallocated.
const SPECIAL_IPV4: &[&str] = &[
    // "This network", RFC791
    "0.0.0.0/8",
    // "This host on this network", RFC1122
    "0.0.0.0/32",
    // Private-Use, RFC1918
    "10.0.0.0/8",
    // Shared Address Space, RFC6598
    "100.64.0.0/10",
    // Loopback, RFC1122
    "127.0.0.0/8",
    // Link Local, RFC3927
    "169.254.0.0/16",
    // Private-Use, RFC1918
    "172.16.0.0/12",
    // IETF Protocol Assignments, RFC6890
    "192.0.0.0/24",
    // IPv4 Service Continuity Prefix, RFC7335
    "192.0.0.0/29",
    // IPv4 dummy address, RFC7600
    "192.0.0.8/32",
    // Port Control Protocol Anycast, RFC7723
    "192.0.0.9/32",
    // Traversal Using Relays around NAT Anycast, RFC8155
    "192.0.0.10/32",
    // NAT64/DNS64 Discovery, RFC8880, RFC7050
    "192.0.0.170/32",
    "192.0.0.171/32",
    // Documentation (TEST-NET-1), RFC5737
    "192.0.2.0/24",
    // AS112-v4, RFC7535
    "192.31.196.0/24",
    // AMT, RFC7450
    "192.52.193.0/24",
    // Private-Use, RFC1918
    "192.168.0.0/16",
    // Direct Delegation AS112 Service, RFC7534
    "192.175.48.0/24",
    // Benchmarking, RFC2544
    "198.18.0.0/15",
    // Documentation (TEST-NET-2), RFC5737
    "198.51.100.0/24",
    // Documentation (TEST-NET-3), RFC5737
    "203.0.113.0/24",
    // Multicast, RFC1112
    "224.0.0.0/4",
    // Reserved, RFC1112
    "240.0.0.0/4",
    // Limited Broadcast, RFC919
    "255.255.255.255/32",
];

/// Special-purpose IPv6 ranges, same exclusion rule for deprecated entries
/// (old ORCHID, 6bone, site-local).
const SPECIAL_IPV6: &[&str] = &[
    // IPv4-compatible, loopback, unspecified, IPv4-mapped, RFC4291
    "::/8",
    // IPv4-IPv6 Translation, RFC6052
    "64:ff9b::/96",
    // IPv4-IPv6 Translation, RFC8215
    "64:ff9b:1::/48",
    // Discard-Only Address Block, RFC6666
    "100::/64",
    // IETF Protocol Assignments, RFC2928
    "2001::/23",
    // TEREDO, RFC4380
    "2001::/32",
    // Port Control Protocol Anycast, RFC7723
    "2001:1::1/128",
    // Traversal Using Relays around NAT Anycast, RFC8155
    "2001:1::2/128",
    // Benchmarking, RFC5180
    "2001:2::/48",
    // AMT, RFC7450
    "2001:3::/32",
    // AS112-v6, RFC7535
    "2001:4:112::/48",
    // ORCHIDv2, RFC7343
    "2001:20::/28",
    // Drone Remote ID Protocol Entity Tags, RFC9374
    "2001:30::/28",
    // Documentation, RFC3849
    "2001:db8::/32",
    // 6to4, RFC3056
    "2002::/16",
    // Direct Delegation AS112 Service, RFC7534
    "2620:4f:8000::/48",
    // Unique-Local, RFC4193
    "fc00::/7",
    // Link-Local Unicast, RFC4291
    "fe80::/10",
    // Multicast, RFC4291
    "ff00::/8",
];

static SPECIAL_V4_NETS: LazyLock<Vec<Ipv4Net>> = LazyLock::new(|| {
    SPECIAL_IPV4.iter().filter_map(|s| s.parse().ok()).collect()
});

static SPECIAL_V6_NETS: LazyLock<Vec<Ipv6Net>> = LazyLock::new(|| {
    SPECIAL_IPV6.iter().filter_map(|s| s.parse().ok()).collect()
});

/// True iff `prefix` equals or is a subnet of any special-purpose range of
/// its IP version.
pub fn is_bogon_prefix(prefix: &IpNet) -> bool {
    match prefix {
        IpNet::V4(p) => SPECIAL_V4_NETS.iter().any(|range| range.contains(p)),
        IpNet::V6(p) => SPECIAL_V6_NETS.iter().any(|range| range.contains(p)),
    }
}

/// True iff `asn` is reserved and therefore invalid as a public origin.
pub fn is_bogon_asn(asn: u32) -> bool {
    match asn {
        // RFC7607
        0 => true,
        // AS112 project DNS sink, RFC7534
        112 => true,
        // AS_TRANS, RFC6793
        23456 => true,
        // Last 16-bit ASN, RFC7300
        65535 => true,
        // Last 32-bit ASN, RFC7300
        4294967295 => true,
        // Documentation and sample code, RFC5398
        64496..=64511 => true,
        // Private use, RFC6996
        64512..=65534 => true,
        // Documentation and sample code, RFC5398
        65536..=65551 => true,
        // IANA reserved
        65552..=131071 => true,
        // Private use, RFC6996
        4200000000..=4294967294 => true,
        _ => false,
    }
}

/// True iff `asn` cannot be represented by the downstream asmap encoder.
///
/// `max_encode == 0` disables the check. Independent of bogon status; an
/// ASN must pass both gates to enter the map.
pub fn is_out_of_encoding_range(asn: u32, max_encode: u32) -> bool {
    max_encode > 0 && asn > max_encode
}
