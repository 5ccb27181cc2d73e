#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Pfxmap - builds a canonical IP-prefix-to-ASN map for BGP route filtering
//!
//! Pfxmap combines three partially overlapping routing-registry datasets
//! under a fixed precedence order (RPKI over IRR over route-collector
//! announcements) into one non-redundant mapping from prefixes to the ASN
//! authorized to originate them. It can be used as a command-line
//! application or a library.
//!
//! # Architecture
//!
//! - **[`entry`]**: the `<prefix> AS<digits>` line format shared by every
//!   artifact, plus prefix/ASN text normalization
//! - **[`bogon`]**: reserved prefix/ASN tables and membership tests; the
//!   gate in front of every source
//! - **[`dedup`]**: per-source deduplication with deterministic tie-breaks
//! - **[`index`]** / **[`merge`]**: coarse bucketed containment index and
//!   the cross-source merge built on it
//! - **[`trie`]** / **[`coverage`]**: longest-prefix-match trie and the
//!   coverage report over a final map
//! - **[`sort`]**: canonical ordering of the final artifact
//! - **[`sources`]**: normalizers for the RPKI, IRR, and route-collector
//!   input formats
//! - **[`context`]** / **[`pipeline`]**: per-run bookkeeping and the full
//!   map run
//! - **[`config`]**: configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pfxmap::context::Context;
//! use pfxmap::pipeline::{run_map, MapInputs};
//!
//! let ctx = Context::new(Path::new("out"), 33521664)?;
//! let final_map = run_map(&ctx, &MapInputs {
//!     rpki_json: "rpki_raw.json".into(),
//!     irr_files: vec!["ripe.db".into()],
//!     collectors_file: Some("pfx2asn.txt".into()),
//! })?;
//! ```

pub mod bogon;
pub mod config;
pub mod context;
pub mod coverage;
pub mod dedup;
pub mod entry;
pub mod error;
pub mod index;
pub mod merge;
pub mod pipeline;
pub mod sort;
pub mod sources;
pub mod trie;

pub use config::PfxmapConfig;
pub use context::Context;
pub use coverage::{coverage, CoverageReport};
pub use dedup::{DedupStats, Gate};
pub use entry::MapEntry;
pub use error::{PfxmapError, Result};
pub use index::RootNetworkIndex;
pub use merge::{merge_candidates, merge_files, MergeStats};
pub use pipeline::{run_map, run_merge, sha256_file, MapInputs};
pub use sort::{sort_entries, sort_map_file};
pub use trie::PrefixTrie;
