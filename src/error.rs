//! Error types shared across the map-building pipeline.
//!
//! Filtering decisions (bogon prefixes/ASNs, out-of-encoding-range ASNs) are
//! deliberately *not* errors; they are ordinary `bool` results over in the
//! [`crate::bogon`] module. Only malformed text and I/O failures surface here.

use std::io;

pub type Result<T> = std::result::Result<T, PfxmapError>;

#[derive(Debug, thiserror::Error)]
pub enum PfxmapError {
    /// A prefix string that is not canonical CIDR (bad syntax, host bits
    /// set, or leading zeros).
    #[error("invalid prefix {input:?}: {reason}")]
    InvalidPrefix { input: String, reason: String },

    /// An ASN token that cannot be reduced to decimal digits after
    /// stripping an optional `AS`/`as` marker.
    #[error("invalid ASN {input:?}: expected optional 'AS' followed by decimal digits")]
    InvalidAsn { input: String },

    /// A map line that does not match `<prefix> AS<digits>`.
    #[error("invalid map line {line:?}: expected '<prefix> AS<digits>'")]
    InvalidLine { line: String },

    /// An IRR database file whose name carries no known registry marker.
    #[error("cannot infer registry operator from file name {path:?}")]
    UnknownRegistry { path: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to decode RPKI JSON dump: {0}")]
    Json(#[from] serde_json::Error),
}
