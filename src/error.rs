//! Error taxonomy for the subpacket codec.
//!
//! Every failure is terminal for the current subpacket and returns to the
//! caller immediately; retry/resync policy belongs to the enclosing capture
//! loop, not to this crate.

use crate::referent::Referent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The input ended before the field could be read.
    #[error("stream exhausted while reading {reading}")]
    StreamExhausted { reading: &'static str },

    /// A varint kept its continuation bit set past the 32-bit range.
    #[error("varint exceeds 32-bit range")]
    VarintOverflow,

    /// The leading referent was the explicit null token where a live
    /// instance is required.
    #[error("referent is null in property ack")]
    InvalidReference,

    /// A compact referent token named a cache slot that was never
    /// registered on this session.
    #[error("referent token names unregistered cache slot {slot}")]
    UnknownReferentSlot { slot: u8 },

    /// The referent decoded fine but no live instance is known for it
    /// (never announced, or already removed).
    #[error("no instance known for referent {referent}")]
    InstanceLookupFailure { referent: Referent },

    /// The property index failed the schema-table bound check.
    #[error("property index {index} out of range for schema table of {len}")]
    SchemaIndexOutOfRange { index: u16, len: usize },

    /// Encode-side: the version list does not fit the one-byte count.
    #[error("version list has {count} entries, limit is 255")]
    VersionCountOverflow { count: usize },
}
