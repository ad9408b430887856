//! # replack: property-replication acknowledgment codec
//!
//! Binary codec and capture dissector for the acknowledgment subpacket of a
//! property-replication protocol: the message a peer sends to confirm it
//! received specific version numbers for a property change on a replicated
//! object.
//!
//! ## Wire layout
//!
//! Big-endian, per subpacket:
//!
//! ```text
//! [Referent]               cache-compressed object reference (1 token byte,
//!                          +4 bytes the first time an object is mentioned)
//! [PropertyIndex]          u16 index into the session's schema table
//! [VersionCount]           u8
//! [VersionCount x Version] varint(u32), 7 payload bits per byte + continuation
//! ```
//!
//! ## Pieces
//!
//! - **Stream**: byte/u16/varint primitives over in-memory buffers
//! - **Referent**: compact tokens expanded through a per-session cache
//! - **Schema**: ordered property table, index-validated lookups
//! - **Ack**: the subpacket codec ([`PropertyAck::decode`] /
//!   [`PropertyAck::serialize`]) with partial-value diagnostics on failure
//! - **Dissect**: buffer-level decoding with per-subpacket failure isolation
//! - **Manifest**: file-loaded session state for capture runs
//!
//! All shared state lives in a [`SessionContext`] passed into every call;
//! sessions are fully isolated from one another.
//!
//! ## Usage
//!
//! See `tests/integration.rs` for end-to-end examples, and the
//! `dissect_pcap` binary for dissecting captures:
//! `cargo run --bin dissect_pcap -- capture.pcap session.manifest --dump`.

pub mod ack;
pub mod context;
pub mod dissect;
pub mod error;
pub mod instance;
pub mod manifest;
pub mod referent;
pub mod schema;
pub mod stream;

pub use ack::{DecodeFailure, PartialAck, PropertyAck};
pub use context::SessionContext;
pub use dissect::{dissect_stream, DissectReport, DissectedAck, FailedAck};
pub use error::CodecError;
pub use instance::{Instance, InstanceTable};
pub use manifest::{parse_manifest, ManifestError};
pub use referent::{
    read_referent, write_null_referent, write_referent, Referent, ReferentCache,
};
pub use schema::{IndexBound, PropertySchema, SchemaTable};
pub use stream::{StreamReader, StreamWriter};
