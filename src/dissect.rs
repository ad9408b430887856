//! Dissect a buffer of back-to-back acknowledgment subpackets.
//!
//! A failed subpacket ends the buffer: varint payloads give no resync point,
//! so skipping forward is left to the enclosing capture loop, which carries
//! on with the next packet. Subpacket-level failure isolation is the point;
//! one bad subpacket never aborts the session.

use crate::ack::{PartialAck, PropertyAck};
use crate::context::SessionContext;
use crate::stream::StreamReader;

/// A successfully decoded subpacket with its byte range in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DissectedAck {
    pub ack: PropertyAck,
    pub byte_range: (usize, usize),
}

/// A rejected subpacket: where it sat, why it failed, and what little of it
/// decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAck {
    pub byte_range: (usize, usize),
    pub reason: String,
    pub partial: PartialAck,
}

/// Result of dissecting one buffer.
#[derive(Debug, Clone, Default)]
pub struct DissectReport {
    pub decoded: Vec<DissectedAck>,
    pub failed: Vec<FailedAck>,
}

impl DissectReport {
    /// True when every byte of the buffer decoded into subpackets.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Decode consecutive subpackets from `bytes` until the buffer is exhausted
/// or a subpacket fails.
pub fn dissect_stream(ctx: &mut SessionContext, bytes: &[u8]) -> DissectReport {
    let mut reader = StreamReader::new(bytes);
    let mut report = DissectReport::default();

    while reader.remaining() > 0 {
        let start = reader.position();
        match PropertyAck::decode(ctx, &mut reader) {
            Ok(ack) => {
                report.decoded.push(DissectedAck { ack, byte_range: (start, reader.position()) });
            }
            Err(failure) => {
                report.failed.push(FailedAck {
                    byte_range: (start, reader.position()),
                    reason: failure.error.to_string(),
                    partial: failure.partial,
                });
                break;
            }
        }
    }

    report
}
