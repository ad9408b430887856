//! Property-acknowledgment subpacket codec.
//!
//! Wire layout, big-endian:
//!
//! ```text
//! [Referent]               1 token byte, +4 bytes when literal
//! [PropertyIndex]          u16
//! [VersionCount]           u8
//! [VersionCount x Version] varint(u32)
//! ```
//!
//! Each subpacket decodes and encodes independently; sequencing across
//! subpackets belongs to the outer container.

use crate::context::SessionContext;
use crate::error::CodecError;
use crate::referent::{read_referent, write_referent, Referent};
use crate::schema::PropertySchema;
use crate::stream::{StreamReader, StreamWriter};

/// Acknowledgment of received version numbers for one property change on
/// one replicated object.
///
/// `instance` is a lookup handle into the session's instance table, never an
/// owning pointer; instance lifetime is governed by the external datamodel.
/// `property` is the resolved descriptor, so the display name is populated
/// for summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAck {
    pub instance: Referent,
    pub property: PropertySchema,
    /// Acknowledged versions, wire order preserved.
    pub versions: Vec<u32>,
}

/// Diagnostic partial value from a failed decode: fields populated up to the
/// failure point. Inspection is opt-in for tooling; most callers only look
/// at [`DecodeFailure::error`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialAck {
    pub instance: Option<Referent>,
    pub property: Option<PropertySchema>,
    pub versions: Vec<u32>,
}

/// Decode error carrying the partial value built before the failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct DecodeFailure {
    pub error: CodecError,
    pub partial: PartialAck,
}

impl DecodeFailure {
    fn new(error: CodecError, partial: PartialAck) -> Self {
        DecodeFailure { error, partial }
    }
}

impl PropertyAck {
    /// The one-byte count field caps the version list.
    pub const MAX_VERSIONS: usize = 255;

    /// Decode one subpacket from `r` under `ctx`.
    ///
    /// Fails with `InvalidReference` on the null referent, with
    /// `InstanceLookupFailure` when the referent resolves to no live
    /// instance, with `SchemaIndexOutOfRange` per the session's bound
    /// policy, and with `StreamExhausted`/`VarintOverflow` on malformed
    /// bytes. Any failure aborts immediately; the [`DecodeFailure`] carries
    /// whatever was decoded before it.
    pub fn decode(
        ctx: &mut SessionContext,
        r: &mut StreamReader<'_>,
    ) -> Result<PropertyAck, DecodeFailure> {
        let referent = match read_referent(r, &mut ctx.inbound_cache) {
            Ok(Some(referent)) => referent,
            Ok(None) => {
                return Err(DecodeFailure::new(
                    CodecError::InvalidReference,
                    PartialAck::default(),
                ))
            }
            Err(error) => return Err(DecodeFailure::new(error, PartialAck::default())),
        };
        let at_instance = || PartialAck { instance: Some(referent), ..PartialAck::default() };
        if !ctx.instances.contains(referent) {
            return Err(DecodeFailure::new(
                CodecError::InstanceLookupFailure { referent },
                at_instance(),
            ));
        }

        let index = match r.read_u16_be("property index") {
            Ok(index) => index,
            Err(error) => return Err(DecodeFailure::new(error, at_instance())),
        };
        let property = match ctx.schema.resolve(index, ctx.index_bound) {
            Ok(property) => property.clone(),
            Err(error) => return Err(DecodeFailure::new(error, at_instance())),
        };

        let count = match r.read_u8("version count") {
            Ok(count) => count,
            Err(error) => {
                return Err(DecodeFailure::new(
                    error,
                    PartialAck {
                        instance: Some(referent),
                        property: Some(property),
                        versions: Vec::new(),
                    },
                ))
            }
        };
        let mut versions = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            match r.read_uvarint32("version") {
                Ok(version) => versions.push(version),
                Err(error) => {
                    return Err(DecodeFailure::new(
                        error,
                        PartialAck {
                            instance: Some(referent),
                            property: Some(property),
                            versions,
                        },
                    ))
                }
            }
        }

        Ok(PropertyAck { instance: referent, property, versions })
    }

    /// Encode this subpacket into `w` under `ctx`.
    ///
    /// Fails with `InstanceLookupFailure` when the instance handle resolves
    /// to nothing, and with `VersionCountOverflow` past 255 entries (the
    /// count is never silently truncated). Both checks run before any byte
    /// is written, so a failed serialize leaves the sink and the outbound
    /// cache untouched.
    pub fn serialize(
        &self,
        ctx: &mut SessionContext,
        w: &mut StreamWriter,
    ) -> Result<(), CodecError> {
        if !ctx.instances.contains(self.instance) {
            return Err(CodecError::InstanceLookupFailure { referent: self.instance });
        }
        if self.versions.len() > Self::MAX_VERSIONS {
            return Err(CodecError::VersionCountOverflow { count: self.versions.len() });
        }

        write_referent(w, self.instance, &mut ctx.outbound_cache);
        w.write_u16_be(self.property.id);
        w.write_u8(self.versions.len() as u8);
        for &version in &self.versions {
            w.write_uvarint32(version);
        }
        Ok(())
    }

    /// One-line summary: `Name[Property] versions=[..]`, resolving the
    /// instance name through the session's table.
    pub fn describe(&self, ctx: &SessionContext) -> String {
        let name = ctx
            .instances
            .get(self.instance)
            .map(|instance| instance.name.as_str())
            .unwrap_or("<unknown instance>");
        format!("{}[{}] versions={:?}", name, self.property.name, self.versions)
    }
}
