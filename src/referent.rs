//! Referent tokens and the session cache that compresses them.
//!
//! A referent is the wire identifier for a replicated object instance. The
//! first time a session mentions one it travels as a literal 32-bit
//! identifier and gets a cache slot; every later mention is the one-byte
//! slot token. The explicit null marker is its own token, so a zero-valued
//! identifier is always distinguishable from null.

use std::collections::HashMap;
use std::fmt;

use crate::error::CodecError;
use crate::stream::{StreamReader, StreamWriter};

/// Full 32-bit wire identifier for an object instance.
///
/// Null never appears as a `Referent` value; APIs that can produce or accept
/// the wire null use `Option<Referent>` with `None` for the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Referent(pub u32);

impl fmt::Display for Referent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Token for the explicit null referent.
pub const NULL_TOKEN: u8 = 0x00;
/// Token announcing a literal 32-bit identifier (followed by 4 bytes).
pub const LITERAL_TOKEN: u8 = 0xff;
/// Slot tokens are 0x01..=0xfe, so a session caches at most this many
/// referents; past the cap, literals pass through unregistered.
pub const MAX_CACHED: usize = 254;

/// Session-scoped table mapping slot tokens to full identifiers.
///
/// Grown incrementally as literals are first observed; one cache per
/// direction, since each peer numbers the referents it sends.
#[derive(Debug, Clone, Default)]
pub struct ReferentCache {
    slots: Vec<Referent>,
    by_referent: HashMap<Referent, u8>,
}

impl ReferentCache {
    pub fn new() -> Self {
        ReferentCache::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Register a referent, returning its slot token (1-based). Returns the
    /// existing slot if already registered, `None` once the cache is full.
    pub fn register(&mut self, referent: Referent) -> Option<u8> {
        if let Some(&slot) = self.by_referent.get(&referent) {
            return Some(slot);
        }
        if self.slots.len() >= MAX_CACHED {
            return None;
        }
        self.slots.push(referent);
        let slot = self.slots.len() as u8;
        self.by_referent.insert(referent, slot);
        Some(slot)
    }

    /// Expand a slot token. `None` for unregistered slots and for the
    /// null/literal tokens, which never address a slot.
    pub fn get(&self, slot: u8) -> Option<Referent> {
        if slot == NULL_TOKEN || slot == LITERAL_TOKEN {
            return None;
        }
        self.slots.get(usize::from(slot) - 1).copied()
    }

    pub fn slot_of(&self, referent: Referent) -> Option<u8> {
        self.by_referent.get(&referent).copied()
    }
}

/// Read one referent, expanding compact tokens through `cache`.
///
/// Returns `Ok(None)` for the explicit null marker. Literals are registered
/// into the cache as a side effect, mirroring the sender's registration.
pub fn read_referent(
    r: &mut StreamReader<'_>,
    cache: &mut ReferentCache,
) -> Result<Option<Referent>, CodecError> {
    let token = r.read_u8("referent token")?;
    match token {
        NULL_TOKEN => Ok(None),
        LITERAL_TOKEN => {
            let referent = Referent(r.read_u32_be("referent id")?);
            let _ = cache.register(referent);
            Ok(Some(referent))
        }
        slot => cache
            .get(slot)
            .map(Some)
            .ok_or(CodecError::UnknownReferentSlot { slot }),
    }
}

/// Write one referent: the cached slot token when present, else the literal
/// form plus a new registration.
pub fn write_referent(w: &mut StreamWriter, referent: Referent, cache: &mut ReferentCache) {
    match cache.slot_of(referent) {
        Some(slot) => w.write_u8(slot),
        None => {
            w.write_u8(LITERAL_TOKEN);
            w.write_u32_be(referent.0);
            let _ = cache.register(referent);
        }
    }
}

/// Write the explicit null marker.
pub fn write_null_referent(w: &mut StreamWriter) {
    w.write_u8(NULL_TOKEN);
}
