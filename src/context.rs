//! Session context shared by every codec call.
//!
//! One context per session, passed by reference; never a process-wide
//! singleton, so isolated sessions can run side by side. The caller
//! serializes access per session; a single session's caches must not be
//! mutated by two decode/encode operations at once.

use crate::instance::InstanceTable;
use crate::referent::ReferentCache;
use crate::schema::{IndexBound, SchemaTable};

/// Shared decode/encode state for one session.
///
/// The instance and schema tables are populated once (by the caller, from
/// the outer protocol) and read by the codec. The referent caches grow as a
/// side effect of decoding and encoding; inbound and outbound are separate
/// because each peer numbers the referents it sends.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub instances: InstanceTable,
    pub schema: SchemaTable,
    pub inbound_cache: ReferentCache,
    pub outbound_cache: ReferentCache,
    pub index_bound: IndexBound,
}

impl SessionContext {
    pub fn new(instances: InstanceTable, schema: SchemaTable) -> Self {
        SessionContext {
            instances,
            schema,
            inbound_cache: ReferentCache::new(),
            outbound_cache: ReferentCache::new(),
            index_bound: IndexBound::Strict,
        }
    }

    /// Switch the schema-index bound policy (parity runs use
    /// [`IndexBound::Legacy`]).
    pub fn with_index_bound(mut self, bound: IndexBound) -> Self {
        self.index_bound = bound;
        self
    }
}
