//! Instance lookup records keyed by referent.
//!
//! The table stands in for the external datamodel subsystem: the codec only
//! looks instances up, it never creates or destroys them. Population (from
//! the outer protocol's announcements) belongs to the caller.

use std::collections::HashMap;

use crate::referent::Referent;

/// Lookup record for one replicated object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub referent: Referent,
    /// Display name (full path in the replicated tree, as announced).
    pub name: String,
}

impl Instance {
    pub fn new(referent: Referent, name: impl Into<String>) -> Self {
        Instance { referent, name: name.into() }
    }
}

/// Live instances known to the session, keyed by referent.
#[derive(Debug, Clone, Default)]
pub struct InstanceTable {
    by_referent: HashMap<Referent, Instance>,
}

impl InstanceTable {
    pub fn new() -> Self {
        InstanceTable::default()
    }

    pub fn len(&self) -> usize {
        self.by_referent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_referent.is_empty()
    }

    /// Announce an instance. Replaces (and returns) any previous record for
    /// the same referent.
    pub fn insert(&mut self, instance: Instance) -> Option<Instance> {
        self.by_referent.insert(instance.referent, instance)
    }

    /// Remove an instance, e.g. when the datamodel deletes the object.
    pub fn remove(&mut self, referent: Referent) -> Option<Instance> {
        self.by_referent.remove(&referent)
    }

    pub fn get(&self, referent: Referent) -> Option<&Instance> {
        self.by_referent.get(&referent)
    }

    pub fn contains(&self, referent: Referent) -> bool {
        self.by_referent.contains_key(&referent)
    }
}
