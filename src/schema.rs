//! Property descriptors and the session-wide schema table.

use crate::error::CodecError;

/// Descriptor of one replicated property: a stable numeric identifier for
/// the wire plus a display name for summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySchema {
    pub id: u16,
    pub name: String,
}

impl PropertySchema {
    pub fn new(id: u16, name: impl Into<String>) -> Self {
        PropertySchema { id, name: name.into() }
    }
}

/// Bound policy for property-index validation.
///
/// `Strict` rejects any index at or past the table length. `Legacy`
/// reproduces the historic dissector's check, which only rejected indices
/// strictly above the length; the `index == len` probe then fails on the
/// table access itself, reported as the same error (kept for wire-capture
/// parity runs, where the off-by-one boundary must match the old tool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBound {
    #[default]
    Strict,
    Legacy,
}

/// Ordered, session-wide table of property descriptors, indexable by the
/// 16-bit wire index. Populated once per session; read-only while the codec
/// runs.
#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    properties: Vec<PropertySchema>,
}

impl SchemaTable {
    pub fn new(properties: Vec<PropertySchema>) -> Self {
        SchemaTable { properties }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn push(&mut self, property: PropertySchema) {
        self.properties.push(property);
    }

    pub fn get(&self, index: u16) -> Option<&PropertySchema> {
        self.properties.get(usize::from(index))
    }

    /// Validate `index` under `bound` and return the descriptor.
    pub fn resolve(&self, index: u16, bound: IndexBound) -> Result<&PropertySchema, CodecError> {
        let len = self.properties.len();
        let limit_exceeded = match bound {
            IndexBound::Strict => usize::from(index) >= len,
            IndexBound::Legacy => usize::from(index) > len,
        };
        if limit_exceeded {
            return Err(CodecError::SchemaIndexOutOfRange { index, len });
        }
        self.properties
            .get(usize::from(index))
            .ok_or(CodecError::SchemaIndexOutOfRange { index, len })
    }
}
