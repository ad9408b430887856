//! Session manifests: line-oriented fixtures feeding the dissector's schema
//! and instance tables.
//!
//! The outer protocol announces schemas and instances in its handshake; that
//! exchange is out of scope here, so capture runs load the equivalent state
//! from a manifest:
//!
//! ```text
//! # property table, in wire-index order
//! prop 0 Transparency
//! prop 1 Position
//! # announced instances: <referent> <name>
//! inst 0x2a Workspace.Part
//! inst 7 Workspace.SpawnLocation
//! # referents already in the peer's cache when the capture starts,
//! # in slot order
//! cache 0x2a
//! ```
//!
//! `prop` lines append to the schema table (their order is the wire index);
//! `inst` lines announce live instances; `cache` lines pre-register the
//! inbound referent cache for captures that begin mid-session. Blank lines
//! and `#` comments are ignored.

use crate::context::SessionContext;
use crate::instance::{Instance, InstanceTable};
use crate::referent::Referent;
use crate::schema::{PropertySchema, SchemaTable};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("manifest line {line}: {message}")]
pub struct ManifestError {
    pub line: usize,
    pub message: String,
}

fn err(line: usize, message: impl Into<String>) -> ManifestError {
    ManifestError { line, message: message.into() }
}

fn parse_number(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

/// Parse a manifest into a fresh session context.
///
/// Every `prop` line states its id explicitly, so tables whose ids differ
/// from their wire indices are representable too.
pub fn parse_manifest(src: &str) -> Result<SessionContext, ManifestError> {
    let mut schema = SchemaTable::default();
    let mut instances = InstanceTable::new();
    let mut cached = Vec::new();

    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut words = text.split_whitespace();
        let kind = words.next().unwrap_or_default();
        let number = words
            .next()
            .ok_or_else(|| err(line, format!("`{kind}` needs a number")))?;
        let name = words.collect::<Vec<_>>().join(" ");

        match kind {
            "prop" => {
                if name.is_empty() {
                    return Err(err(line, "`prop` needs a name after the id"));
                }
                let id = parse_number(number)
                    .filter(|&id| id <= u32::from(u16::MAX))
                    .ok_or_else(|| err(line, format!("bad property id `{number}`")))?;
                schema.push(PropertySchema::new(id as u16, name));
            }
            "inst" => {
                if name.is_empty() {
                    return Err(err(line, "`inst` needs a name after the referent"));
                }
                let id = parse_number(number)
                    .ok_or_else(|| err(line, format!("bad referent `{number}`")))?;
                instances.insert(Instance::new(Referent(id), name));
            }
            "cache" => {
                let id = parse_number(number)
                    .ok_or_else(|| err(line, format!("bad referent `{number}`")))?;
                cached.push(Referent(id));
            }
            other => return Err(err(line, format!("unknown directive `{other}`"))),
        }
    }

    let mut ctx = SessionContext::new(instances, schema);
    for referent in cached {
        let _ = ctx.inbound_cache.register(referent);
    }
    Ok(ctx)
}
