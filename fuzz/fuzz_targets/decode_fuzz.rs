//! Decoder fuzz target: feed arbitrary bytes to the subpacket dissector.
//! The dissector must not panic; any input yields a report of decoded and
//! failed subpackets.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use replack::{
        dissect_stream, Instance, InstanceTable, PropertySchema, Referent, SchemaTable,
        SessionContext,
    };

    let mut instances = InstanceTable::new();
    instances.insert(Instance::new(Referent(0), "Zero"));
    instances.insert(Instance::new(Referent(1), "One"));
    let schema = SchemaTable::new(vec![
        PropertySchema::new(0, "A"),
        PropertySchema::new(1, "B"),
    ]);
    let mut ctx = SessionContext::new(instances, schema);
    let _ = ctx.inbound_cache.register(Referent(1));

    let _ = dissect_stream(&mut ctx, data);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
