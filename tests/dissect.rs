//! Dissection tests: buffers of consecutive subpackets, byte ranges, and
//! failure isolation.

use replack::{
    dissect_stream, CodecError, Instance, InstanceTable, PropertyAck, PropertySchema, Referent,
    SchemaTable, SessionContext, StreamWriter,
};

const PART: Referent = Referent(0x2a);
const SPAWN: Referent = Referent(7);

fn session() -> SessionContext {
    let mut instances = InstanceTable::new();
    instances.insert(Instance::new(PART, "Workspace.Part"));
    instances.insert(Instance::new(SPAWN, "Workspace.SpawnLocation"));
    let schema = SchemaTable::new(vec![
        PropertySchema::new(0, "Transparency"),
        PropertySchema::new(1, "Position"),
    ]);
    SessionContext::new(instances, schema)
}

fn encode_all(ctx: &mut SessionContext, acks: &[PropertyAck]) -> Vec<u8> {
    let mut w = StreamWriter::new();
    for ack in acks {
        ack.serialize(ctx, &mut w).expect("serialize");
    }
    w.into_bytes()
}

fn ack(instance: Referent, ctx: &SessionContext, index: u16, versions: Vec<u32>) -> PropertyAck {
    PropertyAck {
        instance,
        property: ctx.schema.get(index).expect("schema index").clone(),
        versions,
    }
}

#[test]
fn dissects_consecutive_subpackets_with_ranges() {
    let mut ctx = session();
    let acks = vec![
        ack(PART, &ctx, 0, vec![1]),
        ack(SPAWN, &ctx, 1, vec![2, 3]),
        ack(PART, &ctx, 1, vec![300]),
    ];
    let bytes = encode_all(&mut ctx, &acks);

    let report = dissect_stream(&mut ctx, &bytes);
    assert!(report.is_clean());
    assert_eq!(report.decoded.len(), 3);
    for (dissected, original) in report.decoded.iter().zip(&acks) {
        assert_eq!(&dissected.ack, original);
    }

    // Ranges tile the buffer exactly.
    assert_eq!(report.decoded[0].byte_range.0, 0);
    for pair in report.decoded.windows(2) {
        assert_eq!(pair[0].byte_range.1, pair[1].byte_range.0);
    }
    assert_eq!(report.decoded[2].byte_range.1, bytes.len());

    // Third subpacket re-mentions PART compactly: token instead of literal.
    let third = report.decoded[2].byte_range;
    let first = report.decoded[0].byte_range;
    assert_eq!((first.1 - first.0) - (third.1 - third.0), 4 - 1); // 300 is a 2-byte varint
}

#[test]
fn failure_keeps_decoded_prefix() {
    let mut ctx = session();
    let acks = vec![ack(PART, &ctx, 0, vec![1, 2]), ack(SPAWN, &ctx, 1, vec![3])];
    let mut bytes = encode_all(&mut ctx, &acks);
    let good_len = bytes.len();
    // Corrupt tail: a subpacket that names cache slot 9, never registered.
    bytes.extend_from_slice(&[0x09, 0x00, 0x00, 0x00]);

    let report = dissect_stream(&mut ctx, &bytes);
    assert_eq!(report.decoded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(!report.is_clean());

    let failed = &report.failed[0];
    assert_eq!(failed.byte_range.0, good_len);
    assert_eq!(
        failed.reason,
        CodecError::UnknownReferentSlot { slot: 9 }.to_string()
    );
}

#[test]
fn failure_carries_partial_versions() {
    let mut ctx = session();
    let only = ack(PART, &ctx, 1, vec![10, 20, 30]);
    let bytes = encode_all(&mut ctx, &[only]);

    // Cut mid version list: count says 3, stream holds 2.
    let report = dissect_stream(&mut ctx, &bytes[..bytes.len() - 1]);
    assert!(report.decoded.is_empty());
    let failed = &report.failed[0];
    assert_eq!(failed.partial.instance, Some(PART));
    assert_eq!(failed.partial.versions, vec![10, 20]);
    assert_eq!(failed.byte_range.0, 0);
}

#[test]
fn empty_buffer_is_clean_and_empty() {
    let mut ctx = session();
    let report = dissect_stream(&mut ctx, &[]);
    assert!(report.is_clean());
    assert!(report.decoded.is_empty());
}

#[test]
fn null_leading_referent_fails_the_buffer() {
    let mut ctx = session();
    let report = dissect_stream(&mut ctx, &[0x00, 0x01, 0x02]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(
        report.failed[0].reason,
        CodecError::InvalidReference.to_string()
    );
}
