use protospan::{DecodedMessage, Value};

/// Fields must cover the message from its start without gaps, up to the garbage or the field
/// that stopped decoding.
fn check_cursor(msg: &DecodedMessage)
{
    let mut offset = msg.span.start;
    for field in &msg.fields {
        assert_eq!(field.span.start, offset, "Gap before field {}", field.number);
        assert!(field.span.end <= msg.span.end);
        assert!(!field.span.is_empty());
        offset = field.span.end;

        if let Value::Message(nested) = &field.value {
            assert!(field.span.contains(&nested.span));
            check_cursor(nested);
        }
        if let Value::Packed(elements) = &field.value {
            for element in elements {
                assert!(field.span.contains(&element.span));
            }
        }
    }

    // A field that could not be read reaches the end of the message.
    let garbage = msg.garbage.as_ref().map(|g| g.len()).unwrap_or(0);
    assert_eq!(offset + garbage, msg.span.end);
}

fn wrap(field: u8, inner: &[u8]) -> Vec<u8>
{
    let mut output = vec![field << 3 | 2];
    let mut len = inner.len();
    while len >= 0x80 {
        output.push((len as u8 & 0x7f) | 0x80);
        len >>= 7;
    }
    output.push(len as u8);
    output.extend_from_slice(inner);
    output
}

fn node_pool(with_value: bool) -> protospan::SchemaPool
{
    use protospan::schema::{FieldInfo, SchemaPool};
    use protospan::FieldType;

    let mut pool = SchemaPool::new();
    let node = pool.insert_message("Node").unwrap();
    pool.add_field(node, FieldInfo::message("child", 1, node))
        .unwrap();
    if with_value {
        pool.add_field(node, FieldInfo::new("value", 2, FieldType::SInt64))
            .unwrap();
    }
    pool
}

#[test]
fn every_prefix_stays_in_bounds()
{
    use bytes::Bytes;
    use protospan::{DecodeOptions, Decoder};

    let mut payload = vec![];
    payload.extend_from_slice(b"\x08\x96\x01");
    payload.extend_from_slice(&wrap(2, b"\x08\x01\x12\x03abc\x1d\x00\x00\x80\x3f"));
    payload.extend_from_slice(b"\x21\x01\x02\x03\x04\x05\x06\x07\x08");
    payload.extend_from_slice(b"\x10\xff\xff\xff\xff\xff\xff\xff\xff\xff\x01");

    let pool = node_pool(true);
    let decoders = [
        Decoder::default(),
        Decoder::new(DecodeOptions::default().with_all_candidate_types(true)),
        Decoder::new(DecodeOptions::default().with_guess_unknown_as_string(true)),
    ];

    for len in 0..=payload.len() {
        let data = Bytes::copy_from_slice(&payload[..len]);
        for decoder in decoders.iter() {
            let msg = decoder.decode_schemaless(&data);
            assert_eq!(msg.span.end, len);
            check_cursor(&msg);
        }
        check_cursor(&pool.decode_message("Node", &data, &DecodeOptions::default()));
    }
}

#[test]
fn arbitrary_bytes_stay_in_bounds()
{
    use bytes::Bytes;
    use protospan::{DecodeOptions, Decoder};

    let pool = node_pool(true);
    let decoder = Decoder::new(DecodeOptions::default().with_all_candidate_types(true));

    // Deterministic pseudo-random input.
    let mut state = 0x2545_f491_4f6c_dd1du64;
    for round in 0..500 {
        let data: Vec<u8> = (0..(round % 64))
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect();
        let data = Bytes::from(data);

        check_cursor(&decoder.decode_schemaless(&data));
        check_cursor(&pool.decode_message("Node", &data, &DecodeOptions::default()));
    }
}

#[test]
fn garbage_after_fields()
{
    use bytes::Bytes;
    use protospan::{DecodeError, Decoder, Span};

    // Field 1, then a tag that never ends.
    let data = Bytes::from_static(b"\x08\x01\xff\xff\xff");
    let msg = Decoder::default().decode_schemaless(&data);

    assert_eq!(msg.fields.len(), 1);
    assert_eq!(msg.garbage, Some(Bytes::from_static(b"\xff\xff\xff")));
    assert_eq!(msg.diagnostics[0].span, Span::new(2, 5));
    assert_eq!(
        msg.diagnostics[0].error,
        DecodeError::MalformedTag { offset: 2 }
    );
    assert!(!msg.is_complete());
}

#[test]
fn truncated_values()
{
    use bytes::Bytes;
    use protospan::{DecodeError, Decoder, Span, Value};

    let decoder = Decoder::default();

    let msg = decoder.decode_schemaless(&Bytes::from_static(b"\x08\x01\x12\x05ab"));
    assert_eq!(msg.fields.len(), 2);
    assert_eq!(msg.fields[1].span, Span::new(2, 6));
    assert_eq!(msg.fields[1].value, Value::Incomplete(Bytes::from_static(b"\x05ab")));
    assert_eq!(
        msg.fields[1].diagnostics[0].error,
        DecodeError::Truncated {
            offset: 4,
            needed: 5,
            available: 2
        }
    );

    let msg = decoder.decode_schemaless(&Bytes::from_static(b"\x09\x01\x02\x03"));
    assert_eq!(
        msg.fields[0].diagnostics[0].error,
        DecodeError::Truncated {
            offset: 1,
            needed: 8,
            available: 3
        }
    );

    let msg = decoder.decode_schemaless(&Bytes::from_static(b"\x12\xff"));
    assert_eq!(
        msg.fields[0].diagnostics[0].error,
        DecodeError::MalformedLengthPrefix { offset: 1 }
    );

    let msg = decoder.decode_schemaless(&Bytes::from_static(
        b"\x08\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\x01",
    ));
    assert_eq!(
        msg.fields[0].diagnostics[0].error,
        DecodeError::InvalidVarint { offset: 1 }
    );
}

#[test]
fn nested_failure_stays_local()
{
    use bytes::Bytes;
    use protospan::{DecodeOptions, Value};

    let pool = node_pool(true);

    let mut payload = wrap(1, b"\x10\x02\x0f\x00");
    payload.extend_from_slice(b"\x10\x03");
    let msg = pool.decode_message("Node", &Bytes::from(payload), &DecodeOptions::default());

    let nested = msg.fields[0].value.as_message().unwrap();
    assert_eq!(nested.fields[0].value, Value::SInt64(1));
    assert_eq!(nested.garbage, Some(Bytes::from_static(b"\x0f\x00")));
    assert_eq!(msg.fields[1].value, Value::SInt64(-2));
    assert!(msg.garbage.is_none());
    assert_eq!(msg.all_diagnostics().len(), 1);
}

#[test]
fn depth_limit()
{
    use bytes::Bytes;
    use protospan::{DecodeError, DecodeOptions, Value};

    let pool = node_pool(false);

    let mut payload = vec![];
    for _ in 0..5 {
        payload = wrap(1, &payload);
    }
    let payload = Bytes::from(payload);

    let options = DecodeOptions::default().with_max_depth(3);
    let mut msg = pool.decode_message("Node", &payload, &options);
    for _ in 0..3 {
        msg = msg.fields[0].value.as_message().unwrap().clone();
    }

    let field = &msg.fields[0];
    assert!(matches!(field.value, Value::Unknown(..)));
    assert_eq!(
        field.diagnostics[0].error,
        DecodeError::RecursionLimitExceeded { depth: 3 }
    );
}

#[test]
fn deep_nesting_uses_default_limit()
{
    use bytes::Bytes;
    use protospan::{DecodeError, DecodeOptions};

    let pool = node_pool(false);

    let mut payload = vec![];
    for _ in 0..300 {
        payload = wrap(1, &payload);
    }
    let payload = Bytes::from(payload);

    let msg = pool.decode_message("Node", &payload, &DecodeOptions::default());
    let diagnostics = msg.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].error,
        DecodeError::RecursionLimitExceeded { depth: 100 }
    );
    check_cursor(&msg);
}

#[test]
fn window_outside_buffer()
{
    use bytes::Bytes;
    use protospan::schema::Schemaless;
    use protospan::{DecodeError, Decoder, Span};

    let data = Bytes::from_static(b"\x08\x01");
    let msg = Decoder::default().decode_window::<Schemaless>(&data, 10, 4, None);

    assert_eq!(msg.span, Span::new(2, 2));
    assert!(msg.fields.is_empty());
    assert_eq!(
        msg.diagnostics[0].error,
        DecodeError::Truncated {
            offset: 2,
            needed: 4,
            available: 0
        }
    );

    let msg = Decoder::default().decode_window::<Schemaless>(&data, 0, usize::MAX, None);
    assert_eq!(msg.fields.len(), 1);
    assert!(!msg.is_complete());
}
