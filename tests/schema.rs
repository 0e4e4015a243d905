fn fish_pool() -> protospan::SchemaPool
{
    use protospan::schema::{FieldInfo, SchemaPool};
    use protospan::FieldType;

    let mut pool = SchemaPool::new();
    let request = pool.insert_message("Proto.Request").unwrap();
    let response = pool.insert_message("Proto.Response").unwrap();
    let kind = pool.insert_enum("Proto.Kind").unwrap();
    pool.add_enum_value(kind, "PERCH", 0).unwrap();
    pool.add_enum_value(kind, "PIKE", 1).unwrap();

    pool.add_field(request, FieldInfo::new("kind", 1, FieldType::String))
        .unwrap();
    pool.add_field(request, FieldInfo::enumeration("species", 2, kind))
        .unwrap();
    pool.add_field(request, FieldInfo::new("opaque", 3, FieldType::Message))
        .unwrap();
    pool.add_field(response, FieldInfo::new("distance", 1, FieldType::Int32))
        .unwrap();

    let service = pool.insert_service("Proto.Fish").unwrap();
    pool.add_method(service, "Swim", request, response).unwrap();
    pool
}

#[test]
fn method_lookup()
{
    use bytes::Bytes;
    use protospan::schema::{DescriptorPool, MessageDescriptor, MethodDescriptor};
    use protospan::{DecodeOptions, Value};

    let pool = fish_pool();
    let rpc = (&pool).find_method("Proto.Fish.Swim").unwrap();
    assert_eq!(rpc.full_name(), "Proto.Fish.Swim");
    assert_eq!(rpc.input_type().full_name(), "Proto.Request");
    assert_eq!(rpc.output_type().full_name(), "Proto.Response");
    assert_eq!(pool.get_method("/Proto.Fish/Swim").unwrap().name(), "Swim");
    assert!(pool.get_method("Proto.Fish.Dive").is_none());

    let input = rpc
        .input_type()
        .decode(&Bytes::from_static(b"\x0a\x05Perch"), &DecodeOptions::default());
    assert_eq!(input.name, "Proto.Request");
    assert_eq!(input.fields[0].value, Value::String("Perch".to_string()));

    let output = rpc
        .output_type()
        .decode(&Bytes::from_static(b"\x08\xa9\x46"), &DecodeOptions::default());
    assert_eq!(output.fields[0].value, Value::Int32(9001));
}

#[test]
fn schema_navigation()
{
    use protospan::schema::{DescriptorPool, EnumDescriptor, FieldDescriptor, Multiplicity};
    use protospan::FieldType;

    let pool = fish_pool();

    let request = (&pool).find_message_type("Proto.Request").unwrap();
    assert!(std::ptr::eq(request.pool(), &pool));
    assert!((&pool).find_message_type("Proto.Kind").is_none());

    let names: Vec<_> = request.iter_fields().map(|f| f.name().to_string()).collect();
    assert_eq!(names, vec!["kind", "species", "opaque"]);

    let species = request.get_field_by_name("species").unwrap();
    assert_eq!(species.number(), 2);
    assert_eq!(species.info().field_type, FieldType::Enum);
    assert_eq!(species.info().multiplicity, Multiplicity::Single);
    assert!(request.get_field_by_name("missing").is_none());

    let kind = species.enum_type().unwrap();
    assert_eq!(kind.full_name(), "Proto.Kind");
    assert_eq!(kind.get_value_by_name("PIKE"), Some(1));
    assert_eq!(kind.get_value_by_name("SALMON"), None);
    assert_eq!(kind.info().full_name, "Proto.Kind");

    let by_name = pool.get_enum("Proto.Kind").unwrap();
    assert_eq!(by_name.find_value(0), Some("PERCH"));
    assert!(pool.get_enum("Proto.Request").is_none());

    let rpc = pool.get_method("Proto.Fish.Swim").unwrap();
    assert_eq!(rpc.service().full_name, "Proto.Fish");
    assert_eq!(rpc.service().methods.len(), 1);
}

#[test]
fn enum_values()
{
    use bytes::Bytes;
    use protospan::{DecodeError, DecodeOptions, EnumValue, Severity, Value};

    let pool = fish_pool();
    let msg = pool.decode_message(
        "Proto.Request",
        &Bytes::from_static(b"\x10\x01\x10\x05"),
        &DecodeOptions::default(),
    );

    assert_eq!(
        msg.fields[0].value,
        Value::Enum(EnumValue {
            number: 1,
            name: Some("PIKE".to_string())
        })
    );
    assert!(msg.fields[0].diagnostics.is_empty());

    assert_eq!(
        msg.fields[1].value,
        Value::Enum(EnumValue {
            number: 5,
            name: None
        })
    );
    assert_eq!(
        msg.fields[1].diagnostics[0].error,
        DecodeError::EnumValueUnresolved {
            enum_name: "Proto.Kind".to_string(),
            value: 5
        }
    );
    assert_eq!(msg.fields[1].diagnostics[0].severity(), Severity::Info);
    assert!(msg.is_complete());
}

#[test]
fn unresolved_types()
{
    use bytes::Bytes;
    use protospan::{DecodeError, DecodeOptions, UnknownValue, Value};

    let pool = fish_pool();

    // A message field without a message type keeps its bytes.
    let msg = pool.decode_message(
        "Proto.Request",
        &Bytes::from_static(b"\x1a\x02\x08\x01"),
        &DecodeOptions::default(),
    );
    assert_eq!(
        msg.fields[0].value,
        Value::Unknown(UnknownValue::VariableLength(Bytes::from_static(b"\x08\x01")))
    );
    assert_eq!(
        msg.fields[0].diagnostics[0].error,
        DecodeError::MessageTypeUnresolved {
            name: "opaque".to_string()
        }
    );

    // Unknown message names decode without schema.
    let msg = pool.decode_message(
        "Proto.Missing",
        &Bytes::from_static(b"\x08\x01"),
        &DecodeOptions::default(),
    );
    assert_eq!(msg.name, "unknown");
    assert_eq!(msg.fields[0].value, Value::UInt32(1));
    assert_eq!(
        msg.diagnostics[0].error,
        DecodeError::MessageTypeUnresolved {
            name: "Proto.Missing".to_string()
        }
    );
    assert!(msg.is_complete());
}

#[test]
fn wire_type_mismatch()
{
    use bytes::Bytes;
    use protospan::{DecodeError, DecodeOptions, UnknownValue, Value, WireType};

    let pool = fish_pool();

    // `distance` is an int32 but arrives as a 32-bit value.
    let msg = pool.decode_message(
        "Proto.Response",
        &Bytes::from_static(b"\x0d\x01\x00\x00\x00\x08\x02"),
        &DecodeOptions::default(),
    );
    assert_eq!(msg.fields.len(), 2);
    assert_eq!(msg.fields[0].value, Value::Unknown(UnknownValue::Fixed32(1)));
    assert_eq!(
        msg.fields[0].diagnostics[0].error,
        DecodeError::WireTypeMismatch {
            expected: WireType::Varint,
            actual: WireType::Fixed32
        }
    );
    assert_eq!(msg.fields[1].value, Value::Int32(2));
    assert!(msg.is_complete());
}

#[test]
fn unknown_fields_are_guessed()
{
    use bytes::Bytes;
    use protospan::{DecodeOptions, FieldType, UnknownValue, Value};

    let pool = fish_pool();
    let msg = pool.decode_message(
        "Proto.Request",
        &Bytes::from_static(b"\x22\x07Unknown\x28\x80\x80\x80\x80\x20"),
        &DecodeOptions::default(),
    );

    assert_eq!(msg.fields[0].name, None);
    assert_eq!(
        msg.fields[0].value,
        Value::Unknown(UnknownValue::VariableLength(Bytes::from_static(b"Unknown")))
    );
    assert_eq!(msg.fields[1].field_type, FieldType::UInt64);
    assert_eq!(msg.fields[1].value, Value::UInt64(1 << 33));
}

#[test]
fn shared_schema_snapshots()
{
    use bytes::Bytes;
    use protospan::schema::{FieldInfo, SchemaPool};
    use protospan::{DecodeOptions, FieldType, SharedSchema};
    use std::sync::Arc;

    let shared = Arc::new(SharedSchema::new(fish_pool()));
    let data = Bytes::from_static(b"\x08\x01");

    let snapshot = shared.snapshot();

    let mut next = SchemaPool::new();
    let response = next.insert_message("Proto.Response").unwrap();
    next.add_field(response, FieldInfo::new("renamed", 1, FieldType::SInt32))
        .unwrap();

    let writer = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            shared.replace(next);
        })
    };
    writer.join().unwrap();

    let before = snapshot.decode_message("Proto.Response", &data, &DecodeOptions::default());
    assert_eq!(before.fields[0].name.as_deref(), Some("distance"));

    let after = shared
        .snapshot()
        .decode_message("Proto.Response", &data, &DecodeOptions::default());
    assert_eq!(after.fields[0].name.as_deref(), Some("renamed"));
}
