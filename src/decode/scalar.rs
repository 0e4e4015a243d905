//! Interpreting raw payloads as typed scalar values.

use super::{Candidate, EnumValue, UnknownValue, Value};
use crate::error::DecodeError;
use crate::heuristic::candidate_types;
use crate::options::DecodeOptions;
use crate::schema::{EnumDescriptor, Schemaless};
use crate::wire::{Extracted, FieldType, Payload, WireType};

/// Inverse of the `sint32` zigzag encoding.
pub fn zigzag_decode32(raw: u32) -> i32
{
    ((raw >> 1) as i32) ^ -((raw & 1) as i32)
}

/// Inverse of the `sint64` zigzag encoding.
pub fn zigzag_decode64(raw: u64) -> i64
{
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}

/// Decodes a payload as the given field type.
///
/// `len` is the encoded length of the value, used to reject booleans longer than one byte.
/// Embedded messages cannot be decoded here: they need a message descriptor and are reported as
/// unresolved.
pub fn decode_scalar<E: EnumDescriptor>(
    field_type: FieldType,
    payload: &Payload,
    len: usize,
    enum_type: Option<&E>,
    options: &DecodeOptions,
) -> Result<Value, DecodeError>
{
    if field_type == FieldType::Group {
        return Err(DecodeError::UnsupportedWireType {
            wire_type: WireType::StartGroup.raw(),
        });
    }

    if let Some(expected) = field_type.wire_type() {
        if expected != payload.wire_type() {
            return Err(DecodeError::WireTypeMismatch {
                expected,
                actual: payload.wire_type(),
            });
        }
    }

    Ok(match (field_type, payload) {
        (FieldType::Int32, Payload::Varint(v)) => Value::Int32(*v as i32),
        (FieldType::Int64, Payload::Varint(v)) => Value::Int64(*v as i64),
        (FieldType::UInt32, Payload::Varint(v)) => Value::UInt32(*v as u32),
        (FieldType::UInt64, Payload::Varint(v)) => Value::UInt64(*v),
        (FieldType::SInt32, Payload::Varint(v)) => Value::SInt32(zigzag_decode32(*v as u32)),
        (FieldType::SInt64, Payload::Varint(v)) => Value::SInt64(zigzag_decode64(*v)),
        (FieldType::Bool, Payload::Varint(v)) => {
            if len != 1 {
                return Err(DecodeError::InvalidBoolLength { length: len });
            }
            Value::Bool(*v != 0)
        }
        (FieldType::Enum, Payload::Varint(v)) => {
            let number = *v as i32;
            Value::Enum(EnumValue {
                number,
                name: enum_type
                    .and_then(|e| e.find_value(number))
                    .map(String::from),
            })
        }
        (FieldType::Fixed64, Payload::Fixed64(v)) => Value::Fixed64(*v),
        (FieldType::SFixed64, Payload::Fixed64(v)) => Value::SFixed64(*v as i64),
        (FieldType::Double, Payload::Fixed64(v)) => Value::Double(f64::from_bits(*v)),
        (FieldType::Fixed32, Payload::Fixed32(v)) => Value::Fixed32(*v),
        (FieldType::SFixed32, Payload::Fixed32(v)) => Value::SFixed32(*v as i32),
        (FieldType::Float, Payload::Fixed32(v)) => Value::Float(f32::from_bits(*v)),
        (FieldType::String, Payload::LengthDelimited(b)) => {
            Value::String(String::from_utf8_lossy(b).into_owned())
        }
        (FieldType::Bytes, Payload::LengthDelimited(b)) => match options.treat_bytes_as_string {
            true => Value::String(String::from_utf8_lossy(b).into_owned()),
            false => Value::Bytes(b.clone()),
        },
        (FieldType::Message, Payload::LengthDelimited(..)) => {
            return Err(DecodeError::MessageTypeUnresolved {
                name: String::from("<unknown>"),
            })
        }
        (_, payload) => Value::Unknown(UnknownValue::from_payload(payload)),
    })
}

/// Decodes a value with every type its wire type allows, in the order of
/// [`candidate_types`].
pub fn decode_with_candidates(extracted: &Extracted, options: &DecodeOptions) -> Vec<Candidate>
{
    candidate_types(extracted.payload.wire_type())
        .iter()
        .map(|field_type| Candidate {
            field_type: *field_type,
            value: decode_scalar::<Schemaless>(
                *field_type,
                &extracted.payload,
                extracted.value_span.len(),
                None,
                options,
            ),
        })
        .collect()
}
