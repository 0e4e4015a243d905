//! Packed repeated fields.
//!
//! Only repeated fields of scalar numeric types can be packed. The format of a packed field is a
//! single length-delimited value holding the elements back to back: `tag length varint varint ...`
//! or `tag length fixed64 fixed64 ...`.

use super::PackedElement;
use crate::error::DecodeError;
use crate::options::DecodeOptions;
use crate::schema::EnumDescriptor;
use crate::wire::{read_varint, FieldType, Payload, Span, VarintError, WireType};

/// Decodes the elements of a packed field.
///
/// `data` is the value without the length prefix and `start` its absolute offset. The decoding is
/// all or nothing: if any element fails, no elements are returned.
pub fn decode_packed<E: EnumDescriptor>(
    data: &[u8],
    start: usize,
    field_type: FieldType,
    enum_type: Option<&E>,
    options: &DecodeOptions,
) -> Result<Vec<PackedElement>, DecodeError>
{
    let raw = match field_type.wire_type() {
        Some(WireType::Varint) => split_varints(data, start, field_type)?,
        Some(WireType::Fixed64) => split_fixed(data, start, field_type, 8, read_fixed64)?,
        Some(WireType::Fixed32) => split_fixed(data, start, field_type, 4, read_fixed32)?,
        _ => return Err(DecodeError::WireTypeNotPackable { field_type }),
    };

    raw.into_iter()
        .map(|(span, payload)| {
            let value =
                super::scalar::decode_scalar(field_type, &payload, span.len(), enum_type, options)
                    .map_err(|e| DecodeError::PackedRepeatedDecodeFailure {
                        field_type,
                        detail: format!("element at {}: {}", span, e),
                    })?;
            Ok(PackedElement { span, value })
        })
        .collect()
}

fn split_varints(
    mut data: &[u8],
    start: usize,
    field_type: FieldType,
) -> Result<Vec<(Span, Payload)>, DecodeError>
{
    let mut offset = start;
    let mut output = vec![];
    while !data.is_empty() {
        let (value, len) = read_varint(data).map_err(|e| {
            let detail = match e {
                VarintError::Truncated => format!("varint at offset {} overruns the value", offset),
                VarintError::TooLong => format!("varint at offset {} is too long", offset),
            };
            DecodeError::PackedRepeatedDecodeFailure { field_type, detail }
        })?;

        output.push((Span::new(offset, offset + len), Payload::Varint(value)));
        data = &data[len..];
        offset += len;
    }

    Ok(output)
}

fn read_fixed32(chunk: &[u8]) -> Option<Payload>
{
    let bytes = chunk.try_into().ok()?;
    Some(Payload::Fixed32(u32::from_le_bytes(bytes)))
}

fn read_fixed64(chunk: &[u8]) -> Option<Payload>
{
    let bytes = chunk.try_into().ok()?;
    Some(Payload::Fixed64(u64::from_le_bytes(bytes)))
}

fn split_fixed(
    data: &[u8],
    start: usize,
    field_type: FieldType,
    width: usize,
    read: fn(&[u8]) -> Option<Payload>,
) -> Result<Vec<(Span, Payload)>, DecodeError>
{
    let misaligned = || DecodeError::PackedRepeatedDecodeFailure {
        field_type,
        detail: format!("length {} is not a multiple of {}", data.len(), width),
    };
    if data.len() % width != 0 {
        return Err(misaligned());
    }

    data.chunks_exact(width)
        .enumerate()
        .map(|(idx, chunk)| {
            let offset = start + idx * width;
            let payload = read(chunk).ok_or_else(misaligned)?;
            Ok((Span::new(offset, offset + width), payload))
        })
        .collect()
}
