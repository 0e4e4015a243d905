//! Type guessing for fields that have no schema.

use crate::options::DecodeOptions;
use crate::wire::{FieldType, WireType};

const VARINT_TYPES: &[FieldType] = &[
    FieldType::Int32,
    FieldType::Int64,
    FieldType::UInt32,
    FieldType::UInt64,
    FieldType::SInt32,
    FieldType::SInt64,
    FieldType::Bool,
    FieldType::Enum,
];

const FIXED64_TYPES: &[FieldType] = &[FieldType::Fixed64, FieldType::SFixed64, FieldType::Double];

const LENGTH_DELIMITED_TYPES: &[FieldType] = &[
    FieldType::String,
    FieldType::Bytes,
    FieldType::Message,
    FieldType::Group,
];

const FIXED32_TYPES: &[FieldType] = &[FieldType::Fixed32, FieldType::SFixed32, FieldType::Float];

/// Every field type a value of the wire type could be, most likely first.
///
/// Group wire types have no candidates since groups are not decoded.
pub fn candidate_types(wire_type: WireType) -> &'static [FieldType]
{
    match wire_type {
        WireType::Varint => VARINT_TYPES,
        WireType::Fixed64 => FIXED64_TYPES,
        WireType::LengthDelimited => LENGTH_DELIMITED_TYPES,
        WireType::Fixed32 => FIXED32_TYPES,
        WireType::StartGroup | WireType::EndGroup => &[],
    }
}

/// The single type to display a field without schema as.
///
/// Length-delimited values are strings if the options ask for it and otherwise stay raw.
/// Numeric values are unsigned, `uint32` when they fit.
pub fn guess_type(wire_type: WireType, value: Option<u64>, options: &DecodeOptions) -> FieldType
{
    match wire_type {
        WireType::LengthDelimited if options.guess_unknown_as_string => FieldType::String,
        WireType::LengthDelimited | WireType::StartGroup | WireType::EndGroup => FieldType::None,
        WireType::Varint | WireType::Fixed64 | WireType::Fixed32 => match value {
            Some(v) if v <= u64::from(u32::MAX) => FieldType::UInt32,
            Some(_) => FieldType::UInt64,
            None => FieldType::None,
        },
    }
}
