//! Wire format primitives.
//!
//! A protocol buffer message is a sequence of `tag value` pairs. The tag is a varint holding
//! `(field_number << 3) | wire_type` and the wire type tells how large the value is:
//!
//! - varint (`int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`, `bool`, `enum`)
//! - 64-bit little endian (`fixed64`, `sfixed64`, `double`)
//! - length-delimited (`string`, `bytes`, embedded messages, packed repeated fields)
//! - deprecated start/end group markers
//! - 32-bit little endian (`fixed32`, `sfixed32`, `float`)

use crate::error::DecodeError;
use bytes::{Buf, Bytes};
use std::fmt;

/// Longest valid varint encoding.
pub const MAX_VARINT_LEN: usize = 10;

/// Absolute byte range in the decoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span
{
    /// First byte.
    pub start: usize,

    /// One past the last byte.
    pub end: usize,
}

impl Span
{
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self
    {
        debug_assert!(start <= end);
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize
    {
        self.end - self.start
    }

    /// True, if the span covers no bytes.
    pub fn is_empty(&self) -> bool
    {
        self.start == self.end
    }

    /// True, if `other` lies completely within this span.
    pub fn contains(&self, other: &Span) -> bool
    {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Wire type stored in the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType
{
    /// `0`: varint.
    Varint,

    /// `1`: 64-bit.
    Fixed64,

    /// `2`: length-delimited.
    LengthDelimited,

    /// `3`: start group. Deprecated and not decoded.
    StartGroup,

    /// `4`: end group. Deprecated and not decoded.
    EndGroup,

    /// `5`: 32-bit.
    Fixed32,
}

impl WireType
{
    /// Converts the raw tag bits into a wire type. The values 6 and 7 are not valid.
    pub fn from_raw(raw: u8) -> Option<Self>
    {
        Some(match raw {
            0 => WireType::Varint,
            1 => WireType::Fixed64,
            2 => WireType::LengthDelimited,
            3 => WireType::StartGroup,
            4 => WireType::EndGroup,
            5 => WireType::Fixed32,
            _ => return None,
        })
    }

    /// The raw tag bits.
    pub fn raw(self) -> u8
    {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::StartGroup => 3,
            WireType::EndGroup => 4,
            WireType::Fixed32 => 5,
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str
    {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "64-bit",
            WireType::LengthDelimited => "length-delimited",
            WireType::StartGroup => "start group (deprecated)",
            WireType::EndGroup => "end group (deprecated)",
            WireType::Fixed32 => "32-bit",
        }
    }
}

impl fmt::Display for WireType
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Field types a value may be interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType
{
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint32`
    UInt32,
    /// `uint64`
    UInt64,
    /// `sint32`
    SInt32,
    /// `sint64`
    SInt64,
    /// `bool`
    Bool,
    /// `enum`
    Enum,
    /// `fixed64`
    Fixed64,
    /// `sfixed64`
    SFixed64,
    /// `double`
    Double,
    /// `fixed32`
    Fixed32,
    /// `sfixed32`
    SFixed32,
    /// `float`
    Float,
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// Embedded message.
    Message,
    /// Deprecated group.
    Group,
    /// No interpretation.
    None,
}

impl FieldType
{
    /// The wire type values of this type are encoded with.
    ///
    /// Packed repeated fields are the exception: they are always length-delimited.
    pub fn wire_type(self) -> Option<WireType>
    {
        Some(match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::UInt32
            | FieldType::UInt64
            | FieldType::SInt32
            | FieldType::SInt64
            | FieldType::Bool
            | FieldType::Enum => WireType::Varint,
            FieldType::Fixed64 | FieldType::SFixed64 | FieldType::Double => WireType::Fixed64,
            FieldType::Fixed32 | FieldType::SFixed32 | FieldType::Float => WireType::Fixed32,
            FieldType::String | FieldType::Bytes | FieldType::Message => {
                WireType::LengthDelimited
            }
            FieldType::Group => WireType::StartGroup,
            FieldType::None => return None,
        })
    }

    /// True, for scalar numeric types that may use packed repeated encoding.
    pub fn is_packable(self) -> bool
    {
        matches!(
            self.wire_type(),
            Some(WireType::Varint) | Some(WireType::Fixed64) | Some(WireType::Fixed32)
        )
    }

    /// Name of the type as written in `.proto` files.
    pub fn name(self) -> &'static str
    {
        match self {
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::UInt32 => "uint32",
            FieldType::UInt64 => "uint64",
            FieldType::SInt32 => "sint32",
            FieldType::SInt64 => "sint64",
            FieldType::Bool => "bool",
            FieldType::Enum => "enum",
            FieldType::Fixed64 => "fixed64",
            FieldType::SFixed64 => "sfixed64",
            FieldType::Double => "double",
            FieldType::Fixed32 => "fixed32",
            FieldType::SFixed32 => "sfixed32",
            FieldType::Float => "float",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
            FieldType::Message => "message",
            FieldType::Group => "group",
            FieldType::None => "none",
        }
    }
}

impl fmt::Display for FieldType
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Reasons a varint could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError
{
    /// The data ended before the last varint byte.
    Truncated,

    /// The varint continued past [`MAX_VARINT_LEN`] bytes.
    TooLong,
}

/// Reads a LEB128 varint from the start of `data`.
///
/// Returns the value and the number of bytes it occupied. Bits beyond 64 in the tenth byte are
/// dropped.
pub fn read_varint(data: &[u8]) -> Result<(u64, usize), VarintError>
{
    let mut result = 0u64;
    for (idx, b) in data.iter().enumerate() {
        if idx >= MAX_VARINT_LEN {
            return Err(VarintError::TooLong);
        }

        result |= u64::from(b & 0x7f) << (idx * 7);
        if b & 0x80 == 0 {
            return Ok((result, idx + 1));
        }
    }

    if data.len() >= MAX_VARINT_LEN {
        Err(VarintError::TooLong)
    } else {
        Err(VarintError::Truncated)
    }
}

/// A decoded field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag
{
    /// Field number.
    pub field_number: u64,

    /// Raw wire type, `0..=7`.
    pub wire_type: u8,

    /// Encoded length of the tag.
    pub len: usize,
}

/// Reads the tag at `offset`, looking at no more than `limit` bytes.
pub fn read_tag(data: &[u8], offset: usize, limit: usize) -> Result<Tag, DecodeError>
{
    let window = window(data, offset, limit);
    let (tag, len) = read_varint(window).map_err(|_| DecodeError::MalformedTag { offset })?;

    Ok(Tag {
        field_number: tag >> 3,
        wire_type: (tag & 0x07) as u8,
        len,
    })
}

/// Raw payload of a single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload
{
    /// Varint value.
    Varint(u64),

    /// 64-bit value.
    Fixed64(u64),

    /// 32-bit value.
    Fixed32(u32),

    /// Length-delimited bytes, without the length prefix.
    LengthDelimited(Bytes),
}

impl Payload
{
    /// The numeric payload. Length-delimited values have none.
    pub fn as_u64(&self) -> Option<u64>
    {
        match self {
            Payload::Varint(v) | Payload::Fixed64(v) => Some(*v),
            Payload::Fixed32(v) => Some(u64::from(*v)),
            Payload::LengthDelimited(..) => None,
        }
    }

    /// The wire type the payload was read as.
    pub fn wire_type(&self) -> WireType
    {
        match self {
            Payload::Varint(..) => WireType::Varint,
            Payload::Fixed64(..) => WireType::Fixed64,
            Payload::Fixed32(..) => WireType::Fixed32,
            Payload::LengthDelimited(..) => WireType::LengthDelimited,
        }
    }
}

/// A value located in the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted
{
    /// The value.
    pub payload: Payload,

    /// Length of the length prefix. Zero unless length-delimited.
    pub prefix_len: usize,

    /// Absolute span of the value bytes, excluding the length prefix.
    pub value_span: Span,
}

/// Extracts the value at `offset` according to the wire type. The value must end at or before
/// `end`.
pub fn extract_value(
    data: &Bytes,
    offset: usize,
    end: usize,
    wire_type: WireType,
) -> Result<Extracted, DecodeError>
{
    let end = end.min(data.len());
    let available = end.saturating_sub(offset);
    let window = window(data, offset, available);

    let fixed = |width: usize| -> Result<Span, DecodeError> {
        if available < width {
            return Err(DecodeError::Truncated {
                offset,
                needed: width as u64,
                available,
            });
        }
        Ok(Span::new(offset, offset + width))
    };

    match wire_type {
        WireType::Varint => {
            let (value, len) = read_varint(window).map_err(|e| match e {
                VarintError::Truncated => DecodeError::Truncated {
                    offset,
                    needed: available as u64 + 1,
                    available,
                },
                VarintError::TooLong => DecodeError::InvalidVarint { offset },
            })?;
            Ok(Extracted {
                payload: Payload::Varint(value),
                prefix_len: 0,
                value_span: Span::new(offset, offset + len),
            })
        }
        WireType::Fixed64 => {
            let span = fixed(8)?;
            Ok(Extracted {
                payload: Payload::Fixed64((&window[..8]).get_u64_le()),
                prefix_len: 0,
                value_span: span,
            })
        }
        WireType::Fixed32 => {
            let span = fixed(4)?;
            Ok(Extracted {
                payload: Payload::Fixed32((&window[..4]).get_u32_le()),
                prefix_len: 0,
                value_span: span,
            })
        }
        WireType::LengthDelimited => {
            let (length, prefix_len) = read_varint(window)
                .map_err(|_| DecodeError::MalformedLengthPrefix { offset })?;

            let start = offset + prefix_len;
            let remaining = end - start;
            if length > remaining as u64 {
                return Err(DecodeError::Truncated {
                    offset: start,
                    needed: length,
                    available: remaining,
                });
            }

            let span = Span::new(start, start + length as usize);
            Ok(Extracted {
                payload: Payload::LengthDelimited(data.slice(span.start..span.end)),
                prefix_len,
                value_span: span,
            })
        }
        WireType::StartGroup | WireType::EndGroup => Err(DecodeError::UnsupportedWireType {
            wire_type: wire_type.raw(),
        }),
    }
}

fn window(data: &[u8], offset: usize, limit: usize) -> &[u8]
{
    let start = offset.min(data.len());
    let end = offset.saturating_add(limit).min(data.len());
    &data[start..end]
}
