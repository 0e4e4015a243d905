//! Protocol buffer binary payload decoding.
//!
//! The [`Decoder`] walks a message field by field. Each field is located by its tag and wire type,
//! then interpreted with the help of the message descriptor when one is available, or by guessing
//! otherwise. Every decoded field records the absolute span of its bytes.
//!
//! Decoding recovers from errors where the wire format allows it. A field that cannot be read
//! stops decoding of the enclosing message only; the fields before it are kept and the problem is
//! recorded as a [`Diagnostic`].

use crate::error::{DecodeError, Diagnostic, Severity};
use crate::heuristic::guess_type;
use crate::options::DecodeOptions;
use crate::schema::{
    EnumDescriptor, FieldDescriptor, MessageDescriptor, MessageHandle, SchemaPool, Schemaless,
};
use crate::wire::{extract_value, read_tag, Extracted, FieldType, Payload, Span, WireType};
use bytes::Bytes;
use tracing::{debug, trace};

mod packed;
mod scalar;

pub use packed::decode_packed;
pub use scalar::{decode_scalar, decode_with_candidates, zigzag_decode32, zigzag_decode64};

/// Name of messages decoded without a message type.
pub const UNKNOWN_MESSAGE: &str = "unknown";

/// Decoded protocol buffer value.
#[derive(Debug, PartialEq, Clone)]
pub enum Value
{
    /// `double` value.
    Double(f64),
    /// `float` value.
    Float(f32),
    /// `int32` value.
    Int32(i32),
    /// `int64` value.
    Int64(i64),
    /// `uint32` value.
    UInt32(u32),
    /// `uint64` value.
    UInt64(u64),
    /// `sint32` value.
    SInt32(i32),
    /// `sint64` value.
    SInt64(i64),
    /// `fixed32` value.
    Fixed32(u32),
    /// `fixed64` value.
    Fixed64(u64),
    /// `sfixed32` value.
    SFixed32(i32),
    /// `sfixed64` value.
    SFixed64(i64),
    /// `bool` value.
    Bool(bool),
    /// `string` value.
    String(String),
    /// `bytes` value.
    Bytes(Bytes),

    /// Enum value.
    Enum(EnumValue),

    /// Elements of a packed repeated field.
    Packed(Vec<PackedElement>),

    /// Embedded message.
    Message(Box<DecodedMessage>),

    /// Value which was incomplete due to missing bytes in the payload.
    Incomplete(Bytes),

    /// Value that was not interpreted.
    ///
    /// Fields without a schema, fields whose schema did not match the data and embedded messages
    /// of unknown type keep their raw payload here.
    Unknown(UnknownValue),
}

/// Raw value by wire type.
#[derive(Debug, PartialEq, Clone)]
pub enum UnknownValue
{
    /// Varint (wire type = 0).
    Varint(u64),

    /// 64-bit value (wire type = 1).
    Fixed64(u64),

    /// Variable length value (wire type = 2).
    VariableLength(Bytes),

    /// 32-bit value (wire type = 5).
    Fixed32(u32),
}

impl UnknownValue
{
    pub(crate) fn from_payload(payload: &Payload) -> Self
    {
        match payload {
            Payload::Varint(v) => UnknownValue::Varint(*v),
            Payload::Fixed64(v) => UnknownValue::Fixed64(*v),
            Payload::Fixed32(v) => UnknownValue::Fixed32(*v),
            Payload::LengthDelimited(b) => UnknownValue::VariableLength(b.clone()),
        }
    }
}

/// Enum value.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EnumValue
{
    /// Numeric value.
    pub number: i32,

    /// Symbolic name, if the enum type defines the number.
    pub name: Option<String>,
}

/// One element of a packed repeated field.
#[derive(Debug, PartialEq, Clone)]
pub struct PackedElement
{
    /// Absolute span of the element bytes.
    pub span: Span,

    /// Element value.
    pub value: Value,
}

/// One interpretation of a field without schema.
#[derive(Debug, PartialEq, Clone)]
pub struct Candidate
{
    /// The type the value was decoded as.
    pub field_type: FieldType,

    /// The value, or why the value is not valid for the type.
    pub value: Result<Value, DecodeError>,
}

/// Message value.
#[derive(Debug, PartialEq, Clone)]
pub struct DecodedMessage
{
    /// Full name of the message type, or [`UNKNOWN_MESSAGE`].
    pub name: String,

    /// Absolute span of the message bytes.
    pub span: Span,

    /// Fields in wire order.
    pub fields: Vec<DecodedField>,

    /// Garbage data at the end of the message.
    ///
    /// The garbage data did not start with a valid tag and for that reason cannot be placed into
    /// the `fields` vector.
    pub garbage: Option<Bytes>,

    /// Problems that concern the message rather than a single field.
    pub diagnostics: Vec<Diagnostic>,
}

/// Field value.
#[derive(Debug, PartialEq, Clone)]
pub struct DecodedField
{
    /// Field number.
    pub number: u64,

    /// Wire type from the tag.
    pub wire_type: WireType,

    /// Absolute span of the whole field: tag, length prefix and value.
    pub span: Span,

    /// Field name from the schema.
    pub name: Option<String>,

    /// The type the value was decoded as. [`FieldType::None`] if the value was not interpreted.
    pub field_type: FieldType,

    /// Field value.
    pub value: Value,

    /// Every interpretation of the value, when decoding with
    /// [`show_all_candidate_types`](DecodeOptions::show_all_candidate_types).
    pub candidates: Vec<Candidate>,

    /// Problems found decoding the field.
    pub diagnostics: Vec<Diagnostic>,
}

impl Value
{
    /// The embedded message, if the value is one.
    pub fn as_message(&self) -> Option<&DecodedMessage>
    {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }
}

impl DecodedMessage
{
    /// Gets the first field with the number.
    pub fn get_field(&self, number: u64) -> Option<&DecodedField>
    {
        self.fields.iter().find(|f| f.number == number)
    }

    /// Iterates all fields with the number in wire order.
    pub fn fields_by_number(&self, number: u64) -> impl Iterator<Item = &DecodedField>
    {
        self.fields.iter().filter(move |f| f.number == number)
    }

    /// Diagnostics of the message, its fields and all embedded messages.
    pub fn all_diagnostics(&self) -> Vec<&Diagnostic>
    {
        let mut output: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        for field in &self.fields {
            output.extend(field.all_diagnostics());
        }
        output
    }

    /// True, if the message and its embedded messages decoded without errors.
    pub fn is_complete(&self) -> bool
    {
        self.all_diagnostics()
            .iter()
            .all(|d| d.severity() == Severity::Info)
    }
}

impl DecodedField
{
    /// Diagnostics of the field and of an embedded message in it.
    pub fn all_diagnostics(&self) -> Vec<&Diagnostic>
    {
        let mut output: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        if let Value::Message(m) = &self.value {
            output.extend(m.all_diagnostics());
        }
        output
    }
}

enum Step
{
    /// The field was decoded and the next one follows it.
    Field(DecodedField),

    /// The field value could not be read. Nothing after it can be located.
    Halt(DecodedField),

    /// No tag could be read.
    Garbage(Diagnostic),
}

/// Decodes payloads into [`DecodedMessage`] trees.
///
/// The decoder holds no state besides its options, so a single decoder may be shared between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder
{
    options: DecodeOptions,
}

impl Decoder
{
    /// Create a decoder.
    pub fn new(options: DecodeOptions) -> Self
    {
        Decoder { options }
    }

    /// The decoding options.
    pub fn options(&self) -> &DecodeOptions
    {
        &self.options
    }

    /// Decodes the whole buffer as a message of the given type.
    pub fn decode<M: MessageDescriptor>(&self, data: &Bytes, message: Option<M>) -> DecodedMessage
    {
        self.decode_window(data, 0, data.len(), message)
    }

    /// Decodes the whole buffer without schema.
    pub fn decode_schemaless(&self, data: &Bytes) -> DecodedMessage
    {
        self.decode::<Schemaless>(data, None)
    }

    /// Decodes `length` bytes starting at `offset` as a message of the given type.
    ///
    /// Spans in the result are relative to the start of `data`. A window reaching past the end of
    /// the buffer is cut short and reported as truncated.
    pub fn decode_window<M: MessageDescriptor>(
        &self,
        data: &Bytes,
        offset: usize,
        length: usize,
        message: Option<M>,
    ) -> DecodedMessage
    {
        let start = offset.min(data.len());
        let requested_end = offset.saturating_add(length);
        let end = requested_end.min(data.len());
        let span = Span::new(start, end);

        let mut msg = self.decode_message(data, span, message.as_ref(), 0);
        if requested_end > data.len() {
            debug!(offset, length, available = span.len(), "Decode window exceeds the buffer");
            msg.diagnostics.insert(
                0,
                Diagnostic::new(
                    span,
                    DecodeError::Truncated {
                        offset: start,
                        needed: length as u64,
                        available: span.len(),
                    },
                ),
            );
        }

        msg
    }

    fn decode_message<M: MessageDescriptor>(
        &self,
        data: &Bytes,
        span: Span,
        message: Option<&M>,
        depth: usize,
    ) -> DecodedMessage
    {
        let mut msg = DecodedMessage {
            name: message
                .map(|m| m.full_name().to_string())
                .unwrap_or_else(|| UNKNOWN_MESSAGE.to_string()),
            span,
            fields: vec![],
            garbage: None,
            diagnostics: vec![],
        };

        let mut offset = span.start;
        while offset < span.end {
            match self.decode_field(data, offset, span.end, message, depth) {
                Step::Field(field) => {
                    offset = field.span.end;
                    msg.fields.push(field);
                }
                Step::Halt(field) => {
                    debug!(
                        message_type = %msg.name,
                        number = field.number,
                        offset,
                        "Field value could not be read, stopping"
                    );
                    msg.fields.push(field);
                    break;
                }
                Step::Garbage(diagnostic) => {
                    debug!(message_type = %msg.name, offset, error = %diagnostic.error, "Stopping at garbage");
                    msg.garbage = Some(data.slice(offset..span.end));
                    msg.diagnostics.push(diagnostic);
                    break;
                }
            }
        }

        msg
    }

    fn decode_field<M: MessageDescriptor>(
        &self,
        data: &Bytes,
        offset: usize,
        end: usize,
        message: Option<&M>,
        depth: usize,
    ) -> Step
    {
        let tag = match read_tag(data, offset, end - offset) {
            Ok(tag) => tag,
            Err(e) => return Step::Garbage(Diagnostic::new(Span::new(offset, end), e)),
        };

        let wire_type = match WireType::from_raw(tag.wire_type) {
            Some(wire_type) => wire_type,
            None => {
                return Step::Garbage(Diagnostic::new(
                    Span::new(offset, end),
                    DecodeError::UnsupportedWireType {
                        wire_type: tag.wire_type,
                    },
                ))
            }
        };

        let descriptor = message.and_then(|m| m.find_field(tag.field_number));
        let value_offset = offset + tag.len;
        let mut field = DecodedField {
            number: tag.field_number,
            wire_type,
            span: Span::new(offset, value_offset),
            name: descriptor.as_ref().map(|d| d.name().to_string()),
            field_type: descriptor
                .as_ref()
                .map(|d| d.field_type())
                .unwrap_or(FieldType::None),
            value: Value::Incomplete(Bytes::new()),
            candidates: vec![],
            diagnostics: vec![],
        };

        let extracted = match extract_value(data, value_offset, end, wire_type) {
            Ok(extracted) => extracted,
            Err(e) => {
                field.span = Span::new(offset, end);
                field.value = Value::Incomplete(data.slice(value_offset..end));
                field.diagnostics.push(Diagnostic::new(field.span, e));
                return Step::Halt(field);
            }
        };
        field.span = Span::new(offset, extracted.value_span.end);

        match &descriptor {
            Some(d) => self.decode_described::<M>(&mut field, d, &extracted, data, depth),
            None if self.options.show_all_candidate_types => {
                field.candidates = decode_with_candidates(&extracted, &self.options);
                field.value = Value::Unknown(UnknownValue::from_payload(&extracted.payload));
            }
            None => self.decode_guessed(&mut field, &extracted),
        }

        trace!(
            number = field.number,
            wire_type = %wire_type,
            span = %field.span,
            field_type = %field.field_type,
            "Decoded field"
        );
        Step::Field(field)
    }

    fn decode_guessed(&self, field: &mut DecodedField, extracted: &Extracted)
    {
        let guess = guess_type(field.wire_type, extracted.payload.as_u64(), &self.options);
        field.field_type = guess;

        // Guessed integers take the raw value of any numeric wire type.
        field.value = match (guess, extracted.payload.as_u64()) {
            (FieldType::UInt32, Some(v)) => Value::UInt32(v as u32),
            (FieldType::UInt64, Some(v)) => Value::UInt64(v),
            _ => match decode_scalar::<Schemaless>(
                guess,
                &extracted.payload,
                extracted.value_span.len(),
                None,
                &self.options,
            ) {
                Ok(value) => value,
                Err(e) => {
                    field
                        .diagnostics
                        .push(Diagnostic::new(extracted.value_span, e));
                    Value::Unknown(UnknownValue::from_payload(&extracted.payload))
                }
            },
        };
    }

    fn decode_described<M: MessageDescriptor>(
        &self,
        field: &mut DecodedField,
        descriptor: &M::Field,
        extracted: &Extracted,
        data: &Bytes,
        depth: usize,
    )
    {
        let declared = descriptor.field_type();
        let enum_type = descriptor.enum_type();
        let value_span = extracted.value_span;
        let raw = || Value::Unknown(UnknownValue::from_payload(&extracted.payload));

        // Repeated scalars are accepted packed even if the schema didn't ask for it.
        if field.wire_type == WireType::LengthDelimited
            && descriptor.is_repeated()
            && (descriptor.is_packed() || declared.is_packable())
        {
            match decode_packed(
                &data[value_span.start..value_span.end],
                value_span.start,
                declared,
                enum_type.as_ref(),
                &self.options,
            ) {
                Ok(elements) => {
                    if let Some(e) = &enum_type {
                        for element in &elements {
                            note_unresolved_enum(field, e, &element.value, element.span);
                        }
                    }
                    field.value = Value::Packed(elements);
                }
                Err(e) => {
                    debug!(number = field.number, error = %e, "Keeping packed field as raw bytes");
                    field.diagnostics.push(Diagnostic::new(value_span, e));
                    field.value = raw();
                }
            }
            return;
        }

        if declared == FieldType::Message && field.wire_type == WireType::LengthDelimited {
            field.value = match descriptor.message_type() {
                Some(_) if depth >= self.options.max_depth => {
                    debug!(number = field.number, depth, "Message nesting too deep");
                    field.diagnostics.push(Diagnostic::new(
                        value_span,
                        DecodeError::RecursionLimitExceeded {
                            depth: self.options.max_depth,
                        },
                    ));
                    raw()
                }
                Some(nested) => Value::Message(Box::new(self.decode_message(
                    data,
                    value_span,
                    Some(&nested),
                    depth + 1,
                ))),
                None => {
                    debug!(number = field.number, "Message type not found");
                    field.diagnostics.push(Diagnostic::new(
                        value_span,
                        DecodeError::MessageTypeUnresolved {
                            name: descriptor.name().to_string(),
                        },
                    ));
                    raw()
                }
            };
            return;
        }

        match decode_scalar(
            declared,
            &extracted.payload,
            value_span.len(),
            enum_type.as_ref(),
            &self.options,
        ) {
            Ok(value) => {
                if let Some(e) = &enum_type {
                    note_unresolved_enum(field, e, &value, value_span);
                }
                field.value = value;
            }
            Err(e) => {
                debug!(number = field.number, error = %e, "Keeping field as raw value");
                field.diagnostics.push(Diagnostic::new(value_span, e));
                field.value = raw();
            }
        }
    }
}

fn note_unresolved_enum<E: EnumDescriptor>(
    field: &mut DecodedField,
    enum_type: &E,
    value: &Value,
    span: Span,
)
{
    if let Value::Enum(EnumValue { number, name: None }) = value {
        field.diagnostics.push(Diagnostic::new(
            span,
            DecodeError::EnumValueUnresolved {
                enum_name: enum_type.full_name().to_string(),
                value: *number,
            },
        ));
    }
}

impl SchemaPool
{
    /// Decodes a message of the named type.
    ///
    /// If the pool has no such message type, the data is decoded without schema and the message
    /// carries a `MessageTypeUnresolved` diagnostic.
    pub fn decode_message(&self, full_name: &str, data: &Bytes, options: &DecodeOptions)
        -> DecodedMessage
    {
        let decoder = Decoder::new(options.clone());
        match self.get_message(full_name) {
            Some(message) => decoder.decode(data, Some(message)),
            None => {
                debug!(name = full_name, "Message type not found, decoding without schema");
                let mut msg = decoder.decode_schemaless(data);
                msg.diagnostics.insert(
                    0,
                    Diagnostic::new(
                        msg.span,
                        DecodeError::MessageTypeUnresolved {
                            name: full_name.to_string(),
                        },
                    ),
                );
                msg
            }
        }
    }
}

impl<'a> MessageHandle<'a>
{
    /// Decodes a message of this type.
    pub fn decode(self, data: &Bytes, options: &DecodeOptions) -> DecodedMessage
    {
        Decoder::new(options.clone()).decode(data, Some(self))
    }
}

#[cfg(test)]
mod test
{
    use super::*;

    fn decode(data: &'static [u8]) -> DecodedMessage
    {
        Decoder::default().decode_schemaless(&Bytes::from_static(data))
    }

    #[test]
    fn empty_message()
    {
        let msg = decode(b"");
        assert_eq!(msg.name, UNKNOWN_MESSAGE);
        assert!(msg.fields.is_empty());
        assert!(msg.is_complete());
    }

    #[test]
    fn cursor_advances_by_field_length()
    {
        let msg = decode(b"\x08\x96\x01\x12\x02hi\x1d\x01\x00\x00\x00\x21\x02\x00\x00\x00\x00\x00\x00\x00");
        let spans: Vec<_> = msg.fields.iter().map(|f| f.span).collect();
        assert_eq!(
            spans,
            vec![
                Span::new(0, 3),
                Span::new(3, 7),
                Span::new(7, 12),
                Span::new(12, 21)
            ]
        );
        assert_eq!(msg.fields[2].value, Value::UInt32(1));
        assert_eq!(msg.fields[3].value, Value::UInt32(2));
        assert!(msg.is_complete());
    }

    #[test]
    fn fields_by_number()
    {
        let options = DecodeOptions::default().with_max_depth(7);
        let decoder = Decoder::new(options.clone());
        assert_eq!(decoder.options(), &options);

        let msg = decoder.decode_schemaless(&Bytes::from_static(b"\x08\x01\x10\x02\x08\x03"));
        assert_eq!(msg.get_field(1).map(|f| f.span), Some(Span::new(0, 2)));
        assert!(msg.get_field(3).is_none());
        assert_eq!(
            msg.fields_by_number(1)
                .map(|f| f.value.clone())
                .collect::<Vec<_>>(),
            vec![Value::UInt32(1), Value::UInt32(3)]
        );
    }

    #[test]
    fn invalid_wire_type_is_garbage()
    {
        let msg = decode(b"\x08\x01\x0e\x01");
        assert_eq!(msg.fields.len(), 1);
        assert_eq!(msg.garbage, Some(Bytes::from_static(b"\x0e\x01")));
        assert_eq!(
            msg.diagnostics[0].error,
            DecodeError::UnsupportedWireType { wire_type: 6 }
        );
    }

    #[test]
    fn group_halts()
    {
        let msg = decode(b"\x08\x01\x0b\x08\x01\x0c");
        assert_eq!(msg.fields.len(), 2);
        assert_eq!(msg.fields[1].wire_type, WireType::StartGroup);
        assert_eq!(msg.fields[1].span, Span::new(2, 6));
        assert_eq!(
            msg.fields[1].value,
            Value::Incomplete(Bytes::from_static(b"\x08\x01\x0c"))
        );
        assert_eq!(
            msg.fields[1].diagnostics[0].error,
            DecodeError::UnsupportedWireType { wire_type: 3 }
        );
        assert!(!msg.is_complete());
    }

    #[test]
    fn window()
    {
        let data = Bytes::from_static(b"\xff\xff\x08\x01\x10\x02\xff");
        let msg = Decoder::default().decode_window::<Schemaless>(&data, 2, 4, None);
        assert_eq!(msg.span, Span::new(2, 6));
        assert_eq!(msg.fields.len(), 2);
        assert_eq!(msg.fields[0].span, Span::new(2, 4));
        assert_eq!(msg.fields[1].span, Span::new(4, 6));
        assert!(msg.is_complete());

        let msg = Decoder::default().decode_window::<Schemaless>(&data, 2, 100, None);
        assert_eq!(msg.span, Span::new(2, 7));
        assert!(matches!(
            msg.diagnostics[0].error,
            DecodeError::Truncated { offset: 2, .. }
        ));
    }
}
