//!
//! Protospan decodes protocol buffer payloads into field trees where every field, value and packed
//! element carries the byte span it was read from. A schema is optional: with one, fields are
//! named and typed as declared; without one, the decoder guesses the most plausible
//! interpretation or lists every interpretation the wire type allows.
//!
//! Decoding never fails as a whole. Malformed data is reported as diagnostics on the field or
//! message it concerns and everything that could be decoded before it is kept.
//!
//! ```
//! use protospan::{DecodeOptions, Decoder, FieldType, Value};
//! use protospan::schema::{FieldInfo, SchemaPool};
//! use bytes::Bytes;
//!
//! let mut pool = SchemaPool::new();
//! let request = pool.insert_message("example.Request").unwrap();
//! pool.add_field(request, FieldInfo::new("id", 1, FieldType::Int32)).unwrap();
//! pool.add_field(request, FieldInfo::new("name", 2, FieldType::String)).unwrap();
//!
//! let data = Bytes::from_static(b"\x08\x96\x01\x12\x02hi");
//! let msg = pool.decode_message("example.Request", &data, &DecodeOptions::default());
//! assert_eq!(msg.fields[0].name.as_deref(), Some("id"));
//! assert_eq!(msg.fields[0].value, Value::Int32(150));
//! assert_eq!(msg.fields[1].value, Value::String(String::from("hi")));
//! assert_eq!((msg.fields[1].span.start, msg.fields[1].span.end), (3, 7));
//!
//! // Without a schema the same bytes are guessed.
//! let msg = Decoder::default().decode_schemaless(&data);
//! assert_eq!(msg.name, "unknown");
//! assert_eq!(msg.fields[0].field_type, FieldType::UInt32);
//! assert_eq!(msg.fields[0].value, Value::UInt32(150));
//! assert!(msg.is_complete());
//! ```
#![warn(missing_docs)]
#![allow(clippy::match_bool)]

pub mod decode;
mod display;
pub mod error;
pub mod heuristic;
pub mod options;
pub mod schema;
pub mod wire;

pub use decode::{
    Candidate, DecodedField, DecodedMessage, Decoder, EnumValue, PackedElement, UnknownValue,
    Value,
};
pub use error::{ConfigError, DecodeError, Diagnostic, Severity};
pub use options::DecodeOptions;
pub use schema::{SchemaPool, SharedSchema};
pub use wire::{FieldType, Span, WireType};
