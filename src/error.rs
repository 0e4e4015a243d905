//! Decode diagnostics and configuration errors.

use crate::wire::{FieldType, Span, WireType};
use snafu::Snafu;
use std::fmt;

/// Problems found while decoding a payload.
///
/// Decoding never fails as a whole. Each problem is reported as a [`Diagnostic`] attached to the
/// field or message it concerns, and the decoder recovers as far as the wire format allows.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum DecodeError
{
    /// No valid varint tag could be read.
    #[snafu(display("Failed to parse tag at offset {}", offset))]
    MalformedTag
    {
        /// Offset of the first tag byte.
        offset: usize,
    },

    /// The length prefix of a length-delimited field could not be read.
    #[snafu(display("Failed to parse length prefix at offset {}", offset))]
    MalformedLengthPrefix
    {
        /// Offset of the first length prefix byte.
        offset: usize,
    },

    /// The value extends past the end of the available data.
    #[snafu(display(
        "Value at offset {} needs {} bytes but only {} are available",
        offset,
        needed,
        available
    ))]
    Truncated
    {
        /// Offset where the value starts.
        offset: usize,

        /// Bytes required by the value.
        needed: u64,

        /// Bytes that remained.
        available: usize,
    },

    /// A varint continued for more than ten bytes.
    #[snafu(display("Varint at offset {} is longer than 10 bytes", offset))]
    InvalidVarint
    {
        /// Offset of the first varint byte.
        offset: usize,
    },

    /// Deprecated group wire types and the reserved wire types 6 and 7.
    #[snafu(display("Unsupported wire type {}", wire_type))]
    UnsupportedWireType
    {
        /// Raw wire type from the tag.
        wire_type: u8,
    },

    /// A boolean value was encoded with more than one byte.
    #[snafu(display("Boolean value uses {} bytes", length))]
    InvalidBoolLength
    {
        /// Encoded length of the value.
        length: usize,
    },

    /// The field type cannot be packed.
    #[snafu(display("Field type {} does not support packed repeated encoding", field_type))]
    WireTypeNotPackable
    {
        /// Declared field type.
        field_type: FieldType,
    },

    /// The packed repeated payload did not decode cleanly.
    #[snafu(display("Failed to parse packed repeated {} field: {}", field_type, detail))]
    PackedRepeatedDecodeFailure
    {
        /// Declared element type.
        field_type: FieldType,

        /// What went wrong.
        detail: String,
    },

    /// The message type of an embedded message is not known.
    #[snafu(display("Message type of '{}' could not be resolved", name))]
    MessageTypeUnresolved
    {
        /// Field or type name that failed to resolve.
        name: String,
    },

    /// The enum has no value with the decoded number.
    #[snafu(display("Enum '{}' has no value {}", enum_name, value))]
    EnumValueUnresolved
    {
        /// Full name of the enum.
        enum_name: String,

        /// Decoded number.
        value: i32,
    },

    /// The schema declares a type that is encoded with a different wire type.
    #[snafu(display("Expected wire type {} but found {}", expected, actual))]
    WireTypeMismatch
    {
        /// Wire type implied by the declared field type.
        expected: WireType,

        /// Wire type found in the tag.
        actual: WireType,
    },

    /// Embedded messages nest deeper than the configured limit.
    #[snafu(display("Message nesting exceeds the depth limit of {}", depth))]
    RecursionLimitExceeded
    {
        /// Configured depth limit.
        depth: usize,
    },
}

/// How serious a [`DecodeError`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity
{
    /// Display only fallback. The data itself is well formed.
    Info,

    /// Malformed or unsupported data.
    Error,
}

impl DecodeError
{
    /// Severity of the error.
    pub fn severity(&self) -> Severity
    {
        match self {
            DecodeError::MessageTypeUnresolved { .. }
            | DecodeError::EnumValueUnresolved { .. }
            | DecodeError::WireTypeMismatch { .. } => Severity::Info,
            _ => Severity::Error,
        }
    }
}

/// A decode problem together with the bytes it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic
{
    /// Absolute span of the bytes the diagnostic concerns.
    pub span: Span,

    /// The problem.
    pub error: DecodeError,
}

impl Diagnostic
{
    /// Create a new diagnostic.
    pub fn new(span: Span, error: DecodeError) -> Self
    {
        Self { span, error }
    }

    /// Severity of the underlying error.
    pub fn severity(&self) -> Severity
    {
        self.error.severity()
    }
}

impl fmt::Display for Diagnostic
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        let level = match self.severity() {
            Severity::Info => "info",
            Severity::Error => "error",
        };
        write!(f, "[{}] {} ({})", level, self.error, self.span)
    }
}

/// Error loading [`DecodeOptions`](crate::DecodeOptions).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ConfigError
{
    /// The options file could not be read.
    #[snafu(display("Failed to read options file {}: {}", path.display(), source))]
    ReadOptions
    {
        /// Path of the options file.
        path: std::path::PathBuf,

        /// Source error.
        source: std::io::Error,
    },

    /// The options document is not valid TOML or has unknown keys.
    #[snafu(display("Invalid options: {}", source))]
    InvalidOptions
    {
        /// Source error.
        source: toml::de::Error,
    },
}
