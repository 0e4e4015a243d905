//! Text rendering of decoded messages.
//!
//! A message renders as an indented tree:
//!
//! ```text
//! example.Request (0..9)
//!   Field(1): id = 150 (int32)
//!   Field(2): name = "hi" (string)
//!   Field(3): <unknown> = 0a01 (none)
//!     ! [error] ...
//! ```

use crate::decode::{Candidate, DecodedField, DecodedMessage, UnknownValue, Value};
use std::fmt;

const INDENT: &str = "  ";

impl fmt::Display for UnknownValue
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            UnknownValue::Varint(v) => write!(f, "{}", v),
            UnknownValue::Fixed64(v) => write!(f, "0x{:016x}", v),
            UnknownValue::Fixed32(v) => write!(f, "0x{:08x}", v),
            UnknownValue::VariableLength(b) => f.write_str(&hex::encode(b)),
        }
    }
}

impl fmt::Display for Value
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            Value::Double(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::SInt32(v) => write!(f, "{}", v),
            Value::SInt64(v) => write!(f, "{}", v),
            Value::Fixed32(v) => write!(f, "{}", v),
            Value::Fixed64(v) => write!(f, "{}", v),
            Value::SFixed32(v) => write!(f, "{}", v),
            Value::SFixed64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => f.write_str(&hex::encode(b)),
            Value::Enum(e) => match &e.name {
                Some(name) => write!(f, "{}({})", name, e.number),
                None => write!(f, "{}", e.number),
            },
            Value::Packed(elements) => {
                f.write_str("[")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element.value)?;
                }
                f.write_str("]")
            }
            Value::Message(m) => write!(f, "{} ({})", m.name, m.span),
            Value::Incomplete(b) => write!(f, "incomplete {}", hex::encode(b)),
            Value::Unknown(u) => write!(f, "{}", u),
        }
    }
}

fn write_candidates(f: &mut fmt::Formatter, candidates: &[Candidate]) -> fmt::Result
{
    let mut first = true;
    for candidate in candidates {
        // Types the value is not valid for are left out.
        if let Ok(value) = &candidate.value {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", candidate.field_type, value)?;
            first = false;
        }
    }
    Ok(())
}

fn write_field(f: &mut fmt::Formatter, field: &DecodedField, depth: usize) -> fmt::Result
{
    let indent = INDENT.repeat(depth);
    write!(
        f,
        "{}Field({}): {} = ",
        indent,
        field.number,
        field.name.as_deref().unwrap_or("<unknown>")
    )?;

    match field.candidates.is_empty() {
        true => write!(f, "{} ({})", field.value, field.field_type)?,
        false => {
            write_candidates(f, &field.candidates)?;
            write!(f, " ({})", field.wire_type)?;
        }
    }
    writeln!(f)?;

    for diagnostic in &field.diagnostics {
        writeln!(f, "{}{}! {}", indent, INDENT, diagnostic)?;
    }

    if let Value::Message(m) = &field.value {
        write_body(f, m, depth + 1)?;
    }

    Ok(())
}

fn write_body(f: &mut fmt::Formatter, msg: &DecodedMessage, depth: usize) -> fmt::Result
{
    let indent = INDENT.repeat(depth);
    for diagnostic in &msg.diagnostics {
        writeln!(f, "{}! {}", indent, diagnostic)?;
    }

    for field in &msg.fields {
        write_field(f, field, depth)?;
    }

    if let Some(garbage) = &msg.garbage {
        writeln!(f, "{}garbage: {}", indent, hex::encode(garbage))?;
    }

    Ok(())
}

impl fmt::Display for DecodedField
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write_field(f, self, 0)
    }
}

impl fmt::Display for DecodedMessage
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        writeln!(f, "{} ({})", self.name, self.span)?;
        write_body(f, self, 1)
    }
}
