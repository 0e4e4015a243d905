//! Schema information used to name and type decoded fields.
//!
//! The decoder does not care where the schema comes from. It only needs the lookups described by
//! the descriptor traits in this module. [`SchemaPool`] is an in-memory implementation that is
//! assembled by hand, and [`Schemaless`] stands in when no schema is available at all.

use crate::wire::FieldType;

mod api;
mod modify_api;
mod pool;
mod shared;

pub use api::{EnumHandle, FieldHandle, MessageHandle, MethodHandle};
pub use pool::*;
pub use shared::SharedSchema;

/// An enum type.
pub trait EnumDescriptor
{
    /// Full enum name, including the package.
    fn full_name(&self) -> &str;

    /// Name of the enum value with the given number.
    fn find_value(&self, number: i32) -> Option<&str>;
}

/// A field of a message type.
pub trait FieldDescriptor
{
    /// Message descriptor type for embedded messages.
    type Message: MessageDescriptor;

    /// Enum descriptor type for enum fields.
    type Enum: EnumDescriptor;

    /// Field name.
    fn name(&self) -> &str;

    /// Field number.
    fn number(&self) -> u64;

    /// Declared type.
    fn field_type(&self) -> FieldType;

    /// True, if the field is `repeated`.
    fn is_repeated(&self) -> bool;

    /// True, if the field uses packed encoding.
    fn is_packed(&self) -> bool;

    /// The enum type for `enum` fields.
    fn enum_type(&self) -> Option<Self::Enum>;

    /// The message type for embedded message fields.
    fn message_type(&self) -> Option<Self::Message>;
}

/// A message type.
pub trait MessageDescriptor: Sized
{
    /// Field descriptor type.
    type Field: FieldDescriptor<Message = Self>;

    /// Full message name, including the package.
    fn full_name(&self) -> &str;

    /// Looks up a field by its number.
    fn find_field(&self, number: u64) -> Option<Self::Field>;
}

/// An RPC method.
pub trait MethodDescriptor
{
    /// Message descriptor type.
    type Message: MessageDescriptor;

    /// Full method name, `package.Service.Method`.
    fn full_name(&self) -> &str;

    /// Request message type.
    fn input_type(&self) -> Self::Message;

    /// Response message type.
    fn output_type(&self) -> Self::Message;
}

/// A catalog of types that message descriptors can be looked up from.
pub trait DescriptorPool
{
    /// Message descriptor type.
    type Message: MessageDescriptor;

    /// Method descriptor type.
    type Method: MethodDescriptor<Message = Self::Message>;

    /// Looks up a message type by its full name.
    fn find_message_type(&self, full_name: &str) -> Option<Self::Message>;

    /// Looks up a method by its full name, `package.Service.Method`.
    fn find_method(&self, full_method_name: &str) -> Option<Self::Method>;
}

/// The absence of a schema.
///
/// `Schemaless` has no values, so `Option<Schemaless>` is always `None`. It lets schema-less
/// decoding go through the same code path as decoding with a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schemaless {}

impl EnumDescriptor for Schemaless
{
    fn full_name(&self) -> &str
    {
        match *self {}
    }

    fn find_value(&self, _: i32) -> Option<&str>
    {
        match *self {}
    }
}

impl FieldDescriptor for Schemaless
{
    type Message = Schemaless;
    type Enum = Schemaless;

    fn name(&self) -> &str
    {
        match *self {}
    }

    fn number(&self) -> u64
    {
        match *self {}
    }

    fn field_type(&self) -> FieldType
    {
        match *self {}
    }

    fn is_repeated(&self) -> bool
    {
        match *self {}
    }

    fn is_packed(&self) -> bool
    {
        match *self {}
    }

    fn enum_type(&self) -> Option<Schemaless>
    {
        match *self {}
    }

    fn message_type(&self) -> Option<Schemaless>
    {
        match *self {}
    }
}

impl MessageDescriptor for Schemaless
{
    type Field = Schemaless;

    fn full_name(&self) -> &str
    {
        match *self {}
    }

    fn find_field(&self, _: u64) -> Option<Schemaless>
    {
        match *self {}
    }
}
