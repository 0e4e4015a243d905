use crate::wire::FieldType;
use snafu::Snafu;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct InternalRef(pub(crate) usize);

/// A reference to a message. Can be resolved to a [`MessageHandle`](super::MessageHandle)
/// through a `SchemaPool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub(crate) InternalRef);

/// A reference to an enum. Can be resolved to an [`EnumHandle`](super::EnumHandle) through a
/// `SchemaPool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumRef(pub(crate) InternalRef);

/// A reference to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceRef(pub(crate) InternalRef);

/// Error inserting a type into the pool.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InsertError
{
    /// A type or service with the same full name already exists.
    #[snafu(display("Type '{}' already exists", name))]
    TypeExists
    {
        /// The conflicting name.
        name: String,
    },
}

/// Error adding a member to a type.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum MemberInsertError
{
    /// A member with the same number already exists.
    NumberConflict,

    /// A member with the same name already exists.
    NameConflict,

    /// The type reference does not match the declared field type.
    InvalidTypeRef,
}

/// In-memory schema.
///
/// The pool is built up front through the insert methods and is read-only from then on. Share it
/// behind an `Arc`, or through a [`SharedSchema`](super::SharedSchema) when it needs to be
/// replaced while decoding continues.
#[derive(Default, Debug, PartialEq)]
pub struct SchemaPool
{
    pub(crate) messages: Vec<MessageInfo>,
    pub(crate) enums: Vec<EnumInfo>,
    pub(crate) services: Vec<ServiceInfo>,
    pub(crate) types_by_name: HashMap<String, TypeRef>,
    pub(crate) services_by_name: HashMap<String, usize>,
}

/// Type reference that references either message or enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef
{
    /// Message type reference.
    Message(MessageRef),

    /// Enum type reference.
    Enum(EnumRef),
}

/// Message details.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct MessageInfo
{
    /// Full message name, including package and parent type names.
    pub full_name: String,

    /// `MessageRef` that references this message.
    pub self_ref: MessageRef,

    // Using BTreeMap here to ensure ordering.
    pub(crate) fields: BTreeMap<u64, FieldInfo>,
    pub(crate) fields_by_name: BTreeMap<String, u64>,
}

/// Message field details.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct FieldInfo
{
    /// Field name.
    pub name: String,

    /// Field number.
    pub number: u64,

    /// Declared type.
    pub field_type: FieldType,

    /// Repeated and packed flags.
    pub multiplicity: Multiplicity,

    /// The message or enum type for `message` and `enum` fields.
    pub type_ref: Option<TypeRef>,
}

/// Defines the multiplicity of the field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity
{
    /// Field is not repeated.
    Single,

    /// Field may be repeated.
    Repeated,

    /// Field is repeated by packing.
    RepeatedPacked,
}

/// Enum details.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct EnumInfo
{
    /// Full enum name, including package and parent type names.
    pub full_name: String,

    /// `EnumRef` that references this enum.
    pub self_ref: EnumRef,

    pub(crate) values_by_number: BTreeMap<i32, String>,
    pub(crate) values_by_name: BTreeMap<String, i32>,
}

/// Service details.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct ServiceInfo
{
    /// Full service name, including the package name.
    pub full_name: String,

    /// Service self reference.
    pub self_ref: ServiceRef,

    /// Methods defined in the service.
    pub methods: Vec<MethodInfo>,

    pub(crate) methods_by_name: HashMap<String, usize>,
}

/// RPC method details.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct MethodInfo
{
    /// Method name without the service.
    pub name: String,

    /// Full method name, `package.Service.Method`.
    pub full_name: String,

    /// Request message type.
    pub input: MessageRef,

    /// Response message type.
    pub output: MessageRef,
}
