use super::*;

impl SchemaPool
{
    /// Gets a message type by full name.
    pub fn get_message(&self, full_name: &str) -> Option<MessageHandle<'_>>
    {
        match self.types_by_name.get(full_name) {
            Some(TypeRef::Message(m)) => Some(self.resolve_message(*m)),
            _ => None,
        }
    }

    /// Gets an enum type by full name.
    pub fn get_enum(&self, full_name: &str) -> Option<EnumHandle<'_>>
    {
        match self.types_by_name.get(full_name) {
            Some(TypeRef::Enum(e)) => Some(self.resolve_enum(*e)),
            _ => None,
        }
    }

    /// Gets a service by full name.
    pub fn get_service(&self, full_name: &str) -> Option<&ServiceInfo>
    {
        self.services_by_name
            .get(full_name)
            .map(|idx| &self.services[*idx])
    }

    /// Gets a method by its full name.
    ///
    /// Both `package.Service.Method` and the gRPC path form `/package.Service/Method` are
    /// accepted.
    pub fn get_method(&self, full_method_name: &str) -> Option<MethodHandle<'_>>
    {
        let name = full_method_name.trim_start_matches('/').replace('/', ".");
        let (service_name, method_name) = name.rsplit_once('.')?;
        let service = self.get_service(service_name)?;
        let method = service
            .methods_by_name
            .get(method_name)
            .map(|idx| &service.methods[*idx])?;

        Some(MethodHandle {
            pool: self,
            service,
            method,
        })
    }

    /// Resolves a message reference.
    ///
    /// Will **panic** if the message defined by the `MessageRef` does not exist in this pool.
    /// Such panic means the `MessageRef` came from a different pool. The panic is not
    /// guaranteed, as a message with an equal `MessageRef` may exist in multiple pools.
    pub fn resolve_message(&self, message_ref: MessageRef) -> MessageHandle<'_>
    {
        MessageHandle {
            pool: self,
            info: &self.messages[message_ref.0 .0],
        }
    }

    /// Resolves an enum reference.
    ///
    /// Will **panic** if the enum defined by the `EnumRef` does not exist in this pool.
    pub fn resolve_enum(&self, enum_ref: EnumRef) -> EnumHandle<'_>
    {
        EnumHandle {
            info: &self.enums[enum_ref.0 .0],
        }
    }
}

/// A message type in a [`SchemaPool`].
#[derive(Debug, Clone, Copy)]
pub struct MessageHandle<'a>
{
    pool: &'a SchemaPool,
    info: &'a MessageInfo,
}

impl<'a> MessageHandle<'a>
{
    /// The message details.
    pub fn info(&self) -> &'a MessageInfo
    {
        self.info
    }

    /// The pool the message belongs to.
    pub fn pool(&self) -> &'a SchemaPool
    {
        self.pool
    }

    /// Iterates all message fields in field number order.
    pub fn iter_fields(&self) -> impl Iterator<Item = FieldHandle<'a>> + 'a
    {
        let pool = self.pool;
        self.info
            .fields
            .values()
            .map(move |info| FieldHandle { pool, info })
    }

    /// Get a field by its name.
    pub fn get_field_by_name(&self, name: &str) -> Option<FieldHandle<'a>>
    {
        self.info
            .fields_by_name
            .get(name)
            .and_then(|number| self.find_field(*number))
    }
}

impl<'a> MessageDescriptor for MessageHandle<'a>
{
    type Field = FieldHandle<'a>;

    fn full_name(&self) -> &str
    {
        &self.info.full_name
    }

    fn find_field(&self, number: u64) -> Option<FieldHandle<'a>>
    {
        let pool = self.pool;
        self.info
            .fields
            .get(&number)
            .map(|info| FieldHandle { pool, info })
    }
}

/// A field of a message in a [`SchemaPool`].
#[derive(Debug, Clone, Copy)]
pub struct FieldHandle<'a>
{
    pool: &'a SchemaPool,
    info: &'a FieldInfo,
}

impl<'a> FieldHandle<'a>
{
    /// The field details.
    pub fn info(&self) -> &'a FieldInfo
    {
        self.info
    }
}

impl<'a> FieldDescriptor for FieldHandle<'a>
{
    type Message = MessageHandle<'a>;
    type Enum = EnumHandle<'a>;

    fn name(&self) -> &str
    {
        &self.info.name
    }

    fn number(&self) -> u64
    {
        self.info.number
    }

    fn field_type(&self) -> FieldType
    {
        self.info.field_type
    }

    fn is_repeated(&self) -> bool
    {
        self.info.multiplicity != Multiplicity::Single
    }

    fn is_packed(&self) -> bool
    {
        self.info.multiplicity == Multiplicity::RepeatedPacked
    }

    fn enum_type(&self) -> Option<EnumHandle<'a>>
    {
        match self.info.type_ref {
            Some(TypeRef::Enum(e)) => Some(self.pool.resolve_enum(e)),
            _ => None,
        }
    }

    fn message_type(&self) -> Option<MessageHandle<'a>>
    {
        match self.info.type_ref {
            Some(TypeRef::Message(m)) => Some(self.pool.resolve_message(m)),
            _ => None,
        }
    }
}

/// An enum type in a [`SchemaPool`].
#[derive(Debug, Clone, Copy)]
pub struct EnumHandle<'a>
{
    info: &'a EnumInfo,
}

impl<'a> EnumHandle<'a>
{
    /// The enum details.
    pub fn info(&self) -> &'a EnumInfo
    {
        self.info
    }

    /// Gets the number of a value by its name.
    pub fn get_value_by_name(&self, name: &str) -> Option<i32>
    {
        self.info.values_by_name.get(name).copied()
    }
}

impl<'a> EnumDescriptor for EnumHandle<'a>
{
    fn full_name(&self) -> &str
    {
        &self.info.full_name
    }

    fn find_value(&self, number: i32) -> Option<&str>
    {
        self.info.values_by_number.get(&number).map(String::as_str)
    }
}

/// An RPC method in a [`SchemaPool`].
#[derive(Debug, Clone, Copy)]
pub struct MethodHandle<'a>
{
    pool: &'a SchemaPool,
    service: &'a ServiceInfo,
    method: &'a MethodInfo,
}

impl<'a> MethodHandle<'a>
{
    /// The service that defines the method.
    pub fn service(&self) -> &'a ServiceInfo
    {
        self.service
    }

    /// Method name without the service.
    pub fn name(&self) -> &'a str
    {
        &self.method.name
    }
}

impl<'a> MethodDescriptor for MethodHandle<'a>
{
    type Message = MessageHandle<'a>;

    fn full_name(&self) -> &str
    {
        &self.method.full_name
    }

    fn input_type(&self) -> MessageHandle<'a>
    {
        self.pool.resolve_message(self.method.input)
    }

    fn output_type(&self) -> MessageHandle<'a>
    {
        self.pool.resolve_message(self.method.output)
    }
}

impl<'a> DescriptorPool for &'a SchemaPool
{
    type Message = MessageHandle<'a>;
    type Method = MethodHandle<'a>;

    fn find_message_type(&self, full_name: &str) -> Option<MessageHandle<'a>>
    {
        SchemaPool::get_message(*self, full_name)
    }

    fn find_method(&self, full_method_name: &str) -> Option<MethodHandle<'a>>
    {
        SchemaPool::get_method(*self, full_method_name)
    }
}
