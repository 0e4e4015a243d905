use super::pool::InternalRef;
use super::*;
use crate::wire::FieldType;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

impl SchemaPool
{
    /// Create an empty pool.
    pub fn new() -> Self
    {
        SchemaPool::default()
    }

    /// Insert a new, empty message type.
    ///
    /// Fields are added with [`add_field`](Self::add_field) once the message is inserted, so that
    /// messages may refer to themselves or to each other.
    pub fn insert_message(&mut self, full_name: impl Into<String>) -> Result<MessageRef, InsertError>
    {
        let full_name = full_name.into();
        let self_ref = MessageRef(InternalRef(self.messages.len()));
        self.claim_type_name(&full_name, TypeRef::Message(self_ref))?;

        self.messages.push(MessageInfo {
            full_name,
            self_ref,
            fields: BTreeMap::new(),
            fields_by_name: BTreeMap::new(),
        });
        Ok(self_ref)
    }

    /// Insert a new, empty enum type.
    pub fn insert_enum(&mut self, full_name: impl Into<String>) -> Result<EnumRef, InsertError>
    {
        let full_name = full_name.into();
        let self_ref = EnumRef(InternalRef(self.enums.len()));
        self.claim_type_name(&full_name, TypeRef::Enum(self_ref))?;

        self.enums.push(EnumInfo {
            full_name,
            self_ref,
            values_by_number: BTreeMap::new(),
            values_by_name: BTreeMap::new(),
        });
        Ok(self_ref)
    }

    /// Insert a new service without methods.
    pub fn insert_service(&mut self, full_name: impl Into<String>) -> Result<ServiceRef, InsertError>
    {
        let full_name = full_name.into();
        let self_ref = ServiceRef(InternalRef(self.services.len()));
        match self.services_by_name.entry(full_name.clone()) {
            Entry::Occupied(..) => return Err(InsertError::TypeExists { name: full_name }),
            Entry::Vacant(vacant) => vacant.insert(self_ref.0 .0),
        };

        self.services.push(ServiceInfo {
            full_name,
            self_ref,
            methods: vec![],
            methods_by_name: HashMap::new(),
        });
        Ok(self_ref)
    }

    /// Add a field to a message.
    ///
    /// `message` and `enum` fields must carry a `type_ref` of the matching kind.
    ///
    /// Will **panic** if the `MessageRef` came from a different pool.
    pub fn add_field(&mut self, message: MessageRef, field: FieldInfo) -> Result<(), MemberInsertError>
    {
        use std::collections::btree_map::Entry;

        match (field.field_type, field.type_ref) {
            (FieldType::Message, Some(TypeRef::Message(m))) if m.0 .0 < self.messages.len() => {}
            (FieldType::Group, Some(TypeRef::Message(m))) if m.0 .0 < self.messages.len() => {}
            (FieldType::Enum, Some(TypeRef::Enum(e))) if e.0 .0 < self.enums.len() => {}
            (_, None) => {}
            _ => return Err(MemberInsertError::InvalidTypeRef),
        }

        let msg = &mut self.messages[message.0 .0];
        let num = field.number;
        let num_entry = msg.fields.entry(num);
        let name_entry = msg.fields_by_name.entry(field.name.clone());

        let (vacant_num, vacant_name) = match (num_entry, name_entry) {
            (Entry::Occupied(..), _) => return Err(MemberInsertError::NumberConflict),
            (_, Entry::Occupied(..)) => return Err(MemberInsertError::NameConflict),
            (Entry::Vacant(num), Entry::Vacant(name)) => (num, name),
        };

        vacant_num.insert(field);
        vacant_name.insert(num);

        Ok(())
    }

    /// Add a value to an enum.
    ///
    /// Aliases are allowed. When several names share a number, the first one is used for lookups
    /// by number.
    ///
    /// Will **panic** if the `EnumRef` came from a different pool.
    pub fn add_enum_value(
        &mut self,
        enum_ref: EnumRef,
        name: impl Into<String>,
        number: i32,
    ) -> Result<(), MemberInsertError>
    {
        let e = &mut self.enums[enum_ref.0 .0];
        let name = name.into();
        if e.values_by_name.contains_key(&name) {
            return Err(MemberInsertError::NameConflict);
        }

        e.values_by_number.entry(number).or_insert_with(|| name.clone());
        e.values_by_name.insert(name, number);
        Ok(())
    }

    /// Add a method to a service.
    ///
    /// Will **panic** if the `ServiceRef` came from a different pool.
    pub fn add_method(
        &mut self,
        service: ServiceRef,
        name: impl Into<String>,
        input: MessageRef,
        output: MessageRef,
    ) -> Result<(), MemberInsertError>
    {
        let svc = &mut self.services[service.0 .0];
        let name = name.into();
        match svc.methods_by_name.entry(name.clone()) {
            Entry::Occupied(..) => return Err(MemberInsertError::NameConflict),
            Entry::Vacant(vacant) => vacant.insert(svc.methods.len()),
        };

        svc.methods.push(MethodInfo {
            full_name: format!("{}.{}", svc.full_name, name),
            name,
            input,
            output,
        });
        Ok(())
    }

    fn claim_type_name(&mut self, full_name: &str, type_ref: TypeRef) -> Result<(), InsertError>
    {
        match self.types_by_name.entry(full_name.to_string()) {
            Entry::Occupied(..) => Err(InsertError::TypeExists {
                name: full_name.to_string(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(type_ref);
                Ok(())
            }
        }
    }
}

impl FieldInfo
{
    /// Create a new singular field.
    pub fn new(name: impl Into<String>, number: u64, field_type: FieldType) -> Self
    {
        Self {
            name: name.into(),
            number,
            field_type,
            multiplicity: Multiplicity::Single,
            type_ref: None,
        }
    }

    /// Create a new embedded message field.
    pub fn message(name: impl Into<String>, number: u64, message: MessageRef) -> Self
    {
        Self {
            type_ref: Some(TypeRef::Message(message)),
            ..Self::new(name, number, FieldType::Message)
        }
    }

    /// Create a new enum field.
    pub fn enumeration(name: impl Into<String>, number: u64, enum_ref: EnumRef) -> Self
    {
        Self {
            type_ref: Some(TypeRef::Enum(enum_ref)),
            ..Self::new(name, number, FieldType::Enum)
        }
    }

    /// Mark the field as repeated.
    pub fn repeated(mut self) -> Self
    {
        self.multiplicity = Multiplicity::Repeated;
        self
    }

    /// Mark the field as packed repeated.
    pub fn packed(mut self) -> Self
    {
        self.multiplicity = Multiplicity::RepeatedPacked;
        self
    }
}
