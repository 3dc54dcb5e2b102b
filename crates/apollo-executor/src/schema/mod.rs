//! The type system: named types with their fields, resolvers, and discriminators
//!
//! A [`Schema`] is built once with [`Schema::builder`],
//! then shared read-only by any number of executions.
//!
//! ```
//! use apollo_executor::schema::*;
//! use apollo_executor::resolvers::ResolvedValue;
//! use apollo_executor::ty;
//!
//! let schema = Schema::builder()
//!     .add_type(ObjectType::new("Query").field(
//!         FieldDefinition::new("hello", ty!(String!))
//!             .resolve(|_info| Ok(ResolvedValue::leaf("world"))),
//!     ))
//!     .query("Query")
//!     .build()
//!     .unwrap();
//! assert!(schema.get_object("Query").is_some());
//! ```

use crate::collections::HashMap;
use crate::collections::IndexMap;
use crate::collections::IndexSet;
use crate::executable::OperationType;
use crate::resolvers::FieldError;
use crate::resolvers::ObjectValue;
use crate::resolvers::ResolveInfo;
use crate::resolvers::ResolvedValue;
use crate::resolvers::Resolver;
use crate::response::JsonValue;
use crate::Name;
use crate::Type;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

mod builder;
mod scalars;

pub use self::builder::BuildError;
pub use self::builder::BuildErrors;
pub use self::builder::SchemaBuilder;

/// A validated GraphQL schema
#[derive(Debug, Clone)]
pub struct Schema {
    /// Name of the object type for the `query` root operation
    pub query_type: Name,

    /// Name of the object type for the `mutation` root operation, if any
    pub mutation_type: Option<Name>,

    /// All named types, including built-in scalars
    pub types: IndexMap<Name, ExtendedType>,

    /// For each interface and union type, the names of object types that are its possible types
    pub(crate) possible_types: HashMap<Name, IndexSet<Name>>,
}

/// The definition of a named type, with all information from type extensions folded in.
#[derive(Debug, Clone)]
pub enum ExtendedType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
}

#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: Name,
    pub description: Option<String>,
    pub(crate) serialize: ScalarCoercion,
    pub(crate) parse: ScalarCoercion,
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: Name,
    pub description: Option<String>,
    pub implements_interfaces: IndexSet<Name>,
    pub fields: IndexMap<Name, FieldDefinition>,
    pub(crate) is_type_of: Option<IsTypeOf>,
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub name: Name,
    pub description: Option<String>,
    pub fields: IndexMap<Name, FieldDefinition>,
    pub(crate) resolve_type: Option<TypeResolver>,
}

#[derive(Debug, Clone)]
pub struct UnionType {
    pub name: Name,
    pub description: Option<String>,
    pub members: IndexSet<Name>,
    pub(crate) resolve_type: Option<TypeResolver>,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: Name,
    pub description: Option<String>,
    pub values: IndexSet<Name>,
}

/// A field of an object or interface type
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub arguments: IndexMap<Name, ArgumentDefinition>,
    pub ty: Type,
    /// `None` uses the default resolver,
    /// which looks up the field name in a parent [`JsonMap`][crate::response::JsonMap].
    pub(crate) resolver: Option<Resolver>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDefinition {
    pub ty: Type,
    /// Already in the representation that resolvers receive in [`ResolveInfo::arguments`]
    pub default_value: Option<JsonValue>,
}

/// Discriminator of an interface or union type:
/// returns the name of the concrete object type of a value.
#[derive(Clone)]
pub(crate) struct TypeResolver(Arc<dyn Fn(&ObjectValue) -> Option<Name> + Send + Sync>);

/// Membership test of an object type, used to resolve abstract types without a [`TypeResolver`]
#[derive(Clone)]
pub(crate) struct IsTypeOf(Arc<dyn Fn(&ObjectValue) -> bool + Send + Sync>);

#[derive(Clone)]
pub(crate) struct ScalarCoercion(
    Arc<dyn Fn(&JsonValue) -> Result<JsonValue, String> + Send + Sync>,
);

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn get_object(&self, name: &str) -> Option<&ObjectType> {
        if let Some(ExtendedType::Object(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    pub fn get_interface(&self, name: &str) -> Option<&InterfaceType> {
        if let Some(ExtendedType::Interface(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    pub fn get_union(&self, name: &str) -> Option<&UnionType> {
        if let Some(ExtendedType::Union(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    pub fn get_enum(&self, name: &str) -> Option<&EnumType> {
        if let Some(ExtendedType::Enum(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    pub fn get_scalar(&self, name: &str) -> Option<&ScalarType> {
        if let Some(ExtendedType::Scalar(def)) = self.types.get(name) {
            Some(def)
        } else {
            None
        }
    }

    /// Returns the definition of a field of an object or interface type
    pub fn type_field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        match self.types.get(type_name)? {
            ExtendedType::Object(def) => def.fields.get(field_name),
            ExtendedType::Interface(def) => def.fields.get(field_name),
            _ => None,
        }
    }

    /// Returns the object type for the given kind of root operation, if defined
    pub fn root_operation(&self, operation_type: OperationType) -> Option<&ObjectType> {
        match operation_type {
            OperationType::Query => self.get_object(&self.query_type),
            OperationType::Mutation => self.get_object(self.mutation_type.as_ref()?),
            OperationType::Subscription => None,
        }
    }

    /// Returns the names of object types that are possible types of the given type.
    ///
    /// * For an interface: object types that implement it
    /// * For a union: its member types
    /// * For an object type: itself
    ///
    /// Other types have no possible types.
    pub fn possible_types<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a Name> {
        let abstract_types = self.possible_types.get(type_name).into_iter().flatten();
        let object = self.types.get_key_value(type_name).and_then(|(name, def)| {
            matches!(def, ExtendedType::Object(_)).then_some(name)
        });
        abstract_types.chain(object)
    }

    /// Returns whether `maybe_subtype` is an object type that is a possible type of `abstract_type`,
    /// or is `abstract_type` itself.
    pub fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        abstract_type == maybe_subtype
            || self
                .possible_types
                .get(abstract_type)
                .is_some_and(|possible| possible.contains(maybe_subtype))
    }
}

impl ExtendedType {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
        }
    }

    /// Returns whether this is a scalar or enum type, the only input types of this type system
    pub fn is_input_type(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar type",
            Self::Object(_) => "an object type",
            Self::Interface(_) => "an interface type",
            Self::Union(_) => "a union type",
            Self::Enum(_) => "an enum type",
        }
    }
}

impl ScalarType {
    /// A custom scalar whose values are passed through as-is in both directions
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            serialize: ScalarCoercion::pass_through(),
            parse: ScalarCoercion::pass_through(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the result coercion, applied to values returned by resolvers.
    ///
    /// An `Err` becomes a field error with that message.
    pub fn serialize_with(
        mut self,
        serialize: impl Fn(&JsonValue) -> Result<JsonValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.serialize = ScalarCoercion(Arc::new(serialize));
        self
    }

    /// Sets the input coercion, applied to variable values and argument literals.
    ///
    /// An `Err` becomes a request error for variables,
    /// or a field error for arguments.
    pub fn parse_with(
        mut self,
        parse: impl Fn(&JsonValue) -> Result<JsonValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.parse = ScalarCoercion(Arc::new(parse));
        self
    }

    pub fn serialize(&self, value: &JsonValue) -> Result<JsonValue, String> {
        (self.serialize.0)(value)
    }

    pub fn parse(&self, value: &JsonValue) -> Result<JsonValue, String> {
        (self.parse.0)(value)
    }
}

impl ObjectType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            implements_interfaces: IndexSet::default(),
            fields: IndexMap::default(),
            is_type_of: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<Name>) -> Self {
        self.implements_interfaces.insert(interface.into());
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Sets a membership test used when resolving an interface or union
    /// whose definition has no `resolve_type` discriminator.
    pub fn is_type_of(
        mut self,
        is_type_of: impl Fn(&ObjectValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_type_of = Some(IsTypeOf(Arc::new(is_type_of)));
        self
    }

    pub(crate) fn check_is_type_of(&self, value: &ObjectValue) -> Option<bool> {
        self.is_type_of.as_ref().map(|is_type_of| (is_type_of.0)(value))
    }
}

impl InterfaceType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::default(),
            resolve_type: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Sets the discriminator returning the name of the concrete object type of a value
    pub fn resolve_type(
        mut self,
        resolve_type: impl Fn(&ObjectValue) -> Option<Name> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(TypeResolver(Arc::new(resolve_type)));
        self
    }
}

impl UnionType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            members: IndexSet::default(),
            resolve_type: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn member(mut self, member: impl Into<Name>) -> Self {
        self.members.insert(member.into());
        self
    }

    /// Sets the discriminator returning the name of the concrete object type of a value
    pub fn resolve_type(
        mut self,
        resolve_type: impl Fn(&ObjectValue) -> Option<Name> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(TypeResolver(Arc::new(resolve_type)));
        self
    }
}

impl EnumType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: IndexSet::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn value(mut self, value: impl Into<Name>) -> Self {
        self.values.insert(value.into());
        self
    }
}

impl FieldDefinition {
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: IndexMap::default(),
            ty,
            resolver: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, name: impl Into<Name>, argument: ArgumentDefinition) -> Self {
        self.arguments.insert(name.into(), argument);
        self
    }

    /// Sets a synchronous resolver for this field
    pub fn resolve(
        mut self,
        resolver: impl Fn(ResolveInfo) -> Result<ResolvedValue, FieldError> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Resolver::new_sync(resolver));
        self
    }

    /// Sets an asynchronous resolver for this field
    ///
    /// The returned future may suspend without blocking sibling fields.
    pub fn resolve_async<F>(mut self, resolver: impl Fn(ResolveInfo) -> F + Send + Sync + 'static) -> Self
    where
        F: Future<Output = Result<ResolvedValue, FieldError>> + Send + 'static,
    {
        self.resolver = Some(Resolver::new_async(resolver));
        self
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }
}

impl ArgumentDefinition {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            default_value: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

impl TypeResolver {
    pub(crate) fn call(&self, value: &ObjectValue) -> Option<Name> {
        (self.0)(value)
    }
}

impl ScalarCoercion {
    fn pass_through() -> Self {
        Self(Arc::new(|value| Ok(value.clone())))
    }
}

impl From<ScalarType> for ExtendedType {
    fn from(def: ScalarType) -> Self {
        Self::Scalar(def)
    }
}

impl From<ObjectType> for ExtendedType {
    fn from(def: ObjectType) -> Self {
        Self::Object(def)
    }
}

impl From<InterfaceType> for ExtendedType {
    fn from(def: InterfaceType) -> Self {
        Self::Interface(def)
    }
}

impl From<UnionType> for ExtendedType {
    fn from(def: UnionType) -> Self {
        Self::Union(def)
    }
}

impl From<EnumType> for ExtendedType {
    fn from(def: EnumType) -> Self {
        Self::Enum(def)
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeResolver")
    }
}

impl fmt::Debug for IsTypeOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IsTypeOf")
    }
}

impl fmt::Debug for ScalarCoercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarCoercion")
    }
}
