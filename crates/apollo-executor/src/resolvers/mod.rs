//! GraphQL [execution](https://spec.graphql.org/draft/#sec-Execution)
//! based on callbacks resolving one field at a time.
//!
//! Start with [`Execution::new`],
//! then use builder-pattern methods to configure,
//! then use either the [`execute`][Execution::execute]
//! or [`execute_sync`][Execution::execute_sync] method.
//!
//! Each field of the schema either has its own resolver,
//! set with [`FieldDefinition::resolve`][crate::schema::FieldDefinition::resolve]
//! or [`FieldDefinition::resolve_async`][crate::schema::FieldDefinition::resolve_async],
//! or uses the default resolver which reads the field from a parent [`JsonMap`].
//! Resolvers receive a [`ResolveInfo`] with the parent [`ObjectValue`],
//! coerced arguments, and the shared [`Context`].
//!
//! Fields of a query are resolved concurrently,
//! while top-level fields of a mutation are resolved one after the other.
//! The response always has keys in selection order.
//!
//! Dropping the future returned by [`Execution::execute`] cancels execution:
//! no further resolver is called and no partial response is produced.

use crate::executable::OperationType;
use crate::request::RequestError;
use crate::resolvers::execution::execute_selection_set;
use crate::resolvers::execution::ExecutionContext;
use crate::resolvers::execution::ExecutionMode;
use crate::resolvers::execution::PropagateNull;
use crate::resolvers::input_coercion::coerce_variable_values;
use crate::response::ExecutionResponse;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::response::ResponseDataPathSegment;
use crate::ExecutableDocument;
use crate::Name;
use crate::Schema;
use futures::future::BoxFuture;
use futures::FutureExt as _;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument as _;

mod execution;
pub(crate) mod input_coercion;
mod result_coercion;

/// Builder for configuring GraphQL execution
///
/// See [module-level documentation][self].
pub struct Execution<'a> {
    schema: &'a Schema,
    document: &'a ExecutableDocument,
    operation_name: Option<&'a str>,
    variable_values: Option<&'a JsonMap>,
    root_value: ObjectValue,
    context: Context,
}

/// Information passed to a field resolver
pub struct ResolveInfo {
    pub(crate) parent: ObjectValue,
    pub(crate) arguments: JsonMap,
    pub(crate) context: Context,
    pub(crate) field_name: Name,
    pub(crate) parent_type: Name,
    pub(crate) path: Vec<ResponseDataPathSegment>,
}

/// The error type returned by field resolvers
///
/// Any [`std::error::Error`] converts into it, so resolvers can use `?`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub message: String,
    /// Copied into [`GraphQLError::extensions`][crate::response::GraphQLError::extensions]
    pub extensions: JsonMap,
}

/// A value resolved for some object type of the schema, passed as the parent of its fields’ resolvers
///
/// This is type-erased: resolvers get back the concrete Rust type with [`downcast_ref`][Self::downcast_ref].
/// Cloning is cheap: the value is reference-counted.
#[derive(Clone)]
pub struct ObjectValue(Arc<dyn Any + Send + Sync>);

/// User data shared by all resolvers of one execution
///
/// The engine never locks it: types needing mutation should use their own synchronization.
#[derive(Clone)]
pub struct Context(Arc<dyn Any + Send + Sync>);

/// The successful return type of a field resolver.
pub enum ResolvedValue {
    /// * JSON null represents GraphQL null
    /// * A GraphQL enum value is represented as a JSON string
    /// * Scalar values go through the scalar’s result coercion
    /// * A JSON object is accepted where the GraphQL type is an object, interface, or union type,
    ///   its fields then use the default resolver
    /// * A JSON array is accepted where the GraphQL type is a list type
    Leaf(JsonValue),

    /// Expected where the GraphQL type is an object, interface, or union type
    Object(ObjectValue),

    /// Expected for GraphQL list types.
    ///
    /// An `Err` item is a field error for that item only.
    List(Vec<Result<ResolvedValue, FieldError>>),
}

type ResolverFn =
    dyn Fn(ResolveInfo) -> BoxFuture<'static, Result<ResolvedValue, FieldError>> + Send + Sync;

/// A field resolver with the type erased
#[derive(Clone)]
pub(crate) struct Resolver(Arc<ResolverFn>);

impl<'a> Execution<'a> {
    /// Create a new builder for configuring GraphQL execution
    ///
    /// See [module-level documentation][self].
    pub fn new(schema: &'a Schema, document: &'a ExecutableDocument) -> Self {
        Self {
            schema,
            document,
            operation_name: None,
            variable_values: None,
            root_value: ObjectValue::new(()),
            context: Context::new(()),
        }
    }

    /// Sets the name of the operation to execute.
    ///
    /// If not called or if `None` is passed here,
    /// the document is expected to contain exactly one operation.
    /// See [`ExecutableDocument::get_operation`].
    pub fn operation_name(mut self, operation_name: Option<&'a str>) -> Self {
        self.operation_name = operation_name;
        self
    }

    /// Provide values of the request’s variables, before coercion.
    ///
    /// If not called, an empty map is assumed.
    pub fn variable_values(mut self, variable_values: &'a JsonMap) -> Self {
        self.variable_values = Some(variable_values);
        self
    }

    /// Sets the value of the root operation type (such as `Query`),
    /// passed as the parent to resolvers of top-level fields.
    pub fn root_value(mut self, root_value: ObjectValue) -> Self {
        self.root_value = root_value;
        self
    }

    /// Sets the context passed to every resolver
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Perform execution on the current thread, blocking on any asynchronous resolver.
    pub fn execute_sync(&self) -> Result<ExecutionResponse, RequestError> {
        futures::executor::block_on(self.execute())
    }

    /// Perform execution
    ///
    /// Returns `Err` only for [request errors][RequestError].
    /// Field errors are part of the `Ok` response.
    pub async fn execute(&self) -> Result<ExecutionResponse, RequestError> {
        let operation = self.document.get_operation(self.operation_name)?;
        let span = tracing::debug_span!(
            "execute",
            operation.name = operation.name.as_ref().map(|name| name.as_str()),
            operation.kind = %operation.operation_type,
        );
        async move {
            let mode = match operation.operation_type {
                OperationType::Query => ExecutionMode::Normal,
                OperationType::Mutation => ExecutionMode::Sequential,
                OperationType::Subscription => return Err(RequestError::SubscriptionNotSupported),
            };
            let Some(root_operation_object_type_def) =
                self.schema.root_operation(operation.operation_type)
            else {
                return Err(RequestError::UndefinedRootOperation(
                    operation.operation_type,
                ));
            };
            let empty = JsonMap::new();
            let variable_values = coerce_variable_values(
                self.schema,
                operation,
                self.variable_values.unwrap_or(&empty),
            )?;
            let context = ExecutionContext {
                schema: self.schema,
                document: self.document,
                variable_values: &variable_values,
                context: &self.context,
            };
            let mut errors = Vec::new();
            let result = execute_selection_set(
                &context,
                None,
                mode,
                root_operation_object_type_def,
                &self.root_value,
                operation.selection_set.selections.iter().collect(),
                &mut errors,
            )
            .await;
            let data = result
                // If `Result::ok` converts an error to `None` that’s a field error on a non-null,
                // field propagated all the way to the root,
                // so that the JSON response should contain `"data": null`.
                //
                // No-op to witness the error type:
                .inspect_err(|_: &PropagateNull| {})
                .ok();
            tracing::debug!(
                errors = errors.len(),
                data_is_null = data.is_none(),
                "execution completed"
            );
            Ok(ExecutionResponse { errors, data })
        }
        .instrument(span)
        .await
    }
}

/// Execute an operation of `document`, which must contain exactly one operation.
///
/// This is a shortcut for the [`Execution`] builder.
pub async fn execute(
    schema: &Schema,
    document: &ExecutableDocument,
    root_value: ObjectValue,
    context: Context,
    variable_values: &JsonMap,
) -> Result<ExecutionResponse, RequestError> {
    Execution::new(schema, document)
        .root_value(root_value)
        .context(context)
        .variable_values(variable_values)
        .execute()
        .await
}

impl ResolveInfo {
    /// The value of the parent object
    pub fn parent(&self) -> &ObjectValue {
        &self.parent
    }

    /// Shortcut for `info.parent().downcast_ref()`
    pub fn parent_as<T: Any>(&self) -> Option<&T> {
        self.parent.downcast_ref()
    }

    /// The arguments passed to this field, after coercion:
    /// this matches the argument definitions in the schema.
    ///
    /// Arguments with neither a value nor a default are absent.
    pub fn arguments(&self) -> &JsonMap {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&JsonValue> {
        self.arguments.get(name)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The name of the field being resolved
    pub fn field_name(&self) -> &Name {
        &self.field_name
    }

    /// The name of the object type whose field is being resolved
    pub fn parent_type(&self) -> &Name {
        &self.parent_type
    }

    /// The path of this field in response data
    pub fn path(&self) -> &[ResponseDataPathSegment] {
        &self.path
    }
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: JsonMap::new(),
        }
    }

    /// Adds an entry to the error’s extensions, builder-style
    pub fn extension(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extensions.insert(key, value.into());
        self
    }
}

impl<E: std::error::Error> From<E> for FieldError {
    fn from(error: E) -> Self {
        Self::new(error.to_string())
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl ObjectValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Returns the map if this object was resolved from a JSON object
    pub fn as_json(&self) -> Option<&JsonMap> {
        self.downcast_ref()
    }
}

impl Context {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Arc::new(data))
    }

    /// Shares data that the caller keeps a handle to, for example to inspect it after execution
    pub fn from_arc(data: Arc<dyn Any + Send + Sync>) -> Self {
        Self(data)
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(())
    }
}

impl ResolvedValue {
    /// Construct a null leaf resolved value
    pub fn null() -> Self {
        Self::Leaf(JsonValue::Null)
    }

    /// Construct a leaf resolved value from something that is convertible to JSON
    pub fn leaf(json: impl Into<JsonValue>) -> Self {
        Self::Leaf(json.into())
    }

    /// Construct an object resolved value
    pub fn object<T: Any + Send + Sync>(object: T) -> Self {
        Self::Object(ObjectValue::new(object))
    }

    /// Construct an object resolved value or null
    ///
    /// This is how a resolver reports “not found” without a field error.
    pub fn nullable_object<T: Any + Send + Sync>(opt_object: Option<T>) -> Self {
        match opt_object {
            Some(object) => Self::object(object),
            None => Self::null(),
        }
    }

    /// Construct a list resolved value from an iterator
    ///
    /// If some items can fail,
    /// construct the [`ResolvedValue::List`] enum variant directly instead.
    pub fn list<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::List(iter.into_iter().map(Ok).collect())
    }
}

impl From<ObjectValue> for ResolvedValue {
    fn from(object: ObjectValue) -> Self {
        Self::Object(object)
    }
}

impl Resolver {
    pub(crate) fn new_sync(
        resolver: impl Fn(ResolveInfo) -> Result<ResolvedValue, FieldError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(move |info| {
            futures::future::ready(resolver(info)).boxed()
        }))
    }

    pub(crate) fn new_async<F>(
        resolver: impl Fn(ResolveInfo) -> F + Send + Sync + 'static,
    ) -> Self
    where
        F: Future<Output = Result<ResolvedValue, FieldError>> + Send + 'static,
    {
        Self(Arc::new(move |info| resolver(info).boxed()))
    }

    pub(crate) fn call(&self, info: ResolveInfo) -> BoxFuture<'static, Result<ResolvedValue, FieldError>> {
        (self.0)(info)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver")
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(json) = self.as_json() {
            f.debug_tuple("ObjectValue").field(json).finish()
        } else {
            f.write_str("ObjectValue(..)")
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Context(..)")
    }
}
