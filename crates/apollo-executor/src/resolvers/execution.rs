use crate::collections::HashSet;
use crate::collections::IndexMap;
use crate::executable::Field;
use crate::executable::Selection;
use crate::executable::Value;
use crate::resolvers::input_coercion::coerce_argument_values;
use crate::resolvers::result_coercion::complete_value;
use crate::resolvers::Context;
use crate::resolvers::FieldError;
use crate::resolvers::ObjectValue;
use crate::resolvers::ResolveInfo;
use crate::resolvers::ResolvedValue;
use crate::response::GraphQLError;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::response::ResponseDataPathSegment;
use crate::schema::ExtendedType;
use crate::schema::ObjectType;
use crate::ExecutableDocument;
use crate::Name;
use crate::Schema;
use crate::Type;
use futures::future::join_all;
use futures::future::BoxFuture;
use futures::FutureExt as _;

/// <https://spec.graphql.org/October2021/#sec-Normal-and-Serial-Execution>
#[derive(Debug, Copy, Clone)]
pub(crate) enum ExecutionMode {
    /// Allowed to resolve fields in any order, including in parallel
    Normal,
    /// Top-level fields of a mutation operation must be executed in order
    Sequential,
}

/// Return in `Err` when a field error occurred at some non-nullable place
///
/// The error itself was already recorded.
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
pub(crate) struct PropagateNull;

/// Linked-list version of `Vec<PathElement>`, taking advantage of the call stack
pub(crate) type LinkedPath<'a> = Option<&'a LinkedPathElement<'a>>;

pub(crate) struct LinkedPathElement<'a> {
    pub(crate) element: ResponseDataPathSegment,
    pub(crate) next: LinkedPath<'a>,
}

/// Read-only state of one execution, shared by concurrently executing fields.
///
/// Field errors are not part of it: each subtree pushes to its own `Vec`
/// and siblings are merged in selection order once they all complete.
pub(crate) struct ExecutionContext<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) document: &'a ExecutableDocument,
    pub(crate) variable_values: &'a JsonMap,
    pub(crate) context: &'a Context,
}

/// Reasons for a field error
#[derive(Debug, thiserror::Error)]
pub(crate) enum FieldErrorKind {
    #[error("{}", .0.message)]
    ResolverFailure(FieldError),

    #[error("argument `{argument}` of required type {ty} was not provided")]
    MissingArgument { argument: Name, ty: Type },

    #[error("invalid value for argument `{argument}`: {message}")]
    InvalidArgument { argument: Name, message: String },

    #[error("could not determine the object type for abstract type {abstract_type}: {reason}")]
    AmbiguousType { abstract_type: Name, reason: String },

    #[error("expected a list for type {ty}, resolver returned {found}")]
    InvalidListValue { ty: Type, found: String },

    #[error("non-null type {ty} resolved to null")]
    NonNullViolation { ty: Type },

    #[error("{message}")]
    LeafCoercion { message: String },

    #[error("resolver returned {found}, expected {expected}")]
    UnexpectedValue { found: String, expected: String },
}

/// <https://spec.graphql.org/October2021/#ExecuteSelectionSet()>
///
/// In [`ExecutionMode::Normal`] all fields are polled concurrently,
/// and the response map is assembled after the last one completes.
pub(crate) fn execute_selection_set<'a>(
    ctx: &'a ExecutionContext<'a>,
    path: LinkedPath<'a>,
    mode: ExecutionMode,
    object_type: &'a ObjectType,
    object_value: &'a ObjectValue,
    selections: Vec<&'a Selection>,
    errors: &'a mut Vec<GraphQLError>,
) -> BoxFuture<'a, Result<JsonMap, PropagateNull>> {
    async move {
        let mut grouped_field_set = IndexMap::default();
        collect_fields(
            ctx,
            object_type,
            selections,
            &mut HashSet::default(),
            &mut grouped_field_set,
        );

        let field_paths: Vec<_> = grouped_field_set
            .keys()
            .map(|&response_key| LinkedPathElement {
                element: ResponseDataPathSegment::Field(response_key.clone()),
                next: path,
            })
            .collect();
        let fields = grouped_field_set.values().zip(&field_paths);
        let results = match mode {
            ExecutionMode::Normal => {
                join_all(fields.map(|(fields, field_path)| {
                    execute_field_isolated(ctx, field_path, object_type, object_value, fields)
                }))
                .await
            }
            ExecutionMode::Sequential => {
                let mut results = Vec::with_capacity(field_paths.len());
                for (fields, field_path) in fields {
                    let (result, field_errors) =
                        execute_field_isolated(ctx, field_path, object_type, object_value, fields)
                            .await;
                    let propagate = matches!(result, Err(PropagateNull));
                    results.push((result, field_errors));
                    if propagate {
                        // `data` will be null: do not start more side effects
                        break;
                    }
                }
                results
            }
        };

        let mut response_map = JsonMap::with_capacity(results.len());
        let mut propagate = false;
        for (response_key, (result, field_errors)) in grouped_field_set.keys().zip(results) {
            errors.extend(field_errors);
            match result {
                Ok(Some(value)) => {
                    response_map.insert(response_key.as_str(), value);
                }
                // Field not defined in the schema
                Ok(None) => {}
                Err(PropagateNull) => propagate = true,
            }
        }
        if propagate {
            Err(PropagateNull)
        } else {
            Ok(response_map)
        }
    }
    .boxed()
}

/// <https://spec.graphql.org/October2021/#CollectFields()>
pub(crate) fn collect_fields<'a>(
    ctx: &ExecutionContext<'a>,
    object_type: &ObjectType,
    selections: impl IntoIterator<Item = &'a Selection>,
    visited_fragments: &mut HashSet<&'a Name>,
    grouped_fields: &mut IndexMap<&'a Name, Vec<&'a Field>>,
) {
    for selection in selections {
        if eval_if_arg(selection, "skip", ctx.variable_values).unwrap_or(false)
            || !eval_if_arg(selection, "include", ctx.variable_values).unwrap_or(true)
        {
            continue;
        }
        match selection {
            Selection::Field(field) => grouped_fields
                .entry(field.response_key())
                .or_default()
                .push(field),
            Selection::FragmentSpread(spread) => {
                let new = visited_fragments.insert(&spread.fragment_name);
                if !new {
                    continue;
                }
                let Some(fragment) = ctx.document.fragments.get(&spread.fragment_name) else {
                    continue;
                };
                if !does_fragment_type_apply(ctx.schema, object_type, &fragment.type_condition) {
                    continue;
                }
                collect_fields(
                    ctx,
                    object_type,
                    &fragment.selection_set.selections,
                    visited_fragments,
                    grouped_fields,
                )
            }
            Selection::InlineFragment(inline) => {
                if let Some(condition) = &inline.type_condition {
                    if !does_fragment_type_apply(ctx.schema, object_type, condition) {
                        continue;
                    }
                }
                collect_fields(
                    ctx,
                    object_type,
                    &inline.selection_set.selections,
                    visited_fragments,
                    grouped_fields,
                )
            }
        }
    }
}

/// <https://spec.graphql.org/October2021/#DoesFragmentTypeApply()>
pub(crate) fn does_fragment_type_apply(
    schema: &Schema,
    object_type: &ObjectType,
    fragment_type: &Name,
) -> bool {
    match schema.types.get(fragment_type) {
        Some(ExtendedType::Object(_)) => *fragment_type == object_type.name,
        Some(ExtendedType::Interface(_)) | Some(ExtendedType::Union(_)) => {
            schema.is_subtype(fragment_type, &object_type.name)
        }
        // Undefined or not an output type: validation should have caught this
        _ => false,
    }
}

fn eval_if_arg(
    selection: &Selection,
    directive_name: &str,
    variable_values: &JsonMap,
) -> Option<bool> {
    match selection
        .directives()
        .get(directive_name)?
        .specified_argument_by_name("if")?
    {
        Value::Boolean(value) => Some(*value),
        Value::Variable(var) => variable_values.get(var.as_str())?.as_bool(),
        _ => None,
    }
}

/// Executes a field with its own list of errors, for the caller to merge in selection order
async fn execute_field_isolated<'a>(
    ctx: &'a ExecutionContext<'a>,
    field_path: &'a LinkedPathElement<'a>,
    object_type: &'a ObjectType,
    object_value: &'a ObjectValue,
    fields: &'a [&'a Field],
) -> (Result<Option<JsonValue>, PropagateNull>, Vec<GraphQLError>) {
    let mut errors = Vec::new();
    let result = execute_field(
        ctx,
        Some(field_path),
        object_type,
        object_value,
        fields,
        &mut errors,
    )
    .await;
    (result, errors)
}

/// <https://spec.graphql.org/October2021/#ExecuteField()>
///
/// Return `Ok(None)` for silently skipping a field not defined in the schema.
async fn execute_field<'a>(
    ctx: &'a ExecutionContext<'a>,
    path: LinkedPath<'a>,
    object_type: &'a ObjectType,
    object_value: &'a ObjectValue,
    fields: &'a [&'a Field],
    errors: &mut Vec<GraphQLError>,
) -> Result<Option<JsonValue>, PropagateNull> {
    // Indexing should not panic: `collect_fields` only creates a `Vec` to push to it
    let field = fields[0];
    if field.name == "__typename" {
        return Ok(Some(object_type.name.as_str().into()));
    }
    let Some(field_def) = object_type.fields.get(&field.name) else {
        return Ok(None);
    };
    let arguments = match coerce_argument_values(ctx, path, field_def, fields, errors) {
        Ok(arguments) => arguments,
        Err(PropagateNull) => return try_nullify(&field_def.ty, Err(PropagateNull)).map(Some),
    };
    let info = ResolveInfo {
        parent: object_value.clone(),
        arguments,
        context: ctx.context.clone(),
        field_name: field.name.clone(),
        parent_type: object_type.name.clone(),
        path: path_to_vec(path),
    };
    let resolved_result = match &field_def.resolver {
        Some(resolver) => resolver.call(info).await,
        None => default_resolver(&info),
    };
    let completed_result = match resolved_result {
        Ok(resolved) => complete_value(ctx, path, &field_def.ty, resolved, fields, errors).await,
        Err(error) => {
            errors.push(GraphQLError::field_error(
                FieldErrorKind::ResolverFailure(error),
                path,
                fields,
            ));
            Err(PropagateNull)
        }
    };
    try_nullify(&field_def.ty, completed_result).map(Some)
}

/// Used for fields without an explicit resolver:
/// reads the entry named like the field from a parent JSON object.
fn default_resolver(info: &ResolveInfo) -> Result<ResolvedValue, FieldError> {
    let Some(parent) = info.parent.as_json() else {
        return Err(FieldError::new(format!(
            "no resolver for field {}.{} and the parent value is not a JSON object",
            info.parent_type, info.field_name
        )));
    };
    Ok(ResolvedValue::Leaf(
        parent
            .get(info.field_name.as_str())
            .cloned()
            .unwrap_or(JsonValue::Null),
    ))
}

/// Try to insert a propagated null if possible, or keep propagating it.
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
pub(crate) fn try_nullify(
    ty: &Type,
    result: Result<JsonValue, PropagateNull>,
) -> Result<JsonValue, PropagateNull> {
    match result {
        Ok(json) => Ok(json),
        Err(PropagateNull) => {
            if ty.is_non_null() {
                Err(PropagateNull)
            } else {
                Ok(JsonValue::Null)
            }
        }
    }
}

pub(crate) fn path_to_vec(mut link: LinkedPath<'_>) -> Vec<ResponseDataPathSegment> {
    let mut path = Vec::new();
    while let Some(node) = link {
        path.push(node.element.clone());
        link = node.next;
    }
    path.reverse();
    path
}

impl GraphQLError {
    /// A field error with one location per field selection merged into the failing field
    pub(crate) fn field_error(kind: FieldErrorKind, path: LinkedPath<'_>, fields: &[&Field]) -> Self {
        let mut err = Self::new(kind.to_string(), fields.iter().filter_map(|field| field.location));
        err.path = path_to_vec(path);
        if let FieldErrorKind::ResolverFailure(FieldError { extensions, .. }) = kind {
            err.extensions = extensions;
        }
        tracing::trace!(
            message = %err.message,
            path = ?err.path,
            "field error"
        );
        err
    }
}
