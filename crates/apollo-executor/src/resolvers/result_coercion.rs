use crate::executable::Field;
use crate::executable::Selection;
use crate::resolvers::execution::execute_selection_set;
use crate::resolvers::execution::try_nullify;
use crate::resolvers::execution::ExecutionContext;
use crate::resolvers::execution::ExecutionMode;
use crate::resolvers::execution::FieldErrorKind;
use crate::resolvers::execution::LinkedPath;
use crate::resolvers::execution::LinkedPathElement;
use crate::resolvers::execution::PropagateNull;
use crate::resolvers::FieldError;
use crate::resolvers::ObjectValue;
use crate::resolvers::ResolvedValue;
use crate::response::GraphQLError;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::response::ResponseDataPathSegment;
use crate::schema::ExtendedType;
use crate::schema::ObjectType;
use crate::schema::TypeResolver;
use crate::Name;
use crate::Schema;
use crate::Type;
use futures::future::join_all;
use futures::future::BoxFuture;
use futures::FutureExt as _;

/// <https://spec.graphql.org/October2021/#CompleteValue()>
///
/// Returns `Err` for a field error being propagated upwards to find a nullable place
pub(crate) fn complete_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    path: LinkedPath<'a>,
    ty: &'a Type,
    resolved: ResolvedValue,
    fields: &'a [&'a Field],
    errors: &'a mut Vec<GraphQLError>,
) -> BoxFuture<'a, Result<JsonValue, PropagateNull>> {
    async move {
        macro_rules! field_error {
            ($kind: expr) => {{
                errors.push(GraphQLError::field_error($kind, path, fields));
                return Err(PropagateNull);
            }};
        }
        let resolved_obj = match resolved {
            ResolvedValue::Leaf(JsonValue::Null) => {
                if ty.is_non_null() {
                    field_error!(FieldErrorKind::NonNullViolation { ty: ty.clone() })
                } else {
                    return Ok(JsonValue::Null);
                }
            }
            ResolvedValue::List(items) => {
                return complete_list_value(ctx, path, ty, fields, items, errors).await;
            }
            ResolvedValue::Leaf(JsonValue::Array(items)) if ty.is_list() => {
                let items = items
                    .into_iter()
                    .map(|item| Ok(ResolvedValue::Leaf(item)))
                    .collect();
                return complete_list_value(ctx, path, ty, fields, items, errors).await;
            }
            ResolvedValue::Leaf(leaf) if ty.is_list() => {
                field_error!(FieldErrorKind::InvalidListValue {
                    ty: ty.clone(),
                    found: leaf.to_string(),
                })
            }
            ResolvedValue::Object(_) if ty.is_list() => {
                field_error!(FieldErrorKind::InvalidListValue {
                    ty: ty.clone(),
                    found: "an object".to_owned(),
                })
            }
            ResolvedValue::Leaf(leaf) => {
                let ty_name = ty.inner_named_type();
                match ctx.schema.types.get(ty_name) {
                    Some(ExtendedType::Scalar(_)) | Some(ExtendedType::Enum(_)) => {
                        return complete_leaf_value(ctx, path, ty, leaf, fields, errors);
                    }
                    // JSON data served without resolvers
                    Some(_) => match leaf {
                        JsonValue::Object(map) => ObjectValue::new(map),
                        leaf => field_error!(FieldErrorKind::UnexpectedValue {
                            found: leaf.to_string(),
                            expected: format!("an object of type {ty_name}"),
                        }),
                    },
                    None => field_error!(FieldErrorKind::UnexpectedValue {
                        found: leaf.to_string(),
                        expected: format!("undefined type {ty_name}"),
                    }),
                }
            }
            ResolvedValue::Object(obj) => obj,
        };

        let ty_name = ty.inner_named_type();
        let object_type = match ctx.schema.types.get(ty_name) {
            Some(ExtendedType::Object(def)) => {
                if def.check_is_type_of(&resolved_obj) == Some(false) {
                    field_error!(FieldErrorKind::UnexpectedValue {
                        found: "an object that is not of the expected type".to_owned(),
                        expected: format!("an object of type {ty_name}"),
                    })
                }
                def
            }
            Some(ExtendedType::Interface(def)) => {
                match resolve_abstract_type(ctx.schema, ty_name, def.resolve_type.as_ref(), &resolved_obj) {
                    Ok(def) => def,
                    Err(kind) => field_error!(kind),
                }
            }
            Some(ExtendedType::Union(def)) => {
                match resolve_abstract_type(ctx.schema, ty_name, def.resolve_type.as_ref(), &resolved_obj) {
                    Ok(def) => def,
                    Err(kind) => field_error!(kind),
                }
            }
            Some(ExtendedType::Scalar(_)) | Some(ExtendedType::Enum(_)) | None => {
                field_error!(FieldErrorKind::UnexpectedValue {
                    found: "an object".to_owned(),
                    expected: format!("a leaf value of type {ty_name}"),
                })
            }
        };
        let selections: Vec<&Selection> = fields
            .iter()
            .flat_map(|field| &field.selection_set.selections)
            .collect();
        execute_selection_set(
            ctx,
            path,
            ExecutionMode::Normal,
            object_type,
            &resolved_obj,
            selections,
            errors,
        )
        .await
        .map(JsonValue::Object)
    }
    .boxed()
}

/// Items are completed concurrently, each with its own path and errors
async fn complete_list_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    path: LinkedPath<'a>,
    ty: &'a Type,
    fields: &'a [&'a Field],
    items: Vec<Result<ResolvedValue, FieldError>>,
    errors: &mut Vec<GraphQLError>,
) -> Result<JsonValue, PropagateNull> {
    let Some(inner_ty) = ty.item_type() else {
        errors.push(GraphQLError::field_error(
            FieldErrorKind::UnexpectedValue {
                found: "a list".to_owned(),
                expected: format!("non-list type {ty}"),
            },
            path,
            fields,
        ));
        return Err(PropagateNull);
    };
    let item_paths: Vec<_> = (0..items.len())
        .map(|index| LinkedPathElement {
            element: ResponseDataPathSegment::ListIndex(index),
            next: path,
        })
        .collect();
    let completed = join_all(
        items
            .into_iter()
            .zip(&item_paths)
            .map(|(item, item_path)| complete_item(ctx, item_path, inner_ty, item, fields)),
    )
    .await;
    let mut completed_list = Vec::with_capacity(completed.len());
    let mut propagate = false;
    for (result, item_errors) in completed {
        errors.extend(item_errors);
        match result {
            Ok(value) => completed_list.push(value),
            // A non-null item could not be nullified: nullify the list instead
            Err(PropagateNull) => propagate = true,
        }
    }
    if propagate {
        Err(PropagateNull)
    } else {
        Ok(completed_list.into())
    }
}

async fn complete_item<'a>(
    ctx: &'a ExecutionContext<'a>,
    item_path: &'a LinkedPathElement<'a>,
    inner_ty: &'a Type,
    item: Result<ResolvedValue, FieldError>,
    fields: &'a [&'a Field],
) -> (Result<JsonValue, PropagateNull>, Vec<GraphQLError>) {
    let mut errors = Vec::new();
    let result = match item {
        Ok(resolved) => {
            complete_value(ctx, Some(item_path), inner_ty, resolved, fields, &mut errors).await
        }
        Err(error) => {
            errors.push(GraphQLError::field_error(
                FieldErrorKind::ResolverFailure(error),
                Some(item_path),
                fields,
            ));
            Err(PropagateNull)
        }
    };
    // On field error, try to nullify that item
    (try_nullify(inner_ty, result), errors)
}

fn complete_leaf_value(
    ctx: &ExecutionContext<'_>,
    path: LinkedPath<'_>,
    ty: &Type,
    json_value: JsonValue,
    fields: &[&Field],
    errors: &mut Vec<GraphQLError>,
) -> Result<JsonValue, PropagateNull> {
    let ty_name = ty.inner_named_type();
    let coerced = match ctx.schema.types.get(ty_name) {
        Some(ExtendedType::Scalar(def)) => def.serialize(&json_value),
        Some(ExtendedType::Enum(def)) => {
            // https://spec.graphql.org/October2021/#sec-Enums.Result-Coercion
            if json_value
                .as_str()
                .is_some_and(|str| def.values.contains(str))
            {
                Ok(json_value)
            } else {
                Err(format!("Enum {ty_name} cannot represent value: {json_value}"))
            }
        }
        _ => Err(format!("{ty_name} is not a leaf type")),
    };
    let kind = match coerced {
        Ok(JsonValue::Null) if ty.is_non_null() => {
            FieldErrorKind::NonNullViolation { ty: ty.clone() }
        }
        Ok(value) => return Ok(value),
        Err(message) => FieldErrorKind::LeafCoercion { message },
    };
    errors.push(GraphQLError::field_error(kind, path, fields));
    Err(PropagateNull)
}

/// Finds the concrete object type of a value whose static type is an interface or union.
///
/// In order of precedence, uses:
///
/// * The `resolve_type` discriminator of the abstract type
/// * The `is_type_of` test of possible types, if exactly one matches
/// * A string `__typename` entry of a value resolved from a JSON object
pub(crate) fn resolve_abstract_type<'a>(
    schema: &'a Schema,
    abstract_type: &Name,
    resolve_type: Option<&TypeResolver>,
    value: &ObjectValue,
) -> Result<&'a ObjectType, FieldErrorKind> {
    let ambiguous = |reason: String| {
        tracing::warn!(%abstract_type, reason = reason.as_str(), "could not resolve abstract type");
        FieldErrorKind::AmbiguousType {
            abstract_type: abstract_type.clone(),
            reason,
        }
    };
    let type_name = if let Some(resolve_type) = resolve_type {
        resolve_type
            .call(value)
            .ok_or_else(|| ambiguous("the type resolver returned no type".to_owned()))?
    } else {
        let mut matching = schema
            .possible_types(abstract_type)
            .filter_map(|name| schema.get_object(name))
            .filter(|def| def.check_is_type_of(value) == Some(true));
        match (matching.next(), matching.next()) {
            (Some(def), None) => return Ok(def),
            (Some(first), Some(second)) => {
                return Err(ambiguous(format!(
                    "both {} and {} match the value",
                    first.name, second.name
                )))
            }
            (None, _) => value
                .as_json()
                .and_then(|map: &JsonMap| map.get("__typename")?.as_str())
                .map(Name::new)
                .ok_or_else(|| ambiguous("no possible type matches the value".to_owned()))?,
        }
    };
    if !schema.is_subtype(abstract_type, &type_name) || type_name == *abstract_type {
        return Err(ambiguous(format!(
            "{type_name} is not a possible type of {abstract_type}"
        )));
    }
    schema
        .get_object(&type_name)
        .ok_or_else(|| ambiguous(format!("{type_name} is not an object type")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InterfaceType;
    use crate::schema::FieldDefinition;
    use crate::ty;
    use serde_json_bytes::json;

    struct Human;
    struct Droid;

    fn character_schema(with_resolve_type: bool) -> Schema {
        let mut character = InterfaceType::new("Character").field(FieldDefinition::new("name", ty!(String)));
        if with_resolve_type {
            character = character.resolve_type(|value| {
                if value.downcast_ref::<Human>().is_some() {
                    Some("Human".into())
                } else if value.downcast_ref::<Droid>().is_some() {
                    Some("Query".into())
                } else {
                    None
                }
            })
        }
        Schema::builder()
            .add_type(character)
            .add_type(
                ObjectType::new("Human")
                    .implements("Character")
                    .field(FieldDefinition::new("name", ty!(String)))
                    .is_type_of(|value| value.downcast_ref::<Human>().is_some()),
            )
            .add_type(
                ObjectType::new("Droid")
                    .implements("Character")
                    .field(FieldDefinition::new("name", ty!(String)))
                    .is_type_of(|value| value.downcast_ref::<Droid>().is_some()),
            )
            .add_type(ObjectType::new("Query").field(FieldDefinition::new("hero", ty!(Character))))
            .query("Query")
            .build()
            .unwrap()
    }

    fn resolve(schema: &Schema, value: ObjectValue) -> Result<&str, String> {
        let interface = schema.get_interface("Character").unwrap();
        resolve_abstract_type(schema, &interface.name, interface.resolve_type.as_ref(), &value)
            .map(|def| def.name.as_str())
            .map_err(|kind| kind.to_string())
    }

    #[test]
    fn discriminators() {
        let schema = character_schema(true);
        assert_eq!(resolve(&schema, ObjectValue::new(Human)), Ok("Human"));
        // The type resolver takes precedence, and names a type that is not a possible type
        assert_eq!(
            resolve(&schema, ObjectValue::new(Droid)),
            Err("could not determine the object type for abstract type Character: \
                 Query is not a possible type of Character"
                .to_owned())
        );

        let schema = character_schema(false);
        assert_eq!(resolve(&schema, ObjectValue::new(Droid)), Ok("Droid"));
        let from_json = |value: JsonValue| ObjectValue::new(value.as_object().unwrap().clone());
        assert_eq!(resolve(&schema, from_json(json!({"__typename": "Human"}))), Ok("Human"));
        assert_eq!(
            resolve(&schema, from_json(json!({"name": "?"}))),
            Err("could not determine the object type for abstract type Character: \
                 no possible type matches the value"
                .to_owned())
        );
        assert_eq!(
            resolve(&schema, from_json(json!({"__typename": "Character"}))),
            Err("could not determine the object type for abstract type Character: \
                 Character is not a possible type of Character"
                .to_owned())
        );
    }
}
