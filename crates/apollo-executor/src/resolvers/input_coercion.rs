use crate::executable::Field;
use crate::executable::Operation;
use crate::executable::Value;
use crate::request::RequestError;
use crate::resolvers::execution::ExecutionContext;
use crate::resolvers::execution::FieldErrorKind;
use crate::resolvers::execution::LinkedPath;
use crate::resolvers::execution::PropagateNull;
use crate::response::GraphQLError;
use crate::response::JsonMap;
use crate::response::JsonValue;
use crate::schema::ExtendedType;
use crate::schema::FieldDefinition;
use crate::Schema;
use crate::Type;

/// Coerce the values of variables from a GraphQL request to the types expected by the operation.
///
/// If type coercion fails, a request error is returned and the request must not be executed.
///
/// A variable with neither a provided value nor a default is left out of the returned map,
/// so that a non-null argument using it fails with a field error.
///
/// This is [CoerceVariableValues()](https://spec.graphql.org/October2021/#CoerceVariableValues())
/// in the GraphQL specification.
pub fn coerce_variable_values(
    schema: &Schema,
    operation: &Operation,
    values: &JsonMap,
) -> Result<JsonMap, RequestError> {
    let mut coerced_values = JsonMap::new();
    for variable_def in &operation.variables {
        let name = variable_def.name.as_str();
        let invalid = |message| RequestError::InvalidVariable {
            name: variable_def.name.clone(),
            message,
            location: variable_def.location,
        };
        if let Some((key, value)) = values.get_key_value(name) {
            let value = coerce_input_value(schema, &variable_def.ty, value).map_err(invalid)?;
            coerced_values.insert(key.clone(), value);
        } else if let Some(default) = &variable_def.default_value {
            let default = graphql_value_to_json(default, &JsonMap::new());
            let value = coerce_input_value(schema, &variable_def.ty, &default).map_err(invalid)?;
            coerced_values.insert(name, value);
        } else {
            // No value nor default, even for a non-null variable:
            // only arguments that use it are affected
        }
    }
    Ok(coerced_values)
}

/// <https://spec.graphql.org/October2021/#CoerceArgumentValues()>
///
/// On error, the field error is pushed and the resolver must not be called.
pub(crate) fn coerce_argument_values(
    ctx: &ExecutionContext<'_>,
    path: LinkedPath<'_>,
    field_def: &FieldDefinition,
    fields: &[&Field],
    errors: &mut Vec<GraphQLError>,
) -> Result<JsonMap, PropagateNull> {
    // Indexing should not panic: `collect_fields` only creates a `Vec` to push to it
    let field = fields[0];
    let mut coerced_values = JsonMap::new();
    for (arg_name, arg_def) in &field_def.arguments {
        let mut field_error = |kind| {
            errors.push(GraphQLError::field_error(kind, path, fields));
            PropagateNull
        };
        let value = match field.argument_by_name(arg_name) {
            // Variables were already coerced to their own type
            Some(Value::Variable(var_name)) => ctx.variable_values.get(var_name.as_str()).cloned(),
            Some(literal) => {
                let value = graphql_value_to_json(literal, ctx.variable_values);
                let value = coerce_input_value(ctx.schema, &arg_def.ty, &value).map_err(|message| {
                    field_error(FieldErrorKind::InvalidArgument {
                        argument: arg_name.clone(),
                        message,
                    })
                })?;
                Some(value)
            }
            None => None,
        };
        match value.or_else(|| arg_def.default_value.clone()) {
            Some(JsonValue::Null) if arg_def.ty.is_non_null() => {
                return Err(field_error(FieldErrorKind::InvalidArgument {
                    argument: arg_name.clone(),
                    message: format!("null value for non-null type {}", arg_def.ty),
                }))
            }
            Some(value) => {
                coerced_values.insert(arg_name.as_str(), value);
            }
            None if arg_def.ty.is_non_null() => {
                return Err(field_error(FieldErrorKind::MissingArgument {
                    argument: arg_name.clone(),
                    ty: arg_def.ty.clone(),
                }))
            }
            None => {}
        }
    }
    Ok(coerced_values)
}

/// Input coercion of a JSON value to a scalar or enum type, possibly wrapped in lists.
///
/// <https://spec.graphql.org/October2021/#sec-Input-Values>
pub(crate) fn coerce_input_value(
    schema: &Schema,
    ty: &Type,
    value: &JsonValue,
) -> Result<JsonValue, String> {
    if value.is_null() {
        if ty.is_non_null() {
            return Err(format!("null value for non-null type {ty}"));
        } else {
            return Ok(JsonValue::Null);
        }
    }
    let ty_name = match ty {
        Type::List(inner) | Type::NonNullList(inner) => {
            // https://spec.graphql.org/October2021/#sec-List.Input-Coercion
            return value
                .as_array()
                .map(Vec::as_slice)
                // If not an array, treat the value as an array of size one:
                .unwrap_or(std::slice::from_ref(value))
                .iter()
                .map(|item| coerce_input_value(schema, inner, item))
                .collect();
        }
        Type::Named(ty_name) | Type::NonNullNamed(ty_name) => ty_name,
    };
    match schema.types.get(ty_name) {
        Some(ExtendedType::Scalar(def)) => def.parse(value),
        Some(ExtendedType::Enum(def)) => {
            // https://spec.graphql.org/October2021/#sec-Enums.Input-Coercion
            if value.as_str().is_some_and(|str| def.values.contains(str)) {
                Ok(value.clone())
            } else {
                Err(format!("{value} is not a value of enum {ty_name}"))
            }
        }
        Some(def) => Err(format!("{ty_name} is {}, not an input type", def.describe())),
        None => Err(format!("undefined type {ty_name}")),
    }
}

/// Converts a literal from the document, substituting nested variables
fn graphql_value_to_json(value: &Value, variable_values: &JsonMap) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Variable(name) => variable_values
            .get(name.as_str())
            .cloned()
            .unwrap_or(JsonValue::Null),
        Value::Enum(value) => value.as_str().into(),
        Value::String(value) => value.as_str().into(),
        Value::Boolean(value) => (*value).into(),
        Value::Int(value) => (*value).into(),
        Value::Float(value) => (*value).into(),
        Value::List(value) => value
            .iter()
            .map(|value| graphql_value_to_json(value, variable_values))
            .collect(),
        Value::Object(value) => JsonValue::Object(
            value
                .iter()
                .map(|(key, value)| {
                    (
                        key.as_str().into(),
                        graphql_value_to_json(value, variable_values),
                    )
                })
                .collect(),
        ),
    }
}
