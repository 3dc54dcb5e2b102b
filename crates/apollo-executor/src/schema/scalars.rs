//! Built-in scalar types, registered in every schema

use crate::response::JsonValue;
use crate::schema::ScalarType;

pub(crate) fn built_in_scalars() -> [ScalarType; 5] {
    [
        ScalarType::new("Int")
            .description("The `Int` scalar type represents non-fractional signed whole numeric values.")
            .serialize_with(int)
            .parse_with(int),
        ScalarType::new("Float")
            .description("The `Float` scalar type represents signed double-precision fractional values.")
            .serialize_with(float)
            .parse_with(float),
        ScalarType::new("String")
            .description("The `String` scalar type represents textual data.")
            .serialize_with(string)
            .parse_with(string),
        ScalarType::new("Boolean")
            .description("The `Boolean` scalar type represents `true` or `false`.")
            .serialize_with(boolean)
            .parse_with(boolean),
        ScalarType::new("ID")
            .description("The `ID` scalar type represents a unique identifier.")
            .serialize_with(id)
            .parse_with(id),
    ]
}

// https://spec.graphql.org/October2021/#sec-Int
//
// Non-integer values are not coerced, even when that would not lose information.
fn int(value: &JsonValue) -> Result<JsonValue, String> {
    match value.as_i64() {
        Some(int) if i32::try_from(int).is_ok() => Ok(value.clone()),
        Some(_) => Err(format!("Int cannot represent non 32-bit signed integer value: {value}")),
        None => Err(format!("Int cannot represent non-integer value: {value}")),
    }
}

// https://spec.graphql.org/October2021/#sec-Float
fn float(value: &JsonValue) -> Result<JsonValue, String> {
    if value.is_f64() {
        Ok(value.clone())
    } else if let Some(float) = value.as_f64() {
        // Integer input
        Ok(float.into())
    } else {
        Err(format!("Float cannot represent non numeric value: {value}"))
    }
}

// https://spec.graphql.org/October2021/#sec-String
fn string(value: &JsonValue) -> Result<JsonValue, String> {
    if value.is_string() {
        Ok(value.clone())
    } else {
        Err(format!("String cannot represent a non string value: {value}"))
    }
}

// https://spec.graphql.org/October2021/#sec-Boolean
fn boolean(value: &JsonValue) -> Result<JsonValue, String> {
    if value.is_boolean() {
        Ok(value.clone())
    } else {
        Err(format!("Boolean cannot represent a non boolean value: {value}"))
    }
}

// https://spec.graphql.org/October2021/#sec-ID
//
// Serialized as a string, even when the underlying value is an integer.
fn id(value: &JsonValue) -> Result<JsonValue, String> {
    if value.is_string() {
        Ok(value.clone())
    } else if let Some(int) = value.as_i64() {
        Ok(int.to_string().into())
    } else {
        Err(format!("ID cannot represent value: {value}"))
    }
}
