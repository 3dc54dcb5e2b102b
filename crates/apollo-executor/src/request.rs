//! GraphQL [requests](https://spec.graphql.org/draft/#request)

use crate::executable::OperationType;
use crate::response::GraphQLError;
use crate::response::LineColumn;
use crate::Name;

/// A [request error](https://spec.graphql.org/draft/#sec-Errors.Request-Errors) is an error
/// raised during an early phase of the [execution](https://spec.graphql.org/draft/#sec-Execution)
/// to indicate that the request as a whole is considered faulty.
///
/// A request error causes the rest of execution to be aborted,
/// and should result in a GraphQL response that does not have a `data` key.
/// This differs from a response with `"data": null` which can happen with
/// a [field error](https://spec.graphql.org/draft/#sec-Errors.Field-Errors)
/// on a non-null field whose ancestors fields are all also non-null.
/// In that case the `null` value
/// is [propagated](https://spec.graphql.org/draft/#sec-Handling-Field-Errors)
/// all the way to the entire response data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("the document does not contain any operation")]
    NoOperation,

    #[error("operation name is required when the document contains multiple operations")]
    AmbiguousOperation,

    #[error("the document does not contain an operation named `{0}`")]
    UnknownOperation(Name),

    #[error("the schema does not define a {0} root operation type")]
    UndefinedRootOperation(OperationType),

    #[error("subscription operations cannot be executed")]
    SubscriptionNotSupported,

    #[error("invalid value for variable ${name}: {message}")]
    InvalidVariable {
        name: Name,
        message: String,
        location: Option<LineColumn>,
    },
}

impl RequestError {
    pub fn location(&self) -> Option<LineColumn> {
        match self {
            RequestError::InvalidVariable { location, .. } => *location,
            _ => None,
        }
    }

    pub fn to_graphql_error(&self) -> GraphQLError {
        GraphQLError::new(self.to_string(), self.location())
    }

    /// Converts this error into a response with a single error and no `data`
    pub fn to_response(&self) -> RequestErrorResponse {
        RequestErrorResponse {
            errors: vec![self.to_graphql_error()],
        }
    }
}

/// A response for a request that failed before execution started
///
/// Unlike [`ExecutionResponse`][crate::response::ExecutionResponse], this serializes without a `data` key.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestErrorResponse {
    pub errors: Vec<GraphQLError>,
}

