use apollo_executor::executable::Field;
use apollo_executor::executable::Operation;
use apollo_executor::executable::OperationType;
use apollo_executor::request::RequestError;
use apollo_executor::resolvers::ResolvedValue;
use apollo_executor::response::JsonMap;
use apollo_executor::response::LineColumn;
use apollo_executor::schema::FieldDefinition;
use apollo_executor::schema::ObjectType;
use apollo_executor::ty;
use apollo_executor::ExecutableDocument;
use apollo_executor::Execution;
use apollo_executor::Schema;
use expect_test::expect;

fn schema() -> Schema {
    Schema::builder()
        .add_type(
            ObjectType::new("Query")
                .field(FieldDefinition::new("a", ty!(Int)).resolve(|_| Ok(ResolvedValue::leaf(1))))
                .field(FieldDefinition::new("b", ty!(Int)).resolve(|_| Ok(ResolvedValue::leaf(2)))),
        )
        .query("Query")
        .build()
        .unwrap()
}

fn request_error(query: &str, operation_name: Option<&str>) -> RequestError {
    let schema = schema();
    let document = ExecutableDocument::parse(query).unwrap();
    Execution::new(&schema, &document)
        .operation_name(operation_name)
        .execute_sync()
        .unwrap_err()
}

#[test]
fn operation_selection() {
    let two_operations = "query A { a } query B { b }";
    assert_eq!(
        request_error(two_operations, None),
        RequestError::AmbiguousOperation
    );
    assert_eq!(
        request_error(two_operations, Some("C")),
        RequestError::UnknownOperation("C".into())
    );
    assert_eq!(
        request_error("fragment F on Query { a }", None),
        RequestError::NoOperation
    );

    let schema = schema();
    let document = ExecutableDocument::parse(two_operations).unwrap();
    let response = Execution::new(&schema, &document)
        .operation_name(Some("B"))
        .execute_sync()
        .unwrap();
    assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"data":{"b":2}}"#);
}

#[test]
fn unsupported_operations() {
    let err = request_error("mutation { a }", None);
    assert_eq!(err, RequestError::UndefinedRootOperation(OperationType::Mutation));
    assert_eq!(
        err.to_string(),
        "the schema does not define a mutation root operation type"
    );
    assert_eq!(
        request_error("subscription { a }", None),
        RequestError::SubscriptionNotSupported
    );
}

#[test]
fn invalid_variables() {
    let schema = schema();
    let query = "query Q($count: Int!, $name: String) { a }";
    let document = ExecutableDocument::parse(query).unwrap();

    let variables: JsonMap = serde_json::from_str(r#"{"count": "three"}"#).unwrap();
    let err = Execution::new(&schema, &document)
        .variable_values(&variables)
        .execute_sync()
        .unwrap_err();
    assert_eq!(err.location(), Some(LineColumn { line: 1, column: 9 }));
    let response = serde_json::to_string_pretty(&err.to_response()).unwrap();
    expect![[r#"
        {
          "errors": [
            {
              "message": "invalid value for variable $count: Int cannot represent non-integer value: \"three\"",
              "locations": [
                {
                  "line": 1,
                  "column": 9
                }
              ]
            }
          ]
        }"#]]
    .assert_eq(&response);

    let variables: JsonMap = serde_json::from_str(r#"{"count": null}"#).unwrap();
    let err = Execution::new(&schema, &document)
        .variable_values(&variables)
        .execute_sync()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for variable $count: null value for non-null type Int!"
    );

    // A list variable accepts a single item
    let document = ExecutableDocument::parse("query($ids: [Int!]) { a }").unwrap();
    let variables: JsonMap = serde_json::from_str(r#"{"ids": [1, "2"]}"#).unwrap();
    assert!(matches!(
        Execution::new(&schema, &document)
            .variable_values(&variables)
            .execute_sync(),
        Err(RequestError::InvalidVariable { .. })
    ));
    let variables: JsonMap = serde_json::from_str(r#"{"ids": 1}"#).unwrap();
    assert!(Execution::new(&schema, &document)
        .variable_values(&variables)
        .execute_sync()
        .is_ok());
}

#[test]
fn programmatic_document() {
    let schema = schema();
    let document = ExecutableDocument::new().operation(
        Operation::new(OperationType::Query)
            .selection(Field::new("b"))
            .selection(Field::new("a").alias("first")),
    );
    let response = futures::executor::block_on(apollo_executor::execute(
        &schema,
        &document,
        apollo_executor::resolvers::ObjectValue::new(()),
        Default::default(),
        &JsonMap::new(),
    ))
    .unwrap();
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"b":2,"first":1}}"#
    );
}

#[test]
fn parse_errors() {
    let errors = ExecutableDocument::parse("type Query { a: Int }\n{ a ").unwrap_err();
    assert!(errors.0.len() >= 2);
    let first = &errors.0[0];
    assert_eq!(first.location(), LineColumn { line: 1, column: 1 });
    assert!(matches!(
        first,
        apollo_executor::executable::ParseError::NonExecutableDefinition { .. }
    ));
}
