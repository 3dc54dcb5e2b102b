//! The executable document consumed by execution: operations, fragments, and selections
//!
//! Documents are usually obtained from query text with [`ExecutableDocument::parse`],
//! but can also be built programmatically:
//!
//! ```
//! use apollo_executor::executable::*;
//!
//! let document = ExecutableDocument::new()
//!     .operation(Operation::new(OperationType::Query).selection(
//!         Field::new("hero").selection(Field::new("name")),
//!     ));
//! assert_eq!(document.operations.len(), 1);
//! ```
//!
//! Execution assumes the document was validated against the schema.
//! It defends against unknown fragments and undefined fields by skipping them,
//! but it is not a validator.

use crate::collections::IndexMap;
use crate::request::RequestError;
use crate::response::LineColumn;
use crate::Name;
use crate::Type;
use std::fmt;

mod from_cst;

pub use self::from_cst::ParseError;
pub use self::from_cst::ParseErrors;

/// Operations and fragments of a GraphQL request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutableDocument {
    /// Operations in document order
    pub operations: Vec<Operation>,
    pub fragments: IndexMap<Name, Fragment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<VariableDefinition>,
    pub directives: DirectiveList,
    pub selection_set: SelectionSet,
    pub location: Option<LineColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub location: Option<LineColumn>,
}

/// A named fragment definition: `fragment Name on TypeCondition { … }`
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub name: Name,
    pub type_condition: Name,
    pub directives: DirectiveList,
    pub selection_set: SelectionSet,
    pub location: Option<LineColumn>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub directives: DirectiveList,
    /// Empty for leaf fields
    pub selection_set: SelectionSet,
    pub location: Option<LineColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub fragment_name: Name,
    pub directives: DirectiveList,
    pub location: Option<LineColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<Name>,
    pub directives: DirectiveList,
    pub selection_set: SelectionSet,
    pub location: Option<LineColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Name,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveList(pub Vec<Directive>);

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Argument>,
}

/// A literal value in a document, possibly containing variable references
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Enum(Name),
    Variable(Name),
    String(String),
    Float(f64),
    Int(i64),
    Boolean(bool),
    List(Vec<Value>),
    Object(Vec<(Name, Value)>),
}

impl ExecutableDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation, builder-style
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Adds a fragment definition, builder-style
    pub fn fragment(mut self, fragment: Fragment) -> Self {
        self.fragments.insert(fragment.name.clone(), fragment);
        self
    }

    /// Returns the operation with the given name,
    /// or the only operation of the document if `name` is `None`.
    ///
    /// This is [_GetOperation()_](https://spec.graphql.org/October2021/#GetOperation())
    /// in the GraphQL specification.
    pub fn get_operation(&self, name: Option<&str>) -> Result<&Operation, RequestError> {
        if let Some(name) = name {
            self.operations
                .iter()
                .find(|op| op.name.as_ref().is_some_and(|op_name| op_name == name))
                .ok_or_else(|| RequestError::UnknownOperation(name.into()))
        } else {
            match self.operations.as_slice() {
                [] => Err(RequestError::NoOperation),
                [single] => Ok(single),
                _ => Err(RequestError::AmbiguousOperation),
            }
        }
    }
}

impl Operation {
    pub fn new(operation_type: OperationType) -> Self {
        Self {
            operation_type,
            name: None,
            variables: Vec::new(),
            directives: DirectiveList::default(),
            selection_set: SelectionSet::default(),
            location: None,
        }
    }

    pub fn name(mut self, name: impl Into<Name>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn variable(mut self, variable: VariableDefinition) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn selection(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.selections.push(selection.into());
        self
    }
}

impl VariableDefinition {
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
            location: None,
        }
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

impl Fragment {
    pub fn new(name: impl Into<Name>, type_condition: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            type_condition: type_condition.into(),
            directives: DirectiveList::default(),
            selection_set: SelectionSet::default(),
            location: None,
        }
    }

    pub fn selection(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.selections.push(selection.into());
        self
    }
}

impl Selection {
    pub fn directives(&self) -> &DirectiveList {
        match self {
            Self::Field(field) => &field.directives,
            Self::FragmentSpread(spread) => &spread.directives,
            Self::InlineFragment(inline) => &inline.directives,
        }
    }

    pub fn location(&self) -> Option<LineColumn> {
        match self {
            Self::Field(field) => field.location,
            Self::FragmentSpread(spread) => spread.location,
            Self::InlineFragment(inline) => inline.location,
        }
    }
}

impl From<Field> for Selection {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<FragmentSpread> for Selection {
    fn from(spread: FragmentSpread) -> Self {
        Self::FragmentSpread(spread)
    }
}

impl From<InlineFragment> for Selection {
    fn from(inline: InlineFragment) -> Self {
        Self::InlineFragment(inline)
    }
}

impl Field {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Vec::new(),
            directives: DirectiveList::default(),
            selection_set: SelectionSet::default(),
            location: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<Name>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<Name>, value: Value) -> Self {
        self.arguments.push(Argument {
            name: name.into(),
            value,
        });
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.0.push(directive);
        self
    }

    pub fn selection(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.selections.push(selection.into());
        self
    }

    pub fn location(mut self, line: usize, column: usize) -> Self {
        self.location = Some(LineColumn { line, column });
        self
    }

    /// Returns the alias if there is one, or else the field name.
    ///
    /// This is the key of this field in response data.
    pub fn response_key(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    pub fn argument_by_name(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

impl FragmentSpread {
    pub fn new(fragment_name: impl Into<Name>) -> Self {
        Self {
            fragment_name: fragment_name.into(),
            directives: DirectiveList::default(),
            location: None,
        }
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.0.push(directive);
        self
    }
}

impl InlineFragment {
    pub fn new(type_condition: Option<Name>) -> Self {
        Self {
            type_condition,
            directives: DirectiveList::default(),
            selection_set: SelectionSet::default(),
            location: None,
        }
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.0.push(directive);
        self
    }

    pub fn selection(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.selections.push(selection.into());
        self
    }
}

impl DirectiveList {
    /// Returns the first directive with the given name, if any.
    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.0.iter().find(|dir| dir.name == name)
    }
}

impl Directive {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn argument(mut self, name: impl Into<Name>, value: Value) -> Self {
        self.arguments.push(Argument {
            name: name.into(),
            value,
        });
        self
    }

    pub fn specified_argument_by_name(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_variable(&self) -> Option<&Name> {
        if let Value::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

impl From<&'_ str> for Value {
    fn from(value: &'_ str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}
