use crate::executable::Argument;
use crate::executable::Directive;
use crate::executable::DirectiveList;
use crate::executable::ExecutableDocument;
use crate::executable::Field;
use crate::executable::Fragment;
use crate::executable::FragmentSpread;
use crate::executable::InlineFragment;
use crate::executable::Operation;
use crate::executable::OperationType;
use crate::executable::Selection;
use crate::executable::SelectionSet;
use crate::executable::Value;
use crate::executable::VariableDefinition;
use crate::response::LineColumn;
use crate::Name;
use crate::Type;
use apollo_parser::cst;
use apollo_parser::cst::CstNode;
use apollo_parser::SyntaxKind;
use apollo_parser::SyntaxNode;
use apollo_parser::S;
use std::fmt;

/// An error found while parsing an executable document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    Syntax {
        message: String,
        location: LineColumn,
    },

    #[error("an executable document must not contain {describe}")]
    NonExecutableDefinition {
        describe: &'static str,
        location: LineColumn,
    },

    #[error("the fragment `{name}` is defined multiple times in the document")]
    FragmentDefinitionCollision { name: Name, location: LineColumn },
}

/// Errors returned by [`ExecutableDocument::parse`], in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseError {
    pub fn location(&self) -> LineColumn {
        match self {
            ParseError::Syntax { location, .. }
            | ParseError::NonExecutableDefinition { location, .. }
            | ParseError::FragmentDefinitionCollision { location, .. } => *location,
        }
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}: {error}", error.location())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

impl ExecutableDocument {
    /// Parses GraphQL query text into an executable document.
    ///
    /// Source locations of fields and fragments are recorded
    /// so that field errors can point back into `source_text`.
    /// Parsing does not validate the document against any schema.
    pub fn parse(source_text: &str) -> Result<Self, ParseErrors> {
        let tree = apollo_parser::Parser::new(source_text).parse();
        let converter = Converter::new(source_text);
        let mut errors: Vec<ParseError> = tree
            .errors()
            .map(|err| ParseError::Syntax {
                message: err.message().to_owned(),
                location: converter.line_column(err.index()),
            })
            .collect();
        let mut document = ExecutableDocument::new();
        for definition in tree.document().definitions() {
            match &definition {
                cst::Definition::OperationDefinition(def) => {
                    if let Some(operation) = def.convert(&converter) {
                        document.operations.push(operation)
                    }
                }
                cst::Definition::FragmentDefinition(def) => {
                    let Some(fragment) = def.convert(&converter) else {
                        continue;
                    };
                    if document.fragments.contains_key(&fragment.name) {
                        errors.push(ParseError::FragmentDefinitionCollision {
                            location: fragment
                                .location
                                .unwrap_or_else(|| converter.location(def.syntax())),
                            name: fragment.name,
                        })
                    } else {
                        document.fragments.insert(fragment.name.clone(), fragment);
                    }
                }
                other => errors.push(ParseError::NonExecutableDefinition {
                    describe: describe(other),
                    location: converter.location(other.syntax()),
                }),
            }
        }
        if errors.is_empty() {
            Ok(document)
        } else {
            errors.sort_by_key(|err| err.location());
            Err(ParseErrors(errors))
        }
    }
}

fn describe(definition: &cst::Definition) -> &'static str {
    match definition {
        cst::Definition::OperationDefinition(_) => "an operation definition",
        cst::Definition::FragmentDefinition(_) => "a fragment definition",
        cst::Definition::DirectiveDefinition(_) => "a directive definition",
        cst::Definition::SchemaDefinition(_) => "a schema definition",
        cst::Definition::SchemaExtension(_) => "a schema extension",
        _ => "a type definition or extension",
    }
}

/// Maps byte offsets in the source text to line and column numbers
struct Converter<'a> {
    source_text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> Converter<'a> {
    fn new(source_text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source_text.match_indices('\n').map(|(index, _)| index + 1));
        Self {
            source_text,
            line_starts,
        }
    }

    fn line_column(&self, offset: usize) -> LineColumn {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .source_text
            .get(line_start..offset)
            .map_or(0, |text| text.chars().count());
        LineColumn {
            line: line + 1,
            column: column + 1,
        }
    }

    /// The location of the first significant token of a node,
    /// excluding any leading whitespace, comments, or commas.
    fn location(&self, node: &SyntaxNode) -> LineColumn {
        let offset = node
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| {
                !matches!(
                    token.kind(),
                    SyntaxKind::WHITESPACE | SyntaxKind::COMMENT | SyntaxKind::COMMA
                )
            })
            .map_or_else(|| node.text_range().start(), |token| token.text_range().start());
        self.line_column(offset.into())
    }
}

/// Similar to `TryFrom`, but with an `Option` return type because the CST uses Option a lot.
///
/// `None` is returned for incomplete nodes, which have a corresponding syntax error.
trait Convert {
    type Target;
    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target>;
}

impl<T: Convert> Convert for Option<T> {
    type Target = Option<T::Target>;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(if let Some(inner) = self {
            Some(inner.convert(converter)?)
        } else {
            None
        })
    }
}

/// Convert and collect, silently skipping entries with conversion errors
/// as they have corresponding parse errors in `SyntaxTree::errors`
fn collect<C: Convert>(
    converter: &Converter<'_>,
    iter: impl IntoIterator<Item = C>,
) -> Vec<C::Target> {
    iter.into_iter()
        .filter_map(|node| node.convert(converter))
        .collect()
}

fn directives(converter: &Converter<'_>, directives: Option<cst::Directives>) -> DirectiveList {
    DirectiveList(
        directives
            .map(|x| collect(converter, x.directives()))
            .unwrap_or_default(),
    )
}

impl Convert for cst::OperationDefinition {
    type Target = Operation;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        let operation_type = if let Some(ty) = self.operation_type() {
            ty.convert(converter)?
        } else {
            OperationType::Query
        };
        Some(Self::Target {
            operation_type,
            name: self.name().convert(converter)?,
            variables: self
                .variable_definitions()
                .map(|x| collect(converter, x.variable_definitions()))
                .unwrap_or_default(),
            directives: directives(converter, self.directives()),
            selection_set: self.selection_set()?.convert(converter)?,
            location: Some(converter.location(self.syntax())),
        })
    }
}

impl Convert for cst::OperationType {
    type Target = OperationType;

    fn convert(&self, _converter: &Converter<'_>) -> Option<Self::Target> {
        let token = self.syntax().first_token()?;
        match token.kind() {
            S![query] => Some(OperationType::Query),
            S![mutation] => Some(OperationType::Mutation),
            S![subscription] => Some(OperationType::Subscription),
            _ => None,
        }
    }
}

impl Convert for cst::VariableDefinition {
    type Target = VariableDefinition;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        let default_value = if let Some(default) = self.default_value() {
            Some(default.value()?.convert(converter)?)
        } else {
            None
        };
        Some(Self::Target {
            name: self.variable()?.name()?.convert(converter)?,
            ty: self.ty()?.convert(converter)?,
            default_value,
            location: Some(converter.location(self.syntax())),
        })
    }
}

impl Convert for cst::Type {
    type Target = Type;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        match self {
            cst::Type::NamedType(name) => Some(Type::Named(name.name()?.convert(converter)?)),
            cst::Type::ListType(inner) => Some(inner.ty()?.convert(converter)?.list()),
            cst::Type::NonNullType(inner) => {
                if let Some(named) = inner.named_type() {
                    Some(Type::NonNullNamed(named.name()?.convert(converter)?))
                } else if let Some(list) = inner.list_type() {
                    Some(Type::NonNullList(Box::new(list.ty()?.convert(converter)?)))
                } else {
                    None
                }
            }
        }
    }
}

impl Convert for cst::FragmentDefinition {
    type Target = Fragment;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.fragment_name()?.name()?.convert(converter)?,
            type_condition: self.type_condition()?.convert(converter)?,
            directives: directives(converter, self.directives()),
            selection_set: self.selection_set()?.convert(converter)?,
            location: Some(converter.location(self.syntax())),
        })
    }
}

impl Convert for cst::TypeCondition {
    type Target = Name;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        self.named_type()?.name()?.convert(converter)
    }
}

impl Convert for cst::SelectionSet {
    type Target = SelectionSet;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(SelectionSet {
            selections: collect(converter, self.selections()),
        })
    }
}

impl Convert for cst::Selection {
    type Target = Selection;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(match self {
            cst::Selection::Field(x) => Selection::Field(x.convert(converter)?),
            cst::Selection::FragmentSpread(x) => Selection::FragmentSpread(x.convert(converter)?),
            cst::Selection::InlineFragment(x) => Selection::InlineFragment(x.convert(converter)?),
        })
    }
}

impl Convert for cst::Field {
    type Target = Field;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            alias: self.alias().convert(converter)?,
            name: self.name()?.convert(converter)?,
            arguments: self
                .arguments()
                .map(|x| collect(converter, x.arguments()))
                .unwrap_or_default(),
            directives: directives(converter, self.directives()),
            // Use an empty selection set for a field without sub-selections
            selection_set: self.selection_set().convert(converter)?.unwrap_or_default(),
            location: Some(converter.location(self.syntax())),
        })
    }
}

impl Convert for cst::FragmentSpread {
    type Target = FragmentSpread;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            fragment_name: self.fragment_name()?.name()?.convert(converter)?,
            directives: directives(converter, self.directives()),
            location: Some(converter.location(self.syntax())),
        })
    }
}

impl Convert for cst::InlineFragment {
    type Target = InlineFragment;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            type_condition: self.type_condition().convert(converter)?,
            directives: directives(converter, self.directives()),
            selection_set: self.selection_set()?.convert(converter)?,
            location: Some(converter.location(self.syntax())),
        })
    }
}

impl Convert for cst::Directive {
    type Target = Directive;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(converter)?,
            arguments: self
                .arguments()
                .map(|x| collect(converter, x.arguments()))
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::Argument {
    type Target = Argument;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(Argument {
            name: self.name()?.convert(converter)?,
            value: self.value()?.convert(converter)?,
        })
    }
}

impl Convert for cst::Value {
    type Target = Value;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some(match self {
            cst::Value::Variable(v) => Value::Variable(v.name()?.convert(converter)?),
            cst::Value::StringValue(v) => Value::String(String::from(v)),
            cst::Value::FloatValue(v) => {
                Value::Float(v.syntax().first_token()?.text().parse().ok()?)
            }
            cst::Value::IntValue(v) => {
                let text = v.syntax().first_token()?;
                let text = text.text();
                // Out of range for i64: keep the value, with reduced precision
                match text.parse() {
                    Ok(int) => Value::Int(int),
                    Err(_) => Value::Float(text.parse().ok()?),
                }
            }
            cst::Value::BooleanValue(v) => Value::Boolean(bool::try_from(v).ok()?),
            cst::Value::NullValue(_) => Value::Null,
            cst::Value::EnumValue(v) => Value::Enum(v.name()?.convert(converter)?),
            cst::Value::ListValue(v) => Value::List(collect(converter, v.values())),
            cst::Value::ObjectValue(v) => Value::Object(collect(converter, v.object_fields())),
        })
    }
}

impl Convert for cst::ObjectField {
    type Target = (Name, Value);

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        Some((
            self.name()?.convert(converter)?,
            self.value()?.convert(converter)?,
        ))
    }
}

impl Convert for cst::Alias {
    type Target = Name;

    fn convert(&self, converter: &Converter<'_>) -> Option<Self::Target> {
        self.name()?.convert(converter)
    }
}

impl Convert for cst::Name {
    type Target = Name;

    fn convert(&self, _converter: &Converter<'_>) -> Option<Self::Target> {
        Some(Name::new(self.text().as_str()))
    }
}
