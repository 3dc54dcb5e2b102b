use crate::collections::HashMap;
use crate::collections::IndexMap;
use crate::collections::IndexSet;
use crate::executable::OperationType;
use crate::schema::scalars;
use crate::schema::ExtendedType;
use crate::schema::FieldDefinition;
use crate::schema::Schema;
use crate::Name;
use crate::Type;
use std::fmt;

/// Collects type definitions and root operation types, then validates them into a [`Schema`]
///
/// Built-in scalars `Int`, `Float`, `String`, `Boolean`, and `ID` are always registered.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    query_type: Option<Name>,
    mutation_type: Option<Name>,
    types: Vec<ExtendedType>,
}

/// A reason why a [`SchemaBuilder`] could not build a [`Schema`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("`{name}` is not a valid GraphQL name")]
    InvalidName { name: Name },

    #[error("the type `{name}` is defined multiple times")]
    DuplicateTypeName { name: Name },

    #[error("the type `{name}` used by {coordinate} is not defined")]
    UndefinedType { name: Name, coordinate: String },

    #[error("the schema does not define a query root operation type")]
    MissingQueryType,

    #[error("the {operation_type} root operation type `{name}` is not defined")]
    UndefinedRootType {
        operation_type: OperationType,
        name: Name,
    },

    #[error("the {operation_type} root operation type `{name}` must be an object type, found {describe}")]
    RootTypeNotObject {
        operation_type: OperationType,
        name: Name,
        describe: &'static str,
    },

    #[error("the member `{member}` of union `{union_name}` must be an object type, found {describe}")]
    UnionMemberNotObject {
        union_name: Name,
        member: Name,
        describe: &'static str,
    },

    #[error("`{object}` implements `{interface}`, which is {describe} rather than an interface type")]
    NotAnInterface {
        object: Name,
        interface: Name,
        describe: &'static str,
    },

    #[error("`{object}` implements `{interface}` but does not define its field `{field}`")]
    MissingInterfaceField {
        object: Name,
        interface: Name,
        field: Name,
    },

    #[error("the argument {coordinate} must have an input type, found {describe} `{ty}`")]
    OutputTypeAsArgument {
        coordinate: String,
        ty: Type,
        describe: &'static str,
    },
}

/// All errors found by [`SchemaBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildErrors(pub Vec<BuildError>);

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the object type for the `query` root operation
    pub fn query(mut self, name: impl Into<Name>) -> Self {
        self.query_type = Some(name.into());
        self
    }

    /// Sets the object type for the `mutation` root operation
    pub fn mutation(mut self, name: impl Into<Name>) -> Self {
        self.mutation_type = Some(name.into());
        self
    }

    /// Adds a named type definition
    pub fn add_type(mut self, definition: impl Into<ExtendedType>) -> Self {
        self.types.push(definition.into());
        self
    }

    pub fn build(self) -> Result<Schema, BuildErrors> {
        let mut errors = Vec::new();
        let mut types = IndexMap::<Name, ExtendedType>::default();
        for def in scalars::built_in_scalars()
            .into_iter()
            .map(ExtendedType::Scalar)
            .chain(self.types)
        {
            let name = def.name().clone();
            if !Name::valid_syntax(&name) {
                errors.push(BuildError::InvalidName { name: name.clone() })
            }
            if types.contains_key(&name) {
                errors.push(BuildError::DuplicateTypeName { name })
            } else {
                types.insert(name, def);
            }
        }

        let query_type = if let Some(name) = self.query_type {
            check_root_type(&types, OperationType::Query, &name, &mut errors);
            Some(name)
        } else {
            errors.push(BuildError::MissingQueryType);
            None
        };
        if let Some(name) = &self.mutation_type {
            check_root_type(&types, OperationType::Mutation, name, &mut errors)
        }

        let mut possible_types = HashMap::<Name, IndexSet<Name>>::default();
        for def in types.values() {
            match def {
                ExtendedType::Object(object) => {
                    check_fields(&types, &object.name, &object.fields, &mut errors);
                    for interface in &object.implements_interfaces {
                        match types.get(interface) {
                            Some(ExtendedType::Interface(interface_def)) => {
                                for field in interface_def.fields.keys() {
                                    if !object.fields.contains_key(field) {
                                        errors.push(BuildError::MissingInterfaceField {
                                            object: object.name.clone(),
                                            interface: interface.clone(),
                                            field: field.clone(),
                                        })
                                    }
                                }
                                possible_types
                                    .entry(interface.clone())
                                    .or_default()
                                    .insert(object.name.clone());
                            }
                            Some(other) => errors.push(BuildError::NotAnInterface {
                                object: object.name.clone(),
                                interface: interface.clone(),
                                describe: other.describe(),
                            }),
                            None => errors.push(BuildError::UndefinedType {
                                name: interface.clone(),
                                coordinate: format!("the implements list of `{}`", object.name),
                            }),
                        }
                    }
                }
                ExtendedType::Interface(interface) => {
                    check_fields(&types, &interface.name, &interface.fields, &mut errors);
                    // An interface without implementations still has an (empty) set
                    possible_types.entry(interface.name.clone()).or_default();
                }
                ExtendedType::Union(union_) => {
                    let members = possible_types.entry(union_.name.clone()).or_default();
                    for member in &union_.members {
                        match types.get(member) {
                            Some(ExtendedType::Object(_)) => {
                                members.insert(member.clone());
                            }
                            Some(other) => errors.push(BuildError::UnionMemberNotObject {
                                union_name: union_.name.clone(),
                                member: member.clone(),
                                describe: other.describe(),
                            }),
                            None => errors.push(BuildError::UndefinedType {
                                name: member.clone(),
                                coordinate: format!("the members of union `{}`", union_.name),
                            }),
                        }
                    }
                }
                ExtendedType::Scalar(_) | ExtendedType::Enum(_) => {}
            }
        }

        match query_type {
            Some(query_type) if errors.is_empty() => Ok(Schema {
                query_type,
                mutation_type: self.mutation_type,
                types,
                possible_types,
            }),
            _ => Err(BuildErrors(errors)),
        }
    }
}

fn check_root_type(
    types: &IndexMap<Name, ExtendedType>,
    operation_type: OperationType,
    name: &Name,
    errors: &mut Vec<BuildError>,
) {
    match types.get(name) {
        Some(ExtendedType::Object(_)) => {}
        Some(other) => errors.push(BuildError::RootTypeNotObject {
            operation_type,
            name: name.clone(),
            describe: other.describe(),
        }),
        None => errors.push(BuildError::UndefinedRootType {
            operation_type,
            name: name.clone(),
        }),
    }
}

fn check_fields(
    types: &IndexMap<Name, ExtendedType>,
    type_name: &Name,
    fields: &IndexMap<Name, FieldDefinition>,
    errors: &mut Vec<BuildError>,
) {
    for (field_name, field) in fields {
        if !Name::valid_syntax(field_name) {
            errors.push(BuildError::InvalidName {
                name: field_name.clone(),
            })
        }
        let ty_name = field.ty.inner_named_type();
        if !types.contains_key(ty_name) {
            errors.push(BuildError::UndefinedType {
                name: ty_name.clone(),
                coordinate: format!("the field `{type_name}.{field_name}`"),
            })
        }
        for (arg_name, arg) in &field.arguments {
            let coordinate = format!("`{type_name}.{field_name}({arg_name}:)`");
            let arg_ty_name = arg.ty.inner_named_type();
            match types.get(arg_ty_name) {
                Some(def) if def.is_input_type() => {}
                Some(def) => errors.push(BuildError::OutputTypeAsArgument {
                    coordinate,
                    ty: arg.ty.clone(),
                    describe: def.describe(),
                }),
                None => errors.push(BuildError::UndefinedType {
                    name: arg_ty_name.clone(),
                    coordinate: format!("the argument {coordinate}"),
                }),
            }
        }
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ArgumentDefinition;
    use crate::schema::InterfaceType;
    use crate::schema::ObjectType;
    use crate::schema::UnionType;
    use crate::ty;
    use pretty_assertions::assert_eq;

    #[test]
    fn possible_types() {
        let schema = Schema::builder()
            .add_type(InterfaceType::new("Character").field(FieldDefinition::new("name", ty!(String))))
            .add_type(
                ObjectType::new("Human")
                    .implements("Character")
                    .field(FieldDefinition::new("name", ty!(String))),
            )
            .add_type(
                ObjectType::new("Droid")
                    .implements("Character")
                    .field(FieldDefinition::new("name", ty!(String))),
            )
            .add_type(UnionType::new("SearchResult").member("Human"))
            .add_type(ObjectType::new("Query").field(FieldDefinition::new("hero", ty!(Character))))
            .query("Query")
            .build()
            .unwrap();
        let names = |type_name: &str| schema.possible_types(type_name).map(|n| n.as_str()).collect::<Vec<_>>();
        assert_eq!(names("Character"), ["Human", "Droid"]);
        assert_eq!(names("SearchResult"), ["Human"]);
        assert_eq!(names("Human"), ["Human"]);
        assert!(names("String").is_empty());
        assert!(schema.is_subtype("Character", "Droid"));
        assert!(!schema.is_subtype("SearchResult", "Droid"));
        assert!(schema.type_field("Character", "name").is_some());
        assert_eq!(schema.root_operation(OperationType::Query).unwrap().name, "Query");
        assert!(schema.root_operation(OperationType::Mutation).is_none());
    }

    #[test]
    fn errors() {
        let errors = Schema::builder()
            .add_type(
                ObjectType::new("Query")
                    .implements("Droid")
                    .field(FieldDefinition::new("hero", ty!([Character!])))
                    .field(
                        FieldDefinition::new("droid", ty!(Droid))
                            .argument("filter", ArgumentDefinition::new(ty!(Droid!))),
                    ),
            )
            .add_type(ObjectType::new("Droid"))
            .add_type(ObjectType::new("Droid"))
            .add_type(UnionType::new("U").member("String"))
            .mutation("Mutation")
            .build()
            .unwrap_err();
        expect_test::expect![[r#"
            the type `Droid` is defined multiple times
            the schema does not define a query root operation type
            the mutation root operation type `Mutation` is not defined
            the type `Character` used by the field `Query.hero` is not defined
            the argument `Query.droid(filter:)` must have an input type, found an object type `Droid!`
            `Query` implements `Droid`, which is an object type rather than an interface type
            the member `String` of union `U` must be an object type, found a scalar type"#]]
        .assert_eq(&errors.to_string());
    }
}
