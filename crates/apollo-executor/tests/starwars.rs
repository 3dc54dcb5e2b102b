use apollo_executor::resolvers::FieldError;
use apollo_executor::resolvers::ObjectValue;
use apollo_executor::resolvers::ResolvedValue;
use apollo_executor::response::ExecutionResponse;
use apollo_executor::response::JsonMap;
use apollo_executor::response::JsonValue;
use apollo_executor::schema::ArgumentDefinition;
use apollo_executor::schema::EnumType;
use apollo_executor::schema::FieldDefinition;
use apollo_executor::schema::InterfaceType;
use apollo_executor::schema::ObjectType;
use apollo_executor::schema::UnionType;
use apollo_executor::ty;
use apollo_executor::ExecutableDocument;
use apollo_executor::Execution;
use apollo_executor::Schema;
use apollo_executor::Type;
use expect_test::expect;
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Species {
    Human,
    Droid,
}

struct Character {
    id: &'static str,
    name: &'static str,
    species: Species,
    friends: &'static [&'static str],
    home_planet: Option<&'static str>,
    primary_function: Option<&'static str>,
}

struct Planet {
    id: &'static str,
    name: &'static str,
    diameter: i32,
}

const EPISODES: [&str; 3] = ["NEWHOPE", "EMPIRE", "JEDI"];

static CHARACTERS: [Character; 7] = [
    Character {
        id: "1000",
        name: "Luke Skywalker",
        species: Species::Human,
        friends: &["1002", "1003", "2000", "2001"],
        home_planet: Some("Tatooine"),
        primary_function: None,
    },
    Character {
        id: "1001",
        name: "Darth Vader",
        species: Species::Human,
        friends: &["1004"],
        home_planet: Some("Tatooine"),
        primary_function: None,
    },
    Character {
        id: "1002",
        name: "Han Solo",
        species: Species::Human,
        friends: &["1000", "1003", "2001"],
        home_planet: None,
        primary_function: None,
    },
    Character {
        id: "1003",
        name: "Leia Organa",
        species: Species::Human,
        friends: &["1000", "1002", "2000", "2001"],
        home_planet: Some("Alderaan"),
        primary_function: None,
    },
    Character {
        id: "1004",
        name: "Wilhuff Tarkin",
        species: Species::Human,
        friends: &["1001"],
        home_planet: None,
        primary_function: None,
    },
    Character {
        id: "2000",
        name: "C-3PO",
        species: Species::Droid,
        friends: &["1000", "1002", "1003", "2001"],
        home_planet: None,
        primary_function: Some("Protocol"),
    },
    Character {
        id: "2001",
        name: "R2-D2",
        species: Species::Droid,
        friends: &["1000", "1002", "1003"],
        home_planet: None,
        primary_function: Some("Astromech"),
    },
];

static PLANETS: [Planet; 2] = [
    Planet {
        id: "10001",
        name: "Tatooine",
        diameter: 10465,
    },
    Planet {
        id: "10002",
        name: "Alderaan",
        diameter: 12500,
    },
];

fn character_by_id(id: &str) -> Option<&'static Character> {
    CHARACTERS.iter().find(|character| character.id == id)
}

fn planet_by_name(name: &str) -> Option<&'static Planet> {
    PLANETS.iter().find(|planet| planet.name == name)
}

fn character_field(
    name: &str,
    ty: Type,
    resolve: impl Fn(&'static Character) -> Result<ResolvedValue, FieldError> + Send + Sync + 'static,
) -> FieldDefinition {
    FieldDefinition::new(name, ty).resolve(move |info| {
        let character = *info
            .parent_as::<&'static Character>()
            .ok_or_else(|| FieldError::new("expected a character"))?;
        resolve(character)
    })
}

fn planet_field(
    name: &str,
    ty: Type,
    resolve: impl Fn(&'static Planet) -> ResolvedValue + Send + Sync + 'static,
) -> FieldDefinition {
    FieldDefinition::new(name, ty).resolve(move |info| {
        let planet = *info
            .parent_as::<&'static Planet>()
            .ok_or_else(|| FieldError::new("expected a planet"))?;
        Ok(resolve(planet))
    })
}

fn with_character_fields(object: ObjectType) -> ObjectType {
    object
        .field(character_field("id", ty!(String!), |character| {
            Ok(ResolvedValue::leaf(character.id))
        }))
        .field(character_field("name", ty!(String), |character| {
            Ok(ResolvedValue::leaf(character.name))
        }))
        .field(character_field("friends", ty!([Character]), |character| {
            Ok(ResolvedValue::list(
                character
                    .friends
                    .iter()
                    .filter_map(|id| character_by_id(id))
                    .map(ResolvedValue::object),
            ))
        }))
        .field(character_field("appearsIn", ty!([Episode]), |_| {
            Ok(ResolvedValue::list(EPISODES.map(ResolvedValue::leaf)))
        }))
        .field(character_field("secretBackstory", ty!(String), |_| {
            Err(FieldError::new("secretBackstory is secret."))
        }))
}

fn is_species(species: Species) -> impl Fn(&ObjectValue) -> bool + Send + Sync + 'static {
    move |value| {
        value
            .downcast_ref::<&'static Character>()
            .is_some_and(|character| character.species == species)
    }
}

fn star_wars_schema() -> Schema {
    let character = InterfaceType::new("Character")
        .field(FieldDefinition::new("id", ty!(String!)))
        .field(FieldDefinition::new("name", ty!(String)))
        .field(FieldDefinition::new("friends", ty!([Character])))
        .field(FieldDefinition::new("appearsIn", ty!([Episode])))
        .field(FieldDefinition::new("secretBackstory", ty!(String)))
        .resolve_type(|value| {
            let character = value.downcast_ref::<&'static Character>()?;
            Some(match character.species {
                Species::Human => "Human".into(),
                Species::Droid => "Droid".into(),
            })
        });
    let human = with_character_fields(ObjectType::new("Human").implements("Character"))
        .field(character_field("homePlanet", ty!(Planet), |character| {
            Ok(ResolvedValue::nullable_object(
                character.home_planet.and_then(planet_by_name),
            ))
        }))
        .is_type_of(is_species(Species::Human));
    let droid = with_character_fields(ObjectType::new("Droid").implements("Character"))
        .field(character_field("primaryFunction", ty!(String), |character| {
            Ok(character
                .primary_function
                .map_or(ResolvedValue::null(), ResolvedValue::leaf))
        }))
        .is_type_of(is_species(Species::Droid));
    let planet = ObjectType::new("Planet")
        .field(planet_field("id", ty!(String!), |planet| ResolvedValue::leaf(planet.id)))
        .field(planet_field("name", ty!(String!), |planet| ResolvedValue::leaf(planet.name)))
        .field(planet_field("diameter", ty!(Int!), |planet| {
            ResolvedValue::leaf(planet.diameter)
        }))
        .is_type_of(|value| value.downcast_ref::<&'static Planet>().is_some());
    let query = ObjectType::new("Query")
        .field(
            FieldDefinition::new("hero", ty!(Character))
                .argument("episode", ArgumentDefinition::new(ty!(Episode)))
                .resolve(|info| {
                    let id = match info.argument("episode").and_then(JsonValue::as_str) {
                        Some("EMPIRE") => "1000",
                        _ => "2001",
                    };
                    Ok(ResolvedValue::nullable_object(character_by_id(id)))
                }),
        )
        .field(
            FieldDefinition::new("human", ty!(Human))
                .argument("id", ArgumentDefinition::new(ty!(String!)))
                .resolve(|info| {
                    let human = info
                        .argument("id")
                        .and_then(JsonValue::as_str)
                        .and_then(character_by_id)
                        .filter(|character| character.species == Species::Human);
                    Ok(ResolvedValue::nullable_object(human))
                }),
        )
        .field(
            FieldDefinition::new("droid", ty!(Droid))
                .argument("id", ArgumentDefinition::new(ty!(String!)))
                .resolve(|info| {
                    let droid = info
                        .argument("id")
                        .and_then(JsonValue::as_str)
                        .and_then(character_by_id)
                        .filter(|character| character.species == Species::Droid);
                    Ok(ResolvedValue::nullable_object(droid))
                }),
        )
        .field(
            FieldDefinition::new("search", ty!([SearchResult!]!))
                .argument(
                    "query",
                    ArgumentDefinition::new(ty!(String!)).default_value("R2-D2"),
                )
                .resolve(|info| {
                    let query = info
                        .argument("query")
                        .and_then(JsonValue::as_str)
                        .unwrap_or_default()
                        .to_lowercase();
                    let planets = PLANETS
                        .iter()
                        .filter(|planet| planet.name.to_lowercase().contains(&query))
                        .map(ResolvedValue::object);
                    let characters = CHARACTERS
                        .iter()
                        .filter(|character| character.name.to_lowercase().contains(&query))
                        .map(ResolvedValue::object);
                    Ok(ResolvedValue::list(planets.chain(characters)))
                }),
        );
    Schema::builder()
        .add_type(
            EnumType::new("Episode")
                .value("NEWHOPE")
                .value("EMPIRE")
                .value("JEDI"),
        )
        .add_type(character)
        .add_type(human)
        .add_type(droid)
        .add_type(planet)
        .add_type(
            UnionType::new("SearchResult")
                .member("Planet")
                .member("Human")
                .member("Droid"),
        )
        .add_type(query)
        .query("Query")
        .build()
        .unwrap()
}

fn execute(query: &str, variables: serde_json::Value) -> ExecutionResponse {
    let schema = star_wars_schema();
    let document = ExecutableDocument::parse(query).unwrap();
    let variables: JsonMap = serde_json::from_value(variables).unwrap();
    Execution::new(&schema, &document)
        .variable_values(&variables)
        .execute_sync()
        .unwrap()
}

fn execute_to_json(query: &str) -> serde_json::Value {
    serde_json::to_value(execute(query, json!({}))).unwrap()
}

#[test]
fn hero_name() {
    let query = "query HeroNameQuery { hero { name } }";
    let response = serde_json::to_string_pretty(&execute(query, json!({}))).unwrap();
    expect![[r#"
        {
          "data": {
            "hero": {
              "name": "R2-D2"
            }
          }
        }"#]]
    .assert_eq(&response);
}

#[test]
fn hero_name_and_friends() {
    let query = "
        query HeroNameAndFriendsQuery {
            hero {
                id
                name
                friends {
                    name
                }
            }
        }
    ";
    assert_eq!(
        execute_to_json(query),
        json!({
            "data": {
                "hero": {
                    "id": "2001",
                    "name": "R2-D2",
                    "friends": [
                        {"name": "Luke Skywalker"},
                        {"name": "Han Solo"},
                        {"name": "Leia Organa"},
                    ],
                },
            },
        })
    );
}

#[test]
fn nested_friends() {
    let query = "
        query NestedQuery {
            hero {
                name
                friends {
                    name
                    appearsIn
                    friends {
                        name
                    }
                }
            }
        }
    ";
    let all_episodes = json!(["NEWHOPE", "EMPIRE", "JEDI"]);
    assert_eq!(
        execute_to_json(query),
        json!({
            "data": {
                "hero": {
                    "name": "R2-D2",
                    "friends": [
                        {
                            "name": "Luke Skywalker",
                            "appearsIn": all_episodes,
                            "friends": [
                                {"name": "Han Solo"},
                                {"name": "Leia Organa"},
                                {"name": "C-3PO"},
                                {"name": "R2-D2"},
                            ],
                        },
                        {
                            "name": "Han Solo",
                            "appearsIn": all_episodes,
                            "friends": [
                                {"name": "Luke Skywalker"},
                                {"name": "Leia Organa"},
                                {"name": "R2-D2"},
                            ],
                        },
                        {
                            "name": "Leia Organa",
                            "appearsIn": all_episodes,
                            "friends": [
                                {"name": "Luke Skywalker"},
                                {"name": "Han Solo"},
                                {"name": "C-3PO"},
                                {"name": "R2-D2"},
                            ],
                        },
                    ],
                },
            },
        })
    );
}

#[test]
fn fetch_by_id_argument() {
    let query = r#"
        query FetchLukeQuery {
            human(id: "1000") {
                name
            }
        }
    "#;
    assert_eq!(
        execute_to_json(query),
        json!({"data": {"human": {"name": "Luke Skywalker"}}})
    );
}

#[test]
fn fetch_by_id_variable() {
    let query = "
        query FetchSomeIDQuery($someId: String!) {
            human(id: $someId) {
                name
            }
        }
    ";
    let fetch = |id: &str| serde_json::to_value(execute(query, json!({"someId": id}))).unwrap();
    assert_eq!(
        fetch("1000"),
        json!({"data": {"human": {"name": "Luke Skywalker"}}})
    );
    assert_eq!(fetch("1002"), json!({"data": {"human": {"name": "Han Solo"}}}));
    // Not found is null without any error
    assert_eq!(fetch("not a valid id"), json!({"data": {"human": null}}));
}

#[test]
fn aliases() {
    let query = r#"
        query FetchLukeAndLeiaAliasedQuery {
            luke: human(id: "1000") {
                name
            }
            leia: human(id: "1003") {
                name
            }
        }
    "#;
    let response = serde_json::to_string(&execute(query, json!({}))).unwrap();
    assert_eq!(
        response,
        r#"{"data":{"luke":{"name":"Luke Skywalker"},"leia":{"name":"Leia Organa"}}}"#
    );
}

#[test]
fn duplicate_fields_and_fragments() {
    let with_duplicates = r#"
        query DuplicateFieldsQuery {
            luke: human(id: "1000") {
                name
                homePlanet { name }
            }
            leia: human(id: "1003") {
                name
                homePlanet { name }
            }
        }
    "#;
    let with_fragment = r#"
        query UseFragmentQuery {
            luke: human(id: "1000") {
                ...HumanFragment
            }
            leia: human(id: "1003") {
                ...HumanFragment
            }
        }

        fragment HumanFragment on Human {
            name
            homePlanet { name }
        }
    "#;
    let expected = json!({
        "data": {
            "luke": {
                "name": "Luke Skywalker",
                "homePlanet": {"name": "Tatooine"},
            },
            "leia": {
                "name": "Leia Organa",
                "homePlanet": {"name": "Alderaan"},
            },
        },
    });
    assert_eq!(execute_to_json(with_duplicates), expected);
    assert_eq!(execute_to_json(with_fragment), expected);
}

#[test]
fn typename_of_interface_value() {
    let query = "
        query CheckTypeOfR2Query {
            hero {
                __typename
                name
            }
        }
    ";
    assert_eq!(
        execute_to_json(query),
        json!({"data": {"hero": {"__typename": "Droid", "name": "R2-D2"}}})
    );

    let query = "
        query CheckTypeOfLukeQuery {
            hero(episode: EMPIRE) {
                __typename
                name
            }
        }
    ";
    assert_eq!(
        execute_to_json(query),
        json!({"data": {"hero": {"__typename": "Human", "name": "Luke Skywalker"}}})
    );
}

#[test]
fn secret_backstory() {
    let query = r#"query SecretBackstoryQuery {
    hero {
        name
        secretBackstory
    }
}"#;
    let response = serde_json::to_string_pretty(&execute(query, json!({}))).unwrap();
    expect![[r#"
        {
          "errors": [
            {
              "message": "secretBackstory is secret.",
              "locations": [
                {
                  "line": 4,
                  "column": 9
                }
              ],
              "path": [
                "hero",
                "secretBackstory"
              ]
            }
          ],
          "data": {
            "hero": {
              "name": "R2-D2",
              "secretBackstory": null
            }
          }
        }"#]]
    .assert_eq(&response);
}

#[test]
fn secret_backstory_in_list() {
    let query = r#"query SecretBackstoryListQuery {
    hero {
        name
        friends {
            name
            secretBackstory
        }
    }
}"#;
    let error = |index: usize| {
        json!({
            "message": "secretBackstory is secret.",
            "locations": [{"line": 6, "column": 13}],
            "path": ["hero", "friends", index, "secretBackstory"],
        })
    };
    assert_eq!(
        execute_to_json(query),
        json!({
            "errors": [error(0), error(1), error(2)],
            "data": {
                "hero": {
                    "name": "R2-D2",
                    "friends": [
                        {"name": "Luke Skywalker", "secretBackstory": null},
                        {"name": "Han Solo", "secretBackstory": null},
                        {"name": "Leia Organa", "secretBackstory": null},
                    ],
                },
            },
        })
    );
}

#[test]
fn secret_backstory_aliased() {
    let query = r#"query SecretBackstoryAliasQuery {
    mainHero: hero {
        name
        story: secretBackstory
    }
}"#;
    assert_eq!(
        execute_to_json(query),
        json!({
            "errors": [{
                "message": "secretBackstory is secret.",
                "locations": [{"line": 4, "column": 9}],
                "path": ["mainHero", "story"],
            }],
            "data": {
                "mainHero": {
                    "name": "R2-D2",
                    "story": null,
                },
            },
        })
    );
}

#[test]
fn search_union() {
    let query = r#"
        query {
            search(query: "o") {
                ... on Planet {
                    name
                    diameter
                }
                ... on Human {
                    name
                }
                ... on Droid {
                    name
                    primaryFunction
                }
            }
        }
    "#;
    let response = serde_json::to_string(&execute(query, json!({}))).unwrap();
    assert_eq!(
        response,
        r#"{"data":{"search":[{"name":"Tatooine","diameter":10465},{"name":"Han Solo"},{"name":"Leia Organa"},{"name":"C-3PO","primaryFunction":"Protocol"}]}}"#
    );
}

#[test]
fn argument_default_and_typename_in_union() {
    let query = "
        {
            search {
                __typename
                ... on Character { name }
            }
        }
    ";
    assert_eq!(
        execute_to_json(query),
        json!({"data": {"search": [{"__typename": "Droid", "name": "R2-D2"}]}})
    );
}

#[test]
fn null_home_planet() {
    let query = r#"{ human(id: "1002") { name homePlanet { name } } }"#;
    assert_eq!(
        execute_to_json(query),
        json!({"data": {"human": {"name": "Han Solo", "homePlanet": null}}})
    );
}
