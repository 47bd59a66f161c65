//! Turns a parsed SDL document into a [`SchemaGraph`].

use indexmap::IndexMap;

use crate::ast::{self, Definition, Document, OperationType, TypeReference};
use crate::error::{Error, Result};
use crate::parser;
use crate::schema::*;

pub const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub fn is_built_in_scalar(name: &str) -> bool {
    BUILT_IN_SCALARS.contains(&name)
}

pub fn build_schema_from_sdl(sdl: &str) -> Result<SchemaGraph> {
    let document = parser::parse_document(sdl)?;
    build_schema(&document)
}

/// Builds a graph from a type-system document.
///
/// Extensions are merged into their definitions regardless of where they
/// appear in the document. Without a schema definition the roots default to
/// `Query`, `Mutation` and `Subscription`. Built-in scalars that are used
/// but not declared are appended after the declared types. Applied
/// directives are not carried into the graph.
pub fn build_schema(document: &Document) -> Result<SchemaGraph> {
    let mut types: IndexMap<String, NamedType> = IndexMap::new();
    let mut directives: IndexMap<String, DirectiveDefinition> = IndexMap::new();
    let mut schema_definitions = Vec::new();

    for definition in &document.definitions {
        let ty = match definition {
            Definition::Schema(schema) => {
                schema_definitions.push(schema);
                continue;
            }
            Definition::Directive(directive) => {
                let directive = build_directive(directive);
                let name = directive.name.clone();
                if directives.insert(name.clone(), directive).is_some() {
                    return Err(Error::DuplicateDirective(name));
                }
                continue;
            }
            Definition::ScalarType(scalar) => NamedType::Scalar(ScalarType {
                name: scalar.name.clone(),
                description: scalar.description.clone(),
            }),
            Definition::ObjectType(object) => NamedType::Object(ObjectType {
                name: object.name.clone(),
                description: object.description.clone(),
                fields: build_fields(&object.name, &object.fields)?,
                interfaces: object.interfaces.clone(),
            }),
            Definition::InterfaceType(interface) => NamedType::Interface(InterfaceType {
                name: interface.name.clone(),
                description: interface.description.clone(),
                fields: build_fields(&interface.name, &interface.fields)?,
                interfaces: interface.interfaces.clone(),
            }),
            Definition::UnionType(union) => NamedType::Union(UnionType {
                name: union.name.clone(),
                description: union.description.clone(),
                members: union.types.clone(),
            }),
            Definition::EnumType(enum_type) => NamedType::Enum(EnumType {
                name: enum_type.name.clone(),
                description: enum_type.description.clone(),
                values: enum_type.values.iter().map(build_enum_value).collect(),
            }),
            Definition::InputObjectType(input) => NamedType::InputObject(InputObjectType {
                name: input.name.clone(),
                description: input.description.clone(),
                fields: build_input_fields(&input.name, &input.fields)?,
            }),
            _ => continue,
        };
        let name = ty.name().to_string();
        if types.insert(name.clone(), ty).is_some() {
            return Err(Error::DuplicateTypeName(name));
        }
    }

    for definition in &document.definitions {
        match definition {
            Definition::SchemaExtension(schema) => schema_definitions.push(schema),
            Definition::ScalarTypeExtension(scalar) => {
                match types.get(&scalar.name) {
                    Some(NamedType::Scalar(_)) => {}
                    _ => return Err(Error::UnknownExtension(scalar.name.clone())),
                };
            }
            Definition::ObjectTypeExtension(extension) => match types.get_mut(&extension.name) {
                Some(NamedType::Object(object)) => {
                    extend_fields(&mut object.fields, &extension.name, &extension.fields)?;
                    object.interfaces.extend(extension.interfaces.iter().cloned());
                }
                _ => return Err(Error::UnknownExtension(extension.name.clone())),
            },
            Definition::InterfaceTypeExtension(extension) => {
                match types.get_mut(&extension.name) {
                    Some(NamedType::Interface(interface)) => {
                        extend_fields(&mut interface.fields, &extension.name, &extension.fields)?;
                        interface
                            .interfaces
                            .extend(extension.interfaces.iter().cloned());
                    }
                    _ => return Err(Error::UnknownExtension(extension.name.clone())),
                }
            }
            Definition::UnionTypeExtension(extension) => match types.get_mut(&extension.name) {
                Some(NamedType::Union(union)) => {
                    union.members.extend(extension.types.iter().cloned());
                }
                _ => return Err(Error::UnknownExtension(extension.name.clone())),
            },
            Definition::EnumTypeExtension(extension) => match types.get_mut(&extension.name) {
                Some(NamedType::Enum(enum_type)) => {
                    enum_type
                        .values
                        .extend(extension.values.iter().map(build_enum_value));
                }
                _ => return Err(Error::UnknownExtension(extension.name.clone())),
            },
            Definition::InputObjectTypeExtension(extension) => {
                match types.get_mut(&extension.name) {
                    Some(NamedType::InputObject(input)) => {
                        for field in build_input_fields(&extension.name, &extension.fields)?
                            .into_values()
                        {
                            insert_unique(&mut input.fields, &extension.name, field.name.clone(), field)?;
                        }
                    }
                    _ => return Err(Error::UnknownExtension(extension.name.clone())),
                }
            }
            _ => {}
        }
    }

    let roots = build_roots(&schema_definitions, &types)?;
    append_built_in_scalars(&mut types, &directives);

    let graph = SchemaGraph::new(roots, types.into_values(), directives.into_values())?;
    graph.check_references()?;
    log::debug!(
        "built schema with {} types and {} directives",
        graph.types().count(),
        graph.directives().count()
    );
    Ok(graph)
}

fn build_roots(
    schema_definitions: &[&ast::SchemaDefinition],
    types: &IndexMap<String, NamedType>,
) -> Result<RootTypes> {
    if schema_definitions.is_empty() {
        let present = |name: &str| {
            if types.contains_key(name) {
                Some(name.to_string())
            } else {
                None
            }
        };
        return Ok(RootTypes {
            query: String::from("Query"),
            mutation: present("Mutation"),
            subscription: present("Subscription"),
        });
    }
    let mut query = None;
    let mut mutation = None;
    let mut subscription = None;
    for definition in schema_definitions {
        for operation_type in &definition.operation_type_definitions {
            let slot = match operation_type.operation {
                OperationType::Query => &mut query,
                OperationType::Mutation => &mut mutation,
                OperationType::Subscription => &mut subscription,
            };
            *slot = Some(operation_type.type_name.clone());
        }
    }
    let query = query.ok_or_else(|| Error::MissingRootType {
        operation: "query",
        type_name: String::from("Query"),
    })?;
    Ok(RootTypes {
        query,
        mutation,
        subscription,
    })
}

fn append_built_in_scalars(
    types: &mut IndexMap<String, NamedType>,
    directives: &IndexMap<String, DirectiveDefinition>,
) {
    let mut referenced: Vec<&str> = Vec::new();
    for ty in types.values() {
        referenced.extend(ty.references().into_iter().map(String::as_str));
    }
    for directive in directives.values() {
        referenced.extend(directive.arguments.iter().map(|a| a.ty.named_type().as_str()));
    }
    let missing: Vec<&str> = BUILT_IN_SCALARS
        .iter()
        .copied()
        .filter(|name| !types.contains_key(*name) && referenced.contains(name))
        .collect();
    for name in missing {
        types.insert(
            name.to_string(),
            NamedType::Scalar(ScalarType {
                name: name.to_string(),
                description: None,
            }),
        );
    }
}

fn build_type_ref(type_reference: &TypeReference) -> TypeRef {
    match type_reference {
        TypeReference::NamedType(name) => TypeRef::Named(name.clone()),
        TypeReference::ListType(inner) => build_type_ref(inner).list(),
        TypeReference::NonNullType(inner) => build_type_ref(inner).non_null(),
    }
}

fn build_input_value(definition: &ast::InputValueDefinition) -> InputValue {
    InputValue {
        name: definition.name.clone(),
        description: definition.description.clone(),
        ty: build_type_ref(&definition.type_reference),
        default_value: definition.default_value.clone(),
    }
}

fn build_field(definition: &ast::FieldDefinition) -> Field {
    Field {
        name: definition.name.clone(),
        description: definition.description.clone(),
        ty: build_type_ref(&definition.type_reference),
        arguments: definition.arguments.iter().map(build_input_value).collect(),
    }
}

fn build_enum_value(definition: &ast::EnumValueDefinition) -> EnumValue {
    EnumValue {
        name: definition.name.clone(),
        description: definition.description.clone(),
    }
}

fn build_directive(definition: &ast::DirectiveDefinition) -> DirectiveDefinition {
    DirectiveDefinition {
        name: definition.name.clone(),
        description: definition.description.clone(),
        arguments: definition.arguments.iter().map(build_input_value).collect(),
        repeatable: definition.repeatable,
        locations: definition.locations.clone(),
    }
}

fn build_fields(
    type_name: &str,
    definitions: &[ast::FieldDefinition],
) -> Result<IndexMap<String, Field>> {
    let mut fields = IndexMap::with_capacity(definitions.len());
    extend_fields(&mut fields, type_name, definitions)?;
    Ok(fields)
}

fn extend_fields(
    fields: &mut IndexMap<String, Field>,
    type_name: &str,
    definitions: &[ast::FieldDefinition],
) -> Result<()> {
    for definition in definitions {
        insert_unique(fields, type_name, definition.name.clone(), build_field(definition))?;
    }
    Ok(())
}

fn build_input_fields(
    type_name: &str,
    definitions: &[ast::InputValueDefinition],
) -> Result<IndexMap<String, InputValue>> {
    let mut fields = IndexMap::with_capacity(definitions.len());
    for definition in definitions {
        insert_unique(
            &mut fields,
            type_name,
            definition.name.clone(),
            build_input_value(definition),
        )?;
    }
    Ok(fields)
}

fn insert_unique<V>(
    map: &mut IndexMap<String, V>,
    type_name: &str,
    field_name: String,
    value: V,
) -> Result<()> {
    if map.contains_key(&field_name) {
        return Err(Error::DuplicateField {
            type_name: type_name.to_string(),
            field_name,
        });
    }
    map.insert(field_name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn type_names(graph: &SchemaGraph) -> Vec<&str> {
        graph.type_names().collect()
    }

    #[test]
    fn builds_default_roots_and_built_in_scalars() {
        let graph = build_schema_from_sdl(indoc! {"
            type Query {
              hello: String
              count(limit: Int = 10): Int!
            }
            type Mutation {
              reset: Boolean
            }
        "})
        .unwrap();
        assert_eq!(
            type_names(&graph),
            vec!["Query", "Mutation", "Int", "String", "Boolean"]
        );
        assert_eq!(graph.roots().mutation.as_deref(), Some("Mutation"));
        assert_eq!(graph.roots().subscription, None);
        let count = &graph.query_type().unwrap().fields["count"];
        assert_eq!(count.ty.to_string(), "Int!");
        assert_eq!(
            count.arguments[0].default_value,
            Some(ast::Value::IntValue(String::from("10")))
        );
    }

    #[test]
    fn uses_schema_definition_roots() {
        let graph = build_schema_from_sdl(indoc! {"
            schema { query: Root }
            type Root { id: ID }
            type Query { unused: ID }
        "})
        .unwrap();
        assert_eq!(graph.roots().query, "Root");
        assert_eq!(graph.query_type().unwrap().name, "Root");
    }

    #[test]
    fn merges_extensions_declared_before_definitions() {
        let graph = build_schema_from_sdl(indoc! {"
            extend type Query implements Node { extra: Int }
            extend union Result = B
            extend enum Color { BLUE }
            type Query { id: ID! result: Result color: Color }
            interface Node { id: ID! }
            type A { a: Int }
            type B { b: Int }
            union Result = A
            enum Color { RED }
        "})
        .unwrap();
        let query = graph.query_type().unwrap();
        let fields: Vec<&str> = query.fields.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["id", "result", "color", "extra"]);
        assert_eq!(query.interfaces, vec!["Node"]);
        match graph.type_named("Result") {
            Some(NamedType::Union(union)) => assert_eq!(union.members, vec!["A", "B"]),
            other => panic!("unexpected {:?}", other),
        }
        match graph.type_named("Color") {
            Some(NamedType::Enum(color)) => assert_eq!(color.values.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn keeps_descriptions_and_directive_definitions() {
        let graph = build_schema_from_sdl(indoc! {r#"
            "Entry point"
            type Query { hello: String @deprecated }
            directive @auth(role: Role = ADMIN) repeatable on FIELD_DEFINITION
            enum Role { ADMIN USER }
        "#})
        .unwrap();
        assert_eq!(graph.query_type().unwrap().description.as_deref(), Some("Entry point"));
        let auth = graph.directive("auth").unwrap();
        assert!(auth.repeatable);
        assert_eq!(auth.arguments[0].ty.named_type(), "Role");
    }

    #[test]
    fn rejects_extension_of_unknown_type() {
        let result = build_schema_from_sdl("type Query { a: Int } extend type Missing { b: Int }");
        assert_eq!(result, Err(Error::UnknownExtension(String::from("Missing"))));
    }

    #[test]
    fn rejects_duplicate_field_from_extension() {
        let result = build_schema_from_sdl("type Query { a: Int } extend type Query { a: Int }");
        assert_eq!(
            result,
            Err(Error::DuplicateField {
                type_name: String::from("Query"),
                field_name: String::from("a"),
            })
        );
    }

    #[test]
    fn rejects_missing_query_root() {
        let result = build_schema_from_sdl("type Foo { a: Int }");
        assert_eq!(
            result,
            Err(Error::MissingRootType {
                operation: "query",
                type_name: String::from("Query"),
            })
        );
    }

    #[test]
    fn rejects_dangling_reference() {
        let result = build_schema_from_sdl("type Query { a: Missing }");
        assert_eq!(
            result,
            Err(Error::DanglingReference {
                type_name: String::from("Missing"),
                referenced_by: String::from("Query.a"),
            })
        );
    }

    #[test]
    fn reports_syntax_errors() {
        match build_schema_from_sdl("type Query {") {
            Err(Error::Parse(error)) => assert_eq!(error.position.line, 1),
            other => panic!("unexpected {:?}", other),
        }
    }
}
