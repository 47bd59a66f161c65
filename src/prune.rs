//! Dead-type elimination.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::reachability::{mark_reachable, ReferenceGraph};
use crate::schema::{NamedType, SchemaGraph};
use crate::utils::order_types_topologically;

struct SchemaReferences<'g>(&'g SchemaGraph);

impl<'g> ReferenceGraph for SchemaReferences<'g> {
    type Key = &'g str;

    fn keys(&self) -> Vec<&'g str> {
        self.0.type_names().collect()
    }

    fn references(&self, key: &'g str) -> Result<Vec<&'g str>> {
        let ty = match self.0.type_named(key) {
            Some(ty) => ty,
            None => return Ok(Vec::new()),
        };
        let mut result = Vec::new();
        for name in ty.references() {
            if !self.0.contains_type(name) {
                return Err(Error::DanglingReference {
                    type_name: name.clone(),
                    referenced_by: key.to_string(),
                });
            }
            result.push(name.as_str());
        }
        // Implements entries are not edges, but they still have to resolve.
        for name in ty.interfaces() {
            if !self.0.contains_type(name) {
                return Err(Error::DanglingReference {
                    type_name: name.clone(),
                    referenced_by: key.to_string(),
                });
            }
        }
        Ok(result)
    }

    fn implemented_interfaces(&self, key: &'g str) -> Vec<&'g str> {
        match self.0.type_named(key) {
            Some(NamedType::Object(object)) => {
                object.interfaces.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Types reachable from the roots and from directive arguments.
pub fn reachable_types(schema: &SchemaGraph) -> Result<HashSet<&str>> {
    let mut seeds = schema.root_type_names();
    for directive in schema.directives() {
        for argument in &directive.arguments {
            let name = argument.ty.named_type();
            if !schema.contains_type(name) {
                return Err(Error::DanglingReference {
                    type_name: name.clone(),
                    referenced_by: format!("@{}({}:)", directive.name, argument.name),
                });
            }
            seeds.push(name);
        }
    }
    mark_reachable(&SchemaReferences(schema), seeds)
}

/// Returns a copy of `schema` without the types that cannot be reached from
/// its roots or its directive definitions.
///
/// Interfaces that are not referenced are dropped even when a reachable
/// object implements them, and the implements lists are filtered to match.
/// Roots and directives are kept as they are.
pub fn prune_unreachable(schema: &SchemaGraph) -> Result<SchemaGraph> {
    let reachable = reachable_types(schema)?;

    let mut types = Vec::with_capacity(reachable.len());
    for ty in schema.types() {
        if !reachable.contains(ty.name()) {
            log::trace!("removing unused type {}", ty.name());
            continue;
        }
        let mut ty = ty.clone();
        if let Some(interfaces) = ty.interfaces_mut() {
            interfaces.retain(|name| reachable.contains(name.as_str()));
        }
        types.push(ty);
    }

    let pruned = SchemaGraph::new(
        schema.roots().clone(),
        order_types_topologically(types),
        schema.directives().cloned(),
    )?;
    log::debug!(
        "kept {} of {} types",
        pruned.types().count(),
        schema.types().count()
    );
    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_schema;
    use crate::schema::{Field, ObjectType, RootTypes, TypeRef};
    use indoc::indoc;

    fn prune(sdl: &str) -> SchemaGraph {
        prune_unreachable(&SchemaGraph::parse(sdl).unwrap()).unwrap()
    }

    fn names(schema: &SchemaGraph) -> Vec<&str> {
        schema.type_names().collect()
    }

    #[test]
    fn removes_unused_types() {
        let schema = prune(indoc! {"
            schema {
                query: Query
            }
            interface Interface {
                test: ID
            }
            type Query {
                hello: String
            }
            type Impl implements Interface {
                test: ID
            }
        "});
        assert_eq!(names(&schema), vec!["Query", "String"]);
    }

    #[test]
    fn keeps_interface_implementations_in_use() {
        for field_type in &["Interface", "[Interface]", "Interface!", "[Interface!]!"] {
            let sdl = format!(
                "interface Interface {{ test: ID }}
                 type Query {{ hello: {} }}
                 type Impl implements Interface {{ test: ID }}",
                field_type
            );
            let schema = prune(&sdl);
            assert!(schema.contains_type("Impl"), "{}", field_type);
            assert!(schema.contains_type("Interface"), "{}", field_type);
        }
    }

    #[test]
    fn keeps_interface_implementations_used_indirectly() {
        let schema = prune(indoc! {"
            interface Interface {
                test: ID
            }
            interface WrappingInterface {
                test: Interface
            }
            type Query {
                hello: WrappingInterface
            }
            type Impl implements Interface {
                test: ID
            }
        "});
        assert_eq!(
            names(&schema),
            vec!["Interface", "WrappingInterface", "Query", "Impl", "ID"]
        );
    }

    #[test]
    fn keeps_interface_implementations_used_through_impl_fields() {
        let schema = prune(indoc! {"
            interface Interface1 {
                test: ID
            }
            interface Interface2 {
                test: ID
            }
            type Query {
                hello: Interface1
            }
            type Impl1 implements Interface1 {
                test: ID
                otherField: Interface2
            }
            type Impl2 implements Interface2 {
                test: ID
            }
        "});
        assert!(schema.contains_type("Interface2"));
        assert!(schema.contains_type("Impl2"));
    }

    #[test]
    fn keeps_directives_and_their_input_types() {
        let schema = prune(indoc! {"
            type Query {
                hello: ID
            }
            input DirInput {
                field: String
            }
            input Unused {
                field: Int
            }
            directive @dir(arg: DirInput) on OBJECT
        "});
        let directive = schema.directive("dir").unwrap();
        assert_eq!(directive.arguments[0].ty.named_type(), "DirInput");
        assert_eq!(names(&schema), vec!["Query", "DirInput", "String", "ID"]);
    }

    #[test]
    fn filters_implements_of_dropped_interfaces() {
        let schema = prune(indoc! {"
            interface Named { name: String }
            type Query { thing: Thing }
            type Thing implements Named { name: String }
        "});
        insta::assert_snapshot!(print_schema(&schema), @r"
        type Query {
          thing: Thing
        }

        type Thing {
          name: String
        }
        ");
    }

    #[test]
    fn keeps_union_members_and_orders_unions_last() {
        let schema = prune(indoc! {"
            union Result = A | B
            type Query { result: Result }
            type A { a: Int }
            type B { b: Int }
            type C { c: Int }
        "});
        assert_eq!(names(&schema), vec!["Query", "A", "B", "Int", "Result"]);
    }

    #[test]
    fn pruning_is_idempotent() {
        let once = prune(indoc! {"
            interface Interface1 { test: ID }
            interface Interface2 { test: ID }
            type Query { hello: Interface1 }
            type Impl1 implements Interface1 & Interface2 { test: ID }
            type Unused { test: String }
        "});
        let twice = prune_unreachable(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(names(&once), vec!["Interface1", "Query", "Impl1", "ID"]);
    }

    #[test]
    fn adding_a_reference_only_grows_the_reachable_set() {
        let base = indoc! {"
            interface Interface { test: ID }
            type Impl implements Interface { test: ID }
            type Other { name: String }
        "};
        let before = prune(&format!("{}\ntype Query {{ hello: String }}", base));
        let after = prune(&format!(
            "{}\ntype Query {{ hello: String other: Interface }}",
            base
        ));
        let after_names: HashSet<&str> = after.type_names().collect();
        for name in before.type_names() {
            assert!(after_names.contains(name), "{}", name);
        }
        assert!(after_names.contains("Impl"));
    }

    #[test]
    fn reports_dangling_references() {
        let hello = Field::new("hello", TypeRef::Named(String::from("Missing")));
        let schema = SchemaGraph::new(
            RootTypes::query("Query"),
            vec![NamedType::Object(ObjectType {
                name: String::from("Query"),
                description: None,
                fields: vec![(String::from("hello"), hello)].into_iter().collect(),
                interfaces: Vec::new(),
            })],
            vec![],
        )
        .unwrap();
        assert_eq!(
            prune_unreachable(&schema),
            Err(Error::DanglingReference {
                type_name: String::from("Missing"),
                referenced_by: String::from("Query"),
            })
        );
    }

    #[test]
    fn reports_dangling_implements_entries() {
        let me = Field::new("me", TypeRef::Named(String::from("Query")));
        let schema = SchemaGraph::new(
            RootTypes::query("Query"),
            vec![NamedType::Object(ObjectType {
                name: String::from("Query"),
                description: None,
                fields: vec![(String::from("me"), me)].into_iter().collect(),
                interfaces: vec![String::from("Missing")],
            })],
            vec![],
        )
        .unwrap();
        assert_eq!(
            prune_unreachable(&schema),
            Err(Error::DanglingReference {
                type_name: String::from("Missing"),
                referenced_by: String::from("Query"),
            })
        );
    }
}
