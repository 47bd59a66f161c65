use crate::schema::{Field, NamedType, SchemaGraph, TypeKind, TypeRef};

/// Sort rank of a type kind: interfaces first, unions last.
pub fn kind_rank(kind: TypeKind) -> u8 {
    match kind {
        TypeKind::Interface => 0,
        TypeKind::Union => 2,
        _ => 1,
    }
}

/// Stable sort by [`kind_rank`], so implementors and union members come
/// after the types they depend on.
pub fn order_by_kind<T>(items: &mut [T], kind: impl Fn(&T) -> TypeKind) {
    items.sort_by_key(|item| kind_rank(kind(item)));
}

pub fn order_types_topologically<R>(mut types: Vec<NamedType<R>>) -> Vec<NamedType<R>> {
    order_by_kind(&mut types, NamedType::kind);
    types
}

/// Follows a chain of field names starting at `ty`.
///
/// Returns `None` if a name is missing or the walk has to continue through a
/// type without fields. List and non-null field types end the walk as well:
/// only a bare named type is followed into.
pub fn walk_fields<'g>(
    schema: &'g SchemaGraph,
    ty: &'g NamedType,
    field_names: &[&str],
) -> Option<&'g Field> {
    let mut field = None;
    let mut current = Some(ty);
    for field_name in field_names {
        let next: &Field = current?.fields()?.get(*field_name)?;
        current = match &next.ty {
            TypeRef::Named(name) => schema.type_named(name),
            TypeRef::List(_) | TypeRef::NonNull(_) => None,
        };
        field = Some(next);
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn schema() -> SchemaGraph {
        SchemaGraph::parse(indoc! {"
            union Result = Query | Thing
            type Query { node: Node list: [Node] }
            interface Node { id: ID! parent: Node }
            type Thing implements Node { id: ID! parent: Node }
            enum Color { RED }
        "})
        .unwrap()
    }

    #[test]
    fn orders_interfaces_first_and_unions_last() {
        let schema = schema();
        let types: Vec<NamedType> = schema.types().cloned().collect();
        let names: Vec<String> = order_types_topologically(types)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["Node", "Query", "Thing", "Color", "ID", "Result"]);
    }

    #[test]
    fn walks_nested_fields() {
        let schema = schema();
        let query = schema.type_named("Query").unwrap();
        let field = walk_fields(&schema, query, &["node", "parent", "parent", "id"]).unwrap();
        assert_eq!(field.name, "id");
        assert_eq!(field.ty.to_string(), "ID!");
    }

    #[test]
    fn walk_stops_at_missing_fields_and_wrappers() {
        let schema = schema();
        let query = schema.type_named("Query").unwrap();
        assert!(walk_fields(&schema, query, &["node", "missing"]).is_none());
        assert!(walk_fields(&schema, query, &["node", "id", "more"]).is_none());
        assert!(walk_fields(&schema, query, &["list", "id"]).is_none());
        assert!(walk_fields(&schema, query, &[]).is_none());
    }
}
