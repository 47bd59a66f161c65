//! The in-memory schema graph.
//!
//! Types reference each other by name and are looked up in the owning
//! [`SchemaGraph`], so cyclic schemas need no special handling. Every record
//! is generic over the reference representation `R`: finished graphs use
//! type names, the transformer uses arena ids and the hooks it calls see
//! [`TypeHandle`](crate::hooks::TypeHandle)s.

use std::fmt;

use indexmap::IndexMap;

use crate::ast::{DirectiveLocation, Value};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Whether the kind may appear as an argument or input field type.
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }

    /// Whether the kind may appear as a field's output type.
    pub fn is_output(self) -> bool {
        !matches!(self, TypeKind::InputObject)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Object => "object type",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::InputObject => "input object",
        };
        f.write_str(name)
    }
}

/// A named type wrapped in any number of list and non-null modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef<R = String> {
    Named(R),
    List(Box<TypeRef<R>>),
    NonNull(Box<TypeRef<R>>),
}

impl<R> TypeRef<R> {
    pub fn list(self) -> TypeRef<R> {
        TypeRef::List(Box::new(self))
    }

    pub fn non_null(self) -> TypeRef<R> {
        TypeRef::NonNull(Box::new(self))
    }

    /// The named type with all wrappers stripped.
    pub fn named_type(&self) -> &R {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    /// Replaces the named type, keeping the wrappers.
    pub fn try_map<S, E>(
        self,
        f: &mut dyn FnMut(R) -> std::result::Result<S, E>,
    ) -> std::result::Result<TypeRef<S>, E> {
        Ok(match self {
            TypeRef::Named(name) => TypeRef::Named(f(name)?),
            TypeRef::List(inner) => TypeRef::List(Box::new(inner.try_map(f)?)),
            TypeRef::NonNull(inner) => TypeRef::NonNull(Box::new(inner.try_map(f)?)),
        })
    }
}

impl<R: fmt::Display> fmt::Display for TypeRef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// An argument or an input object field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputValue<R = String> {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef<R>,
    pub default_value: Option<Value>,
}

impl<R> InputValue<R> {
    pub fn new(name: impl Into<String>, ty: TypeRef<R>) -> InputValue<R> {
        InputValue {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    pub fn try_map<S, E>(
        self,
        f: &mut dyn FnMut(R) -> std::result::Result<S, E>,
    ) -> std::result::Result<InputValue<S>, E> {
        Ok(InputValue {
            name: self.name,
            description: self.description,
            ty: self.ty.try_map(f)?,
            default_value: self.default_value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field<R = String> {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef<R>,
    pub arguments: Vec<InputValue<R>>,
}

impl<R> Field<R> {
    pub fn new(name: impl Into<String>, ty: TypeRef<R>) -> Field<R> {
        Field {
            name: name.into(),
            description: None,
            ty,
            arguments: Vec::new(),
        }
    }

    pub fn try_map<S, E>(
        self,
        f: &mut dyn FnMut(R) -> std::result::Result<S, E>,
    ) -> std::result::Result<Field<S>, E> {
        let mut arguments = Vec::with_capacity(self.arguments.len());
        for argument in self.arguments {
            arguments.push(argument.try_map(f)?);
        }
        Ok(Field {
            name: self.name,
            description: self.description,
            ty: self.ty.try_map(f)?,
            arguments,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectType<R = String> {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, Field<R>>,
    pub interfaces: Vec<R>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceType<R = String> {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, Field<R>>,
    pub interfaces: Vec<R>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionType<R = String> {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<R>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputObjectType<R = String> {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputValue<R>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NamedType<R = String> {
    Scalar(ScalarType),
    Object(ObjectType<R>),
    Interface(InterfaceType<R>),
    Union(UnionType<R>),
    Enum(EnumType),
    InputObject(InputObjectType<R>),
}

impl<R> NamedType<R> {
    pub fn name(&self) -> &str {
        match self {
            NamedType::Scalar(t) => &t.name,
            NamedType::Object(t) => &t.name,
            NamedType::Interface(t) => &t.name,
            NamedType::Union(t) => &t.name,
            NamedType::Enum(t) => &t.name,
            NamedType::InputObject(t) => &t.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        let description = match self {
            NamedType::Scalar(t) => &t.description,
            NamedType::Object(t) => &t.description,
            NamedType::Interface(t) => &t.description,
            NamedType::Union(t) => &t.description,
            NamedType::Enum(t) => &t.description,
            NamedType::InputObject(t) => &t.description,
        };
        description.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            NamedType::Scalar(_) => TypeKind::Scalar,
            NamedType::Object(_) => TypeKind::Object,
            NamedType::Interface(_) => TypeKind::Interface,
            NamedType::Union(_) => TypeKind::Union,
            NamedType::Enum(_) => TypeKind::Enum,
            NamedType::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// Output fields of objects and interfaces.
    pub fn fields(&self) -> Option<&IndexMap<String, Field<R>>> {
        match self {
            NamedType::Object(t) => Some(&t.fields),
            NamedType::Interface(t) => Some(&t.fields),
            _ => None,
        }
    }

    /// Interfaces the type declares conformance to.
    pub fn interfaces(&self) -> &[R] {
        match self {
            NamedType::Object(t) => &t.interfaces,
            NamedType::Interface(t) => &t.interfaces,
            _ => &[],
        }
    }

    pub fn interfaces_mut(&mut self) -> Option<&mut Vec<R>> {
        match self {
            NamedType::Object(t) => Some(&mut t.interfaces),
            NamedType::Interface(t) => Some(&mut t.interfaces),
            _ => None,
        }
    }

    /// Every type this one points at through fields, arguments, input fields
    /// and union members. Implements declarations are not included.
    pub fn references(&self) -> Vec<&R> {
        let mut result = Vec::new();
        match self {
            NamedType::Object(ObjectType { fields, .. })
            | NamedType::Interface(InterfaceType { fields, .. }) => {
                for field in fields.values() {
                    result.push(field.ty.named_type());
                    result.extend(field.arguments.iter().map(|a| a.ty.named_type()));
                }
            }
            NamedType::Union(union) => result.extend(union.members.iter()),
            NamedType::InputObject(input) => {
                result.extend(input.fields.values().map(|f| f.ty.named_type()))
            }
            NamedType::Scalar(_) | NamedType::Enum(_) => {}
        }
        result
    }

    pub fn try_map<S, E>(
        self,
        f: &mut dyn FnMut(R) -> std::result::Result<S, E>,
    ) -> std::result::Result<NamedType<S>, E> {
        Ok(match self {
            NamedType::Scalar(t) => NamedType::Scalar(t),
            NamedType::Enum(t) => NamedType::Enum(t),
            NamedType::Object(t) => NamedType::Object(ObjectType {
                fields: try_map_fields(t.fields, f)?,
                interfaces: try_map_all(t.interfaces, f)?,
                name: t.name,
                description: t.description,
            }),
            NamedType::Interface(t) => NamedType::Interface(InterfaceType {
                fields: try_map_fields(t.fields, f)?,
                interfaces: try_map_all(t.interfaces, f)?,
                name: t.name,
                description: t.description,
            }),
            NamedType::Union(t) => NamedType::Union(UnionType {
                members: try_map_all(t.members, f)?,
                name: t.name,
                description: t.description,
            }),
            NamedType::InputObject(t) => {
                let mut fields = IndexMap::with_capacity(t.fields.len());
                for (name, field) in t.fields {
                    fields.insert(name, field.try_map(f)?);
                }
                NamedType::InputObject(InputObjectType {
                    name: t.name,
                    description: t.description,
                    fields,
                })
            }
        })
    }
}

fn try_map_fields<R, S, E>(
    fields: IndexMap<String, Field<R>>,
    f: &mut dyn FnMut(R) -> std::result::Result<S, E>,
) -> std::result::Result<IndexMap<String, Field<S>>, E> {
    let mut result = IndexMap::with_capacity(fields.len());
    for (name, field) in fields {
        result.insert(name, field.try_map(f)?);
    }
    Ok(result)
}

fn try_map_all<R, S, E>(
    refs: Vec<R>,
    f: &mut dyn FnMut(R) -> std::result::Result<S, E>,
) -> std::result::Result<Vec<S>, E> {
    refs.into_iter().map(|r| f(r)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveDefinition<R = String> {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValue<R>>,
    pub repeatable: bool,
    pub locations: Vec<DirectiveLocation>,
}

impl<R> DirectiveDefinition<R> {
    pub fn try_map<S, E>(
        self,
        f: &mut dyn FnMut(R) -> std::result::Result<S, E>,
    ) -> std::result::Result<DirectiveDefinition<S>, E> {
        let mut arguments = Vec::with_capacity(self.arguments.len());
        for argument in self.arguments {
            arguments.push(argument.try_map(f)?);
        }
        Ok(DirectiveDefinition {
            name: self.name,
            description: self.description,
            arguments,
            repeatable: self.repeatable,
            locations: self.locations,
        })
    }
}

/// Names of the root operation types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootTypes {
    pub query: String,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl RootTypes {
    pub fn query(name: impl Into<String>) -> RootTypes {
        RootTypes {
            query: name.into(),
            mutation: None,
            subscription: None,
        }
    }
}

/// An immutable GraphQL type system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaGraph {
    roots: RootTypes,
    types: IndexMap<String, NamedType>,
    directives: IndexMap<String, DirectiveDefinition>,
}

impl SchemaGraph {
    /// Assembles a graph. References between types are not checked here,
    /// see [`SchemaGraph::check_references`].
    pub fn new(
        roots: RootTypes,
        types: impl IntoIterator<Item = NamedType>,
        directives: impl IntoIterator<Item = DirectiveDefinition>,
    ) -> Result<SchemaGraph> {
        let mut type_map = IndexMap::new();
        for ty in types {
            let name = ty.name().to_string();
            if type_map.insert(name.clone(), ty).is_some() {
                return Err(Error::DuplicateTypeName(name));
            }
        }
        let mut directive_map = IndexMap::new();
        for directive in directives {
            let name = directive.name.clone();
            if directive_map.insert(name.clone(), directive).is_some() {
                return Err(Error::DuplicateDirective(name));
            }
        }
        let graph = SchemaGraph {
            roots,
            types: type_map,
            directives: directive_map,
        };
        for (operation, name) in graph.root_operations() {
            match graph.types.get(name) {
                Some(NamedType::Object(_)) => {}
                _ => {
                    return Err(Error::MissingRootType {
                        operation,
                        type_name: name.to_string(),
                    })
                }
            }
        }
        Ok(graph)
    }

    /// Builds a graph from SDL source text.
    pub fn parse(sdl: &str) -> Result<SchemaGraph> {
        crate::build::build_schema_from_sdl(sdl)
    }

    pub fn roots(&self) -> &RootTypes {
        &self.roots
    }

    pub fn query_type(&self) -> Option<&ObjectType> {
        self.object_type(&self.roots.query)
    }

    pub fn mutation_type(&self) -> Option<&ObjectType> {
        self.roots.mutation.as_deref().and_then(|n| self.object_type(n))
    }

    pub fn subscription_type(&self) -> Option<&ObjectType> {
        self.roots
            .subscription
            .as_deref()
            .and_then(|n| self.object_type(n))
    }

    /// `(operation, type name)` of every root that is present.
    pub fn root_operations(&self) -> Vec<(&'static str, &str)> {
        let mut result = vec![("query", self.roots.query.as_str())];
        if let Some(mutation) = &self.roots.mutation {
            result.push(("mutation", mutation));
        }
        if let Some(subscription) = &self.roots.subscription {
            result.push(("subscription", subscription));
        }
        result
    }

    pub fn root_type_names(&self) -> Vec<&str> {
        self.root_operations()
            .into_iter()
            .map(|(_, name)| name)
            .collect()
    }

    pub fn type_named(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        match self.types.get(name) {
            Some(NamedType::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDefinition> {
        self.directives.values()
    }

    /// Verifies that every reference resolves to a type of a kind allowed in
    /// its position.
    pub fn check_references(&self) -> Result<()> {
        for ty in self.types.values() {
            let owner = ty.name();
            if let Some(fields) = ty.fields() {
                for field in fields.values() {
                    let field_path = format!("{}.{}", owner, field.name);
                    self.check_position(
                        field.ty.named_type(),
                        &field_path,
                        "field type",
                        TypeKind::is_output,
                    )?;
                    for argument in &field.arguments {
                        self.check_position(
                            argument.ty.named_type(),
                            &format!("{}({}:)", field_path, argument.name),
                            "argument type",
                            TypeKind::is_input,
                        )?;
                    }
                }
            }
            for interface in ty.interfaces() {
                self.check_variant(owner, interface, TypeKind::Interface, "an interface")?;
            }
            match ty {
                NamedType::Union(union) => {
                    for member in &union.members {
                        self.check_variant(owner, member, TypeKind::Object, "object members")?;
                    }
                }
                NamedType::InputObject(input) => {
                    for field in input.fields.values() {
                        self.check_position(
                            field.ty.named_type(),
                            &format!("{}.{}", owner, field.name),
                            "input field type",
                            TypeKind::is_input,
                        )?;
                    }
                }
                _ => {}
            }
        }
        for directive in self.directives.values() {
            for argument in &directive.arguments {
                self.check_position(
                    argument.ty.named_type(),
                    &format!("@{}({}:)", directive.name, argument.name),
                    "argument type",
                    TypeKind::is_input,
                )?;
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str, referenced_by: &str) -> Result<&NamedType> {
        self.types.get(name).ok_or_else(|| Error::DanglingReference {
            type_name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })
    }

    fn check_position(
        &self,
        name: &str,
        referenced_by: &str,
        position: &'static str,
        allowed: fn(TypeKind) -> bool,
    ) -> Result<()> {
        let kind = self.lookup(name, referenced_by)?.kind();
        if allowed(kind) {
            Ok(())
        } else {
            Err(Error::InvalidTypePosition {
                type_name: name.to_string(),
                kind,
                position,
                referenced_by: referenced_by.to_string(),
            })
        }
    }

    fn check_variant(
        &self,
        owner: &str,
        name: &str,
        expected_kind: TypeKind,
        expected: &'static str,
    ) -> Result<()> {
        let kind = self.lookup(name, owner)?.kind();
        if kind == expected_kind {
            Ok(())
        } else {
            Err(Error::UnsupportedVariant {
                owner: owner.to_string(),
                type_name: name.to_string(),
                kind,
                expected,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> TypeRef {
        TypeRef::Named(String::from(name))
    }

    fn object(name: &str, fields: Vec<Field>) -> NamedType {
        NamedType::Object(ObjectType {
            name: String::from(name),
            description: None,
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
            interfaces: Vec::new(),
        })
    }

    fn scalar(name: &str) -> NamedType {
        NamedType::Scalar(ScalarType {
            name: String::from(name),
            description: None,
        })
    }

    #[test]
    fn type_ref_display_and_named_type() {
        let ty = named("Bool").non_null().list().non_null();
        assert_eq!(ty.to_string(), "[Bool!]!");
        assert_eq!(ty.named_type(), "Bool");
    }

    #[test]
    fn type_ref_try_map_keeps_wrappers() {
        let ty = named("Foo").list();
        let mapped: std::result::Result<TypeRef<usize>, ()> = ty.try_map(&mut |n| Ok(n.len()));
        assert_eq!(mapped, Ok(TypeRef::List(Box::new(TypeRef::Named(3)))));
    }

    #[test]
    fn new_rejects_missing_query_root() {
        let result = SchemaGraph::new(RootTypes::query("Query"), vec![scalar("String")], vec![]);
        assert_eq!(
            result,
            Err(Error::MissingRootType {
                operation: "query",
                type_name: String::from("Query"),
            })
        );
    }

    #[test]
    fn new_rejects_duplicate_types() {
        let result = SchemaGraph::new(
            RootTypes::query("Query"),
            vec![object("Query", vec![]), object("Query", vec![])],
            vec![],
        );
        assert_eq!(result, Err(Error::DuplicateTypeName(String::from("Query"))));
    }

    #[test]
    fn check_references_reports_dangling_field_type() {
        let graph = SchemaGraph::new(
            RootTypes::query("Query"),
            vec![object("Query", vec![Field::new("hello", named("Missing"))])],
            vec![],
        )
        .unwrap();
        assert_eq!(
            graph.check_references(),
            Err(Error::DanglingReference {
                type_name: String::from("Missing"),
                referenced_by: String::from("Query.hello"),
            })
        );
    }

    #[test]
    fn check_references_rejects_object_argument() {
        let mut field = Field::new("hello", named("String"));
        field.arguments.push(InputValue::new("arg", named("Query")));
        let graph = SchemaGraph::new(
            RootTypes::query("Query"),
            vec![object("Query", vec![field]), scalar("String")],
            vec![],
        )
        .unwrap();
        match graph.check_references() {
            Err(Error::InvalidTypePosition { type_name, kind, .. }) => {
                assert_eq!(type_name, "Query");
                assert_eq!(kind, TypeKind::Object);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn references_skip_implements_declarations() {
        let ty: NamedType = NamedType::Object(ObjectType {
            name: String::from("Impl"),
            description: None,
            fields: vec![(String::from("test"), Field::new("test", named("ID")))]
                .into_iter()
                .collect(),
            interfaces: vec![String::from("Interface")],
        });
        let references: Vec<&String> = ty.references();
        assert_eq!(references, vec!["ID"]);
    }
}
