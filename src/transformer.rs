//! The schema transformation engine.
//!
//! Types are rebuilt into an arena. Every traversal (the root one and one per
//! `copy_type` call) owns a hook set and a memo table from source type name to
//! arena slot. A slot is allocated, memoized and queued before its type is
//! built, so references back to a type under construction resolve to its
//! slot. Once the queue is empty the arena is reduced to the types reachable
//! from the roots and directives, and converted back into a name-keyed graph.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::build::is_built_in_scalar;
use crate::error::{Error, Result};
use crate::hooks::*;
use crate::reachability::{mark_reachable, ReferenceGraph};
use crate::schema::*;
use crate::utils::order_by_kind;

const ROOT_TRAVERSAL: usize = 0;

/// Rewrites `schema` with `hooks`.
///
/// Only types reached from the roots and directive arguments of the rewritten
/// graph are emitted. Objects implementing an interface that the root
/// traversal visited are visited as well, so implementors survive as long as
/// their interface is still referenced.
pub fn transform_schema<'h, H: SchemaTransformer + 'h>(
    schema: &SchemaGraph,
    hooks: H,
) -> Result<SchemaGraph> {
    let mut builder = Builder::new(schema, Rc::new(hooks));
    let roots = builder.visit_roots()?;
    let directives = builder.visit_directives()?;
    loop {
        builder.drain()?;
        if !builder.visit_implementors(ROOT_TRAVERSAL)? {
            break;
        }
    }
    builder.finish(roots, directives)
}

struct Traversal<'h> {
    hooks: Rc<dyn SchemaTransformer + 'h>,
    memo: HashMap<String, TypeId>,
}

struct Slot {
    origin: String,
    kind: TypeKind,
    traversal: usize,
    built: Option<NamedType<TypeId>>,
}

struct RootIds {
    query: TypeId,
    mutation: Option<TypeId>,
    subscription: Option<TypeId>,
}

pub(crate) struct Builder<'g, 'h> {
    source: &'g SchemaGraph,
    traversals: Vec<Traversal<'h>>,
    slots: Vec<Slot>,
    queue: VecDeque<TypeId>,
}

impl<'g, 'h> Builder<'g, 'h> {
    fn new(source: &'g SchemaGraph, hooks: Rc<dyn SchemaTransformer + 'h>) -> Builder<'g, 'h> {
        Builder {
            source,
            traversals: vec![Traversal {
                hooks,
                memo: HashMap::new(),
            }],
            slots: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    fn visit_roots(&mut self) -> Result<RootIds> {
        let source = self.source;
        let roots = source.roots();
        let query = self.visit(ROOT_TRAVERSAL, &roots.query, "schema")?;
        let mut visit_root = |name: &Option<String>| -> Result<Option<TypeId>> {
            match name {
                Some(name) => Ok(Some(self.visit(ROOT_TRAVERSAL, name, "schema")?)),
                None => Ok(None),
            }
        };
        Ok(RootIds {
            query,
            mutation: visit_root(&roots.mutation)?,
            subscription: visit_root(&roots.subscription)?,
        })
    }

    fn visit_directives(&mut self) -> Result<Vec<DirectiveDefinition<TypeId>>> {
        let source = self.source;
        let mut result = Vec::new();
        for directive in source.directives() {
            let mut arguments = Vec::with_capacity(directive.arguments.len());
            for argument in &directive.arguments {
                let handles = argument
                    .clone()
                    .try_map::<TypeHandle, Error>(&mut |name| Ok(TypeHandle::Source(name)))?;
                let path = format!("@{}({}:)", directive.name, argument.name);
                arguments.push(self.resolve_input_value(
                    ROOT_TRAVERSAL,
                    handles,
                    &path,
                    "argument type",
                )?);
            }
            result.push(DirectiveDefinition {
                name: directive.name.clone(),
                description: directive.description.clone(),
                arguments,
                repeatable: directive.repeatable,
                locations: directive.locations.clone(),
            });
        }
        Ok(result)
    }

    fn source_kind(&self, name: &str) -> Option<TypeKind> {
        match self.source.type_named(name) {
            Some(ty) => Some(ty.kind()),
            None if is_built_in_scalar(name) => Some(TypeKind::Scalar),
            None => None,
        }
    }

    /// Returns the slot of source type `name` in `traversal`, allocating and
    /// queueing a placeholder on first sight.
    fn visit(&mut self, traversal: usize, name: &str, referenced_by: &str) -> Result<TypeId> {
        if let Some(id) = self.traversals[traversal].memo.get(name) {
            return Ok(*id);
        }
        let kind = self.source_kind(name).ok_or_else(|| Error::UnknownType {
            type_name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })?;
        let id = TypeId(self.slots.len());
        log::trace!("visiting {} in traversal {} as {:?}", name, traversal, id);
        self.slots.push(Slot {
            origin: name.to_string(),
            kind,
            traversal,
            built: None,
        });
        self.traversals[traversal].memo.insert(name.to_string(), id);
        self.queue.push_back(id);
        Ok(id)
    }

    fn slot(&self, id: TypeId, referenced_by: &str) -> Result<&Slot> {
        self.slots.get(id.0).ok_or_else(|| Error::UnknownType {
            type_name: TypeHandle::Built(id).to_string(),
            referenced_by: referenced_by.to_string(),
        })
    }

    fn resolve(&mut self, traversal: usize, handle: TypeHandle, referenced_by: &str) -> Result<TypeId> {
        match handle {
            TypeHandle::Source(name) => self.visit(traversal, &name, referenced_by),
            TypeHandle::Built(id) => self.slot(id, referenced_by).map(|_| id),
        }
    }

    fn resolve_ref(
        &mut self,
        traversal: usize,
        ty: TypeRef<TypeHandle>,
        referenced_by: &str,
        position: &'static str,
        allowed: fn(TypeKind) -> bool,
    ) -> Result<TypeRef<TypeId>> {
        ty.try_map(&mut |handle| {
            let id = self.resolve(traversal, handle, referenced_by)?;
            let slot = &self.slots[id.0];
            if allowed(slot.kind) {
                Ok(id)
            } else {
                Err(Error::InvalidTypePosition {
                    type_name: slot.origin.clone(),
                    kind: slot.kind,
                    position,
                    referenced_by: referenced_by.to_string(),
                })
            }
        })
    }

    fn resolve_input_value(
        &mut self,
        traversal: usize,
        value: InputValue<TypeHandle>,
        referenced_by: &str,
        position: &'static str,
    ) -> Result<InputValue<TypeId>> {
        let ty = self.resolve_ref(traversal, value.ty, referenced_by, position, TypeKind::is_input)?;
        Ok(InputValue {
            name: value.name,
            description: value.description,
            ty,
            default_value: value.default_value,
        })
    }

    fn resolve_variants(
        &mut self,
        traversal: usize,
        owner: &str,
        handles: Vec<TypeHandle>,
        expected_kind: TypeKind,
        expected: &'static str,
    ) -> Result<Vec<TypeId>> {
        let mut result = Vec::with_capacity(handles.len());
        for handle in handles {
            let id = self.resolve(traversal, handle, owner)?;
            let slot = &self.slots[id.0];
            if slot.kind != expected_kind {
                return Err(Error::UnsupportedVariant {
                    owner: owner.to_string(),
                    type_name: slot.origin.clone(),
                    kind: slot.kind,
                    expected,
                });
            }
            result.push(id);
        }
        Ok(result)
    }

    fn resolve_fields(
        &mut self,
        traversal: usize,
        owner: &str,
        fields: FieldConfigMap,
    ) -> Result<IndexMap<String, Field<TypeId>>> {
        let mut result = IndexMap::with_capacity(fields.len());
        for (name, field) in fields {
            let path = format!("{}.{}", owner, name);
            let ty = self.resolve_ref(traversal, field.ty, &path, "field type", TypeKind::is_output)?;
            let mut arguments = Vec::with_capacity(field.arguments.len());
            for argument in field.arguments {
                let argument_path = format!("{}({}:)", path, argument.name);
                arguments.push(self.resolve_input_value(
                    traversal,
                    argument,
                    &argument_path,
                    "argument type",
                )?);
            }
            result.insert(
                name,
                Field {
                    name: field.name,
                    description: field.description,
                    ty,
                    arguments,
                },
            );
        }
        Ok(result)
    }

    fn transform_fields(
        &mut self,
        hooks: &dyn SchemaTransformer,
        old_outer_type: &'g NamedType,
        type_name: &str,
        fields: FieldConfigMap,
    ) -> Result<FieldConfigMap> {
        let mut context = FieldsTransformationContext {
            builder: self,
            old_outer_type,
        };
        let source_fields: HashSet<String> = fields.keys().cloned().collect();
        let fields = hooks.transform_fields(fields, &mut context)?;
        let mut result = IndexMap::with_capacity(fields.len());
        for (key, field) in fields {
            // Fields added by `transform_fields` are taken as they are.
            let field = if source_fields.contains(&key) {
                hooks.transform_field(field, &mut context)?
            } else {
                field
            };
            if result.contains_key(&field.name) {
                return Err(Error::DuplicateField {
                    type_name: type_name.to_string(),
                    field_name: field.name,
                });
            }
            result.insert(field.name.clone(), field);
        }
        Ok(result)
    }

    /// Runs the hooks of the slot's traversal and fills the slot.
    fn build(&mut self, id: TypeId) -> Result<()> {
        let (origin, traversal) = {
            let slot = &self.slots[id.0];
            (slot.origin.clone(), slot.traversal)
        };
        let hooks = Rc::clone(&self.traversals[traversal].hooks);
        let source: &'g SchemaGraph = self.source;
        let source_type = match source.type_named(&origin) {
            Some(ty) => ty,
            None => {
                let scalar = hooks.transform_scalar_type(ScalarType {
                    name: origin,
                    description: None,
                });
                self.slots[id.0].built = Some(NamedType::Scalar(scalar));
                return Ok(());
            }
        };
        let config = source_type
            .clone()
            .try_map::<TypeHandle, Error>(&mut |name| Ok(TypeHandle::Source(name)))?;

        let built = match config {
            NamedType::Scalar(scalar) => NamedType::Scalar(hooks.transform_scalar_type(scalar)),
            NamedType::Enum(enum_type) => NamedType::Enum(hooks.transform_enum_type(enum_type)),
            NamedType::Object(object) => {
                let object = hooks.transform_object_type(object);
                let fields = self.transform_fields(&*hooks, source_type, &object.name, object.fields)?;
                NamedType::Object(ObjectType {
                    fields: self.resolve_fields(traversal, &object.name, fields)?,
                    interfaces: self.resolve_variants(
                        traversal,
                        &object.name,
                        object.interfaces,
                        TypeKind::Interface,
                        "an interface",
                    )?,
                    name: object.name,
                    description: object.description,
                })
            }
            NamedType::Interface(interface) => {
                let interface = hooks.transform_interface_type(interface);
                let fields =
                    self.transform_fields(&*hooks, source_type, &interface.name, interface.fields)?;
                NamedType::Interface(InterfaceType {
                    fields: self.resolve_fields(traversal, &interface.name, fields)?,
                    interfaces: self.resolve_variants(
                        traversal,
                        &interface.name,
                        interface.interfaces,
                        TypeKind::Interface,
                        "an interface",
                    )?,
                    name: interface.name,
                    description: interface.description,
                })
            }
            NamedType::Union(union) => {
                let union = hooks.transform_union_type(union);
                NamedType::Union(UnionType {
                    members: self.resolve_variants(
                        traversal,
                        &union.name,
                        union.members,
                        TypeKind::Object,
                        "object members",
                    )?,
                    name: union.name,
                    description: union.description,
                })
            }
            NamedType::InputObject(input) => {
                let input = hooks.transform_input_type(input);
                let mut fields = IndexMap::with_capacity(input.fields.len());
                for (name, field) in input.fields {
                    let path = format!("{}.{}", input.name, name);
                    fields.insert(
                        name,
                        self.resolve_input_value(traversal, field, &path, "input field type")?,
                    );
                }
                NamedType::InputObject(InputObjectType {
                    name: input.name,
                    description: input.description,
                    fields,
                })
            }
        };
        self.slots[id.0].built = Some(built);
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(id) = self.queue.pop_front() {
            self.build(id)?;
        }
        Ok(())
    }

    /// Visits source objects implementing an interface that a type built in
    /// `traversal` references. Returns whether anything was added.
    ///
    /// An interface that only shows up in implements lists does not count.
    fn visit_implementors(&mut self, traversal: usize) -> Result<bool> {
        let mut referenced = HashSet::new();
        for slot in self.slots.iter().filter(|slot| slot.traversal == traversal) {
            let built = match &slot.built {
                Some(built) => built,
                None => continue,
            };
            for id in built.references() {
                let target = &self.slots[id.0];
                if target.kind == TypeKind::Interface && target.traversal == traversal {
                    referenced.insert(target.origin.clone());
                }
            }
        }

        let source = self.source;
        let mut added = false;
        for ty in source.types() {
            let object = match ty {
                NamedType::Object(object) => object,
                _ => continue,
            };
            if self.traversals[traversal].memo.contains_key(&object.name) {
                continue;
            }
            if object.interfaces.iter().any(|i| referenced.contains(i)) {
                self.visit(traversal, &object.name, &object.name)?;
                added = true;
            }
        }
        Ok(added)
    }

    /// Copies `ty` in a new traversal driven by `hooks`.
    pub(crate) fn copy_type(
        &mut self,
        ty: TypeRef<TypeHandle>,
        hooks: Rc<dyn SchemaTransformer + 'h>,
    ) -> Result<TypeRef<TypeHandle>> {
        let traversal = self.traversals.len();
        self.traversals.push(Traversal {
            hooks,
            memo: HashMap::new(),
        });
        ty.try_map(&mut |handle| {
            let origin = match handle {
                TypeHandle::Source(name) => name,
                TypeHandle::Built(id) => self.slot(id, "copy_type")?.origin.clone(),
            };
            Ok(TypeHandle::Built(self.visit(traversal, &origin, "copy_type")?))
        })
    }

    fn finish(
        self,
        roots: RootIds,
        directives: Vec<DirectiveDefinition<TypeId>>,
    ) -> Result<SchemaGraph> {
        let mut seeds = vec![roots.query];
        seeds.extend(roots.mutation);
        seeds.extend(roots.subscription);
        for directive in &directives {
            seeds.extend(directive.arguments.iter().map(|a| *a.ty.named_type()));
        }
        let reachable = mark_reachable(&self, seeds)?;
        let visited = self.slots.len();

        let mut names: HashMap<TypeId, String> = HashMap::with_capacity(visited);
        let mut kept: Vec<NamedType<TypeId>> = Vec::with_capacity(reachable.len());
        for (index, slot) in self.slots.into_iter().enumerate() {
            let id = TypeId(index);
            if let Some(built) = slot.built {
                names.insert(id, built.name().to_string());
                if reachable.contains(&id) {
                    kept.push(built);
                }
            }
        }
        order_by_kind(&mut kept, NamedType::kind);
        let kept_names: HashSet<String> = kept.iter().map(|ty| ty.name().to_string()).collect();

        let name_of = |id: TypeId, owner: &str| -> Result<String> {
            names.get(&id).cloned().ok_or_else(|| Error::UnknownType {
                type_name: TypeHandle::Built(id).to_string(),
                referenced_by: owner.to_string(),
            })
        };

        // Unaltered types reached by several traversals are built once per
        // traversal. Copies that read the same by name collapse into one.
        let mut types: IndexMap<String, NamedType> = IndexMap::with_capacity(kept.len());
        for mut ty in kept {
            if let Some(interfaces) = ty.interfaces_mut() {
                interfaces.retain(|id| names.get(id).map_or(false, |n| kept_names.contains(n)));
            }
            let owner = ty.name().to_string();
            let ty = ty.try_map(&mut |id| name_of(id, &owner))?;
            match types.get(&owner) {
                Some(existing) if *existing != ty => return Err(Error::DuplicateTypeName(owner)),
                Some(_) => {}
                None => {
                    types.insert(owner, ty);
                }
            }
        }
        let mut directive_definitions = Vec::with_capacity(directives.len());
        for directive in directives {
            let owner = format!("@{}", directive.name);
            directive_definitions.push(directive.try_map(&mut |id| name_of(id, &owner))?);
        }
        let roots = RootTypes {
            query: name_of(roots.query, "schema")?,
            mutation: roots.mutation.map(|id| name_of(id, "schema")).transpose()?,
            subscription: roots.subscription.map(|id| name_of(id, "schema")).transpose()?,
        };

        let schema = SchemaGraph::new(roots, types.into_values(), directive_definitions)?;
        log::debug!(
            "transformed schema: visited {} types, kept {}",
            visited,
            schema.types().count()
        );
        Ok(schema)
    }
}

impl<'g, 'h> ReferenceGraph for Builder<'g, 'h> {
    type Key = TypeId;

    fn keys(&self) -> Vec<TypeId> {
        (0..self.slots.len()).map(TypeId).collect()
    }

    fn references(&self, key: TypeId) -> Result<Vec<TypeId>> {
        Ok(match &self.slots[key.0].built {
            Some(ty) => ty.references().into_iter().copied().collect(),
            None => Vec::new(),
        })
    }

    fn implemented_interfaces(&self, key: TypeId) -> Vec<TypeId> {
        match &self.slots[key.0].built {
            Some(NamedType::Object(object)) => object.interfaces.clone(),
            _ => Vec::new(),
        }
    }
}
