//! Hook trait and the values hooks receive.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Result;
use crate::schema::*;
use crate::transformer::Builder;

/// A type produced by the running transformation.
///
/// Ids are only meaningful within the call that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

/// A type reference as seen by hooks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHandle {
    /// A type of the source schema, by name. Resolved through the memo table
    /// of the traversal that builds the referencing type.
    Source(String),
    /// A type that already exists in the output, e.g. a result of
    /// [`FieldsTransformationContext::copy_type`].
    Built(TypeId),
}

impl TypeHandle {
    pub fn source(name: impl Into<String>) -> TypeHandle {
        TypeHandle::Source(name.into())
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Source(name) => f.write_str(name),
            TypeHandle::Built(TypeId(id)) => write!(f, "#{}", id),
        }
    }
}

pub type ObjectTypeConfig = ObjectType<TypeHandle>;
pub type InterfaceTypeConfig = InterfaceType<TypeHandle>;
pub type UnionTypeConfig = UnionType<TypeHandle>;
pub type EnumTypeConfig = EnumType;
pub type InputObjectTypeConfig = InputObjectType<TypeHandle>;
pub type ScalarTypeConfig = ScalarType;
pub type FieldConfig = Field<TypeHandle>;
pub type FieldConfigMap = IndexMap<String, FieldConfig>;

/// Callbacks used by [`transform_schema`](crate::transform_schema).
///
/// Every method defaults to passing its input through. For objects and
/// interfaces the type hook runs first, then `transform_fields` on the whole
/// field map, then `transform_field` on every field the type already had.
/// Fields added by `transform_fields` skip `transform_field`. A field ends up
/// under the name it carries after the last hook.
pub trait SchemaTransformer {
    fn transform_object_type(&self, config: ObjectTypeConfig) -> ObjectTypeConfig {
        config
    }

    fn transform_interface_type(&self, config: InterfaceTypeConfig) -> InterfaceTypeConfig {
        config
    }

    fn transform_union_type(&self, config: UnionTypeConfig) -> UnionTypeConfig {
        config
    }

    fn transform_enum_type(&self, config: EnumTypeConfig) -> EnumTypeConfig {
        config
    }

    fn transform_input_type(&self, config: InputObjectTypeConfig) -> InputObjectTypeConfig {
        config
    }

    fn transform_scalar_type(&self, config: ScalarTypeConfig) -> ScalarTypeConfig {
        config
    }

    fn transform_fields(
        &self,
        fields: FieldConfigMap,
        _context: &mut FieldsTransformationContext<'_, '_, '_>,
    ) -> Result<FieldConfigMap> {
        Ok(fields)
    }

    fn transform_field(
        &self,
        field: FieldConfig,
        _context: &mut FieldsTransformationContext<'_, '_, '_>,
    ) -> Result<FieldConfig> {
        Ok(field)
    }
}

impl<T: SchemaTransformer + ?Sized> SchemaTransformer for &T {
    fn transform_object_type(&self, config: ObjectTypeConfig) -> ObjectTypeConfig {
        (**self).transform_object_type(config)
    }

    fn transform_interface_type(&self, config: InterfaceTypeConfig) -> InterfaceTypeConfig {
        (**self).transform_interface_type(config)
    }

    fn transform_union_type(&self, config: UnionTypeConfig) -> UnionTypeConfig {
        (**self).transform_union_type(config)
    }

    fn transform_enum_type(&self, config: EnumTypeConfig) -> EnumTypeConfig {
        (**self).transform_enum_type(config)
    }

    fn transform_input_type(&self, config: InputObjectTypeConfig) -> InputObjectTypeConfig {
        (**self).transform_input_type(config)
    }

    fn transform_scalar_type(&self, config: ScalarTypeConfig) -> ScalarTypeConfig {
        (**self).transform_scalar_type(config)
    }

    fn transform_fields(
        &self,
        fields: FieldConfigMap,
        context: &mut FieldsTransformationContext<'_, '_, '_>,
    ) -> Result<FieldConfigMap> {
        (**self).transform_fields(fields, context)
    }

    fn transform_field(
        &self,
        field: FieldConfig,
        context: &mut FieldsTransformationContext<'_, '_, '_>,
    ) -> Result<FieldConfig> {
        (**self).transform_field(field, context)
    }
}

/// Passed to the field hooks of one object or interface.
pub struct FieldsTransformationContext<'a, 'g, 'h> {
    pub(crate) builder: &'a mut Builder<'g, 'h>,
    pub(crate) old_outer_type: &'g NamedType,
}

impl<'a, 'g, 'h> FieldsTransformationContext<'a, 'g, 'h> {
    /// The source type whose fields are being transformed.
    pub fn old_outer_type(&self) -> &'g NamedType {
        self.old_outer_type
    }

    /// Copies the type `ty` points at, and everything reachable from it, with
    /// `hooks` instead of the hooks of the running traversal.
    ///
    /// Every call starts from an empty memo table, so copying the same type
    /// twice yields two distinct types. Within one copy, shared and cyclic
    /// references stay shared. The returned reference has the same list and
    /// non-null wrappers as `ty`.
    pub fn copy_type<H: SchemaTransformer + 'h>(
        &mut self,
        ty: &TypeRef<TypeHandle>,
        hooks: H,
    ) -> Result<TypeRef<TypeHandle>> {
        self.builder.copy_type(ty.clone(), Rc::new(hooks))
    }
}
