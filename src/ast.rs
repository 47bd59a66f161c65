use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    Schema(SchemaDefinition),
    SchemaExtension(SchemaDefinition),
    ObjectType(ObjectTypeDefinition),
    ObjectTypeExtension(ObjectTypeDefinition),
    ScalarType(ScalarTypeDefinition),
    ScalarTypeExtension(ScalarTypeDefinition),
    InterfaceType(InterfaceTypeDefinition),
    InterfaceTypeExtension(InterfaceTypeDefinition),
    UnionType(UnionTypeDefinition),
    UnionTypeExtension(UnionTypeDefinition),
    EnumType(EnumTypeDefinition),
    EnumTypeExtension(EnumTypeDefinition),
    InputObjectType(InputObjectTypeDefinition),
    InputObjectTypeExtension(InputObjectTypeDefinition),
    Directive(DirectiveDefinition),
}

// Extensions reuse the definition records; their description is always None.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarTypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectTypeDefinition {
    pub name: String,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDefinition>,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceTypeDefinition {
    pub name: String,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDefinition>,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionTypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumTypeDefinition {
    pub name: String,
    pub directives: Vec<Directive>,
    pub description: Option<String>,
    pub values: Vec<EnumValueDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueDefinition {
    pub name: String,
    pub directives: Vec<Directive>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputObjectTypeDefinition {
    pub name: String,
    pub directives: Vec<Directive>,
    pub description: Option<String>,
    pub fields: Vec<InputValueDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub repeatable: bool,
    pub locations: Vec<DirectiveLocation>,
    pub arguments: Vec<InputValueDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    pub fn from_name(name: &str) -> Option<DirectiveLocation> {
        use DirectiveLocation::*;
        let location = match name {
            "QUERY" => Query,
            "MUTATION" => Mutation,
            "SUBSCRIPTION" => Subscription,
            "FIELD" => Field,
            "FRAGMENT_DEFINITION" => FragmentDefinition,
            "FRAGMENT_SPREAD" => FragmentSpread,
            "INLINE_FRAGMENT" => InlineFragment,
            "VARIABLE_DEFINITION" => VariableDefinition,
            "SCHEMA" => Schema,
            "SCALAR" => Scalar,
            "OBJECT" => Object,
            "FIELD_DEFINITION" => FieldDefinition,
            "ARGUMENT_DEFINITION" => ArgumentDefinition,
            "INTERFACE" => Interface,
            "UNION" => Union,
            "ENUM" => Enum,
            "ENUM_VALUE" => EnumValue,
            "INPUT_OBJECT" => InputObject,
            "INPUT_FIELD_DEFINITION" => InputFieldDefinition,
            _ => return None,
        };
        Some(location)
    }

    pub fn as_str(self) -> &'static str {
        use DirectiveLocation::*;
        match self {
            Query => "QUERY",
            Mutation => "MUTATION",
            Subscription => "SUBSCRIPTION",
            Field => "FIELD",
            FragmentDefinition => "FRAGMENT_DEFINITION",
            FragmentSpread => "FRAGMENT_SPREAD",
            InlineFragment => "INLINE_FRAGMENT",
            VariableDefinition => "VARIABLE_DEFINITION",
            Schema => "SCHEMA",
            Scalar => "SCALAR",
            Object => "OBJECT",
            FieldDefinition => "FIELD_DEFINITION",
            ArgumentDefinition => "ARGUMENT_DEFINITION",
            Interface => "INTERFACE",
            Union => "UNION",
            Enum => "ENUM",
            EnumValue => "ENUM_VALUE",
            InputObject => "INPUT_OBJECT",
            InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub type_reference: TypeReference,
    pub arguments: Vec<InputValueDefinition>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputValueDefinition {
    pub name: String,
    pub type_reference: TypeReference,
    pub default_value: Option<Value>,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDefinition {
    pub directives: Vec<Directive>,
    pub operation_type_definitions: Vec<OperationTypeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationTypeDefinition {
    pub operation: OperationType,
    pub type_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeReference {
    NamedType(String),
    ListType(Box<TypeReference>),
    NonNullType(Box<TypeReference>),
}

/// A constant value: default values and applied directive arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    IntValue(String),
    FloatValue(String),
    StringValue(String),
    BooleanValue(bool),
    NullValue,
    EnumValue(String),
    ListValue(Vec<Value>),
    ObjectValue(Vec<ObjectField>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectField {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}
