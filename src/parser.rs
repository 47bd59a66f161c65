use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use TokenKind::*;

/// Parses an SDL document. Executable definitions are rejected.
pub fn parse(lexer: &mut Lexer) -> Result<Document, ParseError> {
    document(lexer)
}

pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let mut lexer = Lexer::new(source);
    parse(&mut lexer)
}

fn document(lexer: &mut Lexer) -> Result<Document, ParseError> {
    let definitions = many(
        lexer,
        SOF,
        parse_definition,
        END_OF_INPUT,
    )?;
    Ok(Document { definitions })
}

fn parse_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    if peek_description(lexer) {
        return parse_type_system_definition(lexer);
    }
    if peek(lexer, NAME) {
        let keyword = lexer.current_token().value().to_string();
        return match keyword.as_str() {
            "query" | "mutation" | "subscription" | "fragment" => {
                unexpected(lexer, "executable definitions are not supported in a schema")
            }
            "extend" => parse_type_system_extension(lexer),
            _ => parse_type_system_definition(lexer),
        };
    }
    if peek(lexer, BRACE_L) {
        return unexpected(lexer, "executable definitions are not supported in a schema");
    }
    unexpected_token(lexer, NAME)
}

fn parse_type_system_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let keyword = if peek_description(lexer) {
        lookahead_lexer(lexer)?
    } else {
        lexer.current_token().clone()
    };
    if keyword.kind != NAME {
        return unexpected_token(lexer, NAME);
    }
    match keyword.value() {
        "schema" => parse_schema_definition(lexer),
        "scalar" => parse_scalar_type_definition(lexer),
        "type" => parse_object_type_definition(lexer),
        "interface" => parse_interface_type_definition(lexer),
        "union" => parse_union_type_definition(lexer),
        "enum" => parse_enum_type_definition(lexer),
        "input" => parse_input_object_type_definition(lexer),
        "directive" => parse_directive_definition(lexer),
        value => Err(ParseError::new(
            format!("unexpected '{}' for type system definition", value),
            keyword.position,
        )),
    }
}

fn parse_directives(lexer: &mut Lexer) -> Result<Vec<Directive>, ParseError> {
    let mut result = Vec::new();
    while peek(lexer, AT) {
        result.push(parse_directive(lexer)?);
    }
    Ok(result)
}

fn parse_directive(lexer: &mut Lexer) -> Result<Directive, ParseError> {
    expect_token(lexer, AT)?;
    let name = parse_name(lexer)?;
    let arguments = if peek(lexer, PAREN_L) {
        many(lexer, PAREN_L, parse_argument, PAREN_R)?
    } else {
        Vec::new()
    };
    Ok(Directive { name, arguments })
}

fn parse_argument(lexer: &mut Lexer) -> Result<Argument, ParseError> {
    let name = parse_name(lexer)?;
    expect_token(lexer, COLON)?;
    let value = parse_const_value(lexer)?;
    Ok(Argument { name, value })
}

fn parse_schema_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    parse_description(lexer)?;
    expect_keyword(lexer, "schema")?;
    let directives = parse_directives(lexer)?;
    let operation_type_definitions = many(
        lexer,
        BRACE_L,
        parse_operation_type_definition,
        BRACE_R,
    )?;
    Ok(Definition::Schema(SchemaDefinition {
        directives,
        operation_type_definitions,
    }))
}

fn parse_operation_type_definition(
    lexer: &mut Lexer,
) -> Result<OperationTypeDefinition, ParseError> {
    let operation = parse_operation_type(lexer)?;
    expect_token(lexer, COLON)?;
    let type_name = parse_name(lexer)?;
    Ok(OperationTypeDefinition {
        operation,
        type_name,
    })
}

fn parse_operation_type(lexer: &mut Lexer) -> Result<OperationType, ParseError> {
    let position = lexer.current_token().position;
    match parse_name(lexer)?.as_str() {
        "query" => Ok(OperationType::Query),
        "mutation" => Ok(OperationType::Mutation),
        "subscription" => Ok(OperationType::Subscription),
        other => Err(ParseError::new(
            format!("unexpected operation type '{}'", other),
            position,
        )),
    }
}

fn parse_scalar_type_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let description = parse_description(lexer)?;
    expect_keyword(lexer, "scalar")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    Ok(Definition::ScalarType(ScalarTypeDefinition {
        name,
        description,
        directives,
    }))
}

fn parse_object_type_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let description = parse_description(lexer)?;
    expect_keyword(lexer, "type")?;
    let name = parse_name(lexer)?;
    let interfaces = parse_implements_interfaces(lexer)?;
    let directives = parse_directives(lexer)?;
    let fields = parse_field_definitions(lexer)?;
    Ok(Definition::ObjectType(ObjectTypeDefinition {
        name,
        interfaces,
        fields,
        description,
        directives,
    }))
}

fn parse_field_definitions(lexer: &mut Lexer) -> Result<Vec<FieldDefinition>, ParseError> {
    if !peek(lexer, BRACE_L) {
        return Ok(Vec::new());
    }
    many(
        lexer,
        BRACE_L,
        parse_field_definition,
        BRACE_R,
    )
}

fn parse_field_definition(lexer: &mut Lexer) -> Result<FieldDefinition, ParseError> {
    let description = parse_description(lexer)?;
    let name = parse_name(lexer)?;
    let arguments = parse_argument_definitions(lexer)?;
    expect_token(lexer, COLON)?;
    let type_reference = parse_type_reference(lexer)?;
    let directives = parse_directives(lexer)?;
    Ok(FieldDefinition {
        name,
        description,
        type_reference,
        arguments,
        directives,
    })
}

fn parse_argument_definitions(
    lexer: &mut Lexer,
) -> Result<Vec<InputValueDefinition>, ParseError> {
    if !peek(lexer, PAREN_L) {
        return Ok(Vec::new());
    }
    many(
        lexer,
        PAREN_L,
        parse_input_value_definition,
        PAREN_R,
    )
}

fn parse_input_value_definition(lexer: &mut Lexer) -> Result<InputValueDefinition, ParseError> {
    let description = parse_description(lexer)?;
    let name = parse_name(lexer)?;
    expect_token(lexer, COLON)?;
    let type_reference = parse_type_reference(lexer)?;
    let default_value = if expect_optional_token(lexer, EQUALS)? {
        Some(parse_const_value(lexer)?)
    } else {
        None
    };
    let directives = parse_directives(lexer)?;
    Ok(InputValueDefinition {
        name,
        type_reference,
        default_value,
        description,
        directives,
    })
}

fn parse_implements_interfaces(lexer: &mut Lexer) -> Result<Vec<String>, ParseError> {
    if !expect_optional_keyword(lexer, "implements")? {
        return Ok(Vec::new());
    }
    let mut result = Vec::new();
    expect_optional_token(lexer, AMP)?;
    loop {
        result.push(parse_name(lexer)?);
        if !expect_optional_token(lexer, AMP)? {
            break;
        }
    }
    Ok(result)
}

fn parse_interface_type_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let description = parse_description(lexer)?;
    expect_keyword(lexer, "interface")?;
    let name = parse_name(lexer)?;
    let interfaces = parse_implements_interfaces(lexer)?;
    let directives = parse_directives(lexer)?;
    let fields = parse_field_definitions(lexer)?;
    Ok(Definition::InterfaceType(InterfaceTypeDefinition {
        name,
        interfaces,
        fields,
        description,
        directives,
    }))
}

fn parse_union_type_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let description = parse_description(lexer)?;
    expect_keyword(lexer, "union")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    let types = parse_union_type_members(lexer)?;
    Ok(Definition::UnionType(UnionTypeDefinition {
        name,
        description,
        directives,
        types,
    }))
}

fn parse_union_type_members(lexer: &mut Lexer) -> Result<Vec<String>, ParseError> {
    let mut result = Vec::new();
    if expect_optional_token(lexer, EQUALS)? {
        expect_optional_token(lexer, PIPE)?;
        loop {
            result.push(parse_name(lexer)?);
            if !expect_optional_token(lexer, PIPE)? {
                break;
            }
        }
    }
    Ok(result)
}

fn parse_enum_type_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let description = parse_description(lexer)?;
    expect_keyword(lexer, "enum")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    let values = parse_enum_values_definition(lexer)?;
    Ok(Definition::EnumType(EnumTypeDefinition {
        name,
        directives,
        description,
        values,
    }))
}

fn parse_enum_values_definition(
    lexer: &mut Lexer,
) -> Result<Vec<EnumValueDefinition>, ParseError> {
    if !peek(lexer, BRACE_L) {
        return Ok(Vec::new());
    }
    many(
        lexer,
        BRACE_L,
        parse_enum_value_definition,
        BRACE_R,
    )
}

fn parse_enum_value_definition(lexer: &mut Lexer) -> Result<EnumValueDefinition, ParseError> {
    let description = parse_description(lexer)?;
    if let "true" | "false" | "null" = lexer.current_token().value() {
        return unexpected(lexer, "enum values cannot be named true, false or null");
    }
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    Ok(EnumValueDefinition {
        name,
        description,
        directives,
    })
}

fn parse_input_object_type_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let description = parse_description(lexer)?;
    expect_keyword(lexer, "input")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    let fields = parse_input_fields_definition(lexer)?;
    Ok(Definition::InputObjectType(InputObjectTypeDefinition {
        description,
        name,
        directives,
        fields,
    }))
}

fn parse_input_fields_definition(
    lexer: &mut Lexer,
) -> Result<Vec<InputValueDefinition>, ParseError> {
    if !peek(lexer, BRACE_L) {
        return Ok(Vec::new());
    }
    many(
        lexer,
        BRACE_L,
        parse_input_value_definition,
        BRACE_R,
    )
}

fn parse_directive_definition(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let description = parse_description(lexer)?;
    expect_keyword(lexer, "directive")?;
    expect_token(lexer, AT)?;
    let name = parse_name(lexer)?;
    let arguments = parse_argument_definitions(lexer)?;
    let repeatable = expect_optional_keyword(lexer, "repeatable")?;
    expect_keyword(lexer, "on")?;
    let locations = parse_directive_locations(lexer)?;
    Ok(Definition::Directive(DirectiveDefinition {
        description,
        name,
        repeatable,
        arguments,
        locations,
    }))
}

fn parse_directive_locations(lexer: &mut Lexer) -> Result<Vec<DirectiveLocation>, ParseError> {
    expect_optional_token(lexer, PIPE)?;
    let mut result = Vec::new();
    loop {
        result.push(parse_directive_location(lexer)?);
        if !expect_optional_token(lexer, PIPE)? {
            break;
        }
    }
    Ok(result)
}

fn parse_directive_location(lexer: &mut Lexer) -> Result<DirectiveLocation, ParseError> {
    let position = lexer.current_token().position;
    let name = parse_name(lexer)?;
    DirectiveLocation::from_name(&name).ok_or_else(|| {
        ParseError::new(format!("unexpected directive location '{}'", name), position)
    })
}

fn parse_description(lexer: &mut Lexer) -> Result<Option<String>, ParseError> {
    if !peek_description(lexer) {
        return Ok(None);
    }
    let value = lexer.current_token().value().to_string();
    advance_lexer(lexer)?;
    Ok(Some(value))
}

fn parse_type_system_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    let token = lookahead_lexer(lexer)?;
    if token.kind != NAME {
        return Err(ParseError::new(
            format!("expected {:?}, but got {:?}", NAME, token.kind),
            token.position,
        ));
    }
    expect_keyword(lexer, "extend")?;
    match token.value() {
        "schema" => parse_schema_extension(lexer),
        "scalar" => parse_scalar_type_extension(lexer),
        "type" => parse_object_type_extension(lexer),
        "interface" => parse_interface_type_extension(lexer),
        "union" => parse_union_type_extension(lexer),
        "enum" => parse_enum_type_extension(lexer),
        "input" => parse_input_object_type_extension(lexer),
        value => Err(ParseError::new(
            format!("unexpected '{}' for type system extension", value),
            token.position,
        )),
    }
}

fn parse_schema_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    expect_keyword(lexer, "schema")?;
    let directives = parse_directives(lexer)?;
    let operation_type_definitions = if peek(lexer, BRACE_L) {
        many(
            lexer,
            BRACE_L,
            parse_operation_type_definition,
            BRACE_R,
        )?
    } else {
        Vec::new()
    };
    if directives.is_empty() && operation_type_definitions.is_empty() {
        return unexpected(lexer, "'extend schema' requires directives or operation types");
    }
    Ok(Definition::SchemaExtension(SchemaDefinition {
        directives,
        operation_type_definitions,
    }))
}

fn parse_scalar_type_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    expect_keyword(lexer, "scalar")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    if directives.is_empty() {
        return unexpected(lexer, "'extend scalar' requires directives");
    }
    Ok(Definition::ScalarTypeExtension(ScalarTypeDefinition {
        name,
        description: None,
        directives,
    }))
}

fn parse_object_type_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    expect_keyword(lexer, "type")?;
    let name = parse_name(lexer)?;
    let interfaces = parse_implements_interfaces(lexer)?;
    let directives = parse_directives(lexer)?;
    let fields = parse_field_definitions(lexer)?;
    if interfaces.is_empty() && directives.is_empty() && fields.is_empty() {
        return unexpected(lexer, "'extend type' requires interfaces, directives or fields");
    }
    Ok(Definition::ObjectTypeExtension(ObjectTypeDefinition {
        name,
        interfaces,
        fields,
        description: None,
        directives,
    }))
}

fn parse_interface_type_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    expect_keyword(lexer, "interface")?;
    let name = parse_name(lexer)?;
    let interfaces = parse_implements_interfaces(lexer)?;
    let directives = parse_directives(lexer)?;
    let fields = parse_field_definitions(lexer)?;
    if interfaces.is_empty() && directives.is_empty() && fields.is_empty() {
        return unexpected(
            lexer,
            "'extend interface' requires interfaces, directives or fields",
        );
    }
    Ok(Definition::InterfaceTypeExtension(InterfaceTypeDefinition {
        name,
        interfaces,
        fields,
        description: None,
        directives,
    }))
}

fn parse_union_type_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    expect_keyword(lexer, "union")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    let types = parse_union_type_members(lexer)?;
    if directives.is_empty() && types.is_empty() {
        return unexpected(lexer, "'extend union' requires directives or members");
    }
    Ok(Definition::UnionTypeExtension(UnionTypeDefinition {
        name,
        description: None,
        directives,
        types,
    }))
}

fn parse_enum_type_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    expect_keyword(lexer, "enum")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    let values = parse_enum_values_definition(lexer)?;
    if directives.is_empty() && values.is_empty() {
        return unexpected(lexer, "'extend enum' requires directives or values");
    }
    Ok(Definition::EnumTypeExtension(EnumTypeDefinition {
        name,
        directives,
        description: None,
        values,
    }))
}

fn parse_input_object_type_extension(lexer: &mut Lexer) -> Result<Definition, ParseError> {
    expect_keyword(lexer, "input")?;
    let name = parse_name(lexer)?;
    let directives = parse_directives(lexer)?;
    let fields = parse_input_fields_definition(lexer)?;
    if directives.is_empty() && fields.is_empty() {
        return unexpected(lexer, "'extend input' requires directives or fields");
    }
    Ok(Definition::InputObjectTypeExtension(
        InputObjectTypeDefinition {
            name,
            directives,
            description: None,
            fields,
        },
    ))
}

fn parse_const_value(lexer: &mut Lexer) -> Result<Value, ParseError> {
    let token = lexer.current_token().clone();
    match token.kind {
        BRACKET_L => {
            let values = any(
                lexer,
                BRACKET_L,
                parse_const_value,
                BRACKET_R,
            )?;
            Ok(Value::ListValue(values))
        }
        BRACE_L => {
            let fields = any(lexer, BRACE_L, parse_object_field, BRACE_R)?;
            Ok(Value::ObjectValue(fields))
        }
        INT => {
            advance_lexer(lexer)?;
            Ok(Value::IntValue(token.value().to_string()))
        }
        FLOAT => {
            advance_lexer(lexer)?;
            Ok(Value::FloatValue(token.value().to_string()))
        }
        STRING | BLOCK_STRING => {
            advance_lexer(lexer)?;
            Ok(Value::StringValue(token.value().to_string()))
        }
        NAME => {
            advance_lexer(lexer)?;
            Ok(match token.value() {
                "true" => Value::BooleanValue(true),
                "false" => Value::BooleanValue(false),
                "null" => Value::NullValue,
                name => Value::EnumValue(name.to_string()),
            })
        }
        DOLLAR => unexpected(lexer, "variables are not allowed in constant values"),
        kind => unexpected(lexer, format!("unexpected {:?}, expected a value", kind)),
    }
}

fn parse_object_field(lexer: &mut Lexer) -> Result<ObjectField, ParseError> {
    let name = parse_name(lexer)?;
    expect_token(lexer, COLON)?;
    Ok(ObjectField {
        name,
        value: parse_const_value(lexer)?,
    })
}

fn parse_type_reference(lexer: &mut Lexer) -> Result<TypeReference, ParseError> {
    let mut type_reference = if expect_optional_token(lexer, BRACKET_L)? {
        let inner = parse_type_reference(lexer)?;
        expect_token(lexer, BRACKET_R)?;
        TypeReference::ListType(Box::new(inner))
    } else {
        TypeReference::NamedType(parse_name(lexer)?)
    };
    if expect_optional_token(lexer, BANG)? {
        type_reference = TypeReference::NonNullType(Box::new(type_reference));
    }
    Ok(type_reference)
}

fn parse_name(lexer: &mut Lexer) -> Result<String, ParseError> {
    let name_token = expect_token(lexer, NAME)?;
    Ok(name_token.value().to_string())
}

fn peek(lexer: &Lexer, kind: TokenKind) -> bool {
    lexer.current_token().kind == kind
}

fn peek_description(lexer: &Lexer) -> bool {
    peek(lexer, STRING) || peek(lexer, BLOCK_STRING)
}

/// Zero or more items between the delimiters.
fn any<T>(
    lexer: &mut Lexer,
    open_kind: TokenKind,
    parse_fn: fn(&mut Lexer) -> Result<T, ParseError>,
    close_kind: TokenKind,
) -> Result<Vec<T>, ParseError> {
    expect_token(lexer, open_kind)?;
    let mut result: Vec<T> = Vec::new();
    while !expect_optional_token(lexer, close_kind)? {
        result.push(parse_fn(lexer)?);
    }
    Ok(result)
}

/// One or more items between the delimiters.
fn many<T>(
    lexer: &mut Lexer,
    open_kind: TokenKind,
    parse_fn: fn(&mut Lexer) -> Result<T, ParseError>,
    close_kind: TokenKind,
) -> Result<Vec<T>, ParseError> {
    expect_token(lexer, open_kind)?;
    let mut result: Vec<T> = Vec::new();
    result.push(parse_fn(lexer)?);
    while !expect_optional_token(lexer, close_kind)? {
        result.push(parse_fn(lexer)?);
    }
    Ok(result)
}

fn expect_keyword(lexer: &mut Lexer, value: &str) -> Result<(), ParseError> {
    if expect_optional_keyword(lexer, value)? {
        return Ok(());
    }
    let token = lexer.current_token();
    let found = match token.kind {
        NAME => format!("'{}'", token.value()),
        kind => format!("{:?}", kind),
    };
    unexpected(lexer, format!("expected '{}', but got {}", value, found))
}

fn expect_optional_keyword(lexer: &mut Lexer, value: &str) -> Result<bool, ParseError> {
    let token = lexer.current_token();
    if token.kind == NAME && token.value() == value {
        advance_lexer(lexer)?;
        return Ok(true);
    }
    Ok(false)
}

fn expect_token(lexer: &mut Lexer, kind: TokenKind) -> Result<&Token, ParseError> {
    if !peek(lexer, kind) {
        return unexpected_token(lexer, kind);
    }
    advance_lexer(lexer)?;
    Ok(lexer.prev_token())
}

fn expect_optional_token(lexer: &mut Lexer, kind: TokenKind) -> Result<bool, ParseError> {
    if !peek(lexer, kind) {
        return Ok(false);
    }
    advance_lexer(lexer)?;
    Ok(true)
}

fn advance_lexer(lexer: &mut Lexer) -> Result<(), ParseError> {
    lexer.advance().map(|_| ())
}

fn lookahead_lexer(lexer: &Lexer) -> Result<Token, ParseError> {
    lexer.lookahead()
}

fn unexpected_token<T>(lexer: &Lexer, expected: TokenKind) -> Result<T, ParseError> {
    let actual = lexer.current_token().kind;
    unexpected(lexer, format!("expected {:?}, but got {:?}", expected, actual))
}

fn unexpected<T>(lexer: &Lexer, message: impl Into<String>) -> Result<T, ParseError> {
    Err(ParseError::new(message, lexer.current_token().position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    macro_rules! enum_field {
        ($enum:ident $field:ident $exp:expr) => {
            if let $enum::$field(value) = $exp {
                value
            } else {
                panic!("unexpected {:?}", $exp);
            }
        };
    }

    fn first_definition(source: &str) -> Definition {
        parse_document(source).unwrap().definitions.remove(0)
    }

    #[test]
    fn parse_object_definition() {
        let definition = first_definition("type Foo{bar: String}");
        let object_type_definition = enum_field!(Definition ObjectType &definition);
        assert_eq!(object_type_definition.name, "Foo");
        let field_definition = &object_type_definition.fields[0];
        assert_eq!(field_definition.name, "bar");
        assert_eq!(
            field_definition.type_reference,
            TypeReference::NamedType(String::from("String"))
        );
    }

    #[test]
    fn parse_object_with_description_and_interfaces() {
        let definition = first_definition(indoc! {r#"
            """
            A thing
            """
            type Foo implements & Bar & Baz @key(fields: "id") {
              "the id"
              id(format: String = "short"): ID!
            }
        "#});
        let object_type_definition = enum_field!(Definition ObjectType &definition);
        assert_eq!(object_type_definition.description.as_deref(), Some("A thing"));
        assert_eq!(object_type_definition.interfaces, vec!["Bar", "Baz"]);
        assert_eq!(object_type_definition.directives[0].name, "key");
        let field = &object_type_definition.fields[0];
        assert_eq!(field.description.as_deref(), Some("the id"));
        assert_eq!(
            field.arguments[0].default_value,
            Some(Value::StringValue(String::from("short")))
        );
    }

    #[test]
    fn parse_object_extension() {
        let definition = first_definition("extend type Foo{bar: String}");
        let object_type_extension = enum_field!(Definition ObjectTypeExtension &definition);
        assert_eq!(object_type_extension.name, "Foo");
        assert_eq!(object_type_extension.fields[0].name, "bar");
    }

    #[test]
    fn parse_schema_definition() {
        let definition = first_definition("schema { query: MyQuery}");
        let schema_definition = enum_field!(Definition Schema &definition);
        let op_type_def = &schema_definition.operation_type_definitions[0];
        assert_eq!(op_type_def.operation, OperationType::Query);
        assert_eq!(op_type_def.type_name, "MyQuery");
    }

    #[test]
    fn parse_schema_extension() {
        let definition = first_definition("extend schema { mutation: MyMutation}");
        let schema_extension = enum_field!(Definition SchemaExtension &definition);
        let op_type_def = &schema_extension.operation_type_definitions[0];
        assert_eq!(op_type_def.operation, OperationType::Mutation);
        assert_eq!(op_type_def.type_name, "MyMutation");
    }

    #[test]
    fn parse_interface_definition() {
        let definition = first_definition("interface MyI implements Node { field : Int }");
        let interface_definition = enum_field!(Definition InterfaceType &definition);
        assert_eq!(interface_definition.name, "MyI");
        assert_eq!(interface_definition.interfaces, vec!["Node"]);
        assert_eq!(
            interface_definition.fields[0].type_reference,
            TypeReference::NamedType(String::from("Int"))
        );
    }

    #[test]
    fn parse_enum_definition() {
        let definition = first_definition("enum MyEnum { FOO, BAR }");
        let enum_definition = enum_field!(Definition EnumType &definition);
        assert_eq!(enum_definition.name, "MyEnum");
        let names: Vec<&str> = enum_definition.values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["FOO", "BAR"]);
    }

    #[test]
    fn parse_union_definition() {
        let definition = first_definition("union MyUnion = | A | B | C");
        let union_definition = enum_field!(Definition UnionType &definition);
        assert_eq!(union_definition.name, "MyUnion");
        assert_eq!(union_definition.types, vec!["A", "B", "C"]);
    }

    #[test]
    fn parse_union_extension() {
        let definition = first_definition("extend union MyUnion = A");
        let union_extension = enum_field!(Definition UnionTypeExtension &definition);
        assert_eq!(union_extension.name, "MyUnion");
        assert_eq!(union_extension.types, vec!["A"]);
    }

    #[test]
    fn parse_directive_definition() {
        let definition = first_definition(
            "directive @MyDirective(arg: [Int] = [1, 2]) repeatable on FIELD_DEFINITION | OBJECT",
        );
        let directive_definition = enum_field!(Definition Directive &definition);
        assert_eq!(directive_definition.name, "MyDirective");
        assert!(directive_definition.repeatable);
        assert_eq!(
            directive_definition.locations,
            vec![DirectiveLocation::FieldDefinition, DirectiveLocation::Object]
        );
        assert_eq!(
            directive_definition.arguments[0].default_value,
            Some(Value::ListValue(vec![
                Value::IntValue(String::from("1")),
                Value::IntValue(String::from("2")),
            ]))
        );
    }

    #[test]
    fn parse_input_definition() {
        let definition = first_definition("input MyInput {field: [Bool!]! = {a: null, b: ENUM}}");
        let input_definition = enum_field!(Definition InputObjectType &definition);
        assert_eq!(input_definition.name, "MyInput");
        let field = &input_definition.fields[0];
        assert_eq!(field.name, "field");
        let non_null_bool = TypeReference::NonNullType(Box::new(TypeReference::NamedType(
            String::from("Bool"),
        )));
        let type_ref =
            TypeReference::NonNullType(Box::new(TypeReference::ListType(Box::new(non_null_bool))));
        assert_eq!(field.type_reference, type_ref);
        assert_eq!(
            field.default_value,
            Some(Value::ObjectValue(vec![
                ObjectField {
                    name: String::from("a"),
                    value: Value::NullValue,
                },
                ObjectField {
                    name: String::from("b"),
                    value: Value::EnumValue(String::from("ENUM")),
                },
            ]))
        );
    }

    #[test]
    fn parse_scalar_definition() {
        let definition = first_definition("\"when\" scalar DateTime");
        let scalar_type = enum_field!(Definition ScalarType &definition);
        assert_eq!(scalar_type.name, "DateTime");
        assert_eq!(scalar_type.description.as_deref(), Some("when"));
    }

    #[test]
    fn parse_scalar_extension() {
        let definition = first_definition("extend scalar MyScalar @MyDirective");
        let scalar_type = enum_field!(Definition ScalarTypeExtension &definition);
        assert_eq!(scalar_type.name, "MyScalar");
        let directive = Directive {
            name: String::from("MyDirective"),
            arguments: Vec::new(),
        };
        assert_eq!(scalar_type.directives, vec![directive]);
    }

    #[test]
    fn rejects_executable_definitions() {
        let error = parse_document("query { foo }").unwrap_err();
        assert_eq!(
            error.message,
            "executable definitions are not supported in a schema"
        );
    }

    #[test]
    fn rejects_empty_extension() {
        let error = parse_document("extend type Foo").unwrap_err();
        assert!(error.message.starts_with("'extend type' requires"));
    }

    #[test]
    fn reports_position_of_missing_colon() {
        let error = parse_document("type Foo {\n  bar String\n}").unwrap_err();
        assert_eq!(error.message, "expected COLON, but got NAME");
        assert_eq!(error.position.line, 2);
        assert_eq!(error.position.column, 7);
    }
}
