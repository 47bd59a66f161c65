//! SDL output for schema graphs.

use std::fmt::Write;

use crate::ast::Value;
use crate::build::is_built_in_scalar;
use crate::schema::*;

/// Descriptions longer than this are printed as multi-line block strings.
const MAX_SINGLE_LINE_DESCRIPTION: usize = 70;

/// Prints `schema` as SDL.
///
/// The schema definition is only printed when the root types do not use the
/// default names. Built-in scalars are left out.
pub fn print_schema(schema: &SchemaGraph) -> String {
    let mut blocks = Vec::new();
    if let Some(definition) = print_schema_definition(schema.roots()) {
        blocks.push(definition);
    }
    blocks.extend(schema.directives().map(print_directive));
    blocks.extend(
        schema
            .types()
            .filter(|ty| !is_built_in_scalar(ty.name()))
            .map(print_type),
    );
    let mut result = blocks.join("\n\n");
    result.push('\n');
    result
}

fn print_schema_definition(roots: &RootTypes) -> Option<String> {
    let is_default = roots.query == "Query"
        && roots.mutation.as_deref().map_or(true, |n| n == "Mutation")
        && roots.subscription.as_deref().map_or(true, |n| n == "Subscription");
    if is_default {
        return None;
    }
    let mut result = String::from("schema {\n");
    let _ = writeln!(result, "  query: {}", roots.query);
    if let Some(mutation) = &roots.mutation {
        let _ = writeln!(result, "  mutation: {}", mutation);
    }
    if let Some(subscription) = &roots.subscription {
        let _ = writeln!(result, "  subscription: {}", subscription);
    }
    result.push('}');
    Some(result)
}

pub fn print_type(ty: &NamedType) -> String {
    let mut result = print_description(ty.description(), "", true);
    match ty {
        NamedType::Scalar(scalar) => {
            let _ = write!(result, "scalar {}", scalar.name);
        }
        NamedType::Object(object) => {
            let _ = write!(result, "type {}", object.name);
            result.push_str(&print_implements(&object.interfaces));
            result.push_str(&print_fields(object.fields.values()));
        }
        NamedType::Interface(interface) => {
            let _ = write!(result, "interface {}", interface.name);
            result.push_str(&print_implements(&interface.interfaces));
            result.push_str(&print_fields(interface.fields.values()));
        }
        NamedType::Union(union) => {
            let _ = write!(result, "union {}", union.name);
            if !union.members.is_empty() {
                let _ = write!(result, " = {}", union.members.join(" | "));
            }
        }
        NamedType::Enum(enum_type) => {
            let _ = write!(result, "enum {}", enum_type.name);
            let values: Vec<String> = enum_type
                .values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let description = print_description(value.description.as_deref(), "  ", i == 0);
                    format!("{}  {}", description, value.name)
                })
                .collect();
            result.push_str(&print_block(values));
        }
        NamedType::InputObject(input) => {
            let _ = write!(result, "input {}", input.name);
            let fields: Vec<String> = input
                .fields
                .values()
                .enumerate()
                .map(|(i, field)| {
                    let description = print_description(field.description.as_deref(), "  ", i == 0);
                    format!("{}  {}", description, print_input_value(field))
                })
                .collect();
            result.push_str(&print_block(fields));
        }
    }
    result
}

pub fn print_directive(directive: &DirectiveDefinition) -> String {
    let mut result = print_description(directive.description.as_deref(), "", true);
    let _ = write!(
        result,
        "directive @{}{}",
        directive.name,
        print_arguments(&directive.arguments, "")
    );
    if directive.repeatable {
        result.push_str(" repeatable");
    }
    let locations: Vec<&str> = directive.locations.iter().map(|l| l.as_str()).collect();
    let _ = write!(result, " on {}", locations.join(" | "));
    result
}

fn print_implements(interfaces: &[String]) -> String {
    if interfaces.is_empty() {
        String::new()
    } else {
        format!(" implements {}", interfaces.join(" & "))
    }
}

fn print_fields<'a>(fields: impl Iterator<Item = &'a Field>) -> String {
    let lines: Vec<String> = fields
        .enumerate()
        .map(|(i, field)| {
            format!(
                "{}  {}{}: {}",
                print_description(field.description.as_deref(), "  ", i == 0),
                field.name,
                print_arguments(&field.arguments, "  "),
                field.ty
            )
        })
        .collect();
    print_block(lines)
}

fn print_block(lines: Vec<String>) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!(" {{\n{}\n}}", lines.join("\n"))
    }
}

/// Arguments go on one line unless one of them carries a description.
fn print_arguments(arguments: &[InputValue], indentation: &str) -> String {
    if arguments.is_empty() {
        return String::new();
    }
    if arguments.iter().all(|a| a.description.is_none()) {
        let arguments: Vec<String> = arguments.iter().map(print_input_value).collect();
        return format!("({})", arguments.join(", "));
    }
    let inner = format!("  {}", indentation);
    let lines: Vec<String> = arguments
        .iter()
        .enumerate()
        .map(|(i, argument)| {
            format!(
                "{}{}{}",
                print_description(argument.description.as_deref(), &inner, i == 0),
                inner,
                print_input_value(argument)
            )
        })
        .collect();
    format!("(\n{}\n{})", lines.join("\n"), indentation)
}

fn print_input_value(value: &InputValue) -> String {
    let mut result = format!("{}: {}", value.name, value.ty);
    if let Some(default_value) = &value.default_value {
        let _ = write!(result, " = {}", print_value(default_value));
    }
    result
}

/// A block-string description followed by a newline, or nothing. Descriptions
/// that are not the first item of an indented block get a blank line before
/// them.
fn print_description(description: Option<&str>, indentation: &str, first_in_block: bool) -> String {
    let description = match description {
        Some(description) => description,
        None => return String::new(),
    };
    let prefix = if !indentation.is_empty() && !first_in_block {
        format!("\n{}", indentation)
    } else {
        indentation.to_string()
    };
    let block = print_block_string(description, description.len() > MAX_SINGLE_LINE_DESCRIPTION);
    format!("{}{}\n", prefix, block.replace('\n', &format!("\n{}", indentation)))
}

fn print_block_string(value: &str, prefer_multiple_lines: bool) -> String {
    let is_single_line = !value.contains('\n');
    let has_leading_space = value.starts_with(' ') || value.starts_with('\t');
    let has_trailing_quote = value.ends_with('"');
    let has_trailing_slash = value.ends_with('\\');
    let multiple_lines =
        !is_single_line || has_trailing_quote || has_trailing_slash || prefer_multiple_lines;

    let mut result = String::new();
    if multiple_lines && !(is_single_line && has_leading_space) {
        result.push('\n');
    }
    result.push_str(value);
    if multiple_lines {
        result.push('\n');
    }
    format!("\"\"\"{}\"\"\"", result.replace("\"\"\"", "\\\"\"\""))
}

pub fn print_value(value: &Value) -> String {
    match value {
        Value::IntValue(value) | Value::FloatValue(value) | Value::EnumValue(value) => value.clone(),
        Value::StringValue(value) => print_string(value),
        Value::BooleanValue(value) => value.to_string(),
        Value::NullValue => String::from("null"),
        Value::ListValue(values) => {
            let values: Vec<String> = values.iter().map(print_value).collect();
            format!("[{}]", values.join(", "))
        }
        Value::ObjectValue(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|field| format!("{}: {}", field.name, print_value(&field.value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

fn print_string(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');
    for c in value.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(result, "\\u{:04X}", c as u32);
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn print(sdl: &str) -> String {
        print_schema(&SchemaGraph::parse(sdl).unwrap())
    }

    #[test]
    fn prints_all_kinds_of_definitions() {
        let printed = print(indoc! {r#"
            """
            The root
            """
            type Query {
              "Look up a node"
              node(id: ID!, "The format" format: Format = SHORT): Node
              search(filter: Filter = {text: "a\"b", limit: 10, tags: ["x", "y"]}): [Result!]!
            }
            interface Node { id: ID! }
            type User implements Node & Named { id: ID! name: String }
            interface Named { name: String }
            union Result = User
            enum Format { "Short form" SHORT LONG }
            input Filter { text: String limit: Int = 5 tags: [String!] }
            scalar Date
            type Empty
            directive @cached(ttl: Int = 60, flag: Boolean = false) repeatable on FIELD_DEFINITION | OBJECT
        "#});
        insta::assert_snapshot!(printed, @r#"
        directive @cached(ttl: Int = 60, flag: Boolean = false) repeatable on FIELD_DEFINITION | OBJECT

        """The root"""
        type Query {
          """Look up a node"""
          node(
            id: ID!

            """The format"""
            format: Format = SHORT
          ): Node
          search(filter: Filter = {text: "a\"b", limit: 10, tags: ["x", "y"]}): [Result!]!
        }

        interface Node {
          id: ID!
        }

        type User implements Node & Named {
          id: ID!
          name: String
        }

        interface Named {
          name: String
        }

        union Result = User

        enum Format {
          """Short form"""
          SHORT
          LONG
        }

        input Filter {
          text: String
          limit: Int = 5
          tags: [String!]
        }

        scalar Date

        type Empty
        "#);
    }

    #[test]
    fn prints_schema_definition_for_custom_roots() {
        let printed = print(indoc! {"
            schema { query: Root mutation: Change }
            type Root { a: Int }
            type Change { b: Int }
        "});
        insta::assert_snapshot!(printed, @r"
        schema {
          query: Root
          mutation: Change
        }

        type Root {
          a: Int
        }

        type Change {
          b: Int
        }
        ");
    }

    #[test]
    fn omits_schema_definition_for_default_roots() {
        let printed = print("type Query { a: Int } type Mutation { b: Int }");
        assert_eq!(printed, "type Query {\n  a: Int\n}\n\ntype Mutation {\n  b: Int\n}\n");
    }

    #[test]
    fn prints_multi_line_descriptions() {
        assert_eq!(
            print_description(Some("line one\nline two"), "  ", false),
            "\n  \"\"\"\n  line one\n  line two\n  \"\"\"\n"
        );
        assert_eq!(
            print_description(Some("ends with \""), "", true),
            "\"\"\"\nends with \"\n\"\"\"\n"
        );
        assert_eq!(
            print_description(Some("has \"\"\" inside"), "", true),
            "\"\"\"has \\\"\"\" inside\"\"\"\n"
        );
        assert_eq!(print_description(None, "  ", true), "");
    }

    #[test]
    fn prints_values() {
        let value = Value::ListValue(vec![
            Value::StringValue(String::from("tab\there")),
            Value::NullValue,
            Value::BooleanValue(true),
            Value::FloatValue(String::from("1.5e3")),
        ]);
        assert_eq!(print_value(&value), r#"["tab\there", null, true, 1.5e3]"#);
    }
}
