use crate::lexer::Position;
use crate::schema::TypeKind;

/// Errors raised while building, transforming or pruning a schema graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A type reachable from a root references a name the graph does not define.
    #[error("type `{type_name}` referenced by `{referenced_by}` is not defined")]
    DanglingReference {
        type_name: String,
        referenced_by: String,
    },

    /// A hook handed back a reference to a type the source schema does not define.
    #[error("type `{type_name}` referenced by `{referenced_by}` is not defined in the source schema")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },

    #[error("{operation} root type `{type_name}` is missing or not an object type")]
    MissingRootType {
        operation: &'static str,
        type_name: String,
    },

    #[error("schema contains multiple types named `{0}`")]
    DuplicateTypeName(String),

    #[error("schema contains multiple directives named `@{0}`")]
    DuplicateDirective(String),

    #[error("type `{type_name}` contains multiple fields named `{field_name}`")]
    DuplicateField {
        type_name: String,
        field_name: String,
    },

    /// A type was used where its kind is not allowed, e.g. an input object as a field type.
    #[error("{kind} `{type_name}` cannot be used as {position} of `{referenced_by}`")]
    InvalidTypePosition {
        type_name: String,
        kind: TypeKind,
        position: &'static str,
        referenced_by: String,
    },

    /// A union member that is not an object, or an implements entry that is not an interface.
    #[error("`{owner}` expects {expected} but `{type_name}` is a {kind}")]
    UnsupportedVariant {
        owner: String,
        type_name: String,
        kind: TypeKind,
        expected: &'static str,
    },

    #[error("cannot extend `{0}`: no such definition")]
    UnknownExtension(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Syntax error in SDL input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> ParseError {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
