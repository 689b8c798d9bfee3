use std::io;

use serde_json::Value;

/// Raised while compiling path text. Never recovered from.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected character while parsing path: {0}")]
    UnexpectedCharacter(char),
    #[error("Unexpected end while parsing path.")]
    UnexpectedEnd,
    #[error("Path ended with open indexer.")]
    OpenIndexer,
    #[error("Unexpected character while parsing path indexer: {0}")]
    UnexpectedIndexerCharacter(char),
    #[error("Array index expected.")]
    IndexExpected,
    #[error("Unexpected character following indexer: {0}")]
    UnexpectedFollowingIndexer(char),
    #[error("Path ended with an open regex.")]
    OpenRegex,
    #[error("Path ended with an open string.")]
    OpenString,
    #[error("Unknown escape character: \\{0}")]
    UnknownEscape(char),
    #[error("Unexpected character while parsing path query: {0}")]
    UnexpectedQueryCharacter(char),
    #[error("Path ended with open query.")]
    OpenQuery,
    #[error("Could not read query operator.")]
    QueryOperator,
    #[error("Invalid number in path: {0}")]
    InvalidNumber(String),
    #[error("Invalid regex /{pattern}/: {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("Failed to read path text: {0}")]
    Read(#[from] io::Error),
}

/// Raised while running a compiled path. Apart from a zero slice step, only
/// produced when the caller asked for errors on missing matches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("Property '{name}' does not exist on {kind}.")]
    PropertyNotFound { name: String, kind: &'static str },
    #[error("Properties {names} do not exist on {kind}.")]
    PropertiesNotFound { names: String, kind: &'static str },
    #[error("Property '{name}' not valid on {kind}.")]
    PropertyNotValid { name: String, kind: &'static str },
    #[error("Properties {names} not valid on {kind}.")]
    PropertiesNotValid { names: String, kind: &'static str },
    #[error("Index {index} outside the bounds of {kind}.")]
    IndexOutOfBounds { index: i64, kind: &'static str },
    #[error("Index {index} not valid on {kind}.")]
    IndexNotValid { index: String, kind: &'static str },
    #[error("Array slice is not valid on {kind}.")]
    SliceNotValid { kind: &'static str },
    #[error("Array slice of {start} to {end} returned no results.")]
    SliceNoResults { start: String, end: String },
    #[error("Step cannot be zero.")]
    ZeroStep,
    #[error("Path returned multiple tokens.")]
    MultipleResults,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

pub(crate) fn quote_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| format!("'{}'", name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
