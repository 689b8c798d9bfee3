//! This library provides:
//! - JsonPath: compiles a JSONPath-like expression into a chain of filters
//! - PathFilter: one selection step (property, index, slice, wildcard, recursive scan, query)
//! - QueryExpression: the `[?( ... )]` predicate language, with comparisons, regex matching and `&&`/`||`
//!
//! Documents are `serde_json::Value` trees. Selection borrows from the document
//! and returns matches in document order.
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({"items": [{"name": "a", "price": 3}, {"name": "b", "price": 30}]});
//! let names = docpath::select_all("$.items[?(@.price > 10)].name", &doc, false).unwrap();
//! assert_eq!(names, vec![&json!("b")]);
//! ```

mod error;
mod settings;
mod peekable_codepoints;
mod path_parser;
mod path_filter;
mod filter_expression;
mod value_compare;
mod json_path;

use serde_json::Value;

pub use crate::error::{
    Error,
    EvalError,
    ParseError,
    Result,
};
pub use crate::filter_expression::{
    LogicalOperator,
    Operand,
    QueryExpression,
    QueryOperator,
    RegexLiteral,
};
pub use crate::json_path::JsonPath;
pub use crate::path_filter::PathFilter;
pub use crate::settings::SelectSettings;

/// Same as [`JsonPath::parse`].
pub fn compile(path_str: &str) -> Result<JsonPath, ParseError> {
    JsonPath::parse(path_str)
}

/// Compiles `path_str` and selects every match from `root`.
pub fn select_all<'a>(path_str: &str, root: &'a Value, error_when_no_match: bool) -> Result<Vec<&'a Value>> {
    let path = JsonPath::parse(path_str)?;
    Ok(path.select_all(root, error_when_no_match)?)
}

/// Compiles `path_str` and selects at most one match from `root`.
pub fn select_one<'a>(path_str: &str, root: &'a Value, error_when_no_match: bool) -> Result<Option<&'a Value>> {
    let path = JsonPath::parse(path_str)?;
    Ok(path.select_one(root, error_when_no_match)?)
}
