use std::borrow::Cow;
use std::fmt;

use regex::{
    Regex,
    RegexBuilder,
};
use serde_json::Value;

use crate::error::ParseError;
use crate::path_filter::{
    self,
    PathFilter,
};
use crate::value_compare;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum QueryOperator {
    Equals,
    NotEquals,
    Exists,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    RegexEquals,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// A `/pattern/flags` literal, compiled when the path is parsed.
#[derive(Debug, Clone)]
pub struct RegexLiteral {
    pattern: String,
    flags: String,
    regex: Regex,
}

impl RegexLiteral {
    /// Flags `i`, `m`, `s` and `x` map onto the regex builder; other letters are ignored.
    pub fn new(pattern: &str, flags: &str) -> Result<Self, ParseError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'))
            .build()
            .map_err(|e| ParseError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(RegexLiteral {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl fmt::Display for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Regex(RegexLiteral),
    /// Starts with [`PathFilter::Root`] when introduced by `$`; otherwise relative to `@`.
    SubPath(Vec<PathFilter>),
}

impl Operand {
    fn resolve<'a>(&'a self, root: &'a Value, current: &'a Value) -> Option<&'a Value> {
        match self {
            Operand::Literal(value) => Some(value),
            Operand::Regex(_) => None,
            Operand::SubPath(filters) => path_filter::evaluate(filters, root, current, false)
                .ok()
                .and_then(|values| values.first().copied()),
        }
    }

    fn exists(&self, root: &Value, current: &Value) -> bool {
        match self {
            // a literal resolves to itself, so only `null` is absent
            Operand::Literal(value) => !value.is_null(),
            Operand::Regex(_) => true,
            Operand::SubPath(filters) => path_filter::evaluate(filters, root, current, false)
                .map(|values| !values.is_empty())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpression {
    Boolean {
        operator: QueryOperator,
        left: Operand,
        right: Option<Operand>,
    },
    Composite {
        operator: LogicalOperator,
        expressions: Vec<QueryExpression>,
    },
}

impl QueryExpression {
    pub fn exists(operand: Operand) -> Self {
        QueryExpression::Boolean {
            operator: QueryOperator::Exists,
            left: operand,
            right: None,
        }
    }

    pub fn operator(&self) -> Option<QueryOperator> {
        match self {
            QueryExpression::Boolean { operator, .. } => Some(*operator),
            QueryExpression::Composite { .. } => None,
        }
    }

    /// Never fails: operands that cannot be resolved simply do not match.
    pub fn is_match(&self, root: &Value, current: &Value) -> bool {
        match self {
            QueryExpression::Composite { operator: LogicalOperator::And, expressions } => {
                expressions.iter().all(|e| e.is_match(root, current))
            }
            QueryExpression::Composite { operator: LogicalOperator::Or, expressions } => {
                expressions.iter().any(|e| e.is_match(root, current))
            }
            QueryExpression::Boolean { operator: QueryOperator::Exists, left, .. } => {
                left.exists(root, current)
            }
            QueryExpression::Boolean { operator: QueryOperator::RegexEquals, left, right } => {
                let Some(Operand::Regex(regex)) = right else {
                    return false;
                };
                match left.resolve(root, current).and_then(regex_text) {
                    Some(text) => regex.is_match(&text),
                    None => false,
                }
            }
            QueryExpression::Boolean { operator, left, right } => {
                let left = left.resolve(root, current);
                let right = right.as_ref().and_then(|r| r.resolve(root, current));
                match (left, right) {
                    (Some(l), Some(r)) => value_compare::compare(*operator, l, r),
                    _ => false,
                }
            }
        }
    }
}

fn regex_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}
