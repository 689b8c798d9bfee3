//! Comparison semantics for query operators.
//!
//! Equality never crosses kinds (apart from integer vs float numbers). Ordering
//! additionally coerces a string to a number when the other side is numeric.

use std::cmp::Ordering;

use serde_json::{
    Number,
    Value,
};

use crate::filter_expression::QueryOperator;

pub(crate) fn compare(operator: QueryOperator, left: &Value, right: &Value) -> bool {
    match operator {
        QueryOperator::Equals => values_equal(left, right),
        QueryOperator::NotEquals => !values_equal(left, right),
        QueryOperator::LessThan => matches!(order(left, right), Some(Ordering::Less)),
        QueryOperator::LessThanOrEquals => matches!(order(left, right), Some(Ordering::Less | Ordering::Equal)),
        QueryOperator::GreaterThan => matches!(order(left, right), Some(Ordering::Greater)),
        QueryOperator::GreaterThanOrEquals => matches!(order(left, right), Some(Ordering::Greater | Ordering::Equal)),
        // resolved by the expression itself, they do not compare two values
        QueryOperator::Exists | QueryOperator::RegexEquals => false,
    }
}

pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(name, x)| b.get(name).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::Number(a), Value::String(b)) => a.as_f64()?.partial_cmp(&parse_number(b)?),
        (Value::String(a), Value::Number(b)) => parse_number(a)?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }

    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
