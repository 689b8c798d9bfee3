use log::trace;
use serde_json::Value;

use crate::error::{
    kind_name,
    quote_names,
    EvalError,
};
use crate::filter_expression::QueryExpression;

type Result<T> = std::result::Result<T, EvalError>;

/// One step of a compiled path. Each step consumes the nodes selected by the
/// previous one and produces the input of the next.
#[derive(Debug, Clone, PartialEq)]
pub enum PathFilter {
    Root,
    /// `None` is the `*` wildcard.
    Field { name: Option<String> },
    FieldMultiple { names: Vec<String> },
    /// `None` is the `[*]` wildcard.
    ArrayIndex { index: Option<i64> },
    ArrayMultipleIndex { indexes: Vec<i64> },
    ArraySlice { start: Option<i64>, end: Option<i64>, step: Option<i64> },
    /// `None` selects every node of the scanned subtree.
    Scan { name: Option<String> },
    ScanMultiple { names: Vec<String> },
    Query { expression: QueryExpression },
    QueryScan { expression: QueryExpression },
}

impl PathFilter {
    pub(crate) fn member(member: String, scan: bool) -> Self {
        let name = if member == "*" { None } else { Some(member) };
        if scan {
            PathFilter::Scan { name }
        } else {
            PathFilter::Field { name }
        }
    }

    pub fn execute<'a>(&self, root: &'a Value, current: Vec<&'a Value>, error_when_no_match: bool) -> Result<Vec<&'a Value>> {
        let mut selected = Vec::new();
        match self {
            PathFilter::Root => selected.push(root),

            PathFilter::Field { name } => {
                for t in current {
                    match (t, name) {
                        (Value::Object(map), Some(name)) => match map.get(name) {
                            Some(v) => selected.push(v),
                            None if error_when_no_match => {
                                return Err(EvalError::PropertyNotFound { name: name.clone(), kind: kind_name(t) });
                            }
                            None => (),
                        },
                        (Value::Object(map), None) => selected.extend(map.values()),
                        _ if error_when_no_match => {
                            return Err(EvalError::PropertyNotValid {
                                name: name.clone().unwrap_or_else(|| String::from("*")),
                                kind: kind_name(t),
                            });
                        }
                        _ => (),
                    }
                }
            }

            PathFilter::FieldMultiple { names } => {
                for t in current {
                    if let Value::Object(map) = t {
                        let mut missing = Vec::new();
                        for name in names {
                            match map.get(name) {
                                Some(v) => selected.push(v),
                                None => missing.push(name.as_str()),
                            }
                        }

                        if error_when_no_match {
                            match missing.as_slice() {
                                [] => (),
                                [name] => {
                                    return Err(EvalError::PropertyNotFound { name: name.to_string(), kind: kind_name(t) });
                                }
                                _ => {
                                    return Err(EvalError::PropertiesNotFound { names: quote_names(&missing), kind: kind_name(t) });
                                }
                            }
                        }
                    } else if error_when_no_match {
                        return Err(EvalError::PropertiesNotValid { names: quote_names(names), kind: kind_name(t) });
                    }
                }
            }

            PathFilter::ArrayIndex { index: Some(index) } => {
                for t in current {
                    if let Some(v) = element_at(t, *index, error_when_no_match)? {
                        selected.push(v);
                    }
                }
            }

            PathFilter::ArrayIndex { index: None } => {
                for t in current {
                    match t {
                        Value::Array(items) => selected.extend(items),
                        _ if error_when_no_match => {
                            return Err(EvalError::IndexNotValid { index: String::from("*"), kind: kind_name(t) });
                        }
                        _ => (),
                    }
                }
            }

            PathFilter::ArrayMultipleIndex { indexes } => {
                for t in current {
                    for index in indexes {
                        if let Some(v) = element_at(t, *index, error_when_no_match)? {
                            selected.push(v);
                        }
                    }
                }
            }

            PathFilter::ArraySlice { start, end, step } => {
                if *step == Some(0) {
                    return Err(EvalError::ZeroStep);
                }

                for t in current {
                    match t {
                        Value::Array(items) => {
                            let positions = slice_positions(items.len(), *start, *end, step.unwrap_or(1));
                            if positions.is_empty() && error_when_no_match {
                                return Err(EvalError::SliceNoResults {
                                    start: bound_text(*start),
                                    end: bound_text(*end),
                                });
                            }
                            selected.extend(positions.into_iter().map(|i| &items[i]));
                        }
                        _ if error_when_no_match => {
                            return Err(EvalError::SliceNotValid { kind: kind_name(t) });
                        }
                        _ => (),
                    }
                }
            }

            PathFilter::Scan { name } => {
                for t in current {
                    selected.extend(
                        ScanValues::new(t)
                            .filter(|(n, _)| *n == name.as_deref())
                            .map(|(_, v)| v),
                    );
                }
            }

            PathFilter::ScanMultiple { names } => {
                for t in current {
                    for (n, v) in ScanValues::new(t) {
                        let Some(n) = n else { continue };
                        for name in names {
                            if name == n {
                                selected.push(v);
                            }
                        }
                    }
                }
            }

            PathFilter::Query { expression } => {
                for t in current {
                    let children: Box<dyn Iterator<Item = &'a Value> + 'a> = match t {
                        Value::Array(items) => Box::new(items.iter()),
                        Value::Object(map) => Box::new(map.values()),
                        _ => continue,
                    };
                    selected.extend(children.filter(|v| expression.is_match(root, v)));
                }
            }

            PathFilter::QueryScan { expression } => {
                for t in current {
                    selected.extend(
                        ScanValues::new(t)
                            .map(|(_, v)| v)
                            .filter(|v| expression.is_match(root, v)),
                    );
                }
            }
        }

        Ok(selected)
    }
}

/// Runs `filters` in order, starting from `current`.
pub(crate) fn evaluate<'a>(filters: &[PathFilter], root: &'a Value, current: &'a Value, error_when_no_match: bool) -> Result<Vec<&'a Value>> {
    let mut values = vec![current];
    for filter in filters {
        values = filter.execute(root, values, error_when_no_match)?;
        trace!("{:?} selected {} node(s)", filter, values.len());
    }

    Ok(values)
}

fn element_at(t: &Value, index: i64, error_when_no_match: bool) -> Result<Option<&Value>> {
    match t {
        Value::Array(items) => {
            let element = usize::try_from(index).ok().and_then(|i| items.get(i));
            if element.is_none() && error_when_no_match {
                return Err(EvalError::IndexOutOfBounds { index, kind: kind_name(t) });
            }
            Ok(element)
        }
        _ if error_when_no_match => Err(EvalError::IndexNotValid { index: index.to_string(), kind: kind_name(t) }),
        _ => Ok(None),
    }
}

fn bound_text(bound: Option<i64>) -> String {
    bound.map_or_else(|| String::from("*"), |b| b.to_string())
}

/// Python style slicing: negative bounds count from the end, bounds are clamped
/// to the array and a negative step walks backwards.
fn slice_positions(len: usize, start: Option<i64>, end: Option<i64>, step: i64) -> Vec<usize> {
    let len = len as i64;
    let forward = step > 0;

    let mut start_index = start.unwrap_or(if forward { 0 } else { len - 1 });
    let mut stop_index = end.unwrap_or(if forward { len } else { -1 });
    if start.is_some_and(|s| s < 0) {
        start_index += len;
    }
    if end.is_some_and(|e| e < 0) {
        stop_index += len;
    }

    start_index = if forward { start_index.clamp(0, len) } else { start_index.min(len - 1) };
    stop_index = stop_index.clamp(-1, len);

    let mut positions = Vec::new();
    let mut i = start_index;
    while (forward && i < stop_index) || (!forward && i > stop_index) {
        positions.push(i as usize);
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }

    positions
}

/// Pre-order walk over a subtree. The walked node comes first, unnamed. An
/// object property yields its value named, then the value's own walk (which
/// repeats the value unnamed); array elements only appear through their walk.
pub(crate) struct ScanValues<'a> {
    stack: Vec<(Option<&'a str>, &'a Value, bool)>,
}

impl<'a> ScanValues<'a> {
    pub(crate) fn new(node: &'a Value) -> Self {
        ScanValues {
            stack: vec![(None, node, true)],
        }
    }
}

impl<'a> Iterator for ScanValues<'a> {
    type Item = (Option<&'a str>, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let (name, value, descend) = self.stack.pop()?;
        if descend {
            match value {
                Value::Array(items) => {
                    for item in items.iter().rev() {
                        self.stack.push((None, item, true));
                    }
                }
                Value::Object(map) => {
                    for (n, v) in map.iter().rev() {
                        self.stack.push((None, v, true));
                        self.stack.push((Some(n.as_str()), v, false));
                    }
                }
                _ => (),
            }
        }

        Some((name, value))
    }
}
