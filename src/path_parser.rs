use std::io::Read;
use std::mem;

use serde_json::{
    Number,
    Value,
};

use crate::error::ParseError;
use crate::filter_expression::{
    LogicalOperator,
    Operand,
    QueryExpression,
    QueryOperator,
    RegexLiteral,
};
use crate::path_filter::PathFilter;
use crate::peekable_codepoints::*;

type Result<T> = std::result::Result<T, ParseError>;

/// Single pass, left to right reader turning path text into filters.
pub struct PathParser<R>
    where R: Read
{
    peekable_cp: PeekableCodePoints<R>,
}

impl<'a> PathParser<&'a [u8]> {
    pub fn new(path_str: &'a str) -> Self {
        PathParser {
            peekable_cp: PeekableCodePoints::new(path_str.trim().as_bytes()),
        }
    }
}

impl<R: Read> PathParser<R> {
    pub fn parse(mut self) -> Result<Vec<PathFilter>> {
        let mut filters = Vec::new();

        match self.peekable_cp.peek_char(0)? {
            None => return Ok(filters),
            Some('$') => {
                // "$values" is a property name, only "$", "$." and "$[" mark the root
                match self.peekable_cp.peek_char(1)? {
                    None => return Ok(filters),
                    Some('.') | Some('[') => self.peekable_cp.skip(1)?,
                    _ => (),
                }
            }
            _ => (),
        }

        if !self.parse_path(&mut filters, false)? {
            let c = self.peekable_cp.peek_char(0)?;
            self.peekable_cp.skip_whitespace()?;
            if let (false, Some(c)) = (self.peekable_cp.is_end()?, c) {
                return Err(ParseError::UnexpectedCharacter(c));
            }
        }

        Ok(filters)
    }

    /// Returns whether the whole input has been consumed.
    fn parse_path(&mut self, filters: &mut Vec<PathFilter>, query: bool) -> Result<bool> {
        let mut member = String::new();
        let mut scan = false;
        let mut following_indexer = false;
        let mut following_dot = false;

        while let Some(c) = self.peekable_cp.peek_char(0)? {
            match c {
                '[' | '(' => {
                    if !member.is_empty() {
                        filters.push(PathFilter::member(mem::take(&mut member), scan));
                        scan = false;
                    }

                    let close = if c == '[' { ']' } else { ')' };
                    self.peekable_cp.skip(1)?;
                    self.parse_indexer(filters, close, scan)?;
                    self.peekable_cp.skip(1)?;

                    scan = false;
                    following_indexer = true;
                    following_dot = false;
                }

                ']' | ')' => break,
                c if c.is_whitespace() => break,

                '.' => {
                    if !member.is_empty() {
                        filters.push(PathFilter::member(mem::take(&mut member), scan));
                        scan = false;
                    }

                    self.peekable_cp.skip(1)?;
                    if self.peekable_cp.peek_char(0)? == Some('.') {
                        scan = true;
                        self.peekable_cp.skip(1)?;
                    }

                    following_indexer = false;
                    following_dot = true;
                }

                '=' | '<' | '!' | '>' | '|' | '&' if query => break,

                _ => {
                    if following_indexer {
                        return Err(ParseError::UnexpectedFollowingIndexer(c));
                    }

                    member.push(c);
                    self.peekable_cp.skip(1)?;
                }
            }
        }

        let at_path_end = self.peekable_cp.is_end()?;
        if !member.is_empty() {
            filters.push(PathFilter::member(member, scan));
        } else if following_dot && (at_path_end || query) {
            return Err(ParseError::UnexpectedEnd);
        }

        Ok(at_path_end)
    }

    fn peek_required(&mut self, err: fn() -> ParseError) -> Result<char> {
        self.peekable_cp.peek_char(0)?.ok_or_else(err)
    }

    /// Leaves the reader on the closing character.
    fn parse_indexer(&mut self, filters: &mut Vec<PathFilter>, close: char, scan: bool) -> Result<()> {
        self.peekable_cp.skip_whitespace()?;
        match self.peek_required(|| ParseError::OpenIndexer)? {
            '\'' => filters.push(self.parse_quoted_field(close, scan)?),
            '?' => filters.push(self.parse_query(close, scan)?),
            _ => {
                let indexer = self.parse_array_indexer(close)?;
                if scan {
                    filters.push(PathFilter::Scan { name: None });
                }
                filters.push(indexer);
            }
        }

        Ok(())
    }

    fn parse_array_indexer(&mut self, close: char) -> Result<PathFilter> {
        let mut text = String::new();
        let mut after_space = false;
        let mut indexes: Option<Vec<i64>> = None;
        let mut colon_count = 0;
        let mut bounds: [Option<i64>; 3] = [None; 3];

        loop {
            let c = self.peek_required(|| ParseError::OpenIndexer)?;
            match c {
                c if c.is_whitespace() => {
                    after_space = true;
                    self.peekable_cp.skip_whitespace()?;
                }

                c if c == close => {
                    if let Some(mut indexes) = indexes {
                        indexes.push(parse_index(&text)?);
                        return Ok(PathFilter::ArrayMultipleIndex { indexes });
                    }

                    if colon_count > 0 {
                        if !text.is_empty() {
                            bounds[colon_count] = Some(parse_index(&text)?);
                        }
                        let [start, end, step] = bounds;
                        return Ok(PathFilter::ArraySlice { start, end, step });
                    }

                    return Ok(PathFilter::ArrayIndex { index: Some(parse_index(&text)?) });
                }

                ',' if colon_count == 0 => {
                    let index = parse_index(&mem::take(&mut text))?;
                    indexes.get_or_insert_with(Vec::new).push(index);
                    self.peekable_cp.skip(1)?;
                    self.peekable_cp.skip_whitespace()?;
                    after_space = false;
                }

                ':' if indexes.is_none() && colon_count < 2 => {
                    if !text.is_empty() {
                        bounds[colon_count] = Some(parse_index(&mem::take(&mut text))?);
                    }
                    colon_count += 1;
                    self.peekable_cp.skip(1)?;
                    self.peekable_cp.skip_whitespace()?;
                    after_space = false;
                }

                '*' if text.is_empty() && indexes.is_none() && colon_count == 0 => {
                    self.peekable_cp.skip(1)?;
                    self.peekable_cp.skip_whitespace()?;
                    let next = self.peek_required(|| ParseError::OpenIndexer)?;
                    if next != close {
                        return Err(ParseError::UnexpectedIndexerCharacter(next));
                    }
                    return Ok(PathFilter::ArrayIndex { index: None });
                }

                c if (c.is_ascii_digit() || c == '-') && !after_space => {
                    text.push(c);
                    self.peekable_cp.skip(1)?;
                }

                _ => return Err(ParseError::UnexpectedIndexerCharacter(c)),
            }
        }
    }

    fn parse_quoted_field(&mut self, close: char, scan: bool) -> Result<PathFilter> {
        let mut names = Vec::new();
        loop {
            match self.peek_required(|| ParseError::OpenIndexer)? {
                '\'' => (),
                c => return Err(ParseError::UnexpectedIndexerCharacter(c)),
            }

            names.push(self.read_quoted_string()?);
            self.peekable_cp.skip_whitespace()?;

            match self.peek_required(|| ParseError::OpenIndexer)? {
                c if c == close => break,
                ',' => {
                    self.peekable_cp.skip(1)?;
                    self.peekable_cp.skip_whitespace()?;
                }
                c => return Err(ParseError::UnexpectedIndexerCharacter(c)),
            }
        }

        let filter = match (names.len(), scan) {
            (1, false) => PathFilter::Field { name: names.pop() },
            (1, true) => PathFilter::Scan { name: names.pop() },
            (_, false) => PathFilter::FieldMultiple { names },
            (_, true) => PathFilter::ScanMultiple { names },
        };

        Ok(filter)
    }

    fn parse_query(&mut self, close: char, scan: bool) -> Result<PathFilter> {
        self.peekable_cp.skip(1)?;
        match self.peek_required(|| ParseError::OpenIndexer)? {
            '(' => self.peekable_cp.skip(1)?,
            c => return Err(ParseError::UnexpectedIndexerCharacter(c)),
        }

        let expression = self.parse_expression()?;
        self.peekable_cp.skip(1)?;
        self.peekable_cp.skip_whitespace()?;

        match self.peek_required(|| ParseError::OpenIndexer)? {
            c if c == close => (),
            c => return Err(ParseError::UnexpectedIndexerCharacter(c)),
        }

        if scan {
            Ok(PathFilter::QueryScan { expression })
        } else {
            Ok(PathFilter::Query { expression })
        }
    }

    /// Folds `&&`/`||` strictly left to right: an operator different from the
    /// innermost open composite opens a nested composite that takes over the
    /// following operands, so `a && b || c` becomes `And(a, Or(b, c))`.
    fn parse_expression(&mut self) -> Result<QueryExpression> {
        let mut open: Vec<(LogicalOperator, Vec<QueryExpression>)> = Vec::new();

        while !self.peekable_cp.is_end()? {
            let left = self.parse_side()?;
            let expression = match self.peek_required(|| ParseError::OpenQuery)? {
                ')' | '|' | '&' => QueryExpression::exists(left),
                _ => {
                    let operator = self.parse_operator()?;
                    let right = self.parse_side()?;
                    QueryExpression::Boolean { operator, left, right: Some(right) }
                }
            };

            let logical = match self.peek_required(|| ParseError::OpenQuery)? {
                ')' => return Ok(close_composites(open, expression)),
                '&' if self.peekable_cp.match_str("&&")? => LogicalOperator::And,
                '|' if self.peekable_cp.match_str("||")? => LogicalOperator::Or,
                c => return Err(ParseError::UnexpectedQueryCharacter(c)),
            };

            match open.last_mut() {
                Some((operator, operands)) if *operator == logical => operands.push(expression),
                _ => open.push((logical, vec![expression])),
            }
        }

        Err(ParseError::OpenQuery)
    }

    fn parse_side(&mut self) -> Result<Operand> {
        self.peekable_cp.skip_whitespace()?;

        let operand = match self.try_parse_sub_path()? {
            Some(filters) => Operand::SubPath(filters),
            None => match self.try_parse_value()? {
                Some(operand) => operand,
                None => {
                    let c = self.peek_required(|| ParseError::OpenQuery)?;
                    return Err(ParseError::UnexpectedQueryCharacter(c));
                }
            },
        };

        self.peekable_cp.skip_whitespace()?;
        if self.peekable_cp.is_end()? {
            return Err(ParseError::OpenQuery);
        }

        Ok(operand)
    }

    fn try_parse_sub_path(&mut self) -> Result<Option<Vec<PathFilter>>> {
        let mut filters = match self.peekable_cp.peek_char(0)? {
            Some('$') => vec![PathFilter::Root],
            Some('@') => Vec::new(),
            _ => return Ok(None),
        };

        self.peekable_cp.skip(1)?;
        if self.parse_path(&mut filters, true)? {
            return Err(ParseError::OpenQuery);
        }

        Ok(Some(filters))
    }

    fn try_parse_value(&mut self) -> Result<Option<Operand>> {
        let value = match self.peekable_cp.peek_char(0)? {
            Some('\'') => Value::String(self.read_quoted_string()?),
            Some(c) if c.is_ascii_digit() || c == '-' => self.read_number()?,
            Some('t') if self.peekable_cp.match_str("true")? => Value::Bool(true),
            Some('f') if self.peekable_cp.match_str("false")? => Value::Bool(false),
            Some('n') if self.peekable_cp.match_str("null")? => Value::Null,
            Some('/') => return Ok(Some(Operand::Regex(self.read_regex()?))),
            _ => return Ok(None),
        };

        Ok(Some(Operand::Literal(value)))
    }

    fn parse_operator(&mut self) -> Result<QueryOperator> {
        if self.peekable_cp.peek_char(1)?.is_none() {
            return Err(ParseError::OpenQuery);
        }

        let operators = [
            ("==", QueryOperator::Equals),
            ("=~", QueryOperator::RegexEquals),
            ("!=", QueryOperator::NotEquals),
            ("<>", QueryOperator::NotEquals),
            ("<=", QueryOperator::LessThanOrEquals),
            ("<", QueryOperator::LessThan),
            (">=", QueryOperator::GreaterThanOrEquals),
            (">", QueryOperator::GreaterThan),
        ];
        for (text, operator) in operators {
            if self.peekable_cp.match_str(text)? {
                return Ok(operator);
            }
        }

        Err(ParseError::QueryOperator)
    }

    fn read_quoted_string(&mut self) -> Result<String> {
        self.peekable_cp.skip(1)?;

        let mut text = String::new();
        loop {
            match self.peekable_cp.next_char()? {
                None => return Err(ParseError::OpenString),
                Some('\'') => return Ok(text),
                Some('\\') => {
                    let escaped = match self.peekable_cp.next_char()? {
                        None => return Err(ParseError::OpenString),
                        Some('b') => '\u{8}',
                        Some('t') => '\t',
                        Some('n') => '\n',
                        Some('f') => '\u{c}',
                        Some('r') => '\r',
                        Some(c @ ('\\' | '"' | '\'' | '/')) => c,
                        Some(c) => return Err(ParseError::UnknownEscape(c)),
                    };
                    text.push(escaped);
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn read_number(&mut self) -> Result<Value> {
        let mut text = String::new();
        while let Some(c) = self.peekable_cp.peek_char(0)? {
            if !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
                break;
            }
            text.push(c);
            self.peekable_cp.skip(1)?;
        }

        let number = if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().ok().and_then(Number::from_f64)
        } else {
            text.parse::<i64>()
                .map(Number::from)
                .or_else(|_| text.parse::<u64>().map(Number::from))
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
        };

        number.map(Value::Number).ok_or(ParseError::InvalidNumber(text))
    }

    fn read_regex(&mut self) -> Result<RegexLiteral> {
        self.peekable_cp.skip(1)?;

        let mut pattern = String::new();
        loop {
            match self.peekable_cp.next_char()? {
                None => return Err(ParseError::OpenRegex),
                Some('/') => break,
                Some('\\') => {
                    pattern.push('\\');
                    match self.peekable_cp.next_char()? {
                        Some(c) => pattern.push(c),
                        None => return Err(ParseError::OpenRegex),
                    }
                }
                Some(c) => pattern.push(c),
            }
        }

        let mut flags = String::new();
        while let Some(c) = self.peekable_cp.peek_char(0)? {
            if !c.is_alphabetic() {
                break;
            }
            flags.push(c);
            self.peekable_cp.skip(1)?;
        }

        RegexLiteral::new(&pattern, &flags)
    }
}

fn parse_index(text: &str) -> Result<i64> {
    if text.is_empty() {
        return Err(ParseError::IndexExpected);
    }

    text.parse::<i64>().map_err(|_| ParseError::InvalidNumber(text.to_string()))
}

fn close_composites(open: Vec<(LogicalOperator, Vec<QueryExpression>)>, last: QueryExpression) -> QueryExpression {
    open.into_iter().rev().fold(last, |inner, (operator, mut expressions)| {
        expressions.push(inner);
        QueryExpression::Composite { operator, expressions }
    })
}
