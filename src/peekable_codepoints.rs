use std::io::{
    Bytes,
    Read,
};

use unicode_reader::CodePoints;

use crate::error::ParseError;

type Result<T> = std::result::Result<T, ParseError>;

pub struct PeekableCodePoints<R>
    where R: Read
{
    codepoints: CodePoints<Bytes<R>>,
    buffer: Vec<char>,
}

impl<R: Read> PeekableCodePoints<R> {
    pub fn new(reader: R) -> Self {
        PeekableCodePoints {
            codepoints: CodePoints::from(reader),
            buffer: Vec::new(),
        }
    }

    fn feed_buffer(&mut self, count: usize) -> Result<usize> {
        for i in 0..count {
            let item = self.codepoints.next();
            match item {
                None => return Ok(i),
                Some(Err(e)) => return Err(ParseError::Read(e)),
                Some(Ok(c)) => self.buffer.push(c),
            }
        }

        Ok(count)
    }

    pub fn peek_char(&mut self, index: usize) -> Result<Option<char>> {
        if index >= self.buffer.len() {
            self.feed_buffer(index + 1 - self.buffer.len())?;
        }

        Ok(self.buffer.get(index).copied())
    }

    pub fn next_char(&mut self) -> Result<Option<char>> {
        let c = self.peek_char(0)?;
        if c.is_some() {
            self.buffer.remove(0);
        }

        Ok(c)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            if self.next_char()?.is_none() {
                break;
            }
        }

        Ok(())
    }

    /// Consumes `expected` only when the upcoming characters spell it out.
    pub fn match_str(&mut self, expected: &str) -> Result<bool> {
        for (i, c) in expected.chars().enumerate() {
            if self.peek_char(i)? != Some(c) {
                return Ok(false);
            }
        }

        self.skip(expected.chars().count())?;
        Ok(true)
    }

    pub fn skip_whitespace(&mut self) -> Result<()> {
        while self.peek_char(0)?.is_some_and(char::is_whitespace) {
            self.skip(1)?;
        }

        Ok(())
    }

    pub fn is_end(&mut self) -> Result<bool> {
        Ok(self.peek_char(0)?.is_none())
    }
}
