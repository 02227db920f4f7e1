//! Path expression compiler.

use super::PathError;
use std::fmt;
use std::str::FromStr;

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member lookup.
    Key(String),
    /// Array element lookup; negative values count from the end.
    Index(i64),
    /// Every child of an array or object.
    Wildcard,
}

impl Segment {
    fn is_plain_key(key: &str) -> bool {
        !key.is_empty() && !key.starts_with('*') && !key.contains(|c| c == '.' || c == '[')
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) if Self::is_plain_key(key) => write!(f, ".{key}"),
            Segment::Key(key) => {
                let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[\"{escaped}\"]")
            }
            Segment::Index(index) => write!(f, "[{index}]"),
            Segment::Wildcard => f.write_str("[*]"),
        }
    }
}

/// A compiled path expression.
///
/// Compilation is pure: the same source string always produces an equal
/// expression, and an expression can be evaluated against any number of
/// documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpression {
    source: String,
    segments: Vec<Segment>,
}

impl PathExpression {
    /// Compiles a path expression.
    pub fn compile(expression: &str) -> Result<Self, PathError> {
        let segments = Parser::new(expression).parse()?;
        Ok(Self {
            source: expression.to_string(),
            segments,
        })
    }

    /// Returns the expression as it was written.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the compiled segments, root excluded.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn parse(mut self) -> Result<Vec<Segment>, PathError> {
        match self.bump() {
            Some('$') => {}
            Some(_) => {
                self.pos = 0;
                return Err(self.error("expression must start with `$`"));
            }
            None => return Err(self.error("expression is empty")),
        }

        let mut segments = Vec::new();
        while let Some(c) = self.peek() {
            let segment = match c {
                '.' => {
                    self.bump();
                    self.dot_segment()?
                }
                '[' => {
                    self.bump();
                    self.bracket_segment()?
                }
                other => return Err(self.error(format!("unexpected character `{other}`"))),
            };
            segments.push(segment);
        }
        Ok(segments)
    }

    fn dot_segment(&mut self) -> Result<Segment, PathError> {
        match self.peek() {
            Some('.') => return Err(self.error("recursive descent (`..`) is not supported")),
            Some('*') => {
                self.bump();
                return Ok(Segment::Wildcard);
            }
            _ => {}
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected a key name after `.`"));
        }
        Ok(Segment::Key(self.source[start..self.pos].to_string()))
    }

    fn bracket_segment(&mut self) -> Result<Segment, PathError> {
        let segment = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                Segment::Key(self.quoted_key(quote)?)
            }
            Some('*') => {
                self.bump();
                Segment::Wildcard
            }
            Some(c) if c == '-' || c.is_ascii_digit() => Segment::Index(self.index()?),
            Some('?') => return Err(self.error("filter expressions are not supported")),
            Some(c) => return Err(self.error(format!("unexpected character `{c}` after `[`"))),
            None => return Err(self.error("unterminated `[`")),
        };

        match self.peek() {
            Some(']') => {
                self.bump();
                Ok(segment)
            }
            Some(':') => Err(self.error("array slices are not supported")),
            Some(',') => Err(self.error("unions are not supported")),
            Some(c) => Err(self.error(format!("expected `]`, found `{c}`"))),
            None => Err(self.error("expected `]`, found end of expression")),
        }
    }

    fn quoted_key(&mut self, quote: char) -> Result<String, PathError> {
        let mut key = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(key),
                Some('\\') => match self.bump() {
                    Some(c @ ('\\' | '"' | '\'')) => key.push(c),
                    Some(c) => return Err(self.error(format!("unknown escape `\\{c}`"))),
                    None => return Err(self.error("unterminated quoted key")),
                },
                Some(c) => key.push(c),
                None => return Err(self.error("unterminated quoted key")),
            }
        }
    }

    fn index(&mut self) -> Result<i64, PathError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let text = &self.source[start..self.pos];
        text.parse().map_err(|_| PathError::Invalid {
            expression: self.source.to_string(),
            position: start,
            reason: format!("invalid array index `{text}`"),
        })
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError::Invalid {
            expression: self.source.to_string(),
            position: self.pos,
            reason: reason.into(),
        }
    }
}
