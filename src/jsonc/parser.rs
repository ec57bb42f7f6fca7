//! Span-tracking parser for JSON with comments and trailing commas.
//!
//! The parser keeps byte offsets for every value and object member so that
//! edits can splice the original text instead of re-serializing the whole
//! document.

use crate::error::{InstallerError, Result};
use serde_json::{Map, Value};

/// A parsed value and the byte range it occupies in the source.
#[derive(Debug, Clone)]
pub struct Node {
    pub start: usize,
    pub end: usize,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Object(Vec<Member>),
    Array(Vec<Node>),
    Scalar,
}

/// One `"key": value` pair of an object.
#[derive(Debug, Clone)]
pub struct Member {
    pub key: String,
    /// Offset of the opening quote of the key
    pub key_start: usize,
    pub value: Node,
    /// Offset of the comma following the value, if there is one
    pub comma: Option<usize>,
}

impl Node {
    pub fn is_object(&self) -> bool {
        matches!(self.kind, NodeKind::Object(_))
    }

    pub fn members(&self) -> &[Member] {
        match &self.kind {
            NodeKind::Object(members) => members,
            _ => &[],
        }
    }

    /// Look up a member by key. Duplicate keys resolve to the last one,
    /// the same way JSON readers do.
    pub fn member(&self, key: &str) -> Option<&Member> {
        self.members().iter().rev().find(|m| m.key == key)
    }

    /// Convert to a plain `serde_json::Value`, dropping spans and comments.
    pub fn to_value(&self, text: &str) -> Result<Value> {
        match &self.kind {
            NodeKind::Object(members) => {
                let mut map = Map::new();
                for member in members {
                    map.insert(member.key.clone(), member.value.to_value(text)?);
                }
                Ok(Value::Object(map))
            }
            NodeKind::Array(items) => items
                .iter()
                .map(|item| item.to_value(text))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            NodeKind::Scalar => serde_json::from_str(&text[self.start..self.end])
                .map_err(|e| InstallerError::ConfigParse(e.to_string())),
        }
    }
}

/// Parse a complete document. Leading and trailing comments are allowed,
/// anything else after the root value is an error.
pub fn parse(text: &str) -> Result<Node> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    let root = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected content after the root value"));
    }
    Ok(root)
}

/// True when the text holds nothing but whitespace and comments.
pub fn is_blank(text: &str) -> bool {
    let mut parser = Parser::new(text);
    parser.skip_trivia().is_ok() && parser.pos >= parser.bytes.len()
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            src,
            bytes: src.as_bytes(),
            pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) -> Result<()> {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let body_start = self.pos + 2;
                    match self.src[body_start..].find("*/") {
                        Some(offset) => self.pos = body_start + offset + 2,
                        None => return Err(self.error("unterminated block comment")),
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Node> {
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => {
                let start = self.pos;
                self.parse_string()?;
                Ok(self.scalar(start))
            }
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(b't') => self.parse_literal("true"),
            Some(b'f') => self.parse_literal("false"),
            Some(b'n') => self.parse_literal("null"),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Node> {
        let start = self.pos;
        self.pos += 1;
        let mut members = Vec::new();

        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b'"') => {}
                Some(_) => return Err(self.error("expected a string key")),
                None => return Err(self.error("unterminated object")),
            }

            let key_start = self.pos;
            let key = self.parse_string()?;
            self.skip_trivia()?;
            if self.peek() != Some(b':') {
                return Err(self.error("expected ':' after key"));
            }
            self.pos += 1;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            self.skip_trivia()?;

            match self.peek() {
                Some(b',') => {
                    members.push(Member {
                        key,
                        key_start,
                        value,
                        comma: Some(self.pos),
                    });
                    self.pos += 1;
                }
                Some(b'}') => {
                    members.push(Member {
                        key,
                        key_start,
                        value,
                        comma: None,
                    });
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected ',' or '}'")),
                None => return Err(self.error("unterminated object")),
            }
        }

        Ok(Node {
            start,
            end: self.pos,
            kind: NodeKind::Object(members),
        })
    }

    fn parse_array(&mut self) -> Result<Node> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b']') {
                self.pos += 1;
                break;
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected ',' or ']'")),
                None => return Err(self.error("unterminated array")),
            }
        }

        Ok(Node {
            start,
            end: self.pos,
            kind: NodeKind::Array(items),
        })
    }

    /// Consume a string literal and return its decoded contents.
    fn parse_string(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let width = self.src[self.pos..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(0);
                    self.pos += width;
                }
                Some(b'\n') | None => return Err(self.error("unterminated string")),
                Some(_) => self.pos += 1,
            }
        }

        serde_json::from_str(&self.src[start..self.pos]).map_err(|e| {
            InstallerError::ConfigParse(format!("invalid string at {}: {}", self.location(start), e))
        })
    }

    fn parse_number(&mut self) -> Result<Node> {
        let start = self.pos;
        while let Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') = self.peek() {
            self.pos += 1;
        }
        serde_json::from_str::<Value>(&self.src[start..self.pos]).map_err(|_| {
            InstallerError::ConfigParse(format!("invalid number at {}", self.location(start)))
        })?;
        Ok(self.scalar(start))
    }

    fn parse_literal(&mut self, literal: &str) -> Result<Node> {
        if !self.src[self.pos..].starts_with(literal) {
            return Err(self.error("unexpected character"));
        }
        let start = self.pos;
        self.pos += literal.len();
        Ok(self.scalar(start))
    }

    fn scalar(&self, start: usize) -> Node {
        Node {
            start,
            end: self.pos,
            kind: NodeKind::Scalar,
        }
    }

    fn location(&self, offset: usize) -> String {
        let before = &self.src[..offset.min(self.src.len())];
        let line = before.matches('\n').count() + 1;
        let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
        format!("line {} column {}", line, column)
    }

    fn error(&self, message: &str) -> InstallerError {
        InstallerError::ConfigParse(format!("{} at {}", message, self.location(self.pos)))
    }
}
