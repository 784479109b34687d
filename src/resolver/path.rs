// Copyright (c) 2025 - Cowboy AI, Inc.
//! Path queries over JSON values
//!
//! Grammar (rooted at `$`):
//!
//! ```text
//! path     := "$" segment*
//! segment  := "." name | ".*" | "[" selector "]"
//! selector := "*" | integer | 'quoted' | "quoted"
//! name     := [A-Za-z0-9_-]+
//! ```
//!
//! Negative indices count from the end of an array. Wildcards fan out over
//! every element of an array or every value of an object.

use serde_json::Value;
use thiserror::Error;

/// Malformed path query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path {path:?} at offset {offset}: {reason}")]
pub struct PathError {
    pub path: String,
    pub offset: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(i64),
    Wildcard,
}

/// A parsed path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    source: String,
    segments: Vec<Segment>,
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError {
            path: self.source.to_string(),
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, expected: char) -> Result<(), PathError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of path"))),
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse(mut self) -> Result<Vec<Segment>, PathError> {
        self.expect('$')?;
        let mut segments = Vec::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            let segment = match c {
                '.' => self.dotted()?,
                '[' => {
                    let segment = self.bracketed()?;
                    self.expect(']')?;
                    segment
                }
                other => {
                    self.pos -= 1;
                    return Err(self.error(format!("unexpected '{other}'")));
                }
            };
            segments.push(segment);
        }
        Ok(segments)
    }

    fn dotted(&mut self) -> Result<Segment, PathError> {
        if self.peek() == Some('*') {
            self.pos += 1;
            return Ok(Segment::Wildcard);
        }
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if name.is_empty() {
            return Err(self.error("expected a field name"));
        }
        Ok(Segment::Field(name))
    }

    fn bracketed(&mut self) -> Result<Segment, PathError> {
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(Segment::Wildcard)
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let name = self.take_while(|c| c != quote);
                self.expect(quote)?;
                Ok(Segment::Field(name))
            }
            Some(c) if c == '-' || c.is_ascii_digit() => {
                let start = self.pos;
                self.pos += 1;
                let digits = self.take_while(|c| c.is_ascii_digit());
                let text: String = self.chars[start..self.pos].iter().collect();
                if c == '-' && digits.is_empty() {
                    return Err(self.error("expected digits after '-'"));
                }
                text.parse()
                    .map(Segment::Index)
                    .map_err(|_| self.error(format!("index out of range: {text}")))
            }
            Some(c) => Err(self.error(format!("unexpected '{c}' in brackets"))),
            None => Err(self.error("unterminated brackets")),
        }
    }
}

impl PathQuery {
    pub fn parse(source: &str) -> Result<Self, PathError> {
        let segments = Parser::new(source).parse()?;
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Every node the query matches
    pub fn select<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                match (segment, node) {
                    (Segment::Field(name), Value::Object(fields)) => {
                        next.extend(fields.get(name));
                    }
                    (Segment::Index(index), Value::Array(items)) => {
                        let resolved = if *index < 0 {
                            items.len() as i64 + index
                        } else {
                            *index
                        };
                        if let Ok(resolved) = usize::try_from(resolved) {
                            next.extend(items.get(resolved));
                        }
                    }
                    (Segment::Wildcard, Value::Array(items)) => next.extend(items.iter()),
                    (Segment::Wildcard, Value::Object(fields)) => next.extend(fields.values()),
                    _ => {}
                }
            }
            current = next;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn document() -> Value {
        json!({
            "metadata": { "name": "db", "labels": { "app.kubernetes.io/name": "postgres" } },
            "spec": { "ports": [ { "port": 5432 }, { "port": 9187 } ] }
        })
    }

    #[test_case("$.metadata.name", json!("db") ; "dotted")]
    #[test_case("$['metadata']['labels']['app.kubernetes.io/name']", json!("postgres") ; "quoted")]
    #[test_case("$.spec.ports[0].port", json!(5432) ; "index")]
    #[test_case("$.spec.ports[-1].port", json!(9187) ; "negative index")]
    fn test_single_match(path: &str, expected: Value) {
        let query = PathQuery::parse(path).unwrap();
        let doc = document();
        assert_eq!(query.select(&doc), vec![&expected]);
    }

    #[test]
    fn test_wildcard_fans_out() {
        let doc = document();
        let query = PathQuery::parse("$.spec.ports[*].port").unwrap();
        assert_eq!(query.select(&doc), vec![&json!(5432), &json!(9187)]);

        let query = PathQuery::parse("$.metadata.*").unwrap();
        assert_eq!(query.select(&doc).len(), 2);
    }

    #[test]
    fn test_root_selects_document() {
        let doc = document();
        assert_eq!(PathQuery::parse("$").unwrap().select(&doc), vec![&doc]);
    }

    #[test]
    fn test_out_of_range_and_type_mismatch_match_nothing() {
        let doc = document();
        assert!(PathQuery::parse("$.spec.ports[7]").unwrap().select(&doc).is_empty());
        assert!(PathQuery::parse("$.metadata[0]").unwrap().select(&doc).is_empty());
    }

    #[test_case("metadata.name" ; "missing root")]
    #[test_case("$.metadata." ; "empty field")]
    #[test_case("$[1" ; "unterminated")]
    #[test_case("$['name]" ; "unterminated quote")]
    #[test_case("$.a b" ; "stray character")]
    fn test_syntax_errors(path: &str) {
        assert!(PathQuery::parse(path).is_err());
    }
}
