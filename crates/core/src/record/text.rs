//! PostgreSQL composite text I/O format.
//!
//! A composite value renders as `(f1,f2,...)`. An empty unquoted field is
//! NULL. Fields that are empty or contain `"`, `\`, `,`, `(`, `)` or
//! whitespace are double-quoted, with `"` and `\` doubled inside the quotes.
//! The reader also accepts backslash escapes, as the server does.

use std::iter::Peekable;
use std::str::Chars;

use super::{FieldError, FieldReader, FieldWriter};

/// Renders fields into a composite text literal.
#[derive(Debug, Default)]
pub struct RecordTextWriter {
    fields: Vec<String>,
}

impl RecordTextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the record and returns the literal.
    pub fn finish(self) -> String {
        format!("({})", self.fields.join(","))
    }
}

impl FieldWriter for RecordTextWriter {
    fn write_int(&mut self, value: i32) -> Result<(), FieldError> {
        self.fields.push(value.to_string());
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<(), FieldError> {
        self.fields.push(quote_field(value));
        Ok(())
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, '"' | '\\' | ',' | '(' | ')') || c.is_whitespace())
}

fn quote_field(value: &str) -> String {
    if !needs_quotes(value) {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push(c);
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Reads fields, in order, from a parsed composite text literal.
#[derive(Debug, Clone)]
pub struct RecordTextReader {
    fields: Vec<Option<String>>,
    position: usize,
}

impl RecordTextReader {
    /// Parses a composite literal such as `(201,"Bartelt Junction",Duke,NY,51023)`.
    pub fn parse(text: &str) -> Result<Self, FieldError> {
        let trimmed = text.trim();
        let mut chars = trimmed.chars().peekable();

        if chars.next() != Some('(') {
            return Err(FieldError::Malformed(
                "missing left parenthesis".to_string(),
            ));
        }

        let mut fields = Vec::new();
        loop {
            fields.push(parse_field(&mut chars)?);

            match chars.next() {
                Some(',') => continue,
                Some(')') => break,
                _ => {
                    return Err(FieldError::Malformed(
                        "unexpected end of input".to_string(),
                    ))
                }
            }
        }

        if chars.next().is_some() {
            return Err(FieldError::Malformed(
                "junk after right parenthesis".to_string(),
            ));
        }

        Ok(Self {
            fields,
            position: 0,
        })
    }

    /// Number of fields in the literal.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fails if any field has not been consumed.
    pub fn finish(&self) -> Result<(), FieldError> {
        if self.position < self.fields.len() {
            return Err(FieldError::TrailingFields {
                expected: self.position,
                found: self.fields.len(),
            });
        }
        Ok(())
    }

    fn next_value(&mut self) -> Result<(usize, &str), FieldError> {
        let index = self.position;
        let field = self
            .fields
            .get(index)
            .ok_or(FieldError::Missing { index })?;
        self.position += 1;

        field
            .as_deref()
            .map(|value| (index, value))
            .ok_or(FieldError::UnexpectedNull { index })
    }
}

/// Parses one field, stopping before the `,` or `)` that terminates it.
fn parse_field(chars: &mut Peekable<Chars<'_>>) -> Result<Option<String>, FieldError> {
    if matches!(chars.peek(), Some(',') | Some(')')) {
        return Ok(None);
    }

    let mut value = String::new();
    let mut in_quotes = false;

    loop {
        let c = match chars.peek() {
            Some(&c) => c,
            None => {
                return Err(FieldError::Malformed(
                    "unexpected end of input".to_string(),
                ))
            }
        };

        if !in_quotes && (c == ',' || c == ')') {
            return Ok(Some(value));
        }
        chars.next();

        match c {
            '\\' => match chars.next() {
                Some(escaped) => value.push(escaped),
                None => {
                    return Err(FieldError::Malformed(
                        "unexpected end of input".to_string(),
                    ))
                }
            },
            '"' if !in_quotes => in_quotes = true,
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                value.push('"');
            }
            '"' => in_quotes = false,
            other => value.push(other),
        }
    }
}

impl FieldReader for RecordTextReader {
    fn read_int(&mut self) -> Result<i32, FieldError> {
        let (index, raw) = self.next_value()?;
        raw.trim()
            .parse()
            .map_err(|_| FieldError::InvalidInteger {
                index,
                raw: raw.to_string(),
            })
    }

    fn read_string(&mut self) -> Result<String, FieldError> {
        self.next_value().map(|(_, value)| value.to_string())
    }
}
