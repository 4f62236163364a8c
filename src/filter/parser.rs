//! Recursive-descent parser for SCIM filter expressions.
//!
//! Grammar (ASCII case-insensitive keywords):
//!
//! ```text
//! filter     = or-expr
//! or-expr    = and-expr *("or" and-expr)
//! and-expr   = unary *("and" unary)
//! unary      = "not" "(" or-expr ")" / "(" or-expr ")" / attr-expr
//! attr-expr  = attrPath "[" or-expr "]"
//!            / attrPath "pr"
//!            / attrPath compareOp compValue
//! compValue  = JSON string / number / "true" / "false" / "null"
//! ```
//!
//! Value filters inside a path are parsed with the same rules and end at
//! the matching `]`; they may not nest further value filters.

use super::{ComparisonOperator, Filter};
use crate::error::{ScimError, ScimResult};
use crate::path::Path;
use log::trace;
use serde_json::Value;

pub(crate) struct FilterParser<'a> {
    input: &'a str,
    pos: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '$')
}

impl<'a> FilterParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse a complete filter expression.
    pub(crate) fn parse(input: &'a str) -> ScimResult<Filter> {
        let mut parser = Self::new(input);
        let filter = parser.parse_or(false)?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(parser.unexpected(c));
        }
        trace!("Parsed filter '{input}' as {filter:?}");
        Ok(filter)
    }

    /// Parse a value filter that starts right after a `[`. Returns the
    /// filter and the number of bytes consumed, closing `]` included.
    pub(crate) fn parse_value_filter(input: &'a str) -> ScimResult<(Filter, usize)> {
        let mut parser = Self::new(input);
        let filter = parser.parse_or(true)?;
        parser.skip_whitespace();
        parser.expect(']')?;
        Ok((filter, parser.pos))
    }

    fn parse_or(&mut self, in_value_filter: bool) -> ScimResult<Filter> {
        let mut terms = vec![self.parse_and(in_value_filter)?];
        while self.eat_keyword("or") {
            terms.push(self.parse_and(in_value_filter)?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Filter::Or(terms)
        })
    }

    fn parse_and(&mut self, in_value_filter: bool) -> ScimResult<Filter> {
        let mut terms = vec![self.parse_unary(in_value_filter)?];
        while self.eat_keyword("and") {
            terms.push(self.parse_unary(in_value_filter)?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Filter::And(terms)
        })
    }

    fn parse_unary(&mut self, in_value_filter: bool) -> ScimResult<Filter> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.unexpected_end()),
            Some('(') => {
                self.pos += 1;
                let filter = self.parse_or(in_value_filter)?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(filter)
            }
            Some(c) => {
                let word = self.read_word();
                if word.is_empty() {
                    return Err(self.unexpected(c));
                }
                if word.eq_ignore_ascii_case("not") {
                    self.skip_whitespace();
                    if self.peek() != Some('(') {
                        return Err(ScimError::invalid_filter(format!(
                            "Expected '(' after 'not' at position {} of '{}'",
                            self.pos, self.input
                        )));
                    }
                    self.pos += 1;
                    let filter = self.parse_or(in_value_filter)?;
                    self.skip_whitespace();
                    self.expect(')')?;
                    return Ok(Filter::not(filter));
                }
                self.parse_attribute_expression(word, in_value_filter)
            }
        }
    }

    fn parse_attribute_expression(
        &mut self,
        word: &'a str,
        in_value_filter: bool,
    ) -> ScimResult<Filter> {
        let path = Path::parse(word).map_err(|e| {
            ScimError::invalid_filter(format!("Invalid attribute path '{word}': {e}"))
        })?;
        if path.is_empty() {
            return Err(ScimError::invalid_filter(format!(
                "Expected an attribute path but found '{word}'"
            )));
        }

        if self.peek() == Some('[') {
            if in_value_filter {
                return Err(ScimError::invalid_filter(format!(
                    "Nested value filters are not allowed at position {} of '{}'",
                    self.pos, self.input
                )));
            }
            self.pos += 1;
            let filter = self.parse_or(true)?;
            self.skip_whitespace();
            self.expect(']')?;
            return Ok(Filter::complex(path, filter));
        }

        self.skip_whitespace();
        let keyword = self.read_word();
        if keyword.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.unexpected_end(),
            });
        }
        if keyword.eq_ignore_ascii_case("pr") {
            return Ok(Filter::present(path));
        }
        let operator = ComparisonOperator::from_keyword(keyword).ok_or_else(|| {
            ScimError::invalid_filter(format!(
                "Unrecognized filter operator '{keyword}' in '{}'",
                self.input
            ))
        })?;
        let value = self.read_value()?;
        Ok(Filter::comparison(operator, path, value))
    }

    fn read_value(&mut self) -> ScimResult<Value> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            None => Err(self.unexpected_end()),
            Some('"') => {
                let bytes = self.input.as_bytes();
                let mut end = start + 1;
                let mut escaped = false;
                loop {
                    match bytes.get(end) {
                        None => {
                            return Err(ScimError::invalid_filter(format!(
                                "Unterminated string literal at position {start} of '{}'",
                                self.input
                            )));
                        }
                        Some(b'\\') if !escaped => escaped = true,
                        Some(b'"') if !escaped => break,
                        Some(_) => escaped = false,
                    }
                    end += 1;
                }
                self.pos = end + 1;
                self.decode_literal(&self.input[start..self.pos])
            }
            Some(_) => {
                let rest = &self.input[start..];
                let len = rest
                    .find(|c: char| c.is_whitespace() || matches!(c, ')' | ']'))
                    .unwrap_or(rest.len());
                self.pos += len;
                let literal = &self.input[start..self.pos];
                match self.decode_literal(literal)? {
                    value @ (Value::Bool(_) | Value::Null | Value::Number(_)) => Ok(value),
                    _ => Err(self.invalid_literal(literal)),
                }
            }
        }
    }

    fn decode_literal(&self, literal: &str) -> ScimResult<Value> {
        serde_json::from_str(literal).map_err(|_| self.invalid_literal(literal))
    }

    fn invalid_literal(&self, literal: &str) -> ScimError {
        ScimError::invalid_filter(format!(
            "Invalid comparison value '{literal}' in '{}'",
            self.input
        ))
    }

    /// Consume `keyword` if the next word matches it, ignoring case.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let saved = self.pos;
        self.skip_whitespace();
        let word = self.read_word();
        if word.eq_ignore_ascii_case(keyword) {
            true
        } else {
            self.pos = saved;
            false
        }
    }

    fn read_word(&mut self) -> &'a str {
        let input: &'a str = self.input;
        let rest = &input[self.pos..];
        let len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn expect(&mut self, expected: char) -> ScimResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(_) | None => Err(ScimError::invalid_filter(format!(
                "Expected '{expected}' at position {} of '{}'",
                self.pos, self.input
            ))),
        }
    }

    fn unexpected(&self, c: char) -> ScimError {
        ScimError::invalid_filter(format!(
            "Unexpected character '{c}' at position {} of '{}'",
            self.pos, self.input
        ))
    }

    fn unexpected_end(&self) -> ScimError {
        ScimError::invalid_filter(format!("Unexpected end of filter '{}'", self.input))
    }
}
