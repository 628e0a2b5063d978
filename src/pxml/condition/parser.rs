//! Descriptor parser
//!
//! A descriptor is a run of `name=value` tokens separated by whitespace,
//! e.g. `var-1=0 var-4=1`. Whitespace and `=` are both delimiters, so
//! `a = 1` and `a=1` read the same.

use super::types::Condition;
use crate::pxml::error::ConditionError;
use std::iter::Filter;
use std::str::Split;

type Tokens<'a> = Filter<Split<'a, fn(char) -> bool>, fn(&&'a str) -> bool>;

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '='
}

fn is_token(token: &&str) -> bool {
    !token.is_empty()
}

/// Lazy, single-pass iterator of conditions over a descriptor string
///
/// Yields `Err` once for a malformed condition and then stops. To walk a
/// descriptor twice, parse the string again.
pub struct ConditionParser<'a> {
    tokens: Tokens<'a>,
    failed: bool,
}

impl<'a> ConditionParser<'a> {
    pub fn new(descriptor: &'a str) -> Self {
        let tokens = descriptor
            .split(is_delimiter as fn(char) -> bool)
            .filter(is_token as fn(&&'a str) -> bool);
        Self {
            tokens,
            failed: false,
        }
    }
}

impl Iterator for ConditionParser<'_> {
    type Item = Result<Condition, ConditionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let name = self.tokens.next()?;
        let result = match self.tokens.next() {
            None => Err(ConditionError::descriptor(
                name,
                "descriptor ends before a value for this name",
            )),
            Some(token) => token.parse::<i32>().map_err(|_| {
                ConditionError::descriptor(
                    token,
                    format!("expected an integer value for '{}'", name),
                )
            }),
        };

        match result {
            Ok(value) => Some(Ok(Condition::new(name, value))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Parse a whole descriptor, failing on the first malformed condition
pub fn parse(descriptor: &str) -> Result<Vec<Condition>, ConditionError> {
    ConditionParser::new(descriptor).collect()
}
