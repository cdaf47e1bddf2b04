//! Runtime contract for values and matchers
//!
//! The parser leaves expressions unevaluated. An executor renders `write` values and
//! matches `read` input with the functions here, plugging its expression language in
//! through [`ExpressionEngine`]. [`CaptureResolver`] is a minimal engine that resolves
//! `${name}` to a capture and `${42}` to an integer, which is enough for length
//! framing such as `read ([0..2]:len) [0..${len}]`.
//!
//! Matching works on a byte slice holding everything received so far. A matcher
//! either consumes a prefix of it, rejects it, or needs more bytes:
//!
//! - exact text and bytes compare content
//! - length-based matchers frame bytes without inspecting them; prefixed forms read a
//!   big-endian length of 1, 2, 4 or 8 bytes and bind the payload that follows
//! - regex and expression matchers delegate to the pattern and the engine

use crate::script::ast::{
    Expression, ExpressionType, ReadNode, Value, ValueMatcher, WriteNode,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

/// Capture name to captured bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, Vec<u8>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Bind `name`, replacing any earlier value
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.values.insert(name.into(), bytes.into());
    }

    pub fn extend(&mut self, other: Bindings) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.values
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
    }
}

impl<N: Into<String>, B: Into<Vec<u8>>> FromIterator<(N, B)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (N, B)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, bytes) in iter {
            bindings.insert(name, bytes);
        }
        bindings
    }
}

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionValue {
    Bytes(Vec<u8>),
    Integer(i64),
    Text(String),
}

impl ExpressionValue {
    /// Bytes for writing or comparing; integers use the width of a decimal literal
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ExpressionValue::Bytes(bytes) => bytes,
            ExpressionValue::Text(text) => text.into_bytes(),
            ExpressionValue::Integer(value) => match i32::try_from(value) {
                Ok(narrow) => narrow.to_be_bytes().to_vec(),
                Err(_) => value.to_be_bytes().to_vec(),
            },
        }
    }

    /// Integer view; bytes are read as a big-endian unsigned number of at most 8 bytes
    pub fn into_integer(self, expression: &Expression) -> Result<i64, BindingError> {
        match self {
            ExpressionValue::Integer(value) => Ok(value),
            ExpressionValue::Bytes(bytes) => {
                be_unsigned(&bytes).ok_or_else(|| BindingError::NotAnInteger {
                    expression: expression.source().to_string(),
                })
            }
            ExpressionValue::Text(text) => {
                text.trim()
                    .parse()
                    .map_err(|_| BindingError::NotAnInteger {
                        expression: expression.source().to_string(),
                    })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("`{name}` is not bound")]
    Unbound { name: String },
    #[error("cannot evaluate `{expression}`: {message}")]
    Evaluation { expression: String, message: String },
    #[error("`{expression}` does not produce an integer")]
    NotAnInteger { expression: String },
    #[error("`{expression}` produced invalid length {length}")]
    InvalidLength { expression: String, length: i64 },
    #[error("length prefix {length} does not fit in memory")]
    PrefixTooLarge { length: u64 },
}

/// Evaluates `${...}` expressions against the current bindings
pub trait ExpressionEngine {
    fn evaluate(
        &self,
        expression: &Expression,
        bindings: &Bindings,
    ) -> Result<ExpressionValue, BindingError>;
}

/// Resolves a bare capture name or an integer literal, nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureResolver;

impl ExpressionEngine for CaptureResolver {
    fn evaluate(
        &self,
        expression: &Expression,
        bindings: &Bindings,
    ) -> Result<ExpressionValue, BindingError> {
        let body = expression.body();

        if let Ok(value) = body.parse::<i64>() {
            return Ok(ExpressionValue::Integer(value));
        }

        if !is_identifier(body) {
            return Err(BindingError::Evaluation {
                expression: expression.source().to_string(),
                message: "only capture names and integers are supported".to_string(),
            });
        }

        bindings
            .get(body)
            .map(|bytes| ExpressionValue::Bytes(bytes.to_vec()))
            .ok_or_else(|| BindingError::Unbound {
                name: body.to_string(),
            })
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn be_unsigned(bytes: &[u8]) -> Option<i64> {
    if bytes.len() > 8 {
        return None;
    }
    let value = bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    i64::try_from(value).ok()
}

/// Bytes a write value produces
pub fn render_value(
    value: &Value,
    bindings: &Bindings,
    engine: &dyn ExpressionEngine,
) -> Result<Vec<u8>, BindingError> {
    match value {
        Value::LiteralText(text) => Ok(text.as_bytes().to_vec()),
        Value::LiteralBytes(bytes) => Ok(bytes.clone()),
        Value::Expression(expression) => {
            let evaluated = engine.evaluate(expression, bindings)?;
            match expression.expected() {
                ExpressionType::Integer => {
                    let value = evaluated.into_integer(expression)?;
                    Ok(ExpressionValue::Integer(value).into_bytes())
                }
                ExpressionType::Bytes | ExpressionType::Any => Ok(evaluated.into_bytes()),
            }
        }
    }
}

/// Bytes of a whole `write`, values concatenated in order
pub fn render_write(
    write: &WriteNode,
    bindings: &Bindings,
    engine: &dyn ExpressionEngine,
) -> Result<Vec<u8>, BindingError> {
    let mut out = Vec::new();
    for value in &write.values {
        out.extend(render_value(value, bindings, engine)?);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// `consumed` bytes matched; `bindings` holds only the names bound by this match
    Matched { consumed: usize, bindings: Bindings },
    NoMatch,
    /// The input so far agrees with the matcher but is too short to decide
    Incomplete,
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}

fn compare(expected: &[u8], input: &[u8]) -> MatchOutcome {
    if input.len() < expected.len() {
        if expected.starts_with(input) {
            MatchOutcome::Incomplete
        } else {
            MatchOutcome::NoMatch
        }
    } else if input.starts_with(expected) {
        MatchOutcome::Matched {
            consumed: expected.len(),
            bindings: Bindings::new(),
        }
    } else {
        MatchOutcome::NoMatch
    }
}

/// Take `length` bytes starting at `offset`, binding them to `capture`
fn frame(input: &[u8], offset: usize, length: usize, capture: Option<&str>) -> MatchOutcome {
    let Some(end) = offset.checked_add(length) else {
        return MatchOutcome::NoMatch;
    };
    let Some(payload) = input.get(offset..end) else {
        return MatchOutcome::Incomplete;
    };

    let mut bindings = Bindings::new();
    if let Some(name) = capture {
        bindings.insert(name, payload);
    }
    MatchOutcome::Matched {
        consumed: end,
        bindings,
    }
}

/// Match one matcher against the start of `input`
pub fn try_match(
    matcher: &ValueMatcher,
    input: &[u8],
    bindings: &Bindings,
    engine: &dyn ExpressionEngine,
) -> Result<MatchOutcome, BindingError> {
    let capture = matcher.capture();

    let outcome = match matcher {
        ValueMatcher::ExactText { text } => compare(text.as_bytes(), input),
        ValueMatcher::ExactBytes { bytes } => compare(bytes, input),
        ValueMatcher::Expression { expression } => {
            let expected = engine.evaluate(expression, bindings)?.into_bytes();
            compare(&expected, input)
        }
        ValueMatcher::Regex { pattern } => match pattern.match_prefix(input) {
            Some(captures) => {
                let consumed = captures.get(0).map_or(0, |whole| whole.end());
                let mut bound = Bindings::new();
                for name in pattern.group_names() {
                    if let Some(group) = captures.name(name) {
                        bound.insert(name, group.as_bytes());
                    }
                }
                MatchOutcome::Matched {
                    consumed,
                    bindings: bound,
                }
            }
            None => MatchOutcome::NoMatch,
        },
        ValueMatcher::FixedLengthBytes { length, .. } => frame(input, 0, *length as usize, capture),
        ValueMatcher::VariableLengthBytes { length, .. } => {
            let value = engine.evaluate(length, bindings)?.into_integer(length)?;
            let length = usize::try_from(value).map_err(|_| BindingError::InvalidLength {
                expression: length.source().to_string(),
                length: value,
            })?;
            frame(input, 0, length, capture)
        }
        ValueMatcher::ByteLengthBytes { .. }
        | ValueMatcher::ShortLengthBytes { .. }
        | ValueMatcher::IntLengthBytes { .. }
        | ValueMatcher::LongLengthBytes { .. } => {
            let width = matcher.prefix_width().unwrap_or(1);
            let Some(prefix) = input.get(..width) else {
                return Ok(MatchOutcome::Incomplete);
            };
            let length = prefix
                .iter()
                .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
            let length = usize::try_from(length)
                .map_err(|_| BindingError::PrefixTooLarge { length })?;
            frame(input, width, length, capture)
        }
    };

    Ok(outcome)
}

/// Match a whole `read` left to right over one cursor
///
/// Later matchers see the captures of earlier ones, so `([0..2]:len) [0..${len}]`
/// frames its payload with the length it just read.
pub fn match_read(
    read: &ReadNode,
    input: &[u8],
    bindings: &Bindings,
    engine: &dyn ExpressionEngine,
) -> Result<MatchOutcome, BindingError> {
    let mut cursor = 0;
    let mut scope = bindings.clone();
    let mut bound = Bindings::new();

    for (index, matcher) in read.matchers.iter().enumerate() {
        match try_match(matcher, &input[cursor..], &scope, engine)? {
            MatchOutcome::Matched { consumed, bindings } => {
                trace!(index, consumed, "matcher matched");
                cursor += consumed;
                scope.extend(bindings.clone());
                bound.extend(bindings);
            }
            other => {
                trace!(index, outcome = ?other, "read stopped");
                return Ok(other);
            }
        }
    }

    Ok(MatchOutcome::Matched {
        consumed: cursor,
        bindings: bound,
    })
}
