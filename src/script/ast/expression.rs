//! Embedded `${…}` expressions
//!
//! The front end never interprets expression text. It records the source verbatim,
//! together with the result shape the position expects, and leaves evaluation to an
//! [`ExpressionEngine`](crate::script::binding::ExpressionEngine).
//!
//! Two expressions are equal when their source text is equal. The expected type is a
//! hint for the evaluator and does not take part in equality or hashing.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Result shape an expression is expected to produce at its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpressionType {
    /// Write values, expression matchers and option values
    Bytes,
    /// Lengths of variable-length matchers
    Integer,
    /// Property values and locations
    Any,
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionType::Bytes => write!(f, "bytes"),
            ExpressionType::Integer => write!(f, "integer"),
            ExpressionType::Any => write!(f, "any"),
        }
    }
}

/// An unevaluated expression handle
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    expected: ExpressionType,
}

impl Expression {
    /// Wrap expression source, including its `${` `}` delimiters
    pub fn new(source: impl Into<String>, expected: ExpressionType) -> Self {
        Self {
            source: source.into(),
            expected,
        }
    }

    pub fn bytes(source: impl Into<String>) -> Self {
        Self::new(source, ExpressionType::Bytes)
    }

    pub fn integer(source: impl Into<String>) -> Self {
        Self::new(source, ExpressionType::Integer)
    }

    pub fn any(source: impl Into<String>) -> Self {
        Self::new(source, ExpressionType::Any)
    }

    /// Full source text, e.g. `${len+2}`
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expected(&self) -> ExpressionType {
        self.expected
    }

    /// Text between the delimiters, trimmed
    pub fn body(&self) -> &str {
        self.source
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(&self.source)
            .trim()
    }

    /// Same source, different expected shape
    pub fn expecting(mut self, expected: ExpressionType) -> Self {
        self.expected = expected;
        self
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_expected_type() {
        assert_eq!(Expression::bytes("${len}"), Expression::integer("${len}"));
        assert_ne!(Expression::bytes("${len}"), Expression::bytes("${ len }"));
    }

    #[test]
    fn test_body_strips_delimiters() {
        assert_eq!(Expression::any("${ byteArray }").body(), "byteArray");
        assert_eq!(Expression::any("${len-45}").body(), "len-45");
    }
}
