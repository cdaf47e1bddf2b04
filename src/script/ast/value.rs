//! Write payloads

use super::expression::Expression;
use serde::Serialize;

/// A producer of bytes for `write`, option and property values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Value {
    /// Quoted text with escapes already resolved
    LiteralText(String),
    LiteralBytes(Vec<u8>),
    Expression(Expression),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::LiteralText(text.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::LiteralBytes(bytes.into())
    }

    /// An expression producing bytes, the usual shape for write values
    pub fn expression(source: impl Into<String>) -> Self {
        Value::Expression(Expression::bytes(source))
    }

    pub fn is_literal(&self) -> bool {
        !matches!(self, Value::Expression(_))
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Value::Expression(expression) => Some(expression),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::LiteralText(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::LiteralText(text)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::LiteralBytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::LiteralBytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::LiteralBytes(bytes.to_vec())
    }
}

impl From<Expression> for Value {
    fn from(expression: Expression) -> Self {
        Value::Expression(expression)
    }
}
