//! Stream endpoints

use super::expression::Expression;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Where a stream accepts or connects: a URI, or an expression producing one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Location {
    Literal(Url),
    Expression(Expression),
}

impl Location {
    /// Parse a literal location
    pub fn parse(text: &str) -> Result<Self, url::ParseError> {
        Url::parse(text).map(Location::Literal)
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Location::Literal(url) => Some(url),
            Location::Expression(_) => None,
        }
    }
}

impl From<Url> for Location {
    fn from(url: Url) -> Self {
        Location::Literal(url)
    }
}

impl From<Expression> for Location {
    fn from(expression: Expression) -> Self {
        Location::Expression(expression)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Literal(url) => f.write_str(url.as_str()),
            Location::Expression(expression) => write!(f, "{expression}"),
        }
    }
}
