//! Parsing wirescript source into an AST
//!
//! [`ScriptParser`] is the entry point. It runs the logos lexer, then one chumsky
//! production selected by a [`strategy::ParseStrategy`], then (for scripts and streams)
//! assembles lines into streams. The result is either the requested node with its
//! [`RegionInfo`] or a single [`ParseError`].
//!
//! ```text
//! let script = parse_script("connect tcp://localhost:8080\nconnected\nclose\nclosed\n")?;
//! assert_eq!(script.streams.len(), 1);
//! ```

pub(crate) mod assembling;
pub mod error;
pub(crate) mod grammar;
pub mod strategy;

pub use error::{ParseError, ParseErrorKind};
pub use strategy::ParseStrategy;

use crate::script::ast::{RegionInfo, ScriptNode};
use crate::script::config::ParserConfig;
use crate::script::lexing::TokenSpan;
use chumsky::error::Simple;
use chumsky::{Parser, Stream};
use serde::Serialize;
use tracing::debug;

pub(crate) type ParserError = Simple<TokenSpan>;

/// A parsed node and the source region it covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parsed<T> {
    pub node: T,
    pub region: RegionInfo,
}

impl<T> Parsed<T> {
    pub fn into_node(self) -> T {
        self.node
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            node: f(self.node),
            region: self.region,
        }
    }
}

/// Run a production over a token vector, keeping only the first error
pub(crate) fn run<O>(
    source: &str,
    tokens: Vec<TokenSpan>,
    production: impl Parser<TokenSpan, O, Error = ParserError>,
) -> Result<O, ParseError> {
    let end = source.len();
    let stream = Stream::from_iter(
        end..end,
        tokens
            .into_iter()
            .map(|(token, span)| ((token, span.clone()), span)),
    );

    production.parse(stream).map_err(|errors| {
        match errors.into_iter().min_by_key(|error| error.span().start) {
            Some(error) => ParseError::from_syntax(source, error),
            None => ParseError::at(ParseErrorKind::Syntax, source, end, "parse failed"),
        }
    })
}

#[derive(Debug, Clone, Default)]
pub struct ScriptParser {
    config: ParserConfig,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a complete script
    pub fn parse(&self, source: &str) -> Result<Parsed<ScriptNode>, ParseError> {
        self.parse_with_strategy(source, strategy::Script)
    }

    /// Parse `source` as the fragment `strategy` names
    pub fn parse_with_strategy<S: ParseStrategy>(
        &self,
        source: &str,
        strategy: S,
    ) -> Result<Parsed<S::Node>, ParseError> {
        debug!(strategy = strategy.name(), bytes = source.len(), "parsing");

        let result = strategy.parse(source, &self.config);
        match &result {
            Ok(_) => debug!(strategy = strategy.name(), "parsed"),
            Err(error) => debug!(
                strategy = strategy.name(),
                kind = %error.kind,
                offset = error.offset,
                "parse failed"
            ),
        }
        result
    }
}

/// Parse a complete script with the default configuration
pub fn parse_script(source: &str) -> Result<ScriptNode, ParseError> {
    ScriptParser::new().parse(source).map(Parsed::into_node)
}
