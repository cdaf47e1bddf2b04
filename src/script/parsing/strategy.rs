//! Entry points into the grammar
//!
//! A strategy selects the production a parse starts from: the whole script, one stream,
//! one statement, or a single value or matcher. Fragment strategies must consume the
//! entire input (trailing blank lines aside) and return their node with its region.
//!
//! ```ignore
//! let parser = ScriptParser::new();
//! let read = parser.parse_with_strategy("read (short:len) [0..${len}]", strategy::Read)?;
//! assert_eq!(read.node.matchers.len(), 2);
//! ```

use super::assembling::{self, Assembly};
use super::error::{ParseError, ParseErrorKind};
use super::grammar;
use super::{run, Parsed, ParserError};
use crate::script::ast::{
    AcceptNode, AcceptedNode, BarrierKind, BarrierNode, ConnectNode, EventKind, ExpressionType,
    OptionNode, PropertyNode, ReadNode, RegionInfo, ScriptNode, StreamNode, StreamableNode,
    Value as AstValue, ValueMatcher, WriteNode,
};
use crate::script::config::ParserConfig;
use crate::script::lexing::{tokenize, tokenize_lines, LexicalError, TokenSpan};
use chumsky::Parser;
use std::ops::Range;
use tracing::debug;

pub trait ParseStrategy {
    type Node;

    fn name(&self) -> &'static str;

    fn parse(&self, source: &str, config: &ParserConfig) -> Result<Parsed<Self::Node>, ParseError>;
}

fn lexed(
    source: &str,
    tokens: Result<Vec<TokenSpan>, (LexicalError, Range<usize>)>,
) -> Result<Vec<TokenSpan>, ParseError> {
    tokens.map_err(|(error, span)| ParseError::from_lexical(source, error, span))
}

fn parse_fragment<O>(
    source: &str,
    production: impl Parser<TokenSpan, (O, RegionInfo), Error = ParserError> + Clone,
) -> Result<Parsed<O>, ParseError> {
    let tokens = lexed(source, tokenize(source))?;
    let (node, region) = run(source, tokens, grammar::whole(production))?;
    Ok(Parsed { node, region })
}

fn parse_lines(source: &str, rules: &Assembly) -> Result<Parsed<ScriptNode>, ParseError> {
    let tokens = lexed(source, tokenize_lines(source))?;
    let lines = run(source, tokens, grammar::script_lines())?;
    let (node, region) = assembling::assemble(lines, source, rules)?;
    debug!(streams = node.streams.len(), "assembled script");
    Ok(Parsed { node, region })
}

/// Parse lines and require exactly one stream, with no script-level properties
fn parse_single_stream(
    source: &str,
    config: &ParserConfig,
    keyword: &str,
) -> Result<Parsed<StreamNode>, ParseError> {
    let Parsed { node, mut region } = parse_lines(source, &Assembly::fragment(config))?;

    let single = |offset: usize| {
        ParseError::at(
            ParseErrorKind::Syntax,
            source,
            offset,
            format!("expected a single `{keyword}` stream"),
        )
    };

    if node.properties().next().is_some() {
        return Err(single(0));
    }

    let mut streams = node.streams.into_iter();
    let stream_region = region.children.pop();
    match (streams.next(), streams.next(), stream_region) {
        (Some(stream), None, Some(stream_region)) if stream.keyword() == keyword => Ok(Parsed {
            node: stream,
            region: stream_region,
        }),
        (Some(_), Some(_), Some(last)) => Err(single(last.start())),
        _ => Err(single(0)),
    }
}

/// The whole script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Script;

impl ParseStrategy for Script {
    type Node = ScriptNode;

    fn name(&self) -> &'static str {
        "script"
    }

    fn parse(&self, source: &str, config: &ParserConfig) -> Result<Parsed<ScriptNode>, ParseError> {
        parse_lines(source, &Assembly::script(config))
    }
}

macro_rules! stream_strategy {
    ($(#[$meta:meta])* $strategy:ident, $keyword:literal, $node:ty, $variant:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $strategy;

        impl ParseStrategy for $strategy {
            type Node = $node;

            fn name(&self) -> &'static str {
                $keyword
            }

            fn parse(&self, source: &str, config: &ParserConfig) -> Result<Parsed<$node>, ParseError> {
                let parsed = parse_single_stream(source, config, $keyword)?;
                match parsed.node {
                    $variant(node) => Ok(Parsed { node, region: parsed.region }),
                    _ => Err(ParseError::at(
                        ParseErrorKind::Syntax,
                        source,
                        parsed.region.start(),
                        concat!("expected a single `", $keyword, "` stream"),
                    )),
                }
            }
        }
    };
}

stream_strategy!(
    /// `accept LOCATION [as NAME]` and its statements
    Accept, "accept", AcceptNode, StreamNode::Accept
);
stream_strategy!(
    /// `accepted [NAME]` and its statements, without the parent accept stream
    Accepted, "accepted", AcceptedNode, StreamNode::Accepted
);
stream_strategy!(
    /// `connect LOCATION` and its statements
    Connect, "connect", ConnectNode, StreamNode::Connect
);

macro_rules! fragment_strategy {
    ($(#[$meta:meta])* $strategy:ident, $label:literal, $node:ty, $production:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $strategy;

        impl ParseStrategy for $strategy {
            type Node = $node;

            fn name(&self) -> &'static str {
                $label
            }

            fn parse(&self, source: &str, _config: &ParserConfig) -> Result<Parsed<$node>, ParseError> {
                parse_fragment(source, $production)
            }
        }
    };
}

fragment_strategy!(
    /// Any single statement
    Streamable, "streamable", StreamableNode, grammar::streamable()
);

fragment_strategy!(Opened, "opened", EventKind, grammar::event(EventKind::Opened));
fragment_strategy!(Bound, "bound", EventKind, grammar::event(EventKind::Bound));
fragment_strategy!(Connected, "connected", EventKind, grammar::event(EventKind::Connected));
fragment_strategy!(ChildOpened, "child opened", EventKind, grammar::event(EventKind::ChildOpened));
fragment_strategy!(ChildClosed, "child closed", EventKind, grammar::event(EventKind::ChildClosed));
fragment_strategy!(Unbound, "unbound", EventKind, grammar::event(EventKind::Unbound));
fragment_strategy!(Disconnected, "disconnected", EventKind, grammar::event(EventKind::Disconnected));
fragment_strategy!(Closed, "closed", EventKind, grammar::event(EventKind::Closed));

fragment_strategy!(Close, "close", StreamableNode, grammar::close_command());
fragment_strategy!(Read, "read", ReadNode, grammar::read_command());
fragment_strategy!(Write, "write", WriteNode, grammar::write_command());

fragment_strategy!(ReadAwait, "read await", BarrierNode, grammar::barrier(BarrierKind::ReadAwait));
fragment_strategy!(ReadNotify, "read notify", BarrierNode, grammar::barrier(BarrierKind::ReadNotify));
fragment_strategy!(WriteAwait, "write await", BarrierNode, grammar::barrier(BarrierKind::WriteAwait));
fragment_strategy!(WriteNotify, "write notify", BarrierNode, grammar::barrier(BarrierKind::WriteNotify));

fragment_strategy!(ReadOption, "read option", OptionNode, grammar::read_option());
fragment_strategy!(WriteOption, "write option", OptionNode, grammar::write_option());
fragment_strategy!(Property, "property", PropertyNode, grammar::property());

fragment_strategy!(
    /// Any write value; expressions are typed as bytes
    Value, "value", AstValue, grammar::value(ExpressionType::Bytes)
);
fragment_strategy!(LiteralTextValue, "literal text value", AstValue, grammar::literal_text_value());
fragment_strategy!(LiteralBytesValue, "literal bytes value", AstValue, grammar::literal_bytes_value());
fragment_strategy!(
    ExpressionValue,
    "expression value",
    AstValue,
    grammar::expression_value(ExpressionType::Bytes)
);

fragment_strategy!(
    /// Any read matcher
    Matcher, "matcher", ValueMatcher, grammar::matcher()
);
fragment_strategy!(ExactTextMatcher, "exact text matcher", ValueMatcher, grammar::exact_text_matcher());
fragment_strategy!(ExactBytesMatcher, "exact bytes matcher", ValueMatcher, grammar::exact_bytes_matcher());
fragment_strategy!(RegexMatcher, "regex matcher", ValueMatcher, grammar::regex_matcher());
fragment_strategy!(ExpressionMatcher, "expression matcher", ValueMatcher, grammar::expression_matcher());
fragment_strategy!(
    /// `[0..N]`, `[(:name){N}]` and the length-prefixed `(byte:name)` family
    FixedLengthBytesMatcher,
    "fixed length bytes matcher",
    ValueMatcher,
    grammar::fixed_length_matcher()
);
fragment_strategy!(
    VariableLengthBytesMatcher,
    "variable length bytes matcher",
    ValueMatcher,
    grammar::variable_length_matcher()
);
