//! Grammar productions
//!
//! Every production consumes `(Token, Span)` items and yields its node together with
//! the [`RegionInfo`] of what it consumed. Parents build their region from the regions
//! of their children in encounter order, so the region tree mirrors the node tree:
//!
//! - script: preamble entries, then streams
//! - stream: one child per streamable
//! - read / write: one child per matcher / value
//! - property, option: one child, the value
//! - captured matcher: one child, the capture name
//!
//! Productions are purely structural. Literal validation already happened in the
//! lexer and stream ordering is checked when lines are assembled into streams.

use super::ParserError;
use crate::script::ast::{
    BarrierKind, BarrierNode, CommentNode, EventKind, Expression, ExpressionType, Location,
    OptionNode, PropertyNode, ReadNode, RegionInfo, StreamableNode, Value, ValueMatcher,
    WriteNode,
};
use crate::script::lexing::literals;
use crate::script::lexing::{Token, TokenSpan};
use chumsky::prelude::*;
use std::ops::Range;

/// A node and the region it was parsed from
pub(crate) type Spanned<T> = (T, RegionInfo);

fn unexpected(span: Range<usize>, found: TokenSpan, expected: Option<Token>) -> ParserError {
    Simple::expected_input_found(span, expected.map(|token| Some((token, 0..0))), Some(found))
}

/// Match a keyword, yielding its span
pub(crate) fn keyword(
    word: &'static str,
) -> impl Parser<TokenSpan, Range<usize>, Error = ParserError> + Clone {
    filter_map(move |span: Range<usize>, item: TokenSpan| {
        if item.0.is_word(word) {
            Ok(span)
        } else {
            Err(unexpected(span, item, Some(Token::Word(word.to_string()))))
        }
    })
}

/// Match a punctuation or newline token, yielding its span
pub(crate) fn punct(token: Token) -> impl Parser<TokenSpan, Range<usize>, Error = ParserError> + Clone {
    filter_map(move |span: Range<usize>, item: TokenSpan| {
        if item.0 == token {
            Ok(span)
        } else {
            Err(unexpected(span, item, Some(token.clone())))
        }
    })
}

pub(crate) fn newline() -> impl Parser<TokenSpan, Range<usize>, Error = ParserError> + Clone {
    punct(Token::Newline)
}

/// Take the payload of one kind of token
fn extract<O>(
    payload: fn(&Token) -> Option<O>,
) -> impl Parser<TokenSpan, (O, Range<usize>), Error = ParserError> + Clone {
    filter_map(move |span: Range<usize>, item: TokenSpan| match payload(&item.0) {
        Some(out) => Ok((out, span)),
        None => Err(unexpected(span, item, None)),
    })
}

/// Barrier, option, property and capture names
pub(crate) fn name() -> impl Parser<TokenSpan, (String, Range<usize>), Error = ParserError> + Clone
{
    extract(|token| match token {
        Token::Word(word) => Some(word.clone()),
        _ => None,
    })
    .labelled("name")
}

fn int_literal() -> impl Parser<TokenSpan, (i64, Range<usize>), Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Int(value) => Some(*value),
        _ => None,
    })
    .labelled("integer")
}

fn expression_source(
) -> impl Parser<TokenSpan, (String, Range<usize>), Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Expression(source) => Some(source.clone()),
        _ => None,
    })
    .labelled("expression")
}

pub(crate) fn comment() -> impl Parser<TokenSpan, Spanned<CommentNode>, Error = ParserError> + Clone
{
    extract(|token| match token {
        Token::Comment(text) => Some(text.clone()),
        _ => None,
    })
    .map(|(text, span)| (CommentNode { text }, RegionInfo::leaf(span)))
    .labelled("comment")
}

// Values

pub(crate) fn literal_text_value(
) -> impl Parser<TokenSpan, Spanned<Value>, Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Text(text) => Some(Value::LiteralText(text.clone())),
        _ => None,
    })
    .map(|(value, span)| (value, RegionInfo::leaf(span)))
    .labelled("quoted text")
}

pub(crate) fn literal_bytes_value(
) -> impl Parser<TokenSpan, Spanned<Value>, Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Bytes(bytes) => Some(Value::LiteralBytes(bytes.clone())),
        _ => None,
    })
    .map(|(value, span)| (value, RegionInfo::leaf(span)))
    .labelled("byte array")
}

pub(crate) fn expression_value(
    expected: ExpressionType,
) -> impl Parser<TokenSpan, Spanned<Value>, Error = ParserError> + Clone {
    expression_source().map(move |(source, span)| {
        (
            Value::Expression(Expression::new(source, expected)),
            RegionInfo::leaf(span),
        )
    })
}

pub(crate) fn value(
    expected: ExpressionType,
) -> impl Parser<TokenSpan, Spanned<Value>, Error = ParserError> + Clone {
    literal_text_value()
        .or(literal_bytes_value())
        .or(expression_value(expected))
        .labelled("value")
}

// Matchers

pub(crate) fn exact_text_matcher(
) -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Text(text) => Some(ValueMatcher::ExactText { text: text.clone() }),
        _ => None,
    })
    .map(|(matcher, span)| (matcher, RegionInfo::leaf(span)))
    .labelled("exact text")
}

/// Byte arrays and numeric literals, sized by their literal form
pub(crate) fn exact_bytes_matcher(
) -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Bytes(bytes) | Token::Hex(bytes) => Some(Ok(bytes.clone())),
        Token::Int(value) => Some(literals::int_value(*value).map(literals::int_bytes)),
        Token::Long(value) => Some(Ok(literals::long_bytes(*value))),
        _ => None,
    })
    .try_map(|(bytes, span), _| {
        let bytes = bytes.map_err(|error| Simple::custom(span.clone(), error.to_string()))?;
        Ok((ValueMatcher::ExactBytes { bytes }, RegionInfo::leaf(span)))
    })
    .labelled("exact bytes")
}

pub(crate) fn regex_matcher(
) -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Regex(pattern) => Some(ValueMatcher::Regex {
            pattern: pattern.clone(),
        }),
        _ => None,
    })
    .map(|(matcher, span)| (matcher, RegionInfo::leaf(span)))
    .labelled("regex")
}

pub(crate) fn expression_matcher(
) -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone {
    expression_source().map(|(source, span)| {
        (
            ValueMatcher::Expression {
                expression: Expression::bytes(source),
            },
            RegionInfo::leaf(span),
        )
    })
}

#[derive(Debug, Clone)]
enum LengthSpec {
    Fixed(u32),
    Variable(Expression),
    Prefixed(usize),
}

#[derive(Debug, Clone)]
enum RangeEnd {
    Int(i64),
    Expression(String),
}

fn length_matcher_of(spec: LengthSpec, capture: Option<String>) -> ValueMatcher {
    match spec {
        LengthSpec::Fixed(length) => ValueMatcher::FixedLengthBytes { length, capture },
        LengthSpec::Variable(length) => ValueMatcher::VariableLengthBytes { length, capture },
        LengthSpec::Prefixed(1) => ValueMatcher::ByteLengthBytes { capture },
        LengthSpec::Prefixed(2) => ValueMatcher::ShortLengthBytes { capture },
        LengthSpec::Prefixed(4) => ValueMatcher::IntLengthBytes { capture },
        LengthSpec::Prefixed(_) => ValueMatcher::LongLengthBytes { capture },
    }
}

fn captured_region(span: Range<usize>, name_span: Option<Range<usize>>) -> RegionInfo {
    RegionInfo::sequential(span, name_span.into_iter().map(RegionInfo::leaf).collect())
}

/// `[a..b]` or `[0..${expr}]`
fn length_range() -> impl Parser<TokenSpan, LengthSpec, Error = ParserError> + Clone {
    let end = int_literal()
        .map(|(value, _)| RangeEnd::Int(value))
        .or(expression_source().map(|(source, _)| RangeEnd::Expression(source)));

    punct(Token::LBracket)
        .ignore_then(int_literal())
        .then_ignore(punct(Token::DotDot))
        .then(end)
        .then_ignore(punct(Token::RBracket))
        .try_map(|((start, _), end), span| match end {
            RangeEnd::Int(end) if 0 <= start && start <= end => u32::try_from(end - start)
                .map(LengthSpec::Fixed)
                .map_err(|_| Simple::custom(span, format!("length range [{start}..{end}] is too long"))),
            RangeEnd::Int(end) => Err(Simple::custom(
                span,
                format!("invalid length range [{start}..{end}]"),
            )),
            RangeEnd::Expression(source) if start == 0 => {
                Ok(LengthSpec::Variable(Expression::integer(source)))
            }
            RangeEnd::Expression(source) => Err(Simple::custom(
                span,
                format!("variable length range [{start}..{source}] must start at 0"),
            )),
        })
        .labelled("length range")
}

fn prefix_width() -> impl Parser<TokenSpan, LengthSpec, Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Word(word) => match word.as_str() {
            "byte" => Some(LengthSpec::Prefixed(1)),
            "short" => Some(LengthSpec::Prefixed(2)),
            "int" => Some(LengthSpec::Prefixed(4)),
            "long" => Some(LengthSpec::Prefixed(8)),
            _ => None,
        },
        _ => None,
    })
    .map(|(spec, _)| spec)
    .labelled("length prefix width")
}

/// Every length-framing form
///
/// - `[0..4]`, `[0..4]:name`, `([0..4]:name)`
/// - `[0..${n}]`, `([0..${n}]:name)`
/// - `[(:name){4}]`
/// - `(byte)`, `(short:name)`, ...
pub(crate) fn length_matcher(
) -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone {
    let capture = punct(Token::Colon).ignore_then(name());

    let parenthesized = punct(Token::LParen)
        .ignore_then(length_range())
        .then(capture.clone())
        .then_ignore(punct(Token::RParen))
        .map_with_span(|(spec, (name, name_span)), span| {
            (
                length_matcher_of(spec, Some(name)),
                captured_region(span, Some(name_span)),
            )
        });

    let bare = length_range()
        .then(capture.clone().or_not())
        .map_with_span(|(spec, capture), span| {
            let (name, name_span) = capture.unzip();
            (length_matcher_of(spec, name), captured_region(span, name_span))
        });

    let shorthand = punct(Token::LBracket)
        .ignore_then(punct(Token::LParen))
        .ignore_then(capture.clone())
        .then_ignore(punct(Token::RParen))
        .then_ignore(punct(Token::LBrace))
        .then(int_literal())
        .then_ignore(punct(Token::RBrace))
        .then_ignore(punct(Token::RBracket))
        .try_map(|((name, name_span), (length, _)), span| {
            let length = u32::try_from(length)
                .map_err(|_| Simple::custom(span.clone(), format!("invalid capture length {length}")))?;
            Ok((
                length_matcher_of(LengthSpec::Fixed(length), Some(name)),
                captured_region(span, Some(name_span)),
            ))
        });

    let prefixed = punct(Token::LParen)
        .ignore_then(prefix_width())
        .then(capture.or_not())
        .then_ignore(punct(Token::RParen))
        .map_with_span(|(spec, capture), span| {
            let (name, name_span) = capture.unzip();
            (length_matcher_of(spec, name), captured_region(span, name_span))
        });

    parenthesized
        .or(shorthand)
        .or(bare)
        .or(prefixed)
        .labelled("length matcher")
}

/// Fixed-length and length-prefixed matchers
pub(crate) fn fixed_length_matcher(
) -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone {
    length_matcher().try_map(|(matcher, region), span| match matcher {
        ValueMatcher::VariableLengthBytes { .. } => {
            Err(Simple::custom(span, "expected a fixed length matcher"))
        }
        fixed => Ok((fixed, region)),
    })
}

pub(crate) fn variable_length_matcher(
) -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone {
    length_matcher().try_map(|(matcher, region), span| match matcher {
        variable @ ValueMatcher::VariableLengthBytes { .. } => Ok((variable, region)),
        _ => Err(Simple::custom(span, "expected a variable length matcher")),
    })
}

pub(crate) fn matcher() -> impl Parser<TokenSpan, Spanned<ValueMatcher>, Error = ParserError> + Clone
{
    exact_text_matcher()
        .or(exact_bytes_matcher())
        .or(regex_matcher())
        .or(expression_matcher())
        .or(length_matcher())
        .labelled("matcher")
        .boxed()
}

// Statements

pub(crate) fn event(
    kind: EventKind,
) -> impl Parser<TokenSpan, Spanned<EventKind>, Error = ParserError> + Clone {
    let words = kind.keywords();
    words
        .iter()
        .skip(1)
        .fold(keyword(words[0]).boxed(), |parser, word| {
            parser
                .then(keyword(*word))
                .map(|(first, last)| first.start..last.end)
                .boxed()
        })
        .map(move |span| (kind, RegionInfo::leaf(span)))
}

pub(crate) fn any_event(
) -> impl Parser<TokenSpan, Spanned<EventKind>, Error = ParserError> + Clone {
    EventKind::ALL
        .iter()
        .skip(1)
        .fold(event(EventKind::ALL[0]).boxed(), |parser, kind| {
            parser.or(event(*kind)).boxed()
        })
        .labelled("event")
}

pub(crate) fn read_command(
) -> impl Parser<TokenSpan, Spanned<ReadNode>, Error = ParserError> + Clone {
    keyword("read")
        .ignore_then(matcher().repeated())
        .map_with_span(|matchers, span| {
            let (matchers, regions): (Vec<_>, Vec<_>) = matchers.into_iter().unzip();
            (ReadNode { matchers }, RegionInfo::sequential(span, regions))
        })
}

pub(crate) fn write_command(
) -> impl Parser<TokenSpan, Spanned<WriteNode>, Error = ParserError> + Clone {
    keyword("write")
        .ignore_then(value(ExpressionType::Bytes).repeated())
        .map_with_span(|values, span| {
            let (values, regions): (Vec<_>, Vec<_>) = values.into_iter().unzip();
            (WriteNode { values }, RegionInfo::sequential(span, regions))
        })
}

pub(crate) fn close_command(
) -> impl Parser<TokenSpan, Spanned<StreamableNode>, Error = ParserError> + Clone {
    keyword("close").map(|span| (StreamableNode::Close, RegionInfo::leaf(span)))
}

pub(crate) fn barrier(
    kind: BarrierKind,
) -> impl Parser<TokenSpan, Spanned<BarrierNode>, Error = ParserError> + Clone {
    let (direction, action) = match kind {
        BarrierKind::ReadAwait => ("read", "await"),
        BarrierKind::ReadNotify => ("read", "notify"),
        BarrierKind::WriteAwait => ("write", "await"),
        BarrierKind::WriteNotify => ("write", "notify"),
    };

    keyword(direction)
        .then(keyword(action))
        .ignore_then(name())
        .map_with_span(move |(name, _), span| (BarrierNode { kind, name }, RegionInfo::leaf(span)))
}

fn any_barrier() -> impl Parser<TokenSpan, Spanned<BarrierNode>, Error = ParserError> + Clone {
    barrier(BarrierKind::ReadAwait)
        .or(barrier(BarrierKind::ReadNotify))
        .or(barrier(BarrierKind::WriteAwait))
        .or(barrier(BarrierKind::WriteNotify))
}

fn option(
    direction: &'static str,
) -> impl Parser<TokenSpan, Spanned<OptionNode>, Error = ParserError> + Clone {
    keyword(direction)
        .then(keyword("option"))
        .ignore_then(name())
        .then(value(ExpressionType::Bytes))
        .map_with_span(|((name, _), (value, value_region)), span| {
            (
                OptionNode { name, value },
                RegionInfo::sequential(span, vec![value_region]),
            )
        })
}

pub(crate) fn read_option(
) -> impl Parser<TokenSpan, Spanned<OptionNode>, Error = ParserError> + Clone {
    option("read")
}

pub(crate) fn write_option(
) -> impl Parser<TokenSpan, Spanned<OptionNode>, Error = ParserError> + Clone {
    option("write")
}

pub(crate) fn property() -> impl Parser<TokenSpan, Spanned<PropertyNode>, Error = ParserError> + Clone
{
    keyword("property")
        .ignore_then(name())
        .then(value(ExpressionType::Any))
        .map_with_span(|((name, _), (value, value_region)), span| {
            (
                PropertyNode { name, value },
                RegionInfo::sequential(span, vec![value_region]),
            )
        })
}

pub(crate) fn streamable(
) -> impl Parser<TokenSpan, Spanned<StreamableNode>, Error = ParserError> + Clone {
    choice((
        any_event().map(|(kind, region)| (StreamableNode::Event(kind), region)),
        any_barrier().map(|(node, region)| (StreamableNode::Barrier(node), region)),
        read_option().map(|(node, region)| (StreamableNode::ReadOption(node), region)),
        write_option().map(|(node, region)| (StreamableNode::WriteOption(node), region)),
        read_command().map(|(node, region)| (StreamableNode::Read(node), region)),
        write_command().map(|(node, region)| (StreamableNode::Write(node), region)),
        close_command(),
        property().map(|(node, region)| (StreamableNode::Property(node), region)),
    ))
    .labelled("statement")
    .boxed()
}

// Streams

pub(crate) fn location() -> impl Parser<TokenSpan, Spanned<Location>, Error = ParserError> + Clone {
    extract(|token| match token {
        Token::Uri(url) => Some(Location::Literal(url.clone())),
        Token::Expression(source) => Some(Location::Expression(Expression::any(source.clone()))),
        _ => None,
    })
    .map(|(location, span)| (location, RegionInfo::leaf(span)))
    .labelled("location")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StreamHeader {
    Accept {
        location: Location,
        accept_name: Option<String>,
    },
    Accepted {
        accept_name: Option<String>,
    },
    Connect {
        location: Location,
    },
}

pub(crate) fn stream_header(
) -> impl Parser<TokenSpan, Spanned<StreamHeader>, Error = ParserError> + Clone {
    let accept = keyword("accept")
        .ignore_then(location())
        .then(keyword("as").ignore_then(name()).or_not())
        .map(|((location, _), name)| StreamHeader::Accept {
            location,
            accept_name: name.map(|(name, _)| name),
        });

    let accepted = keyword("accepted")
        .ignore_then(name().or_not())
        .map(|name| StreamHeader::Accepted {
            accept_name: name.map(|(name, _)| name),
        });

    let connect = keyword("connect")
        .ignore_then(location())
        .map(|(location, _)| StreamHeader::Connect { location });

    accept
        .or(accepted)
        .or(connect)
        .map_with_span(|header, span| (header, RegionInfo::leaf(span)))
        .labelled("stream")
}

// Lines

#[derive(Debug, Clone)]
pub(crate) enum LineItem {
    Header(StreamHeader),
    Statement(StreamableNode),
}

/// One source line: an optional header or statement, then an optional comment
#[derive(Debug, Clone)]
pub(crate) struct Line {
    pub item: Option<Spanned<LineItem>>,
    pub comment: Option<Spanned<CommentNode>>,
}

pub(crate) fn line() -> impl Parser<TokenSpan, Line, Error = ParserError> + Clone {
    let item = stream_header()
        .map(|(header, region)| (LineItem::Header(header), region))
        .or(streamable().map(|(node, region)| (LineItem::Statement(node), region)));

    item.or_not()
        .then(comment().or_not())
        .then_ignore(newline())
        .map(|(item, comment)| Line { item, comment })
}

pub(crate) fn script_lines() -> impl Parser<TokenSpan, Vec<Line>, Error = ParserError> + Clone {
    line().repeated().then_ignore(end())
}

/// Wrap a fragment production so it must consume the whole input
pub(crate) fn whole<O>(
    production: impl Parser<TokenSpan, O, Error = ParserError> + Clone,
) -> impl Parser<TokenSpan, O, Error = ParserError> + Clone {
    production
        .then_ignore(newline().repeated())
        .then_ignore(end())
}
