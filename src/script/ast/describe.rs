//! Rendering nodes back to surface syntax
//!
//! The output of [`Describe`] re-parses to a structurally equal tree. Formatting is
//! normalized: one statement per line, comments on their own line, text re-escaped,
//! bytes as uppercase `0xHH` groups.

use super::expression::Expression;
use super::location::Location;
use super::matcher::ValueMatcher;
use super::script::{PreambleNode, ScriptNode};
use super::stream::StreamNode;
use super::streamable::{BarrierNode, CommentNode, StreamableNode};
use super::value::Value;
use std::fmt::{self, Write};

pub trait Describe {
    /// Append the surface syntax of this node to `out`
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result;

    fn describe_to_string(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.describe(&mut out);
        out
    }
}

/// Quote text, escaping what the lexer would otherwise interpret
pub fn quote_text<W: Write + ?Sized>(text: &str, out: &mut W) -> fmt::Result {
    out.write_char('"')?;
    for ch in text.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            other => out.write_char(other)?,
        }
    }
    out.write_char('"')
}

pub fn byte_array<W: Write + ?Sized>(bytes: &[u8], out: &mut W) -> fmt::Result {
    out.write_char('[')?;
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write!(out, "0x{byte:02X}")?;
    }
    out.write_char(']')
}

fn regex_literal<W: Write + ?Sized>(pattern: &str, out: &mut W) -> fmt::Result {
    out.write_char('/')?;
    out.write_str(&pattern.replace('/', "\\/"))?;
    out.write_char('/')
}

fn captured<W: Write + ?Sized>(
    out: &mut W,
    capture: Option<&str>,
    body: impl FnOnce(&mut W) -> fmt::Result,
) -> fmt::Result {
    match capture {
        Some(name) => {
            out.write_char('(')?;
            body(out)?;
            write!(out, ":{name})")
        }
        None => body(out),
    }
}

fn prefixed<W: Write + ?Sized>(width: &str, capture: Option<&str>, out: &mut W) -> fmt::Result {
    match capture {
        Some(name) => write!(out, "({width}:{name})"),
        None => write!(out, "({width})"),
    }
}

impl Describe for Expression {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        out.write_str(self.source())
    }
}

impl Describe for Location {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self {
            Location::Literal(url) => out.write_str(url.as_str()),
            Location::Expression(expression) => expression.describe(out),
        }
    }
}

impl Describe for Value {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self {
            Value::LiteralText(text) => quote_text(text, out),
            Value::LiteralBytes(bytes) => byte_array(bytes, out),
            Value::Expression(expression) => expression.describe(out),
        }
    }
}

impl Describe for ValueMatcher {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self {
            ValueMatcher::ExactText { text } => quote_text(text, out),
            ValueMatcher::ExactBytes { bytes } => byte_array(bytes, out),
            ValueMatcher::Regex { pattern } => regex_literal(pattern.source(), out),
            ValueMatcher::Expression { expression } => expression.describe(out),
            ValueMatcher::FixedLengthBytes { length, capture } => {
                captured(out, capture.as_deref(), |out| write!(out, "[0..{length}]"))
            }
            ValueMatcher::VariableLengthBytes { length, capture } => {
                captured(out, capture.as_deref(), |out| write!(out, "[0..{length}]"))
            }
            ValueMatcher::ByteLengthBytes { capture } => prefixed("byte", capture.as_deref(), out),
            ValueMatcher::ShortLengthBytes { capture } => {
                prefixed("short", capture.as_deref(), out)
            }
            ValueMatcher::IntLengthBytes { capture } => prefixed("int", capture.as_deref(), out),
            ValueMatcher::LongLengthBytes { capture } => prefixed("long", capture.as_deref(), out),
        }
    }
}

impl Describe for CommentNode {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        write!(out, "#{}", self.text)
    }
}

impl Describe for BarrierNode {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{} {}", self.kind, self.name)
    }
}

impl Describe for StreamableNode {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self {
            StreamableNode::Event(kind) => write!(out, "{kind}"),
            StreamableNode::Read(node) => {
                out.write_str("read")?;
                for matcher in &node.matchers {
                    out.write_char(' ')?;
                    matcher.describe(out)?;
                }
                Ok(())
            }
            StreamableNode::Write(node) => {
                out.write_str("write")?;
                for value in &node.values {
                    out.write_char(' ')?;
                    value.describe(out)?;
                }
                Ok(())
            }
            StreamableNode::Close => out.write_str("close"),
            StreamableNode::Barrier(node) => node.describe(out),
            StreamableNode::Property(node) => {
                write!(out, "property {} ", node.name)?;
                node.value.describe(out)
            }
            StreamableNode::ReadOption(node) => {
                write!(out, "read option {} ", node.name)?;
                node.value.describe(out)
            }
            StreamableNode::WriteOption(node) => {
                write!(out, "write option {} ", node.name)?;
                node.value.describe(out)
            }
            StreamableNode::Comment(node) => node.describe(out),
        }
    }
}

impl Describe for StreamNode {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self {
            StreamNode::Accept(node) => {
                out.write_str("accept ")?;
                node.location.describe(out)?;
                if let Some(name) = &node.accept_name {
                    write!(out, " as {name}")?;
                }
            }
            StreamNode::Accepted(node) => {
                out.write_str("accepted")?;
                if let Some(name) = &node.accept_name {
                    write!(out, " {name}")?;
                }
            }
            StreamNode::Connect(node) => {
                out.write_str("connect ")?;
                node.location.describe(out)?;
            }
        }
        out.write_char('\n')?;

        for streamable in self.streamables() {
            streamable.describe(out)?;
            out.write_char('\n')?;
        }
        Ok(())
    }
}

impl Describe for PreambleNode {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self {
            PreambleNode::Property(node) => {
                write!(out, "property {} ", node.name)?;
                node.value.describe(out)
            }
            PreambleNode::Comment(node) => node.describe(out),
        }
    }
}

impl Describe for ScriptNode {
    fn describe<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        for node in &self.preamble {
            node.describe(out)?;
            out.write_char('\n')?;
        }
        for stream in &self.streams {
            stream.describe(out)?;
        }
        Ok(())
    }
}

macro_rules! display_via_describe {
    ($($node:ty),* $(,)?) => {
        $(
            impl fmt::Display for $node {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.describe(f)
                }
            }
        )*
    };
}

display_via_describe!(ScriptNode, StreamNode, StreamableNode, PreambleNode, Value, ValueMatcher);
