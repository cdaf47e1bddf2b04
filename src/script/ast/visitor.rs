//! Double-dispatch visitation
//!
//! [`AstNode::accept`] calls the [`Visitor`] method named for the node's concrete variant.
//! Every method defaults to [`Visitor::visit_default`], which rejects the node, so a
//! visitor only implements the variants it understands and gets an error for the rest.
//!
//! Visitors choose their own result type and an extra parameter threaded through each
//! call. Descending into children is up to the visitor: `visit_script` decides whether
//! and how to accept each stream.
//!
//! # Example
//!
//! ```ignore
//! struct CountReads;
//!
//! impl Visitor<()> for CountReads {
//!     type Output = usize;
//!     type Error = VisitError;
//!
//!     fn visit_read(&mut self, node: &ReadNode, _: ()) -> Result<usize, VisitError> {
//!         Ok(node.matchers.len())
//!     }
//! }
//! ```

use super::expression::Expression;
use super::matcher::{NamedGroupPattern, ValueMatcher};
use super::script::{PreambleNode, ScriptNode};
use super::stream::{AcceptNode, AcceptedNode, ConnectNode, StreamNode};
use super::streamable::{
    BarrierKind, BarrierNode, CommentNode, EventKind, OptionNode, PropertyNode, ReadNode,
    StreamableNode, WriteNode,
};
use super::value::Value;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Concrete variant of any node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Script,
    Accept,
    Accepted,
    Connect,
    Opened,
    Bound,
    Connected,
    ChildOpened,
    ChildClosed,
    Unbound,
    Disconnected,
    Closed,
    Read,
    Write,
    Close,
    ReadAwait,
    ReadNotify,
    WriteAwait,
    WriteNotify,
    Property,
    ReadOption,
    WriteOption,
    Comment,
    LiteralText,
    LiteralBytes,
    ExpressionValue,
    ExactText,
    ExactBytes,
    Regex,
    ExpressionMatcher,
    FixedLengthBytes,
    VariableLengthBytes,
    ByteLengthBytes,
    ShortLengthBytes,
    IntLengthBytes,
    LongLengthBytes,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Script => "script",
            NodeKind::Accept => "accept",
            NodeKind::Accepted => "accepted",
            NodeKind::Connect => "connect",
            NodeKind::Opened => "opened",
            NodeKind::Bound => "bound",
            NodeKind::Connected => "connected",
            NodeKind::ChildOpened => "child-opened",
            NodeKind::ChildClosed => "child-closed",
            NodeKind::Unbound => "unbound",
            NodeKind::Disconnected => "disconnected",
            NodeKind::Closed => "closed",
            NodeKind::Read => "read",
            NodeKind::Write => "write",
            NodeKind::Close => "close",
            NodeKind::ReadAwait => "read-await",
            NodeKind::ReadNotify => "read-notify",
            NodeKind::WriteAwait => "write-await",
            NodeKind::WriteNotify => "write-notify",
            NodeKind::Property => "property",
            NodeKind::ReadOption => "read-option",
            NodeKind::WriteOption => "write-option",
            NodeKind::Comment => "comment",
            NodeKind::LiteralText => "literal-text",
            NodeKind::LiteralBytes => "literal-bytes",
            NodeKind::ExpressionValue => "expression-value",
            NodeKind::ExactText => "exact-text",
            NodeKind::ExactBytes => "exact-bytes",
            NodeKind::Regex => "regex",
            NodeKind::ExpressionMatcher => "expression-matcher",
            NodeKind::FixedLengthBytes => "fixed-length-bytes",
            NodeKind::VariableLengthBytes => "variable-length-bytes",
            NodeKind::ByteLengthBytes => "byte-length-bytes",
            NodeKind::ShortLengthBytes => "short-length-bytes",
            NodeKind::IntLengthBytes => "int-length-bytes",
            NodeKind::LongLengthBytes => "long-length-bytes",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<EventKind> for NodeKind {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Opened => NodeKind::Opened,
            EventKind::Bound => NodeKind::Bound,
            EventKind::Connected => NodeKind::Connected,
            EventKind::ChildOpened => NodeKind::ChildOpened,
            EventKind::ChildClosed => NodeKind::ChildClosed,
            EventKind::Unbound => NodeKind::Unbound,
            EventKind::Disconnected => NodeKind::Disconnected,
            EventKind::Closed => NodeKind::Closed,
        }
    }
}

impl From<BarrierKind> for NodeKind {
    fn from(kind: BarrierKind) -> Self {
        match kind {
            BarrierKind::ReadAwait => NodeKind::ReadAwait,
            BarrierKind::ReadNotify => NodeKind::ReadNotify,
            BarrierKind::WriteAwait => NodeKind::WriteAwait,
            BarrierKind::WriteNotify => NodeKind::WriteNotify,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitError {
    #[error("visitor does not handle {kind} nodes")]
    Rejected { kind: NodeKind },
}

type VisitResult<V, P> = Result<<V as Visitor<P>>::Output, <V as Visitor<P>>::Error>;

/// One operation per concrete node variant
pub trait Visitor<P> {
    type Output;
    type Error: From<VisitError>;

    /// Fallback for every variant the visitor does not override
    fn visit_default(&mut self, kind: NodeKind, _param: P) -> VisitResult<Self, P> {
        Err(VisitError::Rejected { kind }.into())
    }

    fn visit_script(&mut self, _node: &ScriptNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Script, param)
    }

    // Streams
    fn visit_accept(&mut self, _node: &AcceptNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Accept, param)
    }

    fn visit_accepted(&mut self, _node: &AcceptedNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Accepted, param)
    }

    fn visit_connect(&mut self, _node: &ConnectNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Connect, param)
    }

    // Events
    fn visit_opened(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Opened, param)
    }

    fn visit_bound(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Bound, param)
    }

    fn visit_connected(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Connected, param)
    }

    fn visit_child_opened(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ChildOpened, param)
    }

    fn visit_child_closed(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ChildClosed, param)
    }

    fn visit_unbound(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Unbound, param)
    }

    fn visit_disconnected(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Disconnected, param)
    }

    fn visit_closed(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Closed, param)
    }

    // Commands
    fn visit_read(&mut self, _node: &ReadNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Read, param)
    }

    fn visit_write(&mut self, _node: &WriteNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Write, param)
    }

    fn visit_close(&mut self, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Close, param)
    }

    // Barriers
    fn visit_read_await(&mut self, _node: &BarrierNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ReadAwait, param)
    }

    fn visit_read_notify(&mut self, _node: &BarrierNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ReadNotify, param)
    }

    fn visit_write_await(&mut self, _node: &BarrierNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::WriteAwait, param)
    }

    fn visit_write_notify(&mut self, _node: &BarrierNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::WriteNotify, param)
    }

    fn visit_property(&mut self, _node: &PropertyNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Property, param)
    }

    fn visit_read_option(&mut self, _node: &OptionNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ReadOption, param)
    }

    fn visit_write_option(&mut self, _node: &OptionNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::WriteOption, param)
    }

    fn visit_comment(&mut self, _node: &CommentNode, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Comment, param)
    }

    // Values
    fn visit_literal_text(&mut self, _text: &str, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::LiteralText, param)
    }

    fn visit_literal_bytes(&mut self, _bytes: &[u8], param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::LiteralBytes, param)
    }

    fn visit_expression_value(&mut self, _expr: &Expression, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ExpressionValue, param)
    }

    // Matchers
    fn visit_exact_text(&mut self, _text: &str, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ExactText, param)
    }

    fn visit_exact_bytes(&mut self, _bytes: &[u8], param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ExactBytes, param)
    }

    fn visit_regex(&mut self, _pattern: &NamedGroupPattern, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::Regex, param)
    }

    fn visit_expression_matcher(
        &mut self,
        _expr: &Expression,
        param: P,
    ) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ExpressionMatcher, param)
    }

    fn visit_fixed_length_bytes(
        &mut self,
        _length: u32,
        _capture: Option<&str>,
        param: P,
    ) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::FixedLengthBytes, param)
    }

    fn visit_variable_length_bytes(
        &mut self,
        _length: &Expression,
        _capture: Option<&str>,
        param: P,
    ) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::VariableLengthBytes, param)
    }

    fn visit_byte_length_bytes(&mut self, _capture: Option<&str>, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ByteLengthBytes, param)
    }

    fn visit_short_length_bytes(
        &mut self,
        _capture: Option<&str>,
        param: P,
    ) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::ShortLengthBytes, param)
    }

    fn visit_int_length_bytes(&mut self, _capture: Option<&str>, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::IntLengthBytes, param)
    }

    fn visit_long_length_bytes(&mut self, _capture: Option<&str>, param: P) -> VisitResult<Self, P> {
        self.visit_default(NodeKind::LongLengthBytes, param)
    }
}

/// Common interface for all AST nodes
pub trait AstNode {
    fn node_kind(&self) -> NodeKind;

    /// Dispatch to the visitor method for this node's concrete variant
    fn accept<P, V>(&self, visitor: &mut V, param: P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized;
}

impl AstNode for ScriptNode {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Script
    }

    fn accept<P, V>(&self, visitor: &mut V, param: P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        visitor.visit_script(self, param)
    }
}

impl AstNode for StreamNode {
    fn node_kind(&self) -> NodeKind {
        match self {
            StreamNode::Accept(_) => NodeKind::Accept,
            StreamNode::Accepted(_) => NodeKind::Accepted,
            StreamNode::Connect(_) => NodeKind::Connect,
        }
    }

    fn accept<P, V>(&self, visitor: &mut V, param: P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        match self {
            StreamNode::Accept(node) => visitor.visit_accept(node, param),
            StreamNode::Accepted(node) => visitor.visit_accepted(node, param),
            StreamNode::Connect(node) => visitor.visit_connect(node, param),
        }
    }
}

impl AstNode for PreambleNode {
    fn node_kind(&self) -> NodeKind {
        match self {
            PreambleNode::Property(_) => NodeKind::Property,
            PreambleNode::Comment(_) => NodeKind::Comment,
        }
    }

    fn accept<P, V>(&self, visitor: &mut V, param: P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        match self {
            PreambleNode::Property(node) => visitor.visit_property(node, param),
            PreambleNode::Comment(node) => visitor.visit_comment(node, param),
        }
    }
}

impl AstNode for StreamableNode {
    fn node_kind(&self) -> NodeKind {
        match self {
            StreamableNode::Event(kind) => (*kind).into(),
            StreamableNode::Read(_) => NodeKind::Read,
            StreamableNode::Write(_) => NodeKind::Write,
            StreamableNode::Close => NodeKind::Close,
            StreamableNode::Barrier(node) => node.kind.into(),
            StreamableNode::Property(_) => NodeKind::Property,
            StreamableNode::ReadOption(_) => NodeKind::ReadOption,
            StreamableNode::WriteOption(_) => NodeKind::WriteOption,
            StreamableNode::Comment(_) => NodeKind::Comment,
        }
    }

    fn accept<P, V>(&self, visitor: &mut V, param: P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        match self {
            StreamableNode::Event(kind) => match kind {
                EventKind::Opened => visitor.visit_opened(param),
                EventKind::Bound => visitor.visit_bound(param),
                EventKind::Connected => visitor.visit_connected(param),
                EventKind::ChildOpened => visitor.visit_child_opened(param),
                EventKind::ChildClosed => visitor.visit_child_closed(param),
                EventKind::Unbound => visitor.visit_unbound(param),
                EventKind::Disconnected => visitor.visit_disconnected(param),
                EventKind::Closed => visitor.visit_closed(param),
            },
            StreamableNode::Read(node) => visitor.visit_read(node, param),
            StreamableNode::Write(node) => visitor.visit_write(node, param),
            StreamableNode::Close => visitor.visit_close(param),
            StreamableNode::Barrier(node) => match node.kind {
                BarrierKind::ReadAwait => visitor.visit_read_await(node, param),
                BarrierKind::ReadNotify => visitor.visit_read_notify(node, param),
                BarrierKind::WriteAwait => visitor.visit_write_await(node, param),
                BarrierKind::WriteNotify => visitor.visit_write_notify(node, param),
            },
            StreamableNode::Property(node) => visitor.visit_property(node, param),
            StreamableNode::ReadOption(node) => visitor.visit_read_option(node, param),
            StreamableNode::WriteOption(node) => visitor.visit_write_option(node, param),
            StreamableNode::Comment(node) => visitor.visit_comment(node, param),
        }
    }
}

impl AstNode for Value {
    fn node_kind(&self) -> NodeKind {
        match self {
            Value::LiteralText(_) => NodeKind::LiteralText,
            Value::LiteralBytes(_) => NodeKind::LiteralBytes,
            Value::Expression(_) => NodeKind::ExpressionValue,
        }
    }

    fn accept<P, V>(&self, visitor: &mut V, param: P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        match self {
            Value::LiteralText(text) => visitor.visit_literal_text(text, param),
            Value::LiteralBytes(bytes) => visitor.visit_literal_bytes(bytes, param),
            Value::Expression(expr) => visitor.visit_expression_value(expr, param),
        }
    }
}

impl AstNode for ValueMatcher {
    fn node_kind(&self) -> NodeKind {
        match self {
            ValueMatcher::ExactText { .. } => NodeKind::ExactText,
            ValueMatcher::ExactBytes { .. } => NodeKind::ExactBytes,
            ValueMatcher::Regex { .. } => NodeKind::Regex,
            ValueMatcher::Expression { .. } => NodeKind::ExpressionMatcher,
            ValueMatcher::FixedLengthBytes { .. } => NodeKind::FixedLengthBytes,
            ValueMatcher::VariableLengthBytes { .. } => NodeKind::VariableLengthBytes,
            ValueMatcher::ByteLengthBytes { .. } => NodeKind::ByteLengthBytes,
            ValueMatcher::ShortLengthBytes { .. } => NodeKind::ShortLengthBytes,
            ValueMatcher::IntLengthBytes { .. } => NodeKind::IntLengthBytes,
            ValueMatcher::LongLengthBytes { .. } => NodeKind::LongLengthBytes,
        }
    }

    fn accept<P, V>(&self, visitor: &mut V, param: P) -> Result<V::Output, V::Error>
    where
        V: Visitor<P> + ?Sized,
    {
        match self {
            ValueMatcher::ExactText { text } => visitor.visit_exact_text(text, param),
            ValueMatcher::ExactBytes { bytes } => visitor.visit_exact_bytes(bytes, param),
            ValueMatcher::Regex { pattern } => visitor.visit_regex(pattern, param),
            ValueMatcher::Expression { expression } => {
                visitor.visit_expression_matcher(expression, param)
            }
            ValueMatcher::FixedLengthBytes { length, capture } => {
                visitor.visit_fixed_length_bytes(*length, capture.as_deref(), param)
            }
            ValueMatcher::VariableLengthBytes { length, capture } => {
                visitor.visit_variable_length_bytes(length, capture.as_deref(), param)
            }
            ValueMatcher::ByteLengthBytes { capture } => {
                visitor.visit_byte_length_bytes(capture.as_deref(), param)
            }
            ValueMatcher::ShortLengthBytes { capture } => {
                visitor.visit_short_length_bytes(capture.as_deref(), param)
            }
            ValueMatcher::IntLengthBytes { capture } => {
                visitor.visit_int_length_bytes(capture.as_deref(), param)
            }
            ValueMatcher::LongLengthBytes { capture } => {
                visitor.visit_long_length_bytes(capture.as_deref(), param)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadWidth;

    impl Visitor<usize> for ReadWidth {
        type Output = usize;
        type Error = VisitError;

        fn visit_read(&mut self, node: &ReadNode, scale: usize) -> Result<usize, VisitError> {
            Ok(node.matchers.len() * scale)
        }
    }

    #[test]
    fn test_dispatches_to_concrete_variant() {
        let read = StreamableNode::Read(ReadNode {
            matchers: vec![ValueMatcher::fixed_length(2), ValueMatcher::fixed_length(3)],
        });
        assert_eq!(read.accept(&mut ReadWidth, 10), Ok(20));
    }

    #[test]
    fn test_unhandled_variant_is_rejected() {
        let closed = StreamableNode::Event(EventKind::Closed);
        assert_eq!(
            closed.accept(&mut ReadWidth, 1),
            Err(VisitError::Rejected {
                kind: NodeKind::Closed
            })
        );
        assert_eq!(closed.node_kind().to_string(), "closed");
    }
}
