//! Statements inside a stream

use super::matcher::ValueMatcher;
use super::value::Value;
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Connection lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Opened,
    Bound,
    Connected,
    ChildOpened,
    ChildClosed,
    Unbound,
    Disconnected,
    Closed,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::Opened,
        EventKind::Bound,
        EventKind::Connected,
        EventKind::ChildOpened,
        EventKind::ChildClosed,
        EventKind::Unbound,
        EventKind::Disconnected,
        EventKind::Closed,
    ];

    /// Surface keywords, e.g. `["child", "opened"]`
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            EventKind::Opened => &["opened"],
            EventKind::Bound => &["bound"],
            EventKind::Connected => &["connected"],
            EventKind::ChildOpened => &["child", "opened"],
            EventKind::ChildClosed => &["child", "closed"],
            EventKind::Unbound => &["unbound"],
            EventKind::Disconnected => &["disconnected"],
            EventKind::Closed => &["closed"],
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords().join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarrierKind {
    ReadAwait,
    ReadNotify,
    WriteAwait,
    WriteNotify,
}

impl BarrierKind {
    pub fn is_await(self) -> bool {
        matches!(self, BarrierKind::ReadAwait | BarrierKind::WriteAwait)
    }

    pub fn is_notify(self) -> bool {
        !self.is_await()
    }
}

impl fmt::Display for BarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BarrierKind::ReadAwait => "read await",
            BarrierKind::ReadNotify => "read notify",
            BarrierKind::WriteAwait => "write await",
            BarrierKind::WriteNotify => "write notify",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ReadNode {
    pub matchers: Vec<ValueMatcher>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct WriteNode {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BarrierNode {
    pub kind: BarrierKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PropertyNode {
    pub name: String,
    pub value: Value,
}

/// `read option NAME value` / `write option NAME value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OptionNode {
    pub name: String,
    pub value: Value,
}

/// Text after `#`, verbatim up to the end of the line
///
/// Comments survive parsing so trees can be described back with them in place, but
/// they are transparent to the equality and hashing of the streams and scripts that
/// hold them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CommentNode {
    pub text: String,
}

impl CommentNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "node", rename_all = "kebab-case")]
pub enum StreamableNode {
    Event(EventKind),
    Read(ReadNode),
    Write(WriteNode),
    Close,
    Barrier(BarrierNode),
    Property(PropertyNode),
    ReadOption(OptionNode),
    WriteOption(OptionNode),
    Comment(CommentNode),
}

impl StreamableNode {
    pub fn is_comment(&self) -> bool {
        matches!(self, StreamableNode::Comment(_))
    }

    /// Statements that exchange data or synchronize, and so need an established connection
    pub fn requires_connection(&self) -> bool {
        matches!(
            self,
            StreamableNode::Read(_) | StreamableNode::Write(_) | StreamableNode::Barrier(_)
        )
    }

    pub fn as_event(&self) -> Option<EventKind> {
        match self {
            StreamableNode::Event(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Statements that take part in structural equality
pub(crate) fn significant(nodes: &[StreamableNode]) -> impl Iterator<Item = &StreamableNode> {
    nodes.iter().filter(|node| !node.is_comment())
}

pub(crate) fn significant_eq(left: &[StreamableNode], right: &[StreamableNode]) -> bool {
    significant(left).eq(significant(right))
}

pub(crate) fn hash_significant<H: Hasher>(nodes: &[StreamableNode], state: &mut H) {
    let mut count = 0usize;
    for node in significant(nodes) {
        node.hash(state);
        count += 1;
    }
    state.write_usize(count);
}

impl From<EventKind> for StreamableNode {
    fn from(kind: EventKind) -> Self {
        StreamableNode::Event(kind)
    }
}

impl From<ReadNode> for StreamableNode {
    fn from(node: ReadNode) -> Self {
        StreamableNode::Read(node)
    }
}

impl From<WriteNode> for StreamableNode {
    fn from(node: WriteNode) -> Self {
        StreamableNode::Write(node)
    }
}

impl From<BarrierNode> for StreamableNode {
    fn from(node: BarrierNode) -> Self {
        StreamableNode::Barrier(node)
    }
}

impl From<PropertyNode> for StreamableNode {
    fn from(node: PropertyNode) -> Self {
        StreamableNode::Property(node)
    }
}

impl From<CommentNode> for StreamableNode {
    fn from(node: CommentNode) -> Self {
        StreamableNode::Comment(node)
    }
}
