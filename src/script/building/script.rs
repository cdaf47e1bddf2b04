use super::stream::{AcceptStreamBuilder, AcceptedStreamBuilder, ConnectStreamBuilder};
use super::{Parent, Root};
use crate::script::ast::{
    AcceptNode, AcceptedNode, CommentNode, ConnectNode, PreambleNode, PropertyNode, ScriptNode,
    Value,
};

/// Builds a whole script
///
/// Properties and comments added before the first stream form the preamble; once a
/// stream exists they belong inside a stream instead, as in the source text.
#[derive(Debug)]
pub struct ScriptBuilder<P = Root> {
    parent: P,
    node: ScriptNode,
}

impl ScriptBuilder<Root> {
    pub fn new() -> Self {
        Self {
            parent: Root,
            node: ScriptNode::new(),
        }
    }
}

impl Default for ScriptBuilder<Root> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ScriptBuilder<P> {
    pub fn add_accept_stream(self) -> AcceptStreamBuilder<Self> {
        AcceptStreamBuilder::within(self)
    }

    pub fn add_accepted_stream(self) -> AcceptedStreamBuilder<Self> {
        AcceptedStreamBuilder::within(self)
    }

    pub fn add_connect_stream(self) -> ConnectStreamBuilder<Self> {
        ConnectStreamBuilder::within(self)
    }

    fn add_preamble(mut self, entry: PreambleNode) -> Self {
        if !self.node.streams.is_empty() {
            panic!("script-level {} after the first stream", entry_label(&entry));
        }
        self.node.preamble.push(entry);
        self
    }

    /// Panics once a stream has been added
    pub fn add_comment(self, text: impl Into<String>) -> Self {
        self.add_preamble(PreambleNode::Comment(CommentNode::new(text)))
    }

    /// Panics once a stream has been added
    pub fn add_property(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_preamble(PreambleNode::Property(PropertyNode {
            name: name.into(),
            value: value.into(),
        }))
    }

    pub fn done(self) -> P::Output
    where
        P: Parent<ScriptNode>,
    {
        self.parent.adopt(self.node)
    }
}

fn entry_label(entry: &PreambleNode) -> &'static str {
    match entry {
        PreambleNode::Property(_) => "property",
        PreambleNode::Comment(_) => "comment",
    }
}

impl<P> Parent<AcceptNode> for ScriptBuilder<P> {
    type Output = Self;

    fn adopt(mut self, child: AcceptNode) -> Self {
        self.node.streams.push(child.into());
        self
    }
}

impl<P> Parent<AcceptedNode> for ScriptBuilder<P> {
    type Output = Self;

    fn adopt(mut self, child: AcceptedNode) -> Self {
        self.node.streams.push(child.into());
        self
    }
}

impl<P> Parent<ConnectNode> for ScriptBuilder<P> {
    type Output = Self;

    fn adopt(mut self, child: ConnectNode) -> Self {
        self.node.streams.push(child.into());
        self
    }
}
