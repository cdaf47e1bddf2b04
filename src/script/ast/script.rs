//! The root node

use super::stream::StreamNode;
use super::streamable::{CommentNode, PropertyNode};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Statements allowed before the first stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "node", rename_all = "kebab-case")]
pub enum PreambleNode {
    Property(PropertyNode),
    Comment(CommentNode),
}

/// A whole script
///
/// Streams are kept in declaration order, which is also the intended execution order.
/// Script-level properties and comments that precede the first stream live in the
/// preamble, so a script with only comments has no streams. Comments are kept for
/// describing the script back but take no part in equality, so such a script equals
/// [`ScriptNode::new`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptNode {
    pub preamble: Vec<PreambleNode>,
    pub streams: Vec<StreamNode>,
}

impl ScriptNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the script declares no streams
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyNode> {
        self.preamble.iter().filter_map(|node| match node {
            PreambleNode::Property(property) => Some(property),
            PreambleNode::Comment(_) => None,
        })
    }
}

impl PartialEq for ScriptNode {
    fn eq(&self, other: &Self) -> bool {
        self.properties().eq(other.properties()) && self.streams == other.streams
    }
}

impl Eq for ScriptNode {}

impl Hash for ScriptNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut count = 0usize;
        for property in self.properties() {
            property.hash(state);
            count += 1;
        }
        state.write_usize(count);
        self.streams.hash(state);
    }
}
