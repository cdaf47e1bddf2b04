//! Streams: one connection lifecycle each

use super::location::Location;
use super::streamable::{hash_significant, significant_eq, EventKind, StreamableNode};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// `accept LOCATION [as NAME]`
#[derive(Debug, Clone, Serialize)]
pub struct AcceptNode {
    pub location: Location,
    pub accept_name: Option<String>,
    pub streamables: Vec<StreamableNode>,
}

/// `accepted [NAME]`, a child connection of a preceding accept stream
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcceptedNode {
    pub accept_name: Option<String>,
    pub streamables: Vec<StreamableNode>,
}

/// `connect LOCATION`
#[derive(Debug, Clone, Serialize)]
pub struct ConnectNode {
    pub location: Location,
    pub streamables: Vec<StreamableNode>,
}

// Comments inside a stream are skipped by equality and hashing.

impl PartialEq for AcceptNode {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
            && self.accept_name == other.accept_name
            && significant_eq(&self.streamables, &other.streamables)
    }
}

impl Eq for AcceptNode {}

impl Hash for AcceptNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
        self.accept_name.hash(state);
        hash_significant(&self.streamables, state);
    }
}

impl PartialEq for AcceptedNode {
    fn eq(&self, other: &Self) -> bool {
        self.accept_name == other.accept_name
            && significant_eq(&self.streamables, &other.streamables)
    }
}

impl Eq for AcceptedNode {}

impl Hash for AcceptedNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.accept_name.hash(state);
        hash_significant(&self.streamables, state);
    }
}

impl PartialEq for ConnectNode {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && significant_eq(&self.streamables, &other.streamables)
    }
}

impl Eq for ConnectNode {}

impl Hash for ConnectNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
        hash_significant(&self.streamables, state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "node", rename_all = "kebab-case")]
pub enum StreamNode {
    Accept(AcceptNode),
    Accepted(AcceptedNode),
    Connect(ConnectNode),
}

impl StreamNode {
    pub fn streamables(&self) -> &[StreamableNode] {
        match self {
            StreamNode::Accept(node) => &node.streamables,
            StreamNode::Accepted(node) => &node.streamables,
            StreamNode::Connect(node) => &node.streamables,
        }
    }

    pub(crate) fn streamables_mut(&mut self) -> &mut Vec<StreamableNode> {
        match self {
            StreamNode::Accept(node) => &mut node.streamables,
            StreamNode::Accepted(node) => &mut node.streamables,
            StreamNode::Connect(node) => &mut node.streamables,
        }
    }

    /// Accepted streams inherit their parent's location and have none of their own
    pub fn location(&self) -> Option<&Location> {
        match self {
            StreamNode::Accept(node) => Some(&node.location),
            StreamNode::Accepted(_) => None,
            StreamNode::Connect(node) => Some(&node.location),
        }
    }

    pub fn accept_name(&self) -> Option<&str> {
        match self {
            StreamNode::Accept(node) => node.accept_name.as_deref(),
            StreamNode::Accepted(node) => node.accept_name.as_deref(),
            StreamNode::Connect(_) => None,
        }
    }

    /// The event after which reads, writes and barriers are allowed
    pub fn completion_event(&self) -> EventKind {
        match self {
            StreamNode::Accept(_) => EventKind::Bound,
            StreamNode::Accepted(_) | StreamNode::Connect(_) => EventKind::Connected,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            StreamNode::Accept(_) => "accept",
            StreamNode::Accepted(_) => "accepted",
            StreamNode::Connect(_) => "connect",
        }
    }
}

impl From<AcceptNode> for StreamNode {
    fn from(node: AcceptNode) -> Self {
        StreamNode::Accept(node)
    }
}

impl From<AcceptedNode> for StreamNode {
    fn from(node: AcceptedNode) -> Self {
        StreamNode::Accepted(node)
    }
}

impl From<ConnectNode> for StreamNode {
    fn from(node: ConnectNode) -> Self {
        StreamNode::Connect(node)
    }
}
