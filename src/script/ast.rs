//! AST node model
//!
//! The tree is a closed set of enums: [`ScriptNode`] owns [`StreamNode`]s, streams own
//! [`StreamableNode`]s, and reads and writes own [`ValueMatcher`]s and [`Value`]s.
//!
//! Equality and hashing cover the semantic fields only. Source regions are kept in a
//! separate [`RegionInfo`] tree returned next to the node by the parser, expressions
//! and regexes compare by their source text, and comments held by streams and scripts
//! are skipped.

pub mod describe;
pub mod expression;
pub mod location;
pub mod matcher;
pub mod region;
pub mod script;
pub mod stream;
pub mod streamable;
pub mod value;
pub mod visitor;

pub use describe::Describe;
pub use expression::{Expression, ExpressionType};
pub use location::Location;
pub use matcher::{NamedGroupPattern, ValueMatcher};
pub use region::{Position, RegionInfo, SourceLocation};
pub use script::{PreambleNode, ScriptNode};
pub use stream::{AcceptNode, AcceptedNode, ConnectNode, StreamNode};
pub use streamable::{
    BarrierKind, BarrierNode, CommentNode, EventKind, OptionNode, PropertyNode, ReadNode,
    StreamableNode, WriteNode,
};
pub use value::Value;
pub use visitor::{AstNode, NodeKind, VisitError, Visitor};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash of a node's semantic content
///
/// Stable within a process; equal nodes always hash equally regardless of where they
/// were parsed from.
pub fn structural_hash<T: Hash + ?Sized>(node: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    node.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_hash_ignores_expected_type() {
        let a = ReadNode {
            matchers: vec![ValueMatcher::Expression {
                expression: Expression::bytes("${x}"),
            }],
        };
        let b = ReadNode {
            matchers: vec![ValueMatcher::Expression {
                expression: Expression::any("${x}"),
            }],
        };
        assert_eq!(a, b);
        assert_eq!(structural_hash(&a), structural_hash(&b));
    }

    #[test]
    fn test_comments_are_transparent() {
        let location = Location::parse("tcp://localhost:8080").unwrap();
        let plain = ConnectNode {
            location: location.clone(),
            streamables: vec![StreamableNode::Event(EventKind::Connected), StreamableNode::Close],
        };
        let commented = ConnectNode {
            location,
            streamables: vec![
                StreamableNode::Comment(CommentNode::new(" opening")),
                StreamableNode::Event(EventKind::Connected),
                StreamableNode::Comment(CommentNode::new(" done")),
                StreamableNode::Close,
            ],
        };
        assert_eq!(plain, commented);
        assert_eq!(structural_hash(&plain), structural_hash(&commented));

        let script = ScriptNode {
            preamble: vec![PreambleNode::Comment(CommentNode::new(" only"))],
            streams: vec![],
        };
        assert_eq!(script, ScriptNode::new());
        assert_eq!(structural_hash(&script), structural_hash(&ScriptNode::new()));
    }

    #[test]
    fn test_properties_still_count() {
        let script = ScriptNode {
            preamble: vec![PreambleNode::Property(PropertyNode {
                name: "greeting".to_string(),
                value: Value::text("hi"),
            })],
            streams: vec![],
        };
        assert_ne!(script, ScriptNode::new());
    }
}
