//! Normalized snapshot of a script tree
//!
//! The snapshot is built by a visitor so that every node kind is covered by the same
//! dispatch the rest of the crate uses. Labels are short surface-syntax fragments.

use crate::script::ast::{
    AcceptNode, AcceptedNode, AstNode, BarrierNode, CommentNode, ConnectNode, Describe,
    Expression, NamedGroupPattern, NodeKind, OptionNode, PropertyNode, ReadNode, ScriptNode,
    StreamableNode, Value, ValueMatcher, VisitError, Visitor, WriteNode,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstSnapshot {
    pub node_type: String,
    pub label: String,
    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn of(kind: NodeKind, label: impl Into<String>) -> Self {
        Self::new(kind.name(), label)
    }

    fn with_children(mut self, children: Vec<AstSnapshot>) -> Self {
        self.children = children;
        self
    }
}

/// Snapshot of a whole script: preamble entries, then streams
pub fn snapshot_script(script: &ScriptNode) -> AstSnapshot {
    // Every node kind has a handler, so the visitor never rejects.
    script
        .accept(&mut SnapshotBuilder, ())
        .unwrap_or_else(|_| AstSnapshot::of(NodeKind::Script, "unavailable"))
}

struct SnapshotBuilder;

impl SnapshotBuilder {
    fn all<N: AstNode>(&mut self, nodes: &[N]) -> Result<Vec<AstSnapshot>, VisitError> {
        nodes.iter().map(|node| node.accept(self, ())).collect()
    }

    fn labelled<D: Describe>(kind: NodeKind, node: &D) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(kind, node.describe_to_string()))
    }

    fn named_value(
        &mut self,
        kind: NodeKind,
        name: &str,
        value: &Value,
    ) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(kind, name).with_children(vec![value.accept(self, ())?]))
    }

    fn stream(
        &mut self,
        kind: NodeKind,
        label: String,
        streamables: &[StreamableNode],
    ) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(kind, label).with_children(self.all(streamables)?))
    }
}

impl Visitor<()> for SnapshotBuilder {
    type Output = AstSnapshot;
    type Error = VisitError;

    /// Events and `close` carry no payload; their keyword is the label
    fn visit_default(&mut self, kind: NodeKind, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(kind, kind.name().replace('-', " ")))
    }

    fn visit_script(&mut self, node: &ScriptNode, _: ()) -> Result<AstSnapshot, VisitError> {
        let mut children = self.all(&node.preamble)?;
        children.extend(self.all(&node.streams)?);
        let label = match node.streams.len() {
            1 => "1 stream".to_string(),
            count => format!("{count} streams"),
        };
        Ok(AstSnapshot::of(NodeKind::Script, label).with_children(children))
    }

    fn visit_accept(&mut self, node: &AcceptNode, _: ()) -> Result<AstSnapshot, VisitError> {
        let mut label = node.location.describe_to_string();
        if let Some(name) = &node.accept_name {
            label.push_str(&format!(" as {name}"));
        }
        self.stream(NodeKind::Accept, label, &node.streamables)
    }

    fn visit_accepted(&mut self, node: &AcceptedNode, _: ()) -> Result<AstSnapshot, VisitError> {
        let label = node.accept_name.clone().unwrap_or_default();
        self.stream(NodeKind::Accepted, label, &node.streamables)
    }

    fn visit_connect(&mut self, node: &ConnectNode, _: ()) -> Result<AstSnapshot, VisitError> {
        let label = node.location.describe_to_string();
        self.stream(NodeKind::Connect, label, &node.streamables)
    }

    fn visit_read(&mut self, node: &ReadNode, _: ()) -> Result<AstSnapshot, VisitError> {
        let children = self.all(&node.matchers)?;
        Ok(AstSnapshot::of(NodeKind::Read, format!("{} matchers", children.len()))
            .with_children(children))
    }

    fn visit_write(&mut self, node: &WriteNode, _: ()) -> Result<AstSnapshot, VisitError> {
        let children = self.all(&node.values)?;
        Ok(AstSnapshot::of(NodeKind::Write, format!("{} values", children.len()))
            .with_children(children))
    }

    fn visit_read_await(&mut self, node: &BarrierNode, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::ReadAwait, node.name.as_str()))
    }

    fn visit_read_notify(&mut self, node: &BarrierNode, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::ReadNotify, node.name.as_str()))
    }

    fn visit_write_await(&mut self, node: &BarrierNode, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::WriteAwait, node.name.as_str()))
    }

    fn visit_write_notify(&mut self, node: &BarrierNode, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::WriteNotify, node.name.as_str()))
    }

    fn visit_property(&mut self, node: &PropertyNode, _: ()) -> Result<AstSnapshot, VisitError> {
        self.named_value(NodeKind::Property, &node.name, &node.value)
    }

    fn visit_read_option(&mut self, node: &OptionNode, _: ()) -> Result<AstSnapshot, VisitError> {
        self.named_value(NodeKind::ReadOption, &node.name, &node.value)
    }

    fn visit_write_option(&mut self, node: &OptionNode, _: ()) -> Result<AstSnapshot, VisitError> {
        self.named_value(NodeKind::WriteOption, &node.name, &node.value)
    }

    fn visit_comment(&mut self, node: &CommentNode, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::Comment, node.text.trim()))
    }

    fn visit_literal_text(&mut self, text: &str, _: ()) -> Result<AstSnapshot, VisitError> {
        Self::labelled(NodeKind::LiteralText, &Value::text(text))
    }

    fn visit_literal_bytes(&mut self, bytes: &[u8], _: ()) -> Result<AstSnapshot, VisitError> {
        Self::labelled(NodeKind::LiteralBytes, &Value::bytes(bytes))
    }

    fn visit_expression_value(&mut self, expr: &Expression, _: ()) -> Result<AstSnapshot, VisitError> {
        Self::labelled(NodeKind::ExpressionValue, expr)
    }

    fn visit_exact_text(&mut self, text: &str, _: ()) -> Result<AstSnapshot, VisitError> {
        Self::labelled(NodeKind::ExactText, &ValueMatcher::exact_text(text))
    }

    fn visit_exact_bytes(&mut self, bytes: &[u8], _: ()) -> Result<AstSnapshot, VisitError> {
        Self::labelled(NodeKind::ExactBytes, &ValueMatcher::exact_bytes(bytes))
    }

    fn visit_regex(&mut self, pattern: &NamedGroupPattern, _: ()) -> Result<AstSnapshot, VisitError> {
        Self::labelled(
            NodeKind::Regex,
            &ValueMatcher::Regex {
                pattern: pattern.clone(),
            },
        )
    }

    fn visit_expression_matcher(&mut self, expr: &Expression, _: ()) -> Result<AstSnapshot, VisitError> {
        Self::labelled(NodeKind::ExpressionMatcher, expr)
    }

    fn visit_fixed_length_bytes(
        &mut self,
        length: u32,
        capture: Option<&str>,
        _: (),
    ) -> Result<AstSnapshot, VisitError> {
        Self::labelled(
            NodeKind::FixedLengthBytes,
            &ValueMatcher::FixedLengthBytes {
                length,
                capture: capture.map(str::to_string),
            },
        )
    }

    fn visit_variable_length_bytes(
        &mut self,
        length: &Expression,
        capture: Option<&str>,
        _: (),
    ) -> Result<AstSnapshot, VisitError> {
        Self::labelled(
            NodeKind::VariableLengthBytes,
            &ValueMatcher::VariableLengthBytes {
                length: length.clone(),
                capture: capture.map(str::to_string),
            },
        )
    }

    fn visit_byte_length_bytes(&mut self, capture: Option<&str>, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::ByteLengthBytes, capture.unwrap_or_default()))
    }

    fn visit_short_length_bytes(&mut self, capture: Option<&str>, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::ShortLengthBytes, capture.unwrap_or_default()))
    }

    fn visit_int_length_bytes(&mut self, capture: Option<&str>, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::IntLengthBytes, capture.unwrap_or_default()))
    }

    fn visit_long_length_bytes(&mut self, capture: Option<&str>, _: ()) -> Result<AstSnapshot, VisitError> {
        Ok(AstSnapshot::of(NodeKind::LongLengthBytes, capture.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_script;

    #[test]
    fn test_snapshot_mirrors_tree() {
        let script = parse_script(
            "# setup\nconnect tcp://localhost:8080\nconnected\nread [0x01] (byte:len)\nclose\n",
        )
        .unwrap();
        let snapshot = snapshot_script(&script);

        assert_eq!(snapshot.label, "1 stream");
        assert_eq!(snapshot.children.len(), 2);
        assert_eq!(snapshot.children[0], AstSnapshot::new("comment", "setup"));

        let stream = &snapshot.children[1];
        assert_eq!(stream.node_type, "connect");
        let labels: Vec<&str> = stream.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["connected", "2 matchers", "close"]);

        let read = &stream.children[1];
        assert_eq!(read.children[0], AstSnapshot::new("exact-bytes", "[0x01]"));
        assert_eq!(read.children[1], AstSnapshot::new("byte-length-bytes", "len"));
    }

    #[test]
    fn test_multi_word_event_label() {
        let script = parse_script("accept tcp://localhost:8080\nbound\nchild opened\n").unwrap();
        let snapshot = snapshot_script(&script);
        assert_eq!(
            snapshot.children[0].children[1],
            AstSnapshot::new("child-opened", "child opened")
        );
    }
}
