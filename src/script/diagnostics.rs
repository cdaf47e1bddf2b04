//! Cross-node validation over a finished tree
//!
//! The parser only checks what one line and its stream can tell. The checks here need
//! the whole script and run after parsing (or building), without touching the source:
//!
//! 1. **duplicate-capture**: a capture or regex group name bound twice
//! 2. **unmatched-await**: an await whose barrier is never notified
//! 3. **unused-notify**: a notify whose barrier is never awaited (warning)
//! 4. **unknown-accept**: `accepted NAME` without an `accept ... as NAME`
//!
//! Each diagnostic carries a [`NodePath`] that resolves against the region tree of
//! the parse, when there is one.

use crate::script::ast::{
    AcceptNode, AcceptedNode, AstNode, BarrierNode, ConnectNode, Expression, NamedGroupPattern,
    NodeKind, ReadNode, RegionInfo, ScriptNode, StreamableNode, VisitError, Visitor,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Child indexes from the script root, mirroring the region tree
///
/// `[2, 5, 1]` is the second matcher of the sixth statement of the script's third
/// entry, where entries are the preamble followed by the streams.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }

    pub fn indexes(&self) -> &[usize] {
        &self.0
    }

    pub fn resolve<'a>(&self, region: &'a RegionInfo) -> Option<&'a RegionInfo> {
        region.descendant(&self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "{}", parts.join("/"))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: NodePath,
    pub severity: Severity,
    pub message: String,
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(path: NodePath, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            path,
            severity,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} [{}]: {} at {}", self.severity, code, self.message, self.path),
            None => write!(f, "{}: {} at {}", self.severity, self.message, self.path),
        }
    }
}

/// Run every check, in tree order
pub fn validate(script: &ScriptNode) -> Vec<Diagnostic> {
    let mut collector = Collector::default();
    // The collector handles every node kind; rejection cannot happen.
    if script.accept(&mut collector, NodePath::root()).is_err() {
        return Vec::new();
    }
    collector.finish()
}

#[derive(Default)]
struct Collector {
    diagnostics: Vec<Diagnostic>,
    captures: BTreeMap<String, NodePath>,
    awaits: Vec<(String, NodePath)>,
    notifies: Vec<(String, NodePath)>,
    accept_names: BTreeSet<String>,
    accepted_names: Vec<(String, NodePath)>,
}

impl Collector {
    fn bind(&mut self, name: &str, path: NodePath) {
        match self.captures.get(name) {
            Some(first) => {
                let message = format!("capture `{name}` is already bound at {first}");
                self.diagnostics.push(
                    Diagnostic::new(path, Severity::Error, message).with_code("duplicate-capture"),
                );
            }
            None => {
                self.captures.insert(name.to_string(), path);
            }
        }
    }

    fn barrier(&mut self, node: &BarrierNode, path: NodePath) {
        let entry = (node.name.clone(), path);
        if node.kind.is_await() {
            self.awaits.push(entry);
        } else {
            self.notifies.push(entry);
        }
    }

    fn streamables(&mut self, streamables: &[StreamableNode], path: &NodePath) -> Result<(), VisitError> {
        for (index, streamable) in streamables.iter().enumerate() {
            streamable.accept(self, path.child(index))?;
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<Diagnostic> {
        let notified: BTreeSet<&str> = self.notifies.iter().map(|(name, _)| name.as_str()).collect();
        let awaited: BTreeSet<&str> = self.awaits.iter().map(|(name, _)| name.as_str()).collect();

        let mut late = Vec::new();
        for (name, path) in &self.awaits {
            if !notified.contains(name.as_str()) {
                late.push(
                    Diagnostic::new(
                        path.clone(),
                        Severity::Error,
                        format!("barrier `{name}` is awaited but never notified"),
                    )
                    .with_code("unmatched-await"),
                );
            }
        }
        for (name, path) in &self.notifies {
            if !awaited.contains(name.as_str()) {
                late.push(
                    Diagnostic::new(
                        path.clone(),
                        Severity::Warning,
                        format!("barrier `{name}` is notified but never awaited"),
                    )
                    .with_code("unused-notify"),
                );
            }
        }
        for (name, path) in &self.accepted_names {
            if !self.accept_names.contains(name) {
                late.push(
                    Diagnostic::new(
                        path.clone(),
                        Severity::Error,
                        format!("no `accept ... as {name}` stream for `accepted {name}`"),
                    )
                    .with_code("unknown-accept"),
                );
            }
        }

        self.diagnostics.extend(late);
        self.diagnostics.sort_by(|a, b| a.path.cmp(&b.path));
        self.diagnostics
    }
}

impl Visitor<NodePath> for Collector {
    type Output = ();
    type Error = VisitError;

    fn visit_default(&mut self, _kind: NodeKind, _path: NodePath) -> Result<(), VisitError> {
        Ok(())
    }

    fn visit_script(&mut self, node: &ScriptNode, path: NodePath) -> Result<(), VisitError> {
        let offset = node.preamble.len();
        for (index, stream) in node.streams.iter().enumerate() {
            stream.accept(self, path.child(offset + index))?;
        }
        Ok(())
    }

    fn visit_accept(&mut self, node: &AcceptNode, path: NodePath) -> Result<(), VisitError> {
        if let Some(name) = &node.accept_name {
            self.accept_names.insert(name.clone());
        }
        self.streamables(&node.streamables, &path)
    }

    fn visit_accepted(&mut self, node: &AcceptedNode, path: NodePath) -> Result<(), VisitError> {
        if let Some(name) = &node.accept_name {
            self.accepted_names.push((name.clone(), path.clone()));
        }
        self.streamables(&node.streamables, &path)
    }

    fn visit_connect(&mut self, node: &ConnectNode, path: NodePath) -> Result<(), VisitError> {
        self.streamables(&node.streamables, &path)
    }

    fn visit_read(&mut self, node: &ReadNode, path: NodePath) -> Result<(), VisitError> {
        for (index, matcher) in node.matchers.iter().enumerate() {
            matcher.accept(self, path.child(index))?;
        }
        Ok(())
    }

    fn visit_read_await(&mut self, node: &BarrierNode, path: NodePath) -> Result<(), VisitError> {
        self.barrier(node, path);
        Ok(())
    }

    fn visit_read_notify(&mut self, node: &BarrierNode, path: NodePath) -> Result<(), VisitError> {
        self.barrier(node, path);
        Ok(())
    }

    fn visit_write_await(&mut self, node: &BarrierNode, path: NodePath) -> Result<(), VisitError> {
        self.barrier(node, path);
        Ok(())
    }

    fn visit_write_notify(&mut self, node: &BarrierNode, path: NodePath) -> Result<(), VisitError> {
        self.barrier(node, path);
        Ok(())
    }

    fn visit_regex(&mut self, pattern: &NamedGroupPattern, path: NodePath) -> Result<(), VisitError> {
        for name in pattern.group_names() {
            self.bind(name, path.clone());
        }
        Ok(())
    }

    fn visit_fixed_length_bytes(
        &mut self,
        _length: u32,
        capture: Option<&str>,
        path: NodePath,
    ) -> Result<(), VisitError> {
        if let Some(name) = capture {
            self.bind(name, path);
        }
        Ok(())
    }

    fn visit_variable_length_bytes(
        &mut self,
        _length: &Expression,
        capture: Option<&str>,
        path: NodePath,
    ) -> Result<(), VisitError> {
        if let Some(name) = capture {
            self.bind(name, path);
        }
        Ok(())
    }

    fn visit_byte_length_bytes(&mut self, capture: Option<&str>, path: NodePath) -> Result<(), VisitError> {
        if let Some(name) = capture {
            self.bind(name, path);
        }
        Ok(())
    }

    fn visit_short_length_bytes(&mut self, capture: Option<&str>, path: NodePath) -> Result<(), VisitError> {
        if let Some(name) = capture {
            self.bind(name, path);
        }
        Ok(())
    }

    fn visit_int_length_bytes(&mut self, capture: Option<&str>, path: NodePath) -> Result<(), VisitError> {
        if let Some(name) = capture {
            self.bind(name, path);
        }
        Ok(())
    }

    fn visit_long_length_bytes(&mut self, capture: Option<&str>, path: NodePath) -> Result<(), VisitError> {
        if let Some(name) = capture {
            self.bind(name, path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parsing::ScriptParser;

    fn codes(source: &str) -> Vec<(String, Severity)> {
        let script = crate::parse_script(source).unwrap();
        validate(&script)
            .into_iter()
            .map(|diagnostic| (diagnostic.code.unwrap_or_default(), diagnostic.severity))
            .collect()
    }

    #[test]
    fn test_clean_script_has_no_diagnostics() {
        let source = "\
accept tcp://localhost:8001 as server
bound
accepted server
connected
read (short:len) [0..${len}]
write notify DONE
connect tcp://localhost:8001
connected
write await DONE
close
closed
";
        assert!(codes(source).is_empty());
    }

    #[test]
    fn test_duplicate_capture_across_streams() {
        let source = "\
connect tcp://localhost:8001
connected
read (byte:id)
connect tcp://localhost:8002
connected
read ([0..2]:id)
";
        assert_eq!(
            codes(source),
            vec![("duplicate-capture".to_string(), Severity::Error)]
        );
    }

    #[test]
    fn test_regex_groups_count_as_captures() {
        let source = "\
connect tcp://localhost:8001
connected
read /(?<code>\\d+)/ (int:code)
";
        assert_eq!(codes(source).len(), 1);
    }

    #[test]
    fn test_barrier_pairing() {
        let source = "\
connect tcp://localhost:8001
connected
read await READY
write notify SENT
";
        assert_eq!(
            codes(source),
            vec![
                ("unmatched-await".to_string(), Severity::Error),
                ("unused-notify".to_string(), Severity::Warning),
            ]
        );
    }

    #[test]
    fn test_unknown_accepted_name() {
        let source = "\
accept tcp://localhost:8001 as server
accepted client
connected
";
        assert_eq!(
            codes(source),
            vec![("unknown-accept".to_string(), Severity::Error)]
        );
    }

    #[test]
    fn test_path_resolves_to_region() {
        let source = "\
property limit \"4\"
connect tcp://localhost:8001
connected
read (byte:a) (byte:a)
";
        let parsed = ScriptParser::new().parse(source).unwrap();
        let diagnostics = validate(&parsed.node);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path.indexes(), &[1, 1, 1]);

        let region = diagnostics[0].path.resolve(&parsed.region).unwrap();
        assert_eq!(region.slice(source), Some("(byte:a)"));
        assert_eq!(region.start(), source.rfind("(byte:a)").unwrap());
    }
}
