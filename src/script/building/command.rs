//! Read and write command builders

use super::{Parent, Root};
use crate::script::ast::{
    Expression, NamedGroupPattern, ReadNode, Value, ValueMatcher, WriteNode,
};

/// Builds the matcher list of a `read`
#[derive(Debug)]
pub struct ReadBuilder<P = Root> {
    parent: P,
    node: ReadNode,
}

impl ReadBuilder<Root> {
    pub fn new() -> Self {
        Self::within(Root)
    }
}

impl Default for ReadBuilder<Root> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Parent<ReadNode>> ReadBuilder<P> {
    pub(crate) fn within(parent: P) -> Self {
        Self {
            parent,
            node: ReadNode::default(),
        }
    }

    pub fn add_matcher(mut self, matcher: ValueMatcher) -> Self {
        self.node.matchers.push(matcher);
        self
    }

    pub fn add_exact_text(self, text: impl Into<String>) -> Self {
        self.add_matcher(ValueMatcher::exact_text(text))
    }

    pub fn add_exact_bytes(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.add_matcher(ValueMatcher::exact_bytes(bytes))
    }

    /// Panics when `pattern` is not a valid regex
    pub fn add_regex(self, pattern: &str) -> Self {
        match NamedGroupPattern::compile(pattern) {
            Ok(pattern) => self.add_matcher(ValueMatcher::Regex { pattern }),
            Err(error) => panic!("invalid regex /{pattern}/: {error}"),
        }
    }

    /// `source` includes the `${` `}` delimiters
    pub fn add_expression(self, source: impl Into<String>) -> Self {
        self.add_matcher(ValueMatcher::Expression {
            expression: Expression::bytes(source),
        })
    }

    pub fn add_fixed_length_bytes(self, length: u32) -> Self {
        self.add_matcher(ValueMatcher::fixed_length(length))
    }

    pub fn add_variable_length_bytes(self, length: impl Into<String>) -> Self {
        self.add_matcher(ValueMatcher::VariableLengthBytes {
            length: Expression::integer(length),
            capture: None,
        })
    }

    pub fn add_byte_length_bytes(self) -> Self {
        self.add_matcher(ValueMatcher::ByteLengthBytes { capture: None })
    }

    pub fn add_short_length_bytes(self) -> Self {
        self.add_matcher(ValueMatcher::ShortLengthBytes { capture: None })
    }

    pub fn add_int_length_bytes(self) -> Self {
        self.add_matcher(ValueMatcher::IntLengthBytes { capture: None })
    }

    pub fn add_long_length_bytes(self) -> Self {
        self.add_matcher(ValueMatcher::LongLengthBytes { capture: None })
    }

    /// Bind the most recently added matcher to `name`
    ///
    /// Panics when there is no matcher yet, when the matcher is not length-based, or
    /// when it already has a capture.
    pub fn capture(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let slot = match self.node.matchers.last_mut() {
            Some(
                ValueMatcher::FixedLengthBytes { capture, .. }
                | ValueMatcher::VariableLengthBytes { capture, .. }
                | ValueMatcher::ByteLengthBytes { capture }
                | ValueMatcher::ShortLengthBytes { capture }
                | ValueMatcher::IntLengthBytes { capture }
                | ValueMatcher::LongLengthBytes { capture },
            ) => capture,
            Some(other) => panic!("cannot capture `{name}` on {other:?}"),
            None => panic!("cannot capture `{name}` before adding a matcher"),
        };
        if let Some(existing) = slot {
            panic!("matcher already captures `{existing}`");
        }
        *slot = Some(name);
        self
    }

    pub fn done(self) -> P::Output {
        self.parent.adopt(self.node)
    }
}

/// Builds the value list of a `write`
#[derive(Debug)]
pub struct WriteBuilder<P = Root> {
    parent: P,
    node: WriteNode,
}

impl WriteBuilder<Root> {
    pub fn new() -> Self {
        Self::within(Root)
    }
}

impl Default for WriteBuilder<Root> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Parent<WriteNode>> WriteBuilder<P> {
    pub(crate) fn within(parent: P) -> Self {
        Self {
            parent,
            node: WriteNode::default(),
        }
    }

    pub fn add_value(mut self, value: impl Into<Value>) -> Self {
        self.node.values.push(value.into());
        self
    }

    pub fn add_literal_text(self, text: impl Into<String>) -> Self {
        self.add_value(Value::text(text))
    }

    pub fn add_literal_bytes(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.add_value(Value::bytes(bytes))
    }

    pub fn add_expression(self, source: impl Into<String>) -> Self {
        self.add_value(Value::expression(source))
    }

    pub fn done(self) -> P::Output {
        self.parent.adopt(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_binds_last_matcher() {
        let read = ReadBuilder::new()
            .add_exact_bytes([0x01u8])
            .add_fixed_length_bytes(4)
            .capture("id")
            .done();
        assert_eq!(read.matchers[1].capture(), Some("id"));
        assert_eq!(read.matchers[0].capture(), None);
    }

    #[test]
    #[should_panic(expected = "cannot capture")]
    fn test_capture_on_exact_matcher_panics() {
        ReadBuilder::new().add_exact_text("x").capture("name");
    }

    #[test]
    #[should_panic(expected = "already captures")]
    fn test_capture_twice_panics() {
        ReadBuilder::new()
            .add_int_length_bytes()
            .capture("a")
            .capture("b");
    }

    #[test]
    fn test_write_values_in_order() {
        let write = WriteBuilder::new()
            .add_literal_text("GET")
            .add_literal_bytes([0x0du8, 0x0a])
            .add_expression("${token}")
            .done();
        assert_eq!(
            write.values,
            vec![
                Value::text("GET"),
                Value::bytes([0x0du8, 0x0a]),
                Value::expression("${token}"),
            ]
        );
    }
}
