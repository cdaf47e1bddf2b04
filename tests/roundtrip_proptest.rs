//! Property-based tests: described trees re-parse to equal trees, and no input makes
//! the lexer or parser panic

use proptest::prelude::*;
use wirescript::script::ast::{
    structural_hash, BarrierKind, BarrierNode, CommentNode, ConnectNode, Describe, EventKind,
    Expression, Location, NamedGroupPattern, OptionNode, PropertyNode, ReadNode, ScriptNode,
    StreamNode, StreamableNode, Value, ValueMatcher, WriteNode,
};
use wirescript::script::lexing::tokenize;
use wirescript::parse_script;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.!?#'\"\\\\\n\r\t]{0,24}"
}

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..8)
}

fn expression() -> impl Strategy<Value = String> {
    name().prop_map(|name| format!("${{{name}}}"))
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        text().prop_map(Value::LiteralText),
        bytes().prop_map(Value::LiteralBytes),
        expression().prop_map(Value::expression),
    ]
}

fn capture() -> impl Strategy<Value = Option<String>> {
    prop::option::of(name())
}

fn matcher() -> impl Strategy<Value = ValueMatcher> {
    prop_oneof![
        text().prop_map(ValueMatcher::exact_text),
        bytes().prop_map(ValueMatcher::exact_bytes),
        prop::sample::select(vec!["[a-z]+", r".*\r\n", "(?<word>\\w+) ", "HTTP/1\\.1"])
            .prop_map(|pattern| ValueMatcher::Regex {
                pattern: NamedGroupPattern::compile(pattern).unwrap(),
            }),
        expression().prop_map(|source| ValueMatcher::Expression {
            expression: Expression::bytes(source),
        }),
        (any::<u32>(), capture())
            .prop_map(|(length, capture)| ValueMatcher::FixedLengthBytes { length, capture }),
        (expression(), capture()).prop_map(|(source, capture)| {
            ValueMatcher::VariableLengthBytes {
                length: Expression::integer(source),
                capture,
            }
        }),
        capture().prop_map(|capture| ValueMatcher::ByteLengthBytes { capture }),
        capture().prop_map(|capture| ValueMatcher::ShortLengthBytes { capture }),
        capture().prop_map(|capture| ValueMatcher::IntLengthBytes { capture }),
        capture().prop_map(|capture| ValueMatcher::LongLengthBytes { capture }),
    ]
}

fn streamable() -> impl Strategy<Value = StreamableNode> {
    prop_oneof![
        prop::sample::select(EventKind::ALL.to_vec()).prop_map(StreamableNode::Event),
        prop::collection::vec(matcher(), 0..4)
            .prop_map(|matchers| StreamableNode::Read(ReadNode { matchers })),
        prop::collection::vec(value(), 0..4)
            .prop_map(|values| StreamableNode::Write(WriteNode { values })),
        Just(StreamableNode::Close),
        (
            prop::sample::select(vec![
                BarrierKind::ReadAwait,
                BarrierKind::ReadNotify,
                BarrierKind::WriteAwait,
                BarrierKind::WriteNotify,
            ]),
            name(),
        )
            .prop_map(|(kind, name)| StreamableNode::Barrier(BarrierNode { kind, name })),
        (name(), value()).prop_map(|(name, value)| StreamableNode::Property(PropertyNode {
            name,
            value,
        })),
        (name(), value())
            .prop_map(|(name, value)| StreamableNode::ReadOption(OptionNode { name, value })),
        (name(), value())
            .prop_map(|(name, value)| StreamableNode::WriteOption(OptionNode { name, value })),
        "[ -~]{0,20}".prop_map(|text| StreamableNode::Comment(CommentNode::new(text))),
    ]
}

fn script() -> impl Strategy<Value = ScriptNode> {
    prop::collection::vec(prop::collection::vec(streamable(), 0..8), 1..3).prop_map(|streams| {
        let streams = streams
            .into_iter()
            .map(|rest| {
                let mut streamables = vec![StreamableNode::Event(EventKind::Connected)];
                streamables.extend(rest);
                StreamNode::Connect(ConnectNode {
                    location: Location::parse("tcp://localhost:8080").unwrap(),
                    streamables,
                })
            })
            .collect();
        ScriptNode {
            preamble: Vec::new(),
            streams,
        }
    })
}

proptest! {
    #[test]
    fn described_script_reparses_equal(script in script()) {
        let described = script.describe_to_string();
        let reparsed = parse_script(&described)
            .map_err(|error| TestCaseError::fail(format!("{error}\n{described}")))?;
        prop_assert_eq!(&reparsed, &script);
        prop_assert_eq!(structural_hash(&reparsed), structural_hash(&script));
        // equality skips comments, so their placement is checked on the text
        prop_assert_eq!(reparsed.describe_to_string(), described);
    }

    #[test]
    fn described_value_reparses_equal(value in value()) {
        let statement = format!("write {}", value.describe_to_string());
        let parsed = wirescript::ScriptParser::new()
            .parse_with_strategy(&statement, wirescript::script::parsing::strategy::Write)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(parsed.node.values, vec![value]);
    }

    #[test]
    fn lexer_never_panics(input in "\\PC{0,64}") {
        let _ = tokenize(&input);
    }

    #[test]
    fn parser_never_panics(input in "[a-z0-9 \\[\\]():.${}\"/#\n]{0,64}") {
        let _ = parse_script(&input);
    }
}
