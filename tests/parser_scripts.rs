//! Whole-script parsing: stream assembly, ordering rules and error reporting

use wirescript::script::ast::{
    BarrierKind, BarrierNode, CommentNode, EventKind, Expression, Location, PreambleNode,
    ReadNode, StreamNode, StreamableNode, Value, ValueMatcher,
};
use wirescript::script::building::ScriptBuilder;
use wirescript::script::config::ParserConfig;
use wirescript::{parse_script, ParseErrorKind, ScriptNode, ScriptParser};

fn streamables(script: &wirescript::ScriptNode, index: usize) -> &[StreamableNode] {
    script.streams[index].streamables()
}

#[test]
fn connect_with_query_location() {
    let script = parse_script(
        "connect tcp://localhost:8080/path?p1=v1&p2=v2\nconnected\nclose\nclosed\n",
    )
    .unwrap();

    assert_eq!(script.streams.len(), 1);
    let StreamNode::Connect(connect) = &script.streams[0] else {
        panic!("expected a connect stream");
    };
    let url = connect.location.as_url().unwrap();
    assert_eq!(url.path(), "/path");
    assert_eq!(url.query(), Some("p1=v1&p2=v2"));
    assert_eq!(
        connect.streamables,
        vec![
            StreamableNode::Event(EventKind::Connected),
            StreamableNode::Close,
            StreamableNode::Event(EventKind::Closed),
        ]
    );
}

#[test]
fn accept_and_accepted_streams() {
    let source = "\
accept tcp://localhost:8001 as server
bound
child opened
accepted server
connected
read \"Hello\"
write \"World\"
close
closed
";
    let script = parse_script(source).unwrap();

    assert_eq!(script.streams.len(), 2);
    assert_eq!(script.streams[0].keyword(), "accept");
    assert_eq!(script.streams[0].accept_name(), Some("server"));
    assert_eq!(script.streams[1].keyword(), "accepted");
    assert_eq!(script.streams[1].accept_name(), Some("server"));
    assert!(script.streams[1].location().is_none());
    assert_eq!(streamables(&script, 1).len(), 5);
}

#[test]
fn expression_location() {
    let script = parse_script("connect ${location}\nconnected\n").unwrap();
    assert_eq!(
        script.streams[0].location(),
        Some(&Location::Expression(Expression::any("${location}")))
    );
}

#[test]
fn barriers_across_streams() {
    let source = "\
connect tcp://localhost:8080
connected
write notify READY
connect tcp://localhost:8080
connected
write await READY
write \"go\"
";
    let script = parse_script(source).unwrap();
    assert_eq!(
        streamables(&script, 0)[1],
        StreamableNode::Barrier(BarrierNode {
            kind: BarrierKind::WriteNotify,
            name: "READY".to_string(),
        })
    );
    assert_eq!(
        streamables(&script, 1)[1],
        StreamableNode::Barrier(BarrierNode {
            kind: BarrierKind::WriteAwait,
            name: "READY".to_string(),
        })
    );
}

#[test]
fn consecutive_length_prefixed_captures() {
    let script = parse_script(
        "connect tcp://localhost:8080\nconnected\nread (byte:capture) (byte:capture2)\n",
    )
    .unwrap();
    assert_eq!(
        streamables(&script, 0)[1],
        StreamableNode::Read(ReadNode {
            matchers: vec![
                ValueMatcher::ByteLengthBytes {
                    capture: Some("capture".to_string()),
                },
                ValueMatcher::ByteLengthBytes {
                    capture: Some("capture2".to_string()),
                },
            ],
        })
    );
}

#[test]
fn preamble_properties_and_comments() {
    let source = "# greeting test\nproperty greeting \"hello\"\nconnect tcp://localhost:8080\nconnected\nwrite ${greeting}\n";
    let script = parse_script(source).unwrap();

    assert_eq!(
        script.preamble[0],
        PreambleNode::Comment(CommentNode::new(" greeting test"))
    );
    let property = script.properties().next().unwrap();
    assert_eq!(property.name, "greeting");
    assert_eq!(property.value, Value::text("hello"));
    assert_eq!(script.streams.len(), 1);
}

#[test]
fn comments_only_script_is_empty() {
    let script = parse_script("# Comment 1\n# Comment 2\n\n# Comment 3\n").unwrap();
    assert_eq!(script, ScriptNode::new());
    assert!(script.is_empty());
    assert_eq!(script.preamble.len(), 3);

    assert_eq!(parse_script("").unwrap(), ScriptNode::new());
}

#[test]
fn comments_do_not_affect_equality() {
    let source = "\
# tcp.client.connect-then-close
connect tcp://localhost:7788 # Comment 1
\t\t # Comment 2
connected
close
closed
";
    let script = parse_script(source).unwrap();
    let expected = ScriptBuilder::new()
        .add_connect_stream()
        .set_location(Location::parse("tcp://localhost:7788").unwrap())
        .add_connected_event()
        .add_close_command()
        .add_closed_event()
        .done()
        .done();
    assert_eq!(script, expected);
    assert_eq!(
        wirescript::script::ast::structural_hash(&script),
        wirescript::script::ast::structural_hash(&expected)
    );

    // the comments are still there to describe back
    assert_eq!(streamables(&script, 0).len(), 5);
}

#[test]
fn trailing_comment_follows_its_statement() {
    let script = parse_script("connect tcp://localhost:8080\nconnected # up\nclose\n").unwrap();
    assert_eq!(
        streamables(&script, 0),
        &[
            StreamableNode::Event(EventKind::Connected),
            StreamableNode::Comment(CommentNode::new(" up")),
            StreamableNode::Close,
        ]
    );
}

#[test]
fn comments_can_be_dropped() {
    let parser = ScriptParser::with_config(ParserConfig::default().without_comments());
    let script = parser
        .parse("# header\nconnect tcp://localhost:8080 # here\nconnected\n")
        .unwrap()
        .node;
    assert!(script.preamble.is_empty());
    assert_eq!(
        streamables(&script, 0),
        &[StreamableNode::Event(EventKind::Connected)]
    );
}

#[test]
fn single_quoted_text() {
    let script = parse_script("connect tcp://localhost:8080\nconnected\nwrite 'say \"hi\"'\n").unwrap();
    assert_eq!(
        streamables(&script, 0)[1],
        StreamableNode::Write(wirescript::script::ast::WriteNode {
            values: vec![Value::text("say \"hi\"")],
        })
    );
}

#[test]
fn data_before_connected_is_an_ordering_error() {
    let error = parse_script("connect tcp://localhost:8080\nwrite \"early\"\nconnected\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Ordering);
    assert_eq!((error.line, error.column), (2, 1));
}

#[test]
fn accept_stream_completes_on_bound() {
    assert!(parse_script("accept tcp://localhost:8001\nbound\nwrite notify BOUND\n").is_ok());

    let error = parse_script("accept tcp://localhost:8001\nwrite notify BOUND\nbound\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Ordering);
}

#[test]
fn lenient_ordering_allows_early_data() {
    let parser = ScriptParser::with_config(ParserConfig::lenient());
    let script = parser
        .parse("connect tcp://localhost:8080\nwrite \"early\"\nconnected\n")
        .unwrap()
        .node;
    assert_eq!(streamables(&script, 0).len(), 2);
}

#[test]
fn statement_outside_stream() {
    let error = parse_script("read [0x01]\nconnect tcp://localhost:8080\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Ordering);
    assert_eq!(error.line, 1);
}

#[test]
fn accepted_must_follow_accept() {
    let error = parse_script("accepted\nconnected\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Ordering);

    let error = parse_script("connect tcp://localhost:8080\nconnected\naccepted\nconnected\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Ordering);
    assert_eq!(error.line, 3);
}

#[test]
fn empty_accepted_stream_is_rejected() {
    let error = parse_script("accept tcp://localhost:8001\nbound\naccepted\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Syntax);
    assert_eq!(error.line, 3);
}

#[test]
fn unknown_keyword_is_a_syntax_error() {
    let error = parse_script("connect tcp://localhost:8080\nconnected\nwritten \"x\"\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Syntax);
    assert_eq!(error.line, 3);
    assert!(error.to_string().starts_with("syntax error at 3:"));
}

#[test]
fn odd_hex_digits_are_lexical() {
    let error = parse_script("connect tcp://localhost:8080\nconnected\nwrite [0x0]\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Lexical);
    assert_eq!((error.line, error.column), (3, 7));
    assert_eq!(error.offset, 45);
}

#[test]
fn unterminated_literals_are_lexical() {
    for source in [
        "connect tcp://localhost:8080\nconnected\nwrite \"open\n",
        "connect tcp://localhost:8080\nconnected\nread /abc\n",
        "connect tcp://localhost:8080\nconnected\nwrite ${open\n",
    ] {
        let error = parse_script(source).unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::Lexical, "{source:?}");
        assert_eq!(error.line, 3, "{source:?}");
    }
}

#[test]
fn invalid_escape_is_lexical() {
    let error = parse_script("connect tcp://localhost:8080\nconnected\nwrite \"\\q\"\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Lexical);
    assert!(error.message.contains("\\q"));
}

#[test]
fn prefixed_length_matcher_is_unsupported() {
    let error = parse_script("connect tcp://localhost:8080\nconnected\nread [(...){2+}]\n").unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::Unsupported);
    assert_eq!(error.line, 3);
}

#[test]
fn regions_follow_streams_and_statements() {
    let source = "connect tcp://localhost:8080\nconnected\nread [0x01] (byte:len)\n";
    let parsed = ScriptParser::new().parse(source).unwrap();

    let stream = &parsed.region.children[0];
    assert_eq!(stream.slice(source), Some("connect tcp://localhost:8080\nconnected\nread [0x01] (byte:len)"));

    let read = &stream.children[1];
    assert_eq!(read.slice(source), Some("read [0x01] (byte:len)"));
    assert_eq!(read.children[1].slice(source), Some("(byte:len)"));
    assert_eq!(read.children[1].children[0].slice(source), Some("len"));
}

#[test]
fn error_context_marks_the_line() {
    let source = "connect tcp://localhost:8080\nconnected\nwritten\nclose\n";
    let error = parse_script(source).unwrap_err();
    let context = error.context(source);
    assert!(context.contains(">>   3 | written"));
    assert!(context.contains("     1 | connect"));
}
