//! Parsed scripts driven through the binding contract and the cross-node checks

use wirescript::script::ast::StreamableNode;
use wirescript::script::binding::{match_read, render_write, Bindings, CaptureResolver, MatchOutcome};
use wirescript::script::diagnostics::{validate, Severity};
use wirescript::{parse_script, ScriptParser};

const FRAMED: &str = "\
connect tcp://localhost:8080
connected
write [0x00 0x05] \"hello\"
read ([0..2]:len) ([0..${len}]:payload)
write ${payload}
close
";

#[test]
fn captured_length_frames_payload_for_later_writes() {
    let script = parse_script(FRAMED).unwrap();
    let statements = script.streams[0].streamables();
    let (StreamableNode::Write(greeting), StreamableNode::Read(read), StreamableNode::Write(echo)) =
        (&statements[1], &statements[2], &statements[3])
    else {
        panic!("unexpected statements: {statements:?}");
    };

    let engine = CaptureResolver;
    let sent = render_write(greeting, &Bindings::new(), &engine).unwrap();
    assert_eq!(sent, b"\x00\x05hello");

    let outcome = match_read(read, &sent, &Bindings::new(), &engine).unwrap();
    let MatchOutcome::Matched { consumed, bindings } = outcome else {
        panic!("expected a match, got {outcome:?}");
    };
    assert_eq!(consumed, 7);
    assert_eq!(bindings.get("payload"), Some(&b"hello"[..]));

    assert_eq!(render_write(echo, &bindings, &engine).unwrap(), b"hello");
}

#[test]
fn short_input_is_incomplete() {
    let script = parse_script(FRAMED).unwrap();
    let StreamableNode::Read(read) = &script.streams[0].streamables()[2] else {
        panic!("expected a read");
    };
    let outcome = match_read(read, b"\x00\x05hel", &Bindings::new(), &CaptureResolver).unwrap();
    assert_eq!(outcome, MatchOutcome::Incomplete);
}

#[test]
fn clean_script_has_no_diagnostics() {
    let script = parse_script(FRAMED).unwrap();
    assert!(validate(&script).is_empty());
}

#[test]
fn diagnostics_resolve_to_source() {
    let source = "\
accept tcp://localhost:8001
bound
accepted
connected
read await READY
read (byte:id) (int:id)
";
    let parsed = ScriptParser::new().parse(source).unwrap();
    let diagnostics = validate(&parsed.node);

    let codes: Vec<(&str, Severity)> = diagnostics
        .iter()
        .map(|diagnostic| (diagnostic.code.as_deref().unwrap_or_default(), diagnostic.severity))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("unmatched-await", Severity::Error),
            ("duplicate-capture", Severity::Error),
        ]
    );

    let await_region = diagnostics[0].path.resolve(&parsed.region).unwrap();
    assert_eq!(await_region.slice(source), Some("read await READY"));
}
