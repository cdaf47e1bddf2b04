//! Parsed and built trees compare structurally

use wirescript::script::ast::{structural_hash, Describe, Location};
use wirescript::script::building::{AcceptedStreamBuilder, ConnectStreamBuilder, ScriptBuilder};
use wirescript::script::parsing::strategy;
use wirescript::{parse_script, ScriptParser};

fn location(text: &str) -> Location {
    Location::parse(text).unwrap()
}

const ECHO: &str = "\
# echo server
property greeting \"Hello\"
accept tcp://localhost:8001 as echo
bound
accepted echo
connected
read (short:len) [0..${len}]
write ${greeting} [0x0D 0x0A]
read notify ECHOED
close
closed
connect tcp://localhost:8001
connected
read await ECHOED
write option mask [0x01 0x02 0x03 0x04]
write \"ping\"
read /pong(?<rest>.*)\\n/
closed
";

fn echo_tree() -> wirescript::ScriptNode {
    ScriptBuilder::new()
        .add_comment(" echo server")
        .add_property("greeting", "Hello")
        .add_accept_stream()
        .set_location(location("tcp://localhost:8001"))
        .set_accept_name("echo")
        .add_bound_event()
        .done()
        .add_accepted_stream()
        .set_accept_name("echo")
        .add_connected_event()
        .add_read_event()
        .add_short_length_bytes()
        .capture("len")
        .add_variable_length_bytes("${len}")
        .done()
        .add_write_command()
        .add_expression("${greeting}")
        .add_literal_bytes([0x0Du8, 0x0A])
        .done()
        .add_read_notify_barrier("ECHOED")
        .add_close_command()
        .add_closed_event()
        .done()
        .add_connect_stream()
        .set_location(location("tcp://localhost:8001"))
        .add_connected_event()
        .add_read_await_barrier("ECHOED")
        .add_write_option("mask", [0x01u8, 0x02, 0x03, 0x04])
        .add_write_command()
        .add_literal_text("ping")
        .done()
        .add_read_event()
        .add_regex(r"pong(?<rest>.*)\n")
        .done()
        .add_closed_event()
        .done()
        .done()
}

#[test]
fn parsed_script_equals_built_script() {
    let parsed = parse_script(ECHO).unwrap();
    let built = echo_tree();
    assert_eq!(parsed, built);
    assert_eq!(structural_hash(&parsed), structural_hash(&built));
}

#[test]
fn described_tree_reparses_to_itself() {
    let built = echo_tree();
    let described = built.describe_to_string();
    assert_eq!(parse_script(&described).unwrap(), built);
}

#[test]
fn formatting_does_not_affect_equality() {
    let compact = parse_script("connect tcp://localhost:8080\nconnected\nwrite [0x01 0x02]\n").unwrap();
    let spaced = parse_script("\n\nconnect   tcp://localhost:8080\n  connected\nwrite [0x0102]   \n\n").unwrap();
    assert_eq!(compact, spaced);
    assert_eq!(structural_hash(&compact), structural_hash(&spaced));
}

#[test]
fn different_content_is_not_equal() {
    let a = parse_script("connect tcp://localhost:8080\nconnected\nwrite \"a\"\n").unwrap();
    let b = parse_script("connect tcp://localhost:8080\nconnected\nwrite \"b\"\n").unwrap();
    assert_ne!(a, b);
    assert_ne!(structural_hash(&a), structural_hash(&b));
}

#[test]
fn stream_fragments_match_stream_builders() {
    let parser = ScriptParser::new();

    let connect = parser
        .parse_with_strategy(
            "connect tcp://localhost:8080\nconnected\nwrite \"GET\"\nclose\n",
            strategy::Connect,
        )
        .unwrap()
        .node;
    let expected = ConnectStreamBuilder::new()
        .set_location(location("tcp://localhost:8080"))
        .add_connected_event()
        .add_write_command()
        .add_literal_text("GET")
        .done()
        .add_close_command()
        .done();
    assert_eq!(connect, expected);

    let accepted = parser
        .parse_with_strategy("accepted\nconnected\ndisconnected\n", strategy::Accepted)
        .unwrap()
        .node;
    let expected = AcceptedStreamBuilder::new()
        .add_connected_event()
        .add_disconnected_event()
        .done();
    assert_eq!(accepted, expected);
}
