//! # wirescript
//!
//! Front end for the wirescript language: scripts that describe network-protocol test
//! scenarios as streams of connection events, byte-level reads and writes, and named
//! barriers that synchronize streams with each other.
//!
//! The crate turns script text into a typed AST ([script::ast]), lets tooling build the
//! same trees programmatically ([script::building]), compares them structurally, and
//! walks them with visitors. Running a script against live traffic is left to an
//! executor; [script::binding] defines the contract such an executor relies on.
//!
//! ```text
//! connect tcp://localhost:8080
//! connected
//! write "Hello"
//! read ([0..5]:reply)
//! close
//! closed
//! ```

pub mod script;

pub use script::ast::{ScriptNode, StreamNode, StreamableNode, Value, ValueMatcher};
pub use script::parsing::{parse_script, ParseError, ParseErrorKind, Parsed, ScriptParser};
