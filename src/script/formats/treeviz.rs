//! Treeviz formatter for script trees
//!
//! One line per node, nesting drawn with box characters:
//!
//! ```text
//! ⧉ script: 1 stream
//! └─ ⇄ connect: tcp://localhost:8080
//!    ├─ ⚡ connected: connected
//!    ├─ ⇠ read: 1 matchers
//!    │  └─ ▭ byte-length-bytes: len
//!    └─ ✕ close: close
//! ```
//!
//! Icons
//!     Script: ⧉
//!     Streams: accept ⊛, accepted ⊙, connect ⇄
//!     Events: ⚡
//!     Commands: read ⇠, write ⇢, close ✕
//!     Barriers: ⧗ (await), ⚑ (notify)
//!     Property, options: ≔, ⚙
//!     Comment: #
//!     Values: ◦ (literal), ƒ (expression)
//!     Matchers: ≡ (exact), ∿ (regex), ƒ (expression), ▭ (length)
//!
//! Labels are truncated to 30 characters.

use super::snapshot::{snapshot_script, AstSnapshot};
use crate::script::ast::ScriptNode;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        s.to_string()
    }
}

fn icon(node_type: &str) -> &'static str {
    match node_type {
        "script" => "⧉",
        "accept" => "⊛",
        "accepted" => "⊙",
        "connect" => "⇄",
        "opened" | "bound" | "connected" | "child-opened" | "child-closed" | "unbound"
        | "disconnected" | "closed" => "⚡",
        "read" => "⇠",
        "write" => "⇢",
        "close" => "✕",
        "read-await" | "write-await" => "⧗",
        "read-notify" | "write-notify" => "⚑",
        "property" => "≔",
        "read-option" | "write-option" => "⚙",
        "comment" => "#",
        "literal-text" | "literal-bytes" => "◦",
        "expression-value" | "expression-matcher" => "ƒ",
        "exact-text" | "exact-bytes" => "≡",
        "regex" => "∿",
        _ => "▭",
    }
}

pub fn to_treeviz_str(script: &ScriptNode) -> String {
    let snapshot = snapshot_script(script);
    let mut result = format!(
        "{} {}: {}\n",
        icon(&snapshot.node_type),
        snapshot.node_type,
        truncate(&snapshot.label, 30)
    );
    append_children(&mut result, &snapshot.children, "");
    result
}

fn append_node(result: &mut String, node: &AstSnapshot, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };

    result.push_str(&format!(
        "{}{} {} {}: {}\n",
        prefix,
        connector,
        icon(&node.node_type),
        node.node_type,
        truncate(&node.label, 30)
    ));

    let new_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
    append_children(result, &node.children, &new_prefix);
}

fn append_children(result: &mut String, children: &[AstSnapshot], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_node(result, child, prefix, is_last);
    }
}
