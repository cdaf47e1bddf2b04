//! Read payloads
//!
//! A [`ValueMatcher`] recognizes a span of incoming bytes. Exact, regex and expression
//! matchers decide by content; the length-based matchers only frame a span and
//! optionally bind it to a capture name.
//!
//! | surface form        | matcher                 |
//! |---------------------|-------------------------|
//! | `"text"`            | `ExactText`             |
//! | `[0x01 0x02]`, `5L` | `ExactBytes`            |
//! | `/pattern/`         | `Regex`                 |
//! | `${expr}`           | `Expression`            |
//! | `([0..4]:name)`     | `FixedLengthBytes`      |
//! | `([0..${n}]:name)`  | `VariableLengthBytes`   |
//! | `(short:name)`      | `ShortLengthBytes`, etc |

use super::expression::Expression;
use regex::bytes::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A compiled regex literal that knows its named capture groups
///
/// Equality and hashing use the pattern text only.
#[derive(Clone)]
pub struct NamedGroupPattern {
    source: String,
    anchored: Regex,
}

impl NamedGroupPattern {
    pub fn compile(source: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!(r"\A(?:{source})"))?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    /// Pattern text as written between the slashes, with `\/` resolved
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.anchored.capture_names().flatten()
    }

    /// Match at the very start of `input`
    pub fn match_prefix<'h>(&self, input: &'h [u8]) -> Option<Captures<'h>> {
        self.anchored.captures(input)
    }
}

impl fmt::Debug for NamedGroupPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedGroupPattern")
            .field(&self.source)
            .finish()
    }
}

impl PartialEq for NamedGroupPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for NamedGroupPattern {}

impl Hash for NamedGroupPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl Serialize for NamedGroupPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// A rule for recognizing bytes during a `read`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValueMatcher {
    ExactText { text: String },
    ExactBytes { bytes: Vec<u8> },
    Regex { pattern: NamedGroupPattern },
    Expression { expression: Expression },
    /// `[a..b]` spans `b - a` bytes
    FixedLengthBytes {
        length: u32,
        capture: Option<String>,
    },
    /// Length evaluated at match time from an integer expression
    VariableLengthBytes {
        length: Expression,
        capture: Option<String>,
    },
    ByteLengthBytes { capture: Option<String> },
    ShortLengthBytes { capture: Option<String> },
    IntLengthBytes { capture: Option<String> },
    LongLengthBytes { capture: Option<String> },
}

impl ValueMatcher {
    pub fn exact_text(text: impl Into<String>) -> Self {
        ValueMatcher::ExactText { text: text.into() }
    }

    pub fn exact_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        ValueMatcher::ExactBytes {
            bytes: bytes.into(),
        }
    }

    pub fn fixed_length(length: u32) -> Self {
        ValueMatcher::FixedLengthBytes {
            length,
            capture: None,
        }
    }

    /// Capture name bound to the matched span, if any
    pub fn capture(&self) -> Option<&str> {
        match self {
            ValueMatcher::FixedLengthBytes { capture, .. }
            | ValueMatcher::VariableLengthBytes { capture, .. }
            | ValueMatcher::ByteLengthBytes { capture }
            | ValueMatcher::ShortLengthBytes { capture }
            | ValueMatcher::IntLengthBytes { capture }
            | ValueMatcher::LongLengthBytes { capture } => capture.as_deref(),
            ValueMatcher::ExactText { .. }
            | ValueMatcher::ExactBytes { .. }
            | ValueMatcher::Regex { .. }
            | ValueMatcher::Expression { .. } => None,
        }
    }

    /// Every name this matcher binds: its capture plus regex named groups
    pub fn bound_names(&self) -> Vec<&str> {
        match self {
            ValueMatcher::Regex { pattern } => pattern.group_names().collect(),
            other => other.capture().into_iter().collect(),
        }
    }

    /// Width in bytes of the length prefix for the prefixed-length matchers
    pub fn prefix_width(&self) -> Option<usize> {
        match self {
            ValueMatcher::ByteLengthBytes { .. } => Some(1),
            ValueMatcher::ShortLengthBytes { .. } => Some(2),
            ValueMatcher::IntLengthBytes { .. } => Some(4),
            ValueMatcher::LongLengthBytes { .. } => Some(8),
            _ => None,
        }
    }

    /// Whether matching only frames bytes instead of inspecting them
    pub fn is_length_based(&self) -> bool {
        matches!(
            self,
            ValueMatcher::FixedLengthBytes { .. } | ValueMatcher::VariableLengthBytes { .. }
        ) || self.prefix_width().is_some()
    }
}
