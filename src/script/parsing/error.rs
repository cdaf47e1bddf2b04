//! Parse failures
//!
//! A parse either returns a complete tree or exactly one [`ParseError`]. The error keeps
//! the byte offset of the offending input and the 1-based line and column derived from
//! it.

use crate::script::ast::SourceLocation;
use crate::script::lexing::{LexicalError, TokenSpan};
use chumsky::error::{Simple, SimpleReason};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorKind {
    /// Malformed literal: bad escape, odd hex digits, unterminated quote, bracket or regex
    Lexical,
    /// Unexpected or unknown token
    Syntax,
    /// Statement in a position the stream structure does not allow
    Ordering,
    /// Recognized construct without an implementation
    Unsupported,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Lexical => write!(f, "lexical"),
            ParseErrorKind::Syntax => write!(f, "syntax"),
            ParseErrorKind::Ordering => write!(f, "ordering"),
            ParseErrorKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind} error at {line}:{column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the source
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(
        kind: ParseErrorKind,
        source: &str,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        let position = SourceLocation::new(source).byte_to_position(offset.min(source.len()));
        Self {
            kind,
            offset,
            line: position.line + 1,
            column: position.column + 1,
            message: message.into(),
        }
    }

    pub(crate) fn from_lexical(source: &str, error: LexicalError, span: Range<usize>) -> Self {
        let kind = match error {
            LexicalError::Unsupported(_) => ParseErrorKind::Unsupported,
            _ => ParseErrorKind::Lexical,
        };
        Self::at(kind, source, span.start, error.to_string())
    }

    pub(crate) fn from_syntax(source: &str, error: Simple<TokenSpan>) -> Self {
        Self::at(
            ParseErrorKind::Syntax,
            source,
            error.span().start,
            describe_simple(&error),
        )
    }

    /// Source lines around the error, with the offending line marked `>>`
    pub fn context(&self, source: &str) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let error_line = self.line.saturating_sub(1);

        let start_line = error_line.saturating_sub(2);
        let end_line = (error_line + 3).min(lines.len());

        let mut context = String::new();

        for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
            let marker = if line_num == error_line { ">>" } else { "  " };
            context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
        }

        context
    }
}

fn describe_simple(error: &Simple<TokenSpan>) -> String {
    if let SimpleReason::Custom(message) = error.reason() {
        return message.clone();
    }

    let found = match error.found() {
        Some((token, _)) => format!("unexpected {token}"),
        None => "unexpected end of input".to_string(),
    };

    let mut expected: Vec<String> = error
        .expected()
        .map(|item| match item {
            Some((token, _)) => token.to_string(),
            None => "end of input".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    let mut message = found;
    if let Some(label) = error.label() {
        message.push_str(&format!(" in {label}"));
    }
    if !expected.is_empty() {
        message.push_str(&format!(", expected {}", expected.join(" or ")));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_one_based() {
        let source = "connect tcp://a:1\nconnected\nread [0x01";
        let error = ParseError::at(ParseErrorKind::Lexical, source, 33, "unterminated byte array");
        assert_eq!((error.line, error.column), (3, 6));
        assert_eq!(
            error.to_string(),
            "lexical error at 3:6: unterminated byte array"
        );
    }

    #[test]
    fn test_unsupported_lexical_error() {
        let error = ParseError::from_lexical(
            "read [(...){2+}]",
            LexicalError::Unsupported("prefixed-length matcher `(...)`"),
            6..10,
        );
        assert_eq!(error.kind, ParseErrorKind::Unsupported);
        assert_eq!(error.offset, 6);
    }

    #[test]
    fn test_context_marks_error_line() {
        let source = "line 1\nline 2\nline 3\nerror line\nline 5\nline 6\nline 7";
        let error = ParseError::at(ParseErrorKind::Syntax, source, 21, "unexpected `error`");
        let context = error.context(source);

        assert!(context.contains("line 2"));
        assert!(context.contains(">>   4 | error line"));
        assert!(context.contains("line 5"));
        assert!(!context.contains("line 7"));
    }
}
