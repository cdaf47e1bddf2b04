//! Lexer for wirescript
//!
//! Tokenization is a single logos pass. Whitespace other than line breaks is skipped;
//! line breaks are tokens because statements are line-terminated. Literal tokens are
//! decoded on the spot (see [literals]), so the parser only ever sees well-formed
//! payloads and lexical failures surface before any grammar runs.

pub mod literals;
pub mod tokens;

pub use tokens::{LexicalError, Token};

use logos::Logos;
use std::ops::Range;

/// A token with its byte span in the source
pub type TokenSpan = (Token, Range<usize>);

/// Tokenize source code, failing on the first lexical error
pub fn tokenize(source: &str) -> Result<Vec<TokenSpan>, (LexicalError, Range<usize>)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(error) => return Err((error, lexer.span())),
        }
    }

    Ok(tokens)
}

/// Tokenize and guarantee the stream ends with a newline token
///
/// Every statement in the grammar is newline-terminated, including the last one.
pub fn tokenize_lines(source: &str) -> Result<Vec<TokenSpan>, (LexicalError, Range<usize>)> {
    let mut tokens = tokenize(source)?;
    if !matches!(tokens.last(), Some((Token::Newline, _))) {
        tokens.push((Token::Newline, source.len()..source.len()));
    }
    Ok(tokens)
}
