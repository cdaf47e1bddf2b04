//! Token definitions for wirescript
//!
//! Tokens are produced by the logos derive below. Literal tokens carry their decoded
//! payload, so every malformed literal fails here, with the span logos reports.
//!
//! Keywords are not tokens of their own: `read`, `connected` or `as` all lex as
//! [`Token::Word`] and the grammar decides what a word means in its position. This
//! keeps names such as `BARRIER` or `mask` free of any reserved-word rules.

use super::literals;
use crate::script::ast::NamedGroupPattern;
use logos::{Lexer, Logos};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Why a span of source text could not be turned into a token
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub enum LexicalError {
    #[default]
    #[error("unrecognized character")]
    Unrecognized,
    #[error("invalid escape sequence `\\{0}` in quoted text")]
    InvalidEscape(char),
    #[error("hex literal `{0}` has an odd number of digits")]
    OddHexDigits(String),
    #[error("integer literal `{0}` is out of range")]
    IntegerOutOfRange(String),
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
    #[error("malformed location: {0}")]
    InvalidLocation(String),
    #[error("unterminated quoted text")]
    UnterminatedText,
    #[error("unterminated byte array")]
    UnterminatedBytes,
    #[error("unterminated regex")]
    UnterminatedRegex,
    #[error("unterminated expression")]
    UnterminatedExpression,
    /// Recognized syntax that has no implementation
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

/// All tokens of the wirescript language
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(error = LexicalError)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    // Statements end at line breaks
    #[token("\n")]
    Newline,

    /// Text after `#` up to the end of the line
    #[regex(r"#[^\n]*", comment_text)]
    Comment(String),

    #[regex(r"[A-Za-z][A-Za-z0-9+.\-]*://[^\s]*", location)]
    Uri(Url),

    /// Keywords and names
    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*", |lex| lex.slice().to_string())]
    Word(String),

    /// Quoted text with escapes resolved
    #[regex(r#""([^"\\\n]|\\.)*""#, quoted_text)]
    #[regex(r"'([^'\\\n]|\\.)*'", quoted_text)]
    #[regex(r#""([^"\\\n]|\\.)*"#, unterminated_text)]
    #[regex(r"'([^'\\\n]|\\.)*", unterminated_text)]
    Text(String),

    /// `[0x01 0x02]`
    #[regex(r"\[[ \t]*\]", literal_bytes)]
    #[regex(r"\[[ \t]*0[xX][0-9a-fA-F]+([ \t]+0[xX][0-9a-fA-F]+)*[ \t]*\]", literal_bytes)]
    #[regex(r"\[[ \t]*0[xX][0-9a-fA-F]+([ \t]+0[xX][0-9a-fA-F]+)*[ \t]*", unterminated_bytes)]
    Bytes(Vec<u8>),

    /// `0x05`, width taken from the digit count
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| literals::hex_literal(lex.slice()))]
    Hex(Vec<u8>),

    /// Plain decimal; 32 bits as a value, wider as a length
    #[regex(r"-?[0-9]+", |lex| literals::decimal_literal(lex.slice()))]
    Int(i64),

    #[regex(r"-?[0-9]+L", |lex| literals::long_literal(lex.slice()))]
    Long(i64),

    /// `/pattern/`
    #[regex(r"/([^/\\\n]|\\.)+/", regex_literal)]
    #[regex(r"/([^/\\\n]|\\.)*", unterminated_regex)]
    Regex(NamedGroupPattern),

    /// `${…}`, kept verbatim including the delimiters
    #[token("${", expression)]
    Expression(String),

    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    #[token("(...", prefixed_length)]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token("..")]
    DotDot,
}

fn comment_text(lex: &mut Lexer<Token>) -> String {
    lex.slice()[1..].trim_end_matches('\r').to_string()
}

fn location(lex: &mut Lexer<Token>) -> Result<Url, LexicalError> {
    Url::parse(lex.slice()).map_err(|e| LexicalError::InvalidLocation(e.to_string()))
}

fn quoted_text(lex: &mut Lexer<Token>) -> Result<String, LexicalError> {
    let slice = lex.slice();
    literals::unescape(&slice[1..slice.len() - 1])
}

fn unterminated_text(_lex: &mut Lexer<Token>) -> Result<String, LexicalError> {
    Err(LexicalError::UnterminatedText)
}

fn literal_bytes(lex: &mut Lexer<Token>) -> Result<Vec<u8>, LexicalError> {
    literals::byte_array(lex.slice())
}

fn unterminated_bytes(_lex: &mut Lexer<Token>) -> Result<Vec<u8>, LexicalError> {
    Err(LexicalError::UnterminatedBytes)
}

fn regex_literal(lex: &mut Lexer<Token>) -> Result<NamedGroupPattern, LexicalError> {
    let slice = lex.slice();
    let source = slice[1..slice.len() - 1].replace("\\/", "/");
    NamedGroupPattern::compile(&source).map_err(|e| LexicalError::InvalidRegex(e.to_string()))
}

fn unterminated_regex(_lex: &mut Lexer<Token>) -> Result<NamedGroupPattern, LexicalError> {
    Err(LexicalError::UnterminatedRegex)
}

/// Extends `${` to its matching `}` on the same line. Nested braces balance, and
/// braces inside quoted strings of the body do not count.
fn expression(lex: &mut Lexer<Token>) -> Result<String, LexicalError> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = None;

    for (offset, ch) in lex.remainder().char_indices() {
        if ch == '\n' {
            break;
        }
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if ch == '\\' => escaped = true,
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(offset + 1);
                        break;
                    }
                }
                _ => {}
            },
        }
    }

    match end {
        Some(length) => {
            lex.bump(length);
            Ok(lex.slice().to_string())
        }
        None => {
            let line = lex.remainder().find('\n').unwrap_or(lex.remainder().len());
            lex.bump(line);
            Err(LexicalError::UnterminatedExpression)
        }
    }
}

fn prefixed_length(_lex: &mut Lexer<Token>) -> Result<(), LexicalError> {
    Err(LexicalError::Unsupported("prefixed-length matcher `(...)`"))
}

impl Token {
    pub fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(word) if word == keyword)
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, Token::Newline)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Newline => write!(f, "end of line"),
            Token::Comment(_) => write!(f, "comment"),
            Token::Uri(url) => write!(f, "`{url}`"),
            Token::Word(word) => write!(f, "`{word}`"),
            Token::Text(_) => write!(f, "quoted text"),
            Token::Bytes(_) => write!(f, "byte array"),
            Token::Hex(_) => write!(f, "hex literal"),
            Token::Int(value) => write!(f, "`{value}`"),
            Token::Long(value) => write!(f, "`{value}L`"),
            Token::Regex(_) => write!(f, "regex"),
            Token::Expression(source) => write!(f, "`{source}`"),
            Token::LBracket => write!(f, "`[`"),
            Token::RBracket => write!(f, "`]`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBrace => write!(f, "`{{`"),
            Token::RBrace => write!(f, "`}}`"),
            Token::Colon => write!(f, "`:`"),
            Token::DotDot => write!(f, "`..`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Result<Token, LexicalError>> {
        Token::lexer(source).collect()
    }

    #[test]
    fn test_statement_tokens() {
        let tokens = lex_all("read ([0..4]:len) \"hi\"\n");
        assert_eq!(
            tokens,
            vec![
                Ok(Token::Word("read".to_string())),
                Ok(Token::LParen),
                Ok(Token::LBracket),
                Ok(Token::Int(0)),
                Ok(Token::DotDot),
                Ok(Token::Int(4)),
                Ok(Token::RBracket),
                Ok(Token::Colon),
                Ok(Token::Word("len".to_string())),
                Ok(Token::RParen),
                Ok(Token::Text("hi".to_string())),
                Ok(Token::Newline),
            ]
        );
    }

    #[test]
    fn test_uri_wins_over_word() {
        let tokens = lex_all("connect tcp://localhost:8080/path?p1=v1&p2=v2");
        let url = Url::parse("tcp://localhost:8080/path?p1=v1&p2=v2").unwrap();
        assert_eq!(
            tokens,
            vec![Ok(Token::Word("connect".to_string())), Ok(Token::Uri(url))]
        );
    }

    #[test]
    fn test_capture_name_is_not_a_uri() {
        let tokens = lex_all("(byte:capture)");
        assert_eq!(tokens[1], Ok(Token::Word("byte".to_string())));
        assert_eq!(tokens[2], Ok(Token::Colon));
    }

    #[test]
    fn test_byte_array_is_one_token() {
        assert_eq!(
            lex_all("[ 0x01 0xfe ]"),
            vec![Ok(Token::Bytes(vec![0x01, 0xFE]))]
        );
    }

    #[test]
    fn test_comment_text_keeps_spacing() {
        assert_eq!(
            lex_all("#  spaced out \r\n"),
            vec![Ok(Token::Comment("  spaced out ".to_string())), Ok(Token::Newline)]
        );
    }

    #[test]
    fn test_lexical_failures() {
        assert_eq!(lex_all("\"open")[0], Err(LexicalError::UnterminatedText));
        assert_eq!(lex_all("[0x01 0x02")[0], Err(LexicalError::UnterminatedBytes));
        assert_eq!(lex_all("/abc")[0], Err(LexicalError::UnterminatedRegex));
        assert_eq!(lex_all("${abc")[0], Err(LexicalError::UnterminatedExpression));
        assert_eq!(
            lex_all("[0x123]")[0],
            Err(LexicalError::OddHexDigits("123".to_string()))
        );
        assert!(matches!(lex_all("(...")[0], Err(LexicalError::Unsupported(_))));
    }

    #[test]
    fn test_expression_braces_balance() {
        assert_eq!(
            lex_all(r#"${m["}"]} ${f({a})}"#),
            vec![
                Ok(Token::Expression(r#"${m["}"]}"#.to_string())),
                Ok(Token::Expression("${f({a})}".to_string())),
            ]
        );
        assert_eq!(
            lex_all("${a{b}\nclose"),
            vec![
                Err(LexicalError::UnterminatedExpression),
                Ok(Token::Newline),
                Ok(Token::Word("close".to_string())),
            ]
        );
    }

    #[test]
    fn test_regex_slash_escape() {
        let tokens = lex_all(r"/a\/b/");
        let pattern = NamedGroupPattern::compile("a/b").unwrap();
        assert_eq!(tokens, vec![Ok(Token::Regex(pattern))]);
    }
}
