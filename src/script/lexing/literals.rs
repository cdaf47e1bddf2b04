//! Literal decoding shared by the lexer callbacks
//!
//! Numeric literals become bytes whose width comes from the literal form, never from
//! the magnitude of the value:
//!
//! | literal  | bytes                     |
//! |----------|---------------------------|
//! | `0x05`   | `05`                      |
//! | `0x0005` | `00 05`                   |
//! | `5`      | `00 00 00 05`             |
//! | `-5`     | `FF FF FF FB`             |
//! | `5L`     | `00 00 00 00 00 00 00 05` |

use super::tokens::LexicalError;

/// Resolve the escape sequences of a quoted literal body (quotes already stripped)
pub fn unescape(body: &str) -> Result<String, LexicalError> {
    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => text.push('"'),
            Some('\'') => text.push('\''),
            Some('\\') => text.push('\\'),
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            Some('t') => text.push('\t'),
            Some(other) => return Err(LexicalError::InvalidEscape(other)),
            None => return Err(LexicalError::UnterminatedText),
        }
    }

    Ok(text)
}

/// Decode hex digits (no `0x` prefix) into bytes, one byte per digit pair
pub fn hex_digits(digits: &str) -> Result<Vec<u8>, LexicalError> {
    if digits.len() % 2 != 0 {
        return Err(LexicalError::OddHexDigits(digits.to_string()));
    }

    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| LexicalError::OddHexDigits(digits.to_string()))
        })
        .collect()
}

/// Decode a `0x…` literal
pub fn hex_literal(literal: &str) -> Result<Vec<u8>, LexicalError> {
    let digits = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
        .unwrap_or(literal);
    hex_digits(digits)
}

/// Decode a bracketed byte array such as `[0x01 0x02]`
///
/// Groups are concatenated, so `[0x0102]` and `[0x01 0x02]` are the same bytes.
pub fn byte_array(literal: &str) -> Result<Vec<u8>, LexicalError> {
    let inner = literal
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split_whitespace();

    let mut bytes = Vec::new();
    for group in inner {
        bytes.extend(hex_literal(group)?);
    }
    Ok(bytes)
}

/// Decimal literal without suffix; its width depends on where it appears
pub fn decimal_literal(literal: &str) -> Result<i64, LexicalError> {
    literal
        .parse::<i64>()
        .map_err(|_| LexicalError::IntegerOutOfRange(literal.to_string()))
}

/// An unsuffixed decimal used as a value: 32-bit two's complement
pub fn int_value(value: i64) -> Result<i32, LexicalError> {
    i32::try_from(value).map_err(|_| LexicalError::IntegerOutOfRange(value.to_string()))
}

/// Decimal literal with the `L` suffix: 64-bit two's complement
pub fn long_literal(literal: &str) -> Result<i64, LexicalError> {
    let digits = literal.trim_end_matches('L');
    digits
        .parse::<i64>()
        .map_err(|_| LexicalError::IntegerOutOfRange(literal.to_string()))
}

pub fn int_bytes(value: i32) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn long_bytes(value: i64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0x05", vec![0x05])]
    #[case("0x0005", vec![0x00, 0x05])]
    #[case("0xFB", vec![0xFB])]
    #[case("0xFFFB", vec![0xFF, 0xFB])]
    #[case("0Xab", vec![0xAB])]
    fn test_hex_width_follows_digit_pairs(#[case] literal: &str, #[case] expected: Vec<u8>) {
        assert_eq!(hex_literal(literal).unwrap(), expected);
    }

    #[rstest]
    #[case("5", vec![0, 0, 0, 5])]
    #[case("-5", vec![0xFF, 0xFF, 0xFF, 0xFB])]
    #[case("0", vec![0, 0, 0, 0])]
    fn test_int_is_four_bytes(#[case] literal: &str, #[case] expected: Vec<u8>) {
        let value = int_value(decimal_literal(literal).unwrap()).unwrap();
        assert_eq!(int_bytes(value), expected);
    }

    #[rstest]
    #[case("5L", vec![0, 0, 0, 0, 0, 0, 0, 5])]
    #[case("-5L", vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFB])]
    fn test_long_is_eight_bytes(#[case] literal: &str, #[case] expected: Vec<u8>) {
        assert_eq!(long_bytes(long_literal(literal).unwrap()), expected);
    }

    #[test]
    fn test_odd_hex_digits_rejected() {
        assert_eq!(
            hex_literal("0x005"),
            Err(LexicalError::OddHexDigits("005".to_string()))
        );
    }

    #[test]
    fn test_int_out_of_range() {
        assert_eq!(
            int_value(2_147_483_648),
            Err(LexicalError::IntegerOutOfRange("2147483648".to_string()))
        );
        assert_eq!(int_value(decimal_literal("-2147483648").unwrap()), Ok(i32::MIN));
        assert!(decimal_literal("9223372036854775808").is_err());
    }

    #[test]
    fn test_byte_array_concatenates_groups() {
        assert_eq!(byte_array("[0x01 0x02 0xff]").unwrap(), vec![0x01, 0x02, 0xFF]);
        assert_eq!(byte_array("[ 0x0102 ]").unwrap(), vec![0x01, 0x02]);
        assert_eq!(byte_array("[]").unwrap(), Vec::<u8>::new());
    }

    #[rstest]
    #[case(r#"say \"hi\""#, "say \"hi\"")]
    #[case(r"a\\b", "a\\b")]
    #[case(r"line\r\n", "line\r\n")]
    #[case("say [HAHA]", "say [HAHA]")]
    #[case("GET $foo", "GET $foo")]
    fn test_unescape(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(unescape(body).unwrap(), expected);
    }

    #[test]
    fn test_unknown_escape_rejected() {
        assert_eq!(unescape(r"bad \q"), Err(LexicalError::InvalidEscape('q')));
    }
}
