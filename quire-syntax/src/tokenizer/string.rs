//! Literal strings.

use crate::Reader;
use crate::token::{PdfString, Token};
use crate::tokenizer::Tokenizer;

/// Tokenizes `(...)` literal strings.
///
/// Balanced parentheses are kept, escapes are decoded, a backslash before a
/// line break removes both, and unescaped line breaks become `\n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringTokenizer;

impl Tokenizer for StringTokenizer {
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token> {
        if first != b'(' {
            return None;
        }

        let mut out = Vec::new();
        let mut depth = 1_usize;

        loop {
            match r.read_byte()? {
                b'\\' => match r.read_byte()? {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    d @ b'0'..=b'7' => {
                        let mut value = u32::from(d - b'0');

                        for _ in 0..2 {
                            match r.eat(|b| matches!(b, b'0'..=b'7')) {
                                Some(d) => value = (value << 3) | u32::from(d - b'0'),
                                None => break,
                            }
                        }

                        // High-order overflow is ignored.
                        out.push(value as u8);
                    }
                    b'\r' => {
                        r.eat(|b| b == b'\n');
                    }
                    b'\n' => {}
                    other => out.push(other),
                },
                b'(' => {
                    depth += 1;
                    out.push(b'(');
                }
                b')' => {
                    depth -= 1;

                    if depth == 0 {
                        break;
                    }

                    out.push(b')');
                }
                b'\r' => {
                    r.eat(|b| b == b'\n');
                    out.push(b'\n');
                }
                b => out.push(b),
            }
        }

        Some(Token::String(PdfString::new(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &[u8]) -> Option<String> {
        let mut r = Reader::new(input);
        let first = r.read_byte()?;

        match StringTokenizer.try_tokenize(first, &mut r)? {
            Token::String(s) => Some(s.text()),
            _ => None,
        }
    }

    #[test]
    fn simple() {
        assert_eq!(tokenize(b"(This is a string)").unwrap(), "This is a string");
        assert_eq!(tokenize(b"()").unwrap(), "");
    }

    #[test]
    fn escaped_parentheses() {
        assert_eq!(
            tokenize(b"(this string \\)contains escaped \\( parentheses)").unwrap(),
            "this string )contains escaped ( parentheses"
        );
    }

    #[test]
    fn nested_parentheses() {
        assert_eq!(
            tokenize(b"(this string (contains nested (two levels)) parentheses)").unwrap(),
            "this string (contains nested (two levels)) parentheses"
        );
    }

    #[test]
    fn line_continuation() {
        assert_eq!(
            tokenize(b"(These \\\ntwo strings \\\nare the same.)").unwrap(),
            "These two strings are the same."
        );
        assert_eq!(tokenize(b"(a\\\r\nb)").unwrap(), "ab");
    }

    #[test]
    fn line_breaks_are_kept() {
        assert_eq!(
            tokenize(b"(Strings may contain\nnewlines)").unwrap(),
            "Strings may contain\nnewlines"
        );
        assert_eq!(tokenize(b"(a\r\nb\rc)").unwrap(), "a\nb\nc");
    }

    #[test]
    fn escapes() {
        assert_eq!(tokenize(b"(\\n\\t\\\\\\q)").unwrap(), "\n\t\\q");
        assert_eq!(tokenize(b"(\\101\\60\\0Y)").unwrap(), "A0\u{0}Y");
        assert_eq!(tokenize(b"(\\7777)").unwrap(), "\u{ff}7");
    }

    #[test]
    fn utf16_with_byte_order_mark() {
        assert_eq!(tokenize(b"(\xfe\xff\x00H\x00i)").unwrap(), "Hi");
    }

    #[test]
    fn unterminated() {
        assert!(tokenize(b"(never ends").is_none());
        assert!(tokenize(b"(unbalanced (paren)").is_none());
    }

    #[test]
    fn wrong_opener() {
        for first in [b'<', b'[', b'a', b'/'] {
            let mut r = Reader::new(b"abc)");
            assert!(StringTokenizer.try_tokenize(first, &mut r).is_none());
        }
    }
}
