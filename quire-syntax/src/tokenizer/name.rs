//! Names.

use crate::Reader;
use crate::token::{Name, Token};
use crate::tokenizer::Tokenizer;
use crate::trivia::{hex_value, is_regular_character};

/// Tokenizes `/Name` tokens, decoding `#XX` escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameTokenizer;

impl Tokenizer for NameTokenizer {
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token> {
        if first != b'/' {
            return None;
        }

        let mut bytes = Vec::new();

        while let Some(b) = r.eat(is_regular_character) {
            if b != b'#' {
                bytes.push(b);
                continue;
            }

            let Some(high) = r.peek_byte().filter(|b| hex_value(*b).is_some()) else {
                bytes.push(b'#');
                continue;
            };

            r.forward();

            match r.peek_byte().and_then(hex_value) {
                Some(low) => {
                    r.forward();
                    // `high` was checked above.
                    bytes.push((hex_value(high).unwrap_or(0) << 4) | low);
                }
                None => bytes.extend_from_slice(&[b'#', high]),
            }
        }

        Some(Token::Name(Name::from_bytes(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &[u8]) -> Option<String> {
        let mut r = Reader::new(input);
        let first = r.read_byte()?;

        match NameTokenizer.try_tokenize(first, &mut r)? {
            Token::Name(n) => Some(n.as_str().to_string()),
            _ => None,
        }
    }

    #[test]
    fn name_1() {
        assert_eq!(tokenize(b"/").unwrap(), "");
    }

    #[test]
    fn name_2() {
        assert!(tokenize(b"dfg").is_none());
    }

    #[test]
    fn name_3() {
        assert_eq!(tokenize(b"/Name1").unwrap(), "Name1");
    }

    #[test]
    fn name_4() {
        assert_eq!(
            tokenize(b"/A;Name_With-Various***Characters?").unwrap(),
            "A;Name_With-Various***Characters?"
        );
    }

    #[test]
    fn name_5() {
        assert_eq!(tokenize(b"/1.2").unwrap(), "1.2");
    }

    #[test]
    fn name_6() {
        assert_eq!(tokenize(b"/Lime#20Green").unwrap(), "Lime Green");
        assert_eq!(tokenize(b"/paired#28#29parentheses").unwrap(), "paired()parentheses");
    }

    #[test]
    fn name_7() {
        assert_eq!(tokenize(b"/The_Key_of_F#23_Minor").unwrap(), "The_Key_of_F#_Minor");
    }

    #[test]
    fn stops_at_delimiters() {
        let mut r = Reader::new(b"/Type/Page");
        r.read_byte();
        assert_eq!(
            NameTokenizer.try_tokenize(b'/', &mut r),
            Some(Token::Name(Name::new("Type")))
        );
        assert_eq!(r.tail(), b"/Page");
    }

    #[test]
    fn broken_escapes_are_kept() {
        assert_eq!(tokenize(b"/AB#FG").unwrap(), "AB#FG");
        assert_eq!(tokenize(b"/AB#").unwrap(), "AB#");
        assert_eq!(tokenize(b"/A#x").unwrap(), "A#x");
    }

    #[test]
    fn windows_1252_fallback() {
        assert_eq!(tokenize(b"/Caf#E9").unwrap(), "Caf\u{e9}");
        assert_eq!(tokenize(b"/Caf#C3#A9").unwrap(), "Caf\u{e9}");
    }
}
