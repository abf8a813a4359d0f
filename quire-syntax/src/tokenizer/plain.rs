//! Keywords, operators and literals.

use crate::Reader;
use crate::token::{Operator, Token};
use crate::tokenizer::Tokenizer;
use crate::trivia::is_regular_character;

/// Tokenizes bare keywords: `true`, `false` and `null` become literals,
/// anything else an operator. `{` and `}` are single-byte operators.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTokenizer;

impl Tokenizer for PlainTokenizer {
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token> {
        if matches!(first, b'{' | b'}') {
            return Some(Token::Operator(Operator::new(char::from(first))));
        }

        if !is_regular_character(first) {
            return None;
        }

        let mut text = vec![first];

        while let Some(b) = r.eat(is_regular_character) {
            text.push(b);
        }

        Some(match text.as_slice() {
            b"true" => Token::Boolean(true),
            b"false" => Token::Boolean(false),
            b"null" => Token::Null,
            _ => Token::Operator(Operator::new(String::from_utf8_lossy(&text))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &[u8]) -> Option<Token> {
        let mut r = Reader::new(input);
        let first = r.read_byte()?;

        PlainTokenizer.try_tokenize(first, &mut r)
    }

    #[test]
    fn literals() {
        assert_eq!(tokenize(b"true"), Some(Token::Boolean(true)));
        assert_eq!(tokenize(b"false "), Some(Token::Boolean(false)));
        assert_eq!(tokenize(b"null/"), Some(Token::Null));
    }

    #[test]
    fn operators() {
        assert!(tokenize(b"Tj").unwrap().is_operator("Tj"));
        assert!(tokenize(b"T* ").unwrap().is_operator("T*"));
        assert!(tokenize(b"'").unwrap().is_operator("'"));
        assert!(tokenize(b"trueish").unwrap().is_operator("trueish"));
        assert!(tokenize(b"{ 1 }").unwrap().is_operator("{"));
    }

    #[test]
    fn delimiters_are_rejected() {
        assert!(tokenize(b")").is_none());
        assert!(tokenize(b">").is_none());
    }
}
