//! Comments and line breaks.

use crate::Reader;
use crate::token::Token;
use crate::tokenizer::Tokenizer;
use crate::trivia::is_eol_character;

/// Tokenizes `%` comments up to the end of the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentTokenizer;

impl Tokenizer for CommentTokenizer {
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token> {
        if first != b'%' {
            return None;
        }

        let start = r.offset();
        r.forward_while(|b| !is_eol_character(b));
        let text = r.range(start..r.offset())?;

        Some(Token::Comment(text.to_vec()))
    }
}

/// Tokenizes a line break. `\r\n` is a single line break.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndOfLineTokenizer;

impl Tokenizer for EndOfLineTokenizer {
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token> {
        match first {
            b'\r' => {
                r.eat(|b| b == b'\n');
                Some(Token::EndOfLine)
            }
            b'\n' => Some(Token::EndOfLine),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_runs_to_line_end() {
        let mut r = Reader::new(b"%PDF-1.7\r\n1 0 obj");
        r.read_byte();
        assert_eq!(
            CommentTokenizer.try_tokenize(b'%', &mut r),
            Some(Token::Comment(b"PDF-1.7".to_vec()))
        );
        assert_eq!(r.tail(), b"\r\n1 0 obj");
    }

    #[test]
    fn crlf_is_one_line_break() {
        let mut r = Reader::new(b"\r\n\n");
        r.read_byte();
        assert_eq!(EndOfLineTokenizer.try_tokenize(b'\r', &mut r), Some(Token::EndOfLine));
        assert_eq!(r.tail(), b"\n");
        assert!(EndOfLineTokenizer.try_tokenize(b' ', &mut r).is_none());
    }
}
