//! Numbers.

use crate::Reader;
use crate::token::{Number, Token};
use crate::tokenizer::Tokenizer;
use crate::trivia::{is_numeric_continuation, is_numeric_start};
use smallvec::SmallVec;

/// Tokenizes integer and real numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericTokenizer;

impl Tokenizer for NumericTokenizer {
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token> {
        if !is_numeric_start(first) {
            return None;
        }

        let mut text: SmallVec<[u8; 16]> = SmallVec::new();
        text.push(first);

        while let Some(b) = r.eat(is_numeric_continuation) {
            text.push(b);
        }

        Number::parse(&text).map(Token::Number)
    }
}
