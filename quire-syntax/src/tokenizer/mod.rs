//! Tokenizers, one per kind of token.
//!
//! Every tokenizer is handed the first byte of a token (already consumed by
//! the scanner) together with the cursor, and either produces a token or
//! fails with `None`. A failure is never fatal: the scanner rewinds to the
//! byte after `first` and keeps going.
//!
//! Arrays and dictionaries contain other tokens, so their tokenizers drive
//! the [`CoreTokenScanner`](crate::scanner::CoreTokenScanner) recursively
//! instead of working on the bare cursor.

use crate::Reader;
use crate::token::{ObjectIdentifier, Token};

mod array;
mod comment;
mod dict;
mod hex;
mod name;
mod number;
mod plain;
mod string;

pub use array::ArrayTokenizer;
pub use comment::{CommentTokenizer, EndOfLineTokenizer};
pub use dict::DictionaryTokenizer;
pub use hex::HexTokenizer;
pub use name::NameTokenizer;
pub use number::NumericTokenizer;
pub use plain::PlainTokenizer;
pub use string::StringTokenizer;

/// A tokenizer for one kind of token.
///
/// Custom implementations can be registered with a scanner to claim bytes
/// that would otherwise be read as plain keywords.
pub trait Tokenizer: Send + Sync {
    /// Try to read a token whose first byte `first` was just consumed from `r`.
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token>;
}

/// Replace every `n g R` sequence by an indirect reference.
pub(crate) fn collapse_references(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        if token.is_operator("R") && out.len() >= 2 {
            let len = out.len();

            if let (Token::Number(number), Token::Number(generation)) = (&out[len - 2], &out[len - 1])
                && let Some(id) = ObjectIdentifier::from_numbers(*number, *generation)
            {
                out.truncate(len - 2);
                out.push(Token::Reference(id));
                continue;
            }
        }

        out.push(token);
    }

    out
}
