//! Hexadecimal strings.

use crate::Reader;
use crate::token::{PdfString, Token};
use crate::tokenizer::Tokenizer;
use crate::trivia::{hex_value, is_white_space_character};

/// Tokenizes `<...>` hexadecimal strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexTokenizer;

impl Tokenizer for HexTokenizer {
    fn try_tokenize(&self, first: u8, r: &mut Reader<'_>) -> Option<Token> {
        if first != b'<' {
            return None;
        }

        let mut out = Vec::new();
        let mut high = None;

        loop {
            let b = r.read_byte()?;

            if b == b'>' {
                break;
            }

            if is_white_space_character(b) {
                continue;
            }

            let nibble = hex_value(b)?;

            match high.take() {
                Some(h) => out.push((h << 4) | nibble),
                None => high = Some(nibble),
            }
        }

        // An odd final digit behaves as if followed by `0`.
        if let Some(h) = high {
            out.push(h << 4);
        }

        Some(Token::HexString(PdfString::new(out)))
    }
}
