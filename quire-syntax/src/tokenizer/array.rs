//! Arrays.

use crate::error::Result;
use crate::scanner::{CoreTokenScanner, ScannerScope};
use crate::token::Token;
use crate::tokenizer::collapse_references;

/// Tokenizes `[...]` arrays by scanning nested tokens until the matching `]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayTokenizer;

impl ArrayTokenizer {
    /// Try to read an array whose opening byte `first` was just consumed.
    ///
    /// Returns `Ok(None)` if `first` is not `[` or the input ends before the
    /// array is closed.
    pub fn try_tokenize(
        &self,
        first: u8,
        scanner: &mut CoreTokenScanner<'_>,
    ) -> Result<Option<Token>> {
        if first != b'[' {
            return Ok(None);
        }

        let Some(tokens) = scanner.scan_scope(ScannerScope::Array)? else {
            return Ok(None);
        };

        Ok(Some(Token::Array(collapse_references(tokens))))
    }
}
