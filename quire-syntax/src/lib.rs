/*!
A low-level crate for tokenizing PDF files.

This crate splits PDF syntax into [tokens](token::Token) and rebuilds the
cross-reference information of a file, so that objects can be found by their
identifier. It does not interpret pages, fonts or any other higher-level
structure.

The main entry points are:
- [`CoreTokenScanner`](scanner::CoreTokenScanner), which turns bytes into
  tokens and can be pointed at arbitrary offsets.
- [`read_indirect_object`](object::read_indirect_object), which reads an
  `n g obj ... endobj` block, including stream data.
- [`read_cross_reference_table`](xref::read_cross_reference_table), which
  follows the `startxref` pointer and the `Prev` chain of a file and merges
  all sections into one table.

Every entry point takes [`ScannerOptions`](scanner::ScannerOptions). In
lenient mode, malformed input is repaired where possible and reported
through the `log` crate instead of failing.

# Example
```
use quire_syntax::scanner::{CoreTokenScanner, ScannerOptions, TokenScanner};
use quire_syntax::token::Token;

let mut scanner = CoreTokenScanner::new(b"[1 0 R /Name]", ScannerOptions::default());
scanner.move_next().unwrap();

let Some(Token::Array(items)) = scanner.current_token() else {
    panic!("expected an array");
};

assert_eq!(items.len(), 2);
```
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use log::warn;

mod encoding;
mod filter;

pub mod error;
pub mod keys;
pub mod object;
pub mod scanner;
pub mod token;
pub mod tokenizer;
pub mod trivia;
pub mod write;
pub mod xref;

pub use error::{Error, Result};
pub use quire_common::byte::Reader;

pub(crate) trait OptionLog {
    fn warn_none(self, f: &str) -> Self;
}

impl<T> OptionLog for Option<T> {
    #[inline]
    fn warn_none(self, f: &str) -> Self {
        self.or_else(|| {
            warn!("{f}");

            None
        })
    }
}
