//! Error types for scanning PDF files.

use crate::scanner::ScannerScope;
use core::fmt;

/// A specialized [`Result`] type for PDF syntax operations.
pub type Result<T> = core::result::Result<T, Error>;

/// A structural violation that cannot be recovered from locally.
///
/// Plain tokenization failures never show up here: the scanner skips the
/// offending byte and keeps going. The variants below are only produced when
/// parsing is not lenient, or when no sensible fallback exists at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Inline image data started at `offset` but no `EI` terminator was found.
    UnterminatedInlineImage {
        /// The offset of the first byte of image data.
        offset: usize,
    },
    /// An `EI` recovery was requested at `offset`, but the bytes there are
    /// something else.
    InvalidEndImage {
        /// The offset the recovery started from.
        offset: usize,
        /// The bytes that were actually found.
        found: Vec<u8>,
    },
    /// A closing delimiter appeared that does not match the current scope.
    UnexpectedDelimiter {
        /// The offset of the delimiter.
        offset: usize,
        /// The delimiter that was found.
        delimiter: &'static str,
        /// The scope the scanner was in.
        scope: ScannerScope,
    },
    /// The trailer has no `Root` entry.
    MissingRoot,
    /// No `startxref` keyword could be located.
    MissingStartXref,
    /// A cross-reference section is malformed or missing.
    InvalidCrossReference {
        /// The offset of the section.
        offset: usize,
        /// What was expected.
        reason: &'static str,
    },
    /// An indirect object is malformed.
    InvalidObject {
        /// The offset of the object.
        offset: usize,
        /// What was expected.
        reason: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedInlineImage { offset } => write!(
                f,
                "expected `EI` after inline image data starting at offset {offset}, found end of input"
            ),
            Self::InvalidEndImage { offset, found } => write!(
                f,
                "expected `EI` at offset {offset}, found {:?}",
                String::from_utf8_lossy(found)
            ),
            Self::UnexpectedDelimiter {
                offset,
                delimiter,
                scope,
            } => write!(
                f,
                "unexpected `{delimiter}` at offset {offset} while scanning in {scope:?} scope"
            ),
            Self::MissingRoot => f.write_str("trailer dictionary has no Root entry"),
            Self::MissingStartXref => f.write_str("no startxref keyword found"),
            Self::InvalidCrossReference { offset, reason } => {
                write!(f, "invalid cross-reference section at offset {offset}: expected {reason}")
            }
            Self::InvalidObject { offset, reason } => {
                write!(f, "invalid object at offset {offset}: expected {reason}")
            }
        }
    }
}

impl core::error::Error for Error {}
