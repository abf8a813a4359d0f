//! String tokens.

use crate::encoding::{decode_pdf_doc, decode_utf16};
use core::fmt;

/// The text encoding of a string, detected from its byte order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    /// No byte order mark.
    PdfDoc,
    /// Starts with `FE FF`.
    Utf16Be,
    /// Starts with `FF FE`.
    Utf16Le,
}

/// A decoded PDF string (literal or hexadecimal).
///
/// The bytes are stored exactly as decoded from the file, including a byte
/// order mark if one is present.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PdfString {
    bytes: Vec<u8>,
}

impl PdfString {
    /// Create a string from its decoded bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The decoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the string, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The encoding selected by the byte order mark.
    pub fn encoding(&self) -> StringEncoding {
        match self.bytes.as_slice() {
            [0xFE, 0xFF, ..] => StringEncoding::Utf16Be,
            [0xFF, 0xFE, ..] => StringEncoding::Utf16Le,
            _ => StringEncoding::PdfDoc,
        }
    }

    /// The string interpreted as text.
    pub fn text(&self) -> String {
        match self.encoding() {
            StringEncoding::Utf16Be => decode_utf16(&self.bytes[2..], true),
            StringEncoding::Utf16Le => decode_utf16(&self.bytes[2..], false),
            StringEncoding::PdfDoc => decode_pdf_doc(&self.bytes),
        }
    }
}

impl From<&str> for PdfString {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for PdfString {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdfString({:?})", self.text())
    }
}
