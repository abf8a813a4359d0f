//! Name tokens.

use crate::encoding::decode_windows_1252;
use core::borrow::Borrow;
use core::fmt;
use core::ops::Deref;

/// A PDF name, with `#XX` escapes already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// Create a name from decoded text.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create a name from decoded bytes: UTF-8 if valid, Windows-1252
    /// otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match core::str::from_utf8(bytes) {
            Ok(s) => Self(s.to_string()),
            Err(_) => Self(decode_windows_1252(bytes)),
        }
    }

    /// The name without the leading solidus.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}
