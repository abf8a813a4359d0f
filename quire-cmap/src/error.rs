//! Error types for CMap parsing.

use core::fmt;

/// A specialized [`Result`] type for CMap parsing.
pub type Result<T> = core::result::Result<T, CMapError>;

/// A CMap that cannot be parsed.
///
/// In lenient mode only scanner errors and [`CMapError::NestingTooDeep`]
/// from the top level are returned; everything else is logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CMapError {
    /// The token scanner failed.
    Syntax(quire_syntax::Error),
    /// `usecmap` names a CMap that is neither embedded nor known to the
    /// resolver.
    MissingResource(String),
    /// `usecmap` references are nested too deeply, or form a cycle.
    NestingTooDeep,
    /// An entry of a mapping block is malformed.
    InvalidEntry {
        /// The block being read, like `bfrange`.
        block: &'static str,
        /// What was expected.
        reason: &'static str,
    },
}

impl fmt::Display for CMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "malformed CMap syntax: {e}"),
            Self::MissingResource(name) => write!(f, "CMap `{name}` could not be found"),
            Self::NestingTooDeep => f.write_str("usecmap references are nested too deeply"),
            Self::InvalidEntry { block, reason } => {
                write!(f, "invalid `{block}` entry: expected {reason}")
            }
        }
    }
}

impl core::error::Error for CMapError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quire_syntax::Error> for CMapError {
    fn from(e: quire_syntax::Error) -> Self {
        Self::Syntax(e)
    }
}
