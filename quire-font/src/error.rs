//! Error types for font parsing.

use crate::truetype::Tag;
use core::fmt;

/// A specialized [`Result`] type for font parsing.
pub type Result<T> = core::result::Result<T, FontError>;

/// A font program that cannot be used at all.
///
/// Problems with optional parts of a font are logged and skipped instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    /// A required table is not in the table directory.
    MissingTable(Tag),
    /// A table ends before all of its fields could be read.
    Truncated {
        /// The table or structure being read.
        table: &'static str,
    },
    /// A `LONGDATETIME` field holds a date that cannot be represented.
    InvalidDate(i64),
    /// A structure holds a value that is not allowed.
    InvalidFormat {
        /// The table or structure being read.
        table: &'static str,
        /// What was expected.
        reason: &'static str,
    },
    /// A Type1 font has no `eexec` section.
    MissingEexec,
    /// The data does not start with a CFF header.
    NotCff,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTable(tag) => write!(f, "required table `{tag}` is missing"),
            Self::Truncated { table } => write!(f, "`{table}` ends unexpectedly"),
            Self::InvalidDate(seconds) => write!(
                f,
                "{seconds} seconds since 1904-01-01 is not a valid date"
            ),
            Self::InvalidFormat { table, reason } => {
                write!(f, "invalid `{table}`: expected {reason}")
            }
            Self::MissingEexec => f.write_str("Type1 font has no eexec section"),
            Self::NotCff => f.write_str("data is not a CFF font program"),
        }
    }
}

impl core::error::Error for FontError {}

/// A list of errors that can occur while interpreting a charstring.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutlineError {
    NoGlyph,
    ReadOutOfBounds,
    MissingEndChar,
    NestingLimitReached,
    ArgumentsStackLimitReached,
    InvalidArgumentsStackLength,
    InvalidSubroutineIndex,
    InvalidSeacCode,
}

impl fmt::Display for OutlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::NoGlyph => "glyph does not exist",
            Self::ReadOutOfBounds => "charstring ends in the middle of an operand",
            Self::MissingEndChar => "charstring has no endchar",
            Self::NestingLimitReached => "subroutine nesting is too deep",
            Self::ArgumentsStackLimitReached => "argument stack overflow",
            Self::InvalidArgumentsStackLength => "wrong number of arguments for operator",
            Self::InvalidSubroutineIndex => "subroutine does not exist",
            Self::InvalidSeacCode => "seac refers to a glyph that does not exist",
        };

        f.write_str(message)
    }
}

impl core::error::Error for OutlineError {}
