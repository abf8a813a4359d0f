//! Tokens of the PDF syntax.

use core::fmt;

pub mod dict;
pub mod name;
pub mod number;
pub mod string;

pub use dict::Dictionary;
pub use name::Name;
pub use number::{Decimal, Number};
pub use string::{PdfString, StringEncoding};

/// The identifier of an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier {
    /// The object number.
    pub number: u32,
    /// The generation number.
    pub generation: u16,
}

impl ObjectIdentifier {
    /// Create a new identifier.
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    /// Create an identifier from the two integers preceding `R` or `obj`.
    pub fn from_numbers(number: Number, generation: Number) -> Option<Self> {
        match (number, generation) {
            (Number::Integer(n), Number::Integer(g)) => {
                Some(Self::new(u32::try_from(n).ok()?, u16::try_from(g).ok()?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.generation)
    }
}

/// A keyword that is not a literal, such as a content stream operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator(String);

impl Operator {
    /// Create an operator from its text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The operator text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Operator {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Operator {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One lexical unit of the PDF syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// An integer or real number.
    Number(Number),
    /// A name.
    Name(Name),
    /// A literal string.
    String(PdfString),
    /// A hexadecimal string.
    HexString(PdfString),
    /// An array.
    Array(Vec<Token>),
    /// A dictionary.
    Dictionary(Dictionary),
    /// An indirect reference `n g R`.
    Reference(ObjectIdentifier),
    /// A bare keyword.
    Operator(Operator),
    /// A comment, without the leading `%`.
    Comment(Vec<u8>),
    /// A line break, only produced when the scanner is asked for them.
    EndOfLine,
    /// The raw payload of an inline image.
    InlineImageData(Vec<u8>),
}

impl Token {
    /// Returns the name if this is a name token.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the number if this is a numeric token.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value of an integer token.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(Number::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string if this is a literal or hexadecimal string.
    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            Self::String(s) | Self::HexString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is an array.
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the dictionary if this is a dictionary token.
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the identifier if this is an indirect reference.
    pub fn as_reference(&self) -> Option<ObjectIdentifier> {
        match self {
            Self::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the operator if this is a keyword.
    pub fn as_operator(&self) -> Option<&Operator> {
        match self {
            Self::Operator(o) => Some(o),
            _ => None,
        }
    }

    /// Whether this is the operator `op`.
    pub fn is_operator(&self, op: &str) -> bool {
        self.as_operator().is_some_and(|o| o.as_str() == op)
    }
}

macro_rules! token {
    ($t:ty, $s:ident) => {
        impl TryFrom<Token> for $t {
            type Error = ();

            fn try_from(value: Token) -> Result<Self, Self::Error> {
                match value {
                    Token::$s(v) => Ok(v),
                    _ => Err(()),
                }
            }
        }

        impl From<$t> for Token {
            fn from(value: $t) -> Self {
                Self::$s(value)
            }
        }
    };
}

token!(bool, Boolean);
token!(Number, Number);
token!(Name, Name);
token!(Vec<Token>, Array);
token!(Dictionary, Dictionary);
token!(ObjectIdentifier, Reference);
token!(Operator, Operator);

impl TryFrom<Token> for PdfString {
    type Error = ();

    fn try_from(value: Token) -> Result<Self, Self::Error> {
        match value {
            Token::String(s) | Token::HexString(s) => Ok(s),
            _ => Err(()),
        }
    }
}

impl TryFrom<Token> for i64 {
    type Error = ();

    fn try_from(value: Token) -> Result<Self, Self::Error> {
        value.as_integer().ok_or(())
    }
}
