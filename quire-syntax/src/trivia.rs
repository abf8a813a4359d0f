//! Byte classes of the PDF syntax.

/// White-space bytes as defined by the PDF specification.
#[inline(always)]
pub fn is_white_space_character(b: u8) -> bool {
    matches!(b, 0x00 | 0x09 | 0x0a | 0x0c | 0x0d | 0x20)
}

/// Delimiter bytes, which end any name, number or keyword.
#[inline(always)]
pub fn is_delimiter_character(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Anything that is neither white space nor a delimiter.
#[inline(always)]
pub fn is_regular_character(b: u8) -> bool {
    !is_white_space_character(b) && !is_delimiter_character(b)
}

/// Carriage return or line feed.
#[inline(always)]
pub fn is_eol_character(b: u8) -> bool {
    matches!(b, 0x0a | 0x0d)
}

/// Bytes that may start a numeric token.
#[inline(always)]
pub(crate) fn is_numeric_start(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.')
}

/// Bytes that may continue a numeric token.
#[inline(always)]
pub(crate) fn is_numeric_continuation(b: u8) -> bool {
    is_numeric_start(b) || matches!(b, b'e' | b'E')
}

#[inline(always)]
pub(crate) fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
