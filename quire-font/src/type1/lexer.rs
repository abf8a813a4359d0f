//! Splitting the PostScript program of a Type1 font into tokens.

use quire_common::byte::Reader;

/// Tokens are byte slices of the source. Strings are returned whole,
/// including their delimiters.
#[derive(Clone, Debug)]
pub(crate) struct Lexer<'a> {
    r: Reader<'a>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            r: Reader::new(data),
        }
    }

    /// Everything after the last token.
    pub(crate) fn tail(&self) -> &'a [u8] {
        self.r.tail()
    }

    pub(crate) fn next_token(&mut self) -> Option<&'a [u8]> {
        self.skip_whitespace_and_comments();

        let start = self.r.offset();

        match self.r.read_byte()? {
            b'(' => self.skip_literal_string(),
            b'<' => match self.r.peek_byte() {
                Some(b'<') => self.r.forward(),
                _ => {
                    self.r.forward_while(|b| b != b'>');
                    self.r.forward();
                }
            },
            b'>' => {
                self.r.eat(|b| b == b'>');
            }
            b'[' | b']' | b'{' | b'}' | b')' => {}
            b'/' => {
                // Immediately evaluated names start with `//`.
                self.r.eat(|b| b == b'/');
                self.r.forward_while(is_regular);
            }
            _ => self.r.forward_while(is_regular),
        }

        self.r.range(start..self.r.offset().min(self.r.len()))
    }

    pub(crate) fn peek_token(&self) -> Option<&'a [u8]> {
        self.clone().next_token()
    }

    pub(crate) fn next_int(&mut self) -> Option<i64> {
        parse_int(core::str::from_utf8(self.next_token()?).ok()?)
    }

    pub(crate) fn next_number(&mut self) -> Option<f32> {
        core::str::from_utf8(self.next_token()?).ok()?.parse().ok()
    }

    /// Read the binary data following an `RD` token, skipping the single
    /// space that separates them.
    pub(crate) fn read_binary(&mut self, len: usize) -> Option<&'a [u8]> {
        self.r.skip_bytes(1)?;
        self.r.read_bytes(len)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.r.forward_while(is_whitespace);

            if self.r.eat(|b| b == b'%').is_none() {
                break;
            }

            self.r.forward_while(|b| !matches!(b, b'\n' | b'\r'));
        }
    }

    fn skip_literal_string(&mut self) {
        let mut depth = 1_u32;

        while let Some(b) = self.r.read_byte() {
            match b {
                b'\\' => self.r.forward(),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;

                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Parse an integer, which may be written with a radix, like `8#40`.
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    match text.split_once('#') {
        Some((radix, digits)) => {
            let radix = radix.parse::<u32>().ok()?;

            if !(2..=36).contains(&radix) {
                return None;
            }

            i64::from_str_radix(digits, radix).ok()
        }
        None => text.parse().ok(),
    }
}

pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t' | 0x00 | 0x0C)
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(data: &[u8]) -> Vec<&[u8]> {
        let mut lexer = Lexer::new(data);
        core::iter::from_fn(|| lexer.next_token()).collect()
    }

    #[test]
    fn names_and_strings() {
        assert_eq!(
            tokens(b"/version (0(1)\\)) readonly def"),
            [&b"/version"[..], b"(0(1)\\))", b"readonly", b"def"]
        );
    }

    #[test]
    fn delimiters() {
        assert_eq!(
            tokens(b"/FontBBox{-10 -20 30 40}readonly def % bbox\n<</A<0A1B>>>[//B]"),
            [
                &b"/FontBBox"[..],
                b"{",
                b"-10",
                b"-20",
                b"30",
                b"40",
                b"}",
                b"readonly",
                b"def",
                b"<<",
                b"/A",
                b"<0A1B>",
                b">>",
                b"[",
                b"//B",
                b"]"
            ]
        );
    }

    #[test]
    fn binary_after_rd() {
        let mut lexer = Lexer::new(b"dup 5 3 RD \x01\x02\x03 NP");

        assert_eq!(lexer.next_token(), Some(&b"dup"[..]));
        assert_eq!(lexer.next_int(), Some(5));
        assert_eq!(lexer.next_int(), Some(3));
        assert_eq!(lexer.peek_token(), Some(&b"RD"[..]));
        assert_eq!(lexer.next_token(), Some(&b"RD"[..]));
        assert_eq!(lexer.read_binary(3), Some(&[1_u8, 2, 3][..]));
        assert_eq!(lexer.next_token(), Some(&b"NP"[..]));
        assert_eq!(lexer.next_token(), None);
    }

    #[test]
    fn radix_numbers() {
        assert_eq!(parse_int("8#40"), Some(32));
        assert_eq!(parse_int("16#FF"), Some(255));
        assert_eq!(parse_int("-12"), Some(-12));
        assert_eq!(parse_int("1#0"), None);
        assert_eq!(parse_int("abc"), None);
    }
}
