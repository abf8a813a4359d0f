//! Writing tokens back out as PDF syntax.

use crate::token::{Dictionary, Name, Number, PdfString, Token};
use crate::trivia::is_regular_character;

/// Append the PDF syntax for `token` to `out`.
///
/// Reading the output back with a scanner yields an equal token. Comments
/// are terminated with a line feed so that following tokens stay separate.
pub fn write_token(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::Boolean(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        Token::Null => out.extend_from_slice(b"null"),
        Token::Number(n) => write_number(n, out),
        Token::Name(n) => write_name(n, out),
        Token::String(s) => write_literal_string(s, out),
        Token::HexString(s) => write_hex_string(s, out),
        Token::Array(items) => {
            out.push(b'[');

            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }

                write_token(item, out);
            }

            out.push(b']');
        }
        Token::Dictionary(dict) => write_dictionary(dict, out),
        Token::Reference(id) => out.extend_from_slice(format!("{} {} R", id.number, id.generation).as_bytes()),
        Token::Operator(op) => out.extend_from_slice(op.as_str().as_bytes()),
        Token::Comment(text) => {
            out.push(b'%');
            out.extend_from_slice(text);
            out.push(b'\n');
        }
        Token::EndOfLine => out.push(b'\n'),
        Token::InlineImageData(data) => out.extend_from_slice(data),
    }
}

impl Token {
    /// The PDF syntax for this token.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_token(self, &mut out);
        out
    }
}

fn write_number(number: &Number, out: &mut Vec<u8>) {
    out.extend_from_slice(number.to_string().as_bytes());

    // Keep reals real, `4` would read back as an integer.
    if let Number::Real(d) = number
        && d.scale() == 0
    {
        out.extend_from_slice(b".0");
    }
}

fn write_name(name: &Name, out: &mut Vec<u8>) {
    out.push(b'/');

    for b in name.as_str().bytes() {
        if b == b'#' || !(0x21..=0x7E).contains(&b) || !is_regular_character(b) {
            out.extend_from_slice(format!("#{b:02X}").as_bytes());
        } else {
            out.push(b);
        }
    }
}

fn write_literal_string(string: &PdfString, out: &mut Vec<u8>) {
    out.push(b'(');

    for b in string.as_bytes().iter().copied() {
        match b {
            b'(' | b')' | b'\\' => out.extend_from_slice(&[b'\\', b]),
            // A bare CR would be read back as a line feed.
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }

    out.push(b')');
}

fn write_hex_string(string: &PdfString, out: &mut Vec<u8>) {
    out.push(b'<');

    for b in string.as_bytes() {
        out.extend_from_slice(format!("{b:02X}").as_bytes());
    }

    out.push(b'>');
}

fn write_dictionary(dict: &Dictionary, out: &mut Vec<u8>) {
    out.extend_from_slice(b"<<");

    for (key, value) in dict.iter() {
        out.push(b' ');
        write_name(key, out);
        out.push(b' ');
        write_token(value, out);
    }

    out.extend_from_slice(b" >>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{CoreTokenScanner, ScannerOptions, TokenScanner};
    use crate::token::{Decimal, ObjectIdentifier, Operator};

    fn reread(bytes: &[u8]) -> Token {
        let mut scanner = CoreTokenScanner::new(bytes, ScannerOptions::default());
        assert!(scanner.move_next().unwrap());
        scanner.take_current().unwrap()
    }

    #[test]
    fn simple_tokens() {
        assert_eq!(Token::Boolean(true).to_bytes(), b"true");
        assert_eq!(Token::Null.to_bytes(), b"null");
        assert_eq!(Token::Number(Number::Integer(-3)).to_bytes(), b"-3");
        assert_eq!(
            Token::Number(Number::Real(Decimal::new(-5, 2).unwrap())).to_bytes(),
            b"-0.05"
        );
        assert_eq!(
            Token::Reference(ObjectIdentifier::new(12, 1)).to_bytes(),
            b"12 1 R"
        );
        assert_eq!(Token::Operator(Operator::new("Tj")).to_bytes(), b"Tj");
    }

    #[test]
    fn whole_reals_stay_real() {
        let token = Token::Number(Number::Real(Decimal::from_integer(4)));

        assert_eq!(token.to_bytes(), b"4.0");
        assert!(!reread(&token.to_bytes()).as_number().unwrap().is_integer());
    }

    #[test]
    fn name_escapes() {
        let name = Token::Name(Name::new("A B#(x)/é"));
        let bytes = name.to_bytes();

        assert_eq!(bytes, b"/A#20B#23#28x#29#2F#C3#A9");
        assert_eq!(reread(&bytes), name);
    }

    #[test]
    fn string_escapes() {
        let string = Token::String(PdfString::new(b"a(b)\\c\r\nd".to_vec()));
        let bytes = string.to_bytes();

        assert_eq!(bytes, b"(a\\(b\\)\\\\c\\r\nd)");
        assert_eq!(reread(&bytes), string);
    }

    #[test]
    fn hex_string() {
        let string = Token::HexString(PdfString::new(vec![0xFE, 0xFF, 0x00, 0x41]));

        assert_eq!(string.to_bytes(), b"<FEFF0041>");
        assert_eq!(reread(&string.to_bytes()), string);
    }

    #[test]
    fn containers_keep_order() {
        let mut inner = Dictionary::new();
        inner.insert("Name", Token::String(PdfString::from("Glorp")));

        let mut dict = Dictionary::new();
        dict.insert("Count", Token::Number(Number::Integer(12)));
        dict.insert("Definition", Token::Dictionary(inner));
        dict.insert(
            "Kids",
            Token::Array(vec![
                Token::Reference(ObjectIdentifier::new(4, 0)),
                Token::Name(Name::new("F1")),
            ]),
        );

        let token = Token::Dictionary(dict);
        let bytes = token.to_bytes();

        assert_eq!(
            bytes,
            b"<< /Count 12 /Definition << /Name (Glorp) >> /Kids [4 0 R /F1] >>".as_slice()
        );
        assert_eq!(reread(&bytes), token);
    }

    #[test]
    fn comment_is_terminated() {
        assert_eq!(Token::Comment(b"PDF-1.7".to_vec()).to_bytes(), b"%PDF-1.7\n");
    }
}
