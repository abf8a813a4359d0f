//! Indirect objects and streams.

use crate::error::{Error, Result};
use crate::filter;
use crate::keys::LENGTH;
use crate::scanner::{CoreTokenScanner, ScannerOptions, SeekableTokenScanner, TokenScanner};
use crate::token::{Dictionary, ObjectIdentifier, Token};
use crate::tokenizer::collapse_references;
use crate::trivia::is_white_space_character;
use log::warn;
use memchr::memmem;

/// A stream: a dictionary followed by raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// The stream dictionary.
    pub dictionary: Dictionary,
    /// The raw, still encoded, stream data.
    pub data: Vec<u8>,
}

impl Stream {
    /// The stream data with all supported filters applied.
    pub fn decoded(&self) -> Option<Vec<u8>> {
        filter::decode(&self.data, &self.dictionary)
    }
}

/// The value of an indirect object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectValue {
    /// Any non-stream value.
    Token(Token),
    /// A stream.
    Stream(Stream),
}

impl ObjectValue {
    /// The dictionary of a dictionary or stream object.
    pub fn dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Token(t) => t.as_dictionary(),
            Self::Stream(s) => Some(&s.dictionary),
        }
    }
}

/// An `n g obj ... endobj` block.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    /// The object identifier from the header.
    pub id: ObjectIdentifier,
    /// The object's value.
    pub value: ObjectValue,
    /// The offset of the object header.
    pub offset: usize,
}

/// Read the indirect object whose header starts at `offset`.
pub fn read_indirect_object(
    data: &[u8],
    offset: usize,
    options: ScannerOptions,
) -> Result<IndirectObject> {
    let invalid = |reason| Error::InvalidObject { offset, reason };
    let mut scanner = CoreTokenScanner::new_at(data, offset, options);

    let number = scanner.try_read_token().map_err(|_| invalid("object number"))?;
    let generation = scanner.try_read_token().map_err(|_| invalid("generation number"))?;

    let id = match (number, generation) {
        (Some(n), Some(g)) => ObjectIdentifier::from_numbers(n, g),
        _ => None,
    }
    .ok_or(invalid("object header"))?;

    if !scanner.move_next()? || !scanner.current_token().is_some_and(|t| t.is_operator("obj")) {
        return Err(invalid("`obj` keyword"));
    }

    let mut tokens = Vec::new();

    let terminator = loop {
        if !scanner.move_next()? {
            break None;
        }

        match scanner.take_current() {
            Some(t) if t.is_operator("endobj") => break Some(false),
            Some(t) if t.is_operator("stream") => break Some(true),
            // Objects missing their `endobj` run into the next object.
            Some(t) if t.is_operator("obj") && options.lenient => {
                warn!("object {id} at offset {offset} has no endobj");
                tokens.truncate(tokens.len().saturating_sub(2));
                break Some(false);
            }
            Some(Token::Comment(_)) | None => {}
            Some(t) => tokens.push(t),
        }
    };

    let mut tokens = collapse_references(tokens);

    let value = match terminator {
        Some(true) => {
            let Some(Token::Dictionary(dictionary)) = tokens.pop() else {
                return Err(invalid("stream dictionary"));
            };

            let data = read_stream_data(data, scanner.current_position(), &dictionary, options)
                .ok_or(invalid("endstream keyword"))?;

            ObjectValue::Stream(Stream { dictionary, data })
        }
        Some(false) | None => {
            if terminator.is_none() && !options.lenient {
                return Err(invalid("endobj keyword"));
            }

            if tokens.len() > 1 {
                warn!("object {id} at offset {offset} has {} values, using the first", tokens.len());
            }

            ObjectValue::Token(tokens.into_iter().next().unwrap_or(Token::Null))
        }
    };

    Ok(IndirectObject { id, value, offset })
}

/// Read stream data starting right after the `stream` keyword.
fn read_stream_data(
    data: &[u8],
    mut start: usize,
    dictionary: &Dictionary,
    options: ScannerOptions,
) -> Option<Vec<u8>> {
    match data.get(start..).unwrap_or_default() {
        [b'\r', b'\n', ..] => start += 2,
        [b'\n', ..] => start += 1,
        [b'\r', ..] if options.lenient => start += 1,
        _ => {}
    }

    if let Some(length) = dictionary.get_usize(LENGTH)
        && let Some(end) = start.checked_add(length)
        && let Some(following) = data.get(end..)
    {
        let rest = following
            .iter()
            .position(|b| !is_white_space_character(*b))
            .map(|p| &following[p..]);

        if rest.is_some_and(|r| r.starts_with(b"endstream")) {
            return Some(data[start..end].to_vec());
        }
    }

    // The length is indirect or wrong, search for the end instead.
    let end = start + memmem::find(data.get(start..)?, b"endstream")?;
    let mut content = &data[start..end];

    if let Some(stripped) = content.strip_suffix(b"\r\n") {
        content = stripped;
    } else if let Some(stripped) = content
        .strip_suffix(b"\n")
        .or_else(|| content.strip_suffix(b"\r"))
    {
        content = stripped;
    }

    Some(content.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Number;

    #[test]
    fn plain_object() {
        let data = b"garbage 3 0 obj\n<< /Type /Pages /Kids [4 0 R] >>\nendobj\n";
        let obj = read_indirect_object(data, 8, ScannerOptions::default()).unwrap();

        assert_eq!(obj.id, ObjectIdentifier::new(3, 0));
        let dict = obj.value.dictionary().unwrap();
        assert_eq!(dict.get_array("Kids").unwrap()[0], Token::Reference(ObjectIdentifier::new(4, 0)));
    }

    #[test]
    fn reference_value() {
        let obj = read_indirect_object(b"5 1 obj 7 0 R endobj", 0, ScannerOptions::default()).unwrap();

        assert_eq!(obj.id, ObjectIdentifier::new(5, 1));
        assert_eq!(obj.value, ObjectValue::Token(Token::Reference(ObjectIdentifier::new(7, 0))));
    }

    #[test]
    fn stream_with_length() {
        let data = b"1 0 obj << /Length 5 >> stream\r\nab\ncd\nendstream endobj";
        let obj = read_indirect_object(data, 0, ScannerOptions::default()).unwrap();

        let ObjectValue::Stream(stream) = obj.value else {
            panic!("expected a stream");
        };
        assert_eq!(stream.data, b"ab\ncd");
        assert_eq!(stream.dictionary.get_number("Length"), Some(Number::Integer(5)));
    }

    #[test]
    fn stream_with_wrong_length() {
        let data = b"1 0 obj << /Length 2 >> stream\nabcdef\nendstream endobj";
        let obj = read_indirect_object(data, 0, ScannerOptions::default()).unwrap();

        let ObjectValue::Stream(stream) = obj.value else {
            panic!("expected a stream");
        };
        assert_eq!(stream.data, b"abcdef");
    }

    #[test]
    fn missing_endobj() {
        let data = b"1 0 obj 42\n2 0 obj 43 endobj";

        let obj = read_indirect_object(data, 0, ScannerOptions::lenient(true)).unwrap();
        assert_eq!(obj.value, ObjectValue::Token(Token::Number(Number::Integer(42))));

        assert!(read_indirect_object(b"1 0 obj 42", 0, ScannerOptions::default()).is_err());
    }

    #[test]
    fn not_an_object() {
        let err = read_indirect_object(b"xref\n0 1", 0, ScannerOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidObject { offset: 0, .. }));
    }
}
