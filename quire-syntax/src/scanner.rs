//! The token scanner.

use crate::Reader;
use crate::error::{Error, Result};
use crate::token::{Name, Operator, Token};
use crate::tokenizer::{
    ArrayTokenizer, CommentTokenizer, DictionaryTokenizer, EndOfLineTokenizer, HexTokenizer,
    NameTokenizer, NumericTokenizer, PlainTokenizer, StringTokenizer, Tokenizer,
};
use crate::trivia::{is_eol_character, is_numeric_start, is_white_space_character};
use log::warn;
use memchr::memmem;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

/// The structure the scanner is currently inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerScope {
    /// Top level.
    #[default]
    None,
    /// Inside `[...]`.
    Array,
    /// Inside `<<...>>`.
    Dictionary,
}

/// Options fixed for the lifetime of a scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScannerOptions {
    /// Substitute defaults and warnings for hard format errors.
    pub lenient: bool,
    /// Produce [`Token::EndOfLine`] for line breaks instead of skipping them.
    pub end_of_line_tokens: bool,
}

impl ScannerOptions {
    /// Options with the given leniency.
    pub fn lenient(lenient: bool) -> Self {
        Self {
            lenient,
            ..Self::default()
        }
    }
}

/// Keys that must be present in dictionaries introduced by a given name.
///
/// When a dictionary directly follows one of the names in the schema, it is
/// read with [`DictionaryTokenizer::with_required_keys`].
#[derive(Debug, Clone, Default)]
pub struct DictionarySchema {
    required: FxHashMap<Name, Vec<Name>>,
}

impl DictionarySchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema used for CMap files.
    pub fn cid_system_info() -> Self {
        Self::new().with(
            "CIDSystemInfo",
            &["Registry", "Ordering", "Supplement"],
        )
    }

    /// Add the required keys for dictionaries following `name`.
    pub fn with(mut self, name: &str, keys: &[&str]) -> Self {
        self.required
            .insert(Name::new(name), keys.iter().map(|k| Name::new(*k)).collect());
        self
    }

    /// The required keys for dictionaries following `name`.
    pub fn required_keys(&self, name: &str) -> Option<&[Name]> {
        self.required.get(name).map(Vec::as_slice)
    }
}

/// A source of tokens.
pub trait TokenScanner {
    /// Advance to the next token.
    ///
    /// Returns `Ok(false)` at the end of the input or when the current
    /// nested scope is closed.
    fn move_next(&mut self) -> Result<bool>;

    /// The token produced by the last successful [`TokenScanner::move_next`].
    fn current_token(&self) -> Option<&Token>;

    /// Advance and return the next token if it converts to `T`.
    fn try_read_token<T>(&mut self) -> Result<Option<T>>
    where
        T: TryFrom<Token>,
        Self: Sized,
    {
        if !self.move_next()? {
            return Ok(None);
        }

        Ok(self.current_token().cloned().and_then(|t| T::try_from(t).ok()))
    }
}

/// A token source that can jump around in its input.
pub trait SeekableTokenScanner: TokenScanner {
    /// Continue scanning from an absolute offset.
    fn seek(&mut self, position: usize);

    /// The current absolute offset.
    fn current_position(&self) -> usize;

    /// The length of the input.
    fn length(&self) -> usize;

    /// Let `tokenizer` handle keywords starting with `first`.
    fn register_custom_tokenizer(&mut self, first: u8, tokenizer: Arc<dyn Tokenizer>);

    /// Remove a tokenizer added with
    /// [`SeekableTokenScanner::register_custom_tokenizer`].
    fn deregister_custom_tokenizer(&mut self, tokenizer: &Arc<dyn Tokenizer>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineImage {
    Inactive,
    /// After `BI`, reading the image dictionary.
    Dictionary,
    /// After `ID`, the next token is the raw image data.
    Data,
    /// The next token is the synthesized `EI`.
    End,
}

/// The number of bytes after a candidate `EI` that are inspected.
const END_IMAGE_LOOKAHEAD: usize = 6;

/// Splits PDF syntax into tokens.
///
/// Bytes that no tokenizer accepts are skipped one at a time, so garbage
/// between objects never aborts a scan.
pub struct CoreTokenScanner<'a> {
    reader: Reader<'a>,
    options: ScannerOptions,
    schema: DictionarySchema,
    custom: SmallVec<[(u8, Arc<dyn Tokenizer>); 2]>,
    scopes: Vec<ScannerScope>,
    scope_closed: bool,
    current: Option<Token>,
    previous_name: Option<Name>,
    inline_image: InlineImage,
    last_end_image: Option<usize>,
}

impl<'a> CoreTokenScanner<'a> {
    /// Create a scanner at the start of `data`.
    pub fn new(data: &'a [u8], options: ScannerOptions) -> Self {
        Self {
            reader: Reader::new(data),
            options,
            schema: DictionarySchema::new(),
            custom: SmallVec::new(),
            scopes: Vec::new(),
            scope_closed: false,
            current: None,
            previous_name: None,
            inline_image: InlineImage::Inactive,
            last_end_image: None,
        }
    }

    /// Create a scanner at `offset`.
    pub fn new_at(data: &'a [u8], offset: usize, options: ScannerOptions) -> Self {
        let mut scanner = Self::new(data, options);
        scanner.reader.jump(offset);
        scanner
    }

    /// Use `schema` for dictionaries that follow a known name.
    pub fn with_schema(mut self, schema: DictionarySchema) -> Self {
        self.schema = schema;
        self
    }

    /// The options of the scanner.
    pub fn options(&self) -> ScannerOptions {
        self.options
    }

    /// The current scope.
    pub fn scope(&self) -> ScannerScope {
        self.scopes.last().copied().unwrap_or_default()
    }

    /// Take ownership of the current token.
    pub fn take_current(&mut self) -> Option<Token> {
        self.current.take()
    }

    /// The offset of the last `EI` that ended inline image data.
    pub fn last_end_image_offset(&self) -> Option<usize> {
        self.last_end_image
    }

    pub(crate) fn reader_mut(&mut self) -> &mut Reader<'a> {
        &mut self.reader
    }

    /// Collect the tokens of a nested scope up to its closing delimiter.
    ///
    /// Returns `Ok(None)` if the input ends before the scope is closed.
    pub(crate) fn scan_scope(&mut self, scope: ScannerScope) -> Result<Option<Vec<Token>>> {
        self.scopes.push(scope);
        let previous_name = self.previous_name.take();
        let mut tokens = Vec::new();

        let result = loop {
            match self.move_next() {
                Ok(true) => match self.current.take() {
                    Some(Token::Comment(_) | Token::EndOfLine) | None => {}
                    Some(token) => tokens.push(token),
                },
                Ok(false) => break Ok(self.scope_closed.then_some(tokens)),
                Err(e) => break Err(e),
            }
        };

        self.scopes.pop();
        self.scope_closed = false;
        self.previous_name = previous_name;

        result
    }

    /// Re-read inline image data after a caller determined that the `EI` at
    /// `end_image_offset` was part of the image rather than its end.
    ///
    /// Returns the continuation of the image data, starting with the two
    /// bytes of the misidentified `EI`. The next token is the real `EI`.
    pub fn recover_from_incorrect_end_image(&mut self, end_image_offset: usize) -> Result<Vec<u8>> {
        self.reader.jump(end_image_offset);

        let found = self.reader.peek_up_to(2);

        if found != b"EI" {
            return Err(Error::InvalidEndImage {
                offset: end_image_offset,
                found: found.to_vec(),
            });
        }

        self.reader.skip_bytes(2);

        let mut data = b"EI".to_vec();
        data.extend(self.read_inline_image_data()?);
        self.inline_image = InlineImage::End;

        Ok(data)
    }

    fn set_current(&mut self, token: Token) -> bool {
        self.previous_name = match &token {
            Token::Name(n) => Some(n.clone()),
            _ => None,
        };

        if let Token::Operator(op) = &token {
            match op.as_str() {
                "BI" => self.inline_image = InlineImage::Dictionary,
                "ID" if self.inline_image == InlineImage::Dictionary => {
                    self.inline_image = InlineImage::Data;
                }
                _ => {}
            }
        }

        self.current = Some(token);

        true
    }

    /// Handle `]` or `>>`. Returns `true` if the current scope ends here.
    fn close_scope(&mut self, kind: ScannerScope, delimiter: &'static str, offset: usize) -> Result<bool> {
        let scope = self.scope();

        if scope == kind {
            self.scope_closed = true;
            return Ok(true);
        }

        if scope == ScannerScope::None {
            return Ok(false);
        }

        if !self.options.lenient {
            return Err(Error::UnexpectedDelimiter {
                offset,
                delimiter,
                scope,
            });
        }

        warn!("unexpected `{delimiter}` at offset {offset} in {scope:?} scope");

        if self.scopes.contains(&kind) {
            // The delimiter closes an enclosing scope, so end this one and
            // let the enclosing one see it again.
            self.reader.jump(offset);
            self.scope_closed = true;
            return Ok(true);
        }

        Ok(false)
    }

    fn custom_tokenizer(&self, first: u8) -> Option<Arc<dyn Tokenizer>> {
        self.custom
            .iter()
            .rev()
            .find(|(b, _)| *b == first)
            .map(|(_, t)| t.clone())
    }

    fn read_dictionary(&mut self, first: u8) -> Result<Option<Token>> {
        let required = self
            .previous_name
            .as_ref()
            .and_then(|n| self.schema.required_keys(n))
            .map(<[Name]>::to_vec)
            .unwrap_or_default();

        DictionaryTokenizer::with_required_keys(&required).try_tokenize(first, self)
    }

    /// Capture raw bytes up to the next `EI` that looks like a real end of
    /// image.
    fn read_inline_image_data(&mut self) -> Result<Vec<u8>> {
        let data = self.reader.data();
        let start = self.reader.offset().min(data.len());
        let finder = memmem::Finder::new(b"EI");
        let mut search_from = start;

        while let Some(pos) = finder.find(&data[search_from..]).map(|p| p + search_from) {
            self.reader.jump(pos + 2);

            if self.is_end_image() {
                self.last_end_image = Some(pos);
                return Ok(data[start..pos].to_vec());
            }

            search_from = pos + 1;
        }

        if self.options.lenient {
            warn!("inline image data starting at offset {start} has no end, using rest of input");
            self.reader.jump_to_end();
            self.last_end_image = None;

            return Ok(data[start..].to_vec());
        }

        Err(Error::UnterminatedInlineImage { offset: start })
    }

    /// Whether the bytes following an `EI` look like content rather than
    /// more binary image data.
    fn is_end_image(&self) -> bool {
        let following = self.reader.peek_up_to(END_IMAGE_LOOKAHEAD);

        if following.is_empty() {
            return true;
        }

        let mut has_white_space = false;

        for b in following.iter().copied() {
            if b > 0x7F || (b < 0x20 && !matches!(b, b'\r' | b'\n' | b'\t')) {
                return false;
            }

            has_white_space |= is_white_space_character(b);
        }

        has_white_space
    }
}

impl TokenScanner for CoreTokenScanner<'_> {
    fn move_next(&mut self) -> Result<bool> {
        match self.inline_image {
            InlineImage::Data => {
                // A single white-space byte separates `ID` from the data.
                self.reader.eat(is_white_space_character);
                let data = self.read_inline_image_data()?;
                self.inline_image = InlineImage::End;

                return Ok(self.set_current(Token::InlineImageData(data)));
            }
            InlineImage::End => {
                self.inline_image = InlineImage::Inactive;

                return Ok(self.set_current(Token::Operator(Operator::new("EI"))));
            }
            InlineImage::Inactive | InlineImage::Dictionary => {}
        }

        self.scope_closed = false;

        loop {
            let start = self.reader.offset();

            let Some(first) = self.reader.read_byte() else {
                self.current = None;
                return Ok(false);
            };

            let token = match first {
                b if is_eol_character(b) && self.options.end_of_line_tokens => {
                    EndOfLineTokenizer.try_tokenize(b, &mut self.reader)
                }
                b if is_white_space_character(b) => continue,
                b']' => {
                    if self.close_scope(ScannerScope::Array, "]", start)? {
                        return Ok(false);
                    }

                    continue;
                }
                b'>' if self.reader.peek_byte() == Some(b'>') => {
                    self.reader.forward();

                    if self.close_scope(ScannerScope::Dictionary, ">>", start)? {
                        return Ok(false);
                    }

                    continue;
                }
                b'%' => CommentTokenizer.try_tokenize(first, &mut self.reader),
                b'(' => StringTokenizer.try_tokenize(first, &mut self.reader),
                b'<' if self.reader.peek_byte() == Some(b'<') => self.read_dictionary(first)?,
                b'<' => HexTokenizer.try_tokenize(first, &mut self.reader),
                b'[' => ArrayTokenizer.try_tokenize(first, self)?,
                b'/' => NameTokenizer.try_tokenize(first, &mut self.reader),
                b if is_numeric_start(b) => NumericTokenizer.try_tokenize(first, &mut self.reader),
                b => match self.custom_tokenizer(b) {
                    Some(custom) => custom.try_tokenize(b, &mut self.reader),
                    None => PlainTokenizer.try_tokenize(b, &mut self.reader),
                },
            };

            match token {
                Some(token) => return Ok(self.set_current(token)),
                // Garbage, skip a single byte and try again.
                None => self.reader.jump(start + 1),
            }
        }
    }

    fn current_token(&self) -> Option<&Token> {
        self.current.as_ref()
    }
}

impl SeekableTokenScanner for CoreTokenScanner<'_> {
    fn seek(&mut self, position: usize) {
        self.reader.jump(position);
        self.current = None;
        self.previous_name = None;
        self.inline_image = InlineImage::Inactive;
    }

    fn current_position(&self) -> usize {
        self.reader.offset()
    }

    fn length(&self) -> usize {
        self.reader.len()
    }

    fn register_custom_tokenizer(&mut self, first: u8, tokenizer: Arc<dyn Tokenizer>) {
        self.custom.push((first, tokenizer));
    }

    fn deregister_custom_tokenizer(&mut self, tokenizer: &Arc<dyn Tokenizer>) {
        self.custom.retain(|(_, t)| !Arc::ptr_eq(t, tokenizer));
    }
}

impl Iterator for CoreTokenScanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.move_next() {
            Ok(true) => self.current.clone().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Dictionary, Number, PdfString};

    fn scan(input: &[u8], options: ScannerOptions) -> Result<Vec<Token>> {
        CoreTokenScanner::new(input, options).collect()
    }

    fn scan_ok(input: &[u8]) -> Vec<Token> {
        scan(input, ScannerOptions::default()).unwrap()
    }

    fn op(text: &str) -> Token {
        Token::Operator(Operator::new(text))
    }

    #[test]
    fn object_header_and_body() {
        let tokens = scan_ok(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj");

        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0], Token::Number(Number::Integer(1)));
        assert_eq!(tokens[2], op("obj"));
        assert_eq!(tokens[3].as_dictionary().unwrap().len(), 2);
        assert_eq!(tokens[4], op("endobj"));
    }

    #[test]
    fn content_stream() {
        let tokens = scan_ok(b"BT /F1 12 Tf 72 712 Td (Hello) Tj ET");

        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[0], op("BT"));
        assert_eq!(tokens[7], Token::String(PdfString::from("Hello")));
        assert_eq!(tokens[9], op("ET"));
    }

    #[test]
    fn literals() {
        assert_eq!(
            scan_ok(b"true false null"),
            [Token::Boolean(true), Token::Boolean(false), Token::Null]
        );
    }

    #[test]
    fn comments_are_tokens() {
        let tokens = scan_ok(b"%PDF-1.4\n%\xe2\xe3\n1");

        assert_eq!(tokens[0], Token::Comment(b"PDF-1.4".to_vec()));
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2], Token::Number(Number::Integer(1)));
    }

    #[test]
    fn comments_inside_containers_are_dropped() {
        let tokens = scan_ok(b"[1 % one\n 2]");
        assert_eq!(tokens[0].as_array().unwrap().len(), 2);
    }

    #[test]
    fn end_of_line_tokens() {
        let options = ScannerOptions {
            end_of_line_tokens: true,
            ..ScannerOptions::default()
        };
        let tokens = scan(b"a\r\nb\n", options).unwrap();

        assert_eq!(tokens, [op("a"), Token::EndOfLine, op("b"), Token::EndOfLine]);
    }

    #[test]
    fn garbage_is_skipped() {
        let tokens = scan_ok(b") 1 ) >");
        assert_eq!(tokens, [Token::Number(Number::Integer(1))]);
    }

    #[test]
    fn top_level_closers_are_garbage() {
        let tokens = scan_ok(b"] 1 >> 2");
        assert_eq!(
            tokens,
            [Token::Number(Number::Integer(1)), Token::Number(Number::Integer(2))]
        );
    }

    #[test]
    fn mismatched_closer_in_strict_mode() {
        let err = scan(b"[1 2 >> 3]", ScannerOptions::default()).unwrap_err();

        assert_eq!(
            err,
            Error::UnexpectedDelimiter {
                offset: 5,
                delimiter: ">>",
                scope: ScannerScope::Array,
            }
        );
    }

    #[test]
    fn mismatched_closer_in_lenient_mode() {
        let tokens = scan(b"[1 2 >> 3]", ScannerOptions::lenient(true)).unwrap();
        assert_eq!(tokens[0].as_array().unwrap().len(), 3);

        // `>>` ends the array so the enclosing dictionary can close.
        let tokens = scan(b"<< /Kids [1 0 R >> /Count 1", ScannerOptions::lenient(true)).unwrap();
        let dict = tokens[0].as_dictionary().unwrap();
        assert_eq!(dict.get_array("Kids").unwrap().len(), 1);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn try_read_token_filters_by_type() {
        let mut scanner = CoreTokenScanner::new(b"/Name 12", ScannerOptions::default());

        assert_eq!(scanner.try_read_token::<Name>().unwrap(), Some(Name::new("Name")));
        assert_eq!(scanner.try_read_token::<Name>().unwrap(), None);
        assert_eq!(scanner.try_read_token::<Dictionary>().unwrap(), None);
    }

    #[test]
    fn seek_and_position() {
        let mut scanner = CoreTokenScanner::new(b"1 2 3", ScannerOptions::default());

        assert!(scanner.move_next().unwrap());
        assert_eq!(scanner.current_position(), 1);
        scanner.seek(4);
        assert!(scanner.move_next().unwrap());
        assert_eq!(scanner.current_token(), Some(&Token::Number(Number::Integer(3))));
        assert!(!scanner.move_next().unwrap());
        assert_eq!(scanner.length(), 5);
    }

    #[test]
    fn schema_dictionary() {
        let input = b"/CIDSystemInfo << /Registry (Adobe) 0 >> /Ordering (UCS) /Supplement 0 >> def";
        let scanner = CoreTokenScanner::new(input, ScannerOptions::default())
            .with_schema(DictionarySchema::cid_system_info());
        let tokens = scanner.collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(tokens.len(), 3);
        let info = tokens[1].as_dictionary().unwrap();
        assert_eq!(info.len(), 3);
        assert_eq!(info.get_i64("Supplement"), Some(0));
    }

    struct Marker;

    impl Tokenizer for Marker {
        fn try_tokenize(&self, first: u8, _: &mut Reader<'_>) -> Option<Token> {
            Some(Token::Comment(vec![first]))
        }
    }

    #[test]
    fn custom_tokenizer() {
        let mut scanner = CoreTokenScanner::new(b"@ q @", ScannerOptions::default());
        let marker: Arc<dyn Tokenizer> = Arc::new(Marker);
        scanner.register_custom_tokenizer(b'@', marker.clone());

        assert!(scanner.move_next().unwrap());
        assert_eq!(scanner.current_token(), Some(&Token::Comment(vec![b'@'])));
        assert!(scanner.move_next().unwrap());
        assert_eq!(scanner.current_token(), Some(&op("q")));

        scanner.deregister_custom_tokenizer(&marker);
        assert!(scanner.move_next().unwrap());
        assert_eq!(scanner.current_token(), Some(&op("@")));
    }

    #[test]
    fn inline_image() {
        let tokens = scan_ok(b"q BI /W 2 /H 1 /BPC 8 /CS /G ID \x00\xff\nEI Q");

        let data_index = tokens
            .iter()
            .position(|t| matches!(t, Token::InlineImageData(_)))
            .unwrap();

        assert_eq!(tokens[data_index - 1], op("ID"));
        assert_eq!(tokens[data_index], Token::InlineImageData(b"\x00\xff\n".to_vec()));
        assert_eq!(tokens[data_index + 1], op("EI"));
        assert_eq!(tokens[data_index + 2], op("Q"));
    }

    #[test]
    fn inline_image_false_end() {
        let input = b"BI /W 8 ID ab EI\xff\xfe\x01rest \nEI Q";
        let tokens = scan_ok(input);

        assert_eq!(
            tokens[4],
            Token::InlineImageData(b"ab EI\xff\xfe\x01rest \n".to_vec())
        );
        assert_eq!(tokens[5], op("EI"));
        assert_eq!(tokens[6], op("Q"));
    }

    #[test]
    fn inline_image_control_byte_is_false_end() {
        let tokens = scan_ok(b"BI ID xEI \x02zz\nEI\n");
        assert_eq!(tokens[2], Token::InlineImageData(b"xEI \x02zz\n".to_vec()));
    }

    #[test]
    fn inline_image_end_at_end_of_input() {
        let tokens = scan_ok(b"BI ID abcEI");
        assert_eq!(tokens[2], Token::InlineImageData(b"abc".to_vec()));
        assert_eq!(tokens[3], op("EI"));
    }

    #[test]
    fn inline_image_without_end() {
        let err = scan(b"BI /W 1 ID \x01\x02\x03", ScannerOptions::default()).unwrap_err();
        assert_eq!(err, Error::UnterminatedInlineImage { offset: 11 });

        let tokens = scan(b"BI /W 1 ID \x01\x02\x03", ScannerOptions::lenient(true)).unwrap();
        assert_eq!(tokens[4], Token::InlineImageData(vec![1, 2, 3]));
        assert_eq!(tokens[5], op("EI"));
    }

    #[test]
    fn recover_from_incorrect_end_image() {
        let input = b"BI ID abEI Q zzEI Q";
        let mut scanner = CoreTokenScanner::new(input, ScannerOptions::default());

        while scanner.move_next().unwrap() {
            if matches!(scanner.current_token(), Some(Token::InlineImageData(_))) {
                break;
            }
        }

        assert_eq!(scanner.current_token(), Some(&Token::InlineImageData(b"ab".to_vec())));
        let end = scanner.last_end_image_offset().unwrap();
        assert_eq!(end, 8);

        let rest = scanner.recover_from_incorrect_end_image(end).unwrap();
        assert_eq!(rest, b"EI Q zz");

        assert!(scanner.move_next().unwrap());
        assert_eq!(scanner.current_token(), Some(&op("EI")));
        assert!(scanner.move_next().unwrap());
        assert_eq!(scanner.current_token(), Some(&op("Q")));
    }

    #[test]
    fn recover_requires_end_image_bytes() {
        let mut scanner = CoreTokenScanner::new(b"BI ID abEI Q", ScannerOptions::lenient(true));
        let err = scanner.recover_from_incorrect_end_image(3).unwrap_err();

        assert_eq!(
            err,
            Error::InvalidEndImage {
                offset: 3,
                found: b"ID".to_vec()
            }
        );
    }
}
