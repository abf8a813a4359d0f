//! Reading Type1 font programs.
//!
//! Both the PFA form, where the private part follows `eexec` in binary or
//! hex, and the segmented PFB form are accepted. Glyphs are addressed by
//! name and drawn by interpreting their charstrings.

mod charstring;
mod decrypt;
mod lexer;
mod operator;
mod standard;

pub use charstring::GlyphMetrics;

use crate::type1::charstring::parse_char_string;
use crate::type1::decrypt::{
    EEXEC_KEY, EEXEC_PREFIX_LEN, decrypt, decrypt_charstring, decrypt_eexec,
};
use crate::type1::lexer::Lexer;
use crate::type1::standard::STANDARD;
use crate::{
    FontError, Matrix, NullOutline, OutlineBuilder, OutlineError, ParseOptions, RectF, Result,
};
use log::{debug, warn};
use quire_common::byte::Reader;
use rustc_hash::FxHashMap;

const ND: &[u8] = b"ND";
const ND_ALT: &[u8] = b"|-";

const RD: &[u8] = b"RD";
const RD_ALT: &[u8] = b"-|";

const NP: &[u8] = b"NP";
const NP_ALT: &[u8] = b"|";

const PFB_MARKER: u8 = 0x80;
const PFB_ASCII: u8 = 1;
const PFB_BINARY: u8 = 2;
const PFB_EOF: u8 = 3;

/// How character codes map to glyph names.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Encoding {
    /// Adobe StandardEncoding.
    #[default]
    Standard,
    /// The codes given by the `dup code /name put` entries of the font.
    Custom(FxHashMap<u8, String>),
}

impl Encoding {
    /// The glyph name for a character code.
    pub fn code_to_name(&self, code: u8) -> Option<&str> {
        match self {
            Self::Standard => STANDARD.get(&code).copied(),
            Self::Custom(map) => map.get(&code).map(String::as_str),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Parameters {
    font_name: Option<String>,
    font_bbox: Option<RectF>,
    matrix: Matrix,
    encoding: Encoding,
    subroutines: FxHashMap<u32, Vec<u8>>,
    charstrings: FxHashMap<String, Vec<u8>>,
}

/// A parsed Type1 font program.
#[derive(Debug)]
pub struct Table {
    params: Parameters,
    /// Glyph names in the order of the `CharStrings` dictionary.
    glyph_names: Vec<String>,
}

impl Table {
    /// Parse a Type1 font in PFA or PFB form.
    pub fn parse(data: &[u8], options: ParseOptions) -> Result<Self> {
        let pfb;
        let (clear_text, private) = if data.first() == Some(&PFB_MARKER) {
            pfb = unwrap_pfb(data).ok_or(FontError::Truncated {
                table: "PFB segment",
            })?;
            debug!(
                "PFB with {} bytes of clear text and {} encrypted bytes",
                pfb.0.len(),
                pfb.1.len()
            );

            (
                pfb.0.as_slice(),
                Some(decrypt(&pfb.1, EEXEC_KEY, EEXEC_PREFIX_LEN)),
            )
        } else {
            (data, None)
        };

        if !clear_text.starts_with(b"%!") {
            if !options.lenient {
                return Err(invalid("Type1", "a program starting with `%!`"));
            }

            warn!("Type1 font doesn't start with %!");
        }

        let mut params = Parameters::default();
        let tail = parse_clear_text(clear_text, &mut params, options)?;

        let private = match (private, tail) {
            (Some(private), _) => private,
            (None, Some(tail)) => decrypt_eexec(tail),
            (None, None) => return Err(FontError::MissingEexec),
        };

        let glyph_names = parse_private(&private, &mut params, options)?;

        debug!(
            "Type1 font {:?} with {} glyphs and {} subroutines",
            params.font_name,
            glyph_names.len(),
            params.subroutines.len()
        );

        Ok(Self {
            params,
            glyph_names,
        })
    }

    /// The `/FontName`, without its slash.
    pub fn font_name(&self) -> Option<&str> {
        self.params.font_name.as_deref()
    }

    /// The `/FontBBox`.
    pub fn font_bbox(&self) -> Option<RectF> {
        self.params.font_bbox
    }

    /// The `/FontMatrix`, mapping glyph space to text space.
    pub fn matrix(&self) -> Matrix {
        self.params.matrix
    }

    /// The built-in encoding of the font.
    pub fn encoding(&self) -> &Encoding {
        &self.params.encoding
    }

    /// The glyph name for a character code in the built-in encoding.
    pub fn code_to_name(&self, code: u8) -> Option<&str> {
        self.params.encoding.code_to_name(code)
    }

    /// The names of all glyphs, in the order the font defines them.
    pub fn glyph_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.glyph_names.iter().map(String::as_str)
    }

    /// The number of glyphs.
    pub fn number_of_glyphs(&self) -> usize {
        self.glyph_names.len()
    }

    /// Whether the font has a charstring for `name`.
    pub fn has_glyph(&self, name: &str) -> bool {
        self.params.charstrings.contains_key(name)
    }

    /// Outlines a glyph.
    pub fn outline(
        &self,
        name: &str,
        builder: &mut dyn OutlineBuilder,
    ) -> core::result::Result<GlyphMetrics, OutlineError> {
        let data = self
            .params
            .charstrings
            .get(name)
            .ok_or(OutlineError::NoGlyph)?;

        parse_char_string(data, &self.params, builder)
    }

    /// The advance width and bounds of a glyph, without building its outline.
    pub fn glyph_metrics(&self, name: &str) -> core::result::Result<GlyphMetrics, OutlineError> {
        self.outline(name, &mut NullOutline)
    }
}

fn invalid(table: &'static str, reason: &'static str) -> FontError {
    FontError::InvalidFormat { table, reason }
}

/// Accept a section that could not be read completely in lenient mode.
fn finish_section(
    result: Option<()>,
    table: &'static str,
    reason: &'static str,
    options: ParseOptions,
) -> Result<()> {
    match result {
        Some(()) => Ok(()),
        None if options.lenient => {
            warn!("{table} is malformed, expected {reason}; keeping what was read");
            Ok(())
        }
        None => Err(invalid(table, reason)),
    }
}

/// Split a PFB file into its clear text and binary segments.
fn unwrap_pfb(data: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut r = Reader::new(data);
    let mut clear_text = Vec::new();
    let mut binary = Vec::new();

    while r.eat(|b| b == PFB_MARKER).is_some() {
        let kind = r.read_byte()?;

        if kind == PFB_EOF {
            break;
        }

        let len = u32::from_le_bytes(r.read_array::<4>()?) as usize;
        let bytes = r.read_bytes(len)?;

        match kind {
            PFB_ASCII => clear_text.extend_from_slice(bytes),
            PFB_BINARY => binary.extend_from_slice(bytes),
            _ => return None,
        }
    }

    Some((clear_text, binary))
}

/// Read the unencrypted part of the font and return what follows `eexec`.
fn parse_clear_text<'a>(
    data: &'a [u8],
    params: &mut Parameters,
    options: ParseOptions,
) -> Result<Option<&'a [u8]>> {
    let mut lexer = Lexer::new(data);

    while let Some(token) = lexer.next_token() {
        match token {
            b"/FontName" => {
                params.font_name = lexer
                    .next_token()
                    .and_then(|name| name.strip_prefix(b"/"))
                    .map(|name| String::from_utf8_lossy(name).into_owned());
            }
            b"/FontMatrix" => {
                let matrix = read_numbers::<6>(&mut lexer);
                finish_section(matrix.map(|_| ()), "FontMatrix", "six numbers", options)?;

                if let Some(matrix) = matrix {
                    params.matrix = Matrix::from_array(matrix);
                }
            }
            b"/FontBBox" => {
                let bbox = read_numbers::<4>(&mut lexer);
                finish_section(bbox.map(|_| ()), "FontBBox", "four numbers", options)?;

                params.font_bbox = bbox.map(|[x_min, y_min, x_max, y_max]| RectF {
                    x_min,
                    y_min,
                    x_max,
                    y_max,
                });
            }
            b"/Encoding" => {
                let encoding = read_encoding(&mut lexer);
                finish_section(
                    encoding.as_ref().map(|_| ()),
                    "Encoding",
                    "StandardEncoding or an array",
                    options,
                )?;
                params.encoding = encoding.unwrap_or_default();
            }
            b"eexec" => return Ok(Some(lexer.tail())),
            _ => {}
        }
    }

    Ok(None)
}

/// Read an array or procedure of exactly `N` numbers.
fn read_numbers<const N: usize>(lexer: &mut Lexer<'_>) -> Option<[f32; N]> {
    if !matches!(lexer.next_token()?, b"[" | b"{") {
        return None;
    }

    let mut numbers = [0.0; N];

    for n in &mut numbers {
        *n = lexer.next_number()?;
    }

    matches!(lexer.next_token()?, b"]" | b"}").then_some(numbers)
}

fn read_encoding(lexer: &mut Lexer<'_>) -> Option<Encoding> {
    if lexer.peek_token()? == b"StandardEncoding" {
        lexer.next_token();
        return Some(Encoding::Standard);
    }

    let mut map = FxHashMap::default();

    loop {
        match lexer.next_token()? {
            b"def" => break,
            b"dup" => {
                let code = u8::try_from(lexer.next_int()?).ok()?;
                let name = lexer.next_token()?.strip_prefix(b"/")?;

                if lexer.next_token()? != b"put" {
                    return None;
                }

                map.insert(code, String::from_utf8_lossy(name).into_owned());
            }
            _ => {}
        }
    }

    Some(Encoding::Custom(map))
}

/// Read the decrypted private part and return the glyph names in order.
fn parse_private(
    data: &[u8],
    params: &mut Parameters,
    options: ParseOptions,
) -> Result<Vec<String>> {
    let mut lexer = Lexer::new(data);
    let mut len_iv = Some(4);
    let mut glyph_names = Vec::new();

    while let Some(token) = lexer.next_token() {
        match token {
            b"/lenIV" => {
                let value = lexer.next_int();
                finish_section(value.map(|_| ()), "lenIV", "an integer", options)?;

                if let Some(value) = value {
                    // A negative value means the charstrings are not encrypted.
                    len_iv = usize::try_from(value).ok();
                }
            }
            b"/Subrs" => finish_section(
                parse_subroutines(&mut lexer, len_iv, &mut params.subroutines),
                "Subrs",
                "`dup index length RD binary NP` entries",
                options,
            )?,
            b"/CharStrings" => finish_section(
                parse_charstrings(
                    &mut lexer,
                    len_iv,
                    &mut params.charstrings,
                    &mut glyph_names,
                ),
                "CharStrings",
                "`/name length RD binary ND` entries",
                options,
            )?,
            b"closefile" => break,
            _ => {}
        }
    }

    Ok(glyph_names)
}

fn is_rd(token: &[u8]) -> bool {
    token == RD || token == RD_ALT
}

/// Read the binary data of a subroutine or charstring, starting with its
/// length.
fn read_charstring(lexer: &mut Lexer<'_>, len_iv: Option<usize>) -> Option<Vec<u8>> {
    let len = usize::try_from(lexer.next_int()?).ok()?;

    if !is_rd(lexer.next_token()?) {
        return None;
    }

    decrypt_charstring(lexer.read_binary(len)?, len_iv)
}

fn parse_subroutines(
    lexer: &mut Lexer<'_>,
    len_iv: Option<usize>,
    subroutines: &mut FxHashMap<u32, Vec<u8>>,
) -> Option<()> {
    let count = lexer.next_int()?;

    if lexer.next_token()? != b"array" {
        return None;
    }

    while lexer.peek_token() == Some(&b"dup"[..]) {
        lexer.next_token();

        let index = u32::try_from(lexer.next_int()?).ok()?;
        subroutines.insert(index, read_charstring(lexer, len_iv)?);

        match lexer.next_token()? {
            b"noaccess" => {
                if lexer.next_token()? != b"put" {
                    return None;
                }
            }
            t if t == NP || t == NP_ALT || t == b"put" => {}
            _ => return None,
        }
    }

    if subroutines.len() as i64 != count {
        debug!("expected {count} subroutines, found {}", subroutines.len());
    }

    Some(())
}

fn parse_charstrings(
    lexer: &mut Lexer<'_>,
    len_iv: Option<usize>,
    charstrings: &mut FxHashMap<String, Vec<u8>>,
    glyph_names: &mut Vec<String>,
) -> Option<()> {
    // The count is only a hint for the dictionary size.
    lexer.next_int()?;

    loop {
        let token = lexer.next_token()?;

        if token == b"end" {
            break;
        }

        // `dict dup begin` comes before the first glyph.
        let Some(name) = token.strip_prefix(b"/") else {
            continue;
        };

        let name = core::str::from_utf8(name).ok()?.to_owned();
        let charstring = read_charstring(lexer, len_iv)?;

        match lexer.next_token()? {
            b"noaccess" => {
                if lexer.next_token()? != b"def" {
                    return None;
                }
            }
            t if t == ND || t == ND_ALT || t == b"def" => {}
            _ => return None,
        }

        if charstrings.insert(name.clone(), charstring).is_none() {
            glyph_names.push(name);
        }
    }

    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathSegment::*;
    use crate::type1::charstring::tests::assemble;
    use crate::type1::decrypt::CHARSTRING_KEY;
    use crate::type1::decrypt::tests::encrypt;

    const CLEAR_TEXT: &str = "%!PS-AdobeFont-1.0: Quire-Test 001.000
%%CreationDate: Thu Jan 1 00:00:00 1970
11 dict begin
/FontInfo 2 dict dup begin
/FullName (Quire Test) readonly def
end readonly def
/FontName /Quire-Test def
/PaintType 0 def
/FontType 1 def
/FontMatrix [0.001 0 0 0.001 0 0] readonly def
/FontBBox {0 -10 600 700} readonly def
/Encoding 256 array
0 1 255 {1 index exch /.notdef put} for
dup 65 /A put
dup 66 /B put
readonly def
currentdict end
currentfile eexec
";

    fn charstring_entry(out: &mut Vec<u8>, prefix: &str, program: &str, suffix: &str) {
        let mut plain = vec![0x12, 0x34, 0x56, 0x78];
        plain.extend(assemble(program));
        let cipher = encrypt(&plain, CHARSTRING_KEY);

        out.extend(format!("{prefix} {} ", cipher.len()).bytes());
        out.extend(if suffix == "|-" { RD_ALT } else { RD });
        out.push(b' ');
        out.extend(&cipher);
        out.extend(format!(" {suffix}\n").bytes());
    }

    fn private_part() -> Vec<u8> {
        let mut out = b"dup /Private 8 dict dup begin
/RD{string currentfile exch readstring pop}executeonly def
/ND{noaccess def}executeonly def
/NP{noaccess put}executeonly def
/BlueValues [-10 0 700 710] def
/lenIV 4 def
/Subrs 2 array
"
        .to_vec();

        charstring_entry(&mut out, "dup 0", "0 0 rmoveto 100 0 rlineto return", "NP");
        charstring_entry(&mut out, "dup 1", "0 100 rlineto return", "noaccess put");
        out.extend(b"ND\n2 index /CharStrings 3 dict dup begin\n");
        charstring_entry(
            &mut out,
            "/A",
            "0 500 hsbw 0 0 rmoveto 500 0 rlineto 0 700 rlineto closepath endchar",
            "ND",
        );
        charstring_entry(&mut out, "/B", "20 600 hsbw 0 callsubr 1 callsubr endchar", "|-");
        charstring_entry(&mut out, "/.notdef", "0 250 hsbw endchar", "ND");
        out.extend(b"end\nend\nreadonly put\nnoaccess put\ndup /FontName get exch definefont pop\nmark currentfile closefile\n");

        let mut plain = vec![0, 0, 0, 0];
        plain.extend(out);
        encrypt(&plain, EEXEC_KEY)
    }

    fn pfa() -> Vec<u8> {
        let mut data = CLEAR_TEXT.as_bytes().to_vec();
        data.extend(private_part());
        data.extend(b"\n0000000000000000\ncleartomark\n");
        data
    }

    fn check_font(table: &Table) {
        assert_eq!(table.font_name(), Some("Quire-Test"));
        assert_eq!(table.matrix(), Matrix::from_array([0.001, 0.0, 0.0, 0.001, 0.0, 0.0]));
        assert_eq!(
            table.font_bbox().and_then(RectF::to_rect).map(|r| (r.y_min, r.x_max)),
            Some((-10, 600))
        );
        assert_eq!(table.glyph_names().collect::<Vec<_>>(), ["A", "B", ".notdef"]);
        assert!(table.has_glyph(".notdef"));

        let mut path = Vec::new();
        let metrics = table.outline("A", &mut path).unwrap();
        assert_eq!(
            path,
            [
                MoveTo(0.0, 0.0),
                LineTo(500.0, 0.0),
                LineTo(500.0, 700.0),
                Close
            ]
        );
        assert_eq!(metrics.advance_width, 500.0);

        let mut path = Vec::new();
        table.outline("B", &mut path).unwrap();
        assert_eq!(
            path,
            [MoveTo(20.0, 0.0), LineTo(120.0, 0.0), LineTo(120.0, 100.0)]
        );

        let metrics = table.glyph_metrics(".notdef").unwrap();
        assert_eq!(metrics.advance_width, 250.0);
        assert_eq!(metrics.bounds, None);

        assert_eq!(
            table.glyph_metrics("C").unwrap_err(),
            OutlineError::NoGlyph
        );
    }

    #[test]
    fn binary_pfa() {
        let table = Table::parse(&pfa(), ParseOptions::default()).unwrap();

        check_font(&table);
        assert_eq!(table.code_to_name(65), Some("A"));
        assert_eq!(table.code_to_name(66), Some("B"));
        assert_eq!(table.code_to_name(67), None);
    }

    #[test]
    fn hex_pfa() {
        let mut data = CLEAR_TEXT.as_bytes().to_vec();

        for (i, b) in private_part().iter().enumerate() {
            data.extend(format!("{b:02x}").bytes());
            if i % 32 == 31 {
                data.push(b'\n');
            }
        }
        data.extend(b"\n0000000000000000\ncleartomark\n");

        check_font(&Table::parse(&data, ParseOptions::default()).unwrap());
    }

    #[test]
    fn pfb() {
        let clear_text = CLEAR_TEXT.replace(
            "/Encoding 256 array
0 1 255 {1 index exch /.notdef put} for
dup 65 /A put
dup 66 /B put
readonly def",
            "/Encoding StandardEncoding def",
        );
        let private = private_part();
        let trailer = b"0000000000000000\ncleartomark\n";

        let mut data = Vec::new();
        for (kind, bytes) in [
            (PFB_ASCII, clear_text.as_bytes()),
            (PFB_BINARY, private.as_slice()),
            (PFB_ASCII, trailer.as_slice()),
        ] {
            data.extend([PFB_MARKER, kind]);
            data.extend((bytes.len() as u32).to_le_bytes());
            data.extend(bytes);
        }
        data.extend([PFB_MARKER, PFB_EOF]);

        let table = Table::parse(&data, ParseOptions::default()).unwrap();
        check_font(&table);
        assert_eq!(table.encoding(), &Encoding::Standard);
        assert_eq!(table.code_to_name(65), Some("A"));
        assert_eq!(table.code_to_name(0xC2), Some("acute"));

        assert_eq!(
            Table::parse(&data[..40], ParseOptions::default()).unwrap_err(),
            FontError::Truncated {
                table: "PFB segment"
            }
        );
    }

    #[test]
    fn unencrypted_charstrings() {
        let mut plain = b"0000/lenIV -1 def\n/CharStrings 1 dict dup begin\n/space ".to_vec();
        let program = assemble("0 250 hsbw endchar");
        plain.extend(format!("{} RD ", program.len()).bytes());
        plain.extend(&program);
        plain.extend(b" ND\nend\n");

        let mut data = CLEAR_TEXT.as_bytes().to_vec();
        data.extend(encrypt(&plain, EEXEC_KEY));

        let table = Table::parse(&data, ParseOptions::default()).unwrap();
        assert_eq!(table.glyph_metrics("space").unwrap().advance_width, 250.0);
    }

    #[test]
    fn malformed() {
        let strict = ParseOptions::default();
        let lenient = ParseOptions::lenient(true);

        let no_eexec = CLEAR_TEXT.replace("currentfile eexec", "");
        assert_eq!(
            Table::parse(no_eexec.as_bytes(), lenient).unwrap_err(),
            FontError::MissingEexec
        );

        let no_header = &pfa()[2..];
        assert!(matches!(
            Table::parse(no_header, strict),
            Err(FontError::InvalidFormat { .. })
        ));
        assert!(Table::parse(no_header, lenient).is_ok());

        // Cut the font in the middle of the charstring for `B`.
        let mut plain = vec![0, 0, 0, 0];
        plain.extend(decrypt_eexec(&private_part()));
        let end = plain.windows(2).rposition(|w| w == b"/B").unwrap() + 8;
        let mut data = CLEAR_TEXT.as_bytes().to_vec();
        data.extend(encrypt(&plain[..end], EEXEC_KEY));

        assert_eq!(
            Table::parse(&data, strict).unwrap_err(),
            invalid("CharStrings", "`/name length RD binary ND` entries")
        );

        let table = Table::parse(&data, lenient).unwrap();
        assert_eq!(table.glyph_names().collect::<Vec<_>>(), ["A"]);
        assert!(table.outline("A", &mut NullOutline).is_ok());
    }
}
