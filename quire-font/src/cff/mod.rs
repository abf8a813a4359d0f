//! A [Compact Font Format] parser.
//!
//! Both name-keyed and CID-keyed fonts are supported. The tables of the
//! font are decoded, while charstrings are handed out as raw Type2 programs
//! together with the subroutines they may call.
//!
//! [Compact Font Format]: https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf

mod charset;
mod dict;
mod fd_select;
mod index;
mod private;
mod std_strings;
mod top;

pub use private::PrivateDict;
pub use top::{RegistryOrderingSupplement, TopDict};

use crate::error::{FontError, Result};
use crate::{GlyphId, Matrix, ParseOptions};
use charset::Charset;
use dict::{ApplyOperation, read_dict};
use fd_select::FdSelect;
use index::{Index, parse_index};
use log::warn;
use quire_common::byte::Reader;
use std_strings::{STANDARD_STRINGS, STANDARD_STRINGS_LEN};

/// The standard strings followed by the String INDEX of a font.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Strings<'a> {
    custom: Index<'a>,
}

impl<'a> Strings<'a> {
    pub(crate) fn new(custom: Index<'a>) -> Self {
        Self { custom }
    }

    pub(crate) fn get(&self, sid: u16) -> Option<&'a str> {
        match sid.checked_sub(STANDARD_STRINGS_LEN) {
            None => STANDARD_STRINGS.get(usize::from(sid)).copied(),
            Some(index) => core::str::from_utf8(self.custom.get(index)?).ok(),
        }
    }

    /// The string ID of `name`.
    fn find(&self, name: &str) -> Option<u16> {
        if let Some(sid) = STANDARD_STRINGS.iter().position(|s| *s == name) {
            return u16::try_from(sid).ok();
        }

        let index = self.custom.iter().position(|s| s == name.as_bytes())?;
        u16::try_from(index).ok()?.checked_add(STANDARD_STRINGS_LEN)
    }
}

/// A set of subroutines, together with the bias that charstrings subtract
/// from subroutine numbers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Subroutines<'a> {
    index: Index<'a>,
    bias: u16,
}

impl<'a> Subroutines<'a> {
    fn new(index: Index<'a>) -> Self {
        Self {
            index,
            bias: calc_subroutine_bias(index.len()),
        }
    }

    /// The subroutine a `callsubr` or `callgsubr` operand refers to.
    pub fn get(&self, number: i32) -> Option<&'a [u8]> {
        let index = number.checked_add(i32::from(self.bias))?;
        self.index.get(u16::try_from(index).ok()?)
    }

    /// The bias added to subroutine numbers.
    pub fn bias(&self) -> u16 {
        self.bias
    }

    /// The number of subroutines.
    pub fn len(&self) -> u16 {
        self.index.len()
    }

    /// Whether there are no subroutines.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

// The subroutine number bias depends on the size of the INDEX (Technical Note #5176, section 16).
fn calc_subroutine_bias(len: u16) -> u16 {
    if len < 1240 {
        107
    } else if len < 33900 {
        1131
    } else {
        32768
    }
}

/// The Type2 charstring of a glyph.
#[derive(Clone, Copy, Debug)]
pub struct CharString<'a> {
    /// The charstring program.
    pub data: &'a [u8],
    /// Subroutines shared by all glyphs.
    pub global_subrs: Subroutines<'a>,
    /// Subroutines of the Private DICT that applies to the glyph.
    pub local_subrs: Subroutines<'a>,
}

#[derive(Clone, Debug, Default)]
struct FontDict<'a> {
    private: PrivateDict,
    local_subrs: Subroutines<'a>,
}

#[derive(Clone, Debug)]
enum Kind<'a> {
    NameKeyed(FontDict<'a>),
    CidKeyed {
        fd_array: Vec<FontDict<'a>>,
        fd_select: FdSelect,
    },
}

/// A parsed CFF font program.
#[derive(Clone, Debug)]
pub struct Table<'a> {
    name: &'a [u8],
    top_dict: TopDict,
    strings: Strings<'a>,
    global_subrs: Subroutines<'a>,
    char_strings: Index<'a>,
    charset: Charset,
    kind: Kind<'a>,
}

impl<'a> Table<'a> {
    /// Parse the first font of a CFF font program.
    pub fn parse(data: &'a [u8], options: ParseOptions) -> Result<Self> {
        let mut r = Reader::new(data);

        let major = r.read_u8().ok_or(FontError::NotCff)?;
        r.skip_bytes(1).ok_or(FontError::NotCff)?;
        let header_size = r.read_u8().ok_or(FontError::NotCff)?;

        if major != 1 || header_size < 4 {
            return Err(FontError::NotCff);
        }

        r.jump(usize::from(header_size));

        let names = parse_index(&mut r).ok_or(FontError::Truncated { table: "Name INDEX" })?;
        let top_dicts = parse_index(&mut r).ok_or(FontError::Truncated {
            table: "Top DICT INDEX",
        })?;
        let strings = Strings::new(
            parse_index(&mut r).ok_or(FontError::Truncated { table: "String INDEX" })?,
        );
        let global_subrs = Subroutines::new(parse_index(&mut r).ok_or(FontError::Truncated {
            table: "Global Subr INDEX",
        })?);

        let name = names.get(0).ok_or(FontError::InvalidFormat {
            table: "Name INDEX",
            reason: "at least one font",
        })?;

        if names.len() > 1 {
            warn!("CFF font set with {} fonts, using the first one", names.len());
        }

        let top_dict = top_dicts
            .get(0)
            .ok_or(FontError::Truncated { table: "Top DICT" })
            .and_then(|data| read_dict_data(data, TopDict::default(), &strings, "Top DICT", options))?;

        if top_dict.charstring_type != 2 {
            warn!("unsupported charstring type {}", top_dict.charstring_type);
        }

        let char_strings = top_dict
            .char_strings
            .ok_or(FontError::InvalidFormat {
                table: "Top DICT",
                reason: "a CharStrings offset",
            })
            .and_then(|offset| {
                parse_index(&mut Reader::new_at(data, offset)).ok_or(FontError::Truncated {
                    table: "CharStrings INDEX",
                })
            })?;
        let number_of_glyphs = char_strings.len();

        let charset = lenient(
            Charset::parse(data, top_dict.charset, number_of_glyphs),
            FontError::Truncated { table: "charset" },
            options,
        )?;

        let kind = if top_dict.is_cid() {
            let fd_array = top_dict
                .fd_array
                .and_then(|offset| parse_index(&mut Reader::new_at(data, offset)))
                .ok_or(FontError::Truncated { table: "FDArray" })?
                .iter()
                .map(|font_dict| {
                    let font_dict =
                        read_dict_data(font_dict, TopDict::default(), &strings, "Font DICT", options)?;
                    read_font_dict(data, &font_dict, &strings, options)
                })
                .collect::<Result<Vec<_>>>()?;

            let fd_select = lenient(
                top_dict
                    .fd_select
                    .and_then(|offset| FdSelect::parse(data, offset, number_of_glyphs)),
                FontError::Truncated { table: "FDSelect" },
                options,
            )?;

            Kind::CidKeyed { fd_array, fd_select }
        } else {
            Kind::NameKeyed(read_font_dict(data, &top_dict, &strings, options)?)
        };

        Ok(Self {
            name,
            top_dict,
            strings,
            global_subrs,
            char_strings,
            charset,
            kind,
        })
    }

    /// The PostScript name of the font.
    pub fn name(&self) -> Option<&'a str> {
        core::str::from_utf8(self.name).ok()
    }

    /// The Top DICT.
    pub fn top_dict(&self) -> &TopDict {
        &self.top_dict
    }

    /// Whether the font is CID-keyed.
    pub fn is_cid(&self) -> bool {
        matches!(self.kind, Kind::CidKeyed { .. })
    }

    /// The number of glyphs, including `.notdef`.
    pub fn number_of_glyphs(&self) -> u16 {
        self.char_strings.len()
    }

    /// The font matrix, mapping glyph space to text space.
    pub fn matrix(&self) -> Matrix {
        Matrix::from_array(self.top_dict.font_matrix.map(|v| v as f32))
    }

    /// Resolve a string ID.
    pub fn string(&self, sid: u16) -> Option<&'a str> {
        self.strings.get(sid)
    }

    /// The Private DICT that applies to a glyph.
    pub fn private_dict(&self, glyph: GlyphId) -> Option<&PrivateDict> {
        self.font_dict(glyph).map(|fd| &fd.private)
    }

    /// The name of a glyph in a name-keyed font.
    pub fn glyph_name(&self, glyph: GlyphId) -> Option<&'a str> {
        if self.is_cid() {
            return None;
        }

        self.strings.get(self.charset.id(glyph)?)
    }

    /// Look up a glyph of a name-keyed font by its name.
    pub fn glyph_index_by_name(&self, name: &str) -> Option<GlyphId> {
        if self.is_cid() {
            return None;
        }

        self.charset.glyph(self.strings.find(name)?)
    }

    /// The CID of a glyph in a CID-keyed font.
    pub fn glyph_cid(&self, glyph: GlyphId) -> Option<u16> {
        if !self.is_cid() {
            return None;
        }

        self.charset.id(glyph)
    }

    /// Look up a glyph of a CID-keyed font by its CID.
    pub fn glyph_index_by_cid(&self, cid: u16) -> Option<GlyphId> {
        if !self.is_cid() {
            return None;
        }

        self.charset.glyph(cid)
    }

    /// The charstring of a glyph and the subroutines it can call.
    pub fn charstring(&self, glyph: GlyphId) -> Option<CharString<'a>> {
        let data = self.char_strings.get(glyph.0)?;
        let local_subrs = self.font_dict(glyph)?.local_subrs;

        Some(CharString {
            data,
            global_subrs: self.global_subrs,
            local_subrs,
        })
    }

    fn font_dict(&self, glyph: GlyphId) -> Option<&FontDict<'a>> {
        if glyph.0 >= self.number_of_glyphs() {
            return None;
        }

        match &self.kind {
            Kind::NameKeyed(font_dict) => Some(font_dict),
            Kind::CidKeyed { fd_array, fd_select } => {
                fd_array.get(usize::from(fd_select.font_dict_index(glyph)?))
            }
        }
    }
}

/// Read the Private DICT and local subroutines a Top or Font DICT points to.
fn read_font_dict<'a>(
    data: &'a [u8],
    dict: &TopDict,
    strings: &Strings<'_>,
    options: ParseOptions,
) -> Result<FontDict<'a>> {
    let Some(range) = dict.private.clone() else {
        return Ok(FontDict::default());
    };

    let Some(private_data) = data.get(range.clone()) else {
        return lenient(None, FontError::Truncated { table: "Private DICT" }, options);
    };

    let private = read_dict_data(private_data, PrivateDict::default(), strings, "Private DICT", options)?;

    let local_subrs = match private.subrs {
        Some(offset) => lenient(
            range
                .start
                .checked_add(offset)
                .and_then(|offset| parse_index(&mut Reader::new_at(data, offset))),
            FontError::Truncated {
                table: "Local Subr INDEX",
            },
            options,
        )?,
        None => Index::default(),
    };

    Ok(FontDict {
        private,
        local_subrs: Subroutines::new(local_subrs),
    })
}

fn read_dict_data<T: ApplyOperation>(
    data: &[u8],
    mut target: T,
    strings: &Strings<'_>,
    table: &'static str,
    options: ParseOptions,
) -> Result<T> {
    lenient(
        read_dict(data, &mut target, strings),
        FontError::InvalidFormat {
            table,
            reason: "well-formed DICT data",
        },
        options,
    )?;

    Ok(target)
}

/// Unwrap `value`, or fall back to the default in lenient mode.
fn lenient<T: Default>(value: Option<T>, error: FontError, options: ParseOptions) -> Result<T> {
    match value {
        Some(value) => Ok(value),
        None if options.lenient => {
            warn!("{error}, continuing without it");
            Ok(T::default())
        }
        None => Err(error),
    }
}
