use crate::GlyphId;
use crate::truetype::read_fixed;
use log::debug;
use quire_common::byte::Reader;

/// The PostScript table.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostScriptTable {
    /// The raw 16.16 format, e.g. `0x00020000`.
    pub format: u32,
    pub italic_angle: f64,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: bool,
    glyph_names: GlyphNames,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum GlyphNames {
    /// Format 1: the standard Macintosh glyph order.
    Standard,
    /// Format 2: an index per glyph, into the standard names followed by
    /// the custom ones.
    Indexed {
        indices: Vec<u16>,
        custom: Vec<String>,
    },
    /// Format 3, or anything else: no names.
    #[default]
    None,
}

impl PostScriptTable {
    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);

        let format = r.read_u32()?;
        let italic_angle = read_fixed(&mut r)?;
        let underline_position = r.read_i16()?;
        let underline_thickness = r.read_i16()?;
        let is_fixed_pitch = r.read_u32()? != 0;
        // Memory usage hints.
        r.skip_bytes(16)?;

        let glyph_names = match format {
            0x0001_0000 => GlyphNames::Standard,
            0x0002_0000 => read_indexed_names(&mut r)?,
            _ => {
                debug!("`post` format {format:#010x} has no glyph names");
                GlyphNames::None
            }
        };

        Some(Self {
            format,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
            glyph_names,
        })
    }

    /// The name of a glyph.
    pub fn glyph_name(&self, glyph: GlyphId) -> Option<&str> {
        match &self.glyph_names {
            GlyphNames::Standard => MAC_GLYPH_NAMES.get(usize::from(glyph.0)).copied(),
            GlyphNames::Indexed { indices, custom } => {
                let index = usize::from(*indices.get(usize::from(glyph.0))?);

                match index.checked_sub(MAC_GLYPH_NAMES.len()) {
                    None => Some(MAC_GLYPH_NAMES[index]),
                    Some(custom_index) => custom.get(custom_index).map(String::as_str),
                }
            }
            GlyphNames::None => None,
        }
    }
}

fn read_indexed_names(r: &mut Reader<'_>) -> Option<GlyphNames> {
    let num_glyphs = r.read_u16()?;
    let indices = (0..num_glyphs)
        .map(|_| r.read_u16())
        .collect::<Option<Vec<_>>>()?;

    // Pascal strings until the end of the table.
    let mut custom = Vec::new();

    while let Some(len) = r.read_u8() {
        let Some(name) = r.read_bytes(usize::from(len)) else {
            debug!("`post` table ends inside of a glyph name");
            break;
        };

        custom.push(String::from_utf8_lossy(name).into_owned());
    }

    Some(GlyphNames::Indexed { indices, custom })
}

/// The names of the standard Macintosh glyph order.
const MAC_GLYPH_NAMES: [&str; 258] = [
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign", "dollar",
    "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk", "plus", "comma",
    "hyphen", "period", "slash", "zero", "one", "two", "three", "four", "five", "six", "seven",
    "eight", "nine", "colon", "semicolon", "less", "equal", "greater", "question", "at", "A", "B",
    "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U",
    "V", "W", "X", "Y", "Z", "bracketleft", "backslash", "bracketright", "asciicircum",
    "underscore", "grave", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
    "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar", "braceright",
    "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis", "Udieresis",
    "aacute", "agrave", "acircumflex", "adieresis", "atilde", "aring", "ccedilla", "eacute",
    "egrave", "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis", "ntilde",
    "oacute", "ograve", "ocircumflex", "odieresis", "otilde", "uacute", "ugrave", "ucircumflex",
    "udieresis", "dagger", "degree", "cent", "sterling", "section", "bullet", "paragraph",
    "germandbls", "registered", "copyright", "trademark", "acute", "dieresis", "notequal", "AE",
    "Oslash", "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff",
    "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae",
    "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin", "approxequal",
    "Delta", "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft",
    "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency",
    "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered", "quotesinglbase",
    "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis", "Egrave",
    "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex", "apple", "Ograve",
    "Uacute", "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde", "macron", "breve",
    "dotaccent", "ring", "cedilla", "hungarumlaut", "ogonek", "caron", "Lslash", "lslash",
    "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth", "Yacute", "yacute", "Thorn",
    "thorn", "minus", "multiply", "onesuperior", "twosuperior", "threesuperior", "onehalf",
    "onequarter", "threequarters", "franc", "Gbreve", "gbreve", "Idotaccent", "Scedilla",
    "scedilla", "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];
