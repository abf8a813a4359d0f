//! Reading sfnt fonts.
//!
//! The table directory is read first. `head`, `hhea` and `maxp` must always
//! be present, and fonts with TrueType outlines also need `loca` and `glyf`.
//! All other tables are optional: if one of them is malformed, it is logged
//! and treated as absent.

mod checksum;
mod cmap;
mod glyf;
mod head;
mod hhea;
mod hmtx;
mod loca;
mod maxp;
mod name;
mod os2;
mod post;

pub use checksum::{font_checksum, table_checksum, verify_font};
pub use cmap::{CMapSubtable, CMapTable};
pub use glyf::{
    ComponentPlacement, CompositeGlyph, Glyph, GlyphComponent, GlyphDescription, GlyphPoint,
    GlyphTable, SimpleGlyph,
};
pub use head::{DateTime, HeaderTable};
pub use hhea::HorizontalHeaderTable;
pub use hmtx::{HorizontalMetrics, HorizontalMetricsTable};
pub use loca::IndexToLocationTable;
pub use maxp::{MaximumProfileLimits, MaximumProfileTable};
pub use name::{NameRecord, NameTable};
pub use os2::{Os2Table, TypographicMetrics};
pub use post::PostScriptTable;

use crate::error::{FontError, Result};
use crate::{GlyphId, ParseOptions, Rect, cff};
use core::fmt;
use log::{debug, warn};
use quire_common::byte::Reader;

/// A 4-byte table tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

#[allow(missing_docs)]
impl Tag {
    pub const HEAD: Self = Self(*b"head");
    pub const HHEA: Self = Self(*b"hhea");
    pub const HMTX: Self = Self(*b"hmtx");
    pub const MAXP: Self = Self(*b"maxp");
    pub const LOCA: Self = Self(*b"loca");
    pub const GLYF: Self = Self(*b"glyf");
    pub const CMAP: Self = Self(*b"cmap");
    pub const NAME: Self = Self(*b"name");
    pub const POST: Self = Self(*b"post");
    pub const OS2: Self = Self(*b"OS/2");
    pub const CFF: Self = Self(*b"CFF ");
}

impl Tag {
    /// The tag as text, with non-ASCII bytes replaced.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// An entry of the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    /// The table tag.
    pub tag: Tag,
    /// The checksum stored for the table.
    pub checksum: u32,
    /// The offset of the table from the start of the font.
    pub offset: u32,
    /// The length of the table in bytes.
    pub length: u32,
}

impl TableRecord {
    fn range(&self) -> core::ops::Range<usize> {
        let start = self.offset as usize;
        start..start.saturating_add(self.length as usize)
    }
}

/// A parsed sfnt font.
#[derive(Debug, Clone)]
pub struct TrueTypeFont<'a> {
    data: &'a [u8],
    version: u32,
    records: Vec<TableRecord>,
    head: HeaderTable,
    hhea: HorizontalHeaderTable,
    maxp: MaximumProfileTable,
    hmtx: Option<HorizontalMetricsTable>,
    glyf: Option<GlyphTable>,
    cmap: Option<CMapTable>,
    name: Option<NameTable>,
    post: Option<PostScriptTable>,
    os2: Option<Os2Table>,
}

impl<'a> TrueTypeFont<'a> {
    /// Parse the table directory and all known tables of a font.
    pub fn parse(data: &'a [u8], options: ParseOptions) -> Result<Self> {
        let mut r = Reader::new(data);
        let version = r.read_u32().ok_or(FontError::Truncated { table: "sfnt header" })?;

        if !matches!(&version.to_be_bytes(), b"\x00\x01\x00\x00" | b"true" | b"OTTO" | b"typ1") {
            if !options.lenient {
                return Err(FontError::InvalidFormat {
                    table: "sfnt header",
                    reason: "a known sfnt version",
                });
            }

            warn!("unknown sfnt version {version:#010x}");
        }

        let records = read_table_directory(&mut r)?;
        let mut font = TrueTypeFont {
            data,
            version,
            records,
            head: HeaderTable::default(),
            hhea: HorizontalHeaderTable::default(),
            maxp: MaximumProfileTable::default(),
            hmtx: None,
            glyf: None,
            cmap: None,
            name: None,
            post: None,
            os2: None,
        };

        font.head = HeaderTable::parse(font.required(Tag::HEAD)?, options)?;
        font.hhea = HorizontalHeaderTable::parse(font.required(Tag::HHEA)?)
            .ok_or(FontError::Truncated { table: "hhea" })?;
        font.maxp = MaximumProfileTable::parse(font.required(Tag::MAXP)?)
            .ok_or(FontError::Truncated { table: "maxp" })?;

        let num_glyphs = font.maxp.num_glyphs;

        font.hmtx = font.optional(Tag::HMTX, |data| {
            HorizontalMetricsTable::parse(data, font.hhea.number_of_h_metrics, num_glyphs)
        });
        font.cmap = font.optional(Tag::CMAP, CMapTable::parse);
        font.name = font.optional(Tag::NAME, NameTable::parse);
        font.post = font.optional(Tag::POST, PostScriptTable::parse);
        font.os2 = font.optional(Tag::OS2, Os2Table::parse);

        if font.is_cff() {
            debug!("font has CFF outlines, skipping loca and glyf");
        } else {
            match font.read_outlines(options) {
                Ok(glyf) => font.glyf = Some(glyf),
                Err(e) if options.lenient => warn!("font has no usable outlines: {e}"),
                Err(e) => return Err(e),
            }
        }

        Ok(font)
    }

    fn read_outlines(&self, options: ParseOptions) -> Result<GlyphTable> {
        let loca = IndexToLocationTable::parse(
            self.required(Tag::LOCA)?,
            self.head.index_to_loc_format,
            self.maxp.num_glyphs,
            options,
        )?;

        GlyphTable::parse(self.required(Tag::GLYF)?, &loca, options)
    }

    fn required(&self, tag: Tag) -> Result<&'a [u8]> {
        let record = self.table_record(tag).ok_or(FontError::MissingTable(tag))?;

        self.data
            .get(record.range())
            .ok_or(FontError::Truncated { table: "table directory" })
    }

    fn optional<T>(&self, tag: Tag, parse: impl FnOnce(&'a [u8]) -> Option<T>) -> Option<T> {
        let data = self.table(tag)?;
        let table = parse(data);

        if table.is_none() {
            warn!("failed to parse `{tag}` table, ignoring it");
        }

        table
    }

    /// The sfnt version, e.g. `0x00010000` or `OTTO`.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the outlines are stored in a `CFF ` table.
    pub fn is_cff(&self) -> bool {
        self.table_record(Tag::CFF).is_some()
    }

    /// The raw data of the whole font.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The entries of the table directory.
    pub fn table_records(&self) -> &[TableRecord] {
        &self.records
    }

    /// The directory entry for `tag`.
    pub fn table_record(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|r| r.tag == tag)
    }

    /// The raw data of the table with the given tag.
    pub fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        self.data.get(self.table_record(tag)?.range())
    }

    /// The font header.
    pub fn head(&self) -> &HeaderTable {
        &self.head
    }

    /// The horizontal header.
    pub fn hhea(&self) -> &HorizontalHeaderTable {
        &self.hhea
    }

    /// The maximum profile.
    pub fn maxp(&self) -> &MaximumProfileTable {
        &self.maxp
    }

    /// The horizontal metrics.
    pub fn hmtx(&self) -> Option<&HorizontalMetricsTable> {
        self.hmtx.as_ref()
    }

    /// The glyph outlines. Absent for CFF-flavoured fonts.
    pub fn glyf(&self) -> Option<&GlyphTable> {
        self.glyf.as_ref()
    }

    /// The character to glyph mapping.
    pub fn cmap(&self) -> Option<&CMapTable> {
        self.cmap.as_ref()
    }

    /// The naming table.
    pub fn name(&self) -> Option<&NameTable> {
        self.name.as_ref()
    }

    /// The PostScript table.
    pub fn post(&self) -> Option<&PostScriptTable> {
        self.post.as_ref()
    }

    /// The OS/2 and Windows metrics.
    pub fn os2(&self) -> Option<&Os2Table> {
        self.os2.as_ref()
    }

    /// Parse the embedded `CFF ` table.
    pub fn cff(&self, options: ParseOptions) -> Option<Result<cff::Table<'a>>> {
        Some(cff::Table::parse(self.table(Tag::CFF)?, options))
    }

    /// The number of glyphs in the font.
    pub fn number_of_glyphs(&self) -> u16 {
        self.maxp.num_glyphs
    }

    /// The advance width of a glyph, in font units.
    pub fn advance_width(&self, glyph: GlyphId) -> Option<u16> {
        self.hmtx.as_ref()?.get(glyph).map(|m| m.advance_width)
    }

    /// The bounding box of a glyph.
    ///
    /// Glyphs without an outline get a box of zero height that spans their
    /// advance width.
    pub fn glyph_bounds(&self, glyph: GlyphId) -> Option<Rect> {
        if glyph.0 >= self.maxp.num_glyphs {
            return None;
        }

        if let Some(outline) = self.glyf.as_ref().and_then(|g| g.get(glyph)) {
            return Some(outline.bounds);
        }

        let advance = self.advance_width(glyph).unwrap_or(0);

        Some(Rect {
            x_min: 0,
            y_min: 0,
            x_max: i16::try_from(advance).unwrap_or(i16::MAX),
            y_max: 0,
        })
    }

    /// Map a character code to a glyph through the preferred `cmap`
    /// subtable.
    pub fn glyph_index(&self, code: u32) -> Option<GlyphId> {
        self.cmap.as_ref()?.glyph_index(code)
    }

    /// The PostScript name of a glyph.
    pub fn glyph_name(&self, glyph: GlyphId) -> Option<&str> {
        self.post.as_ref()?.glyph_name(glyph)
    }
}

fn read_table_directory(r: &mut Reader<'_>) -> Result<Vec<TableRecord>> {
    const TRUNCATED: FontError = FontError::Truncated {
        table: "table directory",
    };

    let num_tables = r.read_u16().ok_or(TRUNCATED)?;
    // searchRange, entrySelector and rangeShift.
    r.skip_bytes(6).ok_or(TRUNCATED)?;

    let mut records = Vec::with_capacity(usize::from(num_tables));

    for _ in 0..num_tables {
        let record = read_table_record(r).ok_or(TRUNCATED)?;

        // Subset fonts may legitimately carry an empty `glyf`.
        if record.length == 0 && record.tag != Tag::GLYF {
            debug!("skipping empty `{}` table", record.tag);
            continue;
        }

        records.push(record);
    }

    Ok(records)
}

fn read_table_record(r: &mut Reader<'_>) -> Option<TableRecord> {
    Some(TableRecord {
        tag: Tag(r.read_array()?),
        checksum: r.read_u32()?,
        offset: r.read_u32()?,
        length: r.read_u32()?,
    })
}

/// Read a 16.16 fixed-point number.
pub(crate) fn read_fixed(r: &mut Reader<'_>) -> Option<f64> {
    let integer = r.read_i16()?;
    let fraction = r.read_u16()?;

    Some(f64::from(integer) + f64::from(fraction) / 65536.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Assemble an sfnt file from tables, with correct checksums.
    pub(crate) fn build_font(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut tables = tables.to_vec();
        tables.sort_by_key(|(tag, _)| **tag);

        let mut out = Vec::new();
        out.extend(0x0001_0000_u32.to_be_bytes());
        out.extend((tables.len() as u16).to_be_bytes());
        out.extend([0; 6]);

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();

        for (tag, data) in &tables {
            out.extend(*tag);
            out.extend(table_checksum(data).to_be_bytes());
            out.extend((offset as u32).to_be_bytes());
            out.extend((data.len() as u32).to_be_bytes());

            let mut padded = data.clone();
            padded.resize(data.len().next_multiple_of(4), 0);
            offset += padded.len();
            body.extend(padded);
        }

        out.extend(body);
        out
    }

    pub(crate) fn head(index_to_loc_format: i16) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000_u32.to_be_bytes());
        t.extend(0x0001_8000_u32.to_be_bytes());
        t.extend(0_u32.to_be_bytes());
        t.extend(0x5F0F_3CF5_u32.to_be_bytes());
        t.extend(0_u16.to_be_bytes());
        t.extend(1000_u16.to_be_bytes());
        // 2020-01-01T00:00:00 and 1904-01-01T00:00:00.
        t.extend(3_660_681_600_i64.to_be_bytes());
        t.extend(0_i64.to_be_bytes());
        for v in [-10_i16, -200, 900, 800] {
            t.extend(v.to_be_bytes());
        }
        t.extend([0; 6]);
        t.extend(index_to_loc_format.to_be_bytes());
        t.extend(0_i16.to_be_bytes());
        t
    }

    pub(crate) fn hhea(number_of_h_metrics: u16) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000_u32.to_be_bytes());
        for v in [800_i16, -200, 90] {
            t.extend(v.to_be_bytes());
        }
        t.extend(1000_u16.to_be_bytes());
        t.extend([0; 22]);
        t.extend(number_of_h_metrics.to_be_bytes());
        t
    }

    pub(crate) fn maxp(num_glyphs: u16) -> Vec<u8> {
        let mut t = 0x0000_5000_u32.to_be_bytes().to_vec();
        t.extend(num_glyphs.to_be_bytes());
        t
    }

    fn hmtx(metrics: &[(u16, i16)]) -> Vec<u8> {
        metrics
            .iter()
            .flat_map(|(a, l)| a.to_be_bytes().into_iter().chain(l.to_be_bytes()))
            .collect()
    }

    /// A triangle from (0, 0) to (500, 0) to (250, 700).
    fn triangle() -> Vec<u8> {
        let mut g = Vec::new();
        g.extend(1_i16.to_be_bytes());
        for v in [0_i16, 0, 500, 700] {
            g.extend(v.to_be_bytes());
        }
        g.extend(2_u16.to_be_bytes());
        g.extend(0_u16.to_be_bytes());
        // On curve, x and y as words.
        g.extend([0x01, 0x01, 0x01]);
        for v in [0_i16, 500, -250] {
            g.extend(v.to_be_bytes());
        }
        for v in [0_i16, 0, 700] {
            g.extend(v.to_be_bytes());
        }
        g
    }

    pub(crate) fn outline_font() -> Vec<u8> {
        let glyph = triangle();
        let mut glyf = glyph.clone();
        glyf.resize(glyph.len().next_multiple_of(2), 0);
        let end = glyf.len() as u16 / 2;

        let mut loca = Vec::new();
        for v in [0_u16, 0, end, end] {
            loca.extend(v.to_be_bytes());
        }

        build_font(&[
            (b"head", head(0)),
            (b"hhea", hhea(2)),
            (b"maxp", maxp(3)),
            (b"hmtx", hmtx(&[(250, 0), (600, 0)]).into_iter().chain(5_i16.to_be_bytes()).collect()),
            (b"loca", loca),
            (b"glyf", glyf),
            (b"name", vec![]),
        ])
    }

    #[test]
    fn parse_outline_font() {
        let data = outline_font();
        let font = TrueTypeFont::parse(&data, ParseOptions::default()).unwrap();

        assert_eq!(font.number_of_glyphs(), 3);
        assert_eq!(font.head().units_per_em, 1000);
        assert_eq!(font.head().font_revision, 1.5);
        assert!(!font.is_cff());
        // Zero-length tables are dropped from the directory.
        assert!(font.table(Tag::NAME).is_none());
        assert!(font.name().is_none());

        assert_eq!(font.advance_width(GlyphId(0)), Some(250));
        assert_eq!(font.advance_width(GlyphId(2)), Some(600));
        assert_eq!(font.advance_width(GlyphId(3)), None);
    }

    #[test]
    fn glyph_bounds_fallback() {
        let data = outline_font();
        let font = TrueTypeFont::parse(&data, ParseOptions::default()).unwrap();

        assert_eq!(
            font.glyph_bounds(GlyphId(0)),
            Some(Rect {
                x_min: 0,
                y_min: 0,
                x_max: 250,
                y_max: 0
            })
        );
        assert_eq!(
            font.glyph_bounds(GlyphId(1)),
            Some(Rect {
                x_min: 0,
                y_min: 0,
                x_max: 500,
                y_max: 700
            })
        );
        assert_eq!(font.glyph_bounds(GlyphId(3)), None);
    }

    #[test]
    fn missing_required_table() {
        let data = build_font(&[(b"head", head(0)), (b"maxp", maxp(1))]);

        assert_eq!(
            TrueTypeFont::parse(&data, ParseOptions::default()).unwrap_err(),
            FontError::MissingTable(Tag::HHEA)
        );
    }

    #[test]
    fn missing_outlines() {
        let data = build_font(&[(b"head", head(0)), (b"hhea", hhea(0)), (b"maxp", maxp(1))]);

        assert_eq!(
            TrueTypeFont::parse(&data, ParseOptions::default()).unwrap_err(),
            FontError::MissingTable(Tag::LOCA)
        );

        let font = TrueTypeFont::parse(&data, ParseOptions::lenient(true)).unwrap();
        assert!(font.glyf().is_none());
    }

    #[test]
    fn cff_flavoured_font_skips_outlines() {
        let data = build_font(&[
            (b"CFF ", vec![1, 0, 4, 1]),
            (b"head", head(0)),
            (b"hhea", hhea(0)),
            (b"maxp", maxp(1)),
        ]);

        let font = TrueTypeFont::parse(&data, ParseOptions::default()).unwrap();
        assert!(font.is_cff());
        assert!(font.glyf().is_none());
    }

    #[test]
    fn fixed_numbers() {
        let mut r = Reader::new(&[0xFF, 0xFF, 0x80, 0x00, 0x00, 0x02, 0x40, 0x00]);

        assert_eq!(read_fixed(&mut r), Some(-0.5));
        assert_eq!(read_fixed(&mut r), Some(2.25));
        assert_eq!(read_fixed(&mut r), None);
    }
}
