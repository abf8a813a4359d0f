use crate::GlyphId;
use log::debug;
use quire_common::byte::Reader;

/// The character to glyph index mapping table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CMapTable {
    subtables: Vec<CMapSubtable>,
}

/// One encoding of a `cmap` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CMapSubtable {
    /// The platform, e.g. 3 for Windows.
    pub platform_id: u16,
    /// The platform-specific encoding, e.g. 1 for Unicode BMP on Windows.
    pub encoding_id: u16,
    mapping: Mapping,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Mapping {
    /// Format 0.
    ByteEncoding(Vec<u8>),
    /// Format 4.
    SegmentMapping {
        segments: Vec<Segment>,
        glyph_ids: Vec<u16>,
    },
    /// Format 6.
    TrimmedTable { first_code: u16, glyph_ids: Vec<u16> },
    /// Format 12.
    SegmentedCoverage(Vec<SequentialGroup>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    start: u16,
    end: u16,
    delta: i16,
    range_offset: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SequentialGroup {
    start: u32,
    end: u32,
    start_glyph: u32,
}

impl CMapTable {
    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);
        let _version = r.read_u16()?;
        let num_tables = r.read_u16()?;

        let mut subtables = Vec::new();

        for _ in 0..num_tables {
            let platform_id = r.read_u16()?;
            let encoding_id = r.read_u16()?;
            let offset = r.read_u32()? as usize;

            let Some(mapping) = data.get(offset..).and_then(Mapping::parse) else {
                debug!("skipping unsupported cmap subtable ({platform_id}, {encoding_id})");
                continue;
            };

            subtables.push(CMapSubtable {
                platform_id,
                encoding_id,
                mapping,
            });
        }

        Some(Self { subtables })
    }

    /// All subtables that could be decoded.
    pub fn subtables(&self) -> &[CMapSubtable] {
        &self.subtables
    }

    /// The subtable for a platform and encoding.
    pub fn subtable(&self, platform_id: u16, encoding_id: u16) -> Option<&CMapSubtable> {
        self.subtables
            .iter()
            .find(|s| s.platform_id == platform_id && s.encoding_id == encoding_id)
    }

    /// The subtable that character codes are looked up in.
    ///
    /// Windows Unicode comes first, then Windows Symbol, Mac Roman and any
    /// Unicode platform table, and finally whatever comes first.
    pub fn preferred_subtable(&self) -> Option<&CMapSubtable> {
        self.subtable(3, 1)
            .or_else(|| self.subtable(3, 0))
            .or_else(|| self.subtable(1, 0))
            .or_else(|| self.subtables.iter().find(|s| s.platform_id == 0))
            .or_else(|| self.subtables.first())
    }

    /// Map a character code through the preferred subtable.
    ///
    /// Symbol fonts often map their codes into the `0xF000` private use
    /// range, which is tried as well.
    pub fn glyph_index(&self, code: u32) -> Option<GlyphId> {
        let subtable = self.preferred_subtable()?;

        subtable.glyph_index(code).or_else(|| {
            (subtable.platform_id == 3 && subtable.encoding_id == 0 && code <= 0xFF)
                .then(|| subtable.glyph_index(0xF000 + code))
                .flatten()
        })
    }
}

impl CMapSubtable {
    /// The format of the subtable.
    pub fn format(&self) -> u16 {
        match self.mapping {
            Mapping::ByteEncoding(_) => 0,
            Mapping::SegmentMapping { .. } => 4,
            Mapping::TrimmedTable { .. } => 6,
            Mapping::SegmentedCoverage(_) => 12,
        }
    }

    /// Map a character code to a glyph. Codes mapping to glyph 0 are
    /// reported as unmapped.
    pub fn glyph_index(&self, code: u32) -> Option<GlyphId> {
        let glyph = match &self.mapping {
            Mapping::ByteEncoding(glyphs) => u16::from(*glyphs.get(code as usize)?),
            Mapping::SegmentMapping {
                segments,
                glyph_ids,
            } => segment_lookup(segments, glyph_ids, u16::try_from(code).ok()?)?,
            Mapping::TrimmedTable {
                first_code,
                glyph_ids,
            } => {
                let index = code.checked_sub(u32::from(*first_code))?;
                *glyph_ids.get(index as usize)?
            }
            Mapping::SegmentedCoverage(groups) => {
                let group = groups.iter().find(|g| (g.start..=g.end).contains(&code))?;
                u16::try_from(group.start_glyph.checked_add(code - group.start)?).ok()?
            }
        };

        (glyph != 0).then_some(GlyphId(glyph))
    }
}

impl Mapping {
    fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);

        match r.read_u16()? {
            0 => {
                let _length = r.read_u16()?;
                let _language = r.read_u16()?;

                Some(Self::ByteEncoding(r.read_bytes(256)?.to_vec()))
            }
            4 => {
                let length = usize::from(r.read_u16()?);
                let _language = r.read_u16()?;
                let seg_count = usize::from(r.read_u16()? / 2);
                // searchRange, entrySelector and rangeShift.
                r.skip_bytes(6)?;

                let ends = read_u16s(&mut r, seg_count)?;
                let _reserved_pad = r.read_u16()?;
                let starts = read_u16s(&mut r, seg_count)?;
                let deltas = read_u16s(&mut r, seg_count)?;
                let range_offsets = read_u16s(&mut r, seg_count)?;

                let remaining = length.min(data.len()).saturating_sub(r.offset()) / 2;
                let glyph_ids = read_u16s(&mut r, remaining)?;

                let segments = (0..seg_count)
                    .map(|i| Segment {
                        start: starts[i],
                        end: ends[i],
                        delta: deltas[i] as i16,
                        range_offset: range_offsets[i],
                    })
                    .collect();

                Some(Self::SegmentMapping {
                    segments,
                    glyph_ids,
                })
            }
            6 => {
                let _length = r.read_u16()?;
                let _language = r.read_u16()?;
                let first_code = r.read_u16()?;
                let count = usize::from(r.read_u16()?);

                Some(Self::TrimmedTable {
                    first_code,
                    glyph_ids: read_u16s(&mut r, count)?,
                })
            }
            12 => {
                let _reserved = r.read_u16()?;
                let _length = r.read_u32()?;
                let _language = r.read_u32()?;
                let count = r.read_u32()?;

                let mut groups = Vec::new();

                for _ in 0..count {
                    groups.push(SequentialGroup {
                        start: r.read_u32()?,
                        end: r.read_u32()?,
                        start_glyph: r.read_u32()?,
                    });
                }

                Some(Self::SegmentedCoverage(groups))
            }
            _ => None,
        }
    }
}

fn read_u16s(r: &mut Reader<'_>, count: usize) -> Option<Vec<u16>> {
    (0..count).map(|_| r.read_u16()).collect()
}

fn segment_lookup(segments: &[Segment], glyph_ids: &[u16], code: u16) -> Option<u16> {
    let (index, segment) = segments
        .iter()
        .enumerate()
        .find(|(_, s)| s.start <= code && code <= s.end)?;

    if segment.range_offset == 0 {
        return Some(code.wrapping_add(segment.delta as u16));
    }

    // The range offset is relative to its own position in the
    // idRangeOffset array, which directly precedes the glyph ids.
    let glyph_index = (usize::from(segment.range_offset) / 2 + usize::from(code - segment.start) + index)
        .checked_sub(segments.len())?;
    let glyph = *glyph_ids.get(glyph_index)?;

    (glyph != 0).then(|| glyph.wrapping_add(segment.delta as u16))
}
