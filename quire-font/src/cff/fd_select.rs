use crate::GlyphId;
use quire_common::byte::Reader;

/// Maps glyphs of a CID-keyed font to Font DICTs in the FDArray.
#[derive(Clone, Debug)]
pub(crate) enum FdSelect {
    /// One Font DICT index per glyph.
    Format0(Vec<u8>),
    /// Ranges of glyphs as `(first, fd)`, sorted by first glyph, followed
    /// by the sentinel glyph that ends the last range.
    Format3 { ranges: Vec<(u16, u8)>, sentinel: u16 },
}

/// Selects the first Font DICT for every glyph.
impl Default for FdSelect {
    fn default() -> Self {
        Self::Format3 {
            ranges: vec![(0, 0)],
            sentinel: u16::MAX,
        }
    }
}

impl FdSelect {
    pub(crate) fn parse(data: &[u8], offset: usize, number_of_glyphs: u16) -> Option<Self> {
        let mut r = Reader::new_at(data, offset);

        match r.read_u8()? {
            0 => Some(Self::Format0(
                r.read_bytes(usize::from(number_of_glyphs))?.to_vec(),
            )),
            3 => {
                let count = r.read_u16()?;
                let mut ranges = Vec::with_capacity(usize::from(count));

                for _ in 0..count {
                    let first = r.read_u16()?;
                    let fd = r.read_u8()?;

                    if ranges.last().is_some_and(|(last, _)| *last >= first) {
                        return None;
                    }

                    ranges.push((first, fd));
                }

                let sentinel = r.read_u16()?;

                if ranges.first().is_some_and(|(first, _)| *first != 0) {
                    return None;
                }

                Some(Self::Format3 { ranges, sentinel })
            }
            _ => None,
        }
    }

    /// The Font DICT index of a glyph.
    pub(crate) fn font_dict_index(&self, glyph: GlyphId) -> Option<u8> {
        match self {
            Self::Format0(fds) => fds.get(usize::from(glyph.0)).copied(),
            Self::Format3 { ranges, sentinel } => {
                if glyph.0 >= *sentinel {
                    return None;
                }

                let next = ranges.partition_point(|(first, _)| *first <= glyph.0);
                ranges.get(next.checked_sub(1)?).map(|(_, fd)| *fd)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_0() {
        let select = FdSelect::parse(&[0, 0, 1, 1], 0, 3).unwrap();

        assert_eq!(select.font_dict_index(GlyphId(0)), Some(0));
        assert_eq!(select.font_dict_index(GlyphId(2)), Some(1));
        assert_eq!(select.font_dict_index(GlyphId(3)), None);
        assert!(FdSelect::parse(&[0, 0], 0, 3).is_none());
    }

    #[test]
    fn format_3() {
        let data = [3, 0, 2, 0, 0, 0, 0, 10, 1, 0, 20];
        let select = FdSelect::parse(&data, 0, 20).unwrap();

        assert_eq!(select.font_dict_index(GlyphId(0)), Some(0));
        assert_eq!(select.font_dict_index(GlyphId(9)), Some(0));
        assert_eq!(select.font_dict_index(GlyphId(10)), Some(1));
        assert_eq!(select.font_dict_index(GlyphId(19)), Some(1));
        assert_eq!(select.font_dict_index(GlyphId(20)), None);
    }

    #[test]
    fn invalid_ranges() {
        // First range does not start at glyph 0.
        assert!(FdSelect::parse(&[3, 0, 1, 0, 1, 0, 0, 5], 0, 5).is_none());
        // Unsorted ranges.
        assert!(FdSelect::parse(&[3, 0, 2, 0, 0, 0, 0, 0, 1, 0, 5], 0, 5).is_none());
        assert!(FdSelect::parse(&[4], 0, 5).is_none());
    }
}
