use crate::ParseOptions;
use crate::error::{FontError, Result};
use log::warn;
use quire_common::byte::Reader;

/// The offsets of all glyphs in `glyf`.
///
/// Holds `numGlyphs + 1` offsets. Glyph `i` spans from offset `i` to
/// offset `i + 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexToLocationTable {
    offsets: Vec<u32>,
}

impl IndexToLocationTable {
    pub(crate) fn parse(
        data: &[u8],
        index_to_loc_format: i16,
        num_glyphs: u16,
        options: ParseOptions,
    ) -> Result<Self> {
        let mut r = Reader::new(data);
        let count = usize::from(num_glyphs) + 1;
        let mut offsets = Vec::with_capacity(count);

        for _ in 0..count {
            let offset = match index_to_loc_format {
                // Short offsets are stored divided by two.
                0 => r.read_u16().map(|o| u32::from(o) * 2),
                1 => r.read_u32(),
                _ => {
                    return Err(FontError::InvalidFormat {
                        table: "head",
                        reason: "indexToLocFormat of 0 or 1",
                    });
                }
            };

            match offset {
                Some(offset) => offsets.push(offset),
                None if options.lenient => {
                    warn!("`loca` has {} of {count} offsets", offsets.len());
                    break;
                }
                None => return Err(FontError::Truncated { table: "loca" }),
            }
        }

        Ok(Self { offsets })
    }

    /// The offsets, one more than there are glyphs.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// The number of glyphs described by the table.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Whether the table describes no glyphs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long() {
        let short = IndexToLocationTable::parse(&[0, 0, 0, 5, 0, 5], 0, 2, ParseOptions::default()).unwrap();
        assert_eq!(short.offsets(), [0, 10, 10]);
        assert_eq!(short.len(), 2);

        let long = IndexToLocationTable::parse(&[0, 0, 0, 0, 0, 1, 0, 0], 1, 1, ParseOptions::default()).unwrap();
        assert_eq!(long.offsets(), [0, 65536]);
    }

    #[test]
    fn truncated() {
        let data = [0, 0, 0, 5];

        assert_eq!(
            IndexToLocationTable::parse(&data, 0, 2, ParseOptions::default()),
            Err(FontError::Truncated { table: "loca" })
        );

        let table = IndexToLocationTable::parse(&data, 0, 2, ParseOptions::lenient(true)).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn invalid_format() {
        assert!(matches!(
            IndexToLocationTable::parse(&[0; 8], 2, 1, ParseOptions::lenient(true)),
            Err(FontError::InvalidFormat { .. })
        ));
    }
}
