//! Mapping from glyph IDs to string IDs or CIDs.

use crate::GlyphId;
use quire_common::byte::Reader;
use rustc_hash::FxHashMap;

/// The last string ID of the predefined ISOAdobe charset.
const ISO_ADOBE_LAST_SID: u16 = 228;

/// A decoded charset.
///
/// For name-keyed fonts the IDs are string IDs, for CID-keyed fonts they
/// are CIDs. Glyph 0 is always `.notdef`, with ID 0.
#[derive(Clone, Debug, Default)]
pub(crate) struct Charset {
    ids: Vec<u16>,
    glyphs: FxHashMap<u16, GlyphId>,
}

impl Charset {
    /// Read the charset at `offset`, where offsets 0 to 2 select the
    /// predefined charsets.
    pub(crate) fn parse(data: &[u8], offset: usize, number_of_glyphs: u16) -> Option<Self> {
        let count = usize::from(number_of_glyphs);

        let ids = match offset {
            0 => (0..=ISO_ADOBE_LAST_SID).take(count).collect(),
            1 => EXPERT_CHARSET.iter().copied().take(count).collect(),
            2 => EXPERT_SUBSET_CHARSET.iter().copied().take(count).collect(),
            _ => read_charset(&mut Reader::new_at(data, offset), count)?,
        };

        Some(Self::from_ids(ids))
    }

    fn from_ids(ids: Vec<u16>) -> Self {
        let mut glyphs = FxHashMap::default();

        for (gid, id) in ids.iter().enumerate() {
            // The first glyph wins if an ID is repeated.
            glyphs.entry(*id).or_insert(GlyphId(gid as u16));
        }

        Self { ids, glyphs }
    }

    pub(crate) fn id(&self, glyph: GlyphId) -> Option<u16> {
        self.ids.get(usize::from(glyph.0)).copied()
    }

    pub(crate) fn glyph(&self, id: u16) -> Option<GlyphId> {
        self.glyphs.get(&id).copied()
    }
}

fn read_charset(r: &mut Reader<'_>, count: usize) -> Option<Vec<u16>> {
    let mut ids = Vec::with_capacity(count);
    ids.push(0);

    match r.read_u8()? {
        0 => {
            while ids.len() < count {
                ids.push(r.read_u16()?);
            }
        }
        format @ (1 | 2) => {
            while ids.len() < count {
                let first = r.read_u16()?;
                let left = if format == 1 {
                    u16::from(r.read_u8()?)
                } else {
                    r.read_u16()?
                };

                for i in 0..=left {
                    if ids.len() == count {
                        break;
                    }

                    ids.push(first.checked_add(i)?);
                }
            }
        }
        _ => return None,
    }

    ids.truncate(count);

    Some(ids)
}

pub(crate) const EXPERT_CHARSET: [u16; 166] = [
    0, 1, 229, 230, 231, 232, 233, 234, 235, 236, 237, 238,
    13, 14, 15, 99, 239, 240, 241, 242, 243, 244, 245, 246,
    247, 248, 27, 28, 249, 250, 251, 252, 253, 254, 255, 256,
    257, 258, 259, 260, 261, 262, 263, 264, 265, 266, 109, 110,
    267, 268, 269, 270, 271, 272, 273, 274, 275, 276, 277, 278,
    279, 280, 281, 282, 283, 284, 285, 286, 287, 288, 289, 290,
    291, 292, 293, 294, 295, 296, 297, 298, 299, 300, 301, 302,
    303, 304, 305, 306, 307, 308, 309, 310, 311, 312, 313, 314,
    315, 316, 317, 318, 158, 155, 163, 319, 320, 321, 322, 323,
    324, 325, 326, 150, 164, 169, 327, 328, 329, 330, 331, 332,
    333, 334, 335, 336, 337, 338, 339, 340, 341, 342, 343, 344,
    345, 346, 347, 348, 349, 350, 351, 352, 353, 354, 355, 356,
    357, 358, 359, 360, 361, 362, 363, 364, 365, 366, 367, 368,
    369, 370, 371, 372, 373, 374, 375, 376, 377, 378,
];

pub(crate) const EXPERT_SUBSET_CHARSET: [u16; 87] = [
    0, 1, 231, 232, 235, 236, 237, 238, 13, 14, 15, 99,
    239, 240, 241, 242, 243, 244, 245, 246, 247, 248, 27, 28,
    249, 250, 251, 253, 254, 255, 256, 257, 258, 259, 260, 261,
    262, 263, 264, 265, 266, 109, 110, 267, 268, 269, 270, 272,
    300, 301, 302, 305, 314, 315, 158, 155, 163, 320, 321, 322,
    323, 324, 325, 326, 150, 164, 169, 327, 328, 329, 330, 331,
    332, 333, 334, 335, 336, 337, 338, 339, 340, 341, 342, 343,
    344, 345, 346,
];
