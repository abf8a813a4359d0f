use crate::truetype::{Tag, TrueTypeFont, read_table_directory};
use log::warn;
use quire_common::byte::Reader;

/// The value the checksum of a whole font must add up to.
const FONT_CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Offset of `checkSumAdjustment` inside the `head` table.
const ADJUSTMENT_OFFSET: usize = 8;

/// Compute the checksum of a table.
///
/// The data is summed as big-endian 32-bit words, with the final word
/// padded with zeros.
pub fn table_checksum(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(4);
    let mut sum = chunks.by_ref().fold(0_u32, |sum, chunk| {
        sum.wrapping_add(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    });

    let rest = chunks.remainder();

    if !rest.is_empty() {
        let mut last = [0; 4];
        last[..rest.len()].copy_from_slice(rest);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }

    sum
}

/// Compute the checksum of a whole font file, treating the
/// `checkSumAdjustment` field of `head` as zero.
///
/// Returns `None` if the table directory can't be read.
pub fn font_checksum(data: &[u8]) -> Option<u32> {
    let records = read_table_directory(&mut Reader::new_at(data, 4)).ok()?;
    let mut sum = table_checksum(data);

    if let Some(head) = records.iter().find(|r| r.tag == Tag::HEAD) {
        let start = head.offset as usize + ADJUSTMENT_OFFSET;

        if let Some(adjustment) = data.get(start..start + 4) {
            // The field is 4-byte aligned whenever the table is, so it
            // occupies exactly one word of the sum.
            let adjustment =
                u32::from_be_bytes([adjustment[0], adjustment[1], adjustment[2], adjustment[3]]);
            sum = sum.wrapping_sub(adjustment);
        }
    }

    Some(sum)
}

/// Check the checksums of all tables and the `checkSumAdjustment` of the
/// font.
///
/// Every mismatch is logged as a warning.
pub fn verify_font(font: &TrueTypeFont<'_>) -> bool {
    let data = font.data();
    let mut valid = true;

    for record in font.table_records() {
        let Some(table) = data.get(record.range()) else {
            warn!("`{}` table is out of bounds", record.tag);
            valid = false;
            continue;
        };

        let mut actual = table_checksum(table);

        if record.tag == Tag::HEAD {
            actual = actual.wrapping_sub(font.head().checksum_adjustment);
        }

        if actual != record.checksum {
            warn!(
                "checksum mismatch in `{}` table: expected {:#010x}, found {:#010x}",
                record.tag, record.checksum, actual
            );
            valid = false;
        }
    }

    match font_checksum(data) {
        Some(sum) => {
            let expected = FONT_CHECKSUM_MAGIC.wrapping_sub(sum);
            let adjustment = font.head().checksum_adjustment;

            if expected != adjustment {
                warn!(
                    "invalid checksum adjustment: expected {expected:#010x}, found {adjustment:#010x}"
                );
                valid = false;
            }
        }
        None => valid = false,
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;
    use crate::truetype::tests::outline_font;

    /// Store the correct `checkSumAdjustment` in an assembled font.
    fn fix_adjustment(data: &mut [u8]) {
        let font = TrueTypeFont::parse(data, ParseOptions::default()).unwrap();
        let head = font.table_record(Tag::HEAD).unwrap().offset as usize;
        let sum = font_checksum(data).unwrap();

        data[head + 8..head + 12].copy_from_slice(&FONT_CHECKSUM_MAGIC.wrapping_sub(sum).to_be_bytes());
    }

    #[test]
    fn table_checksums() {
        assert_eq!(table_checksum(&[]), 0);
        assert_eq!(table_checksum(&[0, 0, 0, 1, 0, 0, 0, 2]), 3);
        assert_eq!(table_checksum(&[0, 0, 0, 1, 0x80]), 0x8000_0001);
        assert_eq!(table_checksum(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 2]), 1);
    }

    #[test]
    fn verify_valid_font() {
        let mut data = outline_font();
        fix_adjustment(&mut data);

        let font = TrueTypeFont::parse(&data, ParseOptions::default()).unwrap();
        assert_ne!(font.head().checksum_adjustment, 0);
        assert!(verify_font(&font));
    }

    #[test]
    fn verify_corrupted_font() {
        let mut data = outline_font();
        fix_adjustment(&mut data);

        let font = TrueTypeFont::parse(&data, ParseOptions::default()).unwrap();
        let hmtx = font.table_record(Tag::HMTX).unwrap().offset as usize;
        data[hmtx] ^= 0x01;

        let font = TrueTypeFont::parse(&data, ParseOptions::default()).unwrap();
        assert!(!verify_font(&font));
    }

    #[test]
    fn missing_adjustment() {
        let data = outline_font();
        let font = TrueTypeFont::parse(&data, ParseOptions::default()).unwrap();

        assert!(!verify_font(&font));
    }
}
