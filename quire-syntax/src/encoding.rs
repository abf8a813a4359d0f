//! Single-byte text encodings used for names and strings.

/// Decode bytes as PDFDocEncoding.
pub(crate) fn decode_pdf_doc(bytes: &[u8]) -> String {
    bytes.iter().map(|b| pdf_doc_char(*b)).collect()
}

/// Decode bytes as Windows-1252.
pub(crate) fn decode_windows_1252(bytes: &[u8]) -> String {
    bytes.iter().map(|b| windows_1252_char(*b)).collect()
}

/// Decode UTF-16 code units, replacing unpaired surrogates.
pub(crate) fn decode_utf16(bytes: &[u8], big_endian: bool) -> String {
    let units = bytes.chunks_exact(2).map(|c| {
        if big_endian {
            u16::from_be_bytes([c[0], c[1]])
        } else {
            u16::from_le_bytes([c[0], c[1]])
        }
    });

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn pdf_doc_char(b: u8) -> char {
    let code = match b {
        0x18 => 0x02D8,
        0x19 => 0x02C7,
        0x1A => 0x02C6,
        0x1B => 0x02D9,
        0x1C => 0x02DD,
        0x1D => 0x02DB,
        0x1E => 0x02DA,
        0x1F => 0x02DC,
        0x80 => 0x2022,
        0x81 => 0x2020,
        0x82 => 0x2021,
        0x83 => 0x2026,
        0x84 => 0x2014,
        0x85 => 0x2013,
        0x86 => 0x0192,
        0x87 => 0x2044,
        0x88 => 0x2039,
        0x89 => 0x203A,
        0x8A => 0x2212,
        0x8B => 0x2030,
        0x8C => 0x201E,
        0x8D => 0x201C,
        0x8E => 0x201D,
        0x8F => 0x2018,
        0x90 => 0x2019,
        0x91 => 0x201A,
        0x92 => 0x2122,
        0x93 => 0xFB01,
        0x94 => 0xFB02,
        0x95 => 0x0141,
        0x96 => 0x0152,
        0x97 => 0x0160,
        0x98 => 0x0178,
        0x99 => 0x017D,
        0x9A => 0x0131,
        0x9B => 0x0142,
        0x9C => 0x0153,
        0x9D => 0x0161,
        0x9E => 0x017E,
        0xA0 => 0x20AC,
        _ => u32::from(b),
    };

    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn windows_1252_char(b: u8) -> char {
    let code = match b {
        0x80 => 0x20AC,
        0x82 => 0x201A,
        0x83 => 0x0192,
        0x84 => 0x201E,
        0x85 => 0x2026,
        0x86 => 0x2020,
        0x87 => 0x2021,
        0x88 => 0x02C6,
        0x89 => 0x2030,
        0x8A => 0x0160,
        0x8B => 0x2039,
        0x8C => 0x0152,
        0x8E => 0x017D,
        0x91 => 0x2018,
        0x92 => 0x2019,
        0x93 => 0x201C,
        0x94 => 0x201D,
        0x95 => 0x2022,
        0x96 => 0x2013,
        0x97 => 0x2014,
        0x98 => 0x02DC,
        0x99 => 0x2122,
        0x9A => 0x0161,
        0x9B => 0x203A,
        0x9C => 0x0153,
        0x9E => 0x017E,
        0x9F => 0x0178,
        _ => u32::from(b),
    };

    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_doc() {
        assert_eq!(decode_pdf_doc(b"A\x80\xa0\xe9"), "A\u{2022}\u{20ac}\u{e9}");
    }

    #[test]
    fn windows_1252() {
        assert_eq!(decode_windows_1252(b"\x93x\x94"), "\u{201c}x\u{201d}");
    }

    #[test]
    fn utf16() {
        assert_eq!(decode_utf16(&[0x00, 0x41, 0xD8, 0x3D, 0xDE, 0x00], true), "A\u{1F600}");
        assert_eq!(decode_utf16(&[0x41, 0x00], false), "A");
    }
}
