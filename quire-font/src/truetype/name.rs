use log::debug;
use quire_common::byte::Reader;

/// The naming table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameTable {
    records: Vec<NameRecord>,
}

/// A decoded string of the naming table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameRecord {
    /// The platform the string is encoded for.
    pub platform_id: u16,
    /// The platform-specific encoding.
    pub encoding_id: u16,
    /// The platform-specific language.
    pub language_id: u16,
    /// What the string names, e.g. 1 for the family and 6 for the
    /// PostScript name.
    pub name_id: u16,
    /// The decoded string.
    pub value: String,
}

impl NameRecord {
    fn is_windows_english(&self) -> bool {
        self.platform_id == 3 && self.language_id == 0x0409
    }
}

impl NameTable {
    /// The name ID of the family name.
    pub const FAMILY: u16 = 1;
    /// The name ID of the full font name.
    pub const FULL_NAME: u16 = 4;
    /// The name ID of the PostScript name.
    pub const POSTSCRIPT_NAME: u16 = 6;

    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);
        let _format = r.read_u16()?;
        let count = r.read_u16()?;
        let storage = usize::from(r.read_u16()?);

        let mut records = Vec::with_capacity(usize::from(count));

        for _ in 0..count {
            let platform_id = r.read_u16()?;
            let encoding_id = r.read_u16()?;
            let language_id = r.read_u16()?;
            let name_id = r.read_u16()?;
            let length = usize::from(r.read_u16()?);
            let offset = usize::from(r.read_u16()?);

            let start = storage + offset;
            let Some(bytes) = data.get(start..start + length) else {
                debug!("name record {name_id} points outside of the table");
                continue;
            };

            let Some(value) = decode(platform_id, encoding_id, bytes) else {
                debug!("skipping name record {name_id} with encoding ({platform_id}, {encoding_id})");
                continue;
            };

            records.push(NameRecord {
                platform_id,
                encoding_id,
                language_id,
                name_id,
                value,
            });
        }

        Some(Self { records })
    }

    /// All records that could be decoded.
    pub fn records(&self) -> &[NameRecord] {
        &self.records
    }

    /// The string for a name ID, preferring English Windows records.
    pub fn get(&self, name_id: u16) -> Option<&str> {
        let mut candidates = self.records.iter().filter(|r| r.name_id == name_id);
        let first = candidates.clone().next()?;

        Some(
            candidates
                .find(|r| r.is_windows_english())
                .unwrap_or(first)
                .value
                .as_str(),
        )
    }

    /// The font family name.
    pub fn family_name(&self) -> Option<&str> {
        self.get(Self::FAMILY)
    }

    /// The PostScript name of the font.
    pub fn postscript_name(&self) -> Option<&str> {
        self.get(Self::POSTSCRIPT_NAME)
    }
}

fn decode(platform_id: u16, encoding_id: u16, bytes: &[u8]) -> Option<String> {
    match (platform_id, encoding_id) {
        (0, _) | (3, 0 | 1 | 10) => {
            let units = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]));

            Some(
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect(),
            )
        }
        (1, 0) => Some(bytes.iter().map(|b| mac_roman(*b)).collect()),
        _ => None,
    }
}

fn mac_roman(byte: u8) -> char {
    match byte {
        0..=0x7F => char::from(byte),
        _ => MAC_ROMAN_HIGH[usize::from(byte - 0x80)],
    }
}

const MAC_ROMAN_HIGH: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á',
    'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó',
    'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß',
    '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑',
    '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«',
    '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊',
    'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'ﬁ', 'ﬂ',
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á',
    'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜',
    '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

#[cfg(test)]
mod tests {
    use super::*;

    fn table(records: &[(u16, u16, u16, u16, &[u8])]) -> Vec<u8> {
        let mut out = vec![0, 0];
        out.extend((records.len() as u16).to_be_bytes());
        out.extend(((6 + 12 * records.len()) as u16).to_be_bytes());

        let mut storage: Vec<u8> = Vec::new();

        for (platform, encoding, language, name, bytes) in records {
            for v in [*platform, *encoding, *language, *name, bytes.len() as u16, storage.len() as u16] {
                out.extend(v.to_be_bytes());
            }

            storage.extend(*bytes);
        }

        out.extend(storage);
        out
    }

    #[test]
    fn decodes_and_prefers_windows_english() {
        let data = table(&[
            (1, 0, 0, 1, b"Caf\x8E"),
            (3, 1, 0x0407, 1, b"\x00G\x00e"),
            (3, 1, 0x0409, 1, b"\x00E\x00n"),
            (1, 0, 0, 6, b"Cafe-Bold"),
            (2, 0, 0, 4, b"iso"),
        ]);

        let table = NameTable::parse(&data).unwrap();

        assert_eq!(table.records().len(), 4);
        assert_eq!(table.records()[0].value, "Café");
        assert_eq!(table.family_name(), Some("En"));
        assert_eq!(table.postscript_name(), Some("Cafe-Bold"));
        assert_eq!(table.get(NameTable::FULL_NAME), None);
    }

    #[test]
    fn record_outside_of_table() {
        let mut data = table(&[(3, 1, 0x0409, 1, b"\x00A")]);
        data.truncate(data.len() - 1);

        assert!(NameTable::parse(&data).unwrap().records().is_empty());
    }

    #[test]
    fn apple_logo() {
        assert_eq!(mac_roman(0xF0), '\u{F8FF}');
        assert_eq!(mac_roman(0xCA), '\u{A0}');
        assert_eq!(mac_roman(b'A'), 'A');
    }
}
