use quire_common::byte::Reader;

/// The OS/2 and Windows metrics table.
///
/// Fields introduced by later versions are `None` when the table is older.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Os2Table {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub weight_class: u16,
    pub width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub family_class: i16,
    pub panose: [u8; 10],
    pub unicode_ranges: [u32; 4],
    pub vendor_id: [u8; 4],
    pub fs_selection: u16,
    pub first_char_index: u16,
    pub last_char_index: u16,
    /// Missing from some old Macintosh fonts that stop after 68 bytes.
    pub typographic: Option<TypographicMetrics>,
    pub code_page_ranges: Option<[u32; 2]>,
    pub x_height: Option<i16>,
    pub cap_height: Option<i16>,
    pub default_char: Option<u16>,
    pub break_char: Option<u16>,
    pub max_context: Option<u16>,
    pub optical_point_size: Option<(u16, u16)>,
}

/// The vertical metrics of version 0 tables that are long enough.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypographicMetrics {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
}

impl Os2Table {
    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);

        let mut table = Self {
            version: r.read_u16()?,
            x_avg_char_width: r.read_i16()?,
            weight_class: r.read_u16()?,
            width_class: r.read_u16()?,
            fs_type: r.read_u16()?,
            y_subscript_x_size: r.read_i16()?,
            y_subscript_y_size: r.read_i16()?,
            y_subscript_x_offset: r.read_i16()?,
            y_subscript_y_offset: r.read_i16()?,
            y_superscript_x_size: r.read_i16()?,
            y_superscript_y_size: r.read_i16()?,
            y_superscript_x_offset: r.read_i16()?,
            y_superscript_y_offset: r.read_i16()?,
            y_strikeout_size: r.read_i16()?,
            y_strikeout_position: r.read_i16()?,
            family_class: r.read_i16()?,
            panose: r.read_array()?,
            unicode_ranges: [r.read_u32()?, r.read_u32()?, r.read_u32()?, r.read_u32()?],
            vendor_id: r.read_array()?,
            fs_selection: r.read_u16()?,
            first_char_index: r.read_u16()?,
            last_char_index: r.read_u16()?,
            ..Self::default()
        };

        table.typographic = read_typographic(&mut r);

        if table.version >= 1 {
            table.code_page_ranges = Some([r.read_u32()?, r.read_u32()?]);
        }

        if table.version >= 2 {
            table.x_height = Some(r.read_i16()?);
            table.cap_height = Some(r.read_i16()?);
            table.default_char = Some(r.read_u16()?);
            table.break_char = Some(r.read_u16()?);
            table.max_context = Some(r.read_u16()?);
        }

        if table.version >= 5 {
            table.optical_point_size = Some((r.read_u16()?, r.read_u16()?));
        }

        Some(table)
    }

    /// Whether the font is italic, according to `fsSelection`.
    pub fn is_italic(&self) -> bool {
        self.fs_selection & 0x0001 != 0
    }

    /// Whether the font is bold, according to `fsSelection`.
    pub fn is_bold(&self) -> bool {
        self.fs_selection & 0x0020 != 0
    }
}

fn read_typographic(r: &mut Reader<'_>) -> Option<TypographicMetrics> {
    Some(TypographicMetrics {
        ascender: r.read_i16()?,
        descender: r.read_i16()?,
        line_gap: r.read_i16()?,
        win_ascent: r.read_u16()?,
        win_descent: r.read_u16()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(version: u16, len: usize) -> Vec<u8> {
        let mut t = version.to_be_bytes().to_vec();
        t.extend(500_i16.to_be_bytes());
        t.extend(700_u16.to_be_bytes());
        t.resize(58, 0);
        t.extend(b"QUIR");
        t.extend(0x0021_u16.to_be_bytes());
        t.extend([0, 0x20, 0, 0x7E]);
        for v in [750_i16, -250, 0] {
            t.extend(v.to_be_bytes());
        }
        t.extend([0x03, 0xE8, 0x00, 0xFA]);
        t.resize(86, 0);
        t.extend(480_i16.to_be_bytes());
        t.extend(680_i16.to_be_bytes());
        t.resize(len, 0);
        t
    }

    #[test]
    fn version_0_short() {
        let os2 = Os2Table::parse(&table(0, 68)).unwrap();

        assert_eq!(os2.weight_class, 700);
        assert_eq!(&os2.vendor_id, b"QUIR");
        assert!(os2.is_italic());
        assert!(os2.is_bold());
        assert_eq!((os2.first_char_index, os2.last_char_index), (0x20, 0x7E));
        assert_eq!(os2.typographic, None);
    }

    #[test]
    fn version_2() {
        let os2 = Os2Table::parse(&table(2, 96)).unwrap();
        let typographic = os2.typographic.unwrap();

        assert_eq!(typographic.ascender, 750);
        assert_eq!(typographic.win_ascent, 1000);
        assert_eq!(os2.code_page_ranges, Some([0, 0]));
        assert_eq!(os2.x_height, Some(480));
        assert_eq!(os2.cap_height, Some(680));
        assert_eq!(os2.optical_point_size, None);

        assert!(Os2Table::parse(&table(2, 95)).is_none());
    }

    #[test]
    fn version_5() {
        let mut data = table(5, 96);
        data.extend([0, 10, 0, 72]);

        assert_eq!(Os2Table::parse(&data).unwrap().optical_point_size, Some((10, 72)));
    }
}
