use crate::truetype::read_fixed;
use quire_common::byte::Reader;

/// The horizontal header table.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HorizontalHeaderTable {
    pub version: f64,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub metric_data_format: i16,
    /// The number of full entries in `hmtx`.
    pub number_of_h_metrics: u16,
}

impl HorizontalHeaderTable {
    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);

        let version = read_fixed(&mut r)?;
        let ascender = r.read_i16()?;
        let descender = r.read_i16()?;
        let line_gap = r.read_i16()?;
        let advance_width_max = r.read_u16()?;
        let min_left_side_bearing = r.read_i16()?;
        let min_right_side_bearing = r.read_i16()?;
        let x_max_extent = r.read_i16()?;
        let caret_slope_rise = r.read_i16()?;
        let caret_slope_run = r.read_i16()?;
        let caret_offset = r.read_i16()?;
        // Reserved.
        r.skip_bytes(8)?;

        Some(Self {
            version,
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format: r.read_i16()?,
            number_of_h_metrics: r.read_u16()?,
        })
    }
}
