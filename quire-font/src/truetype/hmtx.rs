use crate::GlyphId;
use log::warn;
use quire_common::byte::Reader;

/// The metrics of one glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HorizontalMetrics {
    /// The advance width in font units.
    pub advance_width: u16,
    /// The left side bearing in font units.
    pub left_side_bearing: i16,
}

/// The horizontal metrics table.
///
/// Only the first `numberOfHMetrics` glyphs have their own advance width.
/// The remaining glyphs share the last one and only store a side bearing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HorizontalMetricsTable {
    metrics: Vec<HorizontalMetrics>,
    left_side_bearings: Vec<i16>,
}

impl HorizontalMetricsTable {
    pub(crate) fn parse(data: &[u8], number_of_h_metrics: u16, num_glyphs: u16) -> Option<Self> {
        let mut r = Reader::new(data);

        if number_of_h_metrics == 0 {
            return None;
        }

        let mut metrics = Vec::with_capacity(usize::from(number_of_h_metrics));

        for _ in 0..number_of_h_metrics {
            metrics.push(HorizontalMetrics {
                advance_width: r.read_u16()?,
                left_side_bearing: r.read_i16()?,
            });
        }

        let remaining = num_glyphs.saturating_sub(number_of_h_metrics);
        let mut left_side_bearings = Vec::with_capacity(usize::from(remaining));

        for _ in 0..remaining {
            let Some(lsb) = r.read_i16() else {
                warn!("`hmtx` is missing side bearings, assuming 0");
                break;
            };

            left_side_bearings.push(lsb);
        }

        Some(Self {
            metrics,
            left_side_bearings,
        })
    }

    /// The metrics of a glyph.
    ///
    /// Glyphs past the end of the table reuse the last advance width.
    pub fn get(&self, glyph: GlyphId) -> Option<HorizontalMetrics> {
        let index = usize::from(glyph.0);

        if let Some(metrics) = self.metrics.get(index) {
            return Some(*metrics);
        }

        let last = self.metrics.last()?;
        let lsb_index = index - self.metrics.len();

        if lsb_index >= self.left_side_bearings.len() {
            return None;
        }

        Some(HorizontalMetrics {
            advance_width: last.advance_width,
            left_side_bearing: self.left_side_bearings[lsb_index],
        })
    }
}
