use crate::error::{FontError, Result};
use crate::truetype::IndexToLocationTable;
use crate::{GlyphId, ParseOptions, Rect};
use log::warn;
use quire_common::byte::Reader;

mod simple_flags {
    pub(super) const ON_CURVE_POINT: u8 = 0x01;
    pub(super) const X_SHORT_VECTOR: u8 = 0x02;
    pub(super) const Y_SHORT_VECTOR: u8 = 0x04;
    pub(super) const REPEAT_FLAG: u8 = 0x08;
    pub(super) const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
    pub(super) const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;
}

mod composite_flags {
    pub(super) const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
    pub(super) const ARGS_ARE_XY_VALUES: u16 = 0x0002;
    pub(super) const WE_HAVE_A_SCALE: u16 = 0x0008;
    pub(super) const MORE_COMPONENTS: u16 = 0x0020;
    pub(super) const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
    pub(super) const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
    pub(super) const USE_MY_METRICS: u16 = 0x0200;
}

/// The glyph data table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphTable {
    glyphs: Vec<Option<Glyph>>,
}

impl GlyphTable {
    pub(crate) fn parse(
        data: &[u8],
        loca: &IndexToLocationTable,
        options: ParseOptions,
    ) -> Result<Self> {
        let mut glyphs = Vec::with_capacity(loca.len());

        for (index, range) in loca.offsets().windows(2).enumerate() {
            let (start, end) = (range[0] as usize, range[1] as usize);

            // Equal offsets mark a glyph without outline, like a space.
            if start == end {
                glyphs.push(None);
                continue;
            }

            let glyph = data
                .get(start..end)
                .ok_or(FontError::InvalidFormat {
                    table: "loca",
                    reason: "ascending offsets inside of `glyf`",
                })
                .and_then(|data| Glyph::parse(data).ok_or(FontError::Truncated { table: "glyf" }));

            match glyph {
                Ok(glyph) => glyphs.push(Some(glyph)),
                Err(e) if options.lenient => {
                    warn!("skipping glyph {index}: {e}");
                    glyphs.push(None);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self { glyphs })
    }

    /// The number of glyphs, including empty ones.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the table has no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The description of a glyph, or `None` if it has no outline.
    pub fn get(&self, glyph: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(usize::from(glyph.0))?.as_ref()
    }
}

/// A glyph with an outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    /// The bounding box stored in the glyph header.
    pub bounds: Rect,
    /// The outline.
    pub description: GlyphDescription,
}

/// How a glyph outline is stored.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphDescription {
    /// Contours made of quadratic curves.
    Simple(SimpleGlyph),
    /// Other glyphs, each placed and transformed.
    Composite(CompositeGlyph),
}

/// A glyph made of contours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleGlyph {
    /// The index of the last point of each contour.
    pub end_points: Vec<u16>,
    /// All points of all contours, in absolute font units.
    pub points: Vec<GlyphPoint>,
}

impl SimpleGlyph {
    /// The points of each contour.
    pub fn contours(&self) -> impl Iterator<Item = &[GlyphPoint]> + '_ {
        let mut start = 0;

        self.end_points.iter().map(move |end| {
            let end = (usize::from(*end) + 1).min(self.points.len());
            let contour = self.points.get(start..end).unwrap_or_default();
            start = end;

            contour
        })
    }
}

/// A point of a simple glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphPoint {
    /// The horizontal position.
    pub x: i16,
    /// The vertical position.
    pub y: i16,
    /// Whether the point is on the curve, as opposed to a control point.
    pub on_curve: bool,
}

/// A glyph assembled from other glyphs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositeGlyph {
    /// The component glyphs, in drawing order.
    pub components: Vec<GlyphComponent>,
}

/// One component of a composite glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphComponent {
    /// The raw component flags.
    pub flags: u16,
    /// The glyph to draw.
    pub glyph: GlyphId,
    /// Where the glyph is drawn.
    pub placement: ComponentPlacement,
    /// The 2x2 transform `[xx, xy, yx, yy]` applied to the glyph.
    pub transform: [f32; 4],
}

impl GlyphComponent {
    /// Whether the composite takes its metrics from this component.
    pub fn use_my_metrics(&self) -> bool {
        self.flags & composite_flags::USE_MY_METRICS != 0
    }
}

/// How a component is positioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentPlacement {
    /// Moved by an offset.
    Offset {
        /// The horizontal offset.
        x: i32,
        /// The vertical offset.
        y: i32,
    },
    /// Moved so that two points coincide.
    Anchor {
        /// The point number in the glyph assembled so far.
        parent: u16,
        /// The point number in the component.
        child: u16,
    },
}

impl Glyph {
    fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);
        let number_of_contours = r.read_i16()?;

        let bounds = Rect {
            x_min: r.read_i16()?,
            y_min: r.read_i16()?,
            x_max: r.read_i16()?,
            y_max: r.read_i16()?,
        };

        let description = if number_of_contours >= 0 {
            GlyphDescription::Simple(parse_simple(&mut r, number_of_contours as u16)?)
        } else {
            GlyphDescription::Composite(parse_composite(&mut r)?)
        };

        Some(Self {
            bounds,
            description,
        })
    }
}

fn parse_simple(r: &mut Reader<'_>, number_of_contours: u16) -> Option<SimpleGlyph> {
    use simple_flags::*;

    let mut end_points = Vec::with_capacity(usize::from(number_of_contours));

    for _ in 0..number_of_contours {
        let end = r.read_u16()?;

        if end_points.last().is_some_and(|last| end < *last) {
            return None;
        }

        end_points.push(end);
    }

    let instruction_length = r.read_u16()?;
    r.skip_bytes(usize::from(instruction_length))?;

    let num_points = end_points.last().map_or(0, |last| usize::from(*last) + 1);
    let mut flags = Vec::with_capacity(num_points);

    while flags.len() < num_points {
        let flag = r.read_u8()?;
        flags.push(flag);

        if flag & REPEAT_FLAG != 0 {
            let repeat = usize::from(r.read_u8()?);
            let repeat = repeat.min(num_points - flags.len());
            flags.extend(core::iter::repeat_n(flag, repeat));
        }
    }

    let xs = read_coordinates(r, &flags, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE)?;
    let ys = read_coordinates(r, &flags, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE)?;

    let points = flags
        .iter()
        .zip(xs.into_iter().zip(ys))
        .map(|(flag, (x, y))| GlyphPoint {
            x,
            y,
            on_curve: flag & ON_CURVE_POINT != 0,
        })
        .collect();

    Some(SimpleGlyph { end_points, points })
}

/// Read delta-encoded coordinates and make them absolute.
fn read_coordinates(
    r: &mut Reader<'_>,
    flags: &[u8],
    short_vector: u8,
    same_or_positive: u8,
) -> Option<Vec<i16>> {
    let mut current = 0_i16;
    let mut coordinates = Vec::with_capacity(flags.len());

    for flag in flags {
        let delta = match (flag & short_vector != 0, flag & same_or_positive != 0) {
            (true, true) => i16::from(r.read_u8()?),
            (true, false) => -i16::from(r.read_u8()?),
            (false, true) => 0,
            (false, false) => r.read_i16()?,
        };

        current = current.wrapping_add(delta);
        coordinates.push(current);
    }

    Some(coordinates)
}

fn parse_composite(r: &mut Reader<'_>) -> Option<CompositeGlyph> {
    use composite_flags::*;

    let mut components = Vec::new();

    loop {
        let flags = r.read_u16()?;
        let glyph = GlyphId(r.read_u16()?);

        let placement = match (flags & ARG_1_AND_2_ARE_WORDS != 0, flags & ARGS_ARE_XY_VALUES != 0) {
            (true, true) => ComponentPlacement::Offset {
                x: i32::from(r.read_i16()?),
                y: i32::from(r.read_i16()?),
            },
            (false, true) => ComponentPlacement::Offset {
                x: i32::from(r.read_i8()?),
                y: i32::from(r.read_i8()?),
            },
            (true, false) => ComponentPlacement::Anchor {
                parent: r.read_u16()?,
                child: r.read_u16()?,
            },
            (false, false) => ComponentPlacement::Anchor {
                parent: u16::from(r.read_u8()?),
                child: u16::from(r.read_u8()?),
            },
        };

        let mut transform = [1.0, 0.0, 0.0, 1.0];

        if flags & WE_HAVE_A_SCALE != 0 {
            let scale = read_f2dot14(r)?;
            transform = [scale, 0.0, 0.0, scale];
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            transform = [read_f2dot14(r)?, 0.0, 0.0, read_f2dot14(r)?];
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            transform = [
                read_f2dot14(r)?,
                read_f2dot14(r)?,
                read_f2dot14(r)?,
                read_f2dot14(r)?,
            ];
        }

        components.push(GlyphComponent {
            flags,
            glyph,
            placement,
            transform,
        });

        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }

    Some(CompositeGlyph { components })
}

fn read_f2dot14(r: &mut Reader<'_>) -> Option<f32> {
    Some(f32::from(r.read_i16()?) / 16384.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(contours: i16, bounds: [i16; 4]) -> Vec<u8> {
        let mut g = contours.to_be_bytes().to_vec();
        g.extend(bounds.iter().flat_map(|v| v.to_be_bytes()));
        g
    }

    #[test]
    fn simple_glyph_with_repeated_flags() {
        let mut data = header(2, [0, 0, 100, 100]);
        // Contours end at points 2 and 4.
        data.extend([0, 2, 0, 4]);
        // Two bytes of instructions.
        data.extend([0, 2, 0xAA, 0xBB]);
        // Point 0 with 16-bit deltas, then four short positive on-curve points.
        data.extend([0x00, 0x01 | 0x02 | 0x04 | 0x10 | 0x20 | 0x08, 3]);
        data.extend(50_i16.to_be_bytes());
        data.extend([10, 10, 10, 10]);
        data.extend((-20_i16).to_be_bytes());
        data.extend([5, 5, 5, 5]);

        let glyph = Glyph::parse(&data).unwrap();
        let GlyphDescription::Simple(simple) = glyph.description else {
            panic!("expected a simple glyph");
        };

        assert_eq!(simple.points.len(), 5);
        assert_eq!(
            simple.points[0],
            GlyphPoint {
                x: 50,
                y: -20,
                on_curve: false
            }
        );
        assert_eq!(
            simple.points[4],
            GlyphPoint {
                x: 90,
                y: 0,
                on_curve: true
            }
        );

        let contours = simple.contours().map(<[_]>::len).collect::<Vec<_>>();
        assert_eq!(contours, [3, 2]);
    }

    #[test]
    fn negative_and_same_deltas() {
        let mut data = header(1, [0; 4]);
        data.extend([0, 1, 0, 0]);
        // Point 0: x short negative, y same. Point 1: x same, y short positive.
        data.extend([0x01 | 0x02 | 0x20, 0x01 | 0x10 | 0x04 | 0x20]);
        data.extend([7]);
        data.extend([9]);

        let glyph = Glyph::parse(&data).unwrap();
        let GlyphDescription::Simple(simple) = glyph.description else {
            panic!("expected a simple glyph");
        };

        assert_eq!((simple.points[0].x, simple.points[0].y), (-7, 0));
        assert_eq!((simple.points[1].x, simple.points[1].y), (-7, 9));
    }

    #[test]
    fn composite_glyph() {
        let mut data = header(-1, [0, 0, 500, 700]);
        // Word offsets with a scale, more components follow.
        data.extend((0x0001_u16 | 0x0002 | 0x0008 | 0x0020 | 0x0200).to_be_bytes());
        data.extend(3_u16.to_be_bytes());
        data.extend(100_i16.to_be_bytes());
        data.extend((-50_i16).to_be_bytes());
        data.extend(0x2000_i16.to_be_bytes());
        // Byte anchor points, last component.
        data.extend(0x0000_u16.to_be_bytes());
        data.extend(4_u16.to_be_bytes());
        data.extend([1, 2]);

        let glyph = Glyph::parse(&data).unwrap();
        let GlyphDescription::Composite(composite) = glyph.description else {
            panic!("expected a composite glyph");
        };

        assert_eq!(glyph.bounds.x_max, 500);
        assert_eq!(composite.components.len(), 2);

        let first = composite.components[0];
        assert_eq!(first.glyph, GlyphId(3));
        assert_eq!(first.placement, ComponentPlacement::Offset { x: 100, y: -50 });
        assert_eq!(first.transform, [0.5, 0.0, 0.0, 0.5]);
        assert!(first.use_my_metrics());

        assert_eq!(
            composite.components[1].placement,
            ComponentPlacement::Anchor {
                parent: 1,
                child: 2
            }
        );
    }

    #[test]
    fn unordered_end_points() {
        let mut data = header(2, [0; 4]);
        data.extend([0, 4, 0, 2]);

        assert!(Glyph::parse(&data).is_none());
    }

    #[test]
    fn broken_glyph_in_table() {
        let loca = IndexToLocationTable::parse(&[0, 0, 0, 2, 0, 2], 0, 2, ParseOptions::default()).unwrap();
        let data = [0, 1, 0, 0];

        assert_eq!(
            GlyphTable::parse(&data, &loca, ParseOptions::default()),
            Err(FontError::Truncated { table: "glyf" })
        );

        let table = GlyphTable::parse(&data, &loca, ParseOptions::lenient(true)).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get(GlyphId(0)).is_none());
    }
}
