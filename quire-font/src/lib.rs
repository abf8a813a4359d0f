/*!
Parsers for the font programs that can be embedded in PDF files.

Three formats are supported:
- [`truetype`]: sfnt fonts with TrueType outlines, or a `CFF ` table.
- [`cff`]: bare Compact Font Format programs, both name-keyed and CID-keyed.
- [`type1`]: PostScript Type1 programs, in PFA or PFB form.

TrueType and CFF fonts are decoded into their tables. Type1 charstrings are
interpreted, so that a glyph can be drawn into any [`OutlineBuilder`].

Every entry point takes [`ParseOptions`]. Without `lenient`, a malformed
required structure is an error. With it, the problem is logged through the
`log` crate and the parser continues with what it could read.
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cff;
pub mod error;
pub mod truetype;
pub mod type1;

mod argstack;

pub use error::{FontError, OutlineError, Result};

/// Options that apply to every parser in this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether malformed data should be worked around instead of rejected.
    pub lenient: bool,
}

impl ParseOptions {
    /// Options with the given leniency.
    pub fn lenient(lenient: bool) -> Self {
        Self { lenient }
    }
}

/// The index of a glyph in a font program.
#[repr(transparent)]
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Default, Debug, Hash)]
pub struct GlyphId(pub u16);

/// Receives the segments of a glyph outline as they are decoded.
pub trait OutlineBuilder {
    /// Begin a new contour at `(x, y)`.
    fn move_to(&mut self, x: f32, y: f32);

    /// A straight line to `(x, y)`.
    fn line_to(&mut self, x: f32, y: f32);

    /// A cubic curve with two control points, ending at `(x, y)`.
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32);

    /// Close the current contour.
    fn close(&mut self);
}

/// One segment of a recorded outline.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CurveTo(f32, f32, f32, f32, f32, f32),
    Close,
}

/// Records the outline as a list of segments.
impl OutlineBuilder for Vec<PathSegment> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(PathSegment::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(PathSegment::LineTo(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(PathSegment::CurveTo(x1, y1, x2, y2, x, y));
    }

    fn close(&mut self) {
        self.push(PathSegment::Close);
    }
}

/// Discards the outline, for when only metrics are needed.
pub(crate) struct NullOutline;

impl OutlineBuilder for NullOutline {
    fn move_to(&mut self, _: f32, _: f32) {}
    fn line_to(&mut self, _: f32, _: f32) {}
    fn curve_to(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: f32) {}
    fn close(&mut self) {}
}

/// A rectangle in font units.
///
/// Taken from font data as is, so the minimum may exceed the maximum.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl Rect {
    /// The horizontal extent.
    #[inline]
    pub fn width(&self) -> i16 {
        self.x_max.wrapping_sub(self.x_min)
    }

    /// The vertical extent.
    #[inline]
    pub fn height(&self) -> i16 {
        self.y_max.wrapping_sub(self.y_min)
    }
}

/// Glyph bounds in font units after transformation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    /// Left edge.
    pub x_min: f32,
    /// Bottom edge.
    pub y_min: f32,
    /// Right edge.
    pub x_max: f32,
    /// Top edge.
    pub y_max: f32,
}

impl RectF {
    #[inline]
    fn empty() -> Self {
        Self {
            x_min: f32::MAX,
            y_min: f32::MAX,
            x_max: f32::MIN,
            y_max: f32::MIN,
        }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    #[inline]
    fn extend_by(&mut self, x: f32, y: f32) {
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.x_max = self.x_max.max(x);
        self.y_max = self.y_max.max(y);
    }

    /// Round outwards to a rectangle in whole font units.
    ///
    /// Returns `None` if a side does not fit into an `i16`.
    pub fn to_rect(self) -> Option<Rect> {
        fn to_i16(v: f32) -> Option<i16> {
            (v.is_finite() && (f32::from(i16::MIN)..=f32::from(i16::MAX)).contains(&v))
                .then_some(v as i16)
        }

        Some(Rect {
            x_min: to_i16(self.x_min.floor())?,
            y_min: to_i16(self.y_min.floor())?,
            x_max: to_i16(self.x_max.ceil())?,
            y_max: to_i16(self.y_max.ceil())?,
        })
    }
}

/// Forwards outline segments while tracking their bounding box.
pub(crate) struct Builder<'a> {
    builder: &'a mut dyn OutlineBuilder,
    bbox: RectF,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(builder: &'a mut dyn OutlineBuilder) -> Self {
        Self {
            builder,
            bbox: RectF::empty(),
        }
    }

    /// The bounds of everything drawn so far, or `None` if nothing was.
    pub(crate) fn bounds(&self) -> Option<RectF> {
        (!self.bbox.is_empty()).then_some(self.bbox)
    }

    #[inline]
    pub(crate) fn move_to(&mut self, x: f32, y: f32) {
        self.bbox.extend_by(x, y);
        self.builder.move_to(x, y);
    }

    #[inline]
    pub(crate) fn line_to(&mut self, x: f32, y: f32) {
        self.bbox.extend_by(x, y);
        self.builder.line_to(x, y);
    }

    #[inline]
    pub(crate) fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.bbox.extend_by(x1, y1);
        self.bbox.extend_by(x2, y2);
        self.bbox.extend_by(x, y);
        self.builder.curve_to(x1, y1, x2, y2, x, y);
    }

    #[inline]
    pub(crate) fn close(&mut self) {
        self.builder.close();
    }
}

/// A `[sx ky kx sy tx ty]` matrix, as in `/FontMatrix`.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub sx: f32,
    pub ky: f32,
    pub kx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Matrix {
    pub(crate) fn from_array(m: [f32; 6]) -> Self {
        Self {
            sx: m[0],
            ky: m[1],
            kx: m[2],
            sy: m[3],
            tx: m[4],
            ty: m[5],
        }
    }
}

/// The usual 1000 units per em.
impl Default for Matrix {
    fn default() -> Self {
        Self {
            sx: 0.001,
            ky: 0.0,
            kx: 0.0,
            sy: 0.001,
            tx: 0.0,
            ty: 0.0,
        }
    }
}
