use crate::cff::Strings;
use crate::cff::dict::{ApplyOperation, Operator, integer, number, offset, string};
use log::debug;
use core::ops::Range;

mod op {
    use super::Operator;

    pub(super) const VERSION: Operator = Operator(0);
    pub(super) const NOTICE: Operator = Operator(1);
    pub(super) const FULL_NAME: Operator = Operator(2);
    pub(super) const FAMILY_NAME: Operator = Operator(3);
    pub(super) const WEIGHT: Operator = Operator(4);
    pub(super) const FONT_BBOX: Operator = Operator(5);
    pub(super) const UNIQUE_ID: Operator = Operator(13);
    pub(super) const CHARSET: Operator = Operator(15);
    pub(super) const ENCODING: Operator = Operator(16);
    pub(super) const CHAR_STRINGS: Operator = Operator(17);
    pub(super) const PRIVATE: Operator = Operator(18);
    pub(super) const COPYRIGHT: Operator = Operator::escaped(0);
    pub(super) const IS_FIXED_PITCH: Operator = Operator::escaped(1);
    pub(super) const ITALIC_ANGLE: Operator = Operator::escaped(2);
    pub(super) const UNDERLINE_POSITION: Operator = Operator::escaped(3);
    pub(super) const UNDERLINE_THICKNESS: Operator = Operator::escaped(4);
    pub(super) const PAINT_TYPE: Operator = Operator::escaped(5);
    pub(super) const CHARSTRING_TYPE: Operator = Operator::escaped(6);
    pub(super) const FONT_MATRIX: Operator = Operator::escaped(7);
    pub(super) const STROKE_WIDTH: Operator = Operator::escaped(8);
    pub(super) const ROS: Operator = Operator::escaped(30);
    pub(super) const CID_FONT_VERSION: Operator = Operator::escaped(31);
    pub(super) const CID_FONT_REVISION: Operator = Operator::escaped(32);
    pub(super) const CID_FONT_TYPE: Operator = Operator::escaped(33);
    pub(super) const CID_COUNT: Operator = Operator::escaped(34);
    pub(super) const FD_ARRAY: Operator = Operator::escaped(36);
    pub(super) const FD_SELECT: Operator = Operator::escaped(37);
    pub(super) const FONT_NAME: Operator = Operator::escaped(38);
}

/// The Registry-Ordering-Supplement triple of a CID-keyed font.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryOrderingSupplement {
    pub registry: String,
    pub ordering: String,
    pub supplement: f64,
}

/// The Top DICT of a font, or a Font DICT from the FDArray of a CID-keyed
/// font.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub struct TopDict {
    pub version: Option<String>,
    pub notice: Option<String>,
    pub copyright: Option<String>,
    pub full_name: Option<String>,
    pub family_name: Option<String>,
    pub weight: Option<String>,
    pub is_fixed_pitch: bool,
    pub italic_angle: f64,
    pub underline_position: f64,
    pub underline_thickness: f64,
    pub paint_type: i32,
    pub charstring_type: i32,
    pub font_matrix: [f64; 6],
    pub unique_id: Option<i32>,
    pub font_bbox: [f64; 4],
    pub stroke_width: f64,
    /// Offset of the charset, or 0, 1 and 2 for the predefined ones.
    pub charset: usize,
    /// Offset of the encoding, or 0 and 1 for the predefined ones.
    pub encoding: usize,
    pub char_strings: Option<usize>,
    /// Byte range of the Private DICT.
    pub private: Option<Range<usize>>,
    /// Present only in CID-keyed fonts.
    pub ros: Option<RegistryOrderingSupplement>,
    pub cid_font_version: f64,
    pub cid_font_revision: f64,
    pub cid_font_type: i32,
    pub cid_count: u32,
    pub fd_array: Option<usize>,
    pub fd_select: Option<usize>,
    /// The name of a Font DICT in the FDArray.
    pub font_name: Option<String>,
}

impl Default for TopDict {
    fn default() -> Self {
        Self {
            version: None,
            notice: None,
            copyright: None,
            full_name: None,
            family_name: None,
            weight: None,
            is_fixed_pitch: false,
            italic_angle: 0.0,
            underline_position: -100.0,
            underline_thickness: 50.0,
            paint_type: 0,
            charstring_type: 2,
            font_matrix: [0.001, 0.0, 0.0, 0.001, 0.0, 0.0],
            unique_id: None,
            font_bbox: [0.0; 4],
            stroke_width: 0.0,
            charset: 0,
            encoding: 0,
            char_strings: None,
            private: None,
            ros: None,
            cid_font_version: 0.0,
            cid_font_revision: 0.0,
            cid_font_type: 0,
            cid_count: 8720,
            fd_array: None,
            fd_select: None,
            font_name: None,
        }
    }
}

impl TopDict {
    /// Whether the font is CID-keyed.
    pub fn is_cid(&self) -> bool {
        self.ros.is_some()
    }
}

impl ApplyOperation for TopDict {
    fn apply(&mut self, operator: Operator, operands: &[f64], strings: &Strings<'_>) {
        match operator {
            op::VERSION => self.version = string(operands, strings),
            op::NOTICE => self.notice = string(operands, strings),
            op::COPYRIGHT => self.copyright = string(operands, strings),
            op::FULL_NAME => self.full_name = string(operands, strings),
            op::FAMILY_NAME => self.family_name = string(operands, strings),
            op::WEIGHT => self.weight = string(operands, strings),
            op::FONT_NAME => self.font_name = string(operands, strings),
            op::IS_FIXED_PITCH => self.is_fixed_pitch = number(operands).is_some_and(|n| n != 0.0),
            op::ITALIC_ANGLE => set(&mut self.italic_angle, number(operands)),
            op::UNDERLINE_POSITION => set(&mut self.underline_position, number(operands)),
            op::UNDERLINE_THICKNESS => set(&mut self.underline_thickness, number(operands)),
            op::PAINT_TYPE => set(&mut self.paint_type, integer(operands)),
            op::CHARSTRING_TYPE => set(&mut self.charstring_type, integer(operands)),
            op::STROKE_WIDTH => set(&mut self.stroke_width, number(operands)),
            op::UNIQUE_ID => self.unique_id = integer(operands),
            op::FONT_MATRIX => set(&mut self.font_matrix, operands.try_into().ok()),
            op::FONT_BBOX => set(&mut self.font_bbox, operands.try_into().ok()),
            op::CHARSET => set(&mut self.charset, offset(operands)),
            op::ENCODING => set(&mut self.encoding, offset(operands)),
            op::CHAR_STRINGS => self.char_strings = offset(operands),
            op::PRIVATE => {
                self.private = match operands {
                    &[size, start] => {
                        let size = offset(&[size]);
                        let start = offset(&[start]);
                        size.zip(start).map(|(size, start)| start..start + size)
                    }
                    _ => None,
                }
            }
            op::ROS => {
                if let [registry, ordering, supplement] = operands {
                    self.ros = Some(RegistryOrderingSupplement {
                        registry: string(&[*registry], strings).unwrap_or_default(),
                        ordering: string(&[*ordering], strings).unwrap_or_default(),
                        supplement: *supplement,
                    });
                }
            }
            op::CID_FONT_VERSION => set(&mut self.cid_font_version, number(operands)),
            op::CID_FONT_REVISION => set(&mut self.cid_font_revision, number(operands)),
            op::CID_FONT_TYPE => set(&mut self.cid_font_type, integer(operands)),
            op::CID_COUNT => set(
                &mut self.cid_count,
                integer(operands).and_then(|n| u32::try_from(n).ok()),
            ),
            op::FD_ARRAY => self.fd_array = offset(operands),
            op::FD_SELECT => self.fd_select = offset(operands),
            _ => debug!("ignoring Top DICT operator {}", operator.0),
        }
    }
}

/// Overwrite a default only if the operand was usable.
pub(crate) fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}
