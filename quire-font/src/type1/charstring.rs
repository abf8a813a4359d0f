use crate::argstack::ArgumentsStack;
use crate::type1::Parameters;
use crate::type1::operator::{other_subr, sb_operator, tb_operator};
use crate::type1::standard::STANDARD;
use crate::{Builder, OutlineBuilder, OutlineError, RectF};
use log::{trace, warn};
use quire_common::byte::Reader;

const STACK_LIMIT: u8 = 10;

/// The metrics of an interpreted glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    /// The horizontal advance, from `hsbw` or `sbw`.
    pub advance_width: f32,
    /// The x coordinate of the left side bearing point.
    pub side_bearing: f32,
    /// The bounds of the outline, or `None` if nothing was drawn.
    pub bounds: Option<RectF>,
}

/// How interpreting a charstring ended.
enum Flow {
    /// The data ran out, or `return` was reached.
    Return,
    /// `endchar`, or the end of a `seac`.
    End,
}

pub(crate) fn parse_char_string(
    data: &[u8],
    params: &Parameters,
    builder: &mut dyn OutlineBuilder,
) -> Result<GlyphMetrics, OutlineError> {
    let mut p = CharStringParser {
        params,
        stack: ArgumentsStack::new(),
        builder: Builder::new(builder),
        x: 0.0,
        y: 0.0,
        origin: (0.0, 0.0),
        is_flexing: false,
        in_accent: false,
        advance_width: 0.0,
        side_bearing: 0.0,
    };

    match p.parse(data, 0)? {
        Flow::End => Ok(GlyphMetrics {
            advance_width: p.advance_width,
            side_bearing: p.side_bearing,
            bounds: p.builder.bounds(),
        }),
        Flow::Return => Err(OutlineError::MissingEndChar),
    }
}

struct CharStringParser<'a, 'b> {
    params: &'a Parameters,
    stack: ArgumentsStack,
    builder: Builder<'b>,
    x: f32,
    y: f32,
    /// Where the glyph origin lies, which moves for the accent of a `seac`.
    origin: (f32, f32),
    is_flexing: bool,
    in_accent: bool,
    advance_width: f32,
    side_bearing: f32,
}

impl<'a> CharStringParser<'a, '_> {
    fn parse(&mut self, char_string: &[u8], depth: u8) -> Result<Flow, OutlineError> {
        macro_rules! trace_op {
            ($name:literal) => {
                trace!("{} ({:?})", $name, &self.stack);
            };
        }

        let mut s = Reader::new(char_string);

        while !s.at_end() {
            let op = s.read_byte().ok_or(OutlineError::ReadOutOfBounds)?;

            match op {
                sb_operator::HORIZONTAL_STEM | sb_operator::VERTICAL_STEM => {
                    trace_op!("HORIZONTAL_STEM | VERTICAL_STEM");

                    self.stack.clear();
                }
                sb_operator::VERTICAL_MOVE_TO => {
                    trace_op!("VERTICAL_MOVE_TO");

                    self.parse_vertical_move_to()?;
                }
                sb_operator::LINE_TO => {
                    trace_op!("LINE_TO");

                    self.parse_line_to()?;
                }
                sb_operator::HORIZONTAL_LINE_TO => {
                    trace_op!("HORIZONTAL_LINE_TO");

                    self.x += self.stack.at(0)?;
                    self.builder.line_to(self.x, self.y);
                    self.stack.clear();
                }
                sb_operator::VERTICAL_LINE_TO => {
                    trace_op!("VERTICAL_LINE_TO");

                    self.y += self.stack.at(0)?;
                    self.builder.line_to(self.x, self.y);
                    self.stack.clear();
                }
                sb_operator::CURVE_TO => {
                    trace_op!("CURVE_TO");

                    self.parse_curve_to()?;
                }
                sb_operator::CLOSE_PATH => {
                    trace_op!("CLOSE_PATH");

                    self.builder.close();
                    self.stack.clear();
                }
                sb_operator::CALL_SUBR => {
                    trace_op!("CALL_SUBR");

                    if depth == STACK_LIMIT {
                        return Err(OutlineError::NestingLimitReached);
                    }

                    let index = self.stack.pop()?;
                    let params = self.params;
                    let subr = u32::try_from(index as i64)
                        .ok()
                        .and_then(|index| params.subroutines.get(&index))
                        .ok_or(OutlineError::InvalidSubroutineIndex)?;

                    if let Flow::End = self.parse(subr, depth + 1)? {
                        return Ok(Flow::End);
                    }
                }
                sb_operator::RETURN => {
                    trace_op!("RETURN");

                    return Ok(Flow::Return);
                }
                sb_operator::ESCAPE => {
                    let op = s.read_byte().ok_or(OutlineError::ReadOutOfBounds)?;

                    match op {
                        tb_operator::DOTSECTION | tb_operator::VSTEM3 | tb_operator::HSTEM3 => {
                            trace_op!("DOTSECTION | VSTEM3 | HSTEM3");

                            self.stack.clear();
                        }
                        tb_operator::SEAC => {
                            trace_op!("SEAC");

                            return self.parse_seac(depth);
                        }
                        tb_operator::SBW => {
                            trace_op!("SBW");

                            let sbx = self.stack.at(0)?;
                            let sby = self.stack.at(1)?;
                            let wx = self.stack.at(2)?;
                            self.set_side_bearing(sbx, sby, wx);
                        }
                        tb_operator::DIV => {
                            trace_op!("DIV");

                            let num2 = self.stack.pop()?;
                            let num1 = self.stack.pop()?;

                            self.stack.push(num1 / num2)?;
                        }
                        tb_operator::CALL_OTHER_SUBR => {
                            trace_op!("CALL_OTHER_SUBR");

                            self.parse_call_other_subr()?;
                        }
                        tb_operator::POP => {
                            // The arguments of `callothersubr` are still on the
                            // stack, so there is nothing to move back.
                            trace_op!("POP");
                        }
                        tb_operator::SET_CURRENT_POINT => {
                            trace_op!("SET_CURRENT_POINT");

                            self.x = self.origin.0 + self.stack.at(0)?;
                            self.y = self.origin.1 + self.stack.at(1)?;

                            self.stack.clear();
                        }
                        _ => warn!("unknown two-byte charstring operator {op}"),
                    }
                }
                sb_operator::HSBW => {
                    trace_op!("HSBW");

                    let sbx = self.stack.at(0)?;
                    let wx = self.stack.at(1)?;
                    self.set_side_bearing(sbx, 0.0, wx);
                }
                sb_operator::ENDCHAR => {
                    trace_op!("ENDCHAR");

                    return Ok(Flow::End);
                }
                sb_operator::MOVE_TO => {
                    trace_op!("MOVE_TO");

                    self.parse_move_to()?;
                }
                sb_operator::HORIZONTAL_MOVE_TO => {
                    trace_op!("HORIZONTAL_MOVE_TO");

                    self.parse_horizontal_move_to()?;
                }
                sb_operator::VH_CURVE_TO => {
                    trace_op!("VH_CURVE_TO");

                    self.parse_vh_curve_to()?;
                }
                sb_operator::HV_CURVE_TO => {
                    trace_op!("HV_CURVE_TO");

                    self.parse_hv_curve_to()?;
                }
                32..=246 => {
                    self.stack.push(f32::from(i16::from(op) - 139))?;
                }
                247..=250 => {
                    let b1 = s.read_byte().ok_or(OutlineError::ReadOutOfBounds)?;
                    let n = (i16::from(op) - 247) * 256 + i16::from(b1) + 108;
                    self.stack.push(f32::from(n))?;
                }
                251..=254 => {
                    let b1 = s.read_byte().ok_or(OutlineError::ReadOutOfBounds)?;
                    let n = -(i16::from(op) - 251) * 256 - i16::from(b1) - 108;
                    self.stack.push(f32::from(n))?;
                }
                255 => {
                    let n = s.read_i32().ok_or(OutlineError::ReadOutOfBounds)?;
                    self.stack.push(n as f32)?;
                }
                _ => warn!("unknown charstring operator {op}"),
            }
        }

        Ok(Flow::Return)
    }

    /// Handle `hsbw` and `sbw`. The metrics of the accent of a `seac` don't
    /// apply to the composite glyph.
    fn set_side_bearing(&mut self, sbx: f32, sby: f32, wx: f32) {
        self.x = self.origin.0 + sbx;
        self.y = self.origin.1 + sby;

        if !self.in_accent {
            self.advance_width = wx;
            self.side_bearing = sbx;
        }

        self.stack.clear();
    }

    fn parse_seac(&mut self, depth: u8) -> Result<Flow, OutlineError> {
        if self.stack.len() != 5 {
            return Err(OutlineError::InvalidArgumentsStackLength);
        }

        if depth == STACK_LIMIT {
            return Err(OutlineError::NestingLimitReached);
        }

        let accent_code = self.stack.pop()?;
        let base_code = self.stack.pop()?;
        let ady = self.stack.pop()?;
        let adx = self.stack.pop()?;
        let asb = self.stack.pop()?;

        let base = self.standard_glyph(base_code)?;
        let accent = self.standard_glyph(accent_code)?;

        self.parse(base, depth + 1)?;

        self.stack.clear();
        self.in_accent = true;
        self.origin = (self.side_bearing + adx - asb, ady);
        self.parse(accent, depth + 1)?;

        Ok(Flow::End)
    }

    /// The charstring of a glyph addressed by its code in the standard
    /// encoding.
    fn standard_glyph(&self, code: f32) -> Result<&'a [u8], OutlineError> {
        let params = self.params;
        let code = u8::try_from(code as i32).map_err(|_| OutlineError::InvalidSeacCode)?;

        STANDARD
            .get(&code)
            .and_then(|name| params.charstrings.get(*name))
            .map(Vec::as_slice)
            .ok_or(OutlineError::InvalidSeacCode)
    }

    fn parse_call_other_subr(&mut self) -> Result<(), OutlineError> {
        let subr_index = self.stack.pop()? as i32;
        let n_args = self.stack.pop()? as i32;

        match (subr_index, n_args) {
            (other_subr::FLEX_START, 0) => self.is_flexing = true,
            (other_subr::FLEX_END, 3) => {
                self.parse_flex()?;
                self.is_flexing = false;
            }
            // The subroutine number stays on the stack for the following
            // `pop callsubr`.
            (other_subr::HINT_REPLACEMENT, 1) => {}
            (other_subr::FLEX_POINT, 0) => {}
            _ => trace!("ignoring callothersubr {subr_index} with {n_args} arguments"),
        }

        Ok(())
    }

    fn parse_move_to(&mut self) -> Result<(), OutlineError> {
        // Flex points are collected on the stack.
        if self.is_flexing {
            return Ok(());
        }

        self.x += self.stack.at(0)?;
        self.y += self.stack.at(1)?;
        self.builder.move_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    fn parse_horizontal_move_to(&mut self) -> Result<(), OutlineError> {
        if self.is_flexing {
            self.stack.push(0.0)?;
            return Ok(());
        }

        self.x += self.stack.at(0)?;
        self.builder.move_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    fn parse_vertical_move_to(&mut self) -> Result<(), OutlineError> {
        if self.is_flexing {
            self.stack.push(0.0)?;
            self.stack.exch()?;
            return Ok(());
        }

        self.y += self.stack.at(0)?;
        self.builder.move_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    fn parse_line_to(&mut self) -> Result<(), OutlineError> {
        self.x += self.stack.at(0)?;
        self.y += self.stack.at(1)?;
        self.builder.line_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    fn parse_curve_to(&mut self) -> Result<(), OutlineError> {
        let x1 = self.x + self.stack.at(0)?;
        let y1 = self.y + self.stack.at(1)?;
        let x2 = x1 + self.stack.at(2)?;
        let y2 = y1 + self.stack.at(3)?;
        self.x = x2 + self.stack.at(4)?;
        self.y = y2 + self.stack.at(5)?;

        self.builder.curve_to(x1, y1, x2, y2, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    fn parse_vh_curve_to(&mut self) -> Result<(), OutlineError> {
        let x1 = self.x;
        let y1 = self.y + self.stack.at(0)?;
        let x2 = x1 + self.stack.at(1)?;
        let y2 = y1 + self.stack.at(2)?;
        self.x = x2 + self.stack.at(3)?;
        self.y = y2;

        self.builder.curve_to(x1, y1, x2, y2, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    fn parse_hv_curve_to(&mut self) -> Result<(), OutlineError> {
        let x1 = self.x + self.stack.at(0)?;
        let y1 = self.y;
        let x2 = x1 + self.stack.at(1)?;
        let y2 = y1 + self.stack.at(2)?;
        self.x = x2;
        self.y = y2 + self.stack.at(3)?;

        self.builder.curve_to(x1, y1, x2, y2, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    /// Draw the two curves of a flex from the 7 collected points, the flex
    /// height and the final coordinates.
    fn parse_flex(&mut self) -> Result<(), OutlineError> {
        if self.stack.len() != 17 {
            return Err(OutlineError::InvalidArgumentsStackLength);
        }

        let final_y = self.stack.pop()?;
        let final_x = self.stack.pop()?;
        // Flex height.
        let _ = self.stack.pop()?;

        let p3y = self.stack.pop()?;
        let p3x = self.stack.pop()?;
        let bcp4y = self.stack.pop()?;
        let bcp4x = self.stack.pop()?;
        let bcp3y = self.stack.pop()?;
        let bcp3x = self.stack.pop()?;
        let p2y = self.stack.pop()?;
        let p2x = self.stack.pop()?;
        let bcp2y = self.stack.pop()?;
        let bcp2x = self.stack.pop()?;
        let bcp1y = self.stack.pop()?;
        let bcp1x = self.stack.pop()?;
        let rpy = self.stack.pop()?;
        let rpx = self.stack.pop()?;

        for v in [bcp1x + rpx, bcp1y + rpy, bcp2x, bcp2y, p2x, p2y] {
            self.stack.push(v)?;
        }
        self.parse_curve_to()?;

        for v in [bcp3x, bcp3y, bcp4x, bcp4y, p3x, p3y] {
            self.stack.push(v)?;
        }
        self.parse_curve_to()?;

        // Left for the `pop pop setcurrentpoint` that follows.
        self.stack.push(final_x)?;
        self.stack.push(final_y)?;

        Ok(())
    }
}
