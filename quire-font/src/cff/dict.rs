//! DICT data: operands followed by an operator, repeated.

use crate::cff::Strings;
use log::{debug, trace};
use quire_common::byte::Reader;
use smallvec::SmallVec;

/// A DICT key.
///
/// One-byte operators keep their value, two-byte operators (`12 x`) are
/// stored as `1200 + x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Operator(pub(crate) u16);

impl Operator {
    const ESCAPE: u8 = 12;

    pub(crate) const fn escaped(b: u8) -> Self {
        Self(1200 + b as u16)
    }
}

/// Receives the operators of a DICT as they are read.
pub(crate) trait ApplyOperation {
    /// Apply one operator with the operands preceding it.
    fn apply(&mut self, operator: Operator, operands: &[f64], strings: &Strings<'_>);
}

/// Read all operators of a DICT into `target`.
///
/// Returns `None` if the data is malformed. Operators read until then have
/// already been applied.
pub(crate) fn read_dict(data: &[u8], target: &mut impl ApplyOperation, strings: &Strings<'_>) -> Option<()> {
    let mut r = Reader::new(data);
    let mut operands = SmallVec::<[f64; 16]>::new();

    while !r.at_end() {
        let b0 = r.peek_byte()?;

        if b0 <= 21 {
            r.forward();

            let operator = if b0 == Operator::ESCAPE {
                Operator::escaped(r.read_byte()?)
            } else {
                Operator(u16::from(b0))
            };

            trace!("DICT operator {} with {:?}", operator.0, operands.as_slice());
            target.apply(operator, &operands, strings);
            operands.clear();
        } else {
            operands.push(read_operand(&mut r)?);
        }
    }

    if !operands.is_empty() {
        debug!("DICT ends with {} dangling operands", operands.len());
    }

    Some(())
}

fn read_operand(r: &mut Reader<'_>) -> Option<f64> {
    let b0 = r.read_byte()?;

    let value = match b0 {
        28 => f64::from(r.read_i16()?),
        29 => f64::from(r.read_i32()?),
        30 => read_real(r)?,
        32..=246 => f64::from(i32::from(b0) - 139),
        247..=250 => {
            let b1 = r.read_byte()?;
            f64::from((i32::from(b0) - 247) * 256 + i32::from(b1) + 108)
        }
        251..=254 => {
            let b1 = r.read_byte()?;
            f64::from(-(i32::from(b0) - 251) * 256 - i32::from(b1) - 108)
        }
        _ => {
            debug!("reserved DICT operand byte {b0}");
            return None;
        }
    };

    Some(value)
}

/// Read a real number, packed as nibbles into bytes.
fn read_real(r: &mut Reader<'_>) -> Option<f64> {
    let mut text = String::new();

    'outer: loop {
        let byte = r.read_byte()?;

        for nibble in [byte >> 4, byte & 0x0F] {
            match nibble {
                0..=9 => text.push(char::from(b'0' + nibble)),
                0xA => text.push('.'),
                0xB => text.push('E'),
                0xC => text.push_str("E-"),
                0xE => text.push('-'),
                0xF => break 'outer,
                _ => return None,
            }
        }
    }

    if text.is_empty() {
        return Some(0.0);
    }

    text.parse().ok()
}

/// The first operand, as a number.
pub(crate) fn number(operands: &[f64]) -> Option<f64> {
    operands.first().copied()
}

/// The first operand, if it is an integer.
pub(crate) fn integer(operands: &[f64]) -> Option<i32> {
    let value = number(operands)?;

    (value.fract() == 0.0 && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX))
        .then_some(value as i32)
}

/// The first operand, if it is a valid offset.
pub(crate) fn offset(operands: &[f64]) -> Option<usize> {
    usize::try_from(integer(operands)?).ok()
}

/// The first operand, resolved as a string ID.
pub(crate) fn string(operands: &[f64], strings: &Strings<'_>) -> Option<String> {
    let sid = u16::try_from(integer(operands)?).ok()?;
    strings.get(sid).map(str::to_owned)
}

/// Undo the delta encoding of a DICT array.
pub(crate) fn delta(operands: &[f64]) -> Vec<f64> {
    operands
        .iter()
        .scan(0.0, |acc, delta| {
            *acc += delta;
            Some(*acc)
        })
        .collect()
}
