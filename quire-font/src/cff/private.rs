use crate::cff::Strings;
use crate::cff::dict::{ApplyOperation, Operator, delta, integer, number, offset};
use crate::cff::top::set;
use log::debug;

mod op {
    use super::Operator;

    pub(super) const BLUE_VALUES: Operator = Operator(6);
    pub(super) const OTHER_BLUES: Operator = Operator(7);
    pub(super) const FAMILY_BLUES: Operator = Operator(8);
    pub(super) const FAMILY_OTHER_BLUES: Operator = Operator(9);
    pub(super) const STD_HW: Operator = Operator(10);
    pub(super) const STD_VW: Operator = Operator(11);
    pub(super) const SUBRS: Operator = Operator(19);
    pub(super) const DEFAULT_WIDTH_X: Operator = Operator(20);
    pub(super) const NOMINAL_WIDTH_X: Operator = Operator(21);
    pub(super) const BLUE_SCALE: Operator = Operator::escaped(9);
    pub(super) const BLUE_SHIFT: Operator = Operator::escaped(10);
    pub(super) const BLUE_FUZZ: Operator = Operator::escaped(11);
    pub(super) const STEM_SNAP_H: Operator = Operator::escaped(12);
    pub(super) const STEM_SNAP_V: Operator = Operator::escaped(13);
    pub(super) const FORCE_BOLD: Operator = Operator::escaped(14);
    pub(super) const LANGUAGE_GROUP: Operator = Operator::escaped(17);
    pub(super) const EXPANSION_FACTOR: Operator = Operator::escaped(18);
    pub(super) const INITIAL_RANDOM_SEED: Operator = Operator::escaped(19);
}

/// Hinting parameters and local subroutines of a font.
///
/// The blue zone and stem snap arrays hold absolute values, the delta
/// encoding of the DICT is already undone.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub struct PrivateDict {
    pub blue_values: Vec<f64>,
    pub other_blues: Vec<f64>,
    pub family_blues: Vec<f64>,
    pub family_other_blues: Vec<f64>,
    pub blue_scale: f64,
    pub blue_shift: f64,
    pub blue_fuzz: f64,
    pub std_hw: Option<f64>,
    pub std_vw: Option<f64>,
    pub stem_snap_h: Vec<f64>,
    pub stem_snap_v: Vec<f64>,
    pub force_bold: bool,
    pub language_group: i32,
    pub expansion_factor: f64,
    pub initial_random_seed: f64,
    /// Offset of the local subroutines, relative to the start of the DICT.
    pub subrs: Option<usize>,
    pub default_width_x: f64,
    pub nominal_width_x: f64,
}

impl Default for PrivateDict {
    fn default() -> Self {
        Self {
            blue_values: Vec::new(),
            other_blues: Vec::new(),
            family_blues: Vec::new(),
            family_other_blues: Vec::new(),
            blue_scale: 0.039625,
            blue_shift: 7.0,
            blue_fuzz: 1.0,
            std_hw: None,
            std_vw: None,
            stem_snap_h: Vec::new(),
            stem_snap_v: Vec::new(),
            force_bold: false,
            language_group: 0,
            expansion_factor: 0.06,
            initial_random_seed: 0.0,
            subrs: None,
            default_width_x: 0.0,
            nominal_width_x: 0.0,
        }
    }
}

impl ApplyOperation for PrivateDict {
    fn apply(&mut self, operator: Operator, operands: &[f64], _: &Strings<'_>) {
        match operator {
            op::BLUE_VALUES => self.blue_values = delta(operands),
            op::OTHER_BLUES => self.other_blues = delta(operands),
            op::FAMILY_BLUES => self.family_blues = delta(operands),
            op::FAMILY_OTHER_BLUES => self.family_other_blues = delta(operands),
            op::STEM_SNAP_H => self.stem_snap_h = delta(operands),
            op::STEM_SNAP_V => self.stem_snap_v = delta(operands),
            op::STD_HW => self.std_hw = number(operands),
            op::STD_VW => self.std_vw = number(operands),
            op::BLUE_SCALE => set(&mut self.blue_scale, number(operands)),
            op::BLUE_SHIFT => set(&mut self.blue_shift, number(operands)),
            op::BLUE_FUZZ => set(&mut self.blue_fuzz, number(operands)),
            op::FORCE_BOLD => self.force_bold = number(operands).is_some_and(|n| n != 0.0),
            op::LANGUAGE_GROUP => set(&mut self.language_group, integer(operands)),
            op::EXPANSION_FACTOR => set(&mut self.expansion_factor, number(operands)),
            op::INITIAL_RANDOM_SEED => set(&mut self.initial_random_seed, number(operands)),
            op::SUBRS => self.subrs = offset(operands),
            op::DEFAULT_WIDTH_X => set(&mut self.default_width_x, number(operands)),
            op::NOMINAL_WIDTH_X => set(&mut self.nominal_width_x, number(operands)),
            _ => debug!("ignoring Private DICT operator {}", operator.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cff::dict::read_dict;

    #[test]
    fn defaults() {
        let mut dict = PrivateDict::default();
        read_dict(&[], &mut dict, &Strings::default()).unwrap();

        assert_eq!(dict.blue_scale, 0.039625);
        assert_eq!(dict.blue_shift, 7.0);
        assert_eq!(dict.blue_fuzz, 1.0);
        assert_eq!(dict.expansion_factor, 0.06);
        assert_eq!(dict.subrs, None);
    }

    #[test]
    fn blues_and_subrs() {
        // BlueValues -15 15 500 15, StdVW 80, Subrs 42, nominalWidthX -20.
        let data = [
            0x7C, 0x9A, 0xF8, 0x88, 0x9A, 0x06, 0xDB, 0x0B, 0xB5, 0x13, 0x77, 0x15,
        ];

        let mut dict = PrivateDict::default();
        read_dict(&data, &mut dict, &Strings::default()).unwrap();

        assert_eq!(dict.blue_values, vec![-15.0, 0.0, 500.0, 515.0]);
        assert_eq!(dict.std_vw, Some(80.0));
        assert_eq!(dict.subrs, Some(42));
        assert_eq!(dict.nominal_width_x, -20.0);
    }
}
