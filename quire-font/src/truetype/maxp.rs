use quire_common::byte::Reader;

/// The maximum profile table.
///
/// Version 0.5 only has the glyph count, which is all that fonts with CFF
/// outlines need. Version 1.0 adds the limits of the TrueType instruction
/// interpreter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaximumProfileTable {
    /// The raw 16.16 version.
    pub version: u32,
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
    /// The version 1.0 fields, if present.
    pub limits: Option<MaximumProfileLimits>,
}

/// The version 1.0 part of `maxp`.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaximumProfileLimits {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

impl MaximumProfileTable {
    const VERSION_1_0: u32 = 0x0001_0000;

    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);
        let version = r.read_u32()?;
        let num_glyphs = r.read_u16()?;

        let limits = if version >= Self::VERSION_1_0 {
            Some(MaximumProfileLimits {
                max_points: r.read_u16()?,
                max_contours: r.read_u16()?,
                max_composite_points: r.read_u16()?,
                max_composite_contours: r.read_u16()?,
                max_zones: r.read_u16()?,
                max_twilight_points: r.read_u16()?,
                max_storage: r.read_u16()?,
                max_function_defs: r.read_u16()?,
                max_instruction_defs: r.read_u16()?,
                max_stack_elements: r.read_u16()?,
                max_size_of_instructions: r.read_u16()?,
                max_component_elements: r.read_u16()?,
                max_component_depth: r.read_u16()?,
            })
        } else {
            None
        };

        Some(Self {
            version,
            num_glyphs,
            limits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_0_5() {
        let table = MaximumProfileTable::parse(&[0, 0, 0x50, 0, 0x01, 0x02]).unwrap();

        assert_eq!(table.num_glyphs, 0x0102);
        assert_eq!(table.limits, None);
    }

    #[test]
    fn version_1_0() {
        let mut data = vec![0, 1, 0, 0, 0, 3];
        data.extend((1..=13_u16).flat_map(u16::to_be_bytes));

        let table = MaximumProfileTable::parse(&data).unwrap();
        let limits = table.limits.unwrap();

        assert_eq!(table.num_glyphs, 3);
        assert_eq!(limits.max_points, 1);
        assert_eq!(limits.max_component_depth, 13);

        assert!(MaximumProfileTable::parse(&data[..20]).is_none());
    }
}
