use crate::{
    CMap, CidRange, CidSystemInfo, CodespaceRange, MAX_CODE_LEN, WritingMode, code_value, compare,
    increment,
};
use core::cmp::Ordering;
use log::warn;
use rustc_hash::FxHashMap;

/// The most codes a single `bfrange` entry is expanded into.
const MAX_RANGE_LEN: usize = 0x10000;

/// Collects the contents of a CMap while it is being read.
///
/// The builder is consumed by [`CharacterMapBuilder::build`]. Mappings added
/// later replace earlier ones for the same code, except that mappings taken
/// over from a base CMap through [`CharacterMapBuilder::use_cmap`] never
/// replace anything.
#[derive(Debug, Default)]
pub struct CharacterMapBuilder {
    /// The `/CMapName`.
    pub name: Option<String>,
    /// The `/CMapVersion`.
    pub version: Option<f64>,
    /// The `/CMapType`.
    pub cmap_type: Option<i64>,
    /// The `/WMode`.
    pub writing_mode: Option<WritingMode>,
    /// The `/CIDSystemInfo`.
    pub system_info: Option<CidSystemInfo>,
    codespace_ranges: Vec<CodespaceRange>,
    unicode: FxHashMap<u32, String>,
    cid_chars: FxHashMap<u32, u32>,
    cid_ranges: Vec<CidRange>,
    notdef_chars: FxHashMap<u32, u32>,
    notdef_ranges: Vec<CidRange>,
}

impl CharacterMapBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a codespace range.
    ///
    /// Returns `None` if the bounds differ in length or are not between one
    /// and four bytes long.
    pub fn add_codespace_range(&mut self, low: &[u8], high: &[u8]) -> Option<()> {
        check_code(low)?;

        if low.len() != high.len() {
            return None;
        }

        self.codespace_ranges.push(CodespaceRange {
            low: low.to_vec(),
            high: high.to_vec(),
        });

        Some(())
    }

    /// Map a single code to the UTF-16BE text `destination`.
    pub fn add_base_font_character(&mut self, code: &[u8], destination: &[u8]) -> Option<()> {
        check_code(code)?;

        self.unicode
            .insert(code_value(code), decode_destination(destination)?);

        Some(())
    }

    /// Map the codes from `start` to `end` to consecutive text, starting with
    /// `destination`.
    ///
    /// Both the code and the destination are stepped with carry into their
    /// more significant bytes.
    pub fn add_base_font_range(
        &mut self,
        start: &[u8],
        end: &[u8],
        destination: &[u8],
    ) -> Option<()> {
        check_range(start, end)?;

        if destination.is_empty() {
            return None;
        }

        let mut destination = destination.to_vec();

        for_each_code(start, end, |code, i| {
            if i > 0 {
                increment(&mut destination);
            }

            if let Some(text) = decode_destination(&destination) {
                self.unicode.insert(code, text);
            }

            true
        });

        Some(())
    }

    /// Map the codes from `start` to `end` to the entries of `destinations`
    /// in order.
    ///
    /// Codes without a corresponding entry stay unmapped.
    pub fn add_base_font_range_array(
        &mut self,
        start: &[u8],
        end: &[u8],
        destinations: &[&[u8]],
    ) -> Option<()> {
        check_range(start, end)?;

        for_each_code(start, end, |code, i| {
            let Some(destination) = destinations.get(i) else {
                return false;
            };

            if let Some(text) = decode_destination(destination) {
                self.unicode.insert(code, text);
            }

            true
        });

        Some(())
    }

    /// Map a single code to a CID.
    pub fn add_cid_character(&mut self, code: &[u8], cid: u32) -> Option<()> {
        check_code(code)?;
        self.cid_chars.insert(code_value(code), cid);

        Some(())
    }

    /// Map the codes from `start` to `end` to consecutive CIDs, starting with
    /// `cid`.
    pub fn add_cid_range(&mut self, start: &[u8], end: &[u8], cid: u32) -> Option<()> {
        self.cid_ranges.push(cid_range(start, end, cid)?);

        Some(())
    }

    /// Map a single code to the CID used when its glyph is missing.
    pub fn add_notdef_character(&mut self, code: &[u8], cid: u32) -> Option<()> {
        check_code(code)?;
        self.notdef_chars.insert(code_value(code), cid);

        Some(())
    }

    /// Map the codes from `start` to `end` to the CID used when their glyphs
    /// are missing.
    pub fn add_notdef_range(&mut self, start: &[u8], end: &[u8], cid: u32) -> Option<()> {
        self.notdef_ranges.push(cid_range(start, end, cid)?);

        Some(())
    }

    /// Take over the contents of `base`, as done by `usecmap`.
    pub fn use_cmap(&mut self, base: &CMap) {
        self.codespace_ranges
            .extend(base.codespace_ranges.iter().cloned());

        for (code, text) in &base.unicode {
            self.unicode.entry(*code).or_insert_with(|| text.clone());
        }

        for (code, cid) in &base.cid_chars {
            self.cid_chars.entry(*code).or_insert(*cid);
        }

        for (code, cid) in &base.notdef_chars {
            self.notdef_chars.entry(*code).or_insert(*cid);
        }

        // Ranges are searched from the back, so the base goes first.
        self.cid_ranges
            .splice(0..0, base.cid_ranges.iter().cloned());
        self.notdef_ranges
            .splice(0..0, base.notdef_ranges.iter().cloned());

        self.writing_mode.get_or_insert(base.writing_mode);

        if self.system_info.is_none() {
            self.system_info.clone_from(&base.system_info);
        }
    }

    /// Finish the CMap.
    pub fn build(self) -> CMap {
        CMap {
            name: self.name,
            version: self.version,
            cmap_type: self.cmap_type,
            writing_mode: self.writing_mode.unwrap_or_default(),
            system_info: self.system_info,
            codespace_ranges: self.codespace_ranges,
            unicode: self.unicode,
            cid_chars: self.cid_chars,
            cid_ranges: self.cid_ranges,
            notdef_chars: self.notdef_chars,
            notdef_ranges: self.notdef_ranges,
        }
    }
}

fn check_code(code: &[u8]) -> Option<()> {
    (1..=MAX_CODE_LEN).contains(&code.len()).then_some(())
}

fn check_range(start: &[u8], end: &[u8]) -> Option<()> {
    check_code(start)?;
    check_code(end)
}

fn cid_range(start: &[u8], end: &[u8], cid: u32) -> Option<CidRange> {
    check_range(start, end)?;

    Some(CidRange {
        start: code_value(start),
        end: code_value(end),
        cid,
    })
}

/// Call `f` with every code from `start` up to and including `end`, and the
/// index of the code in the range, until it returns `false`.
fn for_each_code(start: &[u8], end: &[u8], mut f: impl FnMut(u32, usize) -> bool) {
    let mut current = start.to_vec();

    for i in 0..MAX_RANGE_LEN {
        if !f(code_value(&current), i) || compare(&current, end) != Ordering::Less {
            return;
        }

        increment(&mut current);
    }

    warn!(
        "range from {start:02X?} to {end:02X?} is longer than {MAX_RANGE_LEN} codes, truncating"
    );
}

/// Decode UTF-16BE text. A single leading byte of an odd-length destination
/// is a code unit of its own.
fn decode_destination(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    let (head, rest) = bytes.split_at(bytes.len() % 2);
    let units = head
        .iter()
        .map(|b| u16::from(*b))
        .chain(rest.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])));

    Some(
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_text() {
        assert_eq!(decode_destination(&[0x00, 0x41]).as_deref(), Some("A"));
        assert_eq!(decode_destination(&[0x41]).as_deref(), Some("A"));
        assert_eq!(
            decode_destination(&[0x00, 0x66, 0x00, 0x69]).as_deref(),
            Some("fi")
        );
        assert_eq!(
            decode_destination(&[0xD8, 0x3D, 0xDE, 0x00]).as_deref(),
            Some("\u{1F600}")
        );
        assert_eq!(decode_destination(&[]), None);
    }

    #[test]
    fn range_with_carry() {
        let mut builder = CharacterMapBuilder::new();
        builder
            .add_base_font_range(&[0x00, 0xFE], &[0x01, 0x01], &[0x00, 0x61])
            .unwrap();
        let cmap = builder.build();

        assert_eq!(cmap.to_unicode(0x00FE), Some("a"));
        assert_eq!(cmap.to_unicode(0x00FF), Some("b"));
        assert_eq!(cmap.to_unicode(0x0100), Some("c"));
        assert_eq!(cmap.to_unicode(0x0101), Some("d"));
        assert_eq!(cmap.to_unicode(0x0102), None);
    }

    #[test]
    fn destination_carry() {
        let mut builder = CharacterMapBuilder::new();
        builder
            .add_base_font_range(&[0x10], &[0x12], &[0x00, 0xFF])
            .unwrap();
        let cmap = builder.build();

        assert_eq!(cmap.to_unicode(0x10), Some("\u{FF}"));
        assert_eq!(cmap.to_unicode(0x11), Some("\u{100}"));
        assert_eq!(cmap.to_unicode(0x12), Some("\u{101}"));
    }

    #[test]
    fn range_array() {
        let mut builder = CharacterMapBuilder::new();
        builder
            .add_base_font_range_array(&[0x01], &[0x04], &[&[0x00, 0x78], &[0x00, 0x79, 0x00, 0x7A]])
            .unwrap();
        let cmap = builder.build();

        assert_eq!(cmap.to_unicode(0x01), Some("x"));
        assert_eq!(cmap.to_unicode(0x02), Some("yz"));
        assert_eq!(cmap.to_unicode(0x03), None);
    }

    #[test]
    fn reversed_range() {
        let mut builder = CharacterMapBuilder::new();
        builder
            .add_base_font_range(&[0x20], &[0x10], &[0x00, 0x41])
            .unwrap();
        let cmap = builder.build();

        // Only the start is mapped.
        assert_eq!(cmap.to_unicode(0x20), Some("A"));
        assert_eq!(cmap.to_unicode(0x10), None);
    }

    #[test]
    fn invalid_codes() {
        let mut builder = CharacterMapBuilder::new();

        assert_eq!(builder.add_codespace_range(&[0x00], &[0x00, 0xFF]), None);
        assert_eq!(builder.add_codespace_range(&[], &[]), None);
        assert_eq!(builder.add_cid_character(&[0; 5], 1), None);
        assert_eq!(builder.add_cid_range(&[0x00], &[], 1), None);
        assert_eq!(builder.add_base_font_range(&[0x00], &[0x01], &[]), None);
    }

    #[test]
    fn base_cmap_does_not_override() {
        let mut base = CharacterMapBuilder::new();
        base.add_codespace_range(&[0x00], &[0xFF]).unwrap();
        base.add_cid_range(&[0x00], &[0xFF], 100).unwrap();
        base.add_cid_character(&[0x05], 1).unwrap();
        base.add_base_font_character(&[0x05], &[0x00, 0x41]).unwrap();
        base.writing_mode = Some(WritingMode::Vertical);
        let base = base.build();

        let mut child = CharacterMapBuilder::new();
        child.add_cid_range(&[0x10], &[0x1F], 500).unwrap();
        child.add_base_font_character(&[0x05], &[0x00, 0x42]).unwrap();
        child.use_cmap(&base);
        let cmap = child.build();

        assert_eq!(cmap.codespace_ranges().len(), 1);
        assert_eq!(cmap.to_cid(0x05), 1);
        assert_eq!(cmap.to_cid(0x06), 106);
        assert_eq!(cmap.to_cid(0x11), 501);
        assert_eq!(cmap.to_unicode(0x05), Some("B"));
        assert_eq!(cmap.writing_mode(), WritingMode::Vertical);
    }
}
