/*!
A parser for CMap files, as they are found in PDFs.

A CMap maps the character codes of a text-showing operator either to
Unicode text (a `ToUnicode` CMap) or to CIDs (the `Encoding` of a composite
font). This crate reads both kinds from their PostScript source:
- [`CMap::read_code`] splits a string into codes through the codespace ranges.
- [`CMap::to_unicode`] looks up the text of a code.
- [`CMap::to_cid`] looks up the CID of a code.

CMaps referenced through `usecmap` are looked up among the embedded
predefined CMaps first (with the `embed-cmaps` feature), then through an
optional resolver supplied by the caller.

# Example
```
use quire_cmap::CMap;
use quire_syntax::scanner::ScannerOptions;

let data = b"1 begincodespacerange <00> <FF> endcodespacerange
1 beginbfchar <41> <0042> endbfchar";
let cmap = CMap::parse(data, ScannerOptions::default()).unwrap();

assert_eq!(cmap.read_code(b"AB"), Some((0x41, 1)));
assert_eq!(cmap.to_unicode(0x41), Some("B"));
```
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod builder;
mod error;
mod parser;
mod predefined;

pub use builder::CharacterMapBuilder;
pub use error::{CMapError, Result};

use core::cmp::Ordering;
use quire_syntax::scanner::ScannerOptions;
use rustc_hash::FxHashMap;

/// The longest character code a CMap can define, in bytes.
pub const MAX_CODE_LEN: usize = 4;

/// A parsed CMap.
#[derive(Debug, Clone, Default)]
pub struct CMap {
    name: Option<String>,
    version: Option<f64>,
    cmap_type: Option<i64>,
    writing_mode: WritingMode,
    system_info: Option<CidSystemInfo>,
    codespace_ranges: Vec<CodespaceRange>,
    unicode: FxHashMap<u32, String>,
    cid_chars: FxHashMap<u32, u32>,
    cid_ranges: Vec<CidRange>,
    notdef_chars: FxHashMap<u32, u32>,
    notdef_ranges: Vec<CidRange>,
}

impl CMap {
    /// Parse a CMap.
    ///
    /// `usecmap` can only refer to embedded predefined CMaps.
    pub fn parse(data: &[u8], options: ScannerOptions) -> Result<Self> {
        parser::parse(data, options, &|_| None, 0)
    }

    /// Parse a CMap, resolving `usecmap` references that are not embedded
    /// through `resolver`.
    pub fn parse_with_resolver<'a>(
        data: &[u8],
        options: ScannerOptions,
        resolver: &dyn Fn(&str) -> Option<&'a [u8]>,
    ) -> Result<Self> {
        parser::parse(data, options, resolver, 0)
    }

    /// One of the embedded predefined CMaps, like `Identity-H`.
    ///
    /// Returns `None` when the name is unknown or the `embed-cmaps` feature
    /// is disabled.
    pub fn predefined(name: &str) -> Option<Self> {
        let data = predefined::load(name)?;

        parser::parse(data, ScannerOptions::default(), &|_| None, 0).ok()
    }

    /// Read the next character code from the start of `bytes`.
    ///
    /// Returns the code and its length in bytes. A code is the shortest
    /// prefix that lies in a codespace range. Without a match, the length
    /// of the shortest codespace range is used, or a single byte if there
    /// are none.
    pub fn read_code(&self, bytes: &[u8]) -> Option<(u32, usize)> {
        if bytes.is_empty() {
            return None;
        }

        for len in 1..=MAX_CODE_LEN.min(bytes.len()) {
            let candidate = &bytes[..len];

            if self.codespace_ranges.iter().any(|r| r.contains(candidate)) {
                return Some((code_value(candidate), len));
            }
        }

        let len = self
            .codespace_ranges
            .iter()
            .map(CodespaceRange::byte_len)
            .min()
            .unwrap_or(1)
            .min(bytes.len());

        Some((code_value(&bytes[..len]), len))
    }

    /// Iterate over the codes of a string.
    pub fn codes<'a>(&'a self, mut bytes: &'a [u8]) -> impl Iterator<Item = u32> + 'a {
        core::iter::from_fn(move || {
            let (code, len) = self.read_code(bytes)?;
            bytes = &bytes[len..];

            Some(code)
        })
    }

    /// The Unicode text of a character code.
    pub fn to_unicode(&self, code: u32) -> Option<&str> {
        self.unicode.get(&code).map(String::as_str)
    }

    /// The CID of a character code.
    ///
    /// Codes without a mapping use their `notdef` mapping, or CID 0.
    pub fn to_cid(&self, code: u32) -> u32 {
        if let Some(cid) = self.cid_chars.get(&code) {
            return *cid;
        }

        // Later ranges take precedence.
        if let Some(range) = self.cid_ranges.iter().rev().find(|r| r.contains(code)) {
            return range.cid.saturating_add(code - range.start);
        }

        self.notdef_chars
            .get(&code)
            .copied()
            .or_else(|| {
                self.notdef_ranges
                    .iter()
                    .rev()
                    .find(|r| r.contains(code))
                    .map(|r| r.cid)
            })
            .unwrap_or(0)
    }

    /// The `/CMapName`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `/CMapVersion`.
    pub fn version(&self) -> Option<f64> {
        self.version
    }

    /// The `/CMapType`.
    pub fn cmap_type(&self) -> Option<i64> {
        self.cmap_type
    }

    /// The `/WMode`.
    pub fn writing_mode(&self) -> WritingMode {
        self.writing_mode
    }

    /// The `/CIDSystemInfo`.
    pub fn system_info(&self) -> Option<&CidSystemInfo> {
        self.system_info.as_ref()
    }

    /// The codespace ranges, including those of CMaps used through
    /// `usecmap`.
    pub fn codespace_ranges(&self) -> &[CodespaceRange] {
        &self.codespace_ranges
    }

    /// Whether the CMap maps any code to Unicode.
    pub fn has_unicode_mappings(&self) -> bool {
        !self.unicode.is_empty()
    }

    /// Whether the CMap maps any code to a CID.
    pub fn has_cid_mappings(&self) -> bool {
        !self.cid_chars.is_empty() || !self.cid_ranges.is_empty()
    }
}

/// The writing mode of a CMap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
    /// Horizontal writing mode.
    #[default]
    Horizontal,
    /// Vertical writing mode.
    Vertical,
}

/// The character collection of a CMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidSystemInfo {
    /// The issuer of the collection, like `Adobe`.
    pub registry: String,
    /// The name of the collection, like `Japan1`.
    pub ordering: String,
    /// The supplement number.
    pub supplement: i64,
}

/// A range of valid character codes.
///
/// Every byte of a code must lie between the corresponding bytes of `low`
/// and `high`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodespaceRange {
    low: Vec<u8>,
    high: Vec<u8>,
}

impl CodespaceRange {
    /// The lower bound.
    pub fn low(&self) -> &[u8] {
        &self.low
    }

    /// The upper bound.
    pub fn high(&self) -> &[u8] {
        &self.high
    }

    /// The number of bytes of the codes in this range.
    pub fn byte_len(&self) -> usize {
        self.low.len()
    }

    /// Whether `code` lies in this range.
    pub fn contains(&self, code: &[u8]) -> bool {
        code.len() == self.low.len()
            && code
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(b, (low, high))| (low..=high).contains(&b))
    }
}

/// Consecutive codes mapped to consecutive CIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CidRange {
    start: u32,
    end: u32,
    cid: u32,
}

impl CidRange {
    fn contains(&self, code: u32) -> bool {
        (self.start..=self.end).contains(&code)
    }
}

/// The numeric value of a big-endian code of up to four bytes.
pub(crate) fn code_value(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0, |acc, b| (acc << 8) | u32::from(*b))
}

/// Compare two byte sequences most significant byte first.
pub(crate) fn compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Add one to a big-endian byte sequence, carrying into the more
/// significant bytes.
///
/// Returns `false` if the sequence wrapped around to zero.
pub(crate) fn increment(bytes: &mut [u8]) -> bool {
    for b in bytes.iter_mut().rev() {
        let (value, carry) = b.overflowing_add(1);
        *b = value;

        if !carry {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmap(data: &str) -> CMap {
        CMap::parse(data.as_bytes(), ScannerOptions::default()).unwrap()
    }

    #[test]
    fn increment_with_carry() {
        let mut bytes = [0x00, 0xFE];
        assert!(increment(&mut bytes));
        assert_eq!(bytes, [0x00, 0xFF]);
        assert!(increment(&mut bytes));
        assert_eq!(bytes, [0x01, 0x00]);

        let mut bytes = [0xFF, 0xFF];
        assert!(!increment(&mut bytes));
        assert_eq!(bytes, [0x00, 0x00]);
    }

    #[test]
    fn compare_bytes() {
        assert_eq!(compare(&[0x01, 0x00], &[0x00, 0xFF]), Ordering::Greater);
        assert_eq!(compare(&[0x00, 0x10], &[0x00, 0x10]), Ordering::Equal);
        assert_eq!(compare(&[0x00, 0x0F], &[0x00, 0x10]), Ordering::Less);
    }

    #[test]
    fn mixed_code_lengths() {
        let cmap = cmap(
            "2 begincodespacerange
<00> <80>
<8140> <9FFC>
endcodespacerange",
        );

        assert_eq!(cmap.read_code(&[0x41, 0x81]), Some((0x41, 1)));
        assert_eq!(cmap.read_code(&[0x81, 0x40, 0x41]), Some((0x8140, 2)));
        // The second byte is outside of the range.
        assert_eq!(cmap.read_code(&[0x81, 0x20]), Some((0x81, 1)));
        assert_eq!(cmap.read_code(&[]), None);
        assert_eq!(
            cmap.codes(&[0x41, 0x81, 0x40, 0x42]).collect::<Vec<_>>(),
            [0x41, 0x8140, 0x42]
        );
    }

    #[test]
    fn no_codespace() {
        let cmap = cmap("1 beginbfchar <01> <0041> endbfchar");

        assert_eq!(cmap.read_code(&[0x01, 0x02]), Some((0x01, 1)));
    }

    #[test]
    fn cid_precedence() {
        let cmap = cmap(
            "1 begincodespacerange <0000> <FFFF> endcodespacerange
2 begincidrange
<0000> <00FF> 0
<0010> <001F> 500
endcidrange
1 begincidchar <0011> 7 endcidchar
1 beginnotdefrange <0100> <01FF> 3 endnotdefrange",
        );

        assert_eq!(cmap.to_cid(0x0005), 5);
        assert_eq!(cmap.to_cid(0x0010), 500);
        assert_eq!(cmap.to_cid(0x0011), 7);
        assert_eq!(cmap.to_cid(0x0150), 3);
        assert_eq!(cmap.to_cid(0x0300), 0);
        assert!(cmap.has_cid_mappings());
        assert!(!cmap.has_unicode_mappings());
    }

    #[cfg(feature = "embed-cmaps")]
    #[test]
    fn predefined_identity() {
        let h = CMap::predefined("Identity-H").unwrap();
        assert_eq!(h.name(), Some("Identity-H"));
        assert_eq!(h.writing_mode(), WritingMode::Horizontal);
        assert_eq!(h.read_code(&[0x12, 0x34]), Some((0x1234, 2)));
        assert_eq!(h.to_cid(0x1234), 0x1234);
        assert_eq!(h.to_cid(0xFFFF), 0xFFFF);
        assert_eq!(
            h.system_info(),
            Some(&CidSystemInfo {
                registry: "Adobe".to_string(),
                ordering: "Identity".to_string(),
                supplement: 0,
            })
        );

        let v = CMap::predefined("Identity-V").unwrap();
        assert_eq!(v.writing_mode(), WritingMode::Vertical);
        assert_eq!(v.to_cid(0x0203), 0x0203);

        assert!(CMap::predefined("UniJIS-UTF16-H").is_none());
    }
}
