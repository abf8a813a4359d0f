//! Builders for the synthetic documents and fonts used by the integration
//! tests.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

/// Compress data with zlib, as stored in `FlateDecode` streams.
pub fn flate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing into a `Vec` can't fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

/// Writes a PDF file one object and one cross-reference section at a time.
///
/// Every call to [`PdfWriter::finish_section`] writes an `xref` table for
/// the objects added since the previous section, so calling it more than
/// once produces an incrementally updated file.
#[derive(Debug)]
pub struct PdfWriter {
    data: Vec<u8>,
    section: Vec<(u32, usize)>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    /// A file containing only the header.
    pub fn new() -> Self {
        Self {
            data: b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec(),
            section: Vec::new(),
        }
    }

    /// Append raw bytes.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend(bytes);
        self
    }

    /// Write `number 0 obj body endobj` and return its offset.
    pub fn object(&mut self, number: u32, body: &str) -> usize {
        let offset = self.data.len();
        self.section.push((number, offset));
        self.data
            .extend(format!("{number} 0 obj\n{body}\nendobj\n").bytes());

        offset
    }

    /// Write a stream object with a direct `/Length` and return its offset.
    ///
    /// `dict` holds the dictionary entries besides `/Length`.
    pub fn stream(&mut self, number: u32, dict: &str, data: &[u8]) -> usize {
        let offset = self.data.len();
        self.section.push((number, offset));
        self.data.extend(
            format!("{number} 0 obj\n<< {dict} /Length {} >>\nstream\n", data.len()).bytes(),
        );
        self.data.extend(data);
        self.data.extend(b"\nendstream\nendobj\n");

        offset
    }

    /// Write an `xref` table for the objects of the current section,
    /// followed by the trailer and `startxref`. Returns the offset of the
    /// table.
    ///
    /// `trailer` holds the trailer dictionary entries.
    pub fn finish_section(&mut self, trailer: &str) -> usize {
        let offset = self.data.len();
        let mut entries = std::mem::take(&mut self.section);
        entries.sort_unstable();

        self.data.extend(b"xref\n");

        if !entries.iter().any(|(n, _)| *n == 0) {
            self.data.extend(b"0 1\n0000000000 65535 f\r\n");
        }

        for (number, object_offset) in entries {
            self.data
                .extend(format!("{number} 1\n{object_offset:010} 00000 n\r\n").bytes());
        }

        self.data.extend(
            format!("trailer\n<< {trailer} >>\nstartxref\n{offset}\n%%EOF\n").bytes(),
        );

        offset
    }

    /// The finished file.
    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

/// Assemble an sfnt font from tables. The table checksums and the
/// `checkSumAdjustment` of `head` are filled in.
pub fn sfnt(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut tables = tables.to_vec();
    tables.sort_by_key(|(tag, _)| **tag);

    let mut out = Vec::new();
    out.extend(0x0001_0000_u32.to_be_bytes());
    out.extend((tables.len() as u16).to_be_bytes());
    out.extend([0; 6]);

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    let mut head_offset = None;

    for (tag, data) in &tables {
        if *tag == b"head" {
            head_offset = Some(offset);
        }

        out.extend(*tag);
        out.extend(word_sum(data).to_be_bytes());
        out.extend((offset as u32).to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());

        let mut padded = data.clone();
        padded.resize(data.len().next_multiple_of(4), 0);
        offset += padded.len();
        body.extend(padded);
    }

    out.extend(body);

    if let Some(head) = head_offset {
        let adjustment = 0xB1B0_AFBA_u32.wrapping_sub(word_sum(&out));
        out[head + 8..head + 12].copy_from_slice(&adjustment.to_be_bytes());
    }

    out
}

fn word_sum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0_u32, |sum, chunk| {
        let mut word = [0; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// Tables for a small TrueType font.
pub mod truetype {
    /// A `head` table with 1000 units per em.
    pub fn head(index_to_loc_format: i16) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000_u32.to_be_bytes());
        t.extend(0x0002_0000_u32.to_be_bytes());
        t.extend(0_u32.to_be_bytes());
        t.extend(0x5F0F_3CF5_u32.to_be_bytes());
        t.extend(0_u16.to_be_bytes());
        t.extend(1000_u16.to_be_bytes());
        t.extend([0; 16]);
        for v in [0_i16, 0, 600, 700] {
            t.extend(v.to_be_bytes());
        }
        t.extend([0; 6]);
        t.extend(index_to_loc_format.to_be_bytes());
        t.extend(0_i16.to_be_bytes());
        t
    }

    /// An `hhea` table.
    pub fn hhea(number_of_h_metrics: u16) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000_u32.to_be_bytes());
        for v in [800_i16, -200, 0] {
            t.extend(v.to_be_bytes());
        }
        t.extend(600_u16.to_be_bytes());
        t.extend([0; 22]);
        t.extend(number_of_h_metrics.to_be_bytes());
        t
    }

    /// A version 0.5 `maxp` table.
    pub fn maxp(num_glyphs: u16) -> Vec<u8> {
        let mut t = 0x0000_5000_u32.to_be_bytes().to_vec();
        t.extend(num_glyphs.to_be_bytes());
        t
    }

    /// An `hmtx` table from advance widths and left side bearings.
    pub fn hmtx(metrics: &[(u16, i16)]) -> Vec<u8> {
        metrics
            .iter()
            .flat_map(|(a, l)| a.to_be_bytes().into_iter().chain(l.to_be_bytes()))
            .collect()
    }

    /// A simple glyph with one closed contour through `points`, all on the
    /// curve.
    pub fn polygon(points: &[(i16, i16)]) -> Vec<u8> {
        let xs = points.iter().map(|p| p.0);
        let ys = points.iter().map(|p| p.1);

        let mut g = Vec::new();
        g.extend(1_i16.to_be_bytes());
        for v in [
            xs.clone().min().unwrap_or(0),
            ys.clone().min().unwrap_or(0),
            xs.max().unwrap_or(0),
            ys.max().unwrap_or(0),
        ] {
            g.extend(v.to_be_bytes());
        }
        g.extend((points.len() as u16 - 1).to_be_bytes());
        g.extend(0_u16.to_be_bytes());
        g.extend(std::iter::repeat_n(0x01, points.len()));

        let mut previous = (0, 0);
        let mut dx = Vec::new();
        let mut dy = Vec::new();
        for &(x, y) in points {
            dx.extend((x - previous.0).to_be_bytes());
            dy.extend((y - previous.1).to_be_bytes());
            previous = (x, y);
        }
        g.extend(dx);
        g.extend(dy);
        g.resize(g.len().next_multiple_of(2), 0);
        g
    }

    /// A `glyf` table and a short `loca` table for the given glyphs. Empty
    /// entries produce glyphs without an outline.
    pub fn glyf_and_loca(glyphs: &[Vec<u8>]) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = 0_u16.to_be_bytes().to_vec();

        for glyph in glyphs {
            glyf.extend(glyph);
            loca.extend((glyf.len() as u16 / 2).to_be_bytes());
        }

        (glyf, loca)
    }

    /// A `cmap` table with a single Windows Unicode format 6 subtable that
    /// maps consecutive codes from `first_code` to `glyphs`.
    pub fn cmap(first_code: u16, glyphs: &[u16]) -> Vec<u8> {
        let mut subtable = Vec::new();
        subtable.extend(6_u16.to_be_bytes());
        subtable.extend((10 + 2 * glyphs.len() as u16).to_be_bytes());
        subtable.extend(0_u16.to_be_bytes());
        subtable.extend(first_code.to_be_bytes());
        subtable.extend((glyphs.len() as u16).to_be_bytes());
        subtable.extend(glyphs.iter().flat_map(|g| g.to_be_bytes()));

        let mut t = Vec::new();
        t.extend(0_u16.to_be_bytes());
        t.extend(1_u16.to_be_bytes());
        t.extend(3_u16.to_be_bytes());
        t.extend(1_u16.to_be_bytes());
        t.extend(12_u32.to_be_bytes());
        t.extend(subtable);
        t
    }
}

/// Pieces of a Type1 font program.
pub mod type1 {
    const EEXEC_KEY: u16 = 55665;
    const CHARSTRING_KEY: u16 = 4330;

    /// Encrypt with the Type1 cipher.
    pub fn encrypt(plain: &[u8], key: u16) -> Vec<u8> {
        let mut r = key;

        plain
            .iter()
            .map(|p| {
                let c = p ^ (r >> 8) as u8;
                r = u16::from(c)
                    .wrapping_add(r)
                    .wrapping_mul(52845)
                    .wrapping_add(22719);
                c
            })
            .collect()
    }

    /// Encode a charstring program written as numbers and operator names.
    ///
    /// Only the operators that the tests draw with are known.
    pub fn charstring(program: &str) -> Vec<u8> {
        let mut out = Vec::new();

        for word in program.split_whitespace() {
            if let Ok(v) = word.parse::<i32>() {
                match v {
                    -107..=107 => out.push((v + 139) as u8),
                    108..=1131 => {
                        let v = v - 108;
                        out.extend([(v >> 8) as u8 + 247, v as u8]);
                    }
                    -1131..=-108 => {
                        let v = -v - 108;
                        out.extend([(v >> 8) as u8 + 251, v as u8]);
                    }
                    _ => {
                        out.push(255);
                        out.extend(v.to_be_bytes());
                    }
                }

                continue;
            }

            out.push(match word {
                "hsbw" => 13,
                "rlineto" => 5,
                "hlineto" => 6,
                "vlineto" => 7,
                "closepath" => 9,
                "endchar" => 14,
                "rmoveto" => 21,
                _ => panic!("unknown charstring operator {word}"),
            });
        }

        out
    }

    /// A PFA font named `name` with the given `(glyph name, program)`
    /// charstrings, where codes 65 and up map to the glyphs in order.
    pub fn pfa(name: &str, glyphs: &[(&str, &str)]) -> Vec<u8> {
        let mut out = format!(
            "%!PS-AdobeFont-1.0: {name} 001.000
10 dict begin
/FontName /{name} def
/FontType 1 def
/FontMatrix [0.001 0 0 0.001 0 0] readonly def
/FontBBox {{0 0 1000 1000}} readonly def
/Encoding 256 array
0 1 255 {{1 index exch /.notdef put}} for
"
        )
        .into_bytes();

        for (i, (glyph, _)) in glyphs.iter().enumerate() {
            out.extend(format!("dup {} /{glyph} put\n", 65 + i).bytes());
        }

        out.extend(b"readonly def\ncurrentdict end\ncurrentfile eexec\n");

        let mut private = b"dup /Private 4 dict dup begin
/RD{string currentfile exch readstring pop}executeonly def
/ND{noaccess def}executeonly def
/NP{noaccess put}executeonly def
/lenIV 4 def
"
        .to_vec();
        private.extend(format!("2 index /CharStrings {} dict dup begin\n", glyphs.len()).bytes());

        for (glyph, program) in glyphs {
            let mut plain = vec![0; 4];
            plain.extend(charstring(program));
            let cipher = encrypt(&plain, CHARSTRING_KEY);

            private.extend(format!("/{glyph} {} RD ", cipher.len()).bytes());
            private.extend(cipher);
            private.extend(b" ND\n");
        }

        private.extend(b"end\nend\nreadonly put\nnoaccess put\nmark currentfile closefile\n");

        let mut plain = vec![0; 4];
        plain.extend(private);
        out.extend(encrypt(&plain, EEXEC_KEY));
        out.extend(b"\n0000000000000000\ncleartomark\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charstring_numbers() {
        assert_eq!(type1::charstring("0 107 -107"), [139, 246, 32]);
        assert_eq!(type1::charstring("108 -108"), [247, 0, 251, 0]);
        assert_eq!(type1::charstring("2000 endchar"), [255, 0, 0, 7, 208, 14]);
    }

    #[test]
    fn cross_reference_section() {
        let mut writer = PdfWriter::new();
        let offset = writer.object(1, "<< /Type /Catalog >>");
        let xref = writer.finish_section("/Size 2 /Root 1 0 R");
        let data = writer.finish();

        let text = String::from_utf8_lossy(&data[xref..]);
        assert!(text.starts_with("xref\n0 1\n0000000000 65535 f\r\n1 1\n"));
        assert!(text.contains(&format!("{offset:010} 00000 n")));
        assert!(text.ends_with(&format!("startxref\n{xref}\n%%EOF\n")));
    }
}
