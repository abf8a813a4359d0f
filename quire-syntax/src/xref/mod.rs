//! Cross-reference tables and streams.
//!
//! A document stores the locations of its objects in one or more
//! cross-reference sections, each linked to the previous one through the
//! `Prev` entry of its trailer. Every section is read into a
//! [`CrossReferenceTablePart`], and the [`CrossReferenceTableBuilder`] folds
//! the chain into a single [`CrossReferenceTable`].

mod builder;
mod parse;
mod part;
mod repair;
mod table;

pub use builder::CrossReferenceTableBuilder;
pub use part::{CrossReferenceTablePart, CrossReferenceType, XrefLocation};
pub use table::{CrossReferenceTable, Trailer};

use crate::error::{Error, Result};
use crate::scanner::ScannerOptions;
use crate::trivia::is_white_space_character;
use crate::{OptionLog, Reader};
use log::{debug, warn};
use memchr::memmem;
use rustc_hash::FxHashSet;

/// Find the offset that the last `startxref` keyword points to.
pub fn find_start_xref(data: &[u8]) -> Option<usize> {
    let pos = memmem::rfind(data, b"startxref")?;

    let mut r = Reader::new_at(data, pos + b"startxref".len());
    r.forward_while(is_white_space_character);

    let start = r.offset();
    r.forward_while_1(|b| b.is_ascii_digit())?;

    core::str::from_utf8(r.range(start..r.offset())?)
        .ok()?
        .parse()
        .ok()
}

/// Read the cross-reference information of a whole file.
///
/// In lenient mode, sections that cannot be found where the file says they
/// are get searched for nearby, and a file without any readable section is
/// repaired by scanning for objects.
pub fn read_cross_reference_table(data: &[u8], options: ScannerOptions) -> Result<CrossReferenceTable> {
    let Some(start) = find_start_xref(data) else {
        if options.lenient {
            warn!("no startxref keyword found");
            return repair::repair(data, options);
        }

        return Err(Error::MissingStartXref);
    };

    debug!("startxref points to {start}");

    let builder = match collect_parts(data, start, options) {
        Ok(builder) => builder,
        Err(e) if options.lenient => {
            warn!("failed to read cross-reference chain: {e}");
            return repair::repair(data, options);
        }
        Err(e) => return Err(e),
    };

    match builder.build(start) {
        Ok(table) => Ok(table),
        Err(e) if options.lenient => {
            warn!("{e}");
            repair::repair(data, options)
        }
        Err(e) => Err(e),
    }
}

/// Read the part at `start` and every part reachable from it.
fn collect_parts(data: &[u8], start: usize, options: ScannerOptions) -> Result<CrossReferenceTableBuilder> {
    let mut builder = CrossReferenceTableBuilder::new();
    let mut visited = FxHashSet::default();
    let mut pending = vec![start];

    while let Some(offset) = pending.pop() {
        if !visited.insert(offset) {
            warn!("cross-reference section at {offset} is referenced twice");
            continue;
        }

        let part = match parse::read_part(data, offset, offset, options) {
            Ok(part) => part,
            Err(e) if options.lenient => {
                let Some(part) = search_nearby(data, offset, &visited, options)
                    .warn_none(&format!("no cross-reference section near {offset}"))
                else {
                    if offset == start {
                        return Err(e);
                    }

                    continue;
                };

                part
            }
            // Only the first section is required. A broken `Prev` ends the
            // chain, which the builder reports.
            Err(e) if offset == start => return Err(e),
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };

        if let Some(stream_offset) = part.xref_stream_offset()
            && visited.insert(stream_offset)
        {
            match parse::read_part(data, stream_offset, stream_offset, options) {
                Ok(stream) => builder.add(stream.tied_to_table(offset)),
                Err(e) => warn!("failed to read XRefStm of table at {offset}: {e}"),
            }
        }

        pending.extend(part.previous());
        builder.add(part);
    }

    Ok(builder)
}

/// Find the section closest to `offset`, for files whose offsets are off by
/// a few bytes.
///
/// The returned part is recorded under `offset` so that `Prev` links keep
/// pointing to it.
fn search_nearby(
    data: &[u8],
    offset: usize,
    visited: &FxHashSet<usize>,
    options: ScannerOptions,
) -> Option<CrossReferenceTablePart> {
    let tables = memmem::find_iter(data, b"xref").filter(|p| !data[..*p].ends_with(b"start"));
    let streams = repair::object_headers(data).into_iter().map(|(_, p)| p);

    let mut candidates = tables
        .chain(streams)
        .filter(|p| !visited.contains(p))
        .collect::<Vec<_>>();
    candidates.sort_by_key(|p| p.abs_diff(offset));

    candidates.into_iter().find_map(|candidate| {
        let part = parse::read_part(data, candidate, offset, options).ok()?;
        warn!("using cross-reference section at {candidate} instead of {offset}");

        Some(part)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ObjectIdentifier;

    struct Pdf {
        data: Vec<u8>,
    }

    impl Pdf {
        fn new() -> Self {
            Self {
                data: b"%PDF-1.7\n".to_vec(),
            }
        }

        fn object(&mut self, header: &str, body: &str) -> usize {
            let offset = self.data.len();
            self.data
                .extend(format!("{header} obj\n{body}\nendobj\n").as_bytes());
            offset
        }

        fn table(&mut self, entries: &[(u32, usize)], trailer: &str) -> usize {
            let offset = self.data.len();
            self.data.extend(b"xref\n");

            for (number, position) in entries {
                self.data
                    .extend(format!("{number} 1\n{position:010} 00000 n\r\n").as_bytes());
            }

            self.data
                .extend(format!("trailer\n<< {trailer} >>\n").as_bytes());
            offset
        }

        fn finish(mut self, start: usize) -> Vec<u8> {
            self.data
                .extend(format!("startxref\n{start}\n%%EOF\n").as_bytes());
            self.data
        }
    }

    #[test]
    fn start_xref() {
        assert_eq!(find_start_xref(b"... startxref\n  1234\n%%EOF"), Some(1234));
        assert_eq!(
            find_start_xref(b"startxref 1\nstartxref\r\n99\r\n%%EOF\r\n"),
            Some(99)
        );
        assert_eq!(find_start_xref(b"startxref\n%%EOF"), None);
        assert_eq!(find_start_xref(b"no keyword"), None);
    }

    #[test]
    fn incremental_update() {
        let mut pdf = Pdf::new();
        let catalog = pdf.object("1 0", "<< /Type /Catalog >>");
        let old = pdf.object("2 0", "(old)");
        let first = pdf.table(&[(1, catalog), (2, old)], "/Size 3 /Root 1 0 R");
        let new = pdf.object("2 0", "(new)");
        let second = pdf.table(&[(2, new)], &format!("/Size 3 /Root 1 0 R /Prev {first}"));
        let data = pdf.finish(second);

        let table = read_cross_reference_table(&data, ScannerOptions::default()).unwrap();

        assert_eq!(table.get(ObjectIdentifier::new(2, 0)), Some(XrefLocation::Offset(new)));
        assert_eq!(table.get(ObjectIdentifier::new(1, 0)), Some(XrefLocation::Offset(catalog)));
        assert_eq!(table.parts().len(), 2);
    }

    #[test]
    fn missing_start_xref() {
        let data = b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n";

        assert_eq!(
            read_cross_reference_table(data, ScannerOptions::default()).unwrap_err(),
            Error::MissingStartXref
        );

        let table = read_cross_reference_table(data, ScannerOptions::lenient(true)).unwrap();
        assert_eq!(table.trailer().root, ObjectIdentifier::new(1, 0));
    }

    #[test]
    fn offset_slightly_off() {
        let mut pdf = Pdf::new();
        let catalog = pdf.object("1 0", "<< /Type /Catalog >>");
        let xref = pdf.table(&[(1, catalog)], "/Size 2 /Root 1 0 R");
        let data = pdf.finish(xref + 3);

        assert!(read_cross_reference_table(&data, ScannerOptions::default()).is_err());

        let table = read_cross_reference_table(&data, ScannerOptions::lenient(true)).unwrap();
        assert_eq!(table.get(ObjectIdentifier::new(1, 0)), Some(XrefLocation::Offset(catalog)));
        assert_eq!(table.parts(), [(xref + 3, CrossReferenceType::Table)]);
    }

    #[test]
    fn broken_prev_is_tolerated() {
        let mut pdf = Pdf::new();
        let catalog = pdf.object("1 0", "<< /Type /Catalog >>");
        let xref = pdf.table(&[(1, catalog)], "/Size 2 /Root 1 0 R /Prev 4");
        let data = pdf.finish(xref);

        let table = read_cross_reference_table(&data, ScannerOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
    }
}
