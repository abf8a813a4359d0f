//! Reading single cross-reference sections.

use crate::Reader;
use crate::error::{Error, Result};
use crate::keys::{INDEX, SIZE, TYPE, W, XREF};
use crate::object::{ObjectValue, read_indirect_object};
use crate::scanner::{CoreTokenScanner, ScannerOptions, TokenScanner};
use crate::token::{ObjectIdentifier, Token};
use crate::trivia::{is_regular_character, is_white_space_character};
use crate::xref::{CrossReferenceTablePart, CrossReferenceType, XrefLocation};
use log::{debug, warn};
use memchr::memmem;
use rustc_hash::FxHashMap;

type Entries = FxHashMap<ObjectIdentifier, XrefLocation>;

/// Read the table or stream starting at `offset`.
///
/// The part records `reached_through` as its offset, which differs from
/// `offset` when the section was found by searching near a broken pointer.
pub(crate) fn read_part(
    data: &[u8],
    offset: usize,
    reached_through: usize,
    options: ScannerOptions,
) -> Result<CrossReferenceTablePart> {
    let mut r = Reader::new_at(data, offset);
    r.forward_while(is_white_space_character);

    if r.peek_tag(b"xref") {
        read_table(data, r.offset(), reached_through, options)
    } else {
        read_stream(data, r.offset(), reached_through, options)
    }
}

/// Read an `xref` table and its `trailer` dictionary.
fn read_table(
    data: &[u8],
    offset: usize,
    reached_through: usize,
    options: ScannerOptions,
) -> Result<CrossReferenceTablePart> {
    let invalid = |offset, reason| Error::InvalidCrossReference { offset, reason };

    let mut r = Reader::new_at(data, offset);
    r.forward_tag(b"xref").ok_or(invalid(offset, "`xref` keyword"))?;

    let mut entries = Entries::default();

    'subsections: loop {
        r.forward_while(is_white_space_character);

        if !r.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
            break;
        }

        let header = r.offset();
        let start = read_digits(&mut r);
        r.forward_while(is_white_space_character);
        let count = read_digits(&mut r);

        let (Some(start), Some(count)) = (start, count) else {
            if options.lenient {
                warn!("malformed subsection header at offset {header}");
                break;
            }

            return Err(invalid(header, "subsection header `start count`"));
        };

        for number in start..start.saturating_add(count) {
            r.forward_while(is_white_space_character);
            let entry_offset = r.offset();

            let Some(entry) = read_table_entry(&mut r) else {
                if options.lenient {
                    warn!("malformed cross-reference entry at offset {entry_offset}");
                    break 'subsections;
                }

                return Err(invalid(entry_offset, "20-byte cross-reference entry"));
            };

            // Free entries are ignored.
            if let TableEntry::InUse { offset, generation } = entry
                && let Ok(number) = u32::try_from(number)
            {
                entries.insert(
                    ObjectIdentifier::new(number, generation),
                    XrefLocation::Offset(offset),
                );
            }
        }
    }

    r.forward_while(is_white_space_character);

    if r.forward_tag(b"trailer").is_none() {
        let skipped = options
            .lenient
            .then(|| memmem::find(r.tail(), b"trailer"))
            .flatten();

        let Some(skipped) = skipped else {
            return Err(invalid(r.offset(), "`trailer` keyword"));
        };

        warn!("skipping {skipped} bytes before trailer at offset {}", r.offset());
        r.skip_bytes(skipped + b"trailer".len());
    }

    let trailer_offset = r.offset();
    let mut scanner = CoreTokenScanner::new_at(data, trailer_offset, options);

    let dictionary = match scanner.move_next()? {
        true => scanner.take_current().and_then(|t| t.as_dictionary().cloned()),
        false => None,
    }
    .ok_or(invalid(trailer_offset, "trailer dictionary"))?;

    debug!("read cross-reference table at {offset} with {} entries", entries.len());

    Ok(CrossReferenceTablePart::new(
        reached_through,
        CrossReferenceType::Table,
        dictionary,
        entries,
    ))
}

enum TableEntry {
    InUse { offset: usize, generation: u16 },
    Free,
}

/// Read an `oooooooooo ggggg n` entry. The exact column widths are not
/// enforced, since some writers pad with a single space or omit the EOL.
fn read_table_entry(r: &mut Reader<'_>) -> Option<TableEntry> {
    let offset = read_digits(r)?;
    r.forward_while(|b| b == b' ');
    let generation = read_digits(r)?;
    r.forward_while(|b| b == b' ');

    let entry = match r.read_byte()? {
        b'n' => TableEntry::InUse {
            offset: usize::try_from(offset).ok()?,
            generation: u16::try_from(generation).ok()?,
        },
        b'f' => TableEntry::Free,
        _ => return None,
    };

    if r.peek_byte().is_some_and(is_regular_character) {
        return None;
    }

    Some(entry)
}

fn read_digits(r: &mut Reader<'_>) -> Option<u64> {
    let start = r.offset();
    r.forward_while_1(|b| b.is_ascii_digit())?;

    r.range(start..r.offset())?
        .iter()
        .try_fold(0_u64, |acc, b| acc.checked_mul(10)?.checked_add(u64::from(b - b'0')))
}

/// Read a `/Type /XRef` stream object.
fn read_stream(
    data: &[u8],
    offset: usize,
    reached_through: usize,
    options: ScannerOptions,
) -> Result<CrossReferenceTablePart> {
    let invalid = |reason| Error::InvalidCrossReference { offset, reason };

    let object = read_indirect_object(data, offset, options)
        .map_err(|_| invalid("`xref` keyword or cross-reference stream object"))?;

    let ObjectValue::Stream(stream) = object.value else {
        return Err(invalid("cross-reference stream"));
    };

    let decoded = stream.decoded().ok_or(invalid("decodable stream data"))?;
    let dictionary = stream.dictionary;

    if dictionary.get_name(TYPE).is_none_or(|n| n.as_str() != XREF) {
        if options.lenient {
            warn!("cross-reference stream at {offset} is not of type XRef");
        } else {
            return Err(invalid("/Type /XRef"));
        }
    }

    let widths = dictionary
        .get_array(W)
        .and_then(|w| match w {
            [a, b, c] => Some([a, b, c].map(|t| t.as_integer().and_then(|i| usize::try_from(i).ok()))),
            _ => None,
        })
        .and_then(|[a, b, c]| Some([a?, b?, c?]))
        .filter(|w| w.iter().all(|w| *w <= 8))
        .ok_or(invalid("/W array of three field widths of at most 8 bytes"))?;

    let entry_len = widths.iter().sum::<usize>();

    if entry_len == 0 {
        return Err(invalid("/W array with a non-zero total width"));
    }

    let subsections = match dictionary.get_array(INDEX) {
        Some(index) => index
            .chunks_exact(2)
            .map(|pair| Some((to_u32(&pair[0])?, to_u32(&pair[1])?)))
            .collect::<Option<Vec<_>>>()
            .ok_or(invalid("/Index pairs of object numbers"))?,
        None => {
            let size = dictionary
                .get(SIZE)
                .and_then(to_u32)
                .ok_or(invalid("/Size entry"))?;

            vec![(0, size)]
        }
    };

    let mut r = Reader::new(&decoded);
    let mut entries = Entries::default();

    for (start, count) in subsections {
        let available = r.remaining() / entry_len;
        let end = start.saturating_add(count.min(u32::try_from(available).unwrap_or(u32::MAX)));

        for number in start..end {
            let Some(entry) = read_stream_entry(&mut r, widths) else {
                break;
            };

            match entry {
                (0, _, _) => {}
                (1, position, generation) => {
                    let (Ok(position), Ok(generation)) =
                        (usize::try_from(position), u16::try_from(generation))
                    else {
                        warn!("cross-reference entry for object {number} is out of range");
                        continue;
                    };

                    entries.insert(
                        ObjectIdentifier::new(number, generation),
                        XrefLocation::Offset(position),
                    );
                }
                (2, stream, index) => {
                    let (Ok(stream), Ok(index)) = (u32::try_from(stream), u32::try_from(index))
                    else {
                        warn!("cross-reference entry for object {number} is out of range");
                        continue;
                    };

                    entries.insert(
                        ObjectIdentifier::new(number, 0),
                        XrefLocation::Compressed { stream, index },
                    );
                }
                (kind, _, _) => debug!("ignoring cross-reference entry of type {kind}"),
            }
        }

        if end < start.saturating_add(count) {
            warn!("cross-reference stream at {offset} ends before object {end}");
            break;
        }
    }

    debug!("read cross-reference stream at {offset} with {} entries", entries.len());

    Ok(CrossReferenceTablePart::new(
        reached_through,
        CrossReferenceType::Stream,
        dictionary,
        entries,
    ))
}

fn read_stream_entry(r: &mut Reader<'_>, [w1, w2, w3]: [usize; 3]) -> Option<(u64, u64, u64)> {
    // A zero-width type field means every entry is in use.
    let kind = if w1 == 0 { 1 } else { r.read_uint(w1)? };

    Some((kind, r.read_uint(w2)?, r.read_uint(w3)?))
}

fn to_u32(token: &Token) -> Option<u32> {
    u32::try_from(token.as_integer()?).ok()
}
