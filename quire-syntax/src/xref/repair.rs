//! Rebuilding a cross-reference table by scanning the whole file.

use crate::error::Result;
use crate::keys::{CATALOG, FIRST, N, OBJ_STM, PREV, ROOT, TYPE, XREF, XREF_STM};
use crate::object::{IndirectObject, ObjectValue, read_indirect_object};
use crate::scanner::{CoreTokenScanner, ScannerOptions, TokenScanner};
use crate::token::{Dictionary, ObjectIdentifier, Token};
use crate::trivia::{is_regular_character, is_white_space_character};
use crate::xref::{
    CrossReferenceTable, CrossReferenceTableBuilder, CrossReferenceTablePart, CrossReferenceType,
    XrefLocation,
};
use log::{debug, warn};
use memchr::memmem;
use rustc_hash::FxHashMap;

/// The offsets of all `n g obj` headers in `data`, in file order.
pub(crate) fn object_headers(data: &[u8]) -> Vec<(ObjectIdentifier, usize)> {
    memmem::find_iter(data, b"obj")
        .filter(|end| !data.get(end + 3).copied().is_some_and(is_regular_character))
        .filter_map(|end| header_before(data, end))
        .collect()
}

/// Walk back from an `obj` keyword over `generation` and `number`.
fn header_before(data: &[u8], keyword: usize) -> Option<(ObjectIdentifier, usize)> {
    let mut pos = keyword;

    back_over(data, &mut pos, is_white_space_character)?;
    let generation = parse_u64(back_over(data, &mut pos, |b| b.is_ascii_digit())?)?;
    back_over(data, &mut pos, is_white_space_character)?;
    let number = parse_u64(back_over(data, &mut pos, |b| b.is_ascii_digit())?)?;

    if pos > 0 && is_regular_character(data[pos - 1]) {
        return None;
    }

    let id = ObjectIdentifier::new(u32::try_from(number).ok()?, u16::try_from(generation).ok()?);

    Some((id, pos))
}

/// Move `pos` back over bytes matching `pred`, returning them if there was
/// at least one.
fn back_over<'a>(data: &'a [u8], pos: &mut usize, pred: fn(u8) -> bool) -> Option<&'a [u8]> {
    let end = *pos;

    while *pos > 0 && pred(data[*pos - 1]) {
        *pos -= 1;
    }

    (*pos < end).then(|| &data[*pos..end])
}

fn parse_u64(digits: &[u8]) -> Option<u64> {
    digits
        .iter()
        .try_fold(0_u64, |acc, b| acc.checked_mul(10)?.checked_add(u64::from(b - b'0')))
}

/// Build a cross-reference table from the objects that can be found in the
/// file, ignoring any `xref` sections.
pub(crate) fn repair(data: &[u8], options: ScannerOptions) -> Result<CrossReferenceTable> {
    warn!("rebuilding cross-reference table by scanning the file");

    let options = ScannerOptions {
        lenient: true,
        ..options
    };

    let mut entries = FxHashMap::default();
    let mut catalog = None;
    let mut stream_trailer = None;

    for (id, offset) in object_headers(data) {
        let Ok(object) = read_indirect_object(data, offset, options) else {
            debug!("skipping unreadable object {id} at {offset}");
            continue;
        };

        // Later definitions belong to later revisions.
        entries.insert(id, XrefLocation::Offset(offset));

        let Some(dictionary) = object.value.dictionary() else {
            continue;
        };

        match dictionary.get_name(TYPE).map(|n| n.as_str()) {
            Some(CATALOG) => catalog = Some(id),
            Some(XREF) if dictionary.contains_key(ROOT) => {
                stream_trailer = Some(dictionary.clone());
            }
            Some(OBJ_STM) => add_compressed_entries(&object, options, &mut entries),
            _ => {}
        }
    }

    let mut dictionary = last_trailer(data, options)
        .or(stream_trailer)
        .unwrap_or_default();

    // The rebuilt part already covers every revision.
    dictionary.remove(PREV);
    dictionary.remove(XREF_STM);

    debug!("repair found {} objects", entries.len());

    let mut builder = CrossReferenceTableBuilder::new();
    builder.add(CrossReferenceTablePart::new(
        0,
        CrossReferenceType::Table,
        dictionary,
        entries,
    ));

    if let Some(catalog) = catalog {
        builder.set_root_fallback(catalog);
    }

    builder.build(0)
}

/// Record the objects of an object stream, unless they are also stored
/// uncompressed.
fn add_compressed_entries(
    object: &IndirectObject,
    options: ScannerOptions,
    entries: &mut FxHashMap<ObjectIdentifier, XrefLocation>,
) {
    let ObjectValue::Stream(stream) = &object.value else {
        return;
    };

    let Some(count) = stream.dictionary.get_usize(N) else {
        return;
    };

    if stream.dictionary.get_usize(FIRST).is_none() {
        return;
    }

    let Some(decoded) = stream.decoded() else {
        warn!("could not decode object stream {}", object.id);
        return;
    };

    let mut scanner = CoreTokenScanner::new(&decoded, options);

    for index in 0..count {
        let Ok(Some(number)) = scanner.try_read_token::<i64>() else {
            break;
        };

        // Skip the offset of the object.
        let Ok(Some(_)) = scanner.try_read_token::<i64>() else {
            break;
        };

        let (Ok(number), Ok(index)) = (u32::try_from(number), u32::try_from(index)) else {
            continue;
        };

        entries
            .entry(ObjectIdentifier::new(number, 0))
            .or_insert(XrefLocation::Compressed {
                stream: object.id.number,
                index,
            });
    }
}

/// The dictionary after the last `trailer` keyword that has a `Root`.
fn last_trailer(data: &[u8], options: ScannerOptions) -> Option<Dictionary> {
    memmem::rfind_iter(data, b"trailer").find_map(|pos| {
        let mut scanner = CoreTokenScanner::new_at(data, pos + b"trailer".len(), options);

        match scanner.move_next() {
            Ok(true) => match scanner.take_current() {
                Some(Token::Dictionary(d)) if d.contains_key(ROOT) => Some(d),
                _ => None,
            },
            _ => None,
        }
    })
}
