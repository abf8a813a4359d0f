use quire_syntax::object::{ObjectValue, read_indirect_object};
use quire_syntax::scanner::{CoreTokenScanner, ScannerOptions, TokenScanner};
use quire_syntax::token::{ObjectIdentifier, Token};
use quire_syntax::xref::{CrossReferenceType, XrefLocation, read_cross_reference_table};
use quire_tests::{PdfWriter, flate};

fn strict() -> ScannerOptions {
    ScannerOptions::default()
}

fn id(number: u32) -> ObjectIdentifier {
    ObjectIdentifier::new(number, 0)
}

fn string_value(data: &[u8], offset: usize) -> Vec<u8> {
    let object = read_indirect_object(data, offset, strict()).unwrap();

    match object.value {
        ObjectValue::Token(Token::String(s)) => s.as_bytes().to_vec(),
        other => panic!("expected a string, found {other:?}"),
    }
}

#[test]
fn incremental_update() {
    let mut writer = PdfWriter::new();
    writer.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    writer.object(2, "<< /Type /Pages /Kids [] /Count 0 >>");
    let old = writer.object(3, "(first)");
    let first = writer.finish_section("/Size 4 /Root 1 0 R");

    let new = writer.object(3, "(second)");
    writer.object(4, "<< /Producer (quire) >>");
    let second = writer.finish_section(&format!("/Root 1 0 R /Info 4 0 R /Prev {first}"));
    let data = writer.finish();

    let table = read_cross_reference_table(&data, strict()).unwrap();

    assert_eq!(
        table.parts(),
        [(first, CrossReferenceType::Table), (second, CrossReferenceType::Table)]
    );
    assert_eq!(table.get(id(3)), Some(XrefLocation::Offset(new)));
    assert_ne!(new, old);

    let trailer = table.trailer();
    assert_eq!(trailer.root, id(1));
    assert_eq!(trailer.info, Some(id(4)));
    // The newest trailer has no Size, so the older one is used.
    assert_eq!(trailer.size, Some(4));
    assert_eq!(trailer.previous_offset, Some(first));

    let Some(XrefLocation::Offset(offset)) = table.get(id(3)) else {
        panic!("object 3 is not at an offset");
    };
    assert_eq!(string_value(&data, offset), b"second");
    assert_eq!(string_value(&data, old), b"first");
}

#[test]
fn cross_reference_stream() {
    let mut writer = PdfWriter::new();
    let catalog = writer.object(1, "<< /Type /Catalog >>");
    let members = b"4 0 << /Producer (quire) >>";
    let object_stream = writer.stream(
        3,
        "/Type /ObjStm /N 1 /First 4 /Filter /FlateDecode",
        &flate(members),
    );

    let mut rows = Vec::new();
    for (kind, field2, field3) in [
        (0_u8, 0_u16, 255_u8),
        (1, catalog as u16, 0),
        (0, 0, 0),
        (1, object_stream as u16, 0),
        (2, 3, 0),
    ] {
        rows.push(kind);
        rows.extend(field2.to_be_bytes());
        rows.push(field3);
    }

    let xref = writer.stream(
        5,
        "/Type /XRef /Size 5 /W [1 2 1] /Root 1 0 R /Filter /FlateDecode",
        &flate(&rows),
    );
    writer.raw(format!("startxref\n{xref}\n%%EOF\n").as_bytes());
    let data = writer.finish();

    let table = read_cross_reference_table(&data, strict()).unwrap();

    assert_eq!(table.parts(), [(xref, CrossReferenceType::Stream)]);
    assert_eq!(table.get(id(1)), Some(XrefLocation::Offset(catalog)));
    assert_eq!(table.get(id(2)), None);
    assert_eq!(
        table.get(id(4)),
        Some(XrefLocation::Compressed {
            stream: 3,
            index: 0
        })
    );
    assert_eq!(table.trailer().size, Some(5));

    let object = read_indirect_object(&data, object_stream, strict()).unwrap();
    let ObjectValue::Stream(stream) = object.value else {
        panic!("object 3 is not a stream");
    };
    let decoded = stream.decoded().unwrap();
    assert_eq!(decoded, members);

    let first = stream.dictionary.get_usize("First").unwrap();
    let mut scanner = CoreTokenScanner::new_at(&decoded, first, strict());
    assert!(scanner.move_next().unwrap());
    let producer = scanner
        .current_token()
        .and_then(Token::as_dictionary)
        .and_then(|d| d.get_string("Producer"))
        .map(|s| s.text());
    assert_eq!(producer.as_deref(), Some("quire"));
}

#[test]
fn repair_broken_startxref() {
    let mut writer = PdfWriter::new();
    let catalog = writer.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    let pages = writer.object(2, "<< /Type /Pages /Kids [] /Count 0 >>");
    writer.raw(b"trailer\n<< /Size 3 /Root 1 0 R >>\nstartxref\n99999\n%%EOF\n");
    let data = writer.finish();

    assert!(read_cross_reference_table(&data, strict()).is_err());

    let table = read_cross_reference_table(&data, ScannerOptions::lenient(true)).unwrap();
    assert_eq!(table.get(id(1)), Some(XrefLocation::Offset(catalog)));
    assert_eq!(table.get(id(2)), Some(XrefLocation::Offset(pages)));
    assert_eq!(table.trailer().root, id(1));
    assert_eq!(table.trailer().size, Some(3));
}

#[test]
fn repair_without_trailer() {
    let mut writer = PdfWriter::new();
    writer.object(7, "<< /Type /Catalog >>");
    let data = writer.finish();

    let table = read_cross_reference_table(&data, ScannerOptions::lenient(true)).unwrap();
    assert_eq!(table.trailer().root, id(7));
}

#[test]
fn content_stream_with_inline_image() {
    let content = b"q 10 0 0 10 0 0 cm\nBI /W 2 /H 1 /BPC 8 /CS /G /F /AHx ID ffEI\x80\x81\x82 00\nEI\nQ";

    let mut writer = PdfWriter::new();
    let offset = writer.stream(1, "/Filter /FlateDecode", &flate(content));
    let data = writer.finish();

    let object = read_indirect_object(&data, offset, strict()).unwrap();
    let ObjectValue::Stream(stream) = object.value else {
        panic!("object 1 is not a stream");
    };
    let decoded = stream.decoded().unwrap();

    let mut scanner = CoreTokenScanner::new(&decoded, strict());
    let mut tokens = Vec::new();
    while scanner.move_next().unwrap() {
        tokens.extend(scanner.take_current());
    }

    let image = tokens
        .iter()
        .find_map(|t| match t {
            Token::InlineImageData(data) => Some(data.as_slice()),
            _ => None,
        })
        .unwrap();

    // The first `EI` is followed by binary data and belongs to the image.
    assert_eq!(image, b"ffEI\x80\x81\x82 00\n");
    assert!(tokens[tokens.len() - 2].is_operator("EI"));
    assert!(tokens[tokens.len() - 1].is_operator("Q"));
}
