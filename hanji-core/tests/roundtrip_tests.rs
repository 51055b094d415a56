//! Codec round-trip tests
//!
//! The central property: for any valid document, `decode(encode(d))` is
//! structurally equal to `d`, including catalogs, resources, opaque parts and
//! unknown attributes preserved from foreign producers.

use hanji_core::codec::{decode, encode};
use hanji_core::edit::{self, ParaRef};
use hanji_core::{
    CharStyle, CharStyleId, CorruptPackage, Document, HanjiError, OpaquePart, ParaItem, ParaStyle,
    ParaStyleId, Paragraph, Run, Section,
};
use proptest::prelude::*;

fn rich_document() -> Document {
    let mut doc = Document::new("Round trip", "ko");
    doc.metadata.creator = Some("tester".to_string());
    doc.metadata.created = Some("2026-01-15T09:30:00+09:00".to_string());

    let bold = doc.styles.register_char_style(CharStyle {
        bold: true,
        ..CharStyle::default()
    });
    let heading = doc.styles.register_para_style(ParaStyle::named("Heading 1"));

    doc.sections[0].paragraphs[0] = Paragraph::with_items(
        heading,
        vec![
            ParaItem::Run(Run::new("제목 ", CharStyleId(0))),
            ParaItem::Run(Run::new("강조", bold)),
        ],
    );
    edit::append_paragraph(&mut doc, 0, "본문 첫 줄\n본문 둘째 줄").unwrap();
    edit::insert_table(
        &mut doc,
        ParaRef::new(0, 1),
        2,
        3,
        Some(&[vec!["a".to_string(), "b".to_string(), "c".to_string()]]),
        Some(vec![14000, 14000, 14520]),
    )
    .unwrap();
    edit::insert_image(
        &mut doc,
        ParaRef::new(0, 2),
        vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3],
        4000,
        3000,
    )
    .unwrap();
    edit::set_page_break(&mut doc, ParaRef::new(0, 1), true).unwrap();
    doc
}

#[test]
fn test_rich_document_round_trips() {
    let doc = rich_document();
    let bytes = encode(&doc).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(doc, decoded);
}

#[test]
fn test_round_trip_is_idempotent() {
    let doc = rich_document();
    let once = encode(&doc).unwrap();
    let twice = encode(&decode(&once).unwrap()).unwrap();
    assert_eq!(decode(&once).unwrap(), decode(&twice).unwrap());
}

#[test]
fn test_opaque_parts_survive() {
    let mut doc = Document::new("Opaque", "ko");
    doc.opaque_parts.push(OpaquePart {
        name: "version.xml".to_string(),
        data: b"<?xml version=\"1.0\"?><hv:version/>".to_vec(),
    });
    doc.opaque_parts.push(OpaquePart {
        name: "Preview/PrvText.txt".to_string(),
        data: "preview text".as_bytes().to_vec(),
    });

    let decoded = decode(&encode(&doc).unwrap()).unwrap();
    assert_eq!(decoded.opaque_parts.len(), 2);
    assert_eq!(doc, decoded);
}

#[test]
fn test_unknown_attributes_survive() {
    let mut doc = Document::new("Extra attrs", "ko");
    doc.sections[0].paragraphs[0]
        .extra
        .push(("vendorHint".to_string(), "42".to_string()));
    doc.sections[0]
        .extra
        .push(("producer".to_string(), "other-tool".to_string()));
    doc.sections[0]
        .geometry
        .extra
        .push(("gridMode".to_string(), "WONGJI".to_string()));
    doc.metadata
        .extra
        .push(("lastsaveby".to_string(), "someone".to_string()));

    let decoded = decode(&encode(&doc).unwrap()).unwrap();
    assert_eq!(doc, decoded);
}

#[test]
fn test_resources_round_trip_by_content() {
    let mut doc = Document::new("Images", "ko");
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 9, 9, 9];
    edit::insert_image(&mut doc, ParaRef::new(0, 0), jpeg.clone(), 100, 100).unwrap();

    let decoded = decode(&encode(&doc).unwrap()).unwrap();
    let (id, resource) = decoded.resources.iter().next().unwrap();
    assert_eq!(id, "bin1");
    assert_eq!(resource.media_type, "image/jpeg");
    assert_eq!(resource.data, jpeg);
}

#[test]
fn test_break_flags_round_trip() {
    let mut doc = Document::new("Breaks", "ko");
    edit::append_paragraph(&mut doc, 0, "second").unwrap();
    edit::set_page_break(&mut doc, ParaRef::new(0, 1), true).unwrap();
    edit::set_column_break(&mut doc, ParaRef::new(0, 0), true).unwrap();

    let decoded = decode(&encode(&doc).unwrap()).unwrap();
    assert!(decoded.sections[0].paragraphs[0].column_break);
    assert!(decoded.sections[0].paragraphs[1].page_break);
}

#[test]
fn test_multi_section_round_trip() {
    let mut doc = Document::new("Sections", "ko");
    let mut second = Section::new(Default::default(), ParaStyleId(0), CharStyleId(0));
    second.geometry.landscape = true;
    second.geometry.columns = 2;
    doc.sections.push(second);
    edit::set_paragraph_text(&mut doc, ParaRef::new(1, 0), "landscape page").unwrap();

    let decoded = decode(&encode(&doc).unwrap()).unwrap();
    assert_eq!(decoded.sections.len(), 2);
    assert!(decoded.sections[1].geometry.landscape);
    assert_eq!(decoded.sections[1].geometry.columns, 2);
    assert_eq!(doc, decoded);
}

#[test]
fn test_decode_rejects_dangling_style_reference() {
    let mut doc = Document::new("Dangles", "ko");
    doc.sections[0].paragraphs[0] = Paragraph::with_items(
        ParaStyleId(0),
        vec![ParaItem::Run(Run::new("x", CharStyleId(9)))],
    );
    // Encoding a document with a dangling reference is a contract violation
    let err = encode(&doc).unwrap_err();
    assert!(matches!(err, HanjiError::Invariant(_)));

    // A package carrying one is corrupt from the decoder's point of view;
    // build it by hand from a valid package's parts
    let mut valid = Document::new("Dangles", "ko");
    valid.sections[0].paragraphs[0] = Paragraph::from_text("x", ParaStyleId(0), CharStyleId(0));
    let bytes = encode(&valid).unwrap();
    let tampered = retag_run_style(&bytes, "charPrIDRef=\"0\"", "charPrIDRef=\"9\"");
    let err = decode(&tampered).unwrap_err();
    assert!(matches!(
        err,
        HanjiError::Package(CorruptPackage::DanglingReference(_))
    ));
}

/// Rewrite one section part inside a package (test helper)
fn retag_run_style(bytes: &[u8], from: &str, to: &str) -> Vec<u8> {
    use std::io::{Cursor, Read, Write};
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut out = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        if name.starts_with("Contents/section") {
            let text = String::from_utf8(data).unwrap().replace(from, to);
            data = text.into_bytes();
        }
        out.start_file(name, zip::write::FileOptions::default())
            .unwrap();
        out.write_all(&data).unwrap();
    }
    out.finish().unwrap().into_inner()
}

proptest! {
    #[test]
    fn prop_paragraph_texts_round_trip(
        texts in proptest::collection::vec("[a-zA-Z0-9 가-힣.,]{0,40}", 1..8)
    ) {
        let mut doc = Document::new("Property", "ko");
        doc.sections[0].paragraphs[0] =
            Paragraph::from_text(texts[0].clone(), ParaStyleId(0), CharStyleId(0));
        for text in &texts[1..] {
            edit::append_paragraph(&mut doc, 0, text).unwrap();
        }

        let decoded = decode(&encode(&doc).unwrap()).unwrap();
        prop_assert_eq!(doc, decoded);
    }
}
