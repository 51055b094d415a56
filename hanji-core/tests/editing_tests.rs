//! Invariant preservation across edit sequences
//!
//! The edit engine contract: starting from a valid document, the document
//! still satisfies every structural invariant after each operation, and a
//! failed operation leaves it byte-for-byte unchanged.

use hanji_core::codec::{decode, encode};
use hanji_core::edit::{
    self, ParaRef, ReplaceCount, ReplaceMode, Scope,
};
use hanji_core::index::TextIndex;
use hanji_core::query;
use hanji_core::{CharStyleId, Document, ParaStyleId};

fn seeded() -> Document {
    let mut doc = Document::new("Editing", "ko");
    edit::set_paragraph_text(&mut doc, ParaRef::new(0, 0), "alpha").unwrap();
    edit::append_paragraph(&mut doc, 0, "beta").unwrap();
    edit::append_paragraph(&mut doc, 0, "gamma").unwrap();
    doc
}

#[test]
fn test_every_edit_leaves_document_valid() {
    let mut doc = seeded();

    edit::insert_paragraph(&mut doc, ParaRef::new(0, 1), "delta").unwrap();
    doc.validate().unwrap();

    edit::insert_table(&mut doc, ParaRef::new(0, 0), 2, 2, None, None).unwrap();
    doc.validate().unwrap();

    edit::insert_image(
        &mut doc,
        ParaRef::new(0, 4),
        vec![0x89, b'P', b'N', b'G', 7],
        2000,
        2000,
    )
    .unwrap();
    doc.validate().unwrap();

    edit::move_paragraph(&mut doc, ParaRef::new(0, 2), ParaRef::new(0, 0)).unwrap();
    doc.validate().unwrap();

    edit::copy_paragraph(&mut doc, ParaRef::new(0, 0), ParaRef::new(0, 5)).unwrap();
    doc.validate().unwrap();

    edit::replace_text(
        &mut doc,
        Scope::Document,
        "a",
        "@",
        ReplaceMode::Literal,
        ReplaceCount::All,
    )
    .unwrap();
    doc.validate().unwrap();

    edit::delete_paragraph(&mut doc, ParaRef::new(0, 3)).unwrap();
    doc.validate().unwrap();

    // The surviving document still round-trips
    let decoded = decode(&encode(&doc).unwrap()).unwrap();
    assert_eq!(doc, decoded);
}

#[test]
fn test_search_after_edits_sees_fresh_state() {
    let mut doc = seeded();
    edit::replace_text(
        &mut doc,
        Scope::Document,
        "beta",
        "replaced term",
        ReplaceMode::Literal,
        ReplaceCount::All,
    )
    .unwrap();

    let index = TextIndex::build(&doc);
    let hits: Vec<_> = query::find_literal(&doc, &index, "replaced term", true).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].location.paragraph, 1);
    assert!(query::find_literal(&doc, &index, "beta", true).next().is_none());
}

#[test]
fn test_replace_scopes() {
    let mut doc = seeded();
    edit::append_paragraph(&mut doc, 0, "alpha again").unwrap();

    let in_paragraph = edit::replace_text(
        &mut doc,
        Scope::Paragraph {
            section: 0,
            paragraph: 3,
        },
        "alpha",
        "omega",
        ReplaceMode::Literal,
        ReplaceCount::All,
    )
    .unwrap();
    assert_eq!(in_paragraph, 1);
    assert_eq!(doc.sections[0].paragraphs[0].text(), "alpha");
    assert_eq!(doc.sections[0].paragraphs[3].text(), "omega again");
}

#[test]
fn test_replace_returns_zero_on_no_match() {
    let mut doc = seeded();
    let n = edit::replace_text(
        &mut doc,
        Scope::Document,
        "no such text",
        "x",
        ReplaceMode::Literal,
        ReplaceCount::All,
    )
    .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn test_failed_operations_are_all_or_nothing() {
    let doc = seeded();

    let mut probe = doc.clone();
    assert!(edit::delete_paragraph(&mut probe, ParaRef::new(0, 99)).is_err());
    assert_eq!(probe, doc);

    assert!(edit::set_paragraph_style(&mut probe, ParaRef::new(0, 0), ParaStyleId(55)).is_err());
    assert_eq!(probe, doc);

    assert!(edit::set_char_style(&mut probe, ParaRef::new(0, 0), Some((2, 99)), CharStyleId(0))
        .is_err());
    assert_eq!(probe, doc);

    assert!(edit::insert_table(&mut probe, ParaRef::new(0, 0), 0, 3, None, None).is_err());
    assert_eq!(probe, doc);
}

#[test]
fn test_section_never_left_empty() {
    let mut doc = seeded();
    edit::delete_paragraph(&mut doc, ParaRef::new(0, 2)).unwrap();
    edit::delete_paragraph(&mut doc, ParaRef::new(0, 1)).unwrap();
    let err = edit::delete_paragraph(&mut doc, ParaRef::new(0, 0)).unwrap_err();
    assert!(matches!(
        err,
        hanji_core::HanjiError::Invariant(hanji_core::InvariantViolation::WouldEmptySection(0))
    ));
    assert_eq!(doc.sections[0].paragraphs.len(), 1);
    doc.validate().unwrap();
}

#[test]
fn test_cross_section_move_renumbers() {
    let mut doc = seeded();
    doc.sections.push(hanji_core::Section::new(
        Default::default(),
        ParaStyleId(0),
        CharStyleId(0),
    ));

    let landed = edit::move_paragraph(&mut doc, ParaRef::new(0, 2), ParaRef::new(1, 0)).unwrap();
    assert_eq!(landed, ParaRef::new(1, 1));
    assert_eq!(doc.sections[0].paragraphs.len(), 2);
    assert_eq!(
        query::paragraph_text(&doc, 1, 1).unwrap(),
        "gamma"
    );
    doc.validate().unwrap();
}
