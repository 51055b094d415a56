//! Exclusive-access document handles
//!
//! A handle owns one document plus its lazily rebuilt text index behind an
//! exclusive guard. Every public operation acquires the guard for its whole
//! duration and releases it on all exit paths, so the single-writer
//! discipline holds regardless of how adapters schedule calls. Structural
//! edits invalidate the index; the next query rebuilds it.

use crate::edit::{self, ParaRef, ReplaceCount, ReplaceMode, Scope};
use crate::error::Result;
use crate::index::TextIndex;
use crate::model::{CharStyleId, Document, ParaStyleId};
use crate::query::{self, ImageInfo, Match, PageBreak, ParagraphInfo, TableInfo};
use crate::{codec, construct};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

struct State {
    doc: Document,
    index: Option<TextIndex>,
}

/// Shared handle to one open document
#[derive(Clone)]
pub struct DocumentHandle {
    inner: Arc<Mutex<State>>,
}

impl DocumentHandle {
    pub fn new(doc: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State { doc, index: None })),
        }
    }

    /// Open a handle over decoded package bytes
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(codec::decode(bytes)?))
    }

    /// Open a handle over a document built from recognized blocks
    pub fn from_blocks(
        blocks: Vec<construct::RecognizedBlock>,
        pages: &[construct::PageDims],
        options: &construct::BuildOptions,
    ) -> Result<Self> {
        Ok(Self::new(construct::build_from_blocks(blocks, pages, options)?))
    }

    /// Instance id of the underlying document
    pub fn id(&self) -> Uuid {
        self.inner.lock().doc.id
    }

    /// Run a read-only closure against the document
    pub fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&self.inner.lock().doc)
    }

    /// Run a read-only closure against the document and its text index,
    /// rebuilding the index first if a structural edit invalidated it
    pub fn query<T>(&self, f: impl FnOnce(&Document, &TextIndex) -> T) -> T {
        let mut state = self.inner.lock();
        if state.index.is_none() {
            let index = TextIndex::build(&state.doc);
            state.index = Some(index);
        }
        let State { doc, index } = &*state;
        f(doc, index.as_ref().expect("index built above"))
    }

    /// Run a mutating closure; the index is invalidated unconditionally
    pub fn edit<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut state = self.inner.lock();
        state.index = None;
        f(&mut state.doc)
    }

    /// Serialize the current document into package bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(&self.inner.lock().doc)
    }

    // -- query surface ------------------------------------------------------

    pub fn find_literal(&self, needle: &str, case_sensitive: bool) -> Vec<Match> {
        self.query(|doc, index| query::find_literal(doc, index, needle, case_sensitive).collect())
    }

    pub fn find_pattern(&self, pattern: &str) -> Result<Vec<Match>> {
        self.query(|doc, index| {
            Ok(query::find_pattern(doc, index, pattern)?.collect())
        })
    }

    pub fn paragraph_text(&self, at: ParaRef) -> Result<String> {
        self.read(|doc| Ok(query::paragraph_text(doc, at.section, at.paragraph)?))
    }

    pub fn paragraphs(&self, section: usize) -> Result<Vec<ParagraphInfo>> {
        self.read(|doc| Ok(query::paragraphs(doc, section)?))
    }

    pub fn paragraph_range(
        &self,
        section: usize,
        start: usize,
        end: usize,
    ) -> Result<Vec<ParagraphInfo>> {
        self.read(|doc| Ok(query::paragraph_range(doc, section, start, end)?))
    }

    pub fn all_text(&self) -> String {
        self.read(query::all_text)
    }

    pub fn tables(&self) -> Vec<TableInfo> {
        self.read(query::tables)
    }

    pub fn images(&self) -> Vec<ImageInfo> {
        self.read(query::images)
    }

    pub fn page_breaks(&self) -> Vec<PageBreak> {
        self.read(query::page_breaks)
    }

    // -- edit surface -------------------------------------------------------

    pub fn replace_text(
        &self,
        scope: Scope,
        target: &str,
        replacement: &str,
        mode: ReplaceMode,
        count: ReplaceCount,
    ) -> Result<usize> {
        self.edit(|doc| edit::replace_text(doc, scope, target, replacement, mode, count))
    }

    pub fn set_paragraph_text(&self, at: ParaRef, text: &str) -> Result<()> {
        self.edit(|doc| edit::set_paragraph_text(doc, at, text))
    }

    pub fn insert_paragraph(&self, after: ParaRef, text: &str) -> Result<ParaRef> {
        self.edit(|doc| edit::insert_paragraph(doc, after, text))
    }

    pub fn append_paragraph(&self, section: usize, text: &str) -> Result<ParaRef> {
        self.edit(|doc| edit::append_paragraph(doc, section, text))
    }

    pub fn delete_paragraph(&self, at: ParaRef) -> Result<()> {
        self.edit(|doc| edit::delete_paragraph(doc, at))
    }

    pub fn copy_paragraph(&self, from: ParaRef, after: ParaRef) -> Result<ParaRef> {
        self.edit(|doc| edit::copy_paragraph(doc, from, after))
    }

    pub fn move_paragraph(&self, from: ParaRef, after: ParaRef) -> Result<ParaRef> {
        self.edit(|doc| edit::move_paragraph(doc, from, after))
    }

    pub fn set_paragraph_style(&self, at: ParaRef, style: ParaStyleId) -> Result<()> {
        self.edit(|doc| edit::set_paragraph_style(doc, at, style))
    }

    pub fn set_char_style(
        &self,
        at: ParaRef,
        span: Option<(usize, usize)>,
        style: CharStyleId,
    ) -> Result<()> {
        self.edit(|doc| edit::set_char_style(doc, at, span, style))
    }

    pub fn set_page_break(&self, at: ParaRef, enabled: bool) -> Result<()> {
        self.edit(|doc| edit::set_page_break(doc, at, enabled))
    }

    pub fn set_column_break(&self, at: ParaRef, enabled: bool) -> Result<()> {
        self.edit(|doc| edit::set_column_break(doc, at, enabled))
    }

    pub fn insert_table(
        &self,
        after: ParaRef,
        rows: u32,
        cols: u32,
        data: Option<&[Vec<String>]>,
        col_widths: Option<Vec<u32>>,
    ) -> Result<ParaRef> {
        self.edit(|doc| edit::insert_table(doc, after, rows, cols, data, col_widths))
    }

    pub fn insert_image(
        &self,
        after: ParaRef,
        bytes: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<ParaRef> {
        self.edit(|doc| edit::insert_image(doc, after, bytes, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_invalidates_index() {
        let handle = DocumentHandle::new(Document::new("Untitled", "ko"));
        handle
            .set_paragraph_text(ParaRef::new(0, 0), "before")
            .unwrap();
        assert_eq!(handle.find_literal("before", true).len(), 1);

        handle
            .set_paragraph_text(ParaRef::new(0, 0), "after")
            .unwrap();
        assert!(handle.find_literal("before", true).is_empty());
        assert_eq!(handle.find_literal("after", true).len(), 1);
    }

    #[test]
    fn test_handles_share_one_document() {
        let handle = DocumentHandle::new(Document::new("Untitled", "ko"));
        let other = handle.clone();
        other
            .set_paragraph_text(ParaRef::new(0, 0), "shared")
            .unwrap();
        assert_eq!(handle.paragraph_text(ParaRef::new(0, 0)).unwrap(), "shared");
    }

    #[test]
    fn test_failed_edit_leaves_document_readable() {
        let handle = DocumentHandle::new(Document::new("Untitled", "ko"));
        assert!(handle.delete_paragraph(ParaRef::new(0, 0)).is_err());
        assert_eq!(handle.paragraphs(0).unwrap().len(), 1);
    }
}
