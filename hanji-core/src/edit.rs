//! Mutation operations over the IR
//!
//! Every operation validates its coordinates against current bounds before
//! touching anything (`NotFound` on failure, document untouched), then
//! re-validates the touched sections' invariants before returning; if a
//! violation is detected the pre-call snapshot of those sections is restored
//! and `InvariantViolation` is reported. Operations are all-or-nothing.

use crate::error::{HanjiError, InvariantViolation, NotFound, PatternError, Result};
use crate::index::{ParaLocation, TextIndex};
use crate::model::{
    CharStyleId, Document, Image, ParaItem, ParaStyleId, Paragraph, Run, Section, Table,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Coordinate of a top-level paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParaRef {
    pub section: usize,
    pub paragraph: usize,
}

impl ParaRef {
    pub fn new(section: usize, paragraph: usize) -> Self {
        Self { section, paragraph }
    }
}

/// How the replace target is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceMode {
    Literal,
    Regex,
}

/// How many matches to rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceCount {
    First,
    All,
}

/// Where a replace operation applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    Document,
    Section { section: usize },
    Paragraph { section: usize, paragraph: usize },
}

/// Rewrite matched spans with `replacement`, returning the rewrite count
///
/// Matching runs over the flattened text, so a match may cross run
/// boundaries; the replacement inherits the style of the run containing the
/// match start and split remainders keep their original styles. Paragraphs
/// nested in table cells participate like any other paragraph.
pub fn replace_text(
    doc: &mut Document,
    scope: Scope,
    target: &str,
    replacement: &str,
    mode: ReplaceMode,
    count: ReplaceCount,
) -> Result<usize> {
    check_scope(doc, scope)?;
    let regex = match mode {
        ReplaceMode::Literal => RegexBuilder::new(&regex::escape(target))
            .build()
            .expect("escaped literal is always a valid pattern"),
        ReplaceMode::Regex => Regex::new(target).map_err(PatternError)?,
    };

    // Collect paragraph-local spans up front; the index dies before mutation.
    let index = TextIndex::build(doc);
    let text = index.text();
    let mut hits: Vec<(ParaLocation, usize, usize)> = Vec::new();
    let mut at = 0;
    while at <= text.len() {
        let Some(m) = regex.find_at(text, at) else {
            break;
        };
        at = if m.end() > m.start() {
            m.end()
        } else {
            // Zero-length match: step one whole character forward
            let mut next = m.start() + 1;
            while next < text.len() && !text.is_char_boundary(next) {
                next += 1;
            }
            next
        };
        if !index.span_within_unit(m.start(), m.end()) {
            continue;
        }
        let resolved = index.resolve(m.start()).expect("in-unit offset resolves");
        if !scope_contains(scope, &resolved.location) {
            continue;
        }
        let (unit_start, _) = index.unit_bounds(m.start()).expect("in-unit offset resolves");
        hits.push((resolved.location, m.start() - unit_start, m.end() - unit_start));
        if count == ReplaceCount::First {
            break;
        }
    }
    drop(index);

    if hits.is_empty() {
        return Ok(0);
    }

    let mut touched: Vec<usize> = hits.iter().map(|(loc, _, _)| loc.section).collect();
    touched.sort_unstable();
    touched.dedup();

    let replaced = hits.len();
    let replacement = replacement.to_string();
    with_rollback(doc, &touched, move |doc| {
        // Apply back to front so earlier spans keep their offsets
        for (location, start, end) in hits.into_iter().rev() {
            let fallback = doc.styles.default_char_id();
            let paragraph = paragraph_at_mut(doc, &location)
                .expect("located paragraph exists until this edit completes");
            let style = run_style_at(paragraph, start).unwrap_or(fallback);
            splice_text(paragraph, start, end, &replacement);
            paragraph.normalize_runs(style);
        }
        Ok(replaced)
    })
}

/// Replace all content items with a single run of `text`
///
/// The run carries the paragraph's prevailing (first) character style; any
/// finer-grained run segmentation inside the paragraph is deliberately
/// discarded in exchange for simple "set" semantics.
pub fn set_paragraph_text(doc: &mut Document, at: ParaRef, text: &str) -> Result<()> {
    check_paragraph(doc, at)?;
    let fallback = doc.styles.default_char_id();
    let paragraph = &mut doc.sections[at.section].paragraphs[at.paragraph];
    let style = paragraph.first_char_style().unwrap_or(fallback);
    paragraph.items = vec![ParaItem::Run(Run::new(text, style))];
    Ok(())
}

/// Insert a new text paragraph after `after`, returning its coordinate
///
/// The new paragraph inherits the reference paragraph's styles.
pub fn insert_paragraph(doc: &mut Document, after: ParaRef, text: &str) -> Result<ParaRef> {
    check_paragraph(doc, after)?;
    let fallback = doc.styles.default_char_id();
    let reference = &doc.sections[after.section].paragraphs[after.paragraph];
    let paragraph = Paragraph::from_text(
        text,
        reference.style,
        reference.first_char_style().unwrap_or(fallback),
    );
    let at = ParaRef::new(after.section, after.paragraph + 1);
    with_rollback(doc, &[after.section], move |doc| {
        doc.sections[at.section].paragraphs.insert(at.paragraph, paragraph);
        Ok(at)
    })
}

/// Append a new text paragraph at the end of a section
pub fn append_paragraph(doc: &mut Document, section: usize, text: &str) -> Result<ParaRef> {
    let last = doc
        .section(section)
        .ok_or(NotFound::Section(section))?
        .paragraphs
        .len()
        .checked_sub(1)
        .ok_or(InvariantViolation::EmptySection(section))?;
    insert_paragraph(doc, ParaRef::new(section, last), text)
}

/// Delete a paragraph; deleting a section's only paragraph is rejected
pub fn delete_paragraph(doc: &mut Document, at: ParaRef) -> Result<()> {
    check_paragraph(doc, at)?;
    if doc.sections[at.section].paragraphs.len() == 1 {
        return Err(InvariantViolation::WouldEmptySection(at.section).into());
    }
    with_rollback(doc, &[at.section], move |doc| {
        doc.sections[at.section].paragraphs.remove(at.paragraph);
        Ok(())
    })
}

/// Copy a paragraph after `after`; cross-section copies are permitted
pub fn copy_paragraph(doc: &mut Document, from: ParaRef, after: ParaRef) -> Result<ParaRef> {
    check_paragraph(doc, from)?;
    check_paragraph(doc, after)?;
    let copied = doc.sections[from.section].paragraphs[from.paragraph].clone();
    let at = ParaRef::new(after.section, after.paragraph + 1);
    with_rollback(doc, &[from.section, after.section], move |doc| {
        doc.sections[at.section].paragraphs.insert(at.paragraph, copied);
        Ok(at)
    })
}

/// Move a paragraph after `after`; cross-section moves re-home its numbering
pub fn move_paragraph(doc: &mut Document, from: ParaRef, after: ParaRef) -> Result<ParaRef> {
    check_paragraph(doc, from)?;
    check_paragraph(doc, after)?;
    if from == after {
        return Ok(from);
    }
    if from.section != after.section && doc.sections[from.section].paragraphs.len() == 1 {
        return Err(InvariantViolation::WouldEmptySection(from.section).into());
    }
    with_rollback(doc, &[from.section, after.section], move |doc| {
        let paragraph = doc.sections[from.section].paragraphs.remove(from.paragraph);
        let mut at = after.paragraph + 1;
        if from.section == after.section && from.paragraph < at {
            at -= 1;
        }
        doc.sections[after.section].paragraphs.insert(at, paragraph);
        Ok(ParaRef::new(after.section, at))
    })
}

/// Rebind a paragraph's style reference
pub fn set_paragraph_style(doc: &mut Document, at: ParaRef, style: ParaStyleId) -> Result<()> {
    check_paragraph(doc, at)?;
    if !doc.styles.has_para_style(style) {
        return Err(NotFound::ParaStyle(style.0).into());
    }
    doc.sections[at.section].paragraphs[at.paragraph].style = style;
    Ok(())
}

/// Rebind character styles within a paragraph
///
/// With `span = None` every run is restyled; with a byte range, runs are
/// split at the range edges so exactly the covered text is rebound.
pub fn set_char_style(
    doc: &mut Document,
    at: ParaRef,
    span: Option<(usize, usize)>,
    style: CharStyleId,
) -> Result<()> {
    check_paragraph(doc, at)?;
    if !doc.styles.has_char_style(style) {
        return Err(NotFound::CharStyle(style.0).into());
    }
    let paragraph = &mut doc.sections[at.section].paragraphs[at.paragraph];

    let (start, end) = match span {
        None => {
            for item in &mut paragraph.items {
                if let Some(run) = item.as_run_mut() {
                    run.style = style;
                }
            }
            paragraph.normalize_runs(style);
            return Ok(());
        }
        Some(range) => range,
    };

    let text = paragraph.text();
    if start > end || end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end)
    {
        return Err(NotFound::Span { start, end }.into());
    }
    split_runs_at(paragraph, start);
    split_runs_at(paragraph, end);

    let mut cursor = 0;
    for item in &mut paragraph.items {
        let Some(run) = item.as_run_mut() else { continue };
        let run_start = cursor;
        cursor += run.text.len();
        if run_start >= start && cursor <= end {
            run.style = style;
        }
    }
    let fallback = paragraph.first_char_style().unwrap_or(style);
    paragraph.normalize_runs(fallback);
    Ok(())
}

/// Toggle the "starts new page" flag; no other content changes
pub fn set_page_break(doc: &mut Document, at: ParaRef, enabled: bool) -> Result<()> {
    check_paragraph(doc, at)?;
    doc.sections[at.section].paragraphs[at.paragraph].page_break = enabled;
    Ok(())
}

/// Toggle the "starts new column" flag; no other content changes
pub fn set_column_break(doc: &mut Document, at: ParaRef, enabled: bool) -> Result<()> {
    check_paragraph(doc, at)?;
    doc.sections[at.section].paragraphs[at.paragraph].column_break = enabled;
    Ok(())
}

/// Insert a table paragraph after `after`
///
/// The grid is created fully populated, one empty paragraph per `(row, col)`
/// position, so the grid invariant holds from the moment the node exists.
/// Optional `data` pre-fills cell text row by row; optional `col_widths`
/// declares per-column widths (HWPUNIT).
pub fn insert_table(
    doc: &mut Document,
    after: ParaRef,
    rows: u32,
    cols: u32,
    data: Option<&[Vec<String>]>,
    col_widths: Option<Vec<u32>>,
) -> Result<ParaRef> {
    check_paragraph(doc, after)?;
    if rows == 0 || cols == 0 {
        return Err(InvariantViolation::TableGrid(format!(
            "declared size {}x{} is degenerate",
            rows, cols
        ))
        .into());
    }
    if let Some(widths) = &col_widths {
        if widths.len() != cols as usize {
            return Err(InvariantViolation::TableGrid(format!(
                "{} column widths declared for {} columns",
                widths.len(),
                cols
            ))
            .into());
        }
    }

    let fallback = doc.styles.default_char_id();
    let reference = &doc.sections[after.section].paragraphs[after.paragraph];
    let para_style = reference.style;
    let char_style = reference.first_char_style().unwrap_or(fallback);

    let mut table = Table::new(rows, cols, para_style, char_style);
    table.col_widths = col_widths;
    if let Some(data) = data {
        for (r, row) in data.iter().enumerate().take(rows as usize) {
            for (c, text) in row.iter().enumerate().take(cols as usize) {
                if let Some(cell) = table.cell_mut(r as u32, c as u32) {
                    cell.paragraphs =
                        vec![Paragraph::from_text(text, para_style, char_style)];
                }
            }
        }
    }

    let paragraph = Paragraph::with_items(para_style, vec![ParaItem::Table(table)]);
    let at = ParaRef::new(after.section, after.paragraph + 1);
    with_rollback(doc, &[after.section], move |doc| {
        doc.sections[at.section].paragraphs.insert(at.paragraph, paragraph);
        Ok(at)
    })
}

/// Insert an image paragraph after `after`
///
/// The bytes are registered in the resource catalog first (media type is
/// sniffed from the leading bytes, identical bytes reuse their existing id),
/// then the image node is linked to the fresh id.
pub fn insert_image(
    doc: &mut Document,
    after: ParaRef,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
) -> Result<ParaRef> {
    check_paragraph(doc, after)?;
    let media_type = crate::model::sniff_media_type(&bytes);
    let resource = doc.resources.add(media_type, bytes);

    let reference = &doc.sections[after.section].paragraphs[after.paragraph];
    let paragraph = Paragraph::with_items(
        reference.style,
        vec![ParaItem::Image(Image {
            resource,
            width,
            height,
            inline: true,
        })],
    );
    let at = ParaRef::new(after.section, after.paragraph + 1);
    with_rollback(doc, &[after.section], move |doc| {
        doc.sections[at.section].paragraphs.insert(at.paragraph, paragraph);
        Ok(at)
    })
}

// ---------------------------------------------------------------------------
// Internals

fn check_paragraph(doc: &Document, at: ParaRef) -> std::result::Result<(), NotFound> {
    let section = doc
        .section(at.section)
        .ok_or(NotFound::Section(at.section))?;
    if at.paragraph >= section.paragraphs.len() {
        return Err(NotFound::Paragraph {
            section: at.section,
            paragraph: at.paragraph,
        });
    }
    Ok(())
}

fn check_scope(doc: &Document, scope: Scope) -> std::result::Result<(), NotFound> {
    match scope {
        Scope::Document => Ok(()),
        Scope::Section { section } => doc
            .section(section)
            .map(|_| ())
            .ok_or(NotFound::Section(section)),
        Scope::Paragraph { section, paragraph } => {
            check_paragraph(doc, ParaRef::new(section, paragraph))
        }
    }
}

fn scope_contains(scope: Scope, location: &ParaLocation) -> bool {
    match scope {
        Scope::Document => true,
        Scope::Section { section } => location.section == section,
        Scope::Paragraph { section, paragraph } => {
            location.section == section && location.paragraph == paragraph
        }
    }
}

/// Snapshot the touched sections, run the mutation, re-validate, roll back on
/// any violation
fn with_rollback<T>(
    doc: &mut Document,
    touched: &[usize],
    f: impl FnOnce(&mut Document) -> Result<T>,
) -> Result<T> {
    let snapshot: Vec<(usize, Section)> = touched
        .iter()
        .map(|&i| (i, doc.sections[i].clone()))
        .collect();
    let result = f(doc).and_then(|value| {
        for &i in touched {
            doc.validate_section(i)?;
        }
        Ok(value)
    });
    if result.is_err() {
        for (i, section) in snapshot {
            doc.sections[i] = section;
        }
    }
    result
}

fn paragraph_at_mut<'a>(doc: &'a mut Document, location: &ParaLocation) -> Option<&'a mut Paragraph> {
    let host = doc
        .sections
        .get_mut(location.section)?
        .paragraphs
        .get_mut(location.paragraph)?;
    match &location.cell {
        None => Some(host),
        Some(path) => {
            let item = host.items.get_mut(path.item)?;
            let ParaItem::Table(table) = item else {
                return None;
            };
            table
                .cell_mut(path.row, path.col)?
                .paragraphs
                .get_mut(path.paragraph)
        }
    }
}

/// Style of the run containing a paragraph-text byte offset
fn run_style_at(paragraph: &Paragraph, offset: usize) -> Option<CharStyleId> {
    let mut cursor = 0;
    let mut last = None;
    for item in &paragraph.items {
        if let ParaItem::Run(run) = item {
            let run_end = cursor + run.text.len();
            if offset < run_end || (offset == run_end && run_end == cursor) {
                return Some(run.style);
            }
            cursor = run_end;
            last = Some(run.style);
        }
    }
    last.or_else(|| paragraph.first_char_style())
}

/// Rewrite the byte range `start..end` of the paragraph's flattened run text
///
/// The replacement lands in the run containing `start`; overlapped tails of
/// later runs are trimmed in place, so remainders keep their own styles.
/// Leaves zero-length runs behind; callers normalize afterwards.
fn splice_text(paragraph: &mut Paragraph, start: usize, end: usize, replacement: &str) {
    if start == end {
        // Zero-width span: plain insertion into the containing run
        let mut cursor = 0;
        for item in &mut paragraph.items {
            let Some(run) = item.as_run_mut() else { continue };
            let run_start = cursor;
            let run_end = cursor + run.text.len();
            cursor = run_end;
            if start >= run_start && start <= run_end {
                run.text.insert_str(start - run_start, replacement);
                return;
            }
        }
        return;
    }

    let mut inserted = false;
    let mut cursor = 0;
    for item in &mut paragraph.items {
        let Some(run) = item.as_run_mut() else { continue };
        let run_start = cursor;
        let run_end = cursor + run.text.len();
        cursor = run_end;
        if run_end <= start || run_start >= end {
            continue;
        }
        let lo = start.max(run_start) - run_start;
        let hi = end.min(run_end) - run_start;
        if inserted {
            run.text.replace_range(lo..hi, "");
        } else {
            run.text.replace_range(lo..hi, replacement);
            inserted = true;
        }
    }
}

/// Split the run containing `offset` so a run boundary falls exactly there
fn split_runs_at(paragraph: &mut Paragraph, offset: usize) {
    let mut cursor = 0;
    for idx in 0..paragraph.items.len() {
        let Some(run) = paragraph.items[idx].as_run() else {
            continue;
        };
        let run_start = cursor;
        let run_end = cursor + run.text.len();
        cursor = run_end;
        if offset > run_start && offset < run_end {
            let style = run.style;
            let tail = paragraph.items[idx]
                .as_run_mut()
                .expect("checked as run above")
                .text
                .split_off(offset - run_start);
            paragraph.items.insert(idx + 1, ParaItem::Run(Run::new(tail, style)));
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharStyle, ParaStyle};

    fn styled_doc() -> Document {
        let mut doc = Document::new("Untitled", "ko");
        doc.styles.register_char_style(CharStyle {
            bold: true,
            ..CharStyle::default()
        });
        doc.styles.register_para_style(ParaStyle::named("Heading 1"));
        doc
    }

    fn two_run_paragraph(doc: &mut Document) {
        doc.sections[0].paragraphs[0] = Paragraph::with_items(
            ParaStyleId(0),
            vec![
                ParaItem::Run(Run::new("Hello ", CharStyleId(0))),
                ParaItem::Run(Run::new("World", CharStyleId(1))),
            ],
        );
    }

    #[test]
    fn test_replace_across_runs_inherits_start_style() {
        let mut doc = styled_doc();
        two_run_paragraph(&mut doc);

        let n = replace_text(
            &mut doc,
            Scope::Document,
            "lo Wo",
            "-",
            ReplaceMode::Literal,
            ReplaceCount::All,
        )
        .unwrap();
        assert_eq!(n, 1);

        let paragraph = &doc.sections[0].paragraphs[0];
        assert_eq!(paragraph.text(), "Hel-rld");
        // "Hel-" carries the style of the run containing the match start,
        // the "rld" remainder keeps its own
        assert_eq!(paragraph.items.len(), 2);
        assert_eq!(paragraph.items[0].as_run().unwrap().text, "Hel-");
        assert_eq!(paragraph.items[0].as_run().unwrap().style, CharStyleId(0));
        assert_eq!(paragraph.items[1].as_run().unwrap().style, CharStyleId(1));
    }

    #[test]
    fn test_replace_first_only() {
        let mut doc = styled_doc();
        doc.sections[0].paragraphs[0] =
            Paragraph::from_text("aa bb aa", ParaStyleId(0), CharStyleId(0));
        let n = replace_text(
            &mut doc,
            Scope::Document,
            "aa",
            "cc",
            ReplaceMode::Literal,
            ReplaceCount::First,
        )
        .unwrap();
        assert_eq!(n, 1);
        assert_eq!(doc.sections[0].paragraphs[0].text(), "cc bb aa");
    }

    #[test]
    fn test_replace_regex_counts_all() {
        let mut doc = styled_doc();
        doc.sections[0].paragraphs[0] =
            Paragraph::from_text("x1 y2 z3", ParaStyleId(0), CharStyleId(0));
        let n = replace_text(
            &mut doc,
            Scope::Document,
            r"\d",
            "#",
            ReplaceMode::Regex,
            ReplaceCount::All,
        )
        .unwrap();
        assert_eq!(n, 3);
        assert_eq!(doc.sections[0].paragraphs[0].text(), "x# y# z#");
    }

    #[test]
    fn test_replace_reaches_table_cells() {
        let mut doc = styled_doc();
        insert_table(&mut doc, ParaRef::new(0, 0), 1, 1, None, None).unwrap();
        let host = &mut doc.sections[0].paragraphs[1];
        if let ParaItem::Table(table) = &mut host.items[0] {
            table.cell_mut(0, 0).unwrap().paragraphs[0] =
                Paragraph::from_text("inside cell", ParaStyleId(0), CharStyleId(0));
        }
        let n = replace_text(
            &mut doc,
            Scope::Document,
            "cell",
            "grid",
            ReplaceMode::Literal,
            ReplaceCount::All,
        )
        .unwrap();
        assert_eq!(n, 1);
        if let ParaItem::Table(table) = &doc.sections[0].paragraphs[1].items[0] {
            assert_eq!(table.cell(0, 0).unwrap().paragraphs[0].text(), "inside grid");
        } else {
            panic!("expected table");
        }
    }

    #[test]
    fn test_replace_bad_regex_is_pattern_error() {
        let mut doc = styled_doc();
        let err = replace_text(
            &mut doc,
            Scope::Document,
            "(open",
            "x",
            ReplaceMode::Regex,
            ReplaceCount::All,
        )
        .unwrap_err();
        assert!(matches!(err, HanjiError::Pattern(_)));
    }

    #[test]
    fn test_set_paragraph_text_keeps_prevailing_style() {
        let mut doc = styled_doc();
        two_run_paragraph(&mut doc);
        set_paragraph_text(&mut doc, ParaRef::new(0, 0), "flat").unwrap();
        let paragraph = &doc.sections[0].paragraphs[0];
        assert_eq!(paragraph.items.len(), 1);
        assert_eq!(paragraph.items[0].as_run().unwrap().style, CharStyleId(0));
        assert_eq!(paragraph.text(), "flat");
    }

    #[test]
    fn test_delete_last_paragraph_rejected() {
        let mut doc = styled_doc();
        let before = doc.clone();
        let err = delete_paragraph(&mut doc, ParaRef::new(0, 0)).unwrap_err();
        assert!(matches!(
            err,
            HanjiError::Invariant(InvariantViolation::WouldEmptySection(0))
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_insert_and_delete_shift_indices() {
        let mut doc = styled_doc();
        set_paragraph_text(&mut doc, ParaRef::new(0, 0), "first").unwrap();
        insert_paragraph(&mut doc, ParaRef::new(0, 0), "second").unwrap();
        insert_paragraph(&mut doc, ParaRef::new(0, 0), "middle").unwrap();
        assert_eq!(doc.sections[0].paragraphs[1].text(), "middle");
        assert_eq!(doc.sections[0].paragraphs[2].text(), "second");

        delete_paragraph(&mut doc, ParaRef::new(0, 1)).unwrap();
        assert_eq!(doc.sections[0].paragraphs[1].text(), "second");
    }

    #[test]
    fn test_move_within_section() {
        let mut doc = styled_doc();
        set_paragraph_text(&mut doc, ParaRef::new(0, 0), "a").unwrap();
        insert_paragraph(&mut doc, ParaRef::new(0, 0), "b").unwrap();
        insert_paragraph(&mut doc, ParaRef::new(0, 1), "c").unwrap();
        // a b c -> b c a
        let at = move_paragraph(&mut doc, ParaRef::new(0, 0), ParaRef::new(0, 2)).unwrap();
        assert_eq!(at, ParaRef::new(0, 2));
        let texts: Vec<String> = doc.sections[0].paragraphs.iter().map(|p| p.text()).collect();
        assert_eq!(texts, ["b", "c", "a"]);
    }

    #[test]
    fn test_move_across_sections() {
        let mut doc = styled_doc();
        doc.sections.push(Section::new(
            Default::default(),
            ParaStyleId(0),
            CharStyleId(0),
        ));
        set_paragraph_text(&mut doc, ParaRef::new(0, 0), "movable").unwrap();
        insert_paragraph(&mut doc, ParaRef::new(0, 0), "stays").unwrap();

        let at = move_paragraph(&mut doc, ParaRef::new(0, 0), ParaRef::new(1, 0)).unwrap();
        assert_eq!(at, ParaRef::new(1, 1));
        assert_eq!(doc.sections[1].paragraphs[1].text(), "movable");
        assert_eq!(doc.sections[0].paragraphs.len(), 1);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_copy_paragraph_keeps_source() {
        let mut doc = styled_doc();
        set_paragraph_text(&mut doc, ParaRef::new(0, 0), "original").unwrap();
        let at = copy_paragraph(&mut doc, ParaRef::new(0, 0), ParaRef::new(0, 0)).unwrap();
        assert_eq!(at, ParaRef::new(0, 1));
        assert_eq!(doc.sections[0].paragraphs[0].text(), "original");
        assert_eq!(doc.sections[0].paragraphs[1].text(), "original");
    }

    #[test]
    fn test_set_paragraph_style_requires_registered_id() {
        let mut doc = styled_doc();
        let err = set_paragraph_style(&mut doc, ParaRef::new(0, 0), ParaStyleId(77)).unwrap_err();
        assert!(matches!(err, HanjiError::NotFound(NotFound::ParaStyle(77))));
        set_paragraph_style(&mut doc, ParaRef::new(0, 0), ParaStyleId(1)).unwrap();
        assert_eq!(doc.sections[0].paragraphs[0].style, ParaStyleId(1));
    }

    #[test]
    fn test_set_char_style_span_splits_runs() {
        let mut doc = styled_doc();
        doc.sections[0].paragraphs[0] =
            Paragraph::from_text("abcdef", ParaStyleId(0), CharStyleId(0));
        set_char_style(&mut doc, ParaRef::new(0, 0), Some((2, 4)), CharStyleId(1)).unwrap();
        let paragraph = &doc.sections[0].paragraphs[0];
        let runs: Vec<(&str, u32)> = paragraph
            .items
            .iter()
            .filter_map(|i| i.as_run().map(|r| (r.text.as_str(), r.style.0)))
            .collect();
        assert_eq!(runs, [("ab", 0), ("cd", 1), ("ef", 0)]);
    }

    #[test]
    fn test_set_char_style_out_of_range_span() {
        let mut doc = styled_doc();
        let err =
            set_char_style(&mut doc, ParaRef::new(0, 0), Some((0, 10)), CharStyleId(1)).unwrap_err();
        assert!(matches!(err, HanjiError::NotFound(NotFound::Span { .. })));
    }

    #[test]
    fn test_insert_table_fully_populates_grid() {
        let mut doc = styled_doc();
        let at = insert_table(&mut doc, ParaRef::new(0, 0), 3, 4, None, None).unwrap();
        let paragraph = &doc.sections[0].paragraphs[at.paragraph];
        let ParaItem::Table(table) = &paragraph.items[0] else {
            panic!("expected table item");
        };
        assert_eq!(table.cells.len(), 12);
        assert!(table
            .cells
            .iter()
            .all(|c| c.paragraphs.len() == 1 && c.paragraphs[0].text().is_empty()));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_insert_table_with_data() {
        let mut doc = styled_doc();
        let data = vec![vec!["a".to_string(), "b".to_string()]];
        let at = insert_table(&mut doc, ParaRef::new(0, 0), 2, 2, Some(&data), None).unwrap();
        let ParaItem::Table(table) = &doc.sections[0].paragraphs[at.paragraph].items[0] else {
            panic!("expected table item");
        };
        assert_eq!(table.cell(0, 1).unwrap().paragraphs[0].text(), "b");
        assert_eq!(table.cell(1, 0).unwrap().paragraphs[0].text(), "");
    }

    #[test]
    fn test_insert_image_registers_resource() {
        let mut doc = styled_doc();
        let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let at = insert_image(&mut doc, ParaRef::new(0, 0), png, 4000, 3000).unwrap();
        let ParaItem::Image(image) = &doc.sections[0].paragraphs[at.paragraph].items[0] else {
            panic!("expected image item");
        };
        let resource = doc.resources.get(&image.resource).unwrap();
        assert_eq!(resource.media_type, "image/png");
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_page_break_toggle() {
        let mut doc = styled_doc();
        set_page_break(&mut doc, ParaRef::new(0, 0), true).unwrap();
        assert!(doc.sections[0].paragraphs[0].page_break);
        set_page_break(&mut doc, ParaRef::new(0, 0), false).unwrap();
        assert!(!doc.sections[0].paragraphs[0].page_break);
    }

    #[test]
    fn test_out_of_range_leaves_document_unchanged() {
        let mut doc = styled_doc();
        let before = doc.clone();
        assert!(insert_paragraph(&mut doc, ParaRef::new(0, 9), "x").is_err());
        assert!(move_paragraph(&mut doc, ParaRef::new(2, 0), ParaRef::new(0, 0)).is_err());
        assert_eq!(doc, before);
    }
}
