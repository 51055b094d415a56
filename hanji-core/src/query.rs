//! Literal and pattern search plus read-only projections
//!
//! Searches run over the flattened text of a [`TextIndex`]; a match may span
//! several runs but never two paragraphs, because candidate spans crossing a
//! paragraph separator are discarded. Match iterators are lazy, finite,
//! produced in document order and restartable (each call starts fresh).

use crate::error::{NotFound, PatternError};
use crate::index::{ParaLocation, TextIndex};
use crate::model::{Document, ParaItem, Paragraph};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Bytes of surrounding context attached to each match
const CONTEXT_BYTES: usize = 50;

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Span in the flattened document text (byte offsets)
    pub start: usize,
    pub end: usize,

    /// Matched text
    pub text: String,

    /// Resolved paragraph coordinate
    pub location: ParaLocation,

    /// Item index of the run containing the match start
    pub item: usize,

    /// Byte offset of the match start within that run
    pub offset_in_run: usize,

    /// Text surrounding the match, clipped to the paragraph
    pub context: String,

    /// Page estimate derived from sections and explicit break flags
    pub page_estimate: usize,
}

/// Document-ordered lazy iterator over matches
pub struct Matches<'a> {
    doc: &'a Document,
    index: &'a TextIndex,
    regex: Regex,
    at: usize,
}

impl Iterator for Matches<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        let text = self.index.text();
        while self.at <= text.len() {
            let m = self.regex.find_at(text, self.at)?;
            // Always make progress, even on zero-length matches
            self.at = if m.end() > m.start() {
                m.end()
            } else {
                next_char_boundary(text, m.start())
            };
            if !self.index.span_within_unit(m.start(), m.end()) {
                continue;
            }
            return Some(make_match(self.doc, self.index, m.start(), m.end()));
        }
        None
    }
}

/// Find literal occurrences of `needle`
pub fn find_literal<'a>(
    doc: &'a Document,
    index: &'a TextIndex,
    needle: &str,
    case_sensitive: bool,
) -> Matches<'a> {
    let regex = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(!case_sensitive)
        .build()
        .expect("escaped literal is always a valid pattern");
    Matches {
        doc,
        index,
        regex,
        at: 0,
    }
}

/// Find occurrences of a regular expression
pub fn find_pattern<'a>(
    doc: &'a Document,
    index: &'a TextIndex,
    pattern: &str,
) -> Result<Matches<'a>, PatternError> {
    let regex = Regex::new(pattern).map_err(PatternError)?;
    Ok(Matches {
        doc,
        index,
        regex,
        at: 0,
    })
}

fn make_match(doc: &Document, index: &TextIndex, start: usize, end: usize) -> Match {
    let text = index.text();
    let resolved = index
        .resolve(start)
        .expect("match start lies inside an indexed unit");
    let (unit_start, unit_end) = index
        .unit_bounds(start)
        .expect("match start lies inside an indexed unit");

    let ctx_start = floor_char_boundary(text, start.saturating_sub(CONTEXT_BYTES).max(unit_start));
    let ctx_end = ceil_char_boundary(text, (end + CONTEXT_BYTES).min(unit_end));

    Match {
        start,
        end,
        text: text[start..end].to_string(),
        page_estimate: page_estimate(doc, &resolved.location),
        location: resolved.location,
        item: resolved.item,
        offset_in_run: resolved.offset_in_run,
        context: text[ctx_start..ctx_end].to_string(),
    }
}

fn next_char_boundary(text: &str, offset: usize) -> usize {
    let mut next = offset + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next.min(text.len() + 1)
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn ceil_char_boundary(text: &str, mut offset: usize) -> usize {
    while offset < text.len() && !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset
}

/// Estimated 1-based page number of a paragraph
///
/// Each preceding section counts as at least one page; explicit page/column
/// breaks earlier in the same section add one each, matching how the break
/// flags partition the rendered output.
pub fn page_estimate(doc: &Document, location: &ParaLocation) -> usize {
    let mut page = 1;
    for section in doc.sections.iter().take(location.section) {
        page += 1 + section
            .paragraphs
            .iter()
            .filter(|p| p.page_break || p.column_break)
            .count();
    }
    page += doc.sections[location.section]
        .paragraphs
        .iter()
        .take(location.paragraph)
        .filter(|p| p.page_break || p.column_break)
        .count();
    page
}

/// Summary of one top-level paragraph
#[derive(Debug, Clone, Serialize)]
pub struct ParagraphInfo {
    pub section: usize,
    pub index: usize,
    pub text: String,
    pub style: u32,
    pub char_styles: Vec<u32>,
    pub has_table: bool,
    pub has_image: bool,
    pub page_break: bool,
    pub column_break: bool,
    pub page_estimate: usize,
}

fn paragraph_info(doc: &Document, section: usize, index: usize) -> ParagraphInfo {
    let paragraph = &doc.sections[section].paragraphs[index];
    let mut char_styles: Vec<u32> = paragraph
        .items
        .iter()
        .filter_map(|i| i.as_run().map(|r| r.style.0))
        .collect();
    char_styles.dedup();
    ParagraphInfo {
        section,
        index,
        text: paragraph.text(),
        style: paragraph.style.0,
        char_styles,
        has_table: paragraph.has_table(),
        has_image: paragraph.has_image(),
        page_break: paragraph.page_break,
        column_break: paragraph.column_break,
        page_estimate: page_estimate(doc, &ParaLocation::top_level(section, index)),
    }
}

/// Text of one top-level paragraph
pub fn paragraph_text(doc: &Document, section: usize, paragraph: usize) -> Result<String, NotFound> {
    resolve_paragraph(doc, section, paragraph).map(Paragraph::text)
}

/// Summaries for every paragraph of a section
pub fn paragraphs(doc: &Document, section: usize) -> Result<Vec<ParagraphInfo>, NotFound> {
    let sec = doc.section(section).ok_or(NotFound::Section(section))?;
    Ok((0..sec.paragraphs.len())
        .map(|i| paragraph_info(doc, section, i))
        .collect())
}

/// Summaries for a paragraph index range (clamped to the section)
pub fn paragraph_range(
    doc: &Document,
    section: usize,
    start: usize,
    end: usize,
) -> Result<Vec<ParagraphInfo>, NotFound> {
    let sec = doc.section(section).ok_or(NotFound::Section(section))?;
    let end = end.min(sec.paragraphs.len());
    Ok((start.min(end)..end)
        .map(|i| paragraph_info(doc, section, i))
        .collect())
}

/// Whole-document text, paragraphs joined with newlines
pub fn all_text(doc: &Document) -> String {
    let mut out = Vec::new();
    for section in &doc.sections {
        for paragraph in &section.paragraphs {
            let text = paragraph.text();
            if !text.is_empty() {
                out.push(text);
            }
        }
    }
    out.join("\n")
}

/// Summary of an embedded table
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub location: ParaLocation,
    pub rows: u32,
    pub cols: u32,
    /// Concatenated cell text, clipped
    pub preview: String,
}

/// All tables in document order
pub fn tables(doc: &Document) -> Vec<TableInfo> {
    let mut out = Vec::new();
    for (si, section) in doc.sections.iter().enumerate() {
        for (pi, paragraph) in section.paragraphs.iter().enumerate() {
            for item in &paragraph.items {
                if let ParaItem::Table(table) = item {
                    let mut preview = String::new();
                    'cells: for cell in &table.cells {
                        for cell_para in &cell.paragraphs {
                            if !preview.is_empty() {
                                preview.push(' ');
                            }
                            preview.push_str(&cell_para.text());
                            if preview.len() > 200 {
                                break 'cells;
                            }
                        }
                    }
                    preview.truncate(200);
                    out.push(TableInfo {
                        location: ParaLocation::top_level(si, pi),
                        rows: table.rows,
                        cols: table.cols,
                        preview,
                    });
                }
            }
        }
    }
    out
}

/// Summary of an embedded image
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub location: ParaLocation,
    pub resource: String,
    pub media_type: String,
    pub width: u32,
    pub height: u32,
    pub inline: bool,
}

/// All images in document order
pub fn images(doc: &Document) -> Vec<ImageInfo> {
    let mut out = Vec::new();
    for (si, section) in doc.sections.iter().enumerate() {
        for (pi, paragraph) in section.paragraphs.iter().enumerate() {
            for item in &paragraph.items {
                if let ParaItem::Image(image) = item {
                    let media_type = doc
                        .resources
                        .get(&image.resource)
                        .map(|r| r.media_type.clone())
                        .unwrap_or_default();
                    out.push(ImageInfo {
                        location: ParaLocation::top_level(si, pi),
                        resource: image.resource.clone(),
                        media_type,
                        width: image.width,
                        height: image.height,
                        inline: image.inline,
                    });
                }
            }
        }
    }
    out
}

/// Kind of explicit break carried by a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Page,
    Column,
}

/// An explicit page or column break
#[derive(Debug, Clone, Serialize)]
pub struct PageBreak {
    pub section: usize,
    pub paragraph: usize,
    pub kind: BreakKind,
    /// Leading text of the paragraph carrying the flag
    pub preview: String,
}

/// All paragraphs with a break flag set, in document order
pub fn page_breaks(doc: &Document) -> Vec<PageBreak> {
    let mut out = Vec::new();
    for (si, section) in doc.sections.iter().enumerate() {
        for (pi, paragraph) in section.paragraphs.iter().enumerate() {
            if !paragraph.page_break && !paragraph.column_break {
                continue;
            }
            let kind = if paragraph.page_break {
                BreakKind::Page
            } else {
                BreakKind::Column
            };
            let mut preview = paragraph.text();
            if preview.len() > 100 {
                let cut = floor_char_boundary(&preview, 100);
                preview.truncate(cut);
                preview.push_str("...");
            }
            out.push(PageBreak {
                section: si,
                paragraph: pi,
                kind,
                preview,
            });
        }
    }
    out
}

fn resolve_paragraph(
    doc: &Document,
    section: usize,
    paragraph: usize,
) -> Result<&Paragraph, NotFound> {
    let sec = doc.section(section).ok_or(NotFound::Section(section))?;
    sec.paragraphs
        .get(paragraph)
        .ok_or(NotFound::Paragraph { section, paragraph })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharStyleId, ParaStyleId, Paragraph};

    fn doc_with(texts: &[&str]) -> Document {
        let mut doc = Document::new("Untitled", "ko");
        doc.sections[0].paragraphs.clear();
        for t in texts {
            doc.sections[0]
                .paragraphs
                .push(Paragraph::from_text(*t, ParaStyleId(0), CharStyleId(0)));
        }
        doc
    }

    #[test]
    fn test_find_literal_resolves_coordinates() {
        let doc = doc_with(&["alpha", "the X mark"]);
        let index = TextIndex::build(&doc);
        let matches: Vec<Match> = find_literal(&doc, &index, "X", true).collect();
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.location, ParaLocation::top_level(0, 1));
        let text = paragraph_text(&doc, 0, 1).unwrap();
        assert_eq!(&text[m.offset_in_run..m.offset_in_run + 1], "X");
    }

    #[test]
    fn test_find_literal_case_insensitive() {
        let doc = doc_with(&["Hello hello HELLO"]);
        let index = TextIndex::build(&doc);
        assert_eq!(find_literal(&doc, &index, "hello", false).count(), 3);
        assert_eq!(find_literal(&doc, &index, "hello", true).count(), 1);
    }

    #[test]
    fn test_find_pattern_rejects_bad_regex() {
        let doc = doc_with(&["text"]);
        let index = TextIndex::build(&doc);
        assert!(find_pattern(&doc, &index, "(unclosed").is_err());
    }

    #[test]
    fn test_pattern_cannot_span_paragraphs() {
        let doc = doc_with(&["end", "begin"]);
        let index = TextIndex::build(&doc);
        // (?s:.) matches any character including the separator
        let matches: Vec<Match> = find_pattern(&doc, &index, "end(?s:.)begin")
            .unwrap()
            .collect();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_matches_are_restartable() {
        let doc = doc_with(&["aba aba"]);
        let index = TextIndex::build(&doc);
        let first: Vec<Match> = find_literal(&doc, &index, "aba", true).collect();
        let second: Vec<Match> = find_literal(&doc, &index, "aba", true).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_page_breaks_enumerated_in_order() {
        let mut doc = doc_with(&["one", "two", "three"]);
        doc.sections[0].paragraphs[1].page_break = true;
        doc.sections[0].paragraphs[2].column_break = true;
        let breaks = page_breaks(&doc);
        assert_eq!(breaks.len(), 2);
        assert_eq!(breaks[0].kind, BreakKind::Page);
        assert_eq!(breaks[0].paragraph, 1);
        assert_eq!(breaks[1].kind, BreakKind::Column);
    }

    #[test]
    fn test_page_estimate_counts_breaks() {
        let mut doc = doc_with(&["one", "two", "three"]);
        doc.sections[0].paragraphs[1].page_break = true;
        assert_eq!(page_estimate(&doc, &ParaLocation::top_level(0, 0)), 1);
        assert_eq!(page_estimate(&doc, &ParaLocation::top_level(0, 2)), 2);
    }

    #[test]
    fn test_projection_bounds_checked() {
        let doc = doc_with(&["only"]);
        assert!(matches!(
            paragraph_text(&doc, 0, 5),
            Err(NotFound::Paragraph { .. })
        ));
        assert!(matches!(paragraphs(&doc, 3), Err(NotFound::Section(3))));
    }
}
