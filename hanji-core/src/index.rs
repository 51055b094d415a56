//! Derived text index over the document
//!
//! Built by one linear scan over sections, paragraphs and runs: run text is
//! concatenated into a single flattened string, with a record-separator
//! character between paragraph units and a parallel span table mapping global
//! byte offsets back to `(section, paragraph, item, offset-in-run)`
//! coordinates. Paragraphs nested in table cells are indexed as units of
//! their own, addressed through a [`CellPath`].
//!
//! The index is rebuilt, not patched, after structural edits; rebuild cost is
//! bounded by document length and correctness under arbitrary edits stays
//! trivial.

use crate::model::{Document, ParaItem, Paragraph};
use serde::{Deserialize, Serialize};

/// Separator between paragraph units in the flattened text
///
/// U+001E (record separator) never appears in document text; candidate
/// matches that would cross it are discarded, which scopes every search to a
/// single paragraph by construction.
pub const PARA_SEPARATOR: char = '\u{1e}';

/// Location of a paragraph nested inside a table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPath {
    /// Index of the table item within the host paragraph
    pub item: usize,

    /// Origin cell coordinates
    pub row: u32,
    pub col: u32,

    /// Paragraph index within the cell
    pub paragraph: usize,
}

/// Resolved paragraph coordinate
///
/// `section`/`paragraph` address a top-level paragraph; `cell` is present
/// when the located paragraph lives inside a table embedded in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParaLocation {
    pub section: usize,
    pub paragraph: usize,
    pub cell: Option<CellPath>,
}

impl ParaLocation {
    pub fn top_level(section: usize, paragraph: usize) -> Self {
        Self {
            section,
            paragraph,
            cell: None,
        }
    }
}

/// Span of one run within the flattened text
#[derive(Debug, Clone)]
struct RunSpan {
    start: usize,
    end: usize,

    /// Item index within the paragraph
    item: usize,
}

/// One indexed paragraph unit
#[derive(Debug, Clone)]
pub(crate) struct ParaUnit {
    location: ParaLocation,
    start: usize,
    end: usize,
    runs: Vec<RunSpan>,
}

/// A global offset resolved back to document coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub location: ParaLocation,

    /// Item index of the run containing the offset
    pub item: usize,

    /// Byte offset within that run's text
    pub offset_in_run: usize,
}

/// The flattened-text index
#[derive(Debug, Clone)]
pub struct TextIndex {
    text: String,
    units: Vec<ParaUnit>,
}

impl TextIndex {
    /// Build the index with a single scan of the document
    pub fn build(doc: &Document) -> Self {
        let mut index = TextIndex {
            text: String::new(),
            units: Vec::new(),
        };
        for (si, section) in doc.sections.iter().enumerate() {
            for (pi, paragraph) in section.paragraphs.iter().enumerate() {
                index.push_paragraph(paragraph, ParaLocation::top_level(si, pi));
            }
        }
        index
    }

    fn push_paragraph(&mut self, paragraph: &Paragraph, location: ParaLocation) {
        let start = self.text.len();
        let mut runs = Vec::new();
        for (item_idx, item) in paragraph.items.iter().enumerate() {
            if let ParaItem::Run(run) = item {
                let run_start = self.text.len();
                self.text.push_str(&run.text);
                runs.push(RunSpan {
                    start: run_start,
                    end: self.text.len(),
                    item: item_idx,
                });
            }
        }
        let end = self.text.len();
        self.text.push(PARA_SEPARATOR);
        self.units.push(ParaUnit {
            location: location.clone(),
            start,
            end,
            runs,
        });

        // Cell paragraphs follow their host in document order
        for (item_idx, item) in paragraph.items.iter().enumerate() {
            if let ParaItem::Table(table) = item {
                for cell in &table.cells {
                    for (cpi, cell_para) in cell.paragraphs.iter().enumerate() {
                        self.push_paragraph(
                            cell_para,
                            ParaLocation {
                                section: location.section,
                                paragraph: location.paragraph,
                                cell: Some(CellPath {
                                    item: item_idx,
                                    row: cell.row,
                                    col: cell.col,
                                    paragraph: cpi,
                                }),
                            },
                        );
                    }
                }
            }
        }
    }

    /// The flattened document text, separators included
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The unit containing a global offset, by binary search
    fn unit_at(&self, offset: usize) -> Option<&ParaUnit> {
        if self.units.is_empty() {
            return None;
        }
        let idx = self.units.partition_point(|u| u.end < offset);
        let unit = self.units.get(idx)?;
        (offset >= unit.start && offset <= unit.end).then_some(unit)
    }

    /// Whether a match span stays inside one paragraph unit
    ///
    /// Spans touching a separator (or crossing one) are rejected, so
    /// separators are never part of a reported match.
    pub fn span_within_unit(&self, start: usize, end: usize) -> bool {
        match self.unit_at(start) {
            Some(unit) => start >= unit.start && end <= unit.end,
            None => false,
        }
    }

    /// Resolve a global offset to document coordinates
    pub fn resolve(&self, offset: usize) -> Option<Resolved> {
        let unit = self.unit_at(offset)?;
        // Runs are contiguous within the unit; pick the one containing the
        // offset, preferring a run start on boundaries.
        let run = unit
            .runs
            .iter()
            .find(|r| offset >= r.start && offset < r.end)
            .or_else(|| unit.runs.iter().find(|r| offset == r.end))
            .or(unit.runs.first())?;
        Some(Resolved {
            location: unit.location.clone(),
            item: run.item,
            offset_in_run: offset - run.start,
        })
    }

    /// Span of the unit for a paragraph location, if indexed
    pub fn location_span(&self, location: &ParaLocation) -> Option<(usize, usize)> {
        self.units
            .iter()
            .find(|u| &u.location == location)
            .map(|u| (u.start, u.end))
    }

    pub(crate) fn unit_bounds(&self, offset: usize) -> Option<(usize, usize)> {
        self.unit_at(offset).map(|u| (u.start, u.end))
    }
}
