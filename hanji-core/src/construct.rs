//! Building a document from recognized text blocks
//!
//! This is the one place recognition-provider output crosses into the IR. It
//! performs no recognition itself: it takes an ordered stream of
//! `(text, bounding box, page index)` blocks plus per-page dimensions and
//! assembles a valid document, one section per page.

use crate::error::Result;
use crate::model::{Document, PageGeometry, ParaItem, Paragraph, Run};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// HWPUNIT per typographic point (7200 units per inch, 72 points per inch)
const HWPUNIT_PER_PT: f32 = 100.0;

/// Bounding box of a recognized block, in page points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// One recognized text block with its page geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedBlock {
    pub text: String,
    pub bbox: BoundingBox,
    pub page_index: usize,
}

/// Dimensions of one source page, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDims {
    pub width: f32,
    pub height: f32,
}

/// Tunables for the reading-order heuristic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Blocks whose vertical gap from the previous block on the same page is
    /// below this threshold (points) merge into one paragraph. A heuristic
    /// knob, not an invariant.
    pub merge_gap: f32,

    /// Title recorded in the package metadata
    pub title: String,

    /// Language code recorded in the package metadata
    pub language: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            merge_gap: 6.0,
            title: "Scanned document".to_string(),
            language: "ko".to_string(),
        }
    }
}

/// Assemble a document from recognized blocks
///
/// Blocks are sorted into reading order (page, then top-to-bottom, then
/// left-to-right); each page becomes a section whose geometry comes from the
/// supplied dimensions, falling back to A4 for pages without one. Every
/// produced document satisfies the structural invariants, including for empty
/// input.
pub fn build_from_blocks(
    mut blocks: Vec<RecognizedBlock>,
    pages: &[PageDims],
    options: &BuildOptions,
) -> Result<Document> {
    blocks.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then(a.bbox.y0.total_cmp(&b.bbox.y0))
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut doc = Document::new(options.title.clone(), options.language.clone());
    let now = Utc::now().to_rfc3339();
    doc.metadata.created = Some(now.clone());
    doc.metadata.modified = Some(now);

    let para_style = doc.styles.default_para_id();
    let char_style = doc.styles.default_char_id();

    let page_count = pages
        .len()
        .max(blocks.last().map_or(0, |b| b.page_index + 1))
        .max(1);
    doc.sections.clear();
    for page in 0..page_count {
        let geometry = pages
            .get(page)
            .map(|dims| page_geometry(*dims))
            .unwrap_or_default();
        doc.sections.push(crate::model::Section::with_paragraphs(
            geometry,
            Vec::new(),
        ));
    }

    let mut previous: Option<RecognizedBlock> = None;
    for block in blocks {
        if block.text.is_empty() {
            continue;
        }
        let section = &mut doc.sections[block.page_index];
        let merge = match &previous {
            Some(prev) if prev.page_index == block.page_index => {
                block.bbox.y0 - prev.bbox.y1 < options.merge_gap
            }
            _ => false,
        };
        if merge {
            let paragraph = section
                .paragraphs
                .last_mut()
                .expect("merge implies a previous paragraph on this page");
            let run = paragraph
                .items
                .last_mut()
                .and_then(ParaItem::as_run_mut)
                .expect("constructed paragraphs end with a run");
            if !run.text.ends_with(char::is_whitespace) {
                run.text.push(' ');
            }
            run.text.push_str(&block.text);
        } else {
            section.paragraphs.push(Paragraph::with_items(
                para_style,
                vec![ParaItem::Run(Run::new(block.text.clone(), char_style))],
            ));
        }
        previous = Some(block);
    }

    // Pages without any block still need a paragraph
    for section in &mut doc.sections {
        if section.paragraphs.is_empty() {
            section
                .paragraphs
                .push(Paragraph::empty(para_style, char_style));
        }
    }

    doc.validate()?;
    tracing::debug!(
        sections = doc.sections.len(),
        paragraphs = doc.paragraph_count(),
        "built document from recognized blocks"
    );
    Ok(doc)
}

fn page_geometry(dims: PageDims) -> PageGeometry {
    PageGeometry {
        width: (dims.width * HWPUNIT_PER_PT).round() as u32,
        height: (dims.height * HWPUNIT_PER_PT).round() as u32,
        landscape: dims.width > dims.height,
        ..PageGeometry::default()
    }
}
