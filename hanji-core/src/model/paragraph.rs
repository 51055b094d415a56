//! Paragraphs and their content items

use super::style::{CharStyleId, ParaStyleId};
use super::table::Table;
use serde::{Deserialize, Serialize};

/// A styled contiguous text span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Text content; never null, may contain '\n' for in-paragraph line breaks
    pub text: String,

    /// Character style reference
    pub style: CharStyleId,
}

impl Run {
    pub fn new(text: impl Into<String>, style: CharStyleId) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn empty(style: CharStyleId) -> Self {
        Self::new("", style)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An embedded image placed as paragraph content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Resource catalog identifier of the image bytes
    pub resource: String,

    /// Display width in HWPUNIT
    pub width: u32,

    /// Display height in HWPUNIT
    pub height: u32,

    /// Inline (treated as a character) vs anchored placement
    pub inline: bool,
}

/// Paragraph-level content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParaItem {
    Run(Run),
    Table(Table),
    Image(Image),
}

impl ParaItem {
    pub fn as_run(&self) -> Option<&Run> {
        match self {
            ParaItem::Run(run) => Some(run),
            _ => None,
        }
    }

    pub fn as_run_mut(&mut self) -> Option<&mut Run> {
        match self {
            ParaItem::Run(run) => Some(run),
            _ => None,
        }
    }
}

/// An ordered sequence of content items with paragraph-level styling
///
/// A paragraph always holds at least one item; an "empty" paragraph holds a
/// single zero-length run so consumers never see a paragraph without a
/// renderable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub style: ParaStyleId,

    /// Start a new page before this paragraph
    pub page_break: bool,

    /// Start a new column before this paragraph
    pub column_break: bool,

    pub items: Vec<ParaItem>,

    /// Unknown XML attributes found on the paragraph element, verbatim
    pub extra: Vec<(String, String)>,
}

impl Paragraph {
    /// Paragraph holding a single zero-length run
    pub fn empty(style: ParaStyleId, char_style: CharStyleId) -> Self {
        Self {
            style,
            page_break: false,
            column_break: false,
            items: vec![ParaItem::Run(Run::empty(char_style))],
            extra: Vec::new(),
        }
    }

    /// Paragraph holding a single text run
    pub fn from_text(text: impl Into<String>, style: ParaStyleId, char_style: CharStyleId) -> Self {
        Self {
            style,
            page_break: false,
            column_break: false,
            items: vec![ParaItem::Run(Run::new(text, char_style))],
            extra: Vec::new(),
        }
    }

    /// Paragraph with explicit items (codec use)
    pub fn with_items(style: ParaStyleId, items: Vec<ParaItem>) -> Self {
        Self {
            style,
            page_break: false,
            column_break: false,
            items,
            extra: Vec::new(),
        }
    }

    /// Concatenated text of all runs, in order
    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            if let ParaItem::Run(run) = item {
                out.push_str(&run.text);
            }
        }
        out
    }

    /// Style of the first run, if any
    pub fn first_char_style(&self) -> Option<CharStyleId> {
        self.items.iter().find_map(|item| match item {
            ParaItem::Run(run) => Some(run.style),
            _ => None,
        })
    }

    pub fn has_table(&self) -> bool {
        self.items.iter().any(|i| matches!(i, ParaItem::Table(_)))
    }

    pub fn has_image(&self) -> bool {
        self.items.iter().any(|i| matches!(i, ParaItem::Image(_)))
    }

    /// Merge adjacent same-style runs and drop zero-length ones
    ///
    /// Zero-length runs are permitted transiently during edits; this restores
    /// the normal form before an operation returns. A paragraph left with no
    /// items gets a single empty run back carrying `fallback_style`.
    pub fn normalize_runs(&mut self, fallback_style: CharStyleId) {
        let mut normalized: Vec<ParaItem> = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            match item {
                ParaItem::Run(run) => {
                    if run.is_empty() {
                        continue;
                    }
                    match normalized.last_mut().and_then(|i| i.as_run_mut()) {
                        Some(prev) if prev.style == run.style => prev.text.push_str(&run.text),
                        _ => normalized.push(ParaItem::Run(run)),
                    }
                }
                other => normalized.push(other),
            }
        }
        if normalized.is_empty() {
            normalized.push(ParaItem::Run(Run::empty(fallback_style)));
        }
        self.items = normalized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_concatenates_runs() {
        let para = Paragraph::with_items(
            ParaStyleId(0),
            vec![
                ParaItem::Run(Run::new("Hello ", CharStyleId(0))),
                ParaItem::Run(Run::new("World", CharStyleId(1))),
            ],
        );
        assert_eq!(para.text(), "Hello World");
    }

    #[test]
    fn test_normalize_merges_same_style_runs() {
        let mut para = Paragraph::with_items(
            ParaStyleId(0),
            vec![
                ParaItem::Run(Run::new("ab", CharStyleId(0))),
                ParaItem::Run(Run::new("", CharStyleId(1))),
                ParaItem::Run(Run::new("cd", CharStyleId(0))),
            ],
        );
        para.normalize_runs(CharStyleId(0));
        assert_eq!(para.items.len(), 1);
        assert_eq!(para.text(), "abcd");
    }

    #[test]
    fn test_normalize_restores_empty_run() {
        let mut para = Paragraph::with_items(
            ParaStyleId(0),
            vec![ParaItem::Run(Run::new("", CharStyleId(3)))],
        );
        para.normalize_runs(CharStyleId(3));
        assert_eq!(para.items.len(), 1);
        assert_eq!(para.first_char_style(), Some(CharStyleId(3)));
    }
}
