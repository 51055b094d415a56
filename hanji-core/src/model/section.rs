//! Sections: page-geometry-scoped paragraph sequences

use super::paragraph::Paragraph;
use super::style::{CharStyleId, ParaStyleId};
use serde::{Deserialize, Serialize};

/// Page margins in HWPUNIT (1/7200 inch)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    pub header: u32,
    pub footer: u32,
}

impl Default for Margins {
    fn default() -> Self {
        // Roughly 10mm sides/top, 5mm bottom
        Self {
            left: 5669,
            right: 5669,
            top: 5669,
            bottom: 2835,
            header: 2835,
            footer: 2835,
        }
    }
}

/// Section-level page setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in HWPUNIT
    pub width: u32,

    /// Page height in HWPUNIT
    pub height: u32,

    pub landscape: bool,

    pub margins: Margins,

    /// Column count (>= 1)
    pub columns: u16,

    /// Unknown attributes found on the page-setup element, verbatim
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // A4 portrait
        Self {
            width: 59528,
            height: 84188,
            landscape: false,
            margins: Margins::default(),
            columns: 1,
            extra: Vec::new(),
        }
    }
}

/// An ordered run of paragraphs sharing one page setup
///
/// Section index is positional within the document; inserting or removing a
/// section shifts the effective index of everything after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub geometry: PageGeometry,

    pub paragraphs: Vec<Paragraph>,

    /// Unknown attributes found on the section root element, verbatim
    pub extra: Vec<(String, String)>,
}

impl Section {
    /// New section holding a single empty paragraph
    pub fn new(geometry: PageGeometry, para_style: ParaStyleId, char_style: CharStyleId) -> Self {
        Self {
            geometry,
            paragraphs: vec![Paragraph::empty(para_style, char_style)],
            extra: Vec::new(),
        }
    }

    /// Section with explicit paragraphs (codec use)
    pub fn with_paragraphs(geometry: PageGeometry, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            geometry,
            paragraphs,
            extra: Vec::new(),
        }
    }
}
