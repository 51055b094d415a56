//! Paragraph and character style catalogs
//!
//! Styles are immutable attribute bags keyed by an integer ID unique within
//! their catalog. Restyling content rebinds the reference on the node; the
//! style body itself is never mutated in place once registered.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to a paragraph style in the catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParaStyleId(pub u32);

/// Reference to a character style in the catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CharStyleId(pub u32);

/// Horizontal paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    #[default]
    Justify,
    Distribute,
}

impl Alignment {
    /// Attribute value used in the style catalog part
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "LEFT",
            Alignment::Center => "CENTER",
            Alignment::Right => "RIGHT",
            Alignment::Justify => "JUSTIFY",
            Alignment::Distribute => "DISTRIBUTE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LEFT" => Some(Alignment::Left),
            "CENTER" => Some(Alignment::Center),
            "RIGHT" => Some(Alignment::Right),
            "JUSTIFY" => Some(Alignment::Justify),
            "DISTRIBUTE" => Some(Alignment::Distribute),
            _ => None,
        }
    }
}

/// Paragraph-level style attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParaStyle {
    /// Display name ("Body", "Heading 1", ...)
    pub name: String,

    pub align: Alignment,

    /// Line spacing in percent of the font height
    pub line_spacing: u32,

    /// Left/right margins and first-line indent, in HWPUNIT
    pub margin_left: i32,
    pub margin_right: i32,
    pub indent: i32,

    /// Space before/after the paragraph, in HWPUNIT
    pub space_before: i32,
    pub space_after: i32,
}

impl Default for ParaStyle {
    fn default() -> Self {
        Self {
            name: "Body".to_string(),
            align: Alignment::Justify,
            line_spacing: 160,
            margin_left: 0,
            margin_right: 0,
            indent: 0,
            space_before: 0,
            space_after: 0,
        }
    }
}

impl ParaStyle {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Character-level style attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharStyle {
    /// Font face name
    pub face: String,

    /// Font size in 1/100 pt (1000 = 10pt)
    pub size: u32,

    pub bold: bool,
    pub italic: bool,
    pub underline: bool,

    /// Text color as "#RRGGBB"
    pub color: String,
}

impl Default for CharStyle {
    fn default() -> Self {
        Self {
            face: "Noto Sans KR".to_string(),
            size: 1000,
            bold: false,
            italic: false,
            underline: false,
            color: "#000000".to_string(),
        }
    }
}

/// The two flat style registries of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleCatalog {
    para: BTreeMap<u32, ParaStyle>,
    character: BTreeMap<u32, CharStyle>,
}

impl StyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with default paragraph/character styles at ID 0
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.insert_para_style(0, ParaStyle::default());
        catalog.insert_char_style(0, CharStyle::default());
        catalog
    }

    pub fn para_style(&self, id: ParaStyleId) -> Option<&ParaStyle> {
        self.para.get(&id.0)
    }

    pub fn char_style(&self, id: CharStyleId) -> Option<&CharStyle> {
        self.character.get(&id.0)
    }

    pub fn has_para_style(&self, id: ParaStyleId) -> bool {
        self.para.contains_key(&id.0)
    }

    pub fn has_char_style(&self, id: CharStyleId) -> bool {
        self.character.contains_key(&id.0)
    }

    /// Insert a paragraph style under an explicit ID (codec use)
    pub fn insert_para_style(&mut self, id: u32, style: ParaStyle) {
        self.para.insert(id, style);
    }

    /// Insert a character style under an explicit ID (codec use)
    pub fn insert_char_style(&mut self, id: u32, style: CharStyle) {
        self.character.insert(id, style);
    }

    /// Register a paragraph style under the next free ID
    pub fn register_para_style(&mut self, style: ParaStyle) -> ParaStyleId {
        let id = self.para.keys().next_back().map_or(0, |max| max + 1);
        self.para.insert(id, style);
        ParaStyleId(id)
    }

    /// Register a character style under the next free ID
    pub fn register_char_style(&mut self, style: CharStyle) -> CharStyleId {
        let id = self.character.keys().next_back().map_or(0, |max| max + 1);
        self.character.insert(id, style);
        CharStyleId(id)
    }

    /// Lowest registered paragraph style ID, registering a default when the
    /// catalog is empty
    pub fn default_para_id(&mut self) -> ParaStyleId {
        match self.para.keys().next() {
            Some(&id) => ParaStyleId(id),
            None => self.register_para_style(ParaStyle::default()),
        }
    }

    /// Lowest registered character style ID, registering a default when the
    /// catalog is empty
    pub fn default_char_id(&mut self) -> CharStyleId {
        match self.character.keys().next() {
            Some(&id) => CharStyleId(id),
            None => self.register_char_style(CharStyle::default()),
        }
    }

    pub fn para_styles(&self) -> impl Iterator<Item = (ParaStyleId, &ParaStyle)> {
        self.para.iter().map(|(&id, s)| (ParaStyleId(id), s))
    }

    pub fn char_styles(&self) -> impl Iterator<Item = (CharStyleId, &CharStyle)> {
        self.character.iter().map(|(&id, s)| (CharStyleId(id), s))
    }

    pub fn para_style_count(&self) -> usize {
        self.para.len()
    }

    pub fn char_style_count(&self) -> usize {
        self.character.len()
    }
}
