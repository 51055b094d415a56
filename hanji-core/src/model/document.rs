//! The Document type - root of the IR

use super::{Metadata, ParaItem, Paragraph, ResourceStore, Section, StyleCatalog};
use crate::error::InvariantViolation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A package entry the model does not interpret, preserved verbatim
///
/// Covers producer-specific parts such as `version.xml`, `settings.xml` or
/// preview text so an edit-then-save cycle loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaquePart {
    /// Archive entry name
    pub name: String,

    #[serde(with = "opaque_bytes")]
    pub data: Vec<u8>,
}

/// The complete in-memory document representation
///
/// This is the IR the codec decodes into and the query/edit engines operate
/// on. The document exclusively owns all descendant nodes; derived indexes
/// hold positions, never references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Instance identifier; not part of the package, regenerated on decode
    pub id: Uuid,

    pub metadata: Metadata,

    /// Ordered sections
    pub sections: Vec<Section>,

    pub styles: StyleCatalog,

    pub resources: ResourceStore,

    /// Uninterpreted package entries, re-emitted on encode
    pub opaque_parts: Vec<OpaquePart>,
}

// Structural equality: the instance id is deliberately excluded so that
// decode(encode(d)) compares equal to d.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.sections == other.sections
            && self.styles == other.styles
            && self.resources == other.resources
            && self.opaque_parts == other.opaque_parts
    }
}

impl Document {
    /// New document with a seeded default style catalog and one empty section
    pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
        let mut styles = StyleCatalog::with_defaults();
        let para = styles.default_para_id();
        let character = styles.default_char_id();
        Self {
            id: Uuid::new_v4(),
            metadata: Metadata::new(title, language),
            sections: vec![Section::new(Default::default(), para, character)],
            styles,
            resources: ResourceStore::new(),
            opaque_parts: Vec::new(),
        }
    }

    /// Document assembled from decoded parts (codec use)
    pub fn from_parts(
        metadata: Metadata,
        sections: Vec<Section>,
        styles: StyleCatalog,
        resources: ResourceStore,
        opaque_parts: Vec<OpaquePart>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            metadata,
            sections,
            styles,
            resources,
            opaque_parts,
        }
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn paragraph(&self, section: usize, paragraph: usize) -> Option<&Paragraph> {
        self.sections.get(section)?.paragraphs.get(paragraph)
    }

    /// Total top-level paragraph count across all sections
    pub fn paragraph_count(&self) -> usize {
        self.sections.iter().map(|s| s.paragraphs.len()).sum()
    }

    /// Check every structural invariant of the whole document
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for index in 0..self.sections.len() {
            self.validate_section(index)?;
        }
        Ok(())
    }

    /// Check the invariants of one section's subtree
    pub fn validate_section(&self, index: usize) -> Result<(), InvariantViolation> {
        let section = &self.sections[index];
        if section.paragraphs.is_empty() {
            return Err(InvariantViolation::EmptySection(index));
        }
        for (pi, paragraph) in section.paragraphs.iter().enumerate() {
            self.validate_paragraph(paragraph).map_err(|v| match v {
                InvariantViolation::EmptyParagraph { .. } => InvariantViolation::EmptyParagraph {
                    section: index,
                    paragraph: pi,
                },
                other => other,
            })?;
        }
        Ok(())
    }

    fn validate_paragraph(&self, paragraph: &Paragraph) -> Result<(), InvariantViolation> {
        if paragraph.items.is_empty() {
            return Err(InvariantViolation::EmptyParagraph {
                section: 0,
                paragraph: 0,
            });
        }
        if !self.styles.has_para_style(paragraph.style) {
            return Err(InvariantViolation::DanglingParaStyle(paragraph.style.0));
        }
        for item in &paragraph.items {
            match item {
                ParaItem::Run(run) => {
                    if !self.styles.has_char_style(run.style) {
                        return Err(InvariantViolation::DanglingCharStyle(run.style.0));
                    }
                }
                ParaItem::Table(table) => {
                    table
                        .validate_grid()
                        .map_err(InvariantViolation::TableGrid)?;
                    for cell in &table.cells {
                        for cell_para in &cell.paragraphs {
                            self.validate_paragraph(cell_para)?;
                        }
                    }
                }
                ParaItem::Image(image) => {
                    if !self.resources.contains(&image.resource) {
                        return Err(InvariantViolation::DanglingResource(image.resource.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Base64 serialization for opaque part bytes
mod opaque_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharStyleId, Image, ParaStyleId, Run};

    #[test]
    fn test_new_document_is_valid() {
        let doc = Document::new("Untitled", "ko");
        assert!(doc.validate().is_ok());
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].paragraphs.len(), 1);
    }

    #[test]
    fn test_dangling_char_style_detected() {
        let mut doc = Document::new("Untitled", "ko");
        doc.sections[0].paragraphs[0]
            .items
            .push(ParaItem::Run(Run::new("x", CharStyleId(99))));
        assert!(matches!(
            doc.validate(),
            Err(InvariantViolation::DanglingCharStyle(99))
        ));
    }

    #[test]
    fn test_dangling_resource_detected() {
        let mut doc = Document::new("Untitled", "ko");
        doc.sections[0].paragraphs[0].items.push(ParaItem::Image(Image {
            resource: "bin9".to_string(),
            width: 100,
            height: 100,
            inline: true,
        }));
        assert!(matches!(
            doc.validate(),
            Err(InvariantViolation::DanglingResource(_))
        ));
    }

    #[test]
    fn test_structural_equality_ignores_instance_id() {
        let doc = Document::new("Untitled", "ko");
        let mut other = doc.clone();
        other.id = Uuid::new_v4();
        assert_eq!(doc, other);
    }

    #[test]
    fn test_document_serialization() {
        let doc = Document::new("Serialization Test", "ko");
        let json = serde_json::to_string(&doc).unwrap();
        let deserialized: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, deserialized);
    }

    #[test]
    fn test_dangling_para_style_detected() {
        let mut doc = Document::new("Untitled", "ko");
        doc.sections[0].paragraphs[0].style = ParaStyleId(42);
        assert!(matches!(
            doc.validate(),
            Err(InvariantViolation::DanglingParaStyle(42))
        ));
    }
}
