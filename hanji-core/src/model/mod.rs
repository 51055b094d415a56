//! Core types for the document Intermediate Representation (IR)

mod document;
mod metadata;
mod paragraph;
mod resource;
mod section;
mod style;
mod table;

pub use document::{Document, OpaquePart};
pub use metadata::Metadata;
pub use paragraph::{Image, ParaItem, Paragraph, Run};
pub use resource::{Resource, ResourceStore};
pub(crate) use resource::sniff_media_type;
pub use section::{Margins, PageGeometry, Section};
pub use style::{Alignment, CharStyle, CharStyleId, ParaStyle, ParaStyleId, StyleCatalog};
pub use table::{Table, TableCell};
