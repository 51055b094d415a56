//! Hanji Core Library
//!
//! This crate provides the document Intermediate Representation (IR) and its
//! query/edit engine for HWPX-style word-processing packages: the codec that
//! parses a package (zip of XML parts plus a manifest) into the IR and
//! serializes it back, the text index behind literal and pattern search, the
//! mutation operations that keep every structural invariant intact, and the
//! construction API that assembles a package from recognized text blocks.
//!
//! Transport adapters (CLI, HTTP service) live in sibling crates and bind to
//! the operation surface exposed here, adding no semantics of their own.

pub mod codec;
pub mod construct;
pub mod edit;
pub mod error;
pub mod handle;
pub mod index;
pub mod model;
pub mod provider;
pub mod query;

pub use error::{
    CorruptPackage, HanjiError, InvariantViolation, NotFound, PatternError, ProviderError, Result,
};
pub use handle::DocumentHandle;
pub use model::{
    Alignment, CharStyle, CharStyleId, Document, Image, Margins, Metadata, OpaquePart,
    PageGeometry, ParaItem, ParaStyle, ParaStyleId, Paragraph, Resource, ResourceStore, Run,
    Section, StyleCatalog, Table, TableCell,
};
