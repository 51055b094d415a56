//! CLI command implementations
//!
//! Thin wrappers over hanji-core operations: marshal arguments, call the
//! core, print results. No document semantics live here.

mod batch;
mod build;
mod info;
mod replace;
mod search;
mod text;
mod validate;

pub use batch::batch;
pub use build::build;
pub use info::info;
pub use replace::replace;
pub use search::search;
pub use text::text;
pub use validate::validate;

use anyhow::{Context, Result};
use hanji_core::codec;
use hanji_core::Document;
use std::path::Path;

/// Decode a package from disk
pub(crate) fn load_document(path: &str) -> Result<Document> {
    let bytes = std::fs::read(Path::new(path))
        .with_context(|| format!("Failed to read input file: {}", path))?;
    let doc = codec::decode(&bytes)?;
    Ok(doc)
}

/// Encode a document and write the package to disk
pub(crate) fn save_document(doc: &Document, path: &str) -> Result<()> {
    let bytes = codec::encode(doc)?;
    std::fs::write(Path::new(path), bytes)
        .with_context(|| format!("Failed to write output file: {}", path))?;
    Ok(())
}
