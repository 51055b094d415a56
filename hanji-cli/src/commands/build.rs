//! Build command implementation

use anyhow::{Context, Result};
use hanji_core::construct::{build_from_blocks, BuildOptions, PageDims, RecognizedBlock};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Input file layout: per-page dimensions plus the recognized block stream
#[derive(Debug, Deserialize)]
pub(crate) struct BlocksFile {
    #[serde(default)]
    pub pages: Vec<PageDims>,
    pub blocks: Vec<RecognizedBlock>,
}

/// Build a package from a recognized-blocks JSON file
pub fn build(input: &str, output: &str, merge_gap: f32, title: &str, language: &str) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading blocks...");
    let raw = std::fs::read_to_string(Path::new(input))
        .with_context(|| format!("Failed to read input file: {}", input))?;
    let file: BlocksFile =
        serde_json::from_str(&raw).with_context(|| format!("Invalid blocks JSON: {}", input))?;

    pb.set_message("Assembling document...");
    let options = BuildOptions {
        merge_gap,
        title: title.to_string(),
        language: language.to_string(),
    };
    let block_count = file.blocks.len();
    let doc = build_from_blocks(file.blocks, &file.pages, &options)?;

    tracing::info!(
        blocks = block_count,
        sections = doc.sections.len(),
        paragraphs = doc.paragraph_count(),
        "assembled document"
    );

    pb.set_message("Writing package...");
    super::save_document(&doc, output)?;

    pb.finish_with_message(format!(
        "Built '{}' with {} sections -> {}",
        doc.metadata.title,
        doc.sections.len(),
        output
    ));
    Ok(())
}
