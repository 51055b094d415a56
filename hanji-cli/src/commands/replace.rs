//! Replace command implementation

use anyhow::Result;
use hanji_core::edit::{self, ReplaceCount, ReplaceMode, Scope};

/// Replace text and write the edited package
pub fn replace(
    input: &str,
    output: &str,
    target: &str,
    replacement: &str,
    regex: bool,
    first: bool,
) -> Result<()> {
    let mut doc = super::load_document(input)?;

    let mode = if regex {
        ReplaceMode::Regex
    } else {
        ReplaceMode::Literal
    };
    let count = if first {
        ReplaceCount::First
    } else {
        ReplaceCount::All
    };

    let replaced = edit::replace_text(&mut doc, Scope::Document, target, replacement, mode, count)?;
    super::save_document(&doc, output)?;

    println!("{} replacement(s) -> {}", replaced, output);
    Ok(())
}
