//! Text command implementation

use anyhow::Result;
use hanji_core::query;

/// Print document text, optionally narrowed to a section or paragraph
pub fn text(input: &str, section: Option<usize>, paragraph: Option<usize>) -> Result<()> {
    let doc = super::load_document(input)?;

    match (section, paragraph) {
        (Some(section), Some(paragraph)) => {
            println!("{}", query::paragraph_text(&doc, section, paragraph).map_err(hanji_core::HanjiError::from)?);
        }
        (Some(section), None) => {
            for info in query::paragraphs(&doc, section).map_err(hanji_core::HanjiError::from)? {
                println!("{}", info.text);
            }
        }
        _ => println!("{}", query::all_text(&doc)),
    }
    Ok(())
}
