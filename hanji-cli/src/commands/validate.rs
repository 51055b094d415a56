//! Validate command implementation

use anyhow::{bail, Result};
use hanji_core::codec;

/// Validate a package; `strict` additionally checks a lossless re-encode
pub fn validate(input: &str, strict: bool) -> Result<()> {
    let doc = super::load_document(input)?;
    doc.validate().map_err(hanji_core::HanjiError::from)?;

    if strict {
        let bytes = codec::encode(&doc)?;
        let decoded = codec::decode(&bytes)?;
        if decoded != doc {
            bail!("package does not re-encode losslessly");
        }
    }

    println!(
        "{}: OK ({} sections, {} paragraphs)",
        input,
        doc.sections.len(),
        doc.paragraph_count()
    );
    Ok(())
}
