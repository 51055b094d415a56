//! Search command implementation

use anyhow::Result;
use hanji_core::index::TextIndex;
use hanji_core::query::{self, Match};
use hanji_core::HanjiError;

/// Search document text and print matches in document order
pub fn search(input: &str, query_str: &str, regex: bool, ignore_case: bool, json: bool) -> Result<()> {
    let doc = super::load_document(input)?;
    let index = TextIndex::build(&doc);

    let matches: Vec<Match> = if regex {
        query::find_pattern(&doc, &index, query_str)
            .map_err(HanjiError::from)?
            .collect()
    } else {
        query::find_literal(&doc, &index, query_str, !ignore_case).collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    for m in &matches {
        let place = match &m.location.cell {
            Some(cell) => format!(
                "s{} p{} cell({},{})",
                m.location.section, m.location.paragraph, cell.row, cell.col
            ),
            None => format!("s{} p{}", m.location.section, m.location.paragraph),
        };
        println!("{} (page ~{}): {}", place, m.page_estimate, m.context);
    }
    println!("{} match(es)", matches.len());
    Ok(())
}
