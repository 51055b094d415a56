//! Info command implementation

use anyhow::Result;
use hanji_core::query;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SectionSummary {
    index: usize,
    paragraphs: usize,
    columns: u16,
    landscape: bool,
}

#[derive(Debug, Serialize)]
struct InfoSummary {
    title: String,
    language: String,
    creator: Option<String>,
    sections: Vec<SectionSummary>,
    paragraphs: usize,
    tables: usize,
    images: usize,
    resources: usize,
    page_breaks: usize,
}

/// Display information about a package
pub fn info(input: &str, json: bool) -> Result<()> {
    let doc = super::load_document(input)?;

    let summary = InfoSummary {
        title: doc.metadata.title.clone(),
        language: doc.metadata.language.clone(),
        creator: doc.metadata.creator.clone(),
        sections: doc
            .sections
            .iter()
            .enumerate()
            .map(|(index, s)| SectionSummary {
                index,
                paragraphs: s.paragraphs.len(),
                columns: s.geometry.columns,
                landscape: s.geometry.landscape,
            })
            .collect(),
        paragraphs: doc.paragraph_count(),
        tables: query::tables(&doc).len(),
        images: query::images(&doc).len(),
        resources: doc.resources.len(),
        page_breaks: query::page_breaks(&doc).len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Title:       {}", summary.title);
    println!("Language:    {}", summary.language);
    if let Some(creator) = &summary.creator {
        println!("Creator:     {}", creator);
    }
    println!("Sections:    {}", summary.sections.len());
    for section in &summary.sections {
        println!(
            "  [{}] {} paragraphs, {} column(s){}",
            section.index,
            section.paragraphs,
            section.columns,
            if section.landscape { ", landscape" } else { "" }
        );
    }
    println!("Paragraphs:  {}", summary.paragraphs);
    println!("Tables:      {}", summary.tables);
    println!("Images:      {}", summary.images);
    println!("Resources:   {}", summary.resources);
    println!("Page breaks: {}", summary.page_breaks);
    Ok(())
}
