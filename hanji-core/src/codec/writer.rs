//! XML part generation
//!
//! Parts are emitted through the quick-xml event writer without pretty
//! printing; consumers and the codec's own reader never rely on
//! inter-element whitespace.

use super::{bin_part, section_part, MANIFEST, NS_DC, NS_HEAD, NS_OCF, NS_OPF, NS_PARA, NS_SECTION};
use crate::model::{Document, Image, ParaItem, Paragraph, Run, Section, Table};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

type XmlWriter = Writer<Cursor<Vec<u8>>>;
type XmlResult<T> = Result<T, quick_xml::Error>;

fn new_part() -> XmlResult<XmlWriter> {
    let mut w = Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(w)
}

/// `META-INF/container.xml`: locator for the package manifest
pub(crate) fn write_container() -> XmlResult<Vec<u8>> {
    let mut w = new_part()?;

    let mut container = BytesStart::new("ocf:container");
    container.push_attribute(("xmlns:ocf", NS_OCF));
    w.write_event(Event::Start(container))?;
    w.write_event(Event::Start(BytesStart::new("ocf:rootfiles")))?;

    let mut rootfile = BytesStart::new("ocf:rootfile");
    rootfile.push_attribute(("full-path", MANIFEST));
    rootfile.push_attribute(("media-type", "application/hwpml-package+xml"));
    w.write_event(Event::Empty(rootfile))?;

    w.write_event(Event::End(BytesEnd::new("ocf:rootfiles")))?;
    w.write_event(Event::End(BytesEnd::new("ocf:container")))?;
    Ok(w.into_inner().into_inner())
}

/// `Contents/content.hpf`: metadata, part listing and section spine
pub(crate) fn write_manifest(doc: &Document) -> XmlResult<Vec<u8>> {
    let mut w = new_part()?;

    let mut package = BytesStart::new("opf:package");
    package.push_attribute(("xmlns:opf", NS_OPF));
    package.push_attribute(("xmlns:dc", NS_DC));
    package.push_attribute(("version", "1.0"));
    w.write_event(Event::Start(package))?;

    w.write_event(Event::Start(BytesStart::new("opf:metadata")))?;
    text_element(&mut w, "dc:title", &doc.metadata.title)?;
    text_element(&mut w, "dc:language", &doc.metadata.language)?;
    let metas = [
        ("creator", &doc.metadata.creator),
        ("subject", &doc.metadata.subject),
        ("description", &doc.metadata.description),
        ("CreatedDate", &doc.metadata.created),
        ("ModifiedDate", &doc.metadata.modified),
    ];
    for (name, value) in metas {
        if let Some(value) = value {
            meta_element(&mut w, name, value)?;
        }
    }
    for (name, value) in &doc.metadata.extra {
        meta_element(&mut w, name, value)?;
    }
    w.write_event(Event::End(BytesEnd::new("opf:metadata")))?;

    w.write_event(Event::Start(BytesStart::new("opf:manifest")))?;
    manifest_item(&mut w, "header", super::HEADER, "application/xml", false)?;
    for i in 0..doc.sections.len() {
        manifest_item(
            &mut w,
            &format!("section{}", i),
            &section_part(i),
            "application/xml",
            false,
        )?;
    }
    for (id, resource) in doc.resources.iter() {
        manifest_item(&mut w, id, &bin_part(id, &resource.media_type), &resource.media_type, true)?;
    }
    w.write_event(Event::End(BytesEnd::new("opf:manifest")))?;

    w.write_event(Event::Start(BytesStart::new("opf:spine")))?;
    for i in 0..doc.sections.len() {
        let mut itemref = BytesStart::new("opf:itemref");
        itemref.push_attribute(("idref", format!("section{}", i).as_str()));
        w.write_event(Event::Empty(itemref))?;
    }
    w.write_event(Event::End(BytesEnd::new("opf:spine")))?;

    w.write_event(Event::End(BytesEnd::new("opf:package")))?;
    Ok(w.into_inner().into_inner())
}

fn text_element(w: &mut XmlWriter, name: &str, text: &str) -> XmlResult<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn meta_element(w: &mut XmlWriter, name: &str, content: &str) -> XmlResult<()> {
    let mut meta = BytesStart::new("opf:meta");
    meta.push_attribute(("name", name));
    meta.push_attribute(("content", content));
    w.write_event(Event::Empty(meta))?;
    Ok(())
}

fn manifest_item(
    w: &mut XmlWriter,
    id: &str,
    href: &str,
    media_type: &str,
    embedded: bool,
) -> XmlResult<()> {
    let mut item = BytesStart::new("opf:item");
    item.push_attribute(("id", id));
    item.push_attribute(("href", href));
    item.push_attribute(("media-type", media_type));
    if embedded {
        item.push_attribute(("isEmbeded", "1"));
    }
    w.write_event(Event::Empty(item))?;
    Ok(())
}

/// `Contents/header.xml`: style catalogs and the binary-item list
pub(crate) fn write_header(doc: &Document) -> XmlResult<Vec<u8>> {
    let mut w = new_part()?;

    let mut head = BytesStart::new("hh:head");
    head.push_attribute(("xmlns:hh", NS_HEAD));
    head.push_attribute(("version", "1.5"));
    head.push_attribute(("secCnt", doc.sections.len().to_string().as_str()));
    w.write_event(Event::Start(head))?;
    w.write_event(Event::Start(BytesStart::new("hh:refList")))?;

    let mut char_props = BytesStart::new("hh:charProperties");
    char_props.push_attribute(("itemCnt", doc.styles.char_style_count().to_string().as_str()));
    w.write_event(Event::Start(char_props))?;
    for (id, style) in doc.styles.char_styles() {
        let mut el = BytesStart::new("hh:charPr");
        el.push_attribute(("id", id.0.to_string().as_str()));
        el.push_attribute(("face", style.face.as_str()));
        el.push_attribute(("height", style.size.to_string().as_str()));
        el.push_attribute(("textColor", style.color.as_str()));
        el.push_attribute(("bold", flag(style.bold)));
        el.push_attribute(("italic", flag(style.italic)));
        el.push_attribute(("underline", flag(style.underline)));
        w.write_event(Event::Empty(el))?;
    }
    w.write_event(Event::End(BytesEnd::new("hh:charProperties")))?;

    let mut para_props = BytesStart::new("hh:paraProperties");
    para_props.push_attribute(("itemCnt", doc.styles.para_style_count().to_string().as_str()));
    w.write_event(Event::Start(para_props))?;
    for (id, style) in doc.styles.para_styles() {
        let mut el = BytesStart::new("hh:paraPr");
        el.push_attribute(("id", id.0.to_string().as_str()));
        el.push_attribute(("name", style.name.as_str()));
        el.push_attribute(("align", style.align.as_str()));
        el.push_attribute(("lineSpacing", style.line_spacing.to_string().as_str()));
        el.push_attribute(("marginLeft", style.margin_left.to_string().as_str()));
        el.push_attribute(("marginRight", style.margin_right.to_string().as_str()));
        el.push_attribute(("indent", style.indent.to_string().as_str()));
        el.push_attribute(("spaceBefore", style.space_before.to_string().as_str()));
        el.push_attribute(("spaceAfter", style.space_after.to_string().as_str()));
        w.write_event(Event::Empty(el))?;
    }
    w.write_event(Event::End(BytesEnd::new("hh:paraProperties")))?;

    if !doc.resources.is_empty() {
        let mut bin_list = BytesStart::new("hh:binDataList");
        bin_list.push_attribute(("itemCnt", doc.resources.len().to_string().as_str()));
        w.write_event(Event::Start(bin_list))?;
        for (id, resource) in doc.resources.iter() {
            let mut el = BytesStart::new("hh:binItem");
            el.push_attribute(("id", id.as_str()));
            el.push_attribute(("href", bin_part(id, &resource.media_type).as_str()));
            el.push_attribute(("mediaType", resource.media_type.as_str()));
            el.push_attribute(("isEmbeded", "1"));
            w.write_event(Event::Empty(el))?;
        }
        w.write_event(Event::End(BytesEnd::new("hh:binDataList")))?;
    }

    w.write_event(Event::End(BytesEnd::new("hh:refList")))?;
    w.write_event(Event::End(BytesEnd::new("hh:head")))?;
    Ok(w.into_inner().into_inner())
}

/// `Contents/section{N}.xml`: one section's page setup and paragraphs
pub(crate) fn write_section(section: &Section) -> XmlResult<Vec<u8>> {
    let mut w = new_part()?;

    let mut sec = BytesStart::new("hs:sec");
    sec.push_attribute(("xmlns:hs", NS_SECTION));
    sec.push_attribute(("xmlns:hp", NS_PARA));
    for (key, value) in &section.extra {
        sec.push_attribute((key.as_str(), value.as_str()));
    }
    w.write_event(Event::Start(sec))?;

    let g = &section.geometry;
    let mut sec_pr = BytesStart::new("hs:secPr");
    sec_pr.push_attribute(("pageWidth", g.width.to_string().as_str()));
    sec_pr.push_attribute(("pageHeight", g.height.to_string().as_str()));
    sec_pr.push_attribute(("landscape", flag(g.landscape)));
    sec_pr.push_attribute(("cols", g.columns.to_string().as_str()));
    sec_pr.push_attribute(("marginLeft", g.margins.left.to_string().as_str()));
    sec_pr.push_attribute(("marginRight", g.margins.right.to_string().as_str()));
    sec_pr.push_attribute(("marginTop", g.margins.top.to_string().as_str()));
    sec_pr.push_attribute(("marginBottom", g.margins.bottom.to_string().as_str()));
    sec_pr.push_attribute(("headerMargin", g.margins.header.to_string().as_str()));
    sec_pr.push_attribute(("footerMargin", g.margins.footer.to_string().as_str()));
    for (key, value) in &g.extra {
        sec_pr.push_attribute((key.as_str(), value.as_str()));
    }
    w.write_event(Event::Empty(sec_pr))?;

    for paragraph in &section.paragraphs {
        write_paragraph(&mut w, paragraph)?;
    }

    w.write_event(Event::End(BytesEnd::new("hs:sec")))?;
    Ok(w.into_inner().into_inner())
}

fn write_paragraph(w: &mut XmlWriter, paragraph: &Paragraph) -> XmlResult<()> {
    let mut p = BytesStart::new("hp:p");
    p.push_attribute(("paraPrIDRef", paragraph.style.0.to_string().as_str()));
    p.push_attribute(("pageBreak", flag(paragraph.page_break)));
    p.push_attribute(("columnBreak", flag(paragraph.column_break)));
    for (key, value) in &paragraph.extra {
        p.push_attribute((key.as_str(), value.as_str()));
    }
    w.write_event(Event::Start(p))?;

    for item in &paragraph.items {
        match item {
            ParaItem::Run(run) => write_run(w, run)?,
            ParaItem::Table(table) => {
                let mut wrap = BytesStart::new("hp:run");
                wrap.push_attribute(("charPrIDRef", "0"));
                w.write_event(Event::Start(wrap))?;
                write_table(w, table)?;
                w.write_event(Event::End(BytesEnd::new("hp:run")))?;
            }
            ParaItem::Image(image) => {
                let mut wrap = BytesStart::new("hp:run");
                wrap.push_attribute(("charPrIDRef", "0"));
                w.write_event(Event::Start(wrap))?;
                write_image(w, image)?;
                w.write_event(Event::End(BytesEnd::new("hp:run")))?;
            }
        }
    }

    w.write_event(Event::End(BytesEnd::new("hp:p")))?;
    Ok(())
}

fn write_run(w: &mut XmlWriter, run: &Run) -> XmlResult<()> {
    let mut el = BytesStart::new("hp:run");
    el.push_attribute(("charPrIDRef", run.style.0.to_string().as_str()));
    if run.text.is_empty() {
        w.write_event(Event::Empty(el))?;
        return Ok(());
    }
    w.write_event(Event::Start(el))?;
    // In-paragraph newlines become explicit line break elements
    for (i, chunk) in run.text.split('\n').enumerate() {
        if i > 0 {
            w.write_event(Event::Empty(BytesStart::new("hp:lineBreak")))?;
        }
        if !chunk.is_empty() {
            text_element(w, "hp:t", chunk)?;
        }
    }
    w.write_event(Event::End(BytesEnd::new("hp:run")))?;
    Ok(())
}

fn write_table(w: &mut XmlWriter, table: &Table) -> XmlResult<()> {
    let mut tbl = BytesStart::new("hp:tbl");
    tbl.push_attribute(("rowCnt", table.rows.to_string().as_str()));
    tbl.push_attribute(("colCnt", table.cols.to_string().as_str()));
    w.write_event(Event::Start(tbl))?;

    if let Some(widths) = &table.col_widths {
        for width in widths {
            let mut col = BytesStart::new("hp:colSz");
            col.push_attribute(("width", width.to_string().as_str()));
            w.write_event(Event::Empty(col))?;
        }
    }

    for row in 0..table.rows {
        w.write_event(Event::Start(BytesStart::new("hp:tr")))?;
        let mut row_cells: Vec<_> = table.cells.iter().filter(|c| c.row == row).collect();
        row_cells.sort_by_key(|c| c.col);
        for cell in row_cells {
            let mut tc = BytesStart::new("hp:tc");
            tc.push_attribute(("rowAddr", cell.row.to_string().as_str()));
            tc.push_attribute(("colAddr", cell.col.to_string().as_str()));
            tc.push_attribute(("rowSpan", cell.row_span.to_string().as_str()));
            tc.push_attribute(("colSpan", cell.col_span.to_string().as_str()));
            w.write_event(Event::Start(tc))?;
            w.write_event(Event::Start(BytesStart::new("hp:subList")))?;
            for paragraph in &cell.paragraphs {
                write_paragraph(w, paragraph)?;
            }
            w.write_event(Event::End(BytesEnd::new("hp:subList")))?;
            w.write_event(Event::End(BytesEnd::new("hp:tc")))?;
        }
        w.write_event(Event::End(BytesEnd::new("hp:tr")))?;
    }

    w.write_event(Event::End(BytesEnd::new("hp:tbl")))?;
    Ok(())
}

fn write_image(w: &mut XmlWriter, image: &Image) -> XmlResult<()> {
    let mut pic = BytesStart::new("hp:pic");
    pic.push_attribute(("binaryItemIDRef", image.resource.as_str()));
    pic.push_attribute(("width", image.width.to_string().as_str()));
    pic.push_attribute(("height", image.height.to_string().as_str()));
    pic.push_attribute(("treatAsChar", flag(image.inline)));
    w.write_event(Event::Empty(pic))?;
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
