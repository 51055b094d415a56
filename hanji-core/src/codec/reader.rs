//! XML part parsing
//!
//! Event-driven parsing over each part. Parsing is strict: elements the
//! model does not understand are rejected rather than silently dropped, while
//! unknown attributes on modeled nodes are preserved verbatim in the node's
//! `extra` bag and re-emitted on encode.

use crate::error::CorruptPackage;
use crate::model::{
    Alignment, CharStyle, CharStyleId, Image, Metadata, PageGeometry, ParaItem, ParaStyle,
    ParaStyleId, Paragraph, Run, Section, StyleCatalog, Table, TableCell,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::str::FromStr;

type XmlReader<'a> = Reader<&'a [u8]>;
type PartResult<T> = std::result::Result<T, CorruptPackage>;

/// A part listed in the package manifest
pub(crate) struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

/// Parsed `Contents/content.hpf`
pub(crate) struct Manifest {
    pub metadata: Metadata,
    pub items: Vec<ManifestItem>,
    pub spine: Vec<String>,
}

/// A binary item declared in the header part
pub(crate) struct BinItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

fn malformed(part: &str, detail: impl std::fmt::Display) -> CorruptPackage {
    CorruptPackage::MalformedXml {
        part: part.to_string(),
        detail: detail.to_string(),
    }
}

fn unexpected(part: &str, e: &BytesStart) -> CorruptPackage {
    malformed(
        part,
        format!(
            "unexpected element <{}>",
            String::from_utf8_lossy(e.name().as_ref())
        ),
    )
}

/// All attributes of an element as `(name, value)` pairs
fn attrs(part: &str, e: &BytesStart) -> PartResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(part, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(part, err))?
            .to_string();
        out.push((key, value));
    }
    Ok(out)
}

fn parse_num<T: FromStr>(part: &str, key: &str, value: &str) -> PartResult<T> {
    value
        .parse()
        .map_err(|_| malformed(part, format!("attribute {key}={value:?} is not a number")))
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// `META-INF/container.xml` -> path of the manifest part
pub(crate) fn parse_container(bytes: &[u8]) -> PartResult<String> {
    const PART: &str = super::CONTAINER;
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(PART, e))?
        {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                for (key, value) in attrs(PART, &e)? {
                    if key == "full-path" {
                        return Ok(value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Err(malformed(PART, "no rootfile entry"))
}

/// `Contents/content.hpf` -> metadata, item list and spine
pub(crate) fn parse_manifest(part: &str, bytes: &[u8]) -> PartResult<Manifest> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut metadata = Metadata::default();
    let mut items = Vec::new();
    let mut spine = Vec::new();
    let mut capture: Option<&'static str> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(part, e))?
        {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"title" => capture = Some("title"),
                b"language" => capture = Some("language"),
                b"meta" => {
                    let mut name = String::new();
                    let mut content = String::new();
                    for (key, value) in attrs(part, &e)? {
                        match key.as_str() {
                            "name" => name = value,
                            "content" => content = value,
                            _ => {}
                        }
                    }
                    match name.as_str() {
                        "creator" => metadata.creator = Some(content),
                        "subject" => metadata.subject = Some(content),
                        "description" => metadata.description = Some(content),
                        "CreatedDate" => metadata.created = Some(content),
                        "ModifiedDate" => metadata.modified = Some(content),
                        _ => metadata.extra.push((name, content)),
                    }
                }
                b"item" => {
                    let mut item = ManifestItem {
                        id: String::new(),
                        href: String::new(),
                        media_type: String::new(),
                    };
                    for (key, value) in attrs(part, &e)? {
                        match key.as_str() {
                            "id" => item.id = value,
                            "href" => item.href = value,
                            "media-type" => item.media_type = value,
                            _ => {}
                        }
                    }
                    if item.id.is_empty() || item.href.is_empty() {
                        return Err(malformed(part, "manifest item without id/href"));
                    }
                    items.push(item);
                }
                b"itemref" => {
                    for (key, value) in attrs(part, &e)? {
                        if key == "idref" {
                            spine.push(value);
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(field) = capture {
                    let text = t.unescape().map_err(|e| malformed(part, e))?.to_string();
                    match field {
                        "title" => metadata.title = text,
                        _ => metadata.language = text,
                    }
                }
            }
            Event::End(_) => capture = None,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(Manifest {
        metadata,
        items,
        spine,
    })
}

/// `Contents/header.xml` -> style catalogs and binary-item declarations
pub(crate) fn parse_header(part: &str, bytes: &[u8]) -> PartResult<(StyleCatalog, Vec<BinItem>)> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut styles = StyleCatalog::new();
    let mut bin_items = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(part, e))?
        {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"charPr" => {
                    let mut id: Option<u32> = None;
                    let mut style = CharStyle::default();
                    for (key, value) in attrs(part, &e)? {
                        match key.as_str() {
                            "id" => id = Some(parse_num(part, "id", &value)?),
                            "face" => style.face = value,
                            "height" => style.size = parse_num(part, "height", &value)?,
                            "textColor" => style.color = value,
                            "bold" => style.bold = value == "1",
                            "italic" => style.italic = value == "1",
                            "underline" => style.underline = value == "1",
                            _ => {}
                        }
                    }
                    let id = id.ok_or_else(|| malformed(part, "charPr without id"))?;
                    styles.insert_char_style(id, style);
                }
                b"paraPr" => {
                    let mut id: Option<u32> = None;
                    let mut style = ParaStyle::default();
                    for (key, value) in attrs(part, &e)? {
                        match key.as_str() {
                            "id" => id = Some(parse_num(part, "id", &value)?),
                            "name" => style.name = value,
                            "align" => {
                                style.align = Alignment::parse(&value).ok_or_else(|| {
                                    malformed(part, format!("unknown alignment {value:?}"))
                                })?
                            }
                            "lineSpacing" => {
                                style.line_spacing = parse_num(part, "lineSpacing", &value)?
                            }
                            "marginLeft" => {
                                style.margin_left = parse_num(part, "marginLeft", &value)?
                            }
                            "marginRight" => {
                                style.margin_right = parse_num(part, "marginRight", &value)?
                            }
                            "indent" => style.indent = parse_num(part, "indent", &value)?,
                            "spaceBefore" => {
                                style.space_before = parse_num(part, "spaceBefore", &value)?
                            }
                            "spaceAfter" => {
                                style.space_after = parse_num(part, "spaceAfter", &value)?
                            }
                            _ => {}
                        }
                    }
                    let id = id.ok_or_else(|| malformed(part, "paraPr without id"))?;
                    styles.insert_para_style(id, style);
                }
                b"binItem" => {
                    let mut id = String::new();
                    let mut href = String::new();
                    let mut media_type = String::new();
                    for (key, value) in attrs(part, &e)? {
                        match key.as_str() {
                            "id" => id = value,
                            "href" => href = value,
                            "mediaType" => media_type = value,
                            _ => {}
                        }
                    }
                    if id.is_empty() || href.is_empty() {
                        return Err(malformed(part, "binItem without id/href"));
                    }
                    bin_items.push(BinItem {
                        id,
                        href,
                        media_type,
                    });
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if styles.char_style_count() == 0 || styles.para_style_count() == 0 {
        return Err(malformed(part, "style catalogs are empty"));
    }
    Ok((styles, bin_items))
}

/// `Contents/section{N}.xml` -> one section
pub(crate) fn parse_section(part: &str, bytes: &[u8]) -> PartResult<Section> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut geometry = PageGeometry::default();
    let mut extra = Vec::new();
    let mut paragraphs = Vec::new();
    let mut seen_root = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(part, e))?
        {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sec" => {
                    seen_root = true;
                    for (key, value) in attrs(part, &e)? {
                        if !key.starts_with("xmlns") {
                            extra.push((key, value));
                        }
                    }
                }
                b"secPr" => {
                    geometry = parse_geometry(part, &e)?;
                    expect_end(&mut reader, part, b"secPr")?;
                }
                b"p" => paragraphs.push(parse_paragraph(&mut reader, part, &e)?),
                _ => return Err(unexpected(part, &e)),
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"secPr" => geometry = parse_geometry(part, &e)?,
                b"p" => paragraphs.push(empty_paragraph(part, &e)?),
                _ => return Err(unexpected(part, &e)),
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| malformed(part, e))?;
                if !is_whitespace(&text) {
                    return Err(malformed(part, "stray text outside a paragraph"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(malformed(part, "no section root element"));
    }
    let mut section = Section::with_paragraphs(geometry, paragraphs);
    section.extra = extra;
    Ok(section)
}

fn parse_geometry(part: &str, e: &BytesStart) -> PartResult<PageGeometry> {
    let mut g = PageGeometry::default();
    for (key, value) in attrs(part, e)? {
        match key.as_str() {
            "pageWidth" => g.width = parse_num(part, "pageWidth", &value)?,
            "pageHeight" => g.height = parse_num(part, "pageHeight", &value)?,
            "landscape" => g.landscape = value == "1",
            "cols" => g.columns = parse_num(part, "cols", &value)?,
            "marginLeft" => g.margins.left = parse_num(part, "marginLeft", &value)?,
            "marginRight" => g.margins.right = parse_num(part, "marginRight", &value)?,
            "marginTop" => g.margins.top = parse_num(part, "marginTop", &value)?,
            "marginBottom" => g.margins.bottom = parse_num(part, "marginBottom", &value)?,
            "headerMargin" => g.margins.header = parse_num(part, "headerMargin", &value)?,
            "footerMargin" => g.margins.footer = parse_num(part, "footerMargin", &value)?,
            k if k.starts_with("xmlns") => {}
            _ => g.extra.push((key, value)),
        }
    }
    Ok(g)
}

/// Consume events up to the closing tag, permitting only whitespace
fn expect_end(reader: &mut XmlReader, part: &str, name: &[u8]) -> PartResult<()> {
    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(part, e))?
        {
            Event::End(e) if e.local_name().as_ref() == name => return Ok(()),
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| malformed(part, e))?;
                if !is_whitespace(&text) {
                    return Err(malformed(part, "unexpected text content"));
                }
            }
            Event::Start(e) | Event::Empty(e) => return Err(unexpected(part, &e)),
            Event::Eof => return Err(malformed(part, "unexpected end of part")),
            _ => {}
        }
        buf.clear();
    }
}

fn paragraph_attrs(
    part: &str,
    e: &BytesStart,
) -> PartResult<(ParaStyleId, bool, bool, Vec<(String, String)>)> {
    let mut style = ParaStyleId(0);
    let mut page_break = false;
    let mut column_break = false;
    let mut extra = Vec::new();
    for (key, value) in attrs(part, e)? {
        match key.as_str() {
            "paraPrIDRef" => style = ParaStyleId(parse_num(part, "paraPrIDRef", &value)?),
            "pageBreak" => page_break = value == "1",
            "columnBreak" => column_break = value == "1",
            k if k.starts_with("xmlns") => {}
            _ => extra.push((key, value)),
        }
    }
    Ok((style, page_break, column_break, extra))
}

fn empty_paragraph(part: &str, e: &BytesStart) -> PartResult<Paragraph> {
    let (style, page_break, column_break, extra) = paragraph_attrs(part, e)?;
    let mut paragraph = Paragraph::empty(style, CharStyleId(0));
    paragraph.page_break = page_break;
    paragraph.column_break = column_break;
    paragraph.extra = extra;
    Ok(paragraph)
}

fn parse_paragraph(reader: &mut XmlReader, part: &str, e: &BytesStart) -> PartResult<Paragraph> {
    let (style, page_break, column_break, extra) = paragraph_attrs(part, e)?;
    let mut items = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|err| malformed(part, err))?
        {
            Event::Start(el) => match el.local_name().as_ref() {
                b"run" => parse_run(reader, part, &el, &mut items)?,
                _ => return Err(unexpected(part, &el)),
            },
            Event::Empty(el) => match el.local_name().as_ref() {
                b"run" => items.push(ParaItem::Run(Run::empty(run_style(part, &el)?))),
                _ => return Err(unexpected(part, &el)),
            },
            Event::End(el) if el.local_name().as_ref() == b"p" => break,
            Event::Text(t) => {
                let text = t.unescape().map_err(|err| malformed(part, err))?;
                if !is_whitespace(&text) {
                    return Err(malformed(part, "stray text outside a run"));
                }
            }
            Event::Eof => return Err(malformed(part, "unexpected end of part")),
            _ => {}
        }
        buf.clear();
    }

    if items.is_empty() {
        items.push(ParaItem::Run(Run::empty(CharStyleId(0))));
    }
    let mut paragraph = Paragraph::with_items(style, items);
    paragraph.page_break = page_break;
    paragraph.column_break = column_break;
    paragraph.extra = extra;
    Ok(paragraph)
}

fn run_style(part: &str, e: &BytesStart) -> PartResult<CharStyleId> {
    for (key, value) in attrs(part, e)? {
        if key == "charPrIDRef" {
            return Ok(CharStyleId(parse_num(part, "charPrIDRef", &value)?));
        }
    }
    Ok(CharStyleId(0))
}

/// Parse one `<hp:run>` into content items
///
/// A run holding only text produces a single `Run`; embedded tables/images
/// become items of their own, with any text preceding them flushed first.
fn parse_run(
    reader: &mut XmlReader,
    part: &str,
    e: &BytesStart,
    items: &mut Vec<ParaItem>,
) -> PartResult<()> {
    let style = run_style(part, e)?;
    let mut pending: Option<String> = None;
    let mut produced = false;
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|err| malformed(part, err))?
        {
            Event::Start(el) => match el.local_name().as_ref() {
                b"t" => {
                    in_text = true;
                    pending.get_or_insert_with(String::new);
                }
                b"tbl" => {
                    flush_text(&mut pending, style, items, &mut produced);
                    items.push(ParaItem::Table(parse_table(reader, part, &el)?));
                    produced = true;
                }
                b"pic" => {
                    flush_text(&mut pending, style, items, &mut produced);
                    items.push(ParaItem::Image(parse_image(part, &el)?));
                    produced = true;
                    expect_end(reader, part, b"pic")?;
                }
                _ => return Err(unexpected(part, &el)),
            },
            Event::Empty(el) => match el.local_name().as_ref() {
                b"lineBreak" => pending.get_or_insert_with(String::new).push('\n'),
                b"pic" => {
                    flush_text(&mut pending, style, items, &mut produced);
                    items.push(ParaItem::Image(parse_image(part, &el)?));
                    produced = true;
                }
                b"t" => {
                    pending.get_or_insert_with(String::new);
                }
                _ => return Err(unexpected(part, &el)),
            },
            Event::End(el) => match el.local_name().as_ref() {
                b"t" => in_text = false,
                b"run" => break,
                _ => return Err(malformed(part, "mismatched closing tag in run")),
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|err| malformed(part, err))?;
                if in_text {
                    pending.get_or_insert_with(String::new).push_str(&text);
                } else if !is_whitespace(&text) {
                    return Err(malformed(part, "stray text outside a text element"));
                }
            }
            Event::Eof => return Err(malformed(part, "unexpected end of part")),
            _ => {}
        }
        buf.clear();
    }

    if let Some(text) = pending {
        if !text.is_empty() || !produced {
            items.push(ParaItem::Run(Run::new(text, style)));
        }
    } else if !produced {
        items.push(ParaItem::Run(Run::empty(style)));
    }
    Ok(())
}

fn flush_text(
    pending: &mut Option<String>,
    style: CharStyleId,
    items: &mut Vec<ParaItem>,
    produced: &mut bool,
) {
    if let Some(text) = pending.take() {
        if !text.is_empty() {
            items.push(ParaItem::Run(Run::new(text, style)));
            *produced = true;
        }
    }
}

fn parse_table(reader: &mut XmlReader, part: &str, e: &BytesStart) -> PartResult<Table> {
    let mut rows = 0u32;
    let mut cols = 0u32;
    for (key, value) in attrs(part, e)? {
        match key.as_str() {
            "rowCnt" => rows = parse_num(part, "rowCnt", &value)?,
            "colCnt" => cols = parse_num(part, "colCnt", &value)?,
            _ => {}
        }
    }

    let mut widths = Vec::new();
    let mut cells = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|err| malformed(part, err))?
        {
            Event::Start(el) => match el.local_name().as_ref() {
                b"tr" => {}
                b"tc" => cells.push(parse_cell(reader, part, &el)?),
                _ => return Err(unexpected(part, &el)),
            },
            Event::Empty(el) => match el.local_name().as_ref() {
                b"colSz" => {
                    for (key, value) in attrs(part, &el)? {
                        if key == "width" {
                            widths.push(parse_num(part, "width", &value)?);
                        }
                    }
                }
                _ => return Err(unexpected(part, &el)),
            },
            Event::End(el) if el.local_name().as_ref() == b"tbl" => break,
            Event::End(_) => {}
            Event::Text(t) => {
                let text = t.unescape().map_err(|err| malformed(part, err))?;
                if !is_whitespace(&text) {
                    return Err(malformed(part, "stray text inside a table"));
                }
            }
            Event::Eof => return Err(malformed(part, "unexpected end of part")),
            _ => {}
        }
        buf.clear();
    }

    Ok(Table {
        rows,
        cols,
        cells,
        col_widths: (!widths.is_empty()).then_some(widths),
    })
}

fn parse_cell(reader: &mut XmlReader, part: &str, e: &BytesStart) -> PartResult<TableCell> {
    let mut cell = TableCell::new(0, 0, Vec::new());
    for (key, value) in attrs(part, e)? {
        match key.as_str() {
            "rowAddr" => cell.row = parse_num(part, "rowAddr", &value)?,
            "colAddr" => cell.col = parse_num(part, "colAddr", &value)?,
            "rowSpan" => cell.row_span = parse_num(part, "rowSpan", &value)?,
            "colSpan" => cell.col_span = parse_num(part, "colSpan", &value)?,
            _ => {}
        }
    }

    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|err| malformed(part, err))?
        {
            Event::Start(el) => match el.local_name().as_ref() {
                b"subList" => {}
                b"p" => cell.paragraphs.push(parse_paragraph(reader, part, &el)?),
                _ => return Err(unexpected(part, &el)),
            },
            Event::Empty(el) => match el.local_name().as_ref() {
                b"p" => cell.paragraphs.push(empty_paragraph(part, &el)?),
                _ => return Err(unexpected(part, &el)),
            },
            Event::End(el) if el.local_name().as_ref() == b"tc" => break,
            Event::End(_) => {}
            Event::Text(t) => {
                let text = t.unescape().map_err(|err| malformed(part, err))?;
                if !is_whitespace(&text) {
                    return Err(malformed(part, "stray text inside a table cell"));
                }
            }
            Event::Eof => return Err(malformed(part, "unexpected end of part")),
            _ => {}
        }
        buf.clear();
    }

    if cell.paragraphs.is_empty() {
        cell.paragraphs
            .push(Paragraph::empty(ParaStyleId(0), CharStyleId(0)));
    }
    Ok(cell)
}

fn parse_image(part: &str, e: &BytesStart) -> PartResult<Image> {
    let mut image = Image {
        resource: String::new(),
        width: 0,
        height: 0,
        inline: true,
    };
    for (key, value) in attrs(part, e)? {
        match key.as_str() {
            "binaryItemIDRef" => image.resource = value,
            "width" => image.width = parse_num(part, "width", &value)?,
            "height" => image.height = parse_num(part, "height", &value)?,
            "treatAsChar" => image.inline = value == "1",
            _ => {}
        }
    }
    if image.resource.is_empty() {
        return Err(malformed(part, "pic without binaryItemIDRef"));
    }
    Ok(image)
}
