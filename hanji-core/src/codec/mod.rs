//! Package codec: archive layout, decode and encode
//!
//! A package is a zip archive holding a stored `mimetype` entry, a
//! `META-INF/container.xml` locator, an OPF-style manifest at
//! `Contents/content.hpf`, the style/resource catalog part
//! `Contents/header.xml`, one `Contents/section{N}.xml` part per section and
//! binary resources under `BinData/`. Entries the model does not interpret
//! are carried through decode/encode verbatim as opaque parts.

mod reader;
mod writer;

use crate::error::{CorruptPackage, HanjiError, InvariantViolation, Result};
use crate::model::{Document, OpaquePart, Resource, ResourceStore, Section};
use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub(crate) const MIMETYPE: &str = "mimetype";
pub(crate) const MIMETYPE_VALUE: &str = "application/hwp+zip";
pub(crate) const CONTAINER: &str = "META-INF/container.xml";
pub(crate) const MANIFEST: &str = "Contents/content.hpf";
pub(crate) const HEADER: &str = "Contents/header.xml";
pub(crate) const BIN_DIR: &str = "BinData";

pub(crate) const NS_SECTION: &str = "http://www.hancom.co.kr/hwpml/2011/section";
pub(crate) const NS_PARA: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
pub(crate) const NS_HEAD: &str = "http://www.hancom.co.kr/hwpml/2011/head";
pub(crate) const NS_OPF: &str = "http://www.idpf.org/2007/opf/";
pub(crate) const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
pub(crate) const NS_OCF: &str = "urn:oasis:names:tc:opendocument:xmlns:container";

pub(crate) fn section_part(index: usize) -> String {
    format!("Contents/section{}.xml", index)
}

/// Archive entry name for a resource id
pub(crate) fn bin_part(id: &str, media_type: &str) -> String {
    format!("{}/{}.{}", BIN_DIR, id, extension_for(media_type))
}

fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

/// Parse a package into the IR
///
/// Strict: an archive that is missing required parts, fails to parse, or
/// carries dangling style/resource references is rejected as a whole rather
/// than partially loaded.
pub fn decode(bytes: &[u8]) -> Result<Document> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| CorruptPackage::BadArchive(e.to_string()))?;

    let mimetype = read_part_string(&mut archive, MIMETYPE)?;
    if mimetype.trim() != MIMETYPE_VALUE {
        return Err(CorruptPackage::BadMimetype(mimetype.trim().to_string()).into());
    }

    let container = read_part(&mut archive, CONTAINER)?;
    let manifest_path = reader::parse_container(&container)?;
    let manifest_bytes = read_part(&mut archive, &manifest_path)?;
    let manifest = reader::parse_manifest(&manifest_path, &manifest_bytes)?;

    let header_href = manifest
        .items
        .iter()
        .find(|i| i.id == "header")
        .map(|i| i.href.clone())
        .unwrap_or_else(|| HEADER.to_string());
    let header_bytes = read_part(&mut archive, &header_href)?;
    let (styles, bin_items) = reader::parse_header(&header_href, &header_bytes)?;

    if manifest.spine.is_empty() {
        return Err(CorruptPackage::MissingPart("spine section entries".to_string()).into());
    }
    let mut sections: Vec<Section> = Vec::with_capacity(manifest.spine.len());
    let mut known: HashSet<String> = [
        MIMETYPE.to_string(),
        CONTAINER.to_string(),
        manifest_path.clone(),
        header_href.clone(),
    ]
    .into();
    for idref in &manifest.spine {
        let item = manifest
            .items
            .iter()
            .find(|i| &i.id == idref)
            .ok_or_else(|| {
                CorruptPackage::DanglingReference(format!("spine references unknown item {idref:?}"))
            })?;
        let part = read_part(&mut archive, &item.href)?;
        sections.push(reader::parse_section(&item.href, &part)?);
        known.insert(item.href.clone());
    }

    let mut resources = ResourceStore::new();
    for bin in bin_items {
        let data = read_part(&mut archive, &bin.href)?;
        resources.insert(bin.id, Resource::new(bin.media_type, data));
        known.insert(bin.href);
    }

    // Everything else travels through untouched
    let mut opaque_parts = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| CorruptPackage::BadArchive(e.to_string()))?;
        let name = entry.name().to_string();
        if known.contains(&name) || name.ends_with('/') {
            continue;
        }
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| CorruptPackage::BadArchive(e.to_string()))?;
        opaque_parts.push(OpaquePart { name, data });
    }

    let doc = Document::from_parts(manifest.metadata, sections, styles, resources, opaque_parts);
    doc.validate().map_err(|violation| match violation {
        InvariantViolation::DanglingParaStyle(_)
        | InvariantViolation::DanglingCharStyle(_)
        | InvariantViolation::DanglingResource(_) => {
            CorruptPackage::DanglingReference(violation.to_string())
        }
        other => CorruptPackage::Structure(other.to_string()),
    })?;
    tracing::debug!(
        sections = doc.sections.len(),
        resources = doc.resources.len(),
        "decoded package"
    );
    Ok(doc)
}

/// Serialize the IR into a complete package byte sequence
///
/// The archive is assembled fully in memory and only then handed back, so a
/// caller never observes a partially written package. Sections left without
/// paragraphs are normalized away; any other invariant failure here is a
/// programming-contract violation (the edit engine keeps documents valid).
pub fn encode(doc: &Document) -> Result<Vec<u8>> {
    let normalized;
    let doc = if doc.sections.iter().any(|s| s.paragraphs.is_empty()) {
        let mut clone = doc.clone();
        clone.sections.retain(|s| !s.paragraphs.is_empty());
        normalized = clone;
        &normalized
    } else {
        doc
    };
    doc.validate()?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

    // mimetype first and uncompressed, as consumers expect
    zip.start_file(MIMETYPE, stored).map_err(zip_err)?;
    zip.write_all(MIMETYPE_VALUE.as_bytes())?;

    // Catalogs, then per-section parts, then the manifest
    zip.start_file(HEADER, deflated).map_err(zip_err)?;
    zip.write_all(&writer::write_header(doc).map_err(xml_err)?)?;

    for (i, section) in doc.sections.iter().enumerate() {
        zip.start_file(section_part(i), deflated).map_err(zip_err)?;
        zip.write_all(&writer::write_section(section).map_err(xml_err)?)?;
    }

    zip.start_file(MANIFEST, deflated).map_err(zip_err)?;
    zip.write_all(&writer::write_manifest(doc).map_err(xml_err)?)?;

    zip.start_file(CONTAINER, deflated).map_err(zip_err)?;
    zip.write_all(&writer::write_container().map_err(xml_err)?)?;

    for (id, resource) in doc.resources.iter() {
        zip.start_file(bin_part(id, &resource.media_type), deflated)
            .map_err(zip_err)?;
        zip.write_all(&resource.data)?;
    }

    for part in &doc.opaque_parts {
        zip.start_file(part.name.clone(), deflated).map_err(zip_err)?;
        zip.write_all(&part.data)?;
    }

    let cursor = zip.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

fn zip_err(e: zip::result::ZipError) -> HanjiError {
    std::io::Error::new(std::io::ErrorKind::Other, e).into()
}

fn xml_err(e: quick_xml::Error) -> HanjiError {
    std::io::Error::new(std::io::ErrorKind::Other, e).into()
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> std::result::Result<Vec<u8>, CorruptPackage> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| CorruptPackage::MissingPart(name.to_string()))?;
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|e| CorruptPackage::BadArchive(e.to_string()))?;
    Ok(data)
}

fn read_part_string(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> std::result::Result<String, CorruptPackage> {
    let data = read_part(archive, name)?;
    String::from_utf8(data).map_err(|_| CorruptPackage::BadMimetype("not UTF-8".to_string()))
}
