//! Archive I/O and validation
//!
//! This module handles package validation, part reads, and the relationship
//! map that resolves `r:id`/`r:embed` references to part paths.

use anyhow::{Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

pub(crate) const BODY_PART: &str = "word/document.xml";
pub(crate) const RELS_PART: &str = "word/_rels/document.xml.rels";

/// Validates that the file is a legitimate .docx package and opens it
pub(crate) fn open_archive(file_path: &Path) -> Result<ZipArchive<File>> {
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if extension != "docx" {
        bail!(
            "Invalid file format. Expected .docx file, got .{}\n\
            Note: qdox only supports Word .docx files (not .doc, .xlsx, .zip, etc.)",
            extension
        );
    }

    let file = File::open(file_path)?;
    let archive = ZipArchive::new(file)?;
    Ok(archive)
}

/// Read one part's bytes, or `None` when the part is absent
pub(crate) fn read_part_bytes(archive: &mut ZipArchive<File>, name: &str) -> Option<Vec<u8>> {
    let mut part = archive.by_name(name).ok()?;
    let mut bytes = Vec::new();
    part.read_to_end(&mut bytes).ok()?;
    Some(bytes)
}

/// Read one part as text, or `None` when the part is absent
pub(crate) fn read_part_text(archive: &mut ZipArchive<File>, name: &str) -> Option<String> {
    let mut part = archive.by_name(name).ok()?;
    let mut text = String::new();
    part.read_to_string(&mut text).ok()?;
    Some(text)
}

/// Parse the relationships XML into an id → target map.
///
/// A malformed part yields whatever parsed before the error; every reference
/// that resolves to nothing is skipped downstream.
pub(crate) fn parse_relationships(xml: &str) -> HashMap<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut targets = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for a in e.attributes().flatten() {
                    match a.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&a.value).to_string()),
                        b"Target" => target = Some(String::from_utf8_lossy(&a.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("error parsing relationships: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    targets
}

/// Resolve a relationship target to a part path inside the archive.
///
/// Relative targets live under `word/`; absolute targets are rooted at the
/// archive. External targets are not fetchable and resolve to `None`.
pub(crate) fn resolve_target(target: &str) -> Option<String> {
    if target.starts_with("http://") || target.starts_with("https://") {
        return None;
    }
    if let Some(rooted) = target.strip_prefix('/') {
        return Some(rooted.to_string());
    }
    Some(format!("word/{target}"))
}
