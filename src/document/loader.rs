//! Package loading
//!
//! One forward pass over `word/document.xml` builds the paragraph/run model:
//! plain text (`w:t`), symbol-font references (`w:sym`), vertical alignment
//! (`w:vertAlign`), drawing embeds (`a:blip`), OLE equation objects
//! (`o:OLEObject`), and raw OMML (`m:oMath`). Every part reachable through
//! the relationship map is read up front, so the loaded package is immutable
//! for the whole extraction.

use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::path::Path;

use super::io::{
    BODY_PART, RELS_PART, open_archive, parse_relationships, read_part_bytes, read_part_text,
    resolve_target,
};
use super::models::{Paragraph, Run, RunItem, VertAlign};

/// A loaded question-bank package: the parsed body paragraphs, the
/// relationship map, and the bytes of every part the relationships reach.
#[derive(Debug, Default)]
pub struct Package {
    pub paragraphs: Vec<Paragraph>,
    relationships: HashMap<String, String>,
    parts: HashMap<String, Vec<u8>>,
}

impl Package {
    /// Open and parse a .docx package.
    ///
    /// A package missing its body or relationships part loads as an empty
    /// package (zero paragraphs) rather than an error; only an unreadable
    /// archive fails.
    pub fn open(file_path: &Path) -> Result<Package> {
        let mut archive = open_archive(file_path)?;

        let Some(body_xml) = read_part_text(&mut archive, BODY_PART) else {
            log::warn!("package has no {BODY_PART}; extracting nothing");
            return Ok(Package::default());
        };
        let Some(rels_xml) = read_part_text(&mut archive, RELS_PART) else {
            log::warn!("package has no {RELS_PART}; extracting nothing");
            return Ok(Package::default());
        };

        let relationships = parse_relationships(&rels_xml);

        let mut parts = HashMap::new();
        for target in relationships.values() {
            let Some(path) = resolve_target(target) else {
                continue;
            };
            if let Some(bytes) = read_part_bytes(&mut archive, &path) {
                parts.insert(path, bytes);
            }
        }

        let paragraphs = parse_body(&body_xml)?;

        Ok(Package {
            paragraphs,
            relationships,
            parts,
        })
    }

    /// Resolve a relationship id to a part path, if the id is mapped and the
    /// target lives inside the archive.
    pub fn resolve(&self, rel_id: &str) -> Option<String> {
        self.relationships
            .get(rel_id)
            .and_then(|target| resolve_target(target))
    }

    /// Bytes of a part by path, if it was present in the archive.
    pub fn part_bytes(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        paragraphs: Vec<Paragraph>,
        relationships: HashMap<String, String>,
        parts: HashMap<String, Vec<u8>>,
    ) -> Package {
        Package {
            paragraphs,
            relationships,
            parts,
        }
    }
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn push_raw_tag(omml: &mut String, e: &BytesStart, self_closing: bool) {
    omml.push('<');
    omml.push_str(std::str::from_utf8(e.name().as_ref()).unwrap_or(""));
    for a in e.attributes().flatten() {
        omml.push(' ');
        omml.push_str(std::str::from_utf8(a.key.as_ref()).unwrap_or(""));
        omml.push_str("=\"");
        omml.push_str(&String::from_utf8_lossy(&a.value));
        omml.push('"');
    }
    if self_closing {
        omml.push('/');
    }
    omml.push('>');
}

/// Parse the body XML into paragraphs.
///
/// Only top-level paragraphs count; paragraphs nested in tables are
/// non-question furniture and are skipped with their container.
pub(crate) fn parse_body(xml: &str) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut buf = Vec::new();

    let mut table_depth = 0usize;
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;
    let mut in_math = false;

    let mut paragraph = Paragraph::default();
    let mut run = Run::default();
    let mut text = String::new();
    let mut omml = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:tbl" => {
                table_depth += 1;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:tbl" => {
                table_depth = table_depth.saturating_sub(1);
            }
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:p" && table_depth == 0 => {
                in_paragraph = true;
                paragraph = Paragraph::default();
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:p" && in_paragraph => {
                in_paragraph = false;
                paragraphs.push(std::mem::take(&mut paragraph));
            }
            // Raw OMML capture: everything between m:oMath tags is kept
            // verbatim for the math converter.
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"m:oMath" && in_paragraph => {
                in_math = true;
                omml.clear();
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"m:oMath" && in_math => {
                in_math = false;
                paragraph.math.push(std::mem::take(&mut omml));
            }
            Ok(Event::Start(ref e)) if in_math => {
                push_raw_tag(&mut omml, e, false);
            }
            Ok(Event::End(ref e)) if in_math => {
                omml.push_str("</");
                omml.push_str(std::str::from_utf8(e.name().as_ref()).unwrap_or(""));
                omml.push('>');
            }
            Ok(Event::Empty(ref e)) if in_math => {
                push_raw_tag(&mut omml, e, true);
            }
            Ok(Event::Text(ref e)) if in_math => {
                omml.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:r" && in_paragraph => {
                in_run = true;
                run = Run::default();
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:r" && in_run => {
                in_run = false;
                paragraph.runs.push(std::mem::take(&mut run));
            }
            Ok(Event::Start(ref e) | Event::Empty(ref e))
                if e.name().as_ref() == b"w:vertAlign" && in_run =>
            {
                run.vert_align = match attr(e, b"w:val").as_deref() {
                    Some("superscript") => VertAlign::Superscript,
                    Some("subscript") => VertAlign::Subscript,
                    _ => VertAlign::Normal,
                };
            }
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" && in_run => {
                in_text = true;
                text.clear();
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:t" && in_text => {
                in_text = false;
                if !text.is_empty() {
                    run.items.push(RunItem::Text(std::mem::take(&mut text)));
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                text.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Start(ref e) | Event::Empty(ref e))
                if e.name().as_ref() == b"w:sym" && in_run =>
            {
                if let (Some(font), Some(code)) = (attr(e, b"w:font"), attr(e, b"w:char")) {
                    run.items.push(RunItem::Symbol { font, code });
                }
            }
            Ok(Event::Start(ref e) | Event::Empty(ref e))
                if e.name().as_ref() == b"a:blip" && in_paragraph =>
            {
                if let Some(id) = attr(e, b"r:embed").or_else(|| attr(e, b"r:link")) {
                    paragraph.drawing_ids.push(id);
                }
            }
            Ok(Event::Start(ref e) | Event::Empty(ref e))
                if e.name().as_ref() == b"o:OLEObject" && in_paragraph =>
            {
                if let Some(id) = attr(e, b"r:id") {
                    paragraph.object_ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("error parsing document body: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
