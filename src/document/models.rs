//! Core data structures for question extraction
//!
//! This module defines the paragraph/run model produced by the package
//! loader and the question records produced by the scanner.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Vertical alignment of a run, from `w:vertAlign`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertAlign {
    #[default]
    Normal,
    Superscript,
    Subscript,
}

/// One inline token inside a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunItem {
    /// Plain text from `w:t`
    Text(String),
    /// Symbol-font character reference from `w:sym`
    Symbol { font: String, code: String },
}

/// An inline formatting span within a paragraph
#[derive(Debug, Clone, Default)]
pub struct Run {
    pub vert_align: VertAlign,
    pub items: Vec<RunItem>,
}

/// One body paragraph: ordered runs plus the media and math references it
/// carries, each list in encounter order
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    /// Relationship ids of embedded drawings (`a:blip` embeds)
    pub drawing_ids: Vec<String>,
    /// Relationship ids of embedded OLE equation objects
    pub object_ids: Vec<String>,
    /// Raw inner XML of each `m:oMath` node
    pub math: Vec<String>,
}

/// A classified text fragment, consumed immediately by the script merger;
/// never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct RunFragment {
    pub kind: VertAlign,
    pub text: String,
}

/// An image bound to a question, under its synthetic filename
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One extracted question. Immutable once flushed.
///
/// `stem` never contains the leading `N.` numbering prefix nor any
/// option/key/hint marker text; those live in their own fields. Option
/// letters are contiguous and in source order; absent options are simply
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRecord {
    pub number: Option<u32>,
    pub stem: String,
    pub options: BTreeMap<char, String>,
    pub key: Option<String>,
    pub hint: Option<String>,
    /// Bound images; serialized as the list of filenames, bytes travel only
    /// through the bundle export
    #[serde(serialize_with = "image_names_only")]
    pub images: Vec<QuestionImage>,
}

fn image_names_only<S: Serializer>(images: &[QuestionImage], ser: S) -> Result<S::Ok, S::Error> {
    ser.collect_seq(images.iter().map(|image| image.name.as_str()))
}
