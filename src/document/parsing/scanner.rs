//! Question boundary scanning
//!
//! The driving pass of an extraction: one forward walk over the body
//! paragraphs with two states, Idle (no open question) and Accumulating. A
//! paragraph whose merged text starts with `digits "." optional-space
//! uppercase-letter` opens a new question, flushing any question already
//! open; other non-empty paragraphs extend the open question; everything
//! before the first start is discarded. Media carried by a paragraph is
//! appended after its text in a fixed order — images, then legacy equation
//! objects, then native math — so output is deterministic regardless of XML
//! quirks.
//!
//! All mutable scan state (buffer, image counter) lives in a per-extraction
//! context, so concurrent extractions of different documents cannot
//! interfere.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractConfig;
use crate::math::EquationConverter;
use crate::math::omml::omml_to_mathml;

use super::super::loader::Package;
use super::super::models::{QuestionImage, QuestionRecord};
use super::fields;
use super::images;
use super::runs;

/// A question starts with digits, a period, optional whitespace, and an
/// uppercase letter, anchored at the very first character.
static QUESTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*[A-Z]").expect("valid question-start pattern"));

/// Per-extraction state, private to one `extract_questions` call.
pub(crate) struct ExtractContext<'a> {
    pub(crate) config: &'a ExtractConfig,
    pub(crate) converter: &'a dyn EquationConverter,
    image_seq: u32,
}

impl<'a> ExtractContext<'a> {
    fn new(config: &'a ExtractConfig, converter: &'a dyn EquationConverter) -> Self {
        Self {
            config,
            converter,
            image_seq: 0,
        }
    }

    pub(crate) fn next_image_index(&mut self) -> u32 {
        self.image_seq += 1;
        self.image_seq
    }
}

/// The accumulator for the question currently being assembled. Exactly one
/// buffer is live per extraction.
#[derive(Default)]
pub(crate) struct QuestionBuffer {
    chunks: Vec<String>,
    images: Vec<QuestionImage>,
    open: bool,
}

impl QuestionBuffer {
    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    fn start(&mut self, seed: String) {
        self.chunks.clear();
        self.images.clear();
        self.chunks.push(seed);
        self.open = true;
    }

    pub(crate) fn append(&mut self, chunk: String) {
        self.chunks.push(chunk);
    }

    pub(crate) fn attach_image(&mut self, image: QuestionImage) {
        self.images.push(image);
    }

    /// Number of the open question, recomputed from the buffered text.
    pub(crate) fn leading_number(&self) -> Option<u32> {
        self.chunks.first().and_then(|first| fields::leading_number(first))
    }

    /// Finalize the buffer into an immutable record and reset it.
    fn flush(&mut self, config: &ExtractConfig) -> QuestionRecord {
        let joined = self.chunks.join(" ");
        let mut record = fields::split_fields(joined.trim(), config);
        record.images = std::mem::take(&mut self.images);
        self.chunks.clear();
        self.open = false;
        record
    }
}

/// Extract every question from a loaded package, in source order.
///
/// Each call constructs fresh scanner state, so re-running extraction on the
/// same package yields an identical record list.
pub fn extract_questions(
    package: &Package,
    config: &ExtractConfig,
    converter: &dyn EquationConverter,
) -> Vec<QuestionRecord> {
    let mut ctx = ExtractContext::new(config, converter);
    let mut buffer = QuestionBuffer::default();
    let mut records = Vec::new();

    for paragraph in &package.paragraphs {
        let text = runs::paragraph_text(paragraph);
        let trimmed = text.trim();

        if !trimmed.is_empty() && QUESTION_START.is_match(trimmed) {
            if buffer.is_open() {
                records.push(buffer.flush(ctx.config));
            }
            buffer.start(trimmed.to_string());
        } else if buffer.is_open() && !trimmed.is_empty() {
            buffer.append(trimmed.to_string());
        }
        // Front matter before the first question start never produces a record.

        if buffer.is_open() {
            for rel_id in &paragraph.drawing_ids {
                images::bind_image(rel_id, package, &mut ctx, &mut buffer);
            }
            for rel_id in &paragraph.object_ids {
                convert_object(rel_id, package, &ctx, &mut buffer);
            }
            for omml in &paragraph.math {
                let mathml = omml_to_mathml(omml);
                if !mathml.is_empty() {
                    buffer.append(mathml);
                }
            }
        }
    }

    if buffer.is_open() {
        records.push(buffer.flush(ctx.config));
    }

    records
}

/// Convert one embedded OLE equation object and append the MathML to the
/// open buffer. Any failure drops just this equation.
fn convert_object(
    rel_id: &str,
    package: &Package,
    ctx: &ExtractContext<'_>,
    buffer: &mut QuestionBuffer,
) {
    let Some(path) = package.resolve(rel_id) else {
        log::warn!("object relationship {rel_id} has no target; skipping equation");
        return;
    };
    let Some(blob) = package.part_bytes(&path) else {
        log::warn!("equation part {path} is missing from the archive; skipping equation");
        return;
    };

    match ctx.converter.convert(blob) {
        Ok(mathml) if !mathml.is_empty() => buffer.append(mathml),
        Ok(_) => {}
        Err(e) => log::warn!("equation conversion failed for {path}: {e}"),
    }
}
