//! Image binding
//!
//! A drawing reference seen while a question is open resolves through the
//! relationship map to an image part, whose bytes are attached to the open
//! buffer under a synthetic sequential filename. The filename (or a bare
//! placeholder when the open question has no determinable number) is also
//! appended to the question text. An unresolvable reference is skipped;
//! siblings in the same paragraph still process.

use std::path::Path;

use super::super::loader::Package;
use super::scanner::{ExtractContext, QuestionBuffer};
use crate::document::models::QuestionImage;

pub(crate) fn bind_image(
    rel_id: &str,
    package: &Package,
    ctx: &mut ExtractContext<'_>,
    buffer: &mut QuestionBuffer,
) {
    let Some(path) = package.resolve(rel_id) else {
        log::warn!("drawing relationship {rel_id} has no target; skipping image");
        return;
    };
    let Some(bytes) = package.part_bytes(&path) else {
        log::warn!("image part {path} is missing from the archive; skipping image");
        return;
    };

    let ext = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or(&ctx.config.default_image_ext)
        .to_ascii_lowercase();

    let filename = format!("image_{}.{ext}", ctx.next_image_index());

    // The marker is recomputed from the buffer's own leading number at the
    // moment the image is seen, not from any prior flush.
    let marker = if buffer.leading_number().is_some() {
        filename.clone()
    } else {
        "[image]".to_string()
    };
    buffer.append(marker);
    buffer.attach_image(QuestionImage {
        name: filename,
        bytes: bytes.to_vec(),
    });

    log::debug!("bound {path} to the open question as a new image attachment");
}
