//! Export of extracted questions
//!
//! Two shapes: a single JSON document (schema v1, records in source order),
//! and a zip bundle with one folder per question holding its `question.json`
//! and an `images/` subfolder with the bound image bytes under their
//! synthetic filenames.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

use crate::document::QuestionRecord;

/// Serialize records to the canonical JSON document.
pub fn to_json(records: &[QuestionRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("failed to serialize question records")
}

/// Write the JSON document to a file, creating parent directories as needed.
pub fn write_json(records: &[QuestionRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, to_json(records)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Write the zip bundle: `question_<number-or-index>/question.json` plus the
/// question's images.
pub fn write_bundle(records: &[QuestionRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for (index, record) in records.iter().enumerate() {
        let folder = format!("question_{}", folder_id(record, index));

        writer.start_file(format!("{folder}/question.json"), options)?;
        let json =
            serde_json::to_vec_pretty(record).context("failed to serialize question record")?;
        writer.write_all(&json)?;

        for image in &record.images {
            writer.start_file(format!("{folder}/images/{}", image.name), options)?;
            writer.write_all(&image.bytes)?;
        }
    }

    writer.finish()?;
    Ok(())
}

/// Folder name component: the question number when known, the 1-based source
/// index otherwise.
fn folder_id(record: &QuestionRecord, index: usize) -> String {
    match record.number {
        Some(number) => number.to_string(),
        None => (index + 1).to_string(),
    }
}

/// List a bundle's entry names, in archive order. Used by tests and by the
/// CLI's post-write summary.
pub fn bundle_entries(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let archive = ZipArchive::new(file)?;
    Ok(archive.file_names().map(str::to_string).collect())
}
