//! qdox: Exam-question extraction from .docx question banks
//!
//! This library parses Word question-bank documents, detects question
//! boundaries, splits stems/options/keys/hints, binds embedded images, and
//! normalizes every math encoding it meets (symbol-font characters, OMML,
//! legacy MTEF equation objects) into MathML.

pub mod config;
pub mod document;
pub mod export;
pub mod math;

/// Export format options
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum ExportFormat {
    /// One JSON document with all records
    Json,
    /// Zip archive with one folder per question
    Bundle,
}

// Re-export commonly used types
pub use config::ExtractConfig;
pub use document::{Package, QuestionRecord, extract_questions};
pub use math::mtef::{MtefCommandConverter, NullConverter};
pub use math::{ConvertError, EquationConverter};
