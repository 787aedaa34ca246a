//! Document loading and question extraction
//!
//! This module provides functionality for loading .docx question-bank
//! packages and extracting their questions into structured records.

pub(crate) mod io;
pub mod loader;
pub mod models;
pub mod parsing;

// Re-export the public API surface
pub use loader::Package;
pub use models::*;
pub use parsing::scanner::extract_questions;
