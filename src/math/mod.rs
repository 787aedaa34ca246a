//! Math normalization
//!
//! Three equation encodings reach this module and leave it as MathML
//! fragments: symbol-font character references ([`symbols`]), native OMML
//! markup ([`omml`]), and legacy MTEF binary blobs from embedded equation
//! objects ([`mtef`], behind the [`EquationConverter`] trait). Each path is
//! idempotent and side-effect-free on the document; a failure in one equation
//! never aborts the surrounding extraction.

pub mod mtef;
pub mod omml;
pub mod symbols;

use thiserror::Error;

/// Why a binary equation blob could not be converted
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("no equation converter is configured")]
    Unavailable,

    #[error("converter produced no output")]
    Empty,

    #[error("converter exited with {status}: {stderr}")]
    Failed { status: std::process::ExitStatus, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boundary to the legacy-equation converter: binary blob in, MathML out.
///
/// Implementations must not leave side effects visible to the caller on
/// failure. The trait is injected into the scanner so tests can substitute
/// their own converter.
pub trait EquationConverter {
    fn convert(&self, blob: &[u8]) -> Result<String, ConvertError>;
}
