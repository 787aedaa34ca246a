//! Legacy equation blob conversion
//!
//! Equations authored in the old equation editor arrive as MTEF binary blobs
//! inside embedded OLE objects. Converting MTEF is a solved problem outside
//! this crate, so the blob is handed to an external program: bytes are
//! written to a scratch file, the program is invoked with that path, and its
//! stdout is taken as the MathML fragment. The scratch file is removed on
//! every exit path by the `NamedTempFile` guard.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use super::{ConvertError, EquationConverter};

/// Converts MTEF blobs by shelling out to an external converter program.
pub struct MtefCommandConverter {
    program: PathBuf,
}

impl MtefCommandConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl EquationConverter for MtefCommandConverter {
    fn convert(&self, blob: &[u8]) -> Result<String, ConvertError> {
        let mut scratch = tempfile::NamedTempFile::new()?;
        scratch.write_all(blob)?;
        scratch.flush()?;

        let output = Command::new(&self.program).arg(scratch.path()).output()?;
        if !output.status.success() {
            return Err(ConvertError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mathml = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if mathml.is_empty() {
            return Err(ConvertError::Empty);
        }
        Ok(mathml)
    }
}

/// Stand-in used when no converter program is configured; always fails, so
/// embedded equations are dropped with a logged warning.
pub struct NullConverter;

impl EquationConverter for NullConverter {
    fn convert(&self, _blob: &[u8]) -> Result<String, ConvertError> {
        Err(ConvertError::Unavailable)
    }
}
