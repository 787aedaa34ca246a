//! Extraction configuration
//!
//! Marker literals and small extraction knobs, overridable from a TOML file.
//! Defaults match the question banks this tool is written for: `Hint:` and
//! `Key:` field markers and a four-letter option alphabet.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Literal that introduces the hint field
    pub hint_marker: String,
    /// Literal that introduces the answer key field
    pub key_marker: String,
    /// Option letters, in the order markers are accepted
    pub option_letters: String,
    /// Extension used when an image part path carries none
    pub default_image_ext: String,
    /// External MTEF-to-MathML converter program
    pub converter_program: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            hint_marker: "Hint:".to_string(),
            key_marker: "Key:".to_string(),
            option_letters: "abcd".to_string(),
            default_image_ext: "png".to_string(),
            converter_program: None,
        }
    }
}

impl ExtractConfig {
    /// Load configuration, overlaying the given TOML file on the defaults
    /// when a path is supplied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("failed to parse config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// True if `letter` belongs to the option alphabet.
    pub(crate) fn is_option_letter(&self, letter: char) -> bool {
        self.option_letters.contains(letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.hint_marker, "Hint:");
        assert_eq!(config.key_marker, "Key:");
        assert_eq!(config.option_letters, "abcd");
        assert!(config.converter_program.is_none());
    }

    #[test]
    fn test_toml_overlay_keeps_unset_defaults() {
        let config: ExtractConfig =
            toml::from_str(r#"option_letters = "abcde""#).expect("valid overlay");
        assert_eq!(config.option_letters, "abcde");
        assert_eq!(config.hint_marker, "Hint:", "unset fields keep defaults");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<ExtractConfig>("no_such_knob = 1").is_err());
    }
}
