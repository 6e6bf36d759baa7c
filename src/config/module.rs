//! Module-wide settings
//!
//! Defaults every layer falls back to, plus generation settings. Loaded from
//! an optional TOML file; CLI flags override individual fields.
//!
//! ```toml
//! options = true
//! tokens = "design/tokens.json"
//! quiet = false
//! name_case = "kebab"
//! build_dir = ".theme"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use theme_tokens::{NameCase, TransformOptions};
use thiserror::Error;

use super::AspectValue;

/// Errors from loading module settings.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("failed to read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid setting: {0}")]
    InvalidValue(String),
}

/// Module-wide theme settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleOptions {
    /// Options aspect value for layers that declare none.
    pub options: AspectValue,
    /// Tokens aspect value for layers that declare none.
    pub tokens: AspectValue,
    /// Suppress the token transform's build log.
    pub quiet: bool,
    /// Naming transform for token variables.
    pub name_case: NameCase,
    /// Directory generated artifacts are written to.
    pub build_dir: PathBuf,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            options: AspectValue::Conventional,
            tokens: AspectValue::Conventional,
            quiet: true,
            name_case: NameCase::Kebab,
            build_dir: PathBuf::from(".theme"),
        }
    }
}

impl ModuleOptions {
    /// Load settings from a TOML file and validate them.
    pub fn load(path: &Path) -> Result<Self, ModuleError> {
        let contents = fs::read_to_string(path).map_err(|e| ModuleError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options: ModuleOptions =
            toml::from_str(&contents).map_err(|e| ModuleError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.build_dir.as_os_str().is_empty() {
            return Err(ModuleError::InvalidValue(
                "build_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Options handed to the token transformer.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            name_case: self.name_case,
            quiet: self.quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = ModuleOptions::default();
        assert_eq!(options.options, AspectValue::Conventional);
        assert_eq!(options.tokens, AspectValue::Conventional);
        assert!(options.quiet);
        assert_eq!(options.build_dir, PathBuf::from(".theme"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "tokens = false").unwrap();
        writeln!(temp, "name_case = \"constant\"").unwrap();

        let options = ModuleOptions::load(temp.path()).unwrap();
        assert_eq!(options.tokens, AspectValue::Disabled);
        assert_eq!(options.options, AspectValue::Conventional);
        assert_eq!(options.name_case, NameCase::Constant);
    }

    #[test]
    fn test_load_path_aspect() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "options = \"config/theme.json\"").unwrap();

        let options = ModuleOptions::load(temp.path()).unwrap();
        assert_eq!(options.options, AspectValue::Path("config/theme.json".to_string()));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "colour = true").unwrap();

        let err = ModuleOptions::load(temp.path()).unwrap_err();
        assert!(matches!(err, ModuleError::ParseError { .. }));
    }

    #[test]
    fn test_empty_build_dir_rejected() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "build_dir = \"\"").unwrap();

        let err = ModuleOptions::load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("build_dir"));
    }
}
