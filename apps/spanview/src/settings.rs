//! # Settings
//!
//! Server-wide settings, loaded once at startup and read-only afterwards.
//!
//! ## Sources (first match wins)
//!
//! 1. `--config <file>`
//! 2. `spanview.toml` in the working directory
//! 3. Built-in defaults
//!
//! `SPANVIEW_DATA_DIR` overrides `data_dir` from any source.
//!
//! ```toml
//! data_dir = "/srv/annotations"
//! verification = true
//! locale = "japanese"
//! host = "0.0.0.0"
//! port = 8001
//! ```

use serde::{Deserialize, Serialize};
use spanview_core::{Locale, ProjectionOptions, SpanviewError};
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "spanview.toml";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SPANVIEW_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Root of all collections.
    pub data_dir: PathBuf,
    /// Attach verification issues to projected documents.
    pub verification: bool,
    /// Sentence and token boundary strategy.
    pub locale: Locale,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            verification: false,
            locale: Locale::Generic,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Settings {
    /// Parse settings from TOML source.
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self, SpanviewError> {
        toml::from_str(source).map_err(|e| SpanviewError::InvalidConfiguration {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a settings file.
    pub fn from_file(path: &Path) -> Result<Self, SpanviewError> {
        let source =
            std::fs::read_to_string(path).map_err(|e| SpanviewError::InvalidConfiguration {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::from_toml_str(&source, path)
    }

    /// Resolve settings from an explicit file, the default file, or defaults,
    /// then apply the environment override.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SpanviewError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_SETTINGS_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_SETTINGS_FILE))?
            }
            None => Self::default(),
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            settings.data_dir = PathBuf::from(dir);
        }

        tracing::debug!(
            data_dir = %settings.data_dir.display(),
            verification = settings.verification,
            locale = ?settings.locale,
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Options handed to the document projector.
    #[must_use]
    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            locale: self.locale,
            verify: self.verification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml_str("", Path::new("spanview.toml")).expect("parse");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml_str(
            "locale = \"japanese\"\nverification = true\n",
            Path::new("spanview.toml"),
        )
        .expect("parse");
        assert_eq!(settings.locale, Locale::Japanese);
        assert!(settings.projection_options().verify);
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Settings::from_toml_str("colour = \"red\"\n", Path::new("x.toml"))
            .expect_err("unknown key");
        assert_eq!(err.exception(), "invalidConfiguration");
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "port = 9001\n").expect("write");
        let settings = Settings::from_file(&path).expect("load");
        assert_eq!(settings.port, 9001);
    }
}
