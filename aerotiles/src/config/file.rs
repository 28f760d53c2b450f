//! Configuration file handling for ~/.aerotiles/config.ini.
//!
//! Every key is optional; missing keys keep their defaults.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::settings::ConfigFile;

/// Why a configuration file was rejected.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Unreadable file or malformed INI syntax
    #[error("Cannot read configuration: {0}")]
    ReadError(#[from] ini::Error),

    /// Well-formed INI carrying a value the key does not accept
    #[error("Bad setting [{section}] {key} = '{value}': {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Reads `~/.aerotiles/config.ini`.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Reads `path`; an absent file means all defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        let config = super::parser::parse_ini(&ini)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// `~/.aerotiles`, also the parent of the log directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aerotiles")
}

pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;
    use std::time::Duration;

    #[test]
    fn test_absent_file_means_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("missing.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_partial_file_overrides_only_its_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[pipeline]\nmax_tiles = 5000\nbatch_size = 32\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.pipeline.max_tiles, 5000);
        assert_eq!(config.pipeline.batch_size, 32);
        assert_eq!(config.download, ConfigFile::default().download);
    }

    #[test]
    fn test_bad_value_names_section_and_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[download]\nmax_retries = many\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad setting [download] max_retries = 'many': must be a non-negative integer"
        );
    }

    #[test]
    fn test_default_pipeline_config_matches() {
        assert_eq!(ConfigFile::default().pipeline_config(), PipelineConfig::default());
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let mut config = ConfigFile::default();
        config.download.max_retries = 2;
        config.download.initial_backoff_ms = 100;
        config.download.jitter = 0.0;

        let policy = config.retry_policy();
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.backoff_after(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.backoff_after(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.backoff_after(3), None);
    }

    #[test]
    fn test_config_path_under_home() {
        assert!(config_file_path().ends_with(".aerotiles/config.ini"));
    }
}
