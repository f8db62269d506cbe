//! `[logging]` section: level and optional rolling JSON file output
//!
//! Every value is checked when the config loads, so a typo in the file
//! stops startup instead of quietly logging somewhere unexpected.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Lowercase tracing level used for the `auraspy` target
    pub level: String,
    /// Write JSON lines to `file_dir` next to the TUI buffer or stdout
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// File name stem; the appender adds the date suffix
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "auraspy".to_string(),
        }
    }
}

/// `[logging]` as written in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<LogRotation>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Fill the section from the file, validating what was given
    pub fn from_file(file: Option<FileLogging>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let level = match file.level {
            Some(raw) => {
                let level: tracing::Level = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid logging.level: {:?}", raw))?;
                level.as_str().to_ascii_lowercase()
            }
            None => defaults.level,
        };

        let file_prefix = file.file_prefix.unwrap_or(defaults.file_prefix);
        if file_prefix.trim().is_empty() || file_prefix.contains(['/', '\\']) {
            bail!(
                "Invalid logging.file_prefix: {:?} (must be a plain file name)",
                file_prefix
            );
        }

        Ok(Self {
            level,
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file.file_dir.map(PathBuf::from).unwrap_or(defaults.file_dir),
            file_rotation: file.file_rotation.unwrap_or(defaults.file_rotation),
            file_prefix,
        })
    }
}
