//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::{Config, FileConfig};
use crate::aura::HighlightColor;
use anyhow::{Context, Result};
use std::path::Path;

impl Config {
    /// Serialize to a commented TOML document
    pub fn to_toml(&self) -> String {
        let palette: Vec<&str> = HighlightColor::ALL.iter().map(|c| c.as_str()).collect();
        format!(
            r#"# auraspy configuration

# Proxy bind address
bind_addr = "{bind}"

# Where origin-form requests are forwarded (absolute-form requests
# from a browser configured to use the proxy go to their own host)
upstream_url = "{upstream}"

# Color used to mark Salesforce Aura requests in history
# One of: {palette}
highlight_color = "{color}"

# Maximum number of requests kept in history
history_limit = {history_limit}

# Upstream request timeout in seconds
request_timeout_secs = {timeout}

# Logging
[logging]
level = "{log_level}"
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_rotation = "{file_rotation}"   # hourly, daily, never
file_prefix = "{file_prefix}"
"#,
            bind = self.bind_addr,
            upstream = self.upstream_url,
            palette = palette.join(", "),
            color = self.highlight_color,
            history_limit = self.history_limit,
            timeout = self.request_timeout_secs,
            log_level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display(),
            file_rotation = self.logging.file_rotation.as_str(),
            file_prefix = self.logging.file_prefix,
        )
    }

    /// Save current configuration to the default config file
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };
        self.save_to(&path)
    }

    /// Save current configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml())
    }

    /// Change `highlight_color` in the file at `path`, leaving its other
    /// settings as they are
    ///
    /// Starts from the file (or defaults), not from the running config, so
    /// environment overrides never end up on disk. A file that no longer
    /// parses is left untouched.
    pub fn persist_highlight(path: &Path, color: HighlightColor) -> Result<()> {
        let file = match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_file_config(&contents)
                .with_context(|| format!("{} does not parse", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read {}", path.display()))
            }
        };

        let mut stored = Self::merge(file, |_| None)?;
        stored.highlight_color = color;
        stored
            .save_to(path)
            .with_context(|| format!("Cannot write {}", path.display()))
    }
}
