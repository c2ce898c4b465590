//! Read-only repository configuration.
//!
//! Parses the INI-style config file under the repository metadata
//! directory. Only reading is supported; values are looked up by
//! section and key, e.g. `get("user", "name")`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::infra::read_file;

/// Parsed configuration, keyed by `(section, key)`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<(String, String), String>,
}

impl Config {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Config::default()
    }

    /// Loads the config file at the given path.
    ///
    /// A missing file yields an empty configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::new());
        }
        let bytes = read_file(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Self::parse(&text))
    }

    /// Parses config text.
    ///
    /// Unrecognized lines are skipped rather than rejected; the format
    /// tolerates comments (`#` or `;`) and blank lines.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();
        let mut section = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_lowercase();
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim();
                // Strip surrounding quotes if present
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                values.insert((section.clone(), key), value.to_string());
            }
        }

        Config { values }
    }

    /// Looks up a value by section and key.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.values
            .get(&(section.to_lowercase(), key.to_lowercase()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
