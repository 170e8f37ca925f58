//! Wikigraph config

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Length of the fixed trailing boilerplate after the article text payload
/// in the 2021-01-01 enwiki dump schema. Other dump versions may differ;
/// override on [`Config`] rather than patching the extractor.
pub const DEFAULT_FOOTER_LEN: usize = 84;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the TSV streams and stats
    pub data_dir: PathBuf,
    /// Trailing boilerplate length used by the character counter
    pub footer_len: usize,
    /// Instant the dump was collected; edit recency is seconds before this
    pub reference_instant: DateTime<Utc>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            footer_len: DEFAULT_FOOTER_LEN,
            reference_instant: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 1).unwrap(),
        }
    }
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Set the trailing boilerplate length
    pub fn with_footer_len(mut self, len: usize) -> Self {
        self.footer_len = len;
        self
    }

    /// Set the reference instant for edit recency
    pub fn with_reference_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.reference_instant = instant;
        self
    }

    /// Get the path to the attribute stream
    pub fn info_path(&self) -> PathBuf {
        self.data_dir.join("wiki-info.tsv")
    }

    /// Get the path to the edge stream
    pub fn links_path(&self) -> PathBuf {
        self.data_dir.join("wiki-links.tsv")
    }

    /// Get the path to the redirect-collapsed attribute stream
    pub fn collapsed_info_path(&self) -> PathBuf {
        self.data_dir.join("wiki-info-collapsed.tsv")
    }

    /// Get the path to the redirect-collapsed edge stream
    pub fn collapsed_links_path(&self) -> PathBuf {
        self.data_dir.join("wiki-links-collapsed.tsv")
    }

    /// Get the path to the stats file
    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("stats.json")
    }

    /// Get the path to the config file
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Load config from file
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
