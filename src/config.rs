//! YAML configuration for a docsearch deployment.
//!
//! One file describes the query engine limits, how index snapshots are
//! encoded for export, and an optional seed file to load at start-up.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "catalogue"
//!
//! query:
//!   default_page_size: 10
//!   max_page_size: 100
//!   timeout_ms: 5000
//!   excerpt_chars: 160
//!   max_suggestions: 50
//!
//! index:
//!   compression: "zstd"
//!   compression_level: 3
//!
//! seed_path: "data/catalogue.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use index::{CompressionCodec, CompressionConfig};
use query::QueryConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocsearchConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub index: IndexYamlConfig,

    /// JSON seed file loaded into the store on start-up. Relative paths are
    /// resolved against the working directory.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

impl DocsearchConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: DocsearchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.query
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("query: {e}")))?;
        self.index.validate()?;
        Ok(())
    }

    pub fn with_seed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }
}

impl Default for DocsearchConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            query: QueryConfig::default(),
            index: IndexYamlConfig::default(),
            seed_path: None,
        }
    }
}

/// Snapshot encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexYamlConfig {
    #[serde(default)]
    pub compression: CompressionCodec,

    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

impl IndexYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.compression == CompressionCodec::Zstd && !(1..=22).contains(&self.compression_level)
        {
            return Err(ConfigLoadError::Validation(format!(
                "index.compression_level must be between 1 and 22 for zstd, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }

    pub fn compression_config(&self) -> CompressionConfig {
        CompressionConfig::new(self.compression, self.compression_level)
    }
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::Zstd,
            compression_level: default_compression_level(),
        }
    }
}

fn default_compression_level() -> i32 {
    3
}
