//! Dashboard settings
//!
//! Optional JSON settings file. Command-line flags and environment variables
//! take precedence over anything set here; unset fields fall back to defaults.

use crate::charts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::data::{DatasetSource, DEFAULT_INFER_SCHEMA_LENGTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Dataset location: a local CSV path or an HTTP(S) URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Directory charts are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    #[serde(default = "default_chart_height")]
    pub chart_height: u32,

    /// Rows scanned when inferring CSV column types
    #[serde(default = "default_infer_schema_length")]
    pub infer_schema_length: usize,
}

fn default_chart_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_chart_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_infer_schema_length() -> usize {
    DEFAULT_INFER_SCHEMA_LENGTH
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            output_dir: None,
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
            infer_schema_length: default_infer_schema_length(),
        }
    }
}

impl DashboardConfig {
    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings file if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Dataset source, preferring an explicit override over the settings file.
    pub fn dataset_source(&self, override_location: Option<&str>) -> DatasetSource {
        override_location
            .or(self.dataset.as_deref())
            .map(DatasetSource::parse)
            .unwrap_or_default()
    }

    /// Chart directory, preferring an explicit override over the settings file.
    pub fn chart_dir(&self, override_dir: Option<&Path>) -> Option<PathBuf> {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.output_dir.clone())
    }
}
