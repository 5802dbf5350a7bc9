//! CSV Data Loader Module
//! Reads the sales CSV from disk or over HTTP(S) using Polars.

use super::dataset::{DatasetError, SalesDataset};
use polars::prelude::*;
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Public copy of the historical automobile sales dataset.
pub const DEFAULT_DATASET_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMDeveloperSkillsNetwork-DV0101EN-SkillsNetwork/Data%20Files/historical_automobile_sales.csv";

/// Rows scanned to infer column types.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to download dataset: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),
}

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// `http://` and `https://` locations are URLs, anything else is a file path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DatasetSource::Url(trimmed.to_string())
        } else {
            DatasetSource::Path(PathBuf::from(trimmed))
        }
    }
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::Url(DEFAULT_DATASET_URL.to_string())
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Path(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => f.write_str(url),
        }
    }
}

/// Loads the sales CSV once; the resulting [`SalesDataset`] is immutable.
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }

    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows.max(1);
        self
    }

    /// Load and validate the dataset from any source.
    pub fn load(&self, source: &DatasetSource) -> Result<SalesDataset, LoaderError> {
        info!(%source, "loading sales dataset");
        let df = match source {
            DatasetSource::Path(path) => self.read_csv_file(path)?,
            DatasetSource::Url(url) => self.fetch_csv(url)?,
        };
        debug!(rows = df.height(), columns = df.width(), "raw table read");

        let dataset = SalesDataset::from_dataframe(df)?;
        info!(
            rows = dataset.len(),
            years = dataset.years().len(),
            "dataset ready"
        );
        Ok(dataset)
    }

    /// Read a local CSV file.
    pub fn read_csv_file(&self, path: &std::path::Path) -> Result<DataFrame, LoaderError> {
        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Download a CSV over HTTP(S) and parse it in memory.
    pub fn fetch_csv(&self, url: &str) -> Result<DataFrame, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
        debug!(%url, bytes = bytes.len(), "dataset downloaded");
        self.parse_csv_bytes(bytes.to_vec())
    }

    /// Parse CSV text already held in memory.
    pub fn parse_csv_bytes(&self, bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(df)
    }

    /// Parse and validate CSV text in one step.
    pub fn load_csv_bytes(&self, bytes: Vec<u8>) -> Result<SalesDataset, LoaderError> {
        let df = self.parse_csv_bytes(bytes)?;
        Ok(SalesDataset::from_dataframe(df)?)
    }
}
