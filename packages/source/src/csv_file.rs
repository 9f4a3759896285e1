//! Local CSV file strategy.

use std::path::PathBuf;

use async_trait::async_trait;
use fitboard_source_models::RawTable;

use crate::csv_download::parse_csv;
use crate::{SourceError, TableSource};

/// Fetch strategy that reads a CSV file from disk.
#[derive(Debug, Clone)]
pub struct CsvFile {
    path: PathBuf,
    delimiter: u8,
}

impl CsvFile {
    /// Creates a comma-delimited file source.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            delimiter: b',',
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl TableSource for CsvFile {
    fn label(&self) -> String {
        format!("csv_file:{}", self.path.display())
    }

    async fn fetch(&self) -> Result<RawTable, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let table = parse_csv(&bytes, self.delimiter)?;
        log::info!("Read {} rows from {}", table.len(), self.path.display());
        Ok(table)
    }
}
