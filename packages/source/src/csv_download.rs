//! CSV file downloader and parser.
//!
//! Downloads a CSV (optionally gzip-compressed) from a URL and parses it
//! into a [`RawTable`]. Headers are kept exactly as the file has them;
//! cleanup happens during normalization.

use std::collections::BTreeMap;
use std::io::Read as _;

use async_trait::async_trait;
use fitboard_source_models::RawTable;

use crate::{SourceError, TableSource};

/// Fetch strategy that downloads and parses a CSV file.
#[derive(Debug, Clone)]
pub struct CsvDownload {
    client: reqwest::Client,
    /// URL of the CSV file to download.
    url: String,
    /// Query parameters appended to the URL.
    query: Vec<(String, String)>,
    /// Additional HTTP headers for the download request.
    headers: BTreeMap<String, String>,
    /// Whether the response body is gzip-compressed.
    is_gzipped: bool,
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
}

impl CsvDownload {
    /// Creates a download for `url` with default settings (comma-delimited,
    /// not gzipped, no extra headers).
    #[must_use]
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_owned(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            is_gzipped: false,
            delimiter: b',',
        }
    }

    /// Marks the download as gzip-compressed so that the response body will
    /// be decompressed before CSV parsing.
    #[must_use]
    pub const fn with_gzip(mut self, gzipped: bool) -> Self {
        self.is_gzipped = gzipped;
        self
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Adds an HTTP header to include in the download request.
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Adds a query parameter to the download URL.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Downloads the body, decompressing it when configured.
    async fn download(&self) -> Result<Vec<u8>, SourceError> {
        let mut request = self.client.get(&self.url).query(&self.query);
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        let response = request.send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        log::debug!("Downloaded {} bytes from {}", bytes.len(), self.url);

        if self.is_gzipped {
            let mut decoder = flate2::read::GzDecoder::new(&bytes[..]);
            let mut decompressed = Vec::new();
            decoder.read_to_end(&mut decompressed)?;
            log::debug!("Decompressed to {} bytes", decompressed.len());
            Ok(decompressed)
        } else {
            Ok(bytes.to_vec())
        }
    }
}

#[async_trait]
impl TableSource for CsvDownload {
    fn label(&self) -> String {
        format!("csv_url:{}", self.url)
    }

    async fn fetch(&self) -> Result<RawTable, SourceError> {
        let body = self.download().await?;
        let table = parse_csv(&body, self.delimiter)?;
        log::info!("Parsed {} rows from CSV at {}", table.len(), self.url);
        Ok(table)
    }
}

/// Parses CSV bytes into a [`RawTable`].
///
/// The first record is the header row. Rows may have more or fewer cells
/// than the header. An empty input yields an empty table. Cells that are
/// not valid UTF-8 are decoded lossily rather than failing the table.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the reader itself fails.
pub fn parse_csv(bytes: &[u8], delimiter: u8) -> Result<RawTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    let mut repaired = 0_usize;
    for result in reader.byte_records() {
        let record = result?;
        let row = record
            .iter()
            .map(|cell| match std::str::from_utf8(cell) {
                Ok(text) => text.to_owned(),
                Err(_) => {
                    repaired += 1;
                    String::from_utf8_lossy(cell).into_owned()
                }
            })
            .collect::<Vec<_>>();
        grid.push(row);
    }
    if repaired > 0 {
        log::debug!("Decoded {repaired} non-UTF-8 CSV cells lossily");
    }

    Ok(RawTable::from_grid(grid))
}
