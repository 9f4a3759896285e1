//! Google Sheets tab strategy.
//!
//! Reads one tab through the sheet's CSV export endpoint. Public sheets need
//! no credentials; private sheets take a bearer token from an environment
//! variable, read on every fetch so that a rotated token is picked up
//! without a restart.

use async_trait::async_trait;
use fitboard_source_models::RawTable;

use crate::csv_download::CsvDownload;
use crate::{SourceError, TableSource};

/// Base URL of the sheets CSV export endpoint.
const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Fetch strategy for one spreadsheet tab.
#[derive(Debug, Clone)]
pub struct SheetExport {
    client: reqwest::Client,
    base_url: String,
    sheet_id: String,
    sheet: String,
    bearer_token_env: Option<String>,
}

impl SheetExport {
    /// Creates a strategy for tab `sheet` of spreadsheet `sheet_id`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        sheet_id: &str,
        sheet: &str,
        bearer_token_env: Option<&str>,
    ) -> Self {
        Self {
            client,
            base_url: SHEETS_BASE_URL.to_owned(),
            sheet_id: sheet_id.to_owned(),
            sheet: sheet.to_owned(),
            bearer_token_env: bearer_token_env.map(ToOwned::to_owned),
        }
    }

    /// Points the strategy at a different export host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.trim_end_matches('/').clone_into(&mut self.base_url);
        self
    }

    /// The export URL, without query parameters.
    #[must_use]
    pub fn export_url(&self) -> String {
        format!("{}/{}/gviz/tq", self.base_url, self.sheet_id)
    }

    fn bearer_token<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = self.bearer_token_env.as_deref()?;
        match lookup(var) {
            Some(token) if !token.trim().is_empty() => Some(token.trim().to_owned()),
            _ => {
                log::debug!("{var} is not set; fetching sheet '{}' without credentials", self.sheet);
                None
            }
        }
    }

    async fn fetch_with<F>(&self, lookup: F) -> Result<RawTable, SourceError>
    where
        F: Fn(&str) -> Option<String> + Send,
    {
        let mut download = CsvDownload::new(self.client.clone(), &self.export_url())
            .with_query("tqx", "out:csv")
            .with_query("sheet", &self.sheet);
        if let Some(token) = self.bearer_token(lookup) {
            download = download.with_header("Authorization", &format!("Bearer {token}"));
        }

        let table = download.fetch().await?;
        log::info!("Loaded {}: {} rows", self.sheet, table.len());
        Ok(table)
    }
}

#[async_trait]
impl TableSource for SheetExport {
    fn label(&self) -> String {
        format!("sheet:{}", self.sheet)
    }

    async fn fetch(&self) -> Result<RawTable, SourceError> {
        self.fetch_with(|var| std::env::var(var).ok()).await
    }
}
