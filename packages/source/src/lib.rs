#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source table fetching and normalization.
//!
//! Each fetch strategy implements the [`TableSource`] trait. Strategies for
//! one logical table are tried in order by a [`chain::SourceChain`]; the
//! fetched [`RawTable`]s are turned into canonical records by the
//! [`normalize`] module.

pub mod chain;
pub mod csv_download;
pub mod csv_file;
pub mod header;
pub mod normalize;
pub mod parsing;
pub mod sheet;
pub mod source_def;
pub mod type_mapping;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fitboard_source_models::{RawTable, TableRole};

use crate::chain::{FetchOutcome, SourceChain};
use crate::source_def::SourceSet;

/// Errors that can occur during source table operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read, decompression).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A strategy definition is unusable.
    #[error("Source configuration error: {message}")]
    Config {
        /// Description of what is wrong.
        message: String,
    },

    /// Every strategy for a table failed.
    #[error("{role} table unavailable: {}", .attempts.join("; "))]
    Unavailable {
        /// Which table could not be fetched.
        role: TableRole,
        /// One message per failed strategy, in the order tried.
        attempts: Vec<String>,
    },
}

/// Trait that every table fetch strategy implements.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Short description used in logs (e.g. `"sheet:DAILY-UPDATE"`).
    fn label(&self) -> String;

    /// Fetches the whole table.
    ///
    /// An empty table is a successful fetch; only transport, file and
    /// format failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the table cannot be read.
    async fn fetch(&self) -> Result<RawTable, SourceError>;
}

/// Ready-to-fetch chains for every configured table.
#[derive(Debug)]
pub struct TableChains {
    daily: SourceChain,
    summary: Option<SourceChain>,
    roster: Option<SourceChain>,
}

/// The tables fetched for one request.
#[derive(Debug, Clone)]
pub struct FetchedTables {
    /// Activity rows; empty when the source had no data.
    pub daily: RawTable,
    /// Team summary, when configured and non-empty.
    pub summary: Option<RawTable>,
    /// Roster, when configured and non-empty.
    pub roster: Option<RawTable>,
    /// When the activity table was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl SourceSet {
    /// Builds a fetch chain for every configured table.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if any strategy is misconfigured.
    pub fn build(&self, client: &reqwest::Client) -> Result<TableChains, SourceError> {
        Ok(TableChains {
            daily: self.daily.build_chain(TableRole::Daily, client)?,
            summary: self
                .summary
                .as_ref()
                .map(|t| t.build_chain(TableRole::Summary, client))
                .transpose()?,
            roster: self
                .roster
                .as_ref()
                .map(|t| t.build_chain(TableRole::Roster, client))
                .transpose()?,
        })
    }
}

impl TableChains {
    /// Creates chains directly, mainly for tests and embedding.
    #[must_use]
    pub const fn new(
        daily: SourceChain,
        summary: Option<SourceChain>,
        roster: Option<SourceChain>,
    ) -> Self {
        Self {
            daily,
            summary,
            roster,
        }
    }

    /// Fetches all tables, one after another.
    ///
    /// The activity table is required: if every strategy fails the whole
    /// fetch fails. The optional tables degrade to `None` on failure so
    /// that the dashboard can fall back to computed team totals and
    /// unknown genders.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the activity table cannot be
    /// fetched from any strategy.
    pub async fn fetch(&self) -> Result<FetchedTables, SourceError> {
        let daily = match self.daily.fetch().await? {
            FetchOutcome::Rows(table) => table,
            FetchOutcome::Empty => RawTable::default(),
        };
        let fetched_at = Utc::now();

        let summary = fetch_optional(self.summary.as_ref()).await;
        let roster = fetch_optional(self.roster.as_ref()).await;

        Ok(FetchedTables {
            daily,
            summary,
            roster,
            fetched_at,
        })
    }
}

async fn fetch_optional(chain: Option<&SourceChain>) -> Option<RawTable> {
    let chain = chain?;
    match chain.fetch().await {
        Ok(FetchOutcome::Rows(table)) => Some(table),
        Ok(FetchOutcome::Empty) => None,
        Err(e) => {
            log::warn!("Continuing without optional table: {e}");
            None
        }
    }
}
