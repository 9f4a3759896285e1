//! Config-driven table definitions.
//!
//! A [`TableDefinition`] captures where a logical table comes from (an
//! ordered list of [`StrategyConfig`] fetch strategies) and how its columns
//! are recognised (candidate header names per logical field). The whole set
//! of tables is a [`SourceSet`], deserialized from the `[tables]` section of
//! the dashboard config.

use std::collections::BTreeMap;
use std::path::PathBuf;

use fitboard_source_models::TableRole;
use serde::{Deserialize, Serialize};

use crate::chain::SourceChain;
use crate::csv_download::CsvDownload;
use crate::csv_file::CsvFile;
use crate::sheet::SheetExport;
use crate::{SourceError, TableSource};

/// Environment variable consulted for a sheet bearer token by default.
pub const DEFAULT_TOKEN_ENV: &str = "SHEETS_ACCESS_TOKEN";

// ── Top-level table set ──────────────────────────────────────────────────

/// Every table the dashboard reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSet {
    /// Activity rows (required).
    pub daily: TableDefinition<ActivityColumns>,
    /// Authoritative team points.
    pub summary: Option<TableDefinition<SummaryColumns>>,
    /// Team roster with athlete gender.
    pub roster: Option<TableDefinition<RosterColumns>>,
}

impl Default for SourceSet {
    /// The three tabs of the challenge spreadsheet. Sheet ids are left
    /// empty and filled from the `SHEET_ID` override.
    fn default() -> Self {
        Self {
            daily: TableDefinition::sheet("DAILY-UPDATE"),
            summary: Some(TableDefinition::sheet("SUMMARY")),
            roster: Some(TableDefinition::sheet("TEAM DATA")),
        }
    }
}

impl SourceSet {
    /// Lists each configured table with its strategies, in fetch order.
    #[must_use]
    pub fn describe(&self) -> Vec<(TableRole, Vec<String>)> {
        let mut out = vec![(TableRole::Daily, self.daily.describe())];
        if let Some(summary) = &self.summary {
            out.push((TableRole::Summary, summary.describe()));
        }
        if let Some(roster) = &self.roster {
            out.push((TableRole::Roster, roster.describe()));
        }
        out
    }

    /// Fills the sheet id of every `sheet` strategy that lacks one.
    pub fn apply_default_sheet_id(&mut self, sheet_id: &str) {
        self.daily.apply_default_sheet_id(sheet_id);
        if let Some(summary) = &mut self.summary {
            summary.apply_default_sheet_id(sheet_id);
        }
        if let Some(roster) = &mut self.roster {
            roster.apply_default_sheet_id(sheet_id);
        }
    }
}

/// One logical table: fetch strategies plus column recognition hints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TableDefinition<C> {
    /// Strategies, tried in order until one yields rows.
    pub strategies: Vec<StrategyConfig>,
    /// Candidate header names per logical field.
    #[serde(default)]
    pub columns: C,
}

impl<C: Default> TableDefinition<C> {
    /// A single `sheet` strategy with default column hints.
    #[must_use]
    pub fn sheet(tab: &str) -> Self {
        Self {
            strategies: vec![StrategyConfig::Sheet {
                sheet_id: None,
                sheet: tab.to_owned(),
                bearer_token_env: Some(DEFAULT_TOKEN_ENV.to_owned()),
            }],
            columns: C::default(),
        }
    }
}

impl<C> TableDefinition<C> {
    /// Builds the fallback chain for this table.
    ///
    /// `client` is shared by every HTTP strategy.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if a strategy is misconfigured (for
    /// example a `sheet` strategy with no sheet id).
    pub fn build_chain(
        &self,
        role: TableRole,
        client: &reqwest::Client,
    ) -> Result<SourceChain, SourceError> {
        let strategies = self
            .strategies
            .iter()
            .map(|s| s.build(client))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SourceChain::new(role, strategies))
    }

    /// Human-readable strategy labels.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.strategies.iter().map(StrategyConfig::label).collect()
    }

    fn apply_default_sheet_id(&mut self, default_id: &str) {
        for strategy in &mut self.strategies {
            if let StrategyConfig::Sheet { sheet_id, .. } = strategy
                && sheet_id.as_deref().is_none_or(str::is_empty)
            {
                *sheet_id = Some(default_id.to_owned());
            }
        }
    }
}

// ── Fetch strategies ─────────────────────────────────────────────────────

/// How to fetch one table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Google Sheets CSV export of one tab.
    Sheet {
        /// Spreadsheet id. Falls back to the `SHEET_ID` environment
        /// override when omitted.
        sheet_id: Option<String>,
        /// Tab name (e.g. `"DAILY-UPDATE"`).
        sheet: String,
        /// Environment variable holding a bearer token for private sheets.
        bearer_token_env: Option<String>,
    },
    /// CSV file download.
    CsvUrl {
        /// URL of the CSV file.
        url: String,
        /// Field delimiter (default: comma).
        delimiter: Option<String>,
        /// Compression format: `"gzip"` or omit for uncompressed.
        compressed: Option<String>,
        /// Additional HTTP headers.
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    /// Local CSV file.
    CsvFile {
        /// Path to the file.
        path: PathBuf,
        /// Field delimiter (default: comma).
        delimiter: Option<String>,
    },
}

impl StrategyConfig {
    /// Short description for logs and the `sources` command.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Sheet { sheet, .. } => format!("sheet:{sheet}"),
            Self::CsvUrl { url, .. } => format!("csv_url:{url}"),
            Self::CsvFile { path, .. } => format!("csv_file:{}", path.display()),
        }
    }

    fn build(&self, client: &reqwest::Client) -> Result<Box<dyn TableSource>, SourceError> {
        Ok(match self {
            Self::Sheet {
                sheet_id,
                sheet,
                bearer_token_env,
            } => {
                let sheet_id = sheet_id
                    .as_deref()
                    .filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| SourceError::Config {
                        message: format!("sheet strategy for '{sheet}' has no sheet_id"),
                    })?;
                Box::new(SheetExport::new(
                    client.clone(),
                    sheet_id,
                    sheet,
                    bearer_token_env.as_deref(),
                ))
            }
            Self::CsvUrl {
                url,
                delimiter,
                compressed,
                headers,
            } => {
                let mut download = CsvDownload::new(client.clone(), url)
                    .with_gzip(compressed.as_deref() == Some("gzip"));
                if let Some(byte) = delimiter_byte(delimiter.as_deref()) {
                    download = download.with_delimiter(byte);
                }
                for (key, value) in headers {
                    download = download.with_header(key, value);
                }
                Box::new(download)
            }
            Self::CsvFile { path, delimiter } => {
                let mut file = CsvFile::new(path.clone());
                if let Some(byte) = delimiter_byte(delimiter.as_deref()) {
                    file = file.with_delimiter(byte);
                }
                Box::new(file)
            }
        })
    }
}

fn delimiter_byte(delimiter: Option<&str>) -> Option<u8> {
    delimiter.and_then(|d| d.as_bytes().first().copied())
}

// ── Column hints ─────────────────────────────────────────────────────────

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Candidate header names for the activity table.
///
/// Each list is tried in order; see
/// [`HeaderIndex::resolve`](crate::header::HeaderIndex::resolve).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActivityColumns {
    /// Explicit athlete identifier.
    pub athlete_id: Vec<String>,
    /// Display name.
    pub athlete_name: Vec<String>,
    /// Profile URL or path-shaped athlete reference.
    pub athlete_ref: Vec<String>,
    /// Team identifier.
    pub team: Vec<String>,
    /// Activity type text.
    pub activity_type: Vec<String>,
    /// Activity title text.
    pub activity_name: Vec<String>,
    /// Distance value.
    pub distance: Vec<String>,
    /// Distance unit.
    pub unit: Vec<String>,
    /// Activity date or timestamp.
    pub date: Vec<String>,
    /// Precomputed total points.
    pub points: Vec<String>,
    /// Precomputed run points.
    pub run_points: Vec<String>,
    /// Precomputed walk points.
    pub walk_points: Vec<String>,
    /// Precomputed ride points.
    pub ride_points: Vec<String>,
}

impl Default for ActivityColumns {
    fn default() -> Self {
        Self {
            athlete_id: names(&["ID", "ATHLETE_ID", "Athlete ID", "STRAVA_ID"]),
            athlete_name: names(&["Name", "ATHLETE_NAME", "Athlete Name", "Athlete"]),
            athlete_ref: names(&["Profile", "Athlete URL", "ATHLETE_LINK", "URL"]),
            team: names(&["TEAM_ID", "TEAM", "Team Name"]),
            activity_type: names(&["Type", "Activity Type", "Sport Type", "Sport"]),
            activity_name: names(&["Activity", "Activity Name", "Title"]),
            distance: names(&["Distance", "DISTANCE_KM", "KM"]),
            unit: names(&["Unit", "Units", "Distance Unit"]),
            date: names(&[
                "DATE_EXTRACT",
                "Date",
                "Activity Date",
                "Start Date",
                "Timestamp",
            ]),
            points: names(&["CalcTotal", "Points", "Total Points"]),
            run_points: names(&["CalcRun", "Run Points"]),
            walk_points: names(&["CalcWalk", "Walk Points"]),
            ride_points: names(&["CalcRide", "Ride Points"]),
        }
    }
}

/// Candidate header names for the team summary table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SummaryColumns {
    /// Team name.
    pub team: Vec<String>,
    /// Team points.
    pub points: Vec<String>,
}

impl Default for SummaryColumns {
    fn default() -> Self {
        Self {
            team: names(&["TEAM", "Team Name", "TEAM_ID"]),
            points: names(&["POINT", "POINTS", "Total"]),
        }
    }
}

/// Candidate header names for the roster table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RosterColumns {
    /// External athlete id (matches the activity table's athlete id).
    pub athlete_id: Vec<String>,
    /// Gender value.
    pub gender: Vec<String>,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            athlete_id: names(&["STRAVA_ID", "ID", "ATHLETE_ID"]),
            gender: names(&["GENDER", "SEX"]),
        }
    }
}

/// Parses a `[tables]` TOML document into a [`SourceSet`].
///
/// # Errors
///
/// Returns an error if the TOML is malformed or does not match the
/// expected schema.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceSet, toml::de::Error> {
    toml::from_str(toml_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLES: &str = r#"
        [[daily.strategies]]
        type = "sheet"
        sheet = "DAILY-UPDATE"
        bearer_token_env = "SHEETS_TOKEN"

        [[daily.strategies]]
        type = "csv_file"
        path = "data/daily.csv"

        [daily.columns]
        athlete_name = ["Athlete"]

        [[summary.strategies]]
        type = "csv_url"
        url = "https://example.com/summary.csv.gz"
        compressed = "gzip"
        headers = { "X-Api-Key" = "abc" }
    "#;

    #[test]
    fn parses_table_set() {
        let set = parse_source_toml(TABLES).unwrap();
        assert_eq!(set.daily.strategies.len(), 2);
        assert_eq!(set.daily.columns.athlete_name, vec!["Athlete"]);
        // Unspecified hint lists keep their defaults.
        assert_eq!(set.daily.columns.team, ActivityColumns::default().team);
        assert!(set.summary.is_some());
        assert!(set.roster.is_none());
    }

    #[test]
    fn describes_strategies_in_order() {
        let set = parse_source_toml(TABLES).unwrap();
        let described = set.describe();
        assert_eq!(described[0].0, TableRole::Daily);
        assert_eq!(
            described[0].1,
            vec!["sheet:DAILY-UPDATE", "csv_file:data/daily.csv"]
        );
        assert_eq!(described[1].0, TableRole::Summary);
    }

    #[test]
    fn sheet_without_id_is_a_config_error() {
        let set = parse_source_toml(TABLES).unwrap();
        let client = reqwest::Client::new();
        let err = set.daily.build_chain(TableRole::Daily, &client).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn default_set_reads_three_sheets() {
        let set = SourceSet::default();
        let described = set.describe();
        assert_eq!(described.len(), 3);
        assert_eq!(described[2].1, vec!["sheet:TEAM DATA"]);
    }

    #[test]
    fn default_sheet_id_fills_missing_ids() {
        let mut set = parse_source_toml(TABLES).unwrap();
        set.apply_default_sheet_id("sheet-123");
        match &set.daily.strategies[0] {
            StrategyConfig::Sheet { sheet_id, .. } => {
                assert_eq!(sheet_id.as_deref(), Some("sheet-123"));
            }
            other => panic!("unexpected strategy {other:?}"),
        }
        let client = reqwest::Client::new();
        let chain = set.daily.build_chain(TableRole::Daily, &client).unwrap();
        assert_eq!(chain.len(), 2);
    }
}
