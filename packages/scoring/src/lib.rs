#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Challenge scoring engine.
//!
//! Turns normalized activities into athlete totals, leaderboards, team
//! points and the set of athletes meeting the daily consistency rule. All
//! computation is synchronous and request-local; only
//! [`load_snapshot`] touches the network.

pub mod dashboard;
pub mod gender;
pub mod grouping;
pub mod history;
pub mod leaderboard;
pub mod streak;
pub mod team_detail;
pub mod teams;
pub mod totals;
pub mod window;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use fitboard_activity_models::{CanonicalActivity, GenderMap, TeamSummaryRow};
use fitboard_source::normalize::{normalize_activities, normalize_roster, normalize_team_summary};
use fitboard_source::source_def::SourceSet;
use fitboard_source::{FetchedTables, SourceError, TableChains};
use thiserror::Error;

/// Errors that can occur while producing a dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A required source table could not be fetched.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl DashboardError {
    /// Returns `true` when the failure is an upstream outage rather than a
    /// local fault.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Source(SourceError::Unavailable { .. } | SourceError::Http(_))
        )
    }
}

/// Normalized contents of one fetch.
#[derive(Debug, Clone)]
pub struct ActivitySnapshot {
    /// Canonical activities from the daily table.
    pub activities: Vec<CanonicalActivity>,
    /// Team summary rows, when the table was available.
    pub summary: Option<Vec<TeamSummaryRow>>,
    /// Roster genders; empty when the roster was unavailable.
    pub genders: GenderMap,
    /// When the daily table was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl ActivitySnapshot {
    /// Normalizes freshly fetched tables using the column hints of
    /// `sources`.
    #[must_use]
    pub fn from_tables(tables: &FetchedTables, sources: &SourceSet, tz: Tz) -> Self {
        let activities = normalize_activities(&tables.daily, &sources.daily.columns, tz);

        let summary = match (&tables.summary, &sources.summary) {
            (Some(table), Some(def)) => Some(normalize_team_summary(table, &def.columns)),
            _ => None,
        };
        let genders = match (&tables.roster, &sources.roster) {
            (Some(table), Some(def)) => normalize_roster(table, &def.columns),
            _ => GenderMap::new(),
        };

        Self {
            activities,
            summary,
            genders,
            fetched_at: tables.fetched_at,
        }
    }

    /// Returns `true` when the daily table produced no activities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// Fetches every table and normalizes it.
///
/// # Errors
///
/// Returns [`DashboardError::Source`] if the daily table could not be
/// fetched from any strategy.
pub async fn load_snapshot(
    chains: &TableChains,
    sources: &SourceSet,
    tz: Tz,
) -> Result<ActivitySnapshot, DashboardError> {
    let tables = chains.fetch().await?;
    let snapshot = ActivitySnapshot::from_tables(&tables, sources, tz);
    log::info!(
        "Loaded {} activities ({} daily rows)",
        snapshot.activities.len(),
        tables.daily.len()
    );
    Ok(snapshot)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, NaiveDate};
    use fitboard_activity_models::{CanonicalActivity, CategoryMatches};

    pub fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 16).unwrap() + Duration::days(offset)
    }

    pub fn activity(id: &str, name: &str, matches: CategoryMatches, km: f64) -> CanonicalActivity {
        CanonicalActivity {
            athlete_id: id.to_owned(),
            athlete_name: name.to_owned(),
            team_id: None,
            category: matches.primary(),
            matches,
            distance_km: km,
            activity_date: None,
            points: None,
            category_points: None,
        }
    }

    pub fn walk(id: &str, name: &str, km: f64) -> CanonicalActivity {
        activity(
            id,
            name,
            CategoryMatches {
                walk: true,
                ..CategoryMatches::NONE
            },
            km,
        )
    }

    pub fn run(id: &str, name: &str, km: f64) -> CanonicalActivity {
        activity(
            id,
            name,
            CategoryMatches {
                run: true,
                ..CategoryMatches::NONE
            },
            km,
        )
    }

    pub fn ride(id: &str, name: &str, km: f64) -> CanonicalActivity {
        activity(
            id,
            name,
            CategoryMatches {
                ride: true,
                ..CategoryMatches::NONE
            },
            km,
        )
    }

    pub fn dated(mut activity: CanonicalActivity, offset: i64) -> CanonicalActivity {
        activity.activity_date = Some(day(offset));
        activity
    }

    pub fn on_team(mut activity: CanonicalActivity, team: &str) -> CanonicalActivity {
        activity.team_id = Some(team.to_owned());
        activity
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use fitboard_source::chain::SourceChain;
    use fitboard_source::csv_file::CsvFile;
    use fitboard_source::TableSource;
    use fitboard_source_models::TableRole;

    use super::*;

    fn file_chain(role: TableRole, path: PathBuf) -> SourceChain {
        SourceChain::new(role, vec![Box::new(CsvFile::new(path)) as Box<dyn TableSource>])
    }

    #[tokio::test]
    async fn loads_and_normalizes_every_table() {
        let dir = std::env::temp_dir().join("fitboard_scoring_snapshot_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("daily.csv"),
            "ID,Name,TEAM_ID,Type,Distance,DATE_EXTRACT\n7,Ann,Falcons,Walk,2.5,2025-11-16\n,,,,,\n",
        )
        .unwrap();
        std::fs::write(dir.join("roster.csv"), "STRAVA_ID,GENDER\n7,F\n").unwrap();

        let chains = TableChains::new(
            file_chain(TableRole::Daily, dir.join("daily.csv")),
            Some(file_chain(TableRole::Summary, dir.join("missing.csv"))),
            Some(file_chain(TableRole::Roster, dir.join("roster.csv"))),
        );
        let snapshot = load_snapshot(&chains, &SourceSet::default(), chrono_tz::Asia::Kolkata)
            .await
            .unwrap();

        assert_eq!(snapshot.activities.len(), 1);
        assert_eq!(snapshot.activities[0].athlete_id, "7");
        assert!(snapshot.summary.is_none());
        assert_eq!(snapshot.genders.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_daily_table_is_unavailable() {
        let chains = TableChains::new(
            file_chain(TableRole::Daily, PathBuf::from("/no/such/daily.csv")),
            None,
            None,
        );
        let err = load_snapshot(&chains, &SourceSet::default(), chrono_tz::UTC)
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
