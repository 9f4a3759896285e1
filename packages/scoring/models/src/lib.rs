#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types of the scoring engine.
//!
//! Everything here is derived from canonical activities on every request
//! and never persisted. The JSON field names are the ones the dashboard
//! page reads.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use fitboard_activity_models::{Category, Metric};
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// How activities are grouped into athletes.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IdentityKey {
    /// One athlete per distinct `(id, name)` pair. A renamed athlete shows
    /// up twice.
    #[default]
    IdAndName,
    /// One athlete per id, labelled with the first name seen.
    IdOnly,
}

/// Thresholds of the daily consistency rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakRule {
    /// Minimum sum when every picked activity is a ride.
    pub ride_threshold_km: f64,
    /// Minimum sum otherwise.
    pub mixed_threshold_km: f64,
    /// How many of the day's longest activities are summed.
    pub top_activities: usize,
}

impl StreakRule {
    /// Slack applied to both thresholds so that float summation error never
    /// fails an exact hit.
    pub const TOLERANCE_KM: f64 = 1e-9;
}

impl Default for StreakRule {
    fn default() -> Self {
        Self {
            ride_threshold_km: 5.0,
            mixed_threshold_km: 2.0,
            top_activities: 2,
        }
    }
}

/// Inputs threaded through every scoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOptions {
    /// Value summed into totals and leaderboards.
    pub metric: Metric,
    /// Athlete grouping key.
    pub identity: IdentityKey,
    /// Consistency rule thresholds.
    pub streak: StreakRule,
    /// First day of the challenge.
    pub start_date: NaiveDate,
    /// Last day of the challenge. When unset, the latest activity date
    /// (or today, for a data set with no dates) closes the window.
    pub end_date: Option<NaiveDate>,
    /// Timezone activity dates and "today" are expressed in.
    pub timezone: Tz,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            identity: IdentityKey::default(),
            streak: StreakRule::default(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 16).unwrap_or_default(),
            end_date: None,
            timezone: chrono_tz::Asia::Kolkata,
        }
    }
}

/// Per-athlete totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteAggregate {
    /// Athlete identifier.
    pub athlete_id: String,
    /// Display name.
    pub name: String,
    /// Team of the athlete's first activity that named one.
    pub team_id: Option<String>,
    /// Sum of the metric over every activity.
    pub total: f64,
    /// Walk bucket.
    pub walk: f64,
    /// Run bucket.
    pub run: f64,
    /// Ride bucket.
    pub ride: f64,
    /// Met the daily rule on every day of the challenge window.
    pub is_consistent: bool,
}

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Athlete identifier.
    pub athlete_id: String,
    /// Display name.
    pub name: String,
    /// Team, if known.
    pub team_id: Option<String>,
    /// Ranked value.
    pub points: f64,
}

/// Every ranked list shown on the dashboard, highest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboards {
    /// All athletes by total, zeros included.
    pub total: Vec<LeaderboardEntry>,
    /// Walk bucket, zeros excluded.
    pub walk: Vec<LeaderboardEntry>,
    /// Run bucket, zeros excluded.
    pub run: Vec<LeaderboardEntry>,
    /// Ride bucket, zeros excluded.
    pub ride: Vec<LeaderboardEntry>,
    /// Men by run plus walk.
    pub men_run: Vec<LeaderboardEntry>,
    /// Women by run plus walk.
    pub women_run: Vec<LeaderboardEntry>,
    /// Men by ride.
    pub men_ride: Vec<LeaderboardEntry>,
    /// Women by ride.
    pub women_ride: Vec<LeaderboardEntry>,
}

/// Where a team's points came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TeamOrigin {
    /// Copied from the team summary table.
    Summary,
    /// Summed from activities.
    Computed,
}

/// One team's points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    /// Team name.
    pub team_id: String,
    /// Team points.
    pub points: f64,
    /// Source of `points`.
    pub origin: TeamOrigin,
}

/// Inclusive date range the consistency rule and histories cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeWindow {
    /// First day.
    pub start: NaiveDate,
    /// Last day. Before `start` means the window is empty.
    pub end: NaiveDate,
}

impl ChallengeWindow {
    /// Creates a window.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns `true` when `end` is before `start`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Number of days in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    /// Returns `true` when `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates over every day, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        (0..self.len()).map(move |offset| {
            start + Duration::days(i64::try_from(offset).unwrap_or(i64::MAX))
        })
    }
}

/// An athlete that met the daily rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistentAthlete {
    /// Athlete identifier.
    pub athlete_id: String,
    /// Display name.
    pub name: String,
}

/// One member row of a team page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Athlete identifier.
    pub athlete_id: String,
    /// First name seen for the athlete in this team.
    pub name: String,
    /// Run plus walk buckets.
    pub run_walk: f64,
    /// Ride bucket.
    pub ride: f64,
    /// Metric total.
    pub total: f64,
}

/// Members of one team, sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDetail {
    /// Requested team.
    pub team_id: String,
    /// Members, sorted by name. Empty for an unknown team.
    pub members: Vec<TeamMember>,
    /// Sum of member totals.
    pub total: f64,
}

/// Serializes daily values, writing `"-"` for days without activity.
#[allow(clippy::ptr_arg)]
fn dash_for_zero<S: Serializer>(values: &Vec<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq as _;

    #[derive(Serialize)]
    #[serde(untagged)]
    enum Cell {
        Value(f64),
        Dash(&'static str),
    }

    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for value in values {
        if *value > 0.0 {
            seq.serialize_element(&Cell::Value(*value))?;
        } else {
            seq.serialize_element(&Cell::Dash("-"))?;
        }
    }
    seq.end()
}

/// One category row of an athlete history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHistory {
    /// Category of the row.
    #[serde(rename = "type")]
    pub category: Category,
    /// Value per window day, aligned with [`AthleteHistory::dates`].
    #[serde(serialize_with = "dash_for_zero")]
    pub values: Vec<f64>,
    /// Sum over the window.
    pub total: f64,
    /// Days with a positive value.
    pub active_days: usize,
}

/// Day-by-day activity of one athlete over the challenge window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AthleteHistory {
    /// Requested athlete.
    pub athlete_id: String,
    /// Day labels (`dd/mm`). Empty for an unknown athlete.
    pub dates: Vec<String>,
    /// Run, walk and ride rows that have activity.
    pub daily_activities: Vec<CategoryHistory>,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Per-athlete totals, in first-appearance order.
    pub athletes: Vec<AthleteAggregate>,
    /// Ranked lists.
    pub leaderboards: Leaderboards,
    /// Team points.
    pub teams: Vec<TeamAggregate>,
    /// Athletes meeting the daily rule.
    pub consistent: Vec<ConsistentAthlete>,
    /// Window the daily rule was checked over.
    pub window: ChallengeWindow,
    /// Latest activity date as `%d %b %Y`, or `"Unknown"`.
    pub sheet_updated: String,
    /// Fetch time in the challenge timezone, RFC 3339.
    pub loaded_at: String,
}
