#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Activity category taxonomy and the canonical activity record.
//!
//! Every source table row that survives normalization becomes a
//! [`CanonicalActivity`]. Categories are tracked two ways: a single primary
//! [`Category`] used by the streak rule, and a non-exclusive
//! [`CategoryMatches`] set used when accumulating leaderboard buckets.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Miles to kilometres.
pub const KM_PER_MILE: f64 = 1.60934;

/// Primary activity category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    /// Running or jogging
    Run,
    /// Walking
    Walk,
    /// Cycling of any kind
    Ride,
    /// Anything the keyword match could not place
    Other,
}

impl Category {
    /// Returns `true` for [`Category::Ride`].
    #[must_use]
    pub const fn is_ride(self) -> bool {
        matches!(self, Self::Ride)
    }
}

/// Which keyword buckets an activity's free text matched.
///
/// A row can match more than one bucket (e.g. "run then bike ride"), in
/// which case it contributes to each of them. Leaderboard buckets are
/// therefore not a partition of the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryMatches {
    /// Text contained "walk".
    pub walk: bool,
    /// Text contained "run" or "jog".
    pub run: bool,
    /// Text contained "ride", "cycle" or "bike".
    pub ride: bool,
}

impl CategoryMatches {
    /// No bucket matched.
    pub const NONE: Self = Self {
        walk: false,
        run: false,
        ride: false,
    };

    /// Collapses the match set to a single category.
    ///
    /// Walk wins over run, run over ride; an empty set is
    /// [`Category::Other`].
    #[must_use]
    pub const fn primary(self) -> Category {
        if self.walk {
            Category::Walk
        } else if self.run {
            Category::Run
        } else if self.ride {
            Category::Ride
        } else {
            Category::Other
        }
    }

    /// Returns `true` when no bucket matched.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.walk && !self.run && !self.ride
    }
}

/// Per-category metric accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBuckets {
    /// Walk bucket.
    pub walk: f64,
    /// Run bucket.
    pub run: f64,
    /// Ride bucket.
    pub ride: f64,
}

impl CategoryBuckets {
    /// Adds `value` to every bucket flagged in `matches`.
    pub fn add_matched(&mut self, matches: CategoryMatches, value: f64) {
        if matches.walk {
            self.walk += value;
        }
        if matches.run {
            self.run += value;
        }
        if matches.ride {
            self.ride += value;
        }
    }

    /// Adds another set of buckets component-wise.
    pub fn add(&mut self, other: &Self) {
        self.walk += other.walk;
        self.run += other.run;
        self.ride += other.ride;
    }

    /// Combined run and walk value.
    #[must_use]
    pub fn run_walk(&self) -> f64 {
        self.run + self.walk
    }

    /// Returns the bucket for `category`. [`Category::Other`] has no bucket
    /// and always reads as zero.
    #[must_use]
    pub const fn get(&self, category: Category) -> f64 {
        match category {
            Category::Walk => self.walk,
            Category::Run => self.run,
            Category::Ride => self.ride,
            Category::Other => 0.0,
        }
    }
}

/// Which value an activity contributes to totals and leaderboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Distance in kilometres.
    #[default]
    Distance,
    /// Precomputed points column, falling back to distance for rows that
    /// carry no points value.
    Points,
}

/// Athlete gender as recorded in the team roster.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
    /// Roster value `M`
    Male,
    /// Roster value `F`
    Female,
    /// Missing or unrecognised roster value
    Unknown,
}

impl Gender {
    /// Normalizes a free-form roster value.
    ///
    /// Values are trimmed and upper-cased. A value starting with the `SR`
    /// prefix (`srM`, `SRF`, ...) is reduced to the letter that follows it.
    /// Only a bare `M` or `F` is recognised; everything else is
    /// [`Gender::Unknown`].
    #[must_use]
    pub fn from_roster_value(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        let letter = upper
            .strip_prefix("SR")
            .filter(|rest| !rest.is_empty())
            .and_then(|rest| rest.chars().next())
            .map_or(upper.clone(), String::from);

        match letter.as_str() {
            "M" => Self::Male,
            "F" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// One normalized activity fact derived from a raw spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalActivity {
    /// Stable athlete identifier. Falls back to the trimmed display name
    /// when the source has no id column.
    pub athlete_id: String,
    /// Display name, trimmed.
    pub athlete_name: String,
    /// Team identifier. `None` when blank or a placeholder such as
    /// `"Unknown"`.
    pub team_id: Option<String>,
    /// Primary category, used by the streak rule.
    pub category: Category,
    /// Non-exclusive keyword matches, used for bucket accumulation.
    pub matches: CategoryMatches,
    /// Distance in kilometres, never negative.
    pub distance_km: f64,
    /// Calendar date in the challenge timezone. `None` when the source
    /// date was missing, unparseable or ambiguous.
    pub activity_date: Option<NaiveDate>,
    /// Precomputed total score, when the source carries one.
    pub points: Option<f64>,
    /// Precomputed per-category scores, when the source carries them.
    pub category_points: Option<CategoryBuckets>,
}

impl CanonicalActivity {
    /// The value this activity contributes to its athlete's total.
    #[must_use]
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Distance => self.distance_km,
            Metric::Points => self.points.unwrap_or(self.distance_km),
        }
    }

    /// The values this activity contributes to the walk/run/ride buckets.
    ///
    /// With [`Metric::Points`] and precomputed category scores present, the
    /// scores are used as-is. Otherwise the activity's metric is added to
    /// every bucket its text matched.
    #[must_use]
    pub fn buckets(&self, metric: Metric) -> CategoryBuckets {
        if metric == Metric::Points
            && let Some(points) = self.category_points
        {
            return points;
        }
        let mut buckets = CategoryBuckets::default();
        buckets.add_matched(self.matches, self.metric(metric));
        buckets
    }
}

/// One row of the authoritative team summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummaryRow {
    /// Team name as written in the summary table.
    pub team_id: String,
    /// Points credited to the team.
    pub points: f64,
}

/// Roster lookup from external athlete id to gender.
pub type GenderMap = BTreeMap<String, Gender>;

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(matches: CategoryMatches, km: f64) -> CanonicalActivity {
        CanonicalActivity {
            athlete_id: "A1".to_string(),
            athlete_name: "Alice".to_string(),
            team_id: None,
            category: matches.primary(),
            matches,
            distance_km: km,
            activity_date: None,
            points: None,
            category_points: None,
        }
    }

    #[test]
    fn primary_category_prefers_walk_then_run_then_ride() {
        let all = CategoryMatches {
            walk: true,
            run: true,
            ride: true,
        };
        assert_eq!(all.primary(), Category::Walk);
        let run_ride = CategoryMatches {
            run: true,
            ride: true,
            ..CategoryMatches::NONE
        };
        assert_eq!(run_ride.primary(), Category::Run);
        assert_eq!(CategoryMatches::NONE.primary(), Category::Other);
    }

    #[test]
    fn overlapping_matches_feed_every_bucket() {
        let matches = CategoryMatches {
            run: true,
            ride: true,
            ..CategoryMatches::NONE
        };
        let buckets = activity(matches, 4.0).buckets(Metric::Distance);
        assert!((buckets.run - 4.0).abs() < f64::EPSILON);
        assert!((buckets.ride - 4.0).abs() < f64::EPSILON);
        assert!(buckets.walk.abs() < f64::EPSILON);
    }

    #[test]
    fn points_metric_falls_back_to_distance() {
        let mut a = activity(CategoryMatches::NONE, 3.5);
        assert!((a.metric(Metric::Points) - 3.5).abs() < f64::EPSILON);
        a.points = Some(10.0);
        assert!((a.metric(Metric::Points) - 10.0).abs() < f64::EPSILON);
        assert!((a.metric(Metric::Distance) - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn precomputed_category_points_win_under_points_metric() {
        let mut a = activity(
            CategoryMatches {
                walk: true,
                ..CategoryMatches::NONE
            },
            2.0,
        );
        a.category_points = Some(CategoryBuckets {
            walk: 0.0,
            run: 7.0,
            ride: 1.0,
        });
        let buckets = a.buckets(Metric::Points);
        assert!((buckets.run - 7.0).abs() < f64::EPSILON);
        assert!(buckets.walk.abs() < f64::EPSILON);

        let by_distance = a.buckets(Metric::Distance);
        assert!((by_distance.walk - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gender_normalization() {
        assert_eq!(Gender::from_roster_value("M"), Gender::Male);
        assert_eq!(Gender::from_roster_value(" f "), Gender::Female);
        assert_eq!(Gender::from_roster_value("srM"), Gender::Male);
        assert_eq!(Gender::from_roster_value("SRF"), Gender::Female);
        assert_eq!(Gender::from_roster_value("SR"), Gender::Unknown);
        assert_eq!(Gender::from_roster_value("Male"), Gender::Unknown);
        assert_eq!(Gender::from_roster_value(""), Gender::Unknown);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("ride".parse::<Category>().ok(), Some(Category::Ride));
        assert_eq!(Category::Walk.to_string(), "Walk");
    }

    #[test]
    fn metric_deserializes_snake_case() {
        let m: Metric = serde_json::from_str("\"points\"").unwrap();
        assert_eq!(m, Metric::Points);
    }
}
