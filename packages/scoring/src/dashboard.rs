//! Full dashboard assembly.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use fitboard_scoring_models::{Dashboard, ScoringOptions};

use crate::ActivitySnapshot;
use crate::leaderboard::build_leaderboards;
use crate::streak::consistent_athletes;
use crate::teams::aggregate_teams;
use crate::totals::aggregate_totals;
use crate::window::{latest_activity_date, resolve_window};

/// Text shown when no activity carries a date.
pub const UNKNOWN_UPDATE: &str = "Unknown";

/// Computes everything the dashboard shows from one snapshot.
///
/// `now` only matters when the data set carries no dates at all: the
/// challenge window then ends today in the challenge timezone.
#[must_use]
pub fn build_dashboard(
    snapshot: &ActivitySnapshot,
    options: &ScoringOptions,
    now: DateTime<Utc>,
) -> Dashboard {
    let activities = &snapshot.activities;
    let today = now.with_timezone(&options.timezone).date_naive();
    let window = resolve_window(activities, options, today);

    let mut athletes = aggregate_totals(activities, options);
    let consistent = consistent_athletes(activities, window, options);

    let qualified: BTreeSet<(&str, &str)> = consistent
        .iter()
        .map(|c| (c.athlete_id.as_str(), c.name.as_str()))
        .collect();
    for athlete in &mut athletes {
        athlete.is_consistent =
            qualified.contains(&(athlete.athlete_id.as_str(), athlete.name.as_str()));
    }

    log::debug!(
        "Scored {} activities: {} athletes, {} consistent over {} days",
        activities.len(),
        athletes.len(),
        consistent.len(),
        window.len()
    );

    Dashboard {
        leaderboards: build_leaderboards(&athletes, &snapshot.genders),
        teams: aggregate_teams(activities, snapshot.summary.as_deref(), options.metric),
        athletes,
        consistent,
        window,
        sheet_updated: latest_activity_date(activities).map_or_else(
            || UNKNOWN_UPDATE.to_owned(),
            |date| date.format("%d %b %Y").to_string(),
        ),
        loaded_at: snapshot
            .fetched_at
            .with_timezone(&options.timezone)
            .to_rfc3339(),
    }
}
