//! Team rollup.

use std::collections::HashMap;

use fitboard_activity_models::{CanonicalActivity, Metric, TeamSummaryRow};
use fitboard_scoring_models::{TeamAggregate, TeamOrigin};
use fitboard_source::parsing::is_placeholder_team;

/// Team points, preferring the summary table.
///
/// When `summary` has at least one usable row, its rows are returned as-is
/// in table order. Otherwise each activity's metric is summed per team, in
/// first-appearance order. Placeholder team names are dropped either way.
#[must_use]
pub fn aggregate_teams(
    activities: &[CanonicalActivity],
    summary: Option<&[TeamSummaryRow]>,
    metric: Metric,
) -> Vec<TeamAggregate> {
    let from_summary: Vec<TeamAggregate> = summary
        .unwrap_or_default()
        .iter()
        .filter(|row| !is_placeholder_team(&row.team_id))
        .map(|row| TeamAggregate {
            team_id: row.team_id.trim().to_owned(),
            points: row.points,
            origin: TeamOrigin::Summary,
        })
        .collect();

    if !from_summary.is_empty() {
        return from_summary;
    }

    log::debug!("No team summary rows; summing team points from activities");
    compute_team_totals(activities, metric)
}

fn compute_team_totals(activities: &[CanonicalActivity], metric: Metric) -> Vec<TeamAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut teams: Vec<TeamAggregate> = Vec::new();

    for activity in activities {
        let Some(team) = activity.team_id.as_deref().map(str::trim) else {
            continue;
        };
        if is_placeholder_team(team) {
            continue;
        }
        let slot = *index.entry(team).or_insert_with(|| {
            teams.push(TeamAggregate {
                team_id: team.to_owned(),
                points: 0.0,
                origin: TeamOrigin::Computed,
            });
            teams.len() - 1
        });
        teams[slot].points += activity.metric(metric);
    }

    teams
}
