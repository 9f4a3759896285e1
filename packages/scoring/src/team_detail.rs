//! Member breakdown of a single team.

use fitboard_activity_models::{CanonicalActivity, CategoryBuckets, Metric};
use fitboard_scoring_models::{IdentityKey, TeamDetail, TeamMember};

use crate::grouping::group_by_athlete;

/// Lists the members of `team_id` with their run/walk, ride and total
/// values, sorted by name.
///
/// Members are grouped by athlete id alone. An unknown team yields an empty
/// member list.
#[must_use]
pub fn team_details(activities: &[CanonicalActivity], team_id: &str, metric: Metric) -> TeamDetail {
    let wanted = team_id.trim();
    let team_activities = activities
        .iter()
        .filter(|a| a.team_id.as_deref().map(str::trim) == Some(wanted));

    let mut members: Vec<TeamMember> = group_by_athlete(team_activities, IdentityKey::IdOnly)
        .into_iter()
        .map(|group| {
            let mut buckets = CategoryBuckets::default();
            let mut total = 0.0;
            for activity in &group.activities {
                buckets.add(&activity.buckets(metric));
                total += activity.metric(metric);
            }
            TeamMember {
                athlete_id: group.athlete_id.to_owned(),
                name: group.name.to_owned(),
                run_walk: buckets.run_walk(),
                ride: buckets.ride,
                total,
            }
        })
        .collect();
    members.sort_by(|a, b| a.name.cmp(&b.name));

    let total = members.iter().map(|m| m.total).sum();
    TeamDetail {
        team_id: wanted.to_owned(),
        members,
        total,
    }
}
