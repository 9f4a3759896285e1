//! Per-athlete totals.

use fitboard_activity_models::{CanonicalActivity, CategoryBuckets, Metric};
use fitboard_scoring_models::{AthleteAggregate, ScoringOptions};

use crate::grouping::{AthleteGroup, group_by_athlete};

/// Sums every athlete's metric into a total and the walk/run/ride buckets.
///
/// Buckets follow the non-exclusive keyword match, so an activity matching
/// both "run" and "ride" counts in both and the buckets need not add up to
/// the total. `is_consistent` is left `false`; see
/// [`crate::dashboard::build_dashboard`].
#[must_use]
pub fn aggregate_totals(
    activities: &[CanonicalActivity],
    options: &ScoringOptions,
) -> Vec<AthleteAggregate> {
    group_by_athlete(activities, options.identity)
        .iter()
        .map(|group| aggregate_group(group, options.metric))
        .collect()
}

fn aggregate_group(group: &AthleteGroup<'_>, metric: Metric) -> AthleteAggregate {
    let mut total = 0.0;
    let mut buckets = CategoryBuckets::default();
    for activity in &group.activities {
        total += activity.metric(metric);
        buckets.add(&activity.buckets(metric));
    }

    AthleteAggregate {
        athlete_id: group.athlete_id.to_owned(),
        name: group.name.to_owned(),
        team_id: group.team_id.map(ToOwned::to_owned),
        total,
        walk: buckets.walk,
        run: buckets.run,
        ride: buckets.ride,
        is_consistent: false,
    }
}
