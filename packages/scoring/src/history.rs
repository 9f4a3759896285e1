//! Day-by-day activity of one athlete.

use fitboard_activity_models::{CanonicalActivity, Category, CategoryBuckets, Metric};
use fitboard_scoring_models::{AthleteHistory, CategoryHistory, ChallengeWindow};

/// Categories shown in a history, in display order.
const HISTORY_CATEGORIES: [Category; 3] = [Category::Run, Category::Walk, Category::Ride];

/// Builds the per-day run/walk/ride table for `athlete_id` over `window`.
///
/// A category row is included only when it has a positive value on some
/// day. An athlete with no activities gets an empty history.
#[must_use]
pub fn athlete_history(
    activities: &[CanonicalActivity],
    athlete_id: &str,
    window: ChallengeWindow,
    metric: Metric,
) -> AthleteHistory {
    let wanted = athlete_id.trim();
    let own: Vec<&CanonicalActivity> = activities
        .iter()
        .filter(|a| a.athlete_id.trim() == wanted)
        .collect();

    if own.is_empty() {
        return AthleteHistory {
            athlete_id: wanted.to_owned(),
            ..AthleteHistory::default()
        };
    }

    let days: Vec<_> = window.days().collect();
    let per_day: Vec<_> = days
        .iter()
        .map(|day| {
            let mut buckets = CategoryBuckets::default();
            for activity in own.iter().filter(|a| a.activity_date == Some(*day)) {
                buckets.add(&activity.buckets(metric));
            }
            buckets
        })
        .collect();

    let daily_activities = HISTORY_CATEGORIES
        .iter()
        .filter_map(|category| {
            let values: Vec<f64> = per_day.iter().map(|b| b.get(*category)).collect();
            let active_days = values.iter().filter(|v| **v > 0.0).count();
            (active_days > 0).then(|| CategoryHistory {
                category: *category,
                total: values.iter().filter(|v| **v > 0.0).sum(),
                values,
                active_days,
            })
        })
        .collect();

    AthleteHistory {
        athlete_id: wanted.to_owned(),
        dates: days.iter().map(|d| d.format("%d/%m").to_string()).collect(),
        daily_activities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{day, dated, ride, run, walk};

    #[test]
    fn builds_day_columns_with_active_categories() {
        let acts = vec![
            dated(run("1", "Ann", 3.0), 0),
            dated(run("1", "Ann", 2.0), 0),
            dated(run("1", "Ann", 4.0), 2),
            dated(walk("2", "Bob", 9.0), 1),
            walk("1", "Ann", 7.0),
        ];
        let window = ChallengeWindow::new(day(0), day(2));
        let history = athlete_history(&acts, "1", window, Metric::Distance);

        assert_eq!(history.dates, vec!["16/11", "17/11", "18/11"]);
        assert_eq!(history.daily_activities.len(), 1);
        let runs = &history.daily_activities[0];
        assert_eq!(runs.category, Category::Run);
        assert_eq!(runs.values, vec![5.0, 0.0, 4.0]);
        assert!((runs.total - 9.0).abs() < 1e-9);
        assert_eq!(runs.active_days, 2);
    }

    #[test]
    fn categories_in_run_walk_ride_order() {
        let acts = vec![
            dated(ride("1", "Ann", 10.0), 0),
            dated(walk("1", "Ann", 1.0), 0),
            dated(run("1", "Ann", 1.0), 0),
        ];
        let history =
            athlete_history(&acts, "1", ChallengeWindow::new(day(0), day(0)), Metric::Distance);
        let order: Vec<_> = history.daily_activities.iter().map(|c| c.category).collect();
        assert_eq!(order, vec![Category::Run, Category::Walk, Category::Ride]);
    }

    #[test]
    fn unknown_athlete_is_empty() {
        let acts = vec![dated(run("1", "Ann", 3.0), 0)];
        let history =
            athlete_history(&acts, "404", ChallengeWindow::new(day(0), day(3)), Metric::Distance);
        assert!(history.dates.is_empty());
        assert!(history.daily_activities.is_empty());
    }

    #[test]
    fn serializes_idle_days_as_dash() {
        let acts = vec![dated(walk("1", "Ann", 2.0), 1)];
        let history =
            athlete_history(&acts, "1", ChallengeWindow::new(day(0), day(1)), Metric::Distance);
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["daily_activities"][0]["values"], serde_json::json!(["-", 2.0]));
    }
}
