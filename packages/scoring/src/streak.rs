//! The "consistent performer" daily rule.
//!
//! An athlete qualifies when, on every day of the challenge window, the
//! longest activities of that day (up to [`StreakRule::top_activities`])
//! add up to the day's threshold. When more than one activity is picked
//! and all of them are rides, the ride threshold applies; otherwise the
//! mixed threshold does.

use chrono::NaiveDate;
use fitboard_activity_models::CanonicalActivity;
use fitboard_scoring_models::{ChallengeWindow, ConsistentAthlete, ScoringOptions, StreakRule};

use crate::grouping::group_by_athlete;

/// Picks the day's longest activities and checks them against the rule.
fn day_qualifies(day: &[&CanonicalActivity], rule: &StreakRule) -> bool {
    if day.is_empty() {
        return false;
    }

    let mut distances: Vec<(f64, bool)> = day
        .iter()
        .map(|a| (a.distance_km, a.category.is_ride()))
        .collect();
    distances.sort_by(|a, b| b.0.total_cmp(&a.0));
    distances.truncate(rule.top_activities.max(1));

    let sum: f64 = distances.iter().map(|(km, _)| km).sum();
    let all_rides = distances.len() > 1 && distances.iter().all(|(_, ride)| *ride);
    let threshold = if all_rides {
        rule.ride_threshold_km
    } else {
        rule.mixed_threshold_km
    };

    sum + StreakRule::TOLERANCE_KM >= threshold
}

/// Returns `true` when one athlete's activities meet the rule on every day
/// of `window`.
///
/// An empty window never qualifies. Undated activities are ignored.
#[must_use]
pub fn qualifies_consistent(
    athlete_activities: &[&CanonicalActivity],
    window: ChallengeWindow,
    rule: &StreakRule,
) -> bool {
    if window.is_empty() {
        return false;
    }

    let in_window: Vec<&CanonicalActivity> = athlete_activities
        .iter()
        .copied()
        .filter(|a| a.activity_date.is_some_and(|d| window.contains(d)))
        .collect();

    window.days().all(|day: NaiveDate| {
        let that_day: Vec<&CanonicalActivity> = in_window
            .iter()
            .copied()
            .filter(|a| a.activity_date == Some(day))
            .collect();
        day_qualifies(&that_day, rule)
    })
}

/// Every athlete meeting the rule, in first-appearance order.
#[must_use]
pub fn consistent_athletes(
    activities: &[CanonicalActivity],
    window: ChallengeWindow,
    options: &ScoringOptions,
) -> Vec<ConsistentAthlete> {
    group_by_athlete(activities, options.identity)
        .into_iter()
        .filter(|group| qualifies_consistent(&group.activities, window, &options.streak))
        .map(|group| ConsistentAthlete {
            athlete_id: group.athlete_id.to_owned(),
            name: group.name.to_owned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{day, dated, ride, run, walk};

    fn check(acts: &[CanonicalActivity], window: ChallengeWindow) -> bool {
        let refs: Vec<&CanonicalActivity> = acts.iter().collect();
        qualifies_consistent(&refs, window, &StreakRule::default())
    }

    fn one_day() -> ChallengeWindow {
        ChallengeWindow::new(day(0), day(0))
    }

    #[test]
    fn single_walk_threshold() {
        assert!(check(&[dated(walk("1", "Alice", 2.5), 0)], one_day()));
        assert!(!check(&[dated(walk("1", "Alice", 1.9), 0)], one_day()));
    }

    #[test]
    fn exact_thresholds_qualify() {
        assert!(check(&[dated(walk("1", "A", 2.0), 0)], one_day()));
        assert!(check(
            &[dated(ride("1", "A", 2.5), 0), dated(ride("1", "A", 2.5), 0)],
            one_day()
        ));
        assert!(check(
            &[dated(ride("1", "A", 0.1 + 0.2), 0), dated(ride("1", "A", 4.7), 0)],
            one_day()
        ));
    }

    #[test]
    fn two_rides_need_five_km() {
        assert!(check(
            &[dated(ride("1", "A", 3.0), 0), dated(ride("1", "A", 2.5), 0)],
            one_day()
        ));
        assert!(!check(
            &[dated(ride("1", "A", 2.0), 0), dated(ride("1", "A", 2.5), 0)],
            one_day()
        ));
        assert!(!check(
            &[dated(ride("1", "A", 2.5), 0), dated(ride("1", "A", 2.49), 0)],
            one_day()
        ));
    }

    #[test]
    fn single_ride_uses_mixed_threshold() {
        assert!(check(&[dated(ride("1", "A", 2.0), 0)], one_day()));
    }

    #[test]
    fn ride_with_run_uses_mixed_threshold() {
        assert!(check(
            &[dated(ride("1", "A", 1.0), 0), dated(run("1", "A", 1.0), 0)],
            one_day()
        ));
    }

    #[test]
    fn only_two_longest_count() {
        let acts = [
            dated(walk("1", "A", 0.9), 0),
            dated(walk("1", "A", 0.9), 0),
            dated(walk("1", "A", 0.9), 0),
        ];
        assert!(!check(&acts, one_day()));
    }

    #[test]
    fn every_day_must_qualify() {
        let window = ChallengeWindow::new(day(0), day(2));
        let full = [
            dated(walk("1", "A", 2.0), 0),
            dated(walk("1", "A", 2.0), 1),
            dated(walk("1", "A", 2.0), 2),
        ];
        assert!(check(&full, window));

        let short_day = [
            dated(walk("1", "A", 2.0), 0),
            dated(walk("1", "A", 1.99), 1),
            dated(walk("1", "A", 2.0), 2),
        ];
        assert!(!check(&short_day, window));

        let missing_day = [dated(walk("1", "A", 2.0), 0), dated(walk("1", "A", 2.0), 2)];
        assert!(!check(&missing_day, window));
    }

    #[test]
    fn reversed_window_never_qualifies() {
        let acts = [dated(walk("1", "A", 50.0), 0), dated(walk("1", "A", 50.0), 1)];
        assert!(!check(&acts, ChallengeWindow::new(day(1), day(0))));
    }

    #[test]
    fn undated_activities_do_not_count() {
        assert!(!check(&[walk("1", "A", 10.0)], one_day()));
    }

    #[test]
    fn configurable_thresholds() {
        let rule = StreakRule {
            mixed_threshold_km: 1.0,
            ..StreakRule::default()
        };
        let act = dated(walk("1", "A", 1.0), 0);
        assert!(qualifies_consistent(&[&act], one_day(), &rule));
    }

    #[test]
    fn lists_qualifying_athletes() {
        let acts = vec![
            dated(walk("1", "Ann", 3.0), 0),
            dated(walk("2", "Bob", 1.0), 0),
            dated(run("3", "Cy", 2.0), 0),
        ];
        let options = ScoringOptions::default();
        let names: Vec<_> = consistent_athletes(&acts, one_day(), &options)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Ann", "Cy"]);
    }
}
