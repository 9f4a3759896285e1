//! Challenge window resolution.

use chrono::NaiveDate;
use fitboard_activity_models::CanonicalActivity;
use fitboard_scoring_models::{ChallengeWindow, ScoringOptions};

/// Latest activity date in the data set.
#[must_use]
pub fn latest_activity_date(activities: &[CanonicalActivity]) -> Option<NaiveDate> {
    activities.iter().filter_map(|a| a.activity_date).max()
}

/// Resolves the window the daily rule and histories cover.
///
/// The end is the configured end date if set, else the latest activity
/// date, else `today`.
#[must_use]
pub fn resolve_window(
    activities: &[CanonicalActivity],
    options: &ScoringOptions,
    today: NaiveDate,
) -> ChallengeWindow {
    let end = options
        .end_date
        .or_else(|| latest_activity_date(activities))
        .unwrap_or(today);
    ChallengeWindow::new(options.start_date, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{day, dated, walk};

    fn options(end: Option<NaiveDate>) -> ScoringOptions {
        ScoringOptions {
            start_date: day(0),
            end_date: end,
            ..ScoringOptions::default()
        }
    }

    #[test]
    fn end_defaults_to_latest_data_date() {
        let acts = vec![dated(walk("1", "A", 1.0), 4), dated(walk("1", "A", 1.0), 2)];
        let window = resolve_window(&acts, &options(None), day(30));
        assert_eq!(window.end, day(4));
    }

    #[test]
    fn today_only_without_dates() {
        let acts = vec![walk("1", "A", 1.0)];
        let window = resolve_window(&acts, &options(None), day(9));
        assert_eq!(window, ChallengeWindow::new(day(0), day(9)));
    }

    #[test]
    fn configured_end_wins() {
        let acts = vec![dated(walk("1", "A", 1.0), 4)];
        let window = resolve_window(&acts, &options(Some(day(1))), day(30));
        assert_eq!(window.end, day(1));
    }
}
