//! Ranked lists.

use fitboard_activity_models::GenderMap;
use fitboard_scoring_models::{AthleteAggregate, LeaderboardEntry, Leaderboards};

use crate::gender::gender_boards;

/// Ranks athletes by `value`, highest first.
///
/// The sort is stable: ties keep their input order. Entries whose value is
/// not positive are dropped unless `keep_zero` is set.
#[must_use]
pub fn rank<'a, I, F>(athletes: I, value: F, keep_zero: bool) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a AthleteAggregate>,
    F: Fn(&AthleteAggregate) -> f64,
{
    let mut entries: Vec<LeaderboardEntry> = athletes
        .into_iter()
        .filter_map(|athlete| {
            let points = value(athlete);
            (keep_zero || points > 0.0).then(|| LeaderboardEntry {
                athlete_id: athlete.athlete_id.clone(),
                name: athlete.name.clone(),
                team_id: athlete.team_id.clone(),
                points,
            })
        })
        .collect();
    entries.sort_by(|a, b| b.points.total_cmp(&a.points));
    entries
}

/// Builds every leaderboard from athlete totals.
#[must_use]
pub fn build_leaderboards(athletes: &[AthleteAggregate], genders: &GenderMap) -> Leaderboards {
    let gender = gender_boards(athletes, genders);
    Leaderboards {
        total: rank(athletes, |a| a.total, true),
        walk: rank(athletes, |a| a.walk, false),
        run: rank(athletes, |a| a.run, false),
        ride: rank(athletes, |a| a.ride, false),
        men_run: gender.men_run,
        women_run: gender.women_run,
        men_ride: gender.men_ride,
        women_ride: gender.women_ride,
    }
}
