//! Men's and women's boards.
//!
//! Gender comes from the roster table, keyed by athlete id. Athletes that
//! are missing from the roster or carry an unrecognised value appear on
//! none of these boards.

use fitboard_activity_models::{Gender, GenderMap};
use fitboard_scoring_models::{AthleteAggregate, LeaderboardEntry};

use crate::leaderboard::rank;

/// The four gender boards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenderBoards {
    /// Men by run plus walk.
    pub men_run: Vec<LeaderboardEntry>,
    /// Women by run plus walk.
    pub women_run: Vec<LeaderboardEntry>,
    /// Men by ride.
    pub men_ride: Vec<LeaderboardEntry>,
    /// Women by ride.
    pub women_ride: Vec<LeaderboardEntry>,
}

/// Looks up an athlete's gender, defaulting to unknown.
#[must_use]
pub fn gender_of(genders: &GenderMap, athlete_id: &str) -> Gender {
    genders
        .get(athlete_id.trim())
        .copied()
        .unwrap_or(Gender::Unknown)
}

/// Ranks men and women separately by run plus walk and by ride.
#[must_use]
pub fn gender_boards(athletes: &[AthleteAggregate], genders: &GenderMap) -> GenderBoards {
    let (men, women): (Vec<_>, Vec<_>) = athletes
        .iter()
        .filter_map(|a| match gender_of(genders, &a.athlete_id) {
            Gender::Unknown => None,
            g => Some((g, a)),
        })
        .partition(|(g, _)| *g == Gender::Male);
    let men: Vec<&AthleteAggregate> = men.into_iter().map(|(_, a)| a).collect();
    let women: Vec<&AthleteAggregate> = women.into_iter().map(|(_, a)| a).collect();

    GenderBoards {
        men_run: rank(men.iter().copied(), |a| a.run + a.walk, false),
        women_run: rank(women.iter().copied(), |a| a.run + a.walk, false),
        men_ride: rank(men.iter().copied(), |a| a.ride, false),
        women_ride: rank(women.iter().copied(), |a| a.ride, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(id: &str, run: f64, walk: f64, ride: f64) -> AthleteAggregate {
        AthleteAggregate {
            athlete_id: id.to_owned(),
            name: id.to_owned(),
            team_id: None,
            total: run + walk + ride,
            walk,
            run,
            ride,
            is_consistent: false,
        }
    }

    fn roster() -> GenderMap {
        GenderMap::from([
            ("m1".to_owned(), Gender::Male),
            ("m2".to_owned(), Gender::Male),
            ("f1".to_owned(), Gender::Female),
            ("u1".to_owned(), Gender::Unknown),
        ])
    }

    #[test]
    fn splits_by_gender_and_excludes_unknown() {
        let athletes = vec![
            athlete("m1", 2.0, 1.0, 0.0),
            athlete("f1", 0.0, 4.0, 10.0),
            athlete("u1", 9.0, 9.0, 9.0),
            athlete("stranger", 9.0, 9.0, 9.0),
            athlete("m2", 5.0, 0.0, 20.0),
        ];
        let boards = gender_boards(&athletes, &roster());

        let men_run: Vec<_> = boards.men_run.iter().map(|e| e.athlete_id.as_str()).collect();
        assert_eq!(men_run, vec!["m2", "m1"]);
        assert!((boards.men_run[1].points - 3.0).abs() < 1e-9);

        assert_eq!(boards.men_ride.len(), 1);
        assert_eq!(boards.women_run.len(), 1);
        assert_eq!(boards.women_ride[0].athlete_id, "f1");

        let all = [&boards.men_run, &boards.women_run, &boards.men_ride, &boards.women_ride];
        assert!(all
            .iter()
            .flat_map(|b| b.iter())
            .all(|e| e.athlete_id != "u1" && e.athlete_id != "stranger"));
    }

    #[test]
    fn lookup_trims_ids() {
        assert_eq!(gender_of(&roster(), " f1 "), Gender::Female);
        assert_eq!(gender_of(&roster(), "nobody"), Gender::Unknown);
    }
}
