//! Activity type mapping.
//!
//! Maps free-text activity type and title fields to keyword buckets.
//! Matching is case-insensitive substring search, and a text may land in
//! several buckets at once (see [`CategoryMatches`]).

use fitboard_activity_models::CategoryMatches;

const WALK_KEYWORDS: &[&str] = &["walk"];
const RUN_KEYWORDS: &[&str] = &["run", "jog"];
const RIDE_KEYWORDS: &[&str] = &["ride", "cycle", "bike"];

/// Matches the given text fields against every keyword bucket.
///
/// All fields are searched together; a keyword in any field sets its bucket.
#[must_use]
pub fn match_activity_text(fields: &[&str]) -> CategoryMatches {
    let lower = fields
        .iter()
        .map(|f| f.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    CategoryMatches {
        walk: contains_any(&lower, WALK_KEYWORDS),
        run: contains_any(&lower, RUN_KEYWORDS),
        ride: contains_any(&lower, RIDE_KEYWORDS),
    }
}

/// Checks if `haystack` contains any of the given `needles`.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
