//! Cell parsing utilities shared by the normalizers.
//!
//! Every function here is total: malformed input yields zero or `None`,
//! never an error.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike as _, Duration, NaiveDate, NaiveDateTime, TimeZone as _};
use chrono_tz::Tz;
use fitboard_activity_models::KM_PER_MILE;
use regex::Regex;

static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)").unwrap_or_else(|_| unreachable!())
});

static SLASH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/.](\d{1,2})[/.](\d{2}|\d{4})(?:[ T]+.*)?$")
        .unwrap_or_else(|_| unreachable!())
});

/// Spreadsheet serial day numbers count from this date.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial day numbers outside this range are not treated as dates
/// (roughly 1954 through 2118).
const SERIAL_RANGE: std::ops::Range<f64> = 20_000.0..80_000.0;

/// Earliest year accepted from a formatted date; chrono's `%Y` also
/// matches one and two digit years.
const MIN_YEAR: i32 = 1000;

/// Team cells that mean "no team".
const TEAM_PLACEHOLDERS: &[&str] = &["", "nan", "none", "null", "unknown", "n/a", "-"];

/// Naive datetime formats, tried in order. Values without a zone are taken
/// to be in the challenge timezone already.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Zoned datetime formats accepted by [`DateTime::parse_from_str`].
const ZONED_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M%z",
];

/// Date-only formats.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

/// Extracts the leading numeric token of a cell.
///
/// Thousands separators are ignored and trailing text (units, notes) is
/// dropped: `"1,234.5 km"` parses as `1234.5`. Returns `None` when the cell
/// does not start with a number.
#[must_use]
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let token = LEADING_NUMBER_RE.find(&cleaned)?;
    token.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a numeric cell, treating anything unparseable as zero.
#[must_use]
pub fn parse_number_or_zero(raw: &str) -> f64 {
    parse_leading_number(raw).unwrap_or(0.0)
}

/// Returns `true` when a unit cell indicates miles.
///
/// Matches any text containing `"mile"` or an `"mi"` word, so `"Miles"`,
/// `"mi"` and `"mi."` all count while `"min"` does not.
#[must_use]
pub fn is_miles_unit(unit: &str) -> bool {
    let lower = unit.to_lowercase();
    lower.contains("mile")
        || lower
            .split(|c: char| !c.is_ascii_alphabetic())
            .any(|word| word == "mi")
}

/// Parses a distance cell to kilometres.
///
/// Negative and unparseable values become `0.0`. Miles are converted only
/// when `unit` says so.
#[must_use]
pub fn parse_distance_km(raw: &str, unit: Option<&str>) -> f64 {
    let value = parse_number_or_zero(raw).max(0.0);
    if unit.is_some_and(is_miles_unit) {
        value * KM_PER_MILE
    } else {
        value
    }
}

/// Parses an activity date cell into a calendar date in `tz`.
///
/// Accepted inputs, in order:
///
/// - spreadsheet serial day numbers (`45976`, `45976.5`);
/// - RFC 3339 and other zoned timestamps, converted into `tz`;
/// - timestamps ending in `Z` or `UTC`, converted into `tz`;
/// - naive timestamps and dates, taken as already being in `tz`;
/// - `a/b/yyyy` dates, when the day/month order can be decided.
///
/// Returns `None` for anything else, including ambiguous slash dates such
/// as `03/04/2025`.
#[must_use]
pub fn parse_activity_date(raw: &str, tz: Tz) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_serial_date(s) {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&tz).date_naive());
    }
    for format in ZONED_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format)
            && dt.year() >= MIN_YEAR
        {
            return Some(dt.with_timezone(&tz).date_naive());
        }
    }

    if let Some(utc) = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix(" UTC"))
        .and_then(parse_naive_datetime)
    {
        return Some(tz.from_utc_datetime(&utc).date_naive());
    }

    if let Some(naive) = parse_naive_datetime(s) {
        return Some(naive.date());
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format)
            && date.year() >= MIN_YEAR
        {
            return Some(date);
        }
    }

    parse_slash_date(s)
}

/// Returns `true` when a team cell carries no real team.
#[must_use]
pub fn is_placeholder_team(raw: &str) -> bool {
    let lower = raw.trim().to_lowercase();
    TEAM_PLACEHOLDERS.contains(&lower.as_str())
}

/// Returns `true` for identifier cells shaped like a URL or path.
#[must_use]
pub fn is_path_shaped(raw: &str) -> bool {
    raw.contains('/')
}

/// Reduces a URL or path to its last non-empty segment, dropping any query
/// string or fragment: `https://x/athletes/123?ref=a` becomes `123`.
#[must_use]
pub fn path_tail(raw: &str) -> &str {
    let without_query = raw.split(['?', '#']).next().unwrap_or(raw);
    without_query
        .rsplit('/')
        .find(|segment| !segment.trim().is_empty())
        .map_or("", str::trim)
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .filter_map(|format| NaiveDateTime::parse_from_str(s.trim(), format).ok())
        .find(|dt| dt.year() >= MIN_YEAR)
}

fn parse_serial_date(s: &str) -> Option<NaiveDate> {
    if !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let serial = s.parse::<f64>().ok()?;
    if !SERIAL_RANGE.contains(&serial) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    #[allow(clippy::cast_possible_truncation)]
    let days = serial.floor() as i64;
    epoch.checked_add_signed(Duration::days(days))
}

fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    let caps = SLASH_DATE_RE.captures(s)?;
    let a: u32 = caps.get(1)?.as_str().parse().ok()?;
    let b: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year_raw = caps.get(3)?.as_str();
    let mut year: i32 = year_raw.parse().ok()?;
    if year_raw.len() == 2 {
        year += 2000;
    }

    let (day, month) = match (a > 12, b > 12) {
        (true, false) => (a, b),
        (false, true) => (b, a),
        (false, false) if a == b => (a, b),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
