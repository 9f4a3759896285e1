//! Raw table to canonical record conversion.
//!
//! Each normalizer resolves its logical fields against the table headers
//! once, then maps rows positionally. Malformed cells never fail a row:
//! numbers fall back to zero and dates to `None`.

use chrono_tz::Tz;
use fitboard_activity_models::{
    CanonicalActivity, CategoryBuckets, Gender, GenderMap, TeamSummaryRow,
};
use fitboard_source_models::{RawRow, RawTable};

use crate::header::HeaderIndex;
use crate::parsing::{
    is_path_shaped, is_placeholder_team, parse_activity_date, parse_distance_km,
    parse_number_or_zero, path_tail,
};
use crate::source_def::{ActivityColumns, RosterColumns, SummaryColumns};
use crate::type_mapping::match_activity_text;

/// Resolved column positions for the activity table.
#[derive(Debug, Clone, Copy, Default)]
struct ActivityLayout {
    athlete_id: Option<usize>,
    athlete_name: Option<usize>,
    athlete_ref: Option<usize>,
    team: Option<usize>,
    activity_type: Option<usize>,
    activity_name: Option<usize>,
    distance: Option<usize>,
    unit: Option<usize>,
    date: Option<usize>,
    points: Option<usize>,
    run_points: Option<usize>,
    walk_points: Option<usize>,
    ride_points: Option<usize>,
}

impl ActivityLayout {
    fn resolve(index: &HeaderIndex, columns: &ActivityColumns) -> Self {
        let fields: [&[String]; 13] = [
            &columns.athlete_id,
            &columns.athlete_name,
            &columns.athlete_ref,
            &columns.team,
            &columns.activity_type,
            &columns.activity_name,
            &columns.distance,
            &columns.unit,
            &columns.date,
            &columns.points,
            &columns.run_points,
            &columns.walk_points,
            &columns.ride_points,
        ];
        let r = index.resolve(&fields);
        Self {
            athlete_id: r[0],
            athlete_name: r[1],
            athlete_ref: r[2],
            team: r[3],
            activity_type: r[4],
            activity_name: r[5],
            distance: r[6],
            unit: r[7],
            date: r[8],
            points: r[9],
            run_points: r[10],
            walk_points: r[11],
            ride_points: r[12],
        }
    }

    const fn has_category_points(&self) -> bool {
        self.run_points.is_some() || self.walk_points.is_some() || self.ride_points.is_some()
    }
}

fn cell<'a>(row: &RawRow<'a>, column: Option<usize>) -> &'a str {
    column.and_then(|c| row.cell(c)).map_or("", str::trim)
}

/// Reduces a path-shaped identifier to its last segment.
fn identifier(raw: &str) -> &str {
    if is_path_shaped(raw) {
        path_tail(raw)
    } else {
        raw
    }
}

/// Converts the activity table into canonical activities.
///
/// Identity is resolved per row:
///
/// - the name is the display-name cell, else the last segment of the
///   athlete reference (profile URL), else the id;
/// - the id is the id cell (reduced to its last path segment when it looks
///   like a URL), else the reference segment, else the name.
///
/// Rows with neither an id nor a name are dropped. Everything else is
/// kept, including rows with zero distance or no date.
#[must_use]
pub fn normalize_activities(
    table: &RawTable,
    columns: &ActivityColumns,
    tz: Tz,
) -> Vec<CanonicalActivity> {
    let index = HeaderIndex::new(&table.headers);
    let layout = ActivityLayout::resolve(&index, columns);
    log::debug!(
        "Activity columns resolved from {:?}: {layout:?}",
        index.headers()
    );

    let mut blank = 0_usize;
    let mut discarded = 0_usize;
    let mut activities = Vec::with_capacity(table.len());

    for row in table.iter() {
        if row.is_blank() {
            blank += 1;
        } else if let Some(activity) = normalize_row(&row, &layout, tz) {
            activities.push(activity);
        } else {
            discarded += 1;
        }
    }

    if blank > 0 {
        log::debug!("Skipped {blank} blank activity rows");
    }
    if discarded > 0 {
        log::debug!("Discarded {discarded} activity rows without an athlete");
    }
    activities
}

fn normalize_row(row: &RawRow<'_>, layout: &ActivityLayout, tz: Tz) -> Option<CanonicalActivity> {
    let id_cell = identifier(cell(row, layout.athlete_id));
    let ref_cell = identifier(cell(row, layout.athlete_ref));
    let name_cell = cell(row, layout.athlete_name);

    let athlete_name = [name_cell, ref_cell, id_cell]
        .into_iter()
        .find(|s| !s.is_empty())?
        .to_owned();
    let athlete_id = [id_cell, ref_cell, athlete_name.as_str()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_owned();

    let team = cell(row, layout.team);
    let team_id = (!is_placeholder_team(team)).then(|| team.to_owned());

    let matches = match_activity_text(&[
        cell(row, layout.activity_type),
        cell(row, layout.activity_name),
    ]);

    let unit = layout.unit.map(|_| cell(row, layout.unit));
    let distance_km = parse_distance_km(cell(row, layout.distance), unit);

    let category_points = layout.has_category_points().then(|| CategoryBuckets {
        walk: parse_number_or_zero(cell(row, layout.walk_points)),
        run: parse_number_or_zero(cell(row, layout.run_points)),
        ride: parse_number_or_zero(cell(row, layout.ride_points)),
    });

    Some(CanonicalActivity {
        athlete_id,
        athlete_name,
        team_id,
        category: matches.primary(),
        matches,
        distance_km,
        activity_date: parse_activity_date(cell(row, layout.date), tz),
        points: layout
            .points
            .map(|_| parse_number_or_zero(cell(row, layout.points))),
        category_points,
    })
}

/// Reads the team summary table.
///
/// Rows whose team is blank or a placeholder are skipped; an unparseable
/// points cell counts as zero. Returns an empty list when the table has no
/// team column.
#[must_use]
pub fn normalize_team_summary(table: &RawTable, columns: &SummaryColumns) -> Vec<TeamSummaryRow> {
    let index = HeaderIndex::new(&table.headers);
    let resolved = index.resolve(&[columns.team.as_slice(), columns.points.as_slice()]);
    let (Some(team_col), points_col) = (resolved[0], resolved[1]) else {
        log::warn!("Team summary has no team column: {:?}", index.headers());
        return Vec::new();
    };

    table
        .iter()
        .filter_map(|row| {
            let team = cell(&row, Some(team_col));
            if is_placeholder_team(team) {
                return None;
            }
            Some(TeamSummaryRow {
                team_id: team.to_owned(),
                points: parse_number_or_zero(cell(&row, points_col)),
            })
        })
        .collect()
}

/// Reads the roster table into an athlete id to gender map.
///
/// Ids are trimmed and path-shaped ids reduced like activity ids, so the
/// two tables join on the same key. Later rows overwrite earlier ones.
#[must_use]
pub fn normalize_roster(table: &RawTable, columns: &RosterColumns) -> GenderMap {
    let index = HeaderIndex::new(&table.headers);
    let resolved = index.resolve(&[columns.athlete_id.as_slice(), columns.gender.as_slice()]);
    let (Some(id_col), Some(gender_col)) = (resolved[0], resolved[1]) else {
        log::warn!("Roster lacks an id or gender column: {:?}", index.headers());
        return GenderMap::new();
    };

    let mut genders = GenderMap::new();
    for row in table.iter() {
        let id = identifier(cell(&row, Some(id_col)));
        if id.is_empty() {
            continue;
        }
        genders.insert(
            id.to_owned(),
            Gender::from_roster_value(cell(&row, Some(gender_col))),
        );
    }
    genders
}
