#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw source table types.
//!
//! A [`RawTable`] is exactly what a spreadsheet tab or CSV file looked like:
//! a header row plus string cells, with no cleaning applied. Header cleanup
//! and field resolution happen later, in the normalizer.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The logical tables the dashboard reads.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TableRole {
    /// One row per athlete activity (required).
    Daily,
    /// Authoritative per-team points (optional).
    Summary,
    /// Team roster with athlete gender (optional).
    Roster,
}

/// A fetched table: header row plus positional string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Header cells exactly as they appeared in the source.
    pub headers: Vec<String>,
    /// Data rows. Rows may be shorter or longer than `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a table from a header row and data rows.
    #[must_use]
    pub const fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Builds a table from a grid whose first row is the header row, the
    /// shape spreadsheet APIs return. An empty grid yields an empty table.
    #[must_use]
    pub fn from_grid(mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return Self::default();
        }
        let headers = grid.remove(0);
        Self {
            headers,
            rows: grid,
        }
    }

    /// Returns `true` when the table has no data rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of data rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterates over the data rows.
    pub fn iter(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(|cells| RawRow { cells })
    }
}

/// A borrowed view of one data row.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    cells: &'a [String],
}

impl<'a> RawRow<'a> {
    /// Returns the cell at `column`, or `None` past the end of a short row.
    #[must_use]
    pub fn cell(&self, column: usize) -> Option<&'a str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Returns `true` when every cell is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_grid_splits_header_row() {
        let table = RawTable::from_grid(vec![
            vec!["Name".to_string(), "Distance".to_string()],
            vec!["Alice".to_string(), "2.5".to_string()],
        ]);
        assert_eq!(table.headers, vec!["Name", "Distance"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn from_empty_grid_is_empty() {
        let table = RawTable::from_grid(Vec::new());
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn short_rows_read_as_missing_cells() {
        let table = RawTable::new(
            vec!["A".to_string(), "B".to_string()],
            vec![vec!["x".to_string()]],
        );
        let row = table.iter().next().unwrap();
        assert_eq!(row.cell(0), Some("x"));
        assert_eq!(row.cell(1), None);
    }

    #[test]
    fn roles_display_in_snake_case() {
        assert_eq!(TableRole::Daily.to_string(), "daily");
        assert_eq!(TableRole::Roster.to_string(), "roster");
    }

    #[test]
    fn whitespace_only_rows_are_blank() {
        let table = RawTable::new(
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec![" ".to_string(), "\t".to_string()],
                vec![String::new(), "x".to_string()],
            ],
        );
        let blank: Vec<_> = table.iter().map(|row| row.is_blank()).collect();
        assert_eq!(blank, vec![true, false]);
    }
}
