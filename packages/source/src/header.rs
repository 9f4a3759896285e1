//! Header cleanup and logical-field resolution.
//!
//! Spreadsheet headers arrive padded, quoted and sometimes repeated. Each
//! logical field (athlete name, distance, ...) carries an ordered list of
//! candidate column names; [`HeaderIndex::resolve`] maps every field to at
//! most one physical column.

use std::collections::BTreeMap;

/// Characters stripped from both ends of a header cell.
const HEADER_TRIM: &[char] = &['"', '\'', '`', '\u{feff}'];

/// Strips whitespace, quote characters and a byte-order mark from a header.
#[must_use]
pub fn clean_header(raw: &str) -> String {
    let mut s = raw.trim();
    loop {
        let next = s.trim_matches(HEADER_TRIM).trim();
        if next.len() == s.len() {
            return next.to_owned();
        }
        s = next;
    }
}

/// Cleans every header and suffixes repeats with a counter, so that
/// `["Name", " Name", "\"Name\""]` becomes `["Name", "Name.1", "Name.2"]`.
#[must_use]
pub fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    raw.iter()
        .map(|h| {
            let clean = clean_header(h);
            let count = seen.entry(clean.clone()).or_insert(0);
            let header = if *count == 0 {
                clean
            } else {
                format!("{clean}.{count}")
            };
            *count += 1;
            header
        })
        .collect()
}

/// Cleaned, de-duplicated headers of one table.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    headers: Vec<String>,
}

impl HeaderIndex {
    /// Builds an index from raw header cells.
    #[must_use]
    pub fn new(raw: &[String]) -> Self {
        Self {
            headers: dedupe_headers(raw),
        }
    }

    /// The cleaned headers, in column order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Resolves each logical field to a column position.
    ///
    /// `fields[i]` is the ordered candidate list for field `i`; the result
    /// has the same length. Resolution runs in two passes over all fields:
    ///
    /// 1. case-insensitive exact match, first matching candidate wins;
    /// 2. for fields still unresolved, case-insensitive substring match
    ///    against columns not already claimed by another field.
    ///
    /// A field with no match resolves to `None`.
    #[must_use]
    pub fn resolve(&self, fields: &[&[String]]) -> Vec<Option<usize>> {
        let lowered: Vec<String> = self.headers.iter().map(|h| h.to_lowercase()).collect();
        let mut claimed = vec![false; lowered.len()];

        let mut resolved: Vec<Option<usize>> = fields
            .iter()
            .map(|candidates| {
                candidates.iter().find_map(|candidate| {
                    let wanted = clean_header(candidate).to_lowercase();
                    lowered.iter().position(|h| *h == wanted)
                })
            })
            .collect();

        for column in resolved.iter().flatten() {
            claimed[*column] = true;
        }

        for (field, slot) in fields.iter().zip(resolved.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            *slot = field.iter().find_map(|candidate| {
                let wanted = clean_header(candidate).to_lowercase();
                if wanted.is_empty() {
                    return None;
                }
                (0..lowered.len()).find(|&i| !claimed[i] && lowered[i].contains(&wanted))
            });
            if let Some(column) = *slot {
                claimed[column] = true;
            }
        }

        resolved
    }
}
