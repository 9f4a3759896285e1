#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the fitboard server.
//!
//! These wrap the scoring results with the page-level fields the browser
//! needs. Field names are `snake_case`, matching what the dashboard page
//! reads.

use fitboard_scoring_models::{Dashboard, TeamDetail};
use serde::{Deserialize, Serialize};

/// `GET /api/data` response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiDashboard {
    /// Page title.
    pub title: String,
    /// Polling interval for the page.
    pub refresh_seconds: u64,
    /// `true` when the activity table was fetched but had no usable rows.
    pub no_data: bool,
    /// Scoring results.
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

/// `GET /api/team/{id}` response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiTeamDetail {
    /// Number of members.
    pub member_count: usize,
    /// Member breakdown.
    #[serde(flatten)]
    pub detail: TeamDetail,
}

impl From<TeamDetail> for ApiTeamDetail {
    fn from(detail: TeamDetail) -> Self {
        Self {
            member_count: detail.members.len(),
            detail,
        }
    }
}

/// Error body returned with every non-2xx JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` while the process is serving.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fitboard_scoring_models::{ChallengeWindow, Leaderboards, TeamMember};

    use super::*;

    #[test]
    fn dashboard_fields_are_flattened() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
        let api = ApiDashboard {
            title: "Challenge".to_owned(),
            refresh_seconds: 300,
            no_data: true,
            dashboard: Dashboard {
                athletes: Vec::new(),
                leaderboards: Leaderboards::default(),
                teams: Vec::new(),
                consistent: Vec::new(),
                window: ChallengeWindow::new(day, day),
                sheet_updated: "Unknown".to_owned(),
                loaded_at: "2025-11-16T10:00:00+05:30".to_owned(),
            },
        };
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["no_data"], true);
        assert_eq!(json["sheet_updated"], "Unknown");
        assert_eq!(json["window"]["start"], "2025-11-16");
        assert!(json["leaderboards"]["men_run"].as_array().unwrap().is_empty());
    }

    #[test]
    fn team_detail_counts_members() {
        let detail = TeamDetail {
            team_id: "Falcons".to_owned(),
            members: vec![TeamMember {
                athlete_id: "1".to_owned(),
                name: "Ann".to_owned(),
                run_walk: 1.0,
                ride: 0.0,
                total: 1.0,
            }],
            total: 1.0,
        };
        let json = serde_json::to_value(ApiTeamDetail::from(detail)).unwrap();
        assert_eq!(json["member_count"], 1);
        assert_eq!(json["team_id"], "Falcons");
    }

    #[test]
    fn error_body_shape() {
        let json = serde_json::to_string(&ApiError::new("boom")).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }
}
