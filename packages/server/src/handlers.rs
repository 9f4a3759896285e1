//! HTTP handler functions for the dashboard API.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use fitboard_scoring::DashboardError;
use fitboard_scoring::history::athlete_history;
use fitboard_scoring::team_detail::team_details;
use fitboard_scoring::window::resolve_window;
use fitboard_server_models::{ApiError, ApiHealth, ApiTeamDetail};

use crate::{AppState, pages};

fn error_status(error: &DashboardError) -> StatusCode {
    if error.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(error: &DashboardError) -> HttpResponse {
    log::error!("Dashboard request failed: {error}");
    HttpResponse::build(error_status(error)).json(ApiError::new(error.to_string()))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /`
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    let challenge = &state.config.challenge;
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::index_page(&challenge.title, challenge.refresh_seconds))
}

/// `GET /api/data`
///
/// Fetches every table and returns totals, leaderboards, teams and the
/// consistent performers. An empty activity table is a `200` with
/// `no_data` set.
pub async fn data(state: web::Data<AppState>) -> HttpResponse {
    match state.dashboard().await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/athlete/{athlete_id}`
pub async fn athlete(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let athlete_id = path.into_inner();
    let snapshot = match state.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_response(&e),
    };

    let today = Utc::now().with_timezone(&state.options.timezone).date_naive();
    let window = resolve_window(&snapshot.activities, &state.options, today);

    HttpResponse::Ok().json(athlete_history(
        &snapshot.activities,
        &athlete_id,
        window,
        state.options.metric,
    ))
}

/// `GET /api/team/{team_id}`
pub async fn team(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let team_id = path.into_inner();
    match state.snapshot().await {
        Ok(snapshot) => HttpResponse::Ok().json(ApiTeamDetail::from(team_details(
            &snapshot.activities,
            &team_id,
            state.options.metric,
        ))),
        Err(e) => error_response(&e),
    }
}

/// `GET /team/{team_id}`
///
/// Server-rendered member table.
pub async fn team_page(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let team_id = path.into_inner();
    match state.snapshot().await {
        Ok(snapshot) => {
            let detail = team_details(&snapshot.activities, &team_id, state.options.metric);
            let updated_at = snapshot
                .fetched_at
                .with_timezone(&state.options.timezone)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string();
            HttpResponse::Ok()
                .content_type(ContentType::html())
                .body(pages::team_page(
                    &state.config.challenge.title,
                    &detail,
                    &updated_at,
                ))
        }
        Err(e) => {
            log::error!("Team page for {team_id} failed: {e}");
            HttpResponse::build(error_status(&e))
                .content_type(ContentType::html())
                .body(pages::error_page(&e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use actix_web::{App, test};
    use fitboard_config::DashboardConfig;

    use super::*;
    use crate::configure;

    const DAILY: &str = "\
ID,Name,TEAM_ID,Type,Distance,DATE_EXTRACT,POINTS
1,Ann,Falcons,Walk,2.5,2025-11-16,2.5
1,Ann,Falcons,Walk,3.0,2025-11-17,3.0
2,Bob,Hawks,Run,5.0,2025-11-16,10
3,<b>Cy</b>,Hawks,Ride,12.0,2025-11-17,4
";

    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new(name: &str, daily: Option<&str>) -> Self {
            let dir = std::env::temp_dir().join(format!("fitboard_server_{name}"));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(&dir).unwrap();
            if let Some(daily) = daily {
                std::fs::write(dir.join("daily.csv"), daily).unwrap();
            }
            std::fs::write(dir.join("roster.csv"), "STRAVA_ID,GENDER\n1,F\n2,M\n").unwrap();
            Self { dir }
        }

        fn config(&self) -> DashboardConfig {
            let toml = format!(
                r#"
[challenge]
title = "Test Challenge"
start_date = "2025-11-16"
timezone = "Asia/Kolkata"

[scoring]
metric = "points"

[[tables.daily.strategies]]
type = "csv_file"
path = {daily:?}

[[tables.roster.strategies]]
type = "csv_file"
path = {roster:?}
"#,
                daily = path_str(&self.dir.join("daily.csv")),
                roster = path_str(&self.dir.join("roster.csv")),
            );
            let config = DashboardConfig::from_toml_str(&toml).unwrap();
            config.validate().unwrap();
            config
        }

        fn state(&self) -> web::Data<AppState> {
            web::Data::new(AppState::from_config(self.config()).unwrap())
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn data_returns_scored_dashboard() {
        let fixture = Fixture::new("data", Some(DAILY));
        let app = test::init_service(App::new().app_data(fixture.state()).configure(configure))
            .await;

        let req = test::TestRequest::get().uri("/api/data").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["title"], "Test Challenge");
        assert_eq!(body["no_data"], false);
        assert_eq!(body["athletes"].as_array().unwrap().len(), 3);
        assert_eq!(body["leaderboards"]["total"][0]["name"], "Bob");
        assert_eq!(body["leaderboards"]["women_run"][0]["name"], "Ann");
        assert_eq!(body["consistent"][0]["name"], "Ann");
        assert_eq!(body["sheet_updated"], "17 Nov 2025");
        assert_eq!(body["teams"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn empty_activity_table_is_no_data() {
        let fixture = Fixture::new("empty", Some("ID,Name,Type,Distance\n"));
        let app = test::init_service(App::new().app_data(fixture.state()).configure(configure))
            .await;

        let req = test::TestRequest::get().uri("/api/data").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["no_data"], true);
        assert!(body["athletes"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unreachable_activity_table_is_503() {
        let fixture = Fixture::new("missing", None);
        let app = test::init_service(App::new().app_data(fixture.state()).configure(configure))
            .await;

        let req = test::TestRequest::get().uri("/api/data").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ApiError = test::read_body_json(resp).await;
        assert!(!body.error.is_empty());
    }

    #[actix_web::test]
    async fn athlete_history_covers_window() {
        let fixture = Fixture::new("athlete", Some(DAILY));
        let app = test::init_service(App::new().app_data(fixture.state()).configure(configure))
            .await;

        let req = test::TestRequest::get().uri("/api/athlete/1").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dates"], serde_json::json!(["16/11", "17/11"]));
        assert_eq!(body["daily_activities"][0]["type"], "Walk");
    }

    #[actix_web::test]
    async fn team_api_lists_members() {
        let fixture = Fixture::new("team_api", Some(DAILY));
        let app = test::init_service(App::new().app_data(fixture.state()).configure(configure))
            .await;

        let req = test::TestRequest::get().uri("/api/team/Hawks").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["team_id"], "Hawks");
        assert_eq!(body["member_count"], 2);
    }

    #[actix_web::test]
    async fn team_page_escapes_names() {
        let fixture = Fixture::new("team_page", Some(DAILY));
        let app = test::init_service(App::new().app_data(fixture.state()).configure(configure))
            .await;

        let req = test::TestRequest::get().uri("/team/Hawks").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("&lt;b&gt;Cy&lt;/b&gt;"));
        assert!(html.contains("2 members"));
    }

    #[actix_web::test]
    async fn index_serves_shell() {
        let fixture = Fixture::new("index", Some(DAILY));
        let app = test::init_service(App::new().app_data(fixture.state()).configure(configure))
            .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("Test Challenge"));
        assert!(html.contains("/api/data"));
    }
}
