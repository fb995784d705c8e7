//! REST API endpoints.
//!
//! Axum-based HTTP API exposing league history: standings, trophies,
//! head-to-head records and weekly recaps.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::models::{MatchType, OwnerId};
use crate::reports::LeagueReports;
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Run a report on the blocking pool; store reads hold the connection lock.
pub async fn run_report<T, F>(state: &AppState, report: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&LeagueReports) -> Result<T, StorageError> + Send + 'static,
{
    let reports = state.reports.clone();
    tokio::task::spawn_blocking(move || report(&reports))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Parse a standings scope: a season year, or `overall` for all seasons.
pub fn parse_year(raw: &str) -> Result<Option<i32>, ApiError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("overall") {
        return Ok(None);
    }
    parse_season(raw).map(Some)
}

/// Parse a season year path segment.
pub fn parse_season(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid year: {}", raw)))
}

/// Parse a week (matchup period) path segment.
pub fn parse_week(raw: &str) -> Result<u32, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid week: {}", raw)))
}

/// Parse the `matchup_type` query parameter; absent means regular season.
pub fn parse_match_type(raw: Option<&str>) -> Result<MatchType, ApiError> {
    match raw {
        None => Ok(MatchType::default()),
        Some(s) if s.trim().is_empty() => Ok(MatchType::default()),
        Some(s) => s.parse().map_err(ApiError::BadRequest),
    }
}

/// Treat an empty owner parameter as absent.
pub fn parse_owner(raw: Option<String>) -> Option<OwnerId> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(OwnerId::from)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(_) => {
            tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
            layer
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound("no such endpoint".to_string())
}

/// Build the application router.
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    use routes::{head_to_head, league, weekly};

    Router::new()
        .route("/api/years", get(league::years))
        .route("/api/owners", get(league::owners))
        .route("/api/standings/:year", get(league::standings))
        .route("/api/champions", get(league::champions))
        .route("/api/sackos", get(league::sackos))
        .route("/api/h2h-records", get(head_to_head::h2h_records))
        .route("/api/matchup-history", get(head_to_head::matchup_history))
        .route("/api/matchups/:year/:week", get(weekly::matchups))
        .route("/api/recap/:year/:week", get(weekly::recap))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use super::state::AppState;
    use crate::models::fixtures::{both_sides, bye, game};
    use crate::models::{Champion, Owner, Record, Sacko, Team, TeamId};
    use crate::reports::LeagueReports;
    use crate::storage::Store;

    fn owner(id: &str, first: &str, last: &str) -> Owner {
        Owner {
            id: id.into(),
            username: first.to_lowercase(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    fn team(id: u32, owner: &str, location: &str, nickname: &str) -> Team {
        Team {
            year: 2020,
            id: TeamId(id),
            owner_id: owner.into(),
            abbreviation: location[..3].to_uppercase(),
            location: location.to_string(),
            nickname: nickname.to_string(),
        }
    }

    fn record(team: u32, owner: &str, wins: u32, losses: u32, pf: f64, pa: f64) -> Record {
        Record {
            year: 2020,
            team_id: TeamId(team),
            owner_id: owner.into(),
            standing: team,
            wins,
            losses,
            ties: 0,
            points_for: pf,
            points_against: pa,
            streak_length: 1,
            streak_type: "WIN".to_string(),
        }
    }

    /// Three owners, one 2020 season: two regular weeks with a rotating bye
    /// and a week 3 final won by Amy.
    pub fn seeded_state() -> AppState {
        let store = Store::in_memory().unwrap();
        store
            .upsert_owners(&[
                owner("{A}", "Amy", "Adams"),
                owner("{B}", "Ben", "Brown"),
                owner("{C}", "Cat", "Cole"),
            ])
            .unwrap();
        store
            .upsert_teams(&[
                team(1, "{A}", "Austin", "Ants"),
                team(2, "{B}", "Boston", "Bears"),
                team(3, "{C}", "Chicago", "Cubs"),
            ])
            .unwrap();
        store
            .upsert_records(&[
                record(1, "{A}", 2, 0, 220.0, 180.0),
                record(2, "{B}", 1, 1, 185.0, 190.0),
                record(3, "{C}", 0, 2, 170.0, 205.0),
            ])
            .unwrap();

        let mut rows = Vec::new();
        rows.extend(both_sides(2020, 1, (1, "{A}", 110.0), (2, "{B}", 90.0)));
        rows.push(bye(2020, 1, (3, "{C}", 0.0)));
        rows.extend(both_sides(2020, 2, (1, "{A}", 110.0), (3, "{C}", 85.0)));
        rows.push(bye(2020, 2, (2, "{B}", 0.0)));
        let mut final_home = game(2020, 3, (1, "{A}", 120.0), (2, "{B}", 95.0));
        final_home.is_playoffs = true;
        let final_away = final_home.mirrored().unwrap();
        rows.push(final_home);
        rows.push(final_away);
        store.upsert_matchups(&rows).unwrap();

        store
            .upsert_champions(&[Champion {
                year: 2020,
                owner_id: "{A}".into(),
            }])
            .unwrap();
        store
            .upsert_sacko(&Sacko {
                year: 2020,
                owner_id: "{C}".into(),
            })
            .unwrap();

        AppState::new(LeagueReports::new(Arc::new(store)))
    }

    pub fn app() -> axum::Router {
        super::build_router(seeded_state(), "*")
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
