use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_match_type, parse_year, run_report, ApiError};
use crate::models::{MatchType, Owner, StandingsRow};
use crate::reports::TrophyEntry;

#[derive(Debug, Deserialize)]
pub struct StandingsParams {
    pub matchup_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct YearsResponse {
    pub years: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct OwnersResponse {
    pub owners: Vec<Owner>,
}

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    /// `None` for all-time standings
    pub year: Option<i32>,
    pub matchup_type: MatchType,
    pub standings: Vec<StandingsRow>,
}

#[derive(Debug, Serialize)]
pub struct ChampionsResponse {
    pub champions: Vec<TrophyEntry>,
}

#[derive(Debug, Serialize)]
pub struct SackosResponse {
    pub sackos: Vec<TrophyEntry>,
}

pub async fn years(State(state): State<AppState>) -> Result<Json<YearsResponse>, ApiError> {
    let years = run_report(&state, |reports| reports.years()).await?;
    Ok(Json(YearsResponse { years }))
}

pub async fn owners(State(state): State<AppState>) -> Result<Json<OwnersResponse>, ApiError> {
    let owners = run_report(&state, |reports| reports.owners()).await?;
    Ok(Json(OwnersResponse { owners }))
}

pub async fn standings(
    State(state): State<AppState>,
    Path(year): Path<String>,
    Query(params): Query<StandingsParams>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let year = parse_year(&year)?;
    let matchup_type = parse_match_type(params.matchup_type.as_deref())?;

    let standings =
        run_report(&state, move |reports| reports.standings(year, matchup_type)).await?;

    Ok(Json(StandingsResponse {
        year,
        matchup_type,
        standings,
    }))
}

pub async fn champions(
    State(state): State<AppState>,
) -> Result<Json<ChampionsResponse>, ApiError> {
    let champions = run_report(&state, |reports| reports.champions()).await?;
    Ok(Json(ChampionsResponse { champions }))
}

pub async fn sackos(State(state): State<AppState>) -> Result<Json<SackosResponse>, ApiError> {
    let sackos = run_report(&state, |reports| reports.sackos()).await?;
    Ok(Json(SackosResponse { sackos }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, get_json};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_years() {
        let (status, json) = get_json(app(), "/api/years").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "years": [2020] }));
    }

    #[tokio::test]
    async fn test_owners_ordered_by_name() {
        let (status, json) = get_json(app(), "/api/owners").await;
        assert_eq!(status, StatusCode::OK);

        let ids: Vec<&str> = json["owners"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["{A}", "{B}", "{C}"]);
        assert_eq!(json["owners"][0]["first_name"], "Amy");
    }

    #[tokio::test]
    async fn test_season_standings() {
        let (status, json) = get_json(app(), "/api/standings/2020").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["year"], 2020);
        assert_eq!(json["matchup_type"], "regular");

        let rows = json["standings"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["owner_id"], "{A}");
        assert_eq!(rows[0]["win_percentage"], 1.0);
        assert_eq!(rows[0]["avg_points_for"], 110.0);
        assert_eq!(rows[0]["championships"], 1);
        assert_eq!(rows[1]["owner_id"], "{B}");
        assert_eq!(rows[1]["win_percentage"], 0.5);
        assert_eq!(rows[2]["owner_id"], "{C}");
        assert_eq!(rows[2]["sackos"], 1);
    }

    #[tokio::test]
    async fn test_overall_playoff_standings() {
        let (status, json) = get_json(app(), "/api/standings/overall?matchup_type=playoffs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["year"], serde_json::Value::Null);
        assert_eq!(json["matchup_type"], "playoffs");

        let rows = json["standings"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["owner_id"], "{A}");
        assert_eq!(rows[0]["wins"], 1);
        assert_eq!(rows[1]["owner_id"], "{B}");
        assert_eq!(rows[1]["losses"], 1);
    }

    #[tokio::test]
    async fn test_standings_for_unknown_year_is_empty() {
        let (status, json) = get_json(app(), "/api/standings/1999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["standings"], json!([]));
    }

    #[tokio::test]
    async fn test_standings_rejects_bad_matchup_type() {
        let (status, json) = get_json(app(), "/api/standings/2020?matchup_type=preseason").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_trophies() {
        let (status, json) = get_json(app(), "/api/champions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({ "champions": [{ "year": 2020, "owner_id": "{A}", "owner_name": "Amy Adams" }] })
        );

        let (status, json) = get_json(app(), "/api/sackos").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sackos"][0]["owner_name"], "Cat Cole");
    }
}
