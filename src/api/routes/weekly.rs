use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{parse_season, parse_week, run_report, ApiError};
use crate::models::TeamId;
use crate::reports::WeeklyRecap;

#[derive(Debug, Serialize)]
pub struct MatchupsResponse {
    pub year: i32,
    pub week: u32,
    /// One entry per game: two team ids, or one for a bye
    pub games: Vec<BTreeSet<TeamId>>,
}

pub async fn matchups(
    State(state): State<AppState>,
    Path((year, week)): Path<(String, String)>,
) -> Result<Json<MatchupsResponse>, ApiError> {
    let year = parse_season(&year)?;
    let week = parse_week(&week)?;

    let games = run_report(&state, move |reports| reports.week_games(year, week)).await?;

    Ok(Json(MatchupsResponse { year, week, games }))
}

pub async fn recap(
    State(state): State<AppState>,
    Path((year, week)): Path<(String, String)>,
) -> Result<Json<WeeklyRecap>, ApiError> {
    let year = parse_season(&year)?;
    let week = parse_week(&week)?;

    let recap = run_report(&state, move |reports| reports.recap(year, week)).await?;

    Ok(Json(recap))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, get_json};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_week_games() {
        let (status, json) = get_json(app(), "/api/matchups/2020/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "year": 2020, "week": 1, "games": [[1, 2], [3]] }));
    }

    #[tokio::test]
    async fn test_empty_week() {
        let (status, json) = get_json(app(), "/api/matchups/2020/14").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["games"], json!([]));
    }

    #[tokio::test]
    async fn test_bad_path_values() {
        let (status, _) = get_json(app(), "/api/matchups/twenty/1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = get_json(app(), "/api/recap/2020/first").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_recap_with_bye() {
        let (status, json) = get_json(app(), "/api/recap/2020/2").await;
        assert_eq!(status, StatusCode::OK);

        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["team"], "Austin Ants");
        assert_eq!(entries[0]["opponent"], "Chicago Cubs");
        assert_eq!(
            entries[0]["team_record"],
            json!({ "wins": 1, "losses": 0, "ties": 0 })
        );
        assert_eq!(
            entries[0]["opponent_record"],
            json!({ "wins": 0, "losses": 0, "ties": 0 })
        );
        // first meeting
        assert_eq!(entries[0]["streak"], 0);
        assert_eq!(entries[0]["streak_owner"], serde_json::Value::Null);

        assert_eq!(json["byes"], json!([{ "team_id": 2, "team": "Boston Bears" }]));
    }

    #[tokio::test]
    async fn test_recap_final_uses_regular_season_history() {
        let (status, json) = get_json(app(), "/api/recap/2020/3").await;
        assert_eq!(status, StatusCode::OK);

        let entry = &json["entries"][0];
        assert_eq!(entry["team_id"], 1);
        assert_eq!(entry["opponent_team_id"], 2);
        assert_eq!(entry["team_record"], json!({ "wins": 2, "losses": 0, "ties": 0 }));
        assert_eq!(entry["opponent_record"], json!({ "wins": 0, "losses": 1, "ties": 0 }));
        assert_eq!(entry["streak"], 1);
        assert_eq!(entry["streak_owner"], "Austin Ants");
        assert_eq!(entry["h2h_record"], json!({ "wins": 1, "losses": 0, "ties": 0 }));
        assert_eq!(json["byes"], json!([]));
    }
}
