use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::{parse_match_type, parse_owner, run_report, ApiError};
use crate::reports::{MatchupHistory, OwnerRecords};

#[derive(Debug, Deserialize)]
pub struct H2hRecordsParams {
    pub owner_id: Option<String>,
    pub matchup_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchupHistoryParams {
    pub owner_id: Option<String>,
    pub opponent_owner_id: Option<String>,
    pub matchup_type: Option<String>,
}

/// One owner's lifetime record against each opponent.
pub async fn h2h_records(
    State(state): State<AppState>,
    Query(params): Query<H2hRecordsParams>,
) -> Result<Json<OwnerRecords>, ApiError> {
    let matchup_type = parse_match_type(params.matchup_type.as_deref())?;
    let owner_id = parse_owner(params.owner_id);

    let records = run_report(&state, move |reports| {
        reports.h2h_records(owner_id, matchup_type)
    })
    .await?;

    Ok(Json(records))
}

/// Every game between two owners, newest season first.
pub async fn matchup_history(
    State(state): State<AppState>,
    Query(params): Query<MatchupHistoryParams>,
) -> Result<Json<MatchupHistory>, ApiError> {
    let matchup_type = parse_match_type(params.matchup_type.as_deref())?;
    let owner_id = parse_owner(params.owner_id);
    let opponent_owner_id = parse_owner(params.opponent_owner_id);

    let history = run_report(&state, move |reports| {
        reports.matchup_history(owner_id, opponent_owner_id, matchup_type)
    })
    .await?;

    Ok(Json(history))
}
