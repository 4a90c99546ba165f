//! Contest handler implementations

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{constants::MAX_LEADERBOARD_ENTRIES, error::AppResult, state::AppState};

use super::{
    request::LeaderboardQuery,
    response::{LeaderboardEntryResponse, LeaderboardResponse},
};

/// Get the ranked leaderboard for a contest
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<LeaderboardResponse>> {
    let limit = query.limit.unwrap_or(MAX_LEADERBOARD_ENTRIES);

    let entries = state
        .leaderboard()
        .get_top(state.store(), &id, limit)
        .await?;

    Ok(Json(LeaderboardResponse {
        contest_id: id,
        leaderboard: entries.into_iter().map(LeaderboardEntryResponse::from).collect(),
    }))
}
