//! Contest response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::services::LeaderboardEntry;

/// Leaderboard response
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub contest_id: Uuid,
    pub leaderboard: Vec<LeaderboardEntryResponse>,
}

/// One ranked leaderboard entry
#[derive(Debug, Serialize)]
pub struct LeaderboardEntryResponse {
    pub rank: i64,
    pub user_id: Uuid,
    pub user_name: String,
    pub points: i64,
    pub solved_count: i64,
    pub last_submission_time: Option<DateTime<Utc>>,
}

impl From<LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            rank: entry.rank,
            user_id: entry.user_id,
            user_name: entry.user_name,
            points: entry.points,
            solved_count: entry.solved_count,
            last_submission_time: entry.last_submission_time,
        }
    }
}
