//! Contest request DTOs

use serde::Deserialize;

/// Leaderboard query parameters
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Number of entries to return, capped at 100
    pub limit: Option<usize>,
}
