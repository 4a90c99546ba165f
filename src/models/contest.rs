//! Contest models and scoring aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::time::is_between;

/// Contest database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contest {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub hidden: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Contest {
    /// Hidden or soft-deleted contests are excluded from all read paths
    pub fn is_visible(&self) -> bool {
        !self.hidden && self.deleted_at.is_none()
    }

    /// Check whether the contest is currently accepting submissions
    pub fn is_active(&self) -> bool {
        is_between(self.start_time, self.end_time)
    }
}

/// Per-user, per-contest cumulative score aggregate
///
/// Rows are created lazily on the user's first accepted submission in the
/// contest and mutated only through the scoring engine's atomic increment.
/// Rank is derived at read time by the leaderboard service, never stored.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContestPoints {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub points: i64,
    /// Count of distinct problems this user has scored in the contest
    pub solved_count: i64,
    pub last_successful_submission_at: Option<DateTime<Utc>>,
}

/// Per-(user, contest, problem) award marker
///
/// Existence of a row is the explicit "already scored" check-and-set key:
/// points for a problem are granted at most once per user per contest no
/// matter how many accepted submissions arrive.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContestScore {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub problem_id: Uuid,
    /// Submission that earned the award, kept for audit
    pub submission_id: Uuid,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}
