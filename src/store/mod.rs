//! Transactional store
//!
//! The relational storage engine is an external collaborator; this module
//! defines the interface the pipeline needs from it. The two operations that
//! carry the concurrency discipline are:
//!
//! - [`Store::settle_verdict`]: a per-submission atomic check-and-set, so
//!   duplicate concurrent callbacks race and at most one wins;
//! - [`Store::apply_acceptance`]: the per-(user, contest, problem) award
//!   marker and the ContestPoints increment committed together, so a crash
//!   can never grant points twice or record a grant without points.
//!
//! Outcomes of both are explicit enums rather than implicit upsert
//! semantics; "already done" is a successful no-op, never an error.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Contest, ContestPoints, Problem, Submission, Verdict};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Fields for a new submission row, persisted in `Queued` state at dispatch
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    pub problem_id: Uuid,
    pub contest_id: Option<Uuid>,
    pub language: String,
    pub source_code: String,
    pub judge_token: String,
}

/// One point award to commit for a first acceptance
#[derive(Debug, Clone)]
pub struct ScoreGrant {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub problem_id: Uuid,
    pub submission_id: Uuid,
    pub points: i64,
    pub settled_at: DateTime<Utc>,
}

/// Result of a terminal verdict check-and-set
#[derive(Debug, Clone)]
pub enum SettleOutcome {
    /// This call won the race; the submission transitioned to the verdict
    Applied(Submission),
    /// The submission was already terminal; nothing changed
    AlreadyTerminal,
}

/// Result of an acceptance award check-and-set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// First acceptance of this problem by this user in this contest
    Awarded {
        total_points: i64,
        solved_count: i64,
    },
    /// The (user, contest, problem) marker already existed; nothing changed
    AlreadyScored,
}

/// Transactional persistence used by the judging and scoring pipeline
#[async_trait]
pub trait Store: Send + Sync {
    // Submissions

    /// Insert a new submission in `Queued` state. Fails if the tracking
    /// token is already in use.
    async fn insert_submission(&self, new: NewSubmission) -> AppResult<Submission>;

    async fn submission_by_id(&self, id: &Uuid) -> AppResult<Option<Submission>>;

    /// Resolve a judge tracking token to its submission
    async fn submission_by_token(&self, token: &str) -> AppResult<Option<Submission>>;

    /// List a user's submissions for a problem, newest first
    async fn submissions_for_user(
        &self,
        user_id: &Uuid,
        problem_id: &Uuid,
        contest_id: Option<&Uuid>,
    ) -> AppResult<Vec<Submission>>;

    /// Record judging progress: `Queued` to `Running`, guarded so a terminal
    /// or already-running submission is untouched
    async fn mark_running(&self, id: &Uuid) -> AppResult<()>;

    /// Atomically apply a terminal verdict if and only if the submission is
    /// still non-terminal. Sets `settled_at` exactly once, on the winning
    /// transition.
    async fn settle_verdict(
        &self,
        id: &Uuid,
        verdict: Verdict,
        execution_time_ms: Option<f64>,
        memory_usage_kb: Option<i64>,
        settled_at: DateTime<Utc>,
    ) -> AppResult<SettleOutcome>;

    // Scoring

    /// Commit an acceptance award: the (user, contest, problem) marker and
    /// the ContestPoints increment in one transaction. The aggregate row is
    /// created on first acceptance; `last_successful_submission_at` never
    /// moves backwards.
    async fn apply_acceptance(&self, grant: ScoreGrant) -> AppResult<ScoreOutcome>;

    /// Ranked aggregate rows for a contest: points descending, then
    /// last-success ascending, then user id ascending; at most `limit` rows.
    /// The read is a consistent snapshot, never a half-applied increment.
    async fn top_contest_points(
        &self,
        contest_id: &Uuid,
        limit: usize,
    ) -> AppResult<Vec<ContestPoints>>;

    // Lookups

    async fn problem_by_id(&self, id: &Uuid) -> AppResult<Option<Problem>>;

    async fn contest_by_id(&self, id: &Uuid) -> AppResult<Option<Contest>>;

    /// Display names for a set of users, for leaderboard rendering
    async fn display_names(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>>;
}
