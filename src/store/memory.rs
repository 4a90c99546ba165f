//! In-memory store
//!
//! Volatile implementation of the store contract, used by the test suite and
//! for local development when no database is configured. A single mutex over
//! the whole state gives every operation the same atomicity the Postgres
//! implementation gets from transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Contest, ContestPoints, ContestScore, Problem, Submission, Verdict};

use super::{NewSubmission, ScoreGrant, ScoreOutcome, SettleOutcome, Store};

#[derive(Default)]
struct Inner {
    submissions: HashMap<Uuid, Submission>,
    token_index: HashMap<String, Uuid>,
    problems: HashMap<Uuid, Problem>,
    contests: HashMap<Uuid, Contest>,
    users: HashMap<Uuid, String>,
    score_markers: HashMap<(Uuid, Uuid, Uuid), ContestScore>,
    points: HashMap<(Uuid, Uuid), ContestPoints>,
}

/// In-memory store behind a single async mutex
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a problem row
    pub async fn seed_problem(&self, problem: Problem) {
        self.inner.lock().await.problems.insert(problem.id, problem);
    }

    /// Seed a contest row
    pub async fn seed_contest(&self, contest: Contest) {
        self.inner.lock().await.contests.insert(contest.id, contest);
    }

    /// Seed a user with a display name
    pub async fn seed_user(&self, id: Uuid, display_name: &str) {
        self.inner.lock().await.users.insert(id, display_name.to_string());
    }

    /// Aggregate row for one (user, contest) pair, if any
    pub async fn contest_points_for(
        &self,
        user_id: &Uuid,
        contest_id: &Uuid,
    ) -> Option<ContestPoints> {
        self.inner
            .lock()
            .await
            .points
            .get(&(*user_id, *contest_id))
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_submission(&self, new: NewSubmission) -> AppResult<Submission> {
        let mut inner = self.inner.lock().await;

        if inner.token_index.contains_key(&new.judge_token) {
            return Err(AppError::AlreadyExists(format!(
                "tracking token {} already in use",
                new.judge_token
            )));
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            problem_id: new.problem_id,
            contest_id: new.contest_id,
            language: new.language,
            source_code: new.source_code,
            judge_token: new.judge_token.clone(),
            verdict: Verdict::Queued.as_str().to_string(),
            execution_time_ms: None,
            memory_usage_kb: None,
            submitted_at: Utc::now(),
            settled_at: None,
        };

        inner.token_index.insert(new.judge_token, submission.id);
        inner.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn submission_by_id(&self, id: &Uuid) -> AppResult<Option<Submission>> {
        Ok(self.inner.lock().await.submissions.get(id).cloned())
    }

    async fn submission_by_token(&self, token: &str) -> AppResult<Option<Submission>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .token_index
            .get(token)
            .and_then(|id| inner.submissions.get(id))
            .cloned())
    }

    async fn submissions_for_user(
        &self,
        user_id: &Uuid,
        problem_id: &Uuid,
        contest_id: Option<&Uuid>,
    ) -> AppResult<Vec<Submission>> {
        let inner = self.inner.lock().await;
        let mut submissions: Vec<_> = inner
            .submissions
            .values()
            .filter(|s| {
                s.user_id == *user_id
                    && s.problem_id == *problem_id
                    && contest_id.is_none_or(|c| s.contest_id.as_ref() == Some(c))
            })
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    async fn mark_running(&self, id: &Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(submission) = inner.submissions.get_mut(id) {
            if submission.verdict() == Verdict::Queued {
                submission.verdict = Verdict::Running.as_str().to_string();
            }
        }
        Ok(())
    }

    async fn settle_verdict(
        &self,
        id: &Uuid,
        verdict: Verdict,
        execution_time_ms: Option<f64>,
        memory_usage_kb: Option<i64>,
        settled_at: DateTime<Utc>,
    ) -> AppResult<SettleOutcome> {
        let mut inner = self.inner.lock().await;

        let submission = inner
            .submissions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        if submission.verdict().is_terminal() {
            return Ok(SettleOutcome::AlreadyTerminal);
        }

        submission.verdict = verdict.as_str().to_string();
        submission.execution_time_ms = execution_time_ms;
        submission.memory_usage_kb = memory_usage_kb;
        submission.settled_at = Some(settled_at);
        Ok(SettleOutcome::Applied(submission.clone()))
    }

    async fn apply_acceptance(&self, grant: ScoreGrant) -> AppResult<ScoreOutcome> {
        let mut inner = self.inner.lock().await;

        let marker_key = (grant.user_id, grant.contest_id, grant.problem_id);
        if inner.score_markers.contains_key(&marker_key) {
            return Ok(ScoreOutcome::AlreadyScored);
        }

        inner.score_markers.insert(
            marker_key,
            ContestScore {
                user_id: grant.user_id,
                contest_id: grant.contest_id,
                problem_id: grant.problem_id,
                submission_id: grant.submission_id,
                points: grant.points,
                created_at: Utc::now(),
            },
        );

        let row = inner
            .points
            .entry((grant.user_id, grant.contest_id))
            .or_insert_with(|| ContestPoints {
                user_id: grant.user_id,
                contest_id: grant.contest_id,
                points: 0,
                solved_count: 0,
                last_successful_submission_at: None,
            });

        row.points += grant.points;
        row.solved_count += 1;
        row.last_successful_submission_at = Some(
            row.last_successful_submission_at
                .map_or(grant.settled_at, |existing| existing.max(grant.settled_at)),
        );

        Ok(ScoreOutcome::Awarded {
            total_points: row.points,
            solved_count: row.solved_count,
        })
    }

    async fn top_contest_points(
        &self,
        contest_id: &Uuid,
        limit: usize,
    ) -> AppResult<Vec<ContestPoints>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<_> = inner
            .points
            .values()
            .filter(|row| row.contest_id == *contest_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| {
                    match (a.last_successful_submission_at, b.last_successful_submission_at) {
                        (Some(x), Some(y)) => x.cmp(&y),
                        (Some(_), None) => std::cmp::Ordering::Less,
                        (None, Some(_)) => std::cmp::Ordering::Greater,
                        (None, None) => std::cmp::Ordering::Equal,
                    }
                })
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        rows.truncate(limit);
        Ok(rows)
    }

    async fn problem_by_id(&self, id: &Uuid) -> AppResult<Option<Problem>> {
        Ok(self.inner.lock().await.problems.get(id).cloned())
    }

    async fn contest_by_id(&self, id: &Uuid) -> AppResult<Option<Contest>> {
        Ok(self.inner.lock().await.contests.get(id).cloned())
    }

    async fn display_names(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
        let inner = self.inner.lock().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| inner.users.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_submission(token: &str) -> NewSubmission {
        NewSubmission {
            user_id: Uuid::new_v4(),
            problem_id: Uuid::new_v4(),
            contest_id: None,
            language: "rs".to_string(),
            source_code: "fn main() {}".to_string(),
            judge_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_token_uniqueness_enforced() {
        let store = MemoryStore::new();
        store.insert_submission(new_submission("tok-1")).await.unwrap();

        let duplicate = store.insert_submission(new_submission("tok-1")).await;
        assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_settle_is_monotonic() {
        let store = MemoryStore::new();
        let submission = store.insert_submission(new_submission("tok-2")).await.unwrap();

        let first = store
            .settle_verdict(&submission.id, Verdict::Accepted, Some(12.0), Some(1024), Utc::now())
            .await
            .unwrap();
        assert!(matches!(first, SettleOutcome::Applied(_)));

        // A second terminal callback, even with a different verdict, is a no-op
        let second = store
            .settle_verdict(&submission.id, Verdict::WrongAnswer, None, None, Utc::now())
            .await
            .unwrap();
        assert!(matches!(second, SettleOutcome::AlreadyTerminal));

        let stored = store.submission_by_id(&submission.id).await.unwrap().unwrap();
        assert_eq!(stored.verdict(), Verdict::Accepted);
        assert_eq!(stored.execution_time_ms, Some(12.0));
    }

    #[tokio::test]
    async fn test_settled_at_written_once() {
        let store = MemoryStore::new();
        let submission = store.insert_submission(new_submission("tok-3")).await.unwrap();

        let settled_at = Utc::now();
        store
            .settle_verdict(&submission.id, Verdict::WrongAnswer, None, None, settled_at)
            .await
            .unwrap();
        store
            .settle_verdict(&submission.id, Verdict::Accepted, None, None, Utc::now())
            .await
            .unwrap();

        let stored = store.submission_by_id(&submission.id).await.unwrap().unwrap();
        assert_eq!(stored.settled_at, Some(settled_at));
    }

    #[tokio::test]
    async fn test_mark_running_only_from_queued() {
        let store = MemoryStore::new();
        let submission = store.insert_submission(new_submission("tok-4")).await.unwrap();

        store.mark_running(&submission.id).await.unwrap();
        let stored = store.submission_by_id(&submission.id).await.unwrap().unwrap();
        assert_eq!(stored.verdict(), Verdict::Running);

        store
            .settle_verdict(&submission.id, Verdict::Accepted, None, None, Utc::now())
            .await
            .unwrap();

        // A late progress callback must not regress a terminal verdict
        store.mark_running(&submission.id).await.unwrap();
        let stored = store.submission_by_id(&submission.id).await.unwrap().unwrap();
        assert_eq!(stored.verdict(), Verdict::Accepted);
    }

    #[tokio::test]
    async fn test_settle_unknown_submission_is_not_found() {
        let store = MemoryStore::new();
        let missing = store
            .settle_verdict(&Uuid::new_v4(), Verdict::Accepted, None, None, Utc::now())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
