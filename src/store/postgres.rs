//! Postgres store
//!
//! sqlx-backed implementation of the store contract. The two race-sensitive
//! operations lean on the database for their guarantees: verdict settlement
//! is a guarded UPDATE (the row's own state is the lock), and the acceptance
//! award runs marker insert and aggregate upsert inside one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Contest, ContestPoints, Problem, Submission, Verdict};

use super::{NewSubmission, ScoreGrant, ScoreOutcome, SettleOutcome, Store};

/// Postgres-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_submission(&self, new: NewSubmission) -> AppResult<Submission> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (user_id, problem_id, contest_id, language, source_code, judge_token, verdict)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.problem_id)
        .bind(new.contest_id)
        .bind(&new.language)
        .bind(&new.source_code)
        .bind(&new.judge_token)
        .bind(Verdict::Queued.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    async fn submission_by_id(&self, id: &Uuid) -> AppResult<Option<Submission>> {
        let submission =
            sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(submission)
    }

    async fn submission_by_token(&self, token: &str) -> AppResult<Option<Submission>> {
        let submission =
            sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE judge_token = $1"#)
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(submission)
    }

    async fn submissions_for_user(
        &self,
        user_id: &Uuid,
        problem_id: &Uuid,
        contest_id: Option<&Uuid>,
    ) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE user_id = $1
              AND problem_id = $2
              AND ($3::uuid IS NULL OR contest_id = $3)
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(contest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    async fn mark_running(&self, id: &Uuid) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE submissions SET verdict = $2 WHERE id = $1 AND verdict = $3"#,
        )
        .bind(id)
        .bind(Verdict::Running.as_str())
        .bind(Verdict::Queued.as_str())
        .execute(&self.pool)
        .await?;

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
        // The WHERE clause is the check-and-set: only a still-non-terminal
        // row matches, so concurrent duplicates race and at most one wins.
        let settled = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET
                verdict = $2,
                execution_time_ms = $3,
                memory_usage_kb = $4,
                settled_at = $5
            WHERE id = $1 AND verdict IN ($6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(verdict.as_str())
        .bind(execution_time_ms)
        .bind(memory_usage_kb)
        .bind(settled_at)
        .bind(Verdict::Queued.as_str())
        .bind(Verdict::Running.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(match settled {
            Some(submission) => SettleOutcome::Applied(submission),
            None => SettleOutcome::AlreadyTerminal,
        })
    }

    async fn apply_acceptance(&self, grant: ScoreGrant) -> AppResult<ScoreOutcome> {
        let mut tx = self.pool.begin().await?;

        let marker = sqlx::query(
            r#"
            INSERT INTO contest_scores (user_id, contest_id, problem_id, submission_id, points)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, contest_id, problem_id) DO NOTHING
            "#,
        )
        .bind(grant.user_id)
        .bind(grant.contest_id)
        .bind(grant.problem_id)
        .bind(grant.submission_id)
        .bind(grant.points)
        .execute(&mut *tx)
        .await?;

        if marker.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(ScoreOutcome::AlreadyScored);
        }

        let (total_points, solved_count): (i64, i64) = sqlx::query_as(
            r#"
            INSERT INTO contest_points (user_id, contest_id, points, solved_count, last_successful_submission_at)
            VALUES ($1, $2, $3, 1, $4)
            ON CONFLICT (user_id, contest_id) DO UPDATE SET
                points = contest_points.points + EXCLUDED.points,
                solved_count = contest_points.solved_count + 1,
                last_successful_submission_at = GREATEST(
                    contest_points.last_successful_submission_at,
                    EXCLUDED.last_successful_submission_at
                )
            RETURNING points, solved_count
            "#,
        )
        .bind(grant.user_id)
        .bind(grant.contest_id)
        .bind(grant.points)
        .bind(grant.settled_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ScoreOutcome::Awarded {
            total_points,
            solved_count,
        })
    }

    async fn top_contest_points(
        &self,
        contest_id: &Uuid,
        limit: usize,
    ) -> AppResult<Vec<ContestPoints>> {
        let rows = sqlx::query_as::<_, ContestPoints>(
            r#"
            SELECT user_id, contest_id, points, solved_count, last_successful_submission_at
            FROM contest_points
            WHERE contest_id = $1
            ORDER BY points DESC, last_successful_submission_at ASC NULLS LAST, user_id ASC
            LIMIT $2
            "#,
        )
        .bind(contest_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn problem_by_id(&self, id: &Uuid) -> AppResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(r#"SELECT * FROM problems WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(problem)
    }

    async fn contest_by_id(&self, id: &Uuid) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contest)
    }

    async fn display_names(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"SELECT id, display_name FROM users WHERE id = ANY($1)"#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
