//! Callback ingestion
//!
//! Entry point for verdicts reported by the external judge. Delivery is
//! unreliable: callbacks arrive concurrently, out of order, duplicated or
//! very late, and the same payload must be safe to process any number of
//! times. All races funnel into the store's per-submission check-and-set,
//! so at most one terminal transition ever wins.

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::handlers::submissions::request::SubmissionCallback;
use crate::models::Verdict;
use crate::notify::CacheInvalidator;
use crate::services::{LeaderboardService, ScoringService};
use crate::store::{ScoreGrant, ScoreOutcome, SettleOutcome, Store};
use crate::utils::time::now_utc;
use validator::Validate;

/// What a processed callback amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Non-terminal progress update
    Progress,
    /// The submission was already terminal; duplicate delivery, no-op
    AlreadySettled,
    /// Terminal verdict applied, no points granted
    Settled(Verdict),
    /// Terminal verdict applied and points awarded
    Scored { verdict: Verdict, points: i64 },
}

/// Callback ingestion service
pub struct CallbackService;

impl CallbackService {
    /// Process one webhook delivery from the external judge
    pub async fn ingest(
        store: &dyn Store,
        leaderboard: &LeaderboardService,
        invalidator: &dyn CacheInvalidator,
        payload: SubmissionCallback,
    ) -> AppResult<CallbackOutcome> {
        payload
            .validate()
            .map_err(|e| AppError::MalformedCallback(e.to_string()))?;

        let submission = store
            .submission_by_token(&payload.token)
            .await?
            .ok_or_else(|| {
                // Expected under adversarial replay; reject without state change
                warn!(token = %payload.token, "Callback for unknown tracking token");
                AppError::UnknownToken(payload.token.clone())
            })?;

        let verdict = payload.status.to_verdict();

        if !verdict.is_terminal() {
            if verdict == Verdict::Running {
                store.mark_running(&submission.id).await?;
            }
            debug!(submission_id = %submission.id, %verdict, "Progress callback");
            return Ok(CallbackOutcome::Progress);
        }

        let settled_at = now_utc();
        let settled = store
            .settle_verdict(
                &submission.id,
                verdict,
                payload.execution_time_ms(),
                payload.memory_usage_kb(),
                settled_at,
            )
            .await?;

        let submission = match settled {
            SettleOutcome::Applied(submission) => submission,
            SettleOutcome::AlreadyTerminal => {
                debug!(submission_id = %submission.id, "Duplicate callback for settled submission");
                return Ok(CallbackOutcome::AlreadySettled);
            }
        };

        info!(submission_id = %submission.id, %verdict, "Verdict settled");

        // Only first acceptances of contest submissions reach the scoring engine
        let Some(contest_id) = submission.contest_id else {
            return Ok(CallbackOutcome::Settled(verdict));
        };
        if !verdict.is_accepted() {
            return Ok(CallbackOutcome::Settled(verdict));
        }

        let problem = store
            .problem_by_id(&submission.problem_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;
        let contest = store
            .contest_by_id(&contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let points = ScoringService::award_points(
            problem.difficulty(),
            contest.start_time,
            contest.end_time,
            settled_at,
        );

        let outcome = ScoringService::apply_acceptance(
            store,
            leaderboard,
            invalidator,
            ScoreGrant {
                user_id: submission.user_id,
                contest_id,
                problem_id: submission.problem_id,
                submission_id: submission.id,
                points,
                settled_at,
            },
        )
        .await?;

        Ok(match outcome {
            ScoreOutcome::Awarded { .. } => CallbackOutcome::Scored { verdict, points },
            // Another accepted submission already scored this problem
            ScoreOutcome::AlreadyScored => CallbackOutcome::Settled(verdict),
        })
    }
}
