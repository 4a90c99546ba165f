//! Scoring engine
//!
//! Turns a first acceptance into a point award. The award itself is
//! committed by the store as one transaction (marker plus aggregate
//! increment); this service computes the award, drives the retry policy
//! and fans out the post-commit notifications.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::AppResult;
use crate::models::Difficulty;
use crate::notify::{notify_paths, CacheInvalidator};
use crate::services::LeaderboardService;
use crate::store::{ScoreGrant, ScoreOutcome, Store};
use crate::utils::retry_transient;

/// Scoring service for business logic
pub struct ScoringService;

impl ScoringService {
    /// Point value for an acceptance at `accepted_at`.
    ///
    /// The base value is set by the problem difficulty and decays linearly
    /// over the contest window: full base plus half at the opening bell,
    /// half the base at the closing bell, and never below half the base for
    /// late-settling verdicts. A zero-length window awards the floor.
    pub fn award_points(
        difficulty: Difficulty,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        accepted_at: DateTime<Utc>,
    ) -> i64 {
        let base = difficulty.base_points();
        let floor = base / 2;

        let duration_ms = (end_time - start_time).num_milliseconds();
        if duration_ms <= 0 {
            return floor;
        }

        let remaining_ms = (end_time - accepted_at).num_milliseconds();
        let decayed = (remaining_ms as f64 / duration_ms as f64) * base as f64 + floor as f64;

        (decayed.round() as i64).max(floor)
    }

    /// Commit an acceptance award at most once per (user, contest, problem).
    ///
    /// On a fresh award the contest's leaderboard view is invalidated and
    /// the render-layer caches are notified; a duplicate grant is a
    /// successful no-op with no side effects.
    pub async fn apply_acceptance(
        store: &dyn Store,
        leaderboard: &LeaderboardService,
        invalidator: &dyn CacheInvalidator,
        grant: ScoreGrant,
    ) -> AppResult<ScoreOutcome> {
        let outcome =
            retry_transient("apply_acceptance", || store.apply_acceptance(grant.clone())).await?;

        if let ScoreOutcome::Awarded {
            total_points,
            solved_count,
        } = outcome
        {
            info!(
                user_id = %grant.user_id,
                contest_id = %grant.contest_id,
                problem_id = %grant.problem_id,
                points = grant.points,
                total_points,
                solved_count,
                "Points awarded"
            );

            leaderboard.invalidate(&grant.contest_id).await;
            notify_paths(
                invalidator,
                &[
                    format!("/contests/{}/leaderboard", grant.contest_id),
                    format!("/contests/{}", grant.contest_id),
                ],
            )
            .await;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration;
    use uuid::Uuid;

    use crate::notify::NoopInvalidator;
    use crate::store::MemoryStore;

    #[test]
    fn test_award_full_decay_range() {
        let start = Utc::now();
        let end = start + Duration::hours(2);

        // At the opening bell: base + base/2
        assert_eq!(
            ScoringService::award_points(Difficulty::Easy, start, end, start),
            375
        );
        // Mid-window: base
        assert_eq!(
            ScoringService::award_points(Difficulty::Easy, start, end, start + Duration::hours(1)),
            250
        );
        // At the closing bell: base/2
        assert_eq!(
            ScoringService::award_points(Difficulty::Easy, start, end, end),
            125
        );
    }

    #[test]
    fn test_award_never_drops_below_floor() {
        let start = Utc::now();
        let end = start + Duration::hours(2);

        // A verdict settling long after the contest ended still grants the floor
        let late = end + Duration::hours(5);
        assert_eq!(
            ScoringService::award_points(Difficulty::Hard, start, end, late),
            500
        );
    }

    #[test]
    fn test_award_zero_length_window() {
        let start = Utc::now();
        assert_eq!(
            ScoringService::award_points(Difficulty::Medium, start, start, start),
            250
        );
    }

    fn grant(user: Uuid, contest: Uuid, problem: Uuid, points: i64) -> ScoreGrant {
        ScoreGrant {
            user_id: user,
            contest_id: contest,
            problem_id: problem,
            submission_id: Uuid::new_v4(),
            points,
            settled_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_grant_awards_once() {
        let store = MemoryStore::new();
        let leaderboard = LeaderboardService::new();
        let user = Uuid::new_v4();
        let contest = Uuid::new_v4();
        let problem = Uuid::new_v4();

        let first = ScoringService::apply_acceptance(
            &store,
            &leaderboard,
            &NoopInvalidator,
            grant(user, contest, problem, 300),
        )
        .await
        .unwrap();
        assert_eq!(
            first,
            ScoreOutcome::Awarded {
                total_points: 300,
                solved_count: 1
            }
        );

        // Same problem again, e.g. an accepted resubmission
        let second = ScoringService::apply_acceptance(
            &store,
            &leaderboard,
            &NoopInvalidator,
            grant(user, contest, problem, 300),
        )
        .await
        .unwrap();
        assert_eq!(second, ScoreOutcome::AlreadyScored);

        let row = store.contest_points_for(&user, &contest).await.unwrap();
        assert_eq!(row.points, 300);
        assert_eq!(row.solved_count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_acceptances_lose_no_updates() {
        let store = Arc::new(MemoryStore::new());
        let leaderboard = Arc::new(LeaderboardService::new());
        let user = Uuid::new_v4();
        let contest = Uuid::new_v4();

        let problems: Vec<(Uuid, i64)> = (1..=8).map(|i| (Uuid::new_v4(), i * 100)).collect();

        let mut handles = Vec::new();
        for (problem, points) in problems.clone() {
            let store = Arc::clone(&store);
            let leaderboard = Arc::clone(&leaderboard);
            handles.push(tokio::spawn(async move {
                ScoringService::apply_acceptance(
                    store.as_ref(),
                    leaderboard.as_ref(),
                    &NoopInvalidator,
                    grant(user, contest, problem, points),
                )
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let row = store.contest_points_for(&user, &contest).await.unwrap();
        assert_eq!(row.points, problems.iter().map(|(_, p)| p).sum::<i64>());
        assert_eq!(row.solved_count, problems.len() as i64);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_for_one_problem_award_once() {
        let store = Arc::new(MemoryStore::new());
        let leaderboard = Arc::new(LeaderboardService::new());
        let user = Uuid::new_v4();
        let contest = Uuid::new_v4();
        let problem = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let leaderboard = Arc::clone(&leaderboard);
            handles.push(tokio::spawn(async move {
                ScoringService::apply_acceptance(
                    store.as_ref(),
                    leaderboard.as_ref(),
                    &NoopInvalidator,
                    grant(user, contest, problem, 250),
                )
                .await
                .unwrap()
            }));
        }

        let mut awarded = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), ScoreOutcome::Awarded { .. }) {
                awarded += 1;
            }
        }
        assert_eq!(awarded, 1);

        let row = store.contest_points_for(&user, &contest).await.unwrap();
        assert_eq!(row.points, 250);
    }

    #[tokio::test]
    async fn test_last_success_timestamp_never_moves_backwards() {
        let store = MemoryStore::new();
        let leaderboard = LeaderboardService::new();
        let user = Uuid::new_v4();
        let contest = Uuid::new_v4();

        let newer = Utc::now();
        let older = newer - Duration::minutes(30);

        let mut first = grant(user, contest, Uuid::new_v4(), 100);
        first.settled_at = newer;
        ScoringService::apply_acceptance(&store, &leaderboard, &NoopInvalidator, first)
            .await
            .unwrap();

        // An out-of-order, older acceptance still adds points
        let mut second = grant(user, contest, Uuid::new_v4(), 100);
        second.settled_at = older;
        ScoringService::apply_acceptance(&store, &leaderboard, &NoopInvalidator, second)
            .await
            .unwrap();

        let row = store.contest_points_for(&user, &contest).await.unwrap();
        assert_eq!(row.points, 200);
        assert_eq!(row.last_successful_submission_at, Some(newer));
    }
}
