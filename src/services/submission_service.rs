//! Submission service
//!
//! Dispatch path: validate, resolve the language, hand the code to the
//! external judge, then persist the submission keyed by the judge's
//! tracking token. The remote call happens first; if persistence fails the
//! whole dispatch is failed and safe to retry, since the judge tolerates a
//! run that is never called back.

use tracing::info;
use uuid::Uuid;

use crate::config::JudgeConfig;
use crate::error::{AppError, AppResult};
use crate::handlers::submissions::request::CreateSubmissionRequest;
use crate::judge::{JudgeClient, JudgeSubmitRequest, LanguageRegistry};
use crate::models::{Contest, Submission};
use crate::store::{NewSubmission, Store};
use crate::utils::retry_transient;

/// Submission service for business logic
pub struct SubmissionService;

impl SubmissionService {
    /// Dispatch a new submission to the external judge
    pub async fn create_submission(
        store: &dyn Store,
        judge: &dyn JudgeClient,
        judge_config: &JudgeConfig,
        user_id: &Uuid,
        payload: CreateSubmissionRequest,
    ) -> AppResult<Submission> {
        let problem = store
            .problem_by_id(&payload.problem_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

        if let Some(contest_id) = payload.contest_id {
            let contest = store
                .contest_by_id(&contest_id)
                .await?
                .filter(Contest::is_visible)
                .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

            if !contest.is_active() {
                return Err(AppError::Validation("Contest is not active".to_string()));
            }
        }

        // Fails fast, before any remote call
        let language = LanguageRegistry::resolve(&payload.language)
            .ok_or_else(|| AppError::UnsupportedLanguage(payload.language.clone()))?;

        let token = judge
            .submit(JudgeSubmitRequest {
                source_code: payload.source_code.clone(),
                language_id: language.judge_id,
                callback_url: judge_config.callback_url.clone(),
            })
            .await?;

        let new = NewSubmission {
            user_id: *user_id,
            problem_id: problem.id,
            contest_id: payload.contest_id,
            language: language.key.to_string(),
            source_code: payload.source_code,
            judge_token: token,
        };

        let submission =
            retry_transient("insert_submission", || store.insert_submission(new.clone())).await?;

        info!(
            submission_id = %submission.id,
            token = %submission.judge_token,
            language = %submission.language,
            "Submission dispatched"
        );

        Ok(submission)
    }

    /// Get submission by ID
    pub async fn get_submission(store: &dyn Store, id: &Uuid) -> AppResult<Submission> {
        store
            .submission_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
    }

    /// List a user's submissions for a problem, newest first
    pub async fn list_submissions(
        store: &dyn Store,
        user_id: &Uuid,
        problem_id: &Uuid,
        contest_id: Option<&Uuid>,
    ) -> AppResult<Vec<Submission>> {
        store
            .submissions_for_user(user_id, problem_id, contest_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, Utc};

    use crate::judge::client::MockJudgeClient;
    use crate::models::{Difficulty, Problem, Verdict};
    use crate::store::MemoryStore;

    fn judge_config() -> JudgeConfig {
        JudgeConfig {
            url: "http://judge.local".to_string(),
            callback_url: "http://api.local/api/v1/submissions/callback".to_string(),
            webhook_secret: "secret".to_string(),
            timeout_seconds: 10,
        }
    }

    fn problem() -> Problem {
        Problem {
            id: Uuid::new_v4(),
            title: "Two Sum".to_string(),
            slug: "two-sum".to_string(),
            difficulty: Difficulty::Easy.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    fn request(problem_id: Uuid, language: &str) -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            problem_id,
            contest_id: None,
            language: language.to_string(),
            source_code: "fn main() {}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_persists_queued_submission_with_token() {
        let store = MemoryStore::new();
        let p = problem();
        store.seed_problem(p.clone()).await;

        let mut judge = MockJudgeClient::new();
        judge
            .expect_submit()
            .withf(|req| req.language_id == 73 && req.callback_url.ends_with("/callback"))
            .returning(|_| Ok("tok-abc".to_string()));

        let submission = SubmissionService::create_submission(
            &store,
            &judge,
            &judge_config(),
            &Uuid::new_v4(),
            request(p.id, "rs"),
        )
        .await
        .unwrap();

        assert_eq!(submission.verdict(), Verdict::Queued);
        assert_eq!(submission.judge_token, "tok-abc");

        let stored = store.submission_by_token("tok-abc").await.unwrap().unwrap();
        assert_eq!(stored.id, submission.id);
    }

    #[tokio::test]
    async fn test_unsupported_language_fails_before_remote_call() {
        let store = MemoryStore::new();
        let p = problem();
        store.seed_problem(p.clone()).await;

        // No expectation is set: any judge call would panic the mock
        let judge = MockJudgeClient::new();

        let result = SubmissionService::create_submission(
            &store,
            &judge,
            &judge_config(),
            &Uuid::new_v4(),
            request(p.id, "cobol"),
        )
        .await;

        assert!(matches!(result, Err(AppError::UnsupportedLanguage(_))));
    }

    #[tokio::test]
    async fn test_unknown_problem_is_rejected() {
        let store = MemoryStore::new();
        let judge = MockJudgeClient::new();

        let result = SubmissionService::create_submission(
            &store,
            &judge,
            &judge_config(),
            &Uuid::new_v4(),
            request(Uuid::new_v4(), "rs"),
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submission_to_ended_contest_is_rejected() {
        let store = MemoryStore::new();
        let p = problem();
        store.seed_problem(p.clone()).await;

        let contest = crate::models::Contest {
            id: Uuid::new_v4(),
            title: "Finished Round".to_string(),
            start_time: Utc::now() - Duration::hours(3),
            end_time: Utc::now() - Duration::hours(1),
            hidden: false,
            deleted_at: None,
            created_at: Utc::now(),
        };
        store.seed_contest(contest.clone()).await;

        let judge = MockJudgeClient::new();
        let mut payload = request(p.id, "rs");
        payload.contest_id = Some(contest.id);

        let result = SubmissionService::create_submission(
            &store,
            &judge,
            &judge_config(),
            &Uuid::new_v4(),
            payload,
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_judge_failure_persists_nothing() {
        let store = MemoryStore::new();
        let p = problem();
        store.seed_problem(p.clone()).await;

        let mut judge = MockJudgeClient::new();
        judge
            .expect_submit()
            .returning(|_| Err(AppError::JudgeUnavailable("connection refused".to_string())));

        let user_id = Uuid::new_v4();
        let result = SubmissionService::create_submission(
            &store,
            &judge,
            &judge_config(),
            &user_id,
            request(p.id, "rs"),
        )
        .await;

        assert!(matches!(result, Err(AppError::JudgeUnavailable(_))));
        let listed = store
            .submissions_for_user(&user_id, &p.id, None)
            .await
            .unwrap();
        assert!(listed.is_empty());
    }
}
