//! Submission response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Submission;

/// Submission response
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub problem_id: Uuid,
    pub contest_id: Option<Uuid>,
    pub language: String,
    /// Latest committed state; non-terminal states read as "pending"
    pub status: String,
    pub execution_time_ms: Option<f64>,
    pub memory_usage_kb: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            status: submission.visible_status().to_string(),
            id: submission.id,
            user_id: submission.user_id,
            problem_id: submission.problem_id,
            contest_id: submission.contest_id,
            language: submission.language,
            execution_time_ms: submission.execution_time_ms,
            memory_usage_kb: submission.memory_usage_kb,
            submitted_at: submission.submitted_at,
            settled_at: submission.settled_at,
        }
    }
}

/// Submission list response
#[derive(Debug, Serialize)]
pub struct SubmissionsListResponse {
    pub submissions: Vec<SubmissionResponse>,
}

/// Create submission response
#[derive(Debug, Serialize)]
pub struct CreateSubmissionResponse {
    pub id: Uuid,
    pub message: String,
    pub status: String,
}

/// Callback acknowledgement
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub message: String,
}
