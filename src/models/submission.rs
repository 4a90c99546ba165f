//! Submission model and verdict lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Submission database model
///
/// One row per attempt, created at dispatch time and retained forever as an
/// audit trail. The verdict only moves forward through the state machine and
/// `settled_at` is written exactly once, by the first terminal transition.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub problem_id: Uuid,
    /// Practice submissions carry no contest reference
    pub contest_id: Option<Uuid>,
    pub language: String,
    #[serde(skip_serializing)]
    pub source_code: String,
    /// Opaque tracking token assigned by the external judge, unique and
    /// immutable once assigned
    pub judge_token: String,
    pub verdict: String,
    pub execution_time_ms: Option<f64>,
    pub memory_usage_kb: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Parse the stored verdict string
    pub fn verdict(&self) -> Verdict {
        Verdict::from_str(&self.verdict).unwrap_or(Verdict::InternalError)
    }

    /// Externally visible status: any non-terminal state reads as "pending"
    pub fn visible_status(&self) -> &'static str {
        let verdict = self.verdict();
        if verdict.is_terminal() {
            verdict.as_str()
        } else {
            "pending"
        }
    }
}

/// Submission verdict enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Queued,
    Running,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompileError,
    InternalError,
}

impl Verdict {
    /// Get verdict as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Accepted => "accepted",
            Self::WrongAnswer => "wrong_answer",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::RuntimeError => "runtime_error",
            Self::CompileError => "compile_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Parse verdict from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "accepted" => Some(Self::Accepted),
            "wrong_answer" => Some(Self::WrongAnswer),
            "time_limit_exceeded" => Some(Self::TimeLimitExceeded),
            "memory_limit_exceeded" => Some(Self::MemoryLimitExceeded),
            "runtime_error" => Some(Self::RuntimeError),
            "compile_error" => Some(Self::CompileError),
            "internal_error" => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Check if this is a terminal verdict; no further transition is
    /// permitted once reached
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Running)
    }

    /// Check if this verdict means the solution was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_string_roundtrip() {
        for verdict in [
            Verdict::Queued,
            Verdict::Running,
            Verdict::Accepted,
            Verdict::WrongAnswer,
            Verdict::TimeLimitExceeded,
            Verdict::MemoryLimitExceeded,
            Verdict::RuntimeError,
            Verdict::CompileError,
            Verdict::InternalError,
        ] {
            assert_eq!(Verdict::from_str(verdict.as_str()), Some(verdict));
        }
        assert_eq!(Verdict::from_str("nonsense"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!Verdict::Queued.is_terminal());
        assert!(!Verdict::Running.is_terminal());
        assert!(Verdict::Accepted.is_terminal());
        assert!(Verdict::WrongAnswer.is_terminal());
        assert!(Verdict::InternalError.is_terminal());
    }

    #[test]
    fn test_visible_status_defaults_to_pending() {
        let mut submission = Submission {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            problem_id: Uuid::new_v4(),
            contest_id: None,
            language: "rs".to_string(),
            source_code: String::new(),
            judge_token: "tok".to_string(),
            verdict: Verdict::Queued.as_str().to_string(),
            execution_time_ms: None,
            memory_usage_kb: None,
            submitted_at: Utc::now(),
            settled_at: None,
        };
        assert_eq!(submission.visible_status(), "pending");

        submission.verdict = Verdict::Running.as_str().to_string();
        assert_eq!(submission.visible_status(), "pending");

        submission.verdict = Verdict::WrongAnswer.as_str().to_string();
        assert_eq!(submission.visible_status(), "wrong_answer");
    }
}
