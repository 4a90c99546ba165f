//! External judge status codes and their mapping onto the verdict lifecycle

use serde::{Deserialize, Serialize};

use crate::models::Verdict;

/// Status block reported by the external judge on every callback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeStatus {
    pub id: i64,
    pub description: String,
}

impl JudgeStatus {
    /// Map the external status onto the internal verdict lifecycle.
    ///
    /// The mapping is total: the numeric id is authoritative, the textual
    /// description is a fallback for judge deployments that extend the id
    /// space, and anything unrecognized settles as an internal error rather
    /// than being dropped.
    pub fn to_verdict(&self) -> Verdict {
        if let Some(verdict) = verdict_by_id(self.id) {
            return verdict;
        }
        if let Some(verdict) = verdict_by_description(&self.description) {
            return verdict;
        }
        Verdict::InternalError
    }
}

fn verdict_by_id(id: i64) -> Option<Verdict> {
    match id {
        1 => Some(Verdict::Queued),
        2 => Some(Verdict::Running),
        3 => Some(Verdict::Accepted),
        4 => Some(Verdict::WrongAnswer),
        5 => Some(Verdict::TimeLimitExceeded),
        6 => Some(Verdict::CompileError),
        // The judge distinguishes signal-specific runtime failures (SIGSEGV,
        // SIGFPE, NZEC, ...); they all settle as a runtime error here.
        7..=12 => Some(Verdict::RuntimeError),
        13 | 14 => Some(Verdict::InternalError),
        _ => None,
    }
}

fn verdict_by_description(description: &str) -> Option<Verdict> {
    match description {
        "In Queue" => Some(Verdict::Queued),
        "Processing" => Some(Verdict::Running),
        "Accepted" => Some(Verdict::Accepted),
        "Wrong Answer" => Some(Verdict::WrongAnswer),
        "Time Limit Exceeded" => Some(Verdict::TimeLimitExceeded),
        "Memory Limit Exceeded" => Some(Verdict::MemoryLimitExceeded),
        "Compilation Error" => Some(Verdict::CompileError),
        "Internal Error" => Some(Verdict::InternalError),
        desc if desc.starts_with("Runtime Error") => Some(Verdict::RuntimeError),
        _ => None,
    }
}
