//! Submission request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::judge::JudgeStatus;

/// Create submission request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    /// Problem ID to submit for
    pub problem_id: Uuid,

    /// Contest ID (optional, absent for practice submissions)
    pub contest_id: Option<Uuid>,

    /// Programming language key
    #[validate(length(min = 1, max = 20))]
    pub language: String,

    /// Source code
    #[validate(length(min = 1, max = 1048576))] // 1MB max
    pub source_code: String,
}

/// List submissions query parameters
#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub problem_id: Uuid,
    pub contest_id: Option<Uuid>,
}

/// Webhook payload delivered by the external judge
///
/// The judge is not trusted to keep a stable shape: measurements arrive as
/// numbers, numeric-looking strings, null or not at all, and are parsed
/// defensively. A malformed measurement degrades to "unknown" instead of
/// failing the callback.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmissionCallback {
    /// Tracking token assigned at dispatch
    #[validate(length(min = 1))]
    pub token: String,

    /// External status code and description
    pub status: JudgeStatus,

    /// Wall time in seconds, as reported by the judge
    #[serde(default)]
    pub time: Option<LenientValue>,

    /// Peak memory in kilobytes, as reported by the judge
    #[serde(default)]
    pub memory: Option<LenientValue>,
}

impl SubmissionCallback {
    /// Measured execution time in milliseconds, if parseable
    pub fn execution_time_ms(&self) -> Option<f64> {
        self.time
            .as_ref()
            .and_then(LenientValue::as_f64)
            .map(|seconds| seconds * 1000.0)
    }

    /// Measured memory usage in kilobytes, if parseable
    pub fn memory_usage_kb(&self) -> Option<i64> {
        self.memory
            .as_ref()
            .and_then(LenientValue::as_f64)
            .map(|kb| kb as i64)
    }
}

/// A field that may arrive as a JSON number or a numeric-looking string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LenientValue {
    Number(f64),
    Text(String),
}

impl LenientValue {
    /// Numeric value, if the field actually holds one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(body: serde_json::Value) -> SubmissionCallback {
        serde_json::from_value(body).expect("valid callback shape")
    }

    #[test]
    fn test_measurements_as_strings() {
        let cb = callback(serde_json::json!({
            "token": "tok-1",
            "status": { "id": 3, "description": "Accepted" },
            "time": "0.123",
            "memory": "2048"
        }));
        assert_eq!(cb.execution_time_ms(), Some(123.0));
        assert_eq!(cb.memory_usage_kb(), Some(2048));
    }

    #[test]
    fn test_measurements_as_numbers() {
        let cb = callback(serde_json::json!({
            "token": "tok-1",
            "status": { "id": 3, "description": "Accepted" },
            "time": 0.5,
            "memory": 4096
        }));
        assert_eq!(cb.execution_time_ms(), Some(500.0));
        assert_eq!(cb.memory_usage_kb(), Some(4096));
    }

    #[test]
    fn test_garbage_measurements_degrade_to_unknown() {
        let cb = callback(serde_json::json!({
            "token": "tok-1",
            "status": { "id": 4, "description": "Wrong Answer" },
            "time": "fast",
            "memory": null
        }));
        assert_eq!(cb.execution_time_ms(), None);
        assert_eq!(cb.memory_usage_kb(), None);
    }

    #[test]
    fn test_missing_measurements_are_accepted() {
        let cb = callback(serde_json::json!({
            "token": "tok-1",
            "status": { "id": 5, "description": "Time Limit Exceeded" }
        }));
        assert_eq!(cb.execution_time_ms(), None);
        assert_eq!(cb.memory_usage_kb(), None);
    }

    #[test]
    fn test_empty_token_fails_validation() {
        let cb = callback(serde_json::json!({
            "token": "",
            "status": { "id": 3, "description": "Accepted" }
        }));
        assert!(cb.validate().is_err());
    }
}
