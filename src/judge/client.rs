//! Judge dispatch client
//!
//! Submits a compile/run request to the external judge and returns the
//! opaque tracking token that later correlates the asynchronous callback.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::JudgeConfig;
use crate::error::{AppError, AppResult};

/// Run request sent to the external judge
#[derive(Debug, Clone, Serialize)]
pub struct JudgeSubmitRequest {
    pub source_code: String,
    pub language_id: i64,
    pub callback_url: String,
}

/// Client contract for the external judge service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Submit a run request, returning the judge's tracking token
    async fn submit(&self, request: JudgeSubmitRequest) -> AppResult<String>;
}

/// HTTP implementation talking to the judge's REST API
pub struct HttpJudgeClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct JudgeSubmitResponse {
    token: String,
}

impl HttpJudgeClient {
    /// Build a client from configuration, with a bounded request timeout
    pub fn new(config: &JudgeConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl JudgeClient for HttpJudgeClient {
    async fn submit(&self, request: JudgeSubmitRequest) -> AppResult<String> {
        let url = format!("{}/submissions?base64_encoded=false", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::JudgeUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::JudgeUnavailable(format!(
                "judge returned {}",
                response.status()
            )));
        }

        let body: JudgeSubmitResponse = response
            .json()
            .await
            .map_err(|e| AppError::JudgeUnavailable(format!("invalid judge response: {}", e)))?;

        Ok(body.token)
    }
}
