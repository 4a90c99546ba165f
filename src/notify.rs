//! Cache invalidation notifier
//!
//! After a scoring-affecting write, the render layer's caches for the
//! touched pages are told to refresh. Notification is fire-and-forget:
//! failures are logged and never fail the scoring path.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::RevalidateConfig;
use crate::constants::REVALIDATE_SECRET_HEADER;
use crate::error::{AppError, AppResult};

/// Sink for "this logical path changed" notifications
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Notify that the resource at `path` changed. Never fails.
    async fn path_changed(&self, path: &str);
}

/// Notify several paths concurrently
pub async fn notify_paths(invalidator: &dyn CacheInvalidator, paths: &[String]) {
    futures::future::join_all(paths.iter().map(|path| invalidator.path_changed(path))).await;
}

/// HTTP implementation posting to the render layer's revalidation endpoint
pub struct HttpRevalidator {
    http: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl HttpRevalidator {
    pub fn new(config: &RevalidateConfig) -> AppResult<Self> {
        let endpoint = config
            .url
            .clone()
            .ok_or_else(|| AppError::Validation("REVALIDATE_URL is not set".to_string()))?;

        let http = reqwest::Client::new();
        Ok(Self {
            http,
            endpoint,
            secret: config.secret.clone(),
        })
    }
}

#[async_trait]
impl CacheInvalidator for HttpRevalidator {
    async fn path_changed(&self, path: &str) {
        let result = self
            .http
            .post(&self.endpoint)
            .header(REVALIDATE_SECRET_HEADER, &self.secret)
            .json(&json!({ "path": path }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(path, "Cache revalidated");
            }
            Ok(response) => {
                warn!(path, status = %response.status(), "Cache revalidation rejected");
            }
            Err(e) => {
                warn!(path, error = %e, "Cache revalidation failed");
            }
        }
    }
}

/// No-op implementation used when no revalidation endpoint is configured
pub struct NoopInvalidator;

#[async_trait]
impl CacheInvalidator for NoopInvalidator {
    async fn path_changed(&self, path: &str) {
        debug!(path, "Cache revalidation skipped, no endpoint configured");
    }
}
