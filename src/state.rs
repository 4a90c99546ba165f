//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::config::Config;
use crate::judge::JudgeClient;
use crate::notify::CacheInvalidator;
use crate::services::LeaderboardService;
use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Transactional store
    store: Arc<dyn Store>,

    /// External judge client
    judge: Arc<dyn JudgeClient>,

    /// Render-layer cache invalidation sink
    invalidator: Arc<dyn CacheInvalidator>,

    /// Leaderboard ranking service with its snapshot cache
    leaderboard: LeaderboardService,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        store: Arc<dyn Store>,
        judge: Arc<dyn JudgeClient>,
        invalidator: Arc<dyn CacheInvalidator>,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                judge,
                invalidator,
                leaderboard: LeaderboardService::new(),
                config,
            }),
        }
    }

    /// Get a reference to the store
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the judge client
    pub fn judge(&self) -> &dyn JudgeClient {
        self.inner.judge.as_ref()
    }

    /// Get a reference to the cache invalidator
    pub fn invalidator(&self) -> &dyn CacheInvalidator {
        self.inner.invalidator.as_ref()
    }

    /// Get a reference to the leaderboard service
    pub fn leaderboard(&self) -> &LeaderboardService {
        &self.inner.leaderboard
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
