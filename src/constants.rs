//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// EXTERNAL JUDGE DEFAULTS
// =============================================================================

/// Default base URL of the external judge service
pub const DEFAULT_JUDGE_URL: &str = "http://localhost:2358";

/// Default callback URL handed to the external judge with every dispatch
pub const DEFAULT_JUDGE_CALLBACK_URL: &str =
    "http://localhost:8080/api/v1/submissions/callback";

/// Default timeout for outbound judge requests in seconds
pub const DEFAULT_JUDGE_TIMEOUT_SECONDS: u64 = 10;

/// Header carrying the shared webhook secret on inbound callbacks
pub const JUDGE_SECRET_HEADER: &str = "x-judge-secret";

/// Header carrying the revalidation secret on outbound cache notifications
pub const REVALIDATE_SECRET_HEADER: &str = "x-revalidate-secret";

/// Header carrying the caller identity injected by the upstream gateway
pub const GATEWAY_USER_HEADER: &str = "x-user-id";

// =============================================================================
// RETRY POLICY
// =============================================================================

/// Maximum attempts for transient store failures (dispatch and scoring)
pub const STORE_RETRY_ATTEMPTS: u32 = 3;

/// Initial backoff delay between retries in milliseconds
pub const STORE_RETRY_BASE_DELAY_MS: u64 = 50;

/// Upper bound on the backoff delay in milliseconds
pub const STORE_RETRY_MAX_DELAY_MS: u64 = 1_000;

// =============================================================================
// SCORING
// =============================================================================

/// Base point values per problem difficulty
pub mod points {
    pub const EASY: i64 = 250;
    pub const MEDIUM: i64 = 500;
    pub const HARD: i64 = 1_000;
}

// =============================================================================
// LEADERBOARD
// =============================================================================

/// Maximum number of ranked entries served per contest
pub const MAX_LEADERBOARD_ENTRIES: usize = 100;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum source code size in bytes (1 MB)
pub const MAX_SOURCE_CODE_SIZE: u64 = 1024 * 1024;
