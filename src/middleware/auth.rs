//! Request authentication guards
//!
//! Session management lives in the upstream gateway, which injects the
//! caller identity as a header. The webhook endpoint is authenticated by a
//! shared secret the external judge presents on every delivery. Both guards
//! are extractors, so they run before the request body is touched and an
//! unauthenticated call is rejected with no state change.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::{GATEWAY_USER_HEADER, JUDGE_SECRET_HEADER};
use crate::error::AppError;
use crate::state::AppState;

/// Caller identity injected by the upstream gateway
#[derive(Debug, Clone)]
pub struct GatewayUser {
    pub id: Uuid,
}

impl<S> FromRequestParts<S> for GatewayUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(GATEWAY_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let id = Uuid::parse_str(header).map_err(|_| {
            debug!(header, "Gateway user header is not a valid id");
            AppError::Unauthorized
        })?;

        Ok(GatewayUser { id })
    }
}

/// Proof that a webhook delivery presented the shared judge secret
pub struct CallbackAuth;

impl FromRequestParts<AppState> for CallbackAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(JUDGE_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        match presented {
            Some(secret) if secret == state.config().judge.webhook_secret => Ok(CallbackAuth),
            _ => {
                warn!(path = %parts.uri.path(), "Callback rejected: missing or invalid judge secret");
                Err(AppError::Unauthorized)
            }
        }
    }
}
