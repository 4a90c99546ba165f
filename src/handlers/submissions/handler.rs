//! Submission handler implementations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::{CallbackAuth, GatewayUser},
    services::{CallbackOutcome, CallbackService, SubmissionService},
    state::AppState,
};

use super::{
    request::{CreateSubmissionRequest, ListSubmissionsQuery, SubmissionCallback},
    response::{
        CallbackResponse, CreateSubmissionResponse, SubmissionResponse, SubmissionsListResponse,
    },
};

/// Create a new submission and dispatch it to the external judge
pub async fn create_submission(
    State(state): State<AppState>,
    user: GatewayUser,
    Json(payload): Json<CreateSubmissionRequest>,
) -> AppResult<(StatusCode, Json<CreateSubmissionResponse>)> {
    payload.validate()?;

    let submission = SubmissionService::create_submission(
        state.store(),
        state.judge(),
        &state.config().judge,
        &user.id,
        payload,
    )
    .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateSubmissionResponse {
            id: submission.id,
            message: "Submission received and dispatched for judging".to_string(),
            status: submission.visible_status().to_string(),
        }),
    ))
}

/// List the caller's submissions for a problem
pub async fn list_submissions(
    State(state): State<AppState>,
    user: GatewayUser,
    Query(query): Query<ListSubmissionsQuery>,
) -> AppResult<Json<SubmissionsListResponse>> {
    let submissions = SubmissionService::list_submissions(
        state.store(),
        &user.id,
        &query.problem_id,
        query.contest_id.as_ref(),
    )
    .await?;

    Ok(Json(SubmissionsListResponse {
        submissions: submissions.into_iter().map(SubmissionResponse::from).collect(),
    }))
}

/// Get a specific submission
pub async fn get_submission(
    State(state): State<AppState>,
    user: GatewayUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmissionResponse>> {
    let submission = SubmissionService::get_submission(state.store(), &id).await?;

    // Users can only view their own submissions
    if submission.user_id != user.id {
        return Err(crate::error::AppError::Forbidden(
            "Cannot view other users' submissions".to_string(),
        ));
    }

    Ok(Json(SubmissionResponse::from(submission)))
}

/// Webhook invoked by the external judge when a run finishes.
///
/// `CallbackAuth` runs before the body is read, so unauthenticated
/// deliveries are rejected with no state change. Processing the same
/// payload repeatedly is safe; duplicates acknowledge with success.
pub async fn submission_callback(
    State(state): State<AppState>,
    _auth: CallbackAuth,
    Json(payload): Json<SubmissionCallback>,
) -> AppResult<Json<CallbackResponse>> {
    let outcome = CallbackService::ingest(
        state.store(),
        state.leaderboard(),
        state.invalidator(),
        payload,
    )
    .await?;

    let message = match outcome {
        CallbackOutcome::Progress => "Progress recorded",
        CallbackOutcome::AlreadySettled => "Submission already settled",
        CallbackOutcome::Settled(_) => "Verdict settled",
        CallbackOutcome::Scored { .. } => "Verdict settled and points awarded",
    };

    Ok(Json(CallbackResponse {
        message: message.to_string(),
    }))
}
