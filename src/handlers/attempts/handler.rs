//! Attempt handler implementations

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::NewSubmission,
    services::AttemptService,
    state::AppState,
    utils::now_utc,
};

use super::{
    request::{FinalizeAttemptRequest, RecordSubmissionRequest, StartAttemptRequest},
    response::{AttemptResponse, FinalizeResponse, SubmissionResponse},
};

/// Start (or resume) an attempt
pub async fn start_attempt(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    payload: Result<Json<StartAttemptRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<AttemptResponse>>> {
    let Json(payload) = payload?;
    let test_id = payload.test_id.ok_or(AppError::MissingTestId)?;

    let now = now_utc();
    let attempt = AttemptService::start_attempt(&state, auth_user.id, test_id, now).await?;

    Ok(ApiResponse::ok(AttemptResponse::from_attempt(attempt, now)))
}

/// Finalize an attempt and return its score
pub async fn finalize_attempt(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    payload: Result<Json<FinalizeAttemptRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<FinalizeResponse>>> {
    let Json(payload) = payload?;

    let result =
        AttemptService::finalize_attempt(&state, auth_user.id, payload.attempt_id, now_utc())
            .await?;

    Ok(ApiResponse::ok(result.into()))
}

/// Get an attempt with its remaining time
pub async fn get_attempt(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AttemptResponse>>> {
    let attempt = AttemptService::get_attempt(&state, auth_user.id, id).await?;

    Ok(ApiResponse::ok(AttemptResponse::from_attempt(attempt, now_utc())))
}

/// Record a judge result against an attempt
pub async fn record_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<RecordSubmissionRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<SubmissionResponse>>> {
    // Only the judge may report results
    if !auth_user.is_judge() {
        return Err(AppError::Forbidden(
            "Only the judge can record results".to_string(),
        ));
    }

    let Json(payload) = payload?;
    payload.validate()?;

    let submission = NewSubmission {
        attempt_id: id,
        question_id: payload.question_id,
        run_type: payload.run_type,
        passed_count: payload.passed_count,
        total_count: payload.total_count,
        language: payload.language,
        verdict: payload.verdict,
    };

    let record = AttemptService::record_submission(&state, submission, now_utc()).await?;

    Ok(ApiResponse::ok(record.into()))
}
