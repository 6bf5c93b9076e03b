//! Attempt response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{Attempt, AttemptStatus, RunType, SubmissionRecord},
    services::FinalizationResult,
    utils::remaining_seconds,
};

/// Attempt response
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub score: i64,
    pub max_score: i64,
    pub submitted_at: Option<DateTime<Utc>>,
    /// Seconds until the deadline by the server clock
    pub remaining_seconds: i64,
    pub expired: bool,
}

impl AttemptResponse {
    pub fn from_attempt(attempt: Attempt, now: DateTime<Utc>) -> Self {
        let remaining = if attempt.is_active() {
            remaining_seconds(attempt.ends_at, now)
        } else {
            0
        };

        Self {
            id: attempt.id,
            user_id: attempt.user_id,
            test_id: attempt.test_id,
            status: attempt.status,
            started_at: attempt.started_at,
            ends_at: attempt.ends_at,
            score: attempt.score,
            max_score: attempt.max_score,
            submitted_at: attempt.submitted_at,
            remaining_seconds: remaining,
            expired: attempt.is_expired_at(now),
        }
    }
}

/// Finalize response
#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub attempt_id: Uuid,
    pub status: AttemptStatus,
    pub score: i64,
    pub max_score: i64,
    pub submitted_at: DateTime<Utc>,
    pub already_finalized: bool,
}

impl From<FinalizationResult> for FinalizeResponse {
    fn from(result: FinalizationResult) -> Self {
        Self {
            attempt_id: result.attempt_id,
            status: result.status,
            score: result.score,
            max_score: result.max_score,
            submitted_at: result.submitted_at,
            already_finalized: result.already_finalized,
        }
    }
}

/// Recorded judge result
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub run_type: RunType,
    pub passed_count: i32,
    pub total_count: i32,
    pub language: String,
    pub verdict: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SubmissionRecord> for SubmissionResponse {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            id: record.id,
            attempt_id: record.attempt_id,
            question_id: record.question_id,
            run_type: record.run_type,
            passed_count: record.passed_count,
            total_count: record.total_count,
            language: record.language,
            verdict: record.verdict,
            created_at: record.created_at,
        }
    }
}
