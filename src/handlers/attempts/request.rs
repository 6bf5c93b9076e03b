//! Attempt request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{constants::MAX_VERDICT_LENGTH, models::RunType};

/// Start attempt request
#[derive(Debug, Deserialize)]
pub struct StartAttemptRequest {
    /// Absent or null is reported as `MISSING_TEST_ID`
    #[serde(default)]
    pub test_id: Option<Uuid>,
}

/// Finalize attempt request
#[derive(Debug, Deserialize)]
pub struct FinalizeAttemptRequest {
    pub attempt_id: Uuid,
}

/// Judge result for one run of a question
#[derive(Debug, Deserialize, Validate)]
pub struct RecordSubmissionRequest {
    pub question_id: Uuid,

    /// trial or scored
    pub run_type: RunType,

    pub passed_count: i32,
    pub total_count: i32,

    #[validate(length(min = 1, max = 32))]
    pub language: String,

    /// Judge verdict label, e.g. "accepted" or "wrong_answer"
    #[validate(length(max = MAX_VERDICT_LENGTH))]
    pub verdict: Option<String>,
}
