//! Submission ledger model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of judge run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "run_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Practice run against sample cases; never counted
    Trial,
    /// Graded submission that counts toward the score
    Scored,
}

impl RunType {
    /// Get run type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Scored => "scored",
        }
    }
}

impl std::fmt::Display for RunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One graded attempt at a question
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SubmissionRecord {
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

/// A judge result to append to the ledger
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub run_type: RunType,
    pub passed_count: i32,
    pub total_count: i32,
    pub language: String,
    pub verdict: Option<String>,
}

impl NewSubmission {
    /// The row as it looks once stored
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> SubmissionRecord {
        SubmissionRecord {
            id,
            attempt_id: self.attempt_id,
            question_id: self.question_id,
            run_type: self.run_type,
            passed_count: self.passed_count,
            total_count: self.total_count,
            language: self.language,
            verdict: self.verdict,
            created_at,
        }
    }
}
