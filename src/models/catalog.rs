//! Test catalog model (read-only reference data)

use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A question assigned to a test with its point weight
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TestQuestion {
    pub question_id: Uuid,
    /// `None` when the catalog row carries no value
    pub points: Option<i32>,
}

/// A test as seen by the lifecycle manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub id: Uuid,
    pub time_limit_minutes: Option<i32>,
    pub questions: Vec<TestQuestion>,
}

impl TestDefinition {
    /// Attempt duration, falling back to `default_minutes` when the catalog has
    /// no positive time limit
    pub fn duration(&self, default_minutes: i64) -> Duration {
        let minutes = self
            .time_limit_minutes
            .filter(|m| *m > 0)
            .map(i64::from)
            .unwrap_or(default_minutes);
        Duration::minutes(minutes)
    }

    /// Whether `question_id` is assigned to this test
    pub fn contains_question(&self, question_id: &Uuid) -> bool {
        self.questions.iter().any(|q| q.question_id == *question_id)
    }
}
