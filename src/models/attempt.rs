//! Attempt model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attempt_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Active,
    Submitted,
    AutoSubmitted,
}

impl AttemptStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Submitted => "submitted",
            Self::AutoSubmitted => "auto_submitted",
        }
    }

    /// Check if the attempt can no longer change
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Terminal status for a finalize observed at `now`.
    ///
    /// The deadline is inclusive on the auto-submit side: finalizing exactly at
    /// `ends_at` is an auto-submit.
    pub fn for_finalize_at(now: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        if now >= ends_at {
            Self::AutoSubmitted
        } else {
            Self::Submitted
        }
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt database model
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub score: i64,
    pub max_score: i64,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Attempt {
    /// Whether the attempt is still open
    pub fn is_active(&self) -> bool {
        self.status == AttemptStatus::Active
    }

    /// Whether the server clock has reached the deadline
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }
}

/// Values for a freshly started attempt
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl NewAttempt {
    /// Open an attempt at `now` lasting `duration`
    pub fn open(user_id: Uuid, test_id: Uuid, now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            test_id,
            started_at: now,
            ends_at: now + duration,
        }
    }

    /// The row as it looks once stored
    pub fn into_attempt(self) -> Attempt {
        Attempt {
            id: self.id,
            user_id: self.user_id,
            test_id: self.test_id,
            status: AttemptStatus::Active,
            started_at: self.started_at,
            ends_at: self.ends_at,
            score: 0,
            max_score: 0,
            submitted_at: None,
        }
    }
}

/// Terminal values written by the compare-and-swap finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalization {
    pub status: AttemptStatus,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub max_score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_status_boundary_is_auto_submit() {
        let ends_at = Utc::now();

        assert_eq!(
            AttemptStatus::for_finalize_at(ends_at - Duration::milliseconds(1), ends_at),
            AttemptStatus::Submitted
        );
        assert_eq!(
            AttemptStatus::for_finalize_at(ends_at, ends_at),
            AttemptStatus::AutoSubmitted
        );
        assert_eq!(
            AttemptStatus::for_finalize_at(ends_at + Duration::seconds(5), ends_at),
            AttemptStatus::AutoSubmitted
        );
    }

    #[test]
    fn test_new_attempt_window() {
        let now = Utc::now();
        let attempt = NewAttempt::open(Uuid::new_v4(), Uuid::new_v4(), now, Duration::minutes(90))
            .into_attempt();

        assert!(attempt.is_active());
        assert_eq!(attempt.ends_at - attempt.started_at, Duration::minutes(90));
        assert_eq!((attempt.score, attempt.max_score), (0, 0));
        assert!(attempt.submitted_at.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&AttemptStatus::AutoSubmitted).unwrap();
        assert_eq!(json, "\"auto_submitted\"");
        assert!(AttemptStatus::Submitted.is_terminal());
        assert!(!AttemptStatus::Active.is_terminal());
    }
}
