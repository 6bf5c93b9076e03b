//! Storage seams used by the attempt lifecycle
//!
//! `AttemptStore` is written only by the lifecycle manager. `TestCatalog` and
//! `SubmissionLedger` are collaborators this service reads (and, for the
//! ledger, appends judge results to).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Attempt, Finalization, NewAttempt, NewSubmission, RunType, SubmissionRecord,
        TestDefinition,
    },
};

/// Persisted attempts, one row per exam session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Find attempt by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attempt>>;

    /// Find the active attempt for a user and test, if any
    async fn find_active(&self, user_id: Uuid, test_id: Uuid) -> AppResult<Option<Attempt>>;

    /// Insert a new active attempt.
    ///
    /// Returns `None` without writing when another active attempt already
    /// exists for the same user and test.
    async fn insert_active(&self, attempt: NewAttempt) -> AppResult<Option<Attempt>>;

    /// Write the terminal values if and only if the attempt is still active.
    ///
    /// This is a single conditional write. `None` means the attempt was no
    /// longer active and nothing was changed.
    async fn finalize_if_active(
        &self,
        id: Uuid,
        finalization: Finalization,
    ) -> AppResult<Option<Attempt>>;

    /// Active attempts whose deadline is at or before `now`, oldest first
    async fn list_expired_active(&self, now: DateTime<Utc>, limit: i64)
        -> AppResult<Vec<Attempt>>;
}

/// Read access to tests and their question weights
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestCatalog: Send + Sync {
    async fn get_test(&self, test_id: Uuid) -> AppResult<Option<TestDefinition>>;
}

/// Append-only record of judge results
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionLedger: Send + Sync {
    /// All scored submissions recorded for an attempt
    async fn list_scored(&self, attempt_id: Uuid) -> AppResult<Vec<SubmissionRecord>>;

    /// Append a judge result
    async fn record(&self, submission: NewSubmission) -> AppResult<SubmissionRecord>;

    /// Number of results of `run_type` recorded for an attempt since `since`
    async fn count_since(
        &self,
        attempt_id: Uuid,
        run_type: RunType,
        since: DateTime<Utc>,
    ) -> AppResult<i64>;
}
