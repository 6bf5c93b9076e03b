//! Test utilities
//!
//! In-memory stores with the same contracts as the PostgreSQL repositories,
//! plus builders for state, tokens and catalog fixtures. Every store method
//! yields once before touching data so concurrently polled futures interleave
//! the way separate requests would.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    config::{AttemptConfig, Config, DatabaseConfig, JwtConfig, ServerConfig, SweeperConfig},
    db::{AttemptStore, SubmissionLedger, TestCatalog},
    error::AppResult,
    models::{
        Attempt, AttemptStatus, Finalization, NewAttempt, NewSubmission, RunType,
        SubmissionRecord, TestDefinition, TestQuestion,
    },
    services::auth_service::Claims,
    state::AppState,
};

pub const TEST_JWT_SECRET: &str = "exam-engine-test-secret";

/// Attempt store keeping rows in a map
#[derive(Default)]
pub struct InMemoryAttemptStore {
    rows: Mutex<HashMap<Uuid, Attempt>>,
}

impl InMemoryAttemptStore {
    /// Put a row in place as-is
    pub async fn put(&self, attempt: Attempt) {
        self.rows.lock().await.insert(attempt.id, attempt);
    }

    pub async fn get(&self, id: Uuid) -> Option<Attempt> {
        self.rows.lock().await.get(&id).cloned()
    }

    pub async fn count_for(&self, user_id: Uuid, test_id: Uuid) -> usize {
        self.rows
            .lock()
            .await
            .values()
            .filter(|a| a.user_id == user_id && a.test_id == test_id)
            .count()
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attempt>> {
        tokio::task::yield_now().await;
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn find_active(&self, user_id: Uuid, test_id: Uuid) -> AppResult<Option<Attempt>> {
        tokio::task::yield_now().await;
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|a| a.user_id == user_id && a.test_id == test_id && a.is_active())
            .cloned())
    }

    async fn insert_active(&self, attempt: NewAttempt) -> AppResult<Option<Attempt>> {
        tokio::task::yield_now().await;
        let mut rows = self.rows.lock().await;
        let conflict = rows.values().any(|a| {
            a.user_id == attempt.user_id && a.test_id == attempt.test_id && a.is_active()
        });
        if conflict {
            return Ok(None);
        }

        let row = attempt.into_attempt();
        rows.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn finalize_if_active(
        &self,
        id: Uuid,
        finalization: Finalization,
    ) -> AppResult<Option<Attempt>> {
        tokio::task::yield_now().await;
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&id) {
            Some(row) if row.is_active() => {
                row.status = finalization.status;
                row.submitted_at = Some(finalization.submitted_at);
                row.score = finalization.score;
                row.max_score = finalization.max_score;
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_expired_active(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Attempt>> {
        tokio::task::yield_now().await;
        let mut expired: Vec<Attempt> = self
            .rows
            .lock()
            .await
            .values()
            .filter(|a| a.is_active() && a.ends_at <= now)
            .cloned()
            .collect();
        expired.sort_by_key(|a| a.ends_at);
        expired.truncate(limit.max(0) as usize);
        Ok(expired)
    }
}

/// Catalog keeping tests in a map
#[derive(Default)]
pub struct InMemoryCatalog {
    tests: Mutex<HashMap<Uuid, TestDefinition>>,
}

impl InMemoryCatalog {
    pub async fn add(&self, test: TestDefinition) {
        self.tests.lock().await.insert(test.id, test);
    }
}

#[async_trait]
impl TestCatalog for InMemoryCatalog {
    async fn get_test(&self, test_id: Uuid) -> AppResult<Option<TestDefinition>> {
        tokio::task::yield_now().await;
        Ok(self.tests.lock().await.get(&test_id).cloned())
    }
}

/// Ledger keeping records in insertion order
#[derive(Default)]
pub struct InMemoryLedger {
    rows: Mutex<Vec<SubmissionRecord>>,
}

impl InMemoryLedger {
    /// Append a record stamped `created_at`
    pub async fn push_at(&self, submission: NewSubmission, created_at: DateTime<Utc>) {
        let record = submission.into_record(Uuid::new_v4(), created_at);
        self.rows.lock().await.push(record);
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl SubmissionLedger for InMemoryLedger {
    async fn list_scored(&self, attempt_id: Uuid) -> AppResult<Vec<SubmissionRecord>> {
        tokio::task::yield_now().await;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|r| r.attempt_id == attempt_id && r.run_type == RunType::Scored)
            .cloned()
            .collect())
    }

    async fn record(&self, submission: NewSubmission) -> AppResult<SubmissionRecord> {
        tokio::task::yield_now().await;
        let record = submission.into_record(Uuid::new_v4(), Utc::now());
        self.rows.lock().await.push(record.clone());
        Ok(record)
    }

    async fn count_since(
        &self,
        attempt_id: Uuid,
        run_type: RunType,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        tokio::task::yield_now().await;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|r| r.attempt_id == attempt_id && r.run_type == run_type && r.created_at >= since)
            .count() as i64)
    }
}

/// Configuration suitable for tests (no environment access)
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "error".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        attempts: AttemptConfig::default(),
        sweeper: SweeperConfig {
            interval_secs: 0,
            batch_size: 50,
        },
    }
}

/// State wired to in-memory stores, with handles for seeding and inspection
pub struct TestHarness {
    pub state: AppState,
    pub attempts: Arc<InMemoryAttemptStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub ledger: Arc<InMemoryLedger>,
}

pub fn harness() -> TestHarness {
    harness_with_config(test_config())
}

pub fn harness_with_config(config: Config) -> TestHarness {
    let attempts = Arc::new(InMemoryAttemptStore::default());
    let catalog = Arc::new(InMemoryCatalog::default());
    let ledger = Arc::new(InMemoryLedger::default());

    let state = AppState::from_stores(attempts.clone(), catalog.clone(), ledger.clone(), config);

    TestHarness {
        state,
        attempts,
        catalog,
        ledger,
    }
}

/// Sign a bearer token the way the identity provider would
pub fn issue_token(user_id: Uuid, role: &str, secret: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encoding")
}

/// A test with the given question weights and time limit
pub fn test_definition(time_limit_minutes: Option<i32>, points: &[Option<i32>]) -> TestDefinition {
    TestDefinition {
        id: Uuid::new_v4(),
        time_limit_minutes,
        questions: points
            .iter()
            .map(|p| TestQuestion {
                question_id: Uuid::new_v4(),
                points: *p,
            })
            .collect(),
    }
}

/// An active attempt for `test` opened at `started_at`
pub fn active_attempt(user_id: Uuid, test: &TestDefinition, started_at: DateTime<Utc>) -> Attempt {
    Attempt {
        id: Uuid::new_v4(),
        user_id,
        test_id: test.id,
        status: AttemptStatus::Active,
        started_at,
        ends_at: started_at + test.duration(60),
        score: 0,
        max_score: 0,
        submitted_at: None,
    }
}

/// A judge result for `attempt_id`
pub fn judge_result(
    attempt_id: Uuid,
    question_id: Uuid,
    run_type: RunType,
    passed_count: i32,
    total_count: i32,
) -> NewSubmission {
    NewSubmission {
        attempt_id,
        question_id,
        run_type,
        passed_count,
        total_count,
        language: "python".to_string(),
        verdict: None,
    }
}
