//! Submission ledger repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::stores::SubmissionLedger,
    error::AppResult,
    models::{NewSubmission, RunType, SubmissionRecord},
};

/// PostgreSQL-backed submission ledger
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionLedger for SubmissionRepository {
    async fn list_scored(&self, attempt_id: Uuid) -> AppResult<Vec<SubmissionRecord>> {
        let submissions = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            SELECT * FROM submissions
            WHERE attempt_id = $1 AND run_type = 'scored'
            ORDER BY created_at ASC
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    async fn record(&self, submission: NewSubmission) -> AppResult<SubmissionRecord> {
        let record = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            INSERT INTO submissions (
                attempt_id, question_id, run_type, passed_count, total_count, language, verdict
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(submission.attempt_id)
        .bind(submission.question_id)
        .bind(submission.run_type)
        .bind(submission.passed_count)
        .bind(submission.total_count)
        .bind(&submission.language)
        .bind(&submission.verdict)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn count_since(
        &self,
        attempt_id: Uuid,
        run_type: RunType,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM submissions
            WHERE attempt_id = $1 AND run_type = $2 AND created_at >= $3
            "#,
        )
        .bind(attempt_id)
        .bind(run_type)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
