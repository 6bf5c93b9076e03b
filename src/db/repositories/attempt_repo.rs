//! Attempt repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::stores::AttemptStore,
    error::AppResult,
    models::{Attempt, Finalization, NewAttempt},
};

/// PostgreSQL-backed attempt store
#[derive(Clone)]
pub struct AttemptRepository {
    pool: PgPool,
}

impl AttemptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for AttemptRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(r#"SELECT * FROM attempts WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(attempt)
    }

    async fn find_active(&self, user_id: Uuid, test_id: Uuid) -> AppResult<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT * FROM attempts
            WHERE user_id = $1 AND test_id = $2 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn insert_active(&self, attempt: NewAttempt) -> AppResult<Option<Attempt>> {
        // The partial unique index only covers active rows, so the conflict
        // target must repeat its predicate.
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            INSERT INTO attempts (id, user_id, test_id, status, started_at, ends_at, score, max_score)
            VALUES ($1, $2, $3, 'active', $4, $5, 0, 0)
            ON CONFLICT (user_id, test_id) WHERE status = 'active' DO NOTHING
            RETURNING *
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.user_id)
        .bind(attempt.test_id)
        .bind(attempt.started_at)
        .bind(attempt.ends_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn finalize_if_active(
        &self,
        id: Uuid,
        finalization: Finalization,
    ) -> AppResult<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            UPDATE attempts
            SET
                status = $2,
                submitted_at = $3,
                score = $4,
                max_score = $5
            WHERE id = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(finalization.status)
        .bind(finalization.submitted_at)
        .bind(finalization.score)
        .bind(finalization.max_score)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn list_expired_active(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Attempt>> {
        let attempts = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT * FROM attempts
            WHERE status = 'active' AND ends_at <= $1
            ORDER BY ends_at ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}
