//! Test catalog repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::stores::TestCatalog,
    error::AppResult,
    models::{TestDefinition, TestQuestion},
};

/// PostgreSQL-backed catalog reader
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestCatalog for CatalogRepository {
    async fn get_test(&self, test_id: Uuid) -> AppResult<Option<TestDefinition>> {
        let time_limit: Option<Option<i32>> =
            sqlx::query_scalar(r#"SELECT time_limit_minutes FROM tests WHERE id = $1"#)
                .bind(test_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(time_limit_minutes) = time_limit else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, TestQuestion>(
            r#"
            SELECT question_id, points FROM test_questions
            WHERE test_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(TestDefinition {
            id: test_id,
            time_limit_minutes,
            questions,
        }))
    }
}
