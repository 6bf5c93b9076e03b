//! Database module
//!
//! This module handles database connections, migrations, the storage seams
//! used by the attempt lifecycle, and their PostgreSQL repositories.

pub mod connection;
pub mod repositories;
pub mod stores;

use sqlx::PgPool;

pub use connection::*;
pub use stores::{AttemptStore, SubmissionLedger, TestCatalog};

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
