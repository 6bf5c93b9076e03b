//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Config,
    db::{
        repositories::{AttemptRepository, CatalogRepository, SubmissionRepository},
        AttemptStore, SubmissionLedger, TestCatalog,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Attempt rows (written only by the lifecycle manager)
    attempts: Arc<dyn AttemptStore>,

    /// Test catalog reader
    catalog: Arc<dyn TestCatalog>,

    /// Judge result ledger
    ledger: Arc<dyn SubmissionLedger>,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create application state backed by PostgreSQL
    pub fn new(db: PgPool, config: Config) -> Self {
        Self::from_stores(
            Arc::new(AttemptRepository::new(db.clone())),
            Arc::new(CatalogRepository::new(db.clone())),
            Arc::new(SubmissionRepository::new(db)),
            config,
        )
    }

    /// Create application state from explicit store implementations
    pub fn from_stores(
        attempts: Arc<dyn AttemptStore>,
        catalog: Arc<dyn TestCatalog>,
        ledger: Arc<dyn SubmissionLedger>,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                attempts,
                catalog,
                ledger,
                config,
            }),
        }
    }

    /// Get the attempt store
    pub fn attempts(&self) -> &dyn AttemptStore {
        self.inner.attempts.as_ref()
    }

    /// Get the test catalog
    pub fn catalog(&self) -> &dyn TestCatalog {
        self.inner.catalog.as_ref()
    }

    /// Get the submission ledger
    pub fn ledger(&self) -> &dyn SubmissionLedger {
        self.inner.ledger.as_ref()
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
