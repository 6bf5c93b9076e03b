//! Exam Engine - Exam Attempt Lifecycle and Scoring
//!
//! This library provides the attempt lifecycle for an online examination
//! portal: opening timed attempts, accepting graded results from the
//! code-execution judge, and closing each attempt exactly once with a score.
//!
//! # Features
//!
//! - Idempotent start (one active attempt per user and test)
//! - Race-safe finalize via a single conditional write
//! - Partial-credit, best-of scoring over judge results
//! - Server-side deadline sweep for abandoned attempts
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Lifecycle logic and the deadline sweeper
//! - **Scoring**: Pure score computation
//! - **Stores**: Storage seams with PostgreSQL repositories
//! - **Models**: Domain models

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod scoring;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
