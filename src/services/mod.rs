//! Business logic services

pub mod attempt_service;
pub mod auth_service;
pub mod sweeper;

pub use attempt_service::{AttemptService, FinalizationResult, SweepStats};
pub use auth_service::AuthService;
pub use sweeper::DeadlineSweeper;
