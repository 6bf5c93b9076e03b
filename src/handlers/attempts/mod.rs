//! Exam attempt handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Attempt routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Lifecycle
        .route("/start", post(handler::start_attempt))
        .route("/finalize", post(handler::finalize_attempt))
        .route("/{id}", get(handler::get_attempt))
        // Judge intake
        .route("/{id}/submissions", post(handler::record_submission))
}
