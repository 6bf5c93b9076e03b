//! Utility functions

pub mod time;
pub mod validation;

pub use time::{format_duration, now_utc, remaining_seconds, window_start};
pub use validation::{validate_case_counts, validate_language};
