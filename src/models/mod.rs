//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod attempt;
pub mod catalog;
pub mod submission;

pub use attempt::*;
pub use catalog::*;
pub use submission::*;
