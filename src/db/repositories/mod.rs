//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod attempt_repo;
pub mod catalog_repo;
pub mod submission_repo;

pub use attempt_repo::AttemptRepository;
pub use catalog_repo::CatalogRepository;
pub use submission_repo::SubmissionRepository;
