//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

/// Default time to wait for a pooled connection, in seconds
pub const DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Default upper bound on a single store call made by the lifecycle manager
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// ATTEMPT & SCORING DEFAULTS
// =============================================================================

/// Points assumed for a test question whose catalog row has no usable value
pub const DEFAULT_QUESTION_POINTS: i64 = 100;

/// Duration assumed for a test whose catalog row has no usable time limit
pub const DEFAULT_TEST_DURATION_MINUTES: i64 = 60;

// =============================================================================
// DEADLINE SWEEPER
// =============================================================================

/// Default period between deadline sweeps, in seconds (0 disables the sweeper)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Default number of expired attempts finalized per sweep
pub const DEFAULT_SWEEP_BATCH_SIZE: i64 = 100;

/// Number of expired attempts finalized concurrently within one sweep
pub const SWEEP_CONCURRENCY: usize = 8;

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers accepted from the judge
pub mod languages {
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";
    pub const PYTHON: &str = "python";
    pub const JAVA: &str = "java";
    pub const JAVASCRIPT: &str = "javascript";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[C, CPP, PYTHON, JAVA, JAVASCRIPT];
}

// =============================================================================
// ROLES
// =============================================================================

/// Caller roles carried in bearer tokens
pub mod roles {
    pub const STUDENT: &str = "student";
    pub const TRAINER: &str = "trainer";
    pub const ADMIN: &str = "admin";
    /// Service identity used by the code-execution judge to report results
    pub const JUDGE: &str = "judge";
}

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Per-attempt intake limits for judge results
pub mod rate_limits {
    /// Trial runs accepted per attempt per window
    pub const TRIAL_RUNS_PER_WINDOW: i64 = 20;

    /// Scored submissions accepted per attempt per window
    pub const SCORED_SUBMITS_PER_WINDOW: i64 = 3;

    /// Sliding window length in seconds
    pub const WINDOW_SECS: i64 = 60;
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// Current API version
pub const API_VERSION: &str = "v1";

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum number of test cases a single judge result may report
pub const MAX_TEST_CASES_PER_RESULT: i32 = 10_000;

/// Maximum verdict label length
pub const MAX_VERDICT_LENGTH: u64 = 64;
