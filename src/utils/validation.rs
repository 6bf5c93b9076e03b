//! Input validation utilities

use crate::constants::{self, MAX_TEST_CASES_PER_RESULT};

/// Validate programming language
pub fn validate_language(language: &str) -> Result<(), &'static str> {
    if constants::languages::ALL.contains(&language) {
        Ok(())
    } else {
        Err("Unsupported programming language")
    }
}

/// Validate the test case counts reported by the judge
pub fn validate_case_counts(passed_count: i32, total_count: i32) -> Result<(), &'static str> {
    if total_count < 0 {
        return Err("total_count must not be negative");
    }
    if total_count > MAX_TEST_CASES_PER_RESULT {
        return Err("total_count exceeds the supported number of test cases");
    }
    if passed_count < 0 {
        return Err("passed_count must not be negative");
    }
    if passed_count > total_count {
        return Err("passed_count must not exceed total_count");
    }
    Ok(())
}
