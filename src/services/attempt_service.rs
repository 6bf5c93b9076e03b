//! Attempt lifecycle service
//!
//! Owns every write to an attempt row. An attempt is opened by `start_attempt`
//! and closed exactly once, either by its owner, by the intake path when a
//! result arrives after the deadline, or by the deadline sweeper. All three
//! close through the same conditional write, so whichever caller gets there
//! first fixes the stored score and every other caller reads it back.

use std::future::Future;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    constants::{rate_limits, SWEEP_CONCURRENCY},
    error::{AppError, AppResult, InvalidAttemptReason},
    models::{
        Attempt, AttemptStatus, Finalization, NewAttempt, NewSubmission, RunType,
        SubmissionRecord,
    },
    scoring::{self, PointsByQuestion},
    state::AppState,
    utils::{format_duration, validate_case_counts, validate_language, window_start},
};

/// Outcome of closing an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizationResult {
    pub attempt_id: Uuid,
    pub status: AttemptStatus,
    pub score: i64,
    pub max_score: i64,
    pub submitted_at: DateTime<Utc>,
    /// True when the stored result was written by an earlier call
    pub already_finalized: bool,
}

impl FinalizationResult {
    fn from_stored(attempt: &Attempt, already_finalized: bool) -> AppResult<Self> {
        let submitted_at = match (attempt.status.is_terminal(), attempt.submitted_at) {
            (true, Some(at)) => at,
            _ => {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "attempt {} has status {} without a submission time",
                    attempt.id,
                    attempt.status
                )));
            }
        };

        Ok(Self {
            attempt_id: attempt.id,
            status: attempt.status,
            score: attempt.score,
            max_score: attempt.max_score,
            submitted_at,
            already_finalized,
        })
    }
}

/// Counters reported by one deadline sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub examined: usize,
    pub finalized: usize,
    pub already_finalized: usize,
    pub failed: usize,
}

/// Attempt lifecycle service
pub struct AttemptService;

impl AttemptService {
    /// Open an attempt, or return the caller's existing active one.
    ///
    /// Repeated and concurrent calls for the same user and test resolve to a
    /// single active attempt. An existing active attempt is returned as-is
    /// even when its deadline has passed; it is closed by finalize or the
    /// sweeper, never reopened.
    pub async fn start_attempt(
        state: &AppState,
        user_id: Uuid,
        test_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Attempt> {
        if let Some(existing) =
            bounded(state, state.attempts().find_active(user_id, test_id)).await?
        {
            info!(
                attempt_id = %existing.id,
                user_id = %user_id,
                test_id = %test_id,
                "Resuming active attempt"
            );
            return Ok(existing);
        }

        let test = bounded(state, state.catalog().get_test(test_id))
            .await?
            .ok_or(AppError::TestNotFound(test_id))?;
        let duration = test.duration(state.config().attempts.default_duration_minutes);

        // A lost insert race means another request opened the attempt; the
        // second pass covers that attempt being closed before we could read it.
        for _ in 0..2 {
            let candidate = NewAttempt::open(user_id, test_id, now, duration);
            let inserted = bounded(state, state.attempts().insert_active(candidate))
                .await
                .map_err(|e| match e {
                    AppError::Database(msg) => AppError::AttemptCreationFailed(msg),
                    other => other,
                })?;

            if let Some(attempt) = inserted {
                info!(
                    attempt_id = %attempt.id,
                    user_id = %user_id,
                    test_id = %test_id,
                    duration = %format_duration(duration),
                    "Attempt started"
                );
                return Ok(attempt);
            }

            if let Some(existing) =
                bounded(state, state.attempts().find_active(user_id, test_id)).await?
            {
                debug!(attempt_id = %existing.id, "Concurrent start resolved to existing attempt");
                return Ok(existing);
            }
        }

        Err(AppError::AttemptCreationFailed(format!(
            "could not open an attempt for user {} on test {}",
            user_id, test_id
        )))
    }

    /// Close an attempt on behalf of its owner.
    ///
    /// Finalizing an attempt that is already closed returns the stored result
    /// with `already_finalized` set; nothing is recomputed.
    pub async fn finalize_attempt(
        state: &AppState,
        user_id: Uuid,
        attempt_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<FinalizationResult> {
        let attempt = Self::owned_attempt(state, user_id, attempt_id).await?;

        if attempt.status.is_terminal() {
            debug!(attempt_id = %attempt_id, status = %attempt.status, "Attempt already finalized");
            return FinalizationResult::from_stored(&attempt, true);
        }

        let status = AttemptStatus::for_finalize_at(now, attempt.ends_at);
        Self::close(state, &attempt, status, now).await
    }

    /// Fetch an attempt owned by `user_id`
    pub async fn get_attempt(
        state: &AppState,
        user_id: Uuid,
        attempt_id: Uuid,
    ) -> AppResult<Attempt> {
        Self::owned_attempt(state, user_id, attempt_id).await
    }

    /// Append a judge result to an active attempt.
    ///
    /// A result arriving at or after the deadline closes the attempt and is
    /// rejected with `TimeExpired`; it never counts toward the score.
    pub async fn record_submission(
        state: &AppState,
        submission: NewSubmission,
        now: DateTime<Utc>,
    ) -> AppResult<SubmissionRecord> {
        let attempt = bounded(state, state.attempts().find_by_id(submission.attempt_id))
            .await?
            .ok_or(AppError::InvalidAttempt(InvalidAttemptReason::NotFound))?;

        if !attempt.is_active() {
            return Err(AppError::InvalidAttempt(InvalidAttemptReason::NotActive));
        }

        if attempt.is_expired_at(now) {
            info!(attempt_id = %attempt.id, "Result arrived after deadline, closing attempt");
            Self::close(state, &attempt, AttemptStatus::AutoSubmitted, now).await?;
            return Err(AppError::TimeExpired);
        }

        let test = bounded(state, state.catalog().get_test(attempt.test_id))
            .await?
            .ok_or(AppError::TestNotFound(attempt.test_id))?;
        if !test.contains_question(&submission.question_id) {
            return Err(AppError::QuestionNotFound(submission.question_id));
        }

        validate_case_counts(submission.passed_count, submission.total_count)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_language(&submission.language).map_err(|e| AppError::Validation(e.to_string()))?;

        let limit = match submission.run_type {
            RunType::Trial => state.config().attempts.trial_runs_per_minute,
            RunType::Scored => state.config().attempts.scored_submits_per_minute,
        };
        let since = window_start(now, rate_limits::WINDOW_SECS);
        let recent = bounded(
            state,
            state
                .ledger()
                .count_since(attempt.id, submission.run_type, since),
        )
        .await?;
        if recent >= limit {
            warn!(
                attempt_id = %attempt.id,
                run_type = %submission.run_type,
                recent,
                limit,
                "Judge result rate limited"
            );
            return Err(AppError::RateLimited(format!(
                "at most {} {} results per minute",
                limit, submission.run_type
            )));
        }

        let record = bounded(state, state.ledger().record(submission)).await?;
        debug!(
            attempt_id = %record.attempt_id,
            question_id = %record.question_id,
            run_type = %record.run_type,
            passed = record.passed_count,
            total = record.total_count,
            "Judge result recorded"
        );
        Ok(record)
    }

    /// Close one batch of active attempts whose deadline has passed
    pub async fn finalize_expired(state: &AppState, now: DateTime<Utc>) -> AppResult<SweepStats> {
        let expired = bounded(
            state,
            state
                .attempts()
                .list_expired_active(now, state.config().sweeper.batch_size),
        )
        .await?;

        let mut stats = SweepStats {
            examined: expired.len(),
            ..SweepStats::default()
        };

        let outcomes: Vec<AppResult<FinalizationResult>> = stream::iter(expired)
            .map(|attempt| {
                let state = state.clone();
                async move { Self::close(&state, &attempt, AttemptStatus::AutoSubmitted, now).await }
            })
            .buffer_unordered(SWEEP_CONCURRENCY)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Ok(result) if result.already_finalized => stats.already_finalized += 1,
                Ok(_) => stats.finalized += 1,
                Err(e) => {
                    error!(error = %e, "Failed to close expired attempt");
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn owned_attempt(state: &AppState, user_id: Uuid, attempt_id: Uuid) -> AppResult<Attempt> {
        let attempt = bounded(state, state.attempts().find_by_id(attempt_id))
            .await?
            .ok_or(AppError::InvalidAttempt(InvalidAttemptReason::NotFound))?;

        if attempt.user_id != user_id {
            return Err(AppError::InvalidAttempt(InvalidAttemptReason::NotOwned));
        }

        Ok(attempt)
    }

    /// Score an active attempt and write the terminal row.
    ///
    /// The score is computed before the conditional write; if the write finds
    /// the attempt already closed, the stored row wins and is returned.
    async fn close(
        state: &AppState,
        attempt: &Attempt,
        status: AttemptStatus,
        now: DateTime<Utc>,
    ) -> AppResult<FinalizationResult> {
        let config = &state.config().attempts;

        let questions = match bounded(state, state.catalog().get_test(attempt.test_id)).await? {
            Some(test) => test.questions,
            None => {
                warn!(
                    attempt_id = %attempt.id,
                    test_id = %attempt.test_id,
                    "Test missing from catalog, scoring attempt as empty"
                );
                Vec::new()
            }
        };

        let points = PointsByQuestion::from_catalog(&questions, config.default_question_points);
        if !points.defaulted().is_empty() {
            warn!(
                attempt_id = %attempt.id,
                test_id = %attempt.test_id,
                questions = ?points.defaulted(),
                default_points = config.default_question_points,
                "Questions without point values scored with default points"
            );
        }

        let submissions = bounded(state, state.ledger().list_scored(attempt.id)).await?;
        let breakdown = scoring::aggregate(&submissions, &points);

        let finalization = Finalization {
            status,
            submitted_at: now,
            score: breakdown.score,
            max_score: breakdown.max_score,
        };

        match bounded(state, state.attempts().finalize_if_active(attempt.id, finalization)).await? {
            Some(row) => {
                info!(
                    attempt_id = %row.id,
                    user_id = %row.user_id,
                    status = %row.status,
                    score = row.score,
                    max_score = row.max_score,
                    "Attempt finalized"
                );
                FinalizationResult::from_stored(&row, false)
            }
            None => {
                debug!(attempt_id = %attempt.id, "Attempt closed concurrently, reading stored result");
                let row = bounded(state, state.attempts().find_by_id(attempt.id))
                    .await?
                    .ok_or(AppError::InvalidAttempt(InvalidAttemptReason::NotFound))?;
                FinalizationResult::from_stored(&row, true)
            }
        }
    }
}

/// Run a store call under the configured time bound
async fn bounded<T, F>(state: &AppState, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let limit = state.config().attempts.store_timeout();
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            let ms = state.config().attempts.store_timeout_ms;
            error!(timeout_ms = ms, "Store call timed out");
            Err(AppError::StoreTimeout(ms))
        }
    }
}
