//! Scoring engine
//!
//! Turns the scored submissions of one attempt into a final `(score, max_score)`
//! pair. Every function here is pure: the result depends only on the
//! submission set and the catalog point values, never on ordering or time.
//!
//! Rules:
//! - a submission earns `round(points * passed / max(total, 1))`, with a
//!   `total` of zero earning nothing
//! - per question only the best submission counts
//! - `max_score` is the sum of points over every question assigned to the
//!   test, attempted or not
//! - submissions for questions outside the test are ignored, so
//!   `0 <= score <= max_score` always holds

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::models::{RunType, SubmissionRecord, TestQuestion};

/// Point value per question for one test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsByQuestion {
    points: HashMap<Uuid, i64>,
    defaulted: Vec<Uuid>,
}

impl PointsByQuestion {
    /// Build the table from catalog rows.
    ///
    /// Rows without a positive point value take `default_points`; those
    /// questions are reported by [`PointsByQuestion::defaulted`] so the caller
    /// can surface the substitution. Duplicate rows keep the first value.
    pub fn from_catalog(questions: &[TestQuestion], default_points: i64) -> Self {
        let mut points = HashMap::with_capacity(questions.len());
        let mut defaulted = Vec::new();

        for question in questions {
            if points.contains_key(&question.question_id) {
                continue;
            }
            let value = match question.points {
                Some(p) if p > 0 => i64::from(p),
                _ => {
                    defaulted.push(question.question_id);
                    default_points
                }
            };
            points.insert(question.question_id, value);
        }

        Self { points, defaulted }
    }

    /// Points for a question, if it belongs to the test
    pub fn get(&self, question_id: &Uuid) -> Option<i64> {
        self.points.get(question_id).copied()
    }

    /// Sum of all question points
    pub fn total(&self) -> i64 {
        self.points.values().sum()
    }

    /// Questions whose points came from the fallback
    pub fn defaulted(&self) -> &[Uuid] {
        &self.defaulted
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Result of aggregating an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub score: i64,
    pub max_score: i64,
    /// Best credit per attempted question
    pub per_question: BTreeMap<Uuid, i64>,
}

/// Credit for one submission: `round(points * passed / total)`.
///
/// Counts are clamped to `0 <= passed <= total`; a `total` of zero earns no
/// credit. Rounding is half-up and done in integers so the result never
/// depends on float behaviour.
pub fn question_score(points: i64, passed_count: i32, total_count: i32) -> i64 {
    if points <= 0 || total_count <= 0 {
        return 0;
    }

    let total = i64::from(total_count);
    let passed = i64::from(passed_count).clamp(0, total);

    (2 * points * passed + total) / (2 * total)
}

/// Aggregate scored submissions into the final score.
pub fn aggregate(submissions: &[SubmissionRecord], points: &PointsByQuestion) -> ScoreBreakdown {
    let mut per_question: BTreeMap<Uuid, i64> = BTreeMap::new();

    for submission in submissions {
        if submission.run_type != RunType::Scored {
            continue;
        }
        let Some(question_points) = points.get(&submission.question_id) else {
            continue;
        };

        let credit = question_score(
            question_points,
            submission.passed_count,
            submission.total_count,
        );
        per_question
            .entry(submission.question_id)
            .and_modify(|best| *best = (*best).max(credit))
            .or_insert(credit);
    }

    ScoreBreakdown {
        score: per_question.values().sum(),
        max_score: points.total(),
        per_question,
    }
}
