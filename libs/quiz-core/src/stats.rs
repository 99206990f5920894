//! Performance aggregation helpers for dashboard rollups.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::types::QuestionPerformance;

/// Accuracy threshold below which a question counts as a weak area.
pub const DEFAULT_WEAK_THRESHOLD: f64 = 70.0;

/// Minimum attempts before a question can rank as challenging, so
/// single-attempt outliers do not dominate the ranking.
pub const DEFAULT_MIN_SAMPLE: u32 = 3;

/// Accuracy as a percentage; 0 when there are no attempts.
pub fn accuracy(correct: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    correct as f64 / attempts as f64 * 100.0
}

/// Questions needing review: accuracy below `threshold` or due by `now`.
///
/// Ordered worst accuracy first, ties broken by soonest next review.
/// Recomputed fresh on each call.
pub fn weak_areas(
    mut records: Vec<QuestionPerformance>,
    threshold: f64,
    now: DateTime<Utc>,
) -> Vec<QuestionPerformance> {
    records.retain(|r| {
        r.attempts > 0
            && (r.accuracy() < threshold || r.next_review.is_some_and(|due| due <= now))
    });
    records.sort_by(|a, b| {
        a.accuracy()
            .total_cmp(&b.accuracy())
            .then_with(|| cmp_next_review(a, b))
    });
    records
}

/// Questions ranked by lowest accuracy among those with enough attempts.
pub fn challenging(
    mut records: Vec<QuestionPerformance>,
    min_attempts: u32,
) -> Vec<QuestionPerformance> {
    records.retain(|r| r.attempts >= min_attempts);
    records.sort_by(|a, b| {
        a.accuracy()
            .total_cmp(&b.accuracy())
            .then_with(|| b.attempts.cmp(&a.attempts))
    });
    records
}

fn cmp_next_review(a: &QuestionPerformance, b: &QuestionPerformance) -> Ordering {
    match (a.next_review, b.next_review) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
